//! Unit tests for decorator composition order.

use std::sync::{Arc, Mutex};

use rstest::rstest;
use weft_args::{ArgResolveError, ArgResolveErrorKind, ArgResolveErrors};

use super::{Decorators, wrap_layers};
use crate::command::{Runner, runner};
use crate::context::CommandContext;
use crate::test_support::bare_context;

#[test]
fn last_registered_renderer_decorator_is_outermost() {
    let mut decorators = Decorators::new();
    decorators.add_header_decorator(|base, ctx| Ok(format!("[A] {}", base(ctx)?)));
    decorators.add_header_decorator(|base, ctx| {
        let inner = base(ctx)?;
        Ok(format!("[B] {inner} [B]"))
    });

    let ctx = bare_context();
    let rendered = decorators.header_renderer()(&ctx).expect("render header");
    assert_eq!(rendered, "[B] [A]  [B]");
}

#[test]
fn empty_registry_renders_empty_strings() {
    let decorators = Decorators::new();
    let ctx = bare_context();
    assert_eq!(decorators.usage_renderer()(&ctx).expect("usage"), "");
    let errors = ArgResolveErrors::new(Vec::new());
    assert_eq!(
        decorators.validation_errors_renderer()(&ctx, &errors).expect("errors"),
        ""
    );
}

#[test]
fn validation_errors_decorators_see_the_errors() {
    let mut decorators = Decorators::new();
    decorators.add_validation_errors_decorator(|base, ctx, errors| {
        Ok(format!("{}{} error(s)", base(ctx, errors)?, errors.len()))
    });
    let ctx = bare_context();
    let errors = ArgResolveErrors::new(vec![ArgResolveError::new(
        "foo",
        ArgResolveErrorKind::Required,
        "missing",
    )]);
    assert_eq!(
        decorators.validation_errors_renderer()(&ctx, &errors).expect("render"),
        "1 error(s)"
    );
}

#[test]
fn command_decorators_run_outermost_first() {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let mut decorators = Decorators::new();
    for label in ["first", "second"] {
        let log = Arc::clone(&calls);
        decorators.add_command_decorator(move |base: Runner| -> Runner {
            let inner_log = Arc::clone(&log);
            Arc::new(move |ctx: &CommandContext| {
                inner_log.lock().expect("lock").push(label);
                base(ctx)
            })
        });
    }

    let run = decorators.decorate_runner(runner(|_ctx| Ok("done")));
    let output = run(&bare_context()).expect("run");

    assert_eq!(output.as_deref(), Some("done"));
    assert_eq!(*calls.lock().expect("lock"), ["second", "first"]);
}

#[test]
fn command_decorators_returns_a_copy() {
    let mut decorators = Decorators::new();
    decorators.add_command_decorator(|base| base);
    let mut copy = decorators.command_decorators();
    copy.clear();
    assert_eq!(decorators.command_decorators().len(), 1);
}

#[rstest]
#[case::none(Vec::<&str>::new(), "x")]
#[case::one(vec!["a"], "a(x)")]
#[case::two(vec!["a", "b"], "b(a(x))")]
fn wrap_layers_folds_first_to_last(#[case] labels: Vec<&str>, #[case] expected: &str) {
    let wrapped = wrap_layers(
        String::from("x"),
        labels
            .into_iter()
            .map(|label| move |inner: String| format!("{label}({inner})")),
    );
    assert_eq!(wrapped, expected);
}
