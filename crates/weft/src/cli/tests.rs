//! Unit tests for command selection and the lifecycle hooks.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use rstest::rstest;
use weft_args::ArgSchema;

use super::cli;
use crate::command::{Command, LazyCommand, LoadedCommand, runner};
use crate::context::CallMode;
use crate::error::CliError;
use crate::options::CliOptions;
use crate::plugin::plugin;

type Events = Arc<Mutex<Vec<String>>>;

fn silent() -> CliOptions {
    CliOptions::new().usage_silent(true)
}

fn push(events: &Events, event: impl Into<String>) {
    events.lock().expect("events lock").push(event.into());
}

fn snapshot(events: &Events) -> Vec<String> {
    events.lock().expect("events lock").clone()
}

/// Runner reporting how it was reached.
fn reporter() -> Command {
    Command::new().run(|ctx| {
        Ok(format!(
            "{}:{}:omitted={}",
            ctx.name(),
            ctx.call_mode(),
            ctx.omitted()
        ))
    })
}

fn with_tools() -> CliOptions {
    silent()
        .sub_command("build", reporter().arg("release", ArgSchema::boolean()))
        .sub_command("test", reporter())
}

#[rstest]
#[case::no_tokens(&[], "main:entry:omitted=true")]
#[case::leading_option(&["--release"], "main:entry:omitted=true")]
#[case::sub_command(&["build"], "build:subCommand:omitted=false")]
#[case::sub_command_with_options(&["test", "--", "x"], "test:subCommand:omitted=false")]
#[case::entry_by_name(&["main"], "main:subCommand:omitted=false")]
fn selects_the_command_from_the_first_token(#[case] argv: &[&str], #[case] expected: &str) {
    let entry = reporter().name("main").arg("release", ArgSchema::boolean());
    let output = cli(argv.iter().copied(), entry, with_tools()).expect("dispatch");
    assert_eq!(output.as_deref(), Some(expected));
}

#[test]
fn sub_command_options_are_resolved_after_its_name() {
    let build = Command::new()
        .arg("release", ArgSchema::boolean().short('r'))
        .arg("target", ArgSchema::positional())
        .run(|ctx| Ok(format!("{}:{}", ctx.flag("release"), ctx.value_str("target").unwrap_or("-"))));
    let options = silent().sub_command("build", build);

    let output = cli(["build", "-r", "x86"], Command::new(), options).expect("dispatch");

    assert_eq!(output.as_deref(), Some("true:x86"));
}

#[test]
fn command_short_alias_wins_over_a_global_one() {
    let entry = Command::new()
        .arg("host", ArgSchema::string().short('h'))
        .run(|ctx| Ok(ctx.value_str("host").unwrap_or("-").to_owned()));

    let output = cli(["-h", "example"], entry.clone(), silent()).expect("dispatch");
    assert_eq!(output.as_deref(), Some("example"));

    let usage = cli(["--help"], entry, silent())
        .expect("dispatch")
        .expect("usage text");
    assert!(usage.contains("-h, --host"), "usage was:\n{usage}");
    assert!(!usage.contains("-h, --help"), "usage was:\n{usage}");
}

#[test]
fn unknown_sub_command_is_not_found() {
    let error = cli(["unknown"], reporter(), with_tools()).expect_err("no such command");

    assert!(matches!(error, CliError::CommandNotFound { ref name } if name == "unknown"));
    assert_eq!(error.to_string(), "Command not found: unknown");
}

#[test]
fn unknown_sub_command_falls_back_to_the_entry_when_enabled() {
    let entry = Command::named("main")
        .arg("words", ArgSchema::positional().multiple())
        .run(|ctx| Ok(format!("{}:{}", ctx.call_mode(), ctx.positionals().join(" "))));
    let options = with_tools().fallback_to_entry(true);

    let output = cli(["unknown", "words"], entry, options).expect("dispatch");

    assert_eq!(output.as_deref(), Some("entry:unknown words"));
}

#[test]
fn inline_runners_dispatch_without_metadata() {
    let output = cli(
        Vec::<String>::new(),
        runner(|ctx| Ok(ctx.name().to_owned())),
        silent(),
    )
    .expect("dispatch");
    assert_eq!(output.as_deref(), Some("(anonymous)"));
}

#[test]
fn plugins_can_register_sub_commands() {
    let extra = plugin("extra")
        .setup(|ctx| {
            ctx.add_command("extra", reporter())?;
            Ok(())
        })
        .build();

    let output = cli(["extra"], reporter(), silent().plugin(extra)).expect("dispatch");

    assert_eq!(output.as_deref(), Some("extra:subCommand:omitted=false"));
}

#[test]
fn lazy_sub_commands_load_only_when_selected() {
    let loads = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&loads);
    let lazy = LazyCommand::new(move || {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(LoadedCommand::Command(reporter()))
    })
    .description("Loaded later");
    let options = silent().sub_command("later", lazy);

    cli(Vec::<String>::new(), reporter(), options.clone()).expect("entry dispatch");
    assert_eq!(loads.load(Ordering::SeqCst), 0);

    let output = cli(["later"], reporter(), options).expect("lazy dispatch");
    assert_eq!(loads.load(Ordering::SeqCst), 1);
    assert_eq!(output.as_deref(), Some("later:subCommand:omitted=false"));
}

#[test]
fn command_options_override_global_ones() {
    let command = Command::new()
        .arg("version", ArgSchema::string())
        .run(|ctx| Ok(format!("v={}", ctx.value_str("version").unwrap_or_default())));

    let output = cli(["--version", "2"], command, silent().version("1.0.0")).expect("dispatch");

    assert_eq!(output.as_deref(), Some("v=2"));
}

#[test]
fn hooks_surround_the_runner() {
    let events = Events::default();
    let (before, after, error) = (Arc::clone(&events), Arc::clone(&events), Arc::clone(&events));
    let run_events = Arc::clone(&events);
    let command = Command::named("work").run(move |_ctx| {
        push(&run_events, "run");
        Ok("done")
    });
    let options = silent()
        .on_before_command(move |ctx| {
            push(&before, format!("before:{}", ctx.name()));
            Ok(())
        })
        .on_after_command(move |_ctx, output| {
            push(&after, format!("after:{}", output.unwrap_or_default()));
            Ok(())
        })
        .on_error_command(move |_ctx, _error| {
            push(&error, "error");
            Ok(())
        });

    let output = cli(Vec::<String>::new(), command, options).expect("dispatch");

    assert_eq!(output.as_deref(), Some("done"));
    assert_eq!(snapshot(&events), ["before:work", "run", "after:done"]);
}

#[test]
fn failing_before_hook_skips_the_runner() {
    let events = Events::default();
    let (run_events, error_events) = (Arc::clone(&events), Arc::clone(&events));
    let command = Command::named("work").run(move |_ctx| {
        push(&run_events, "run");
        Ok(())
    });
    let options = silent()
        .on_before_command(|_ctx| Err("not ready".into()))
        .on_error_command(move |_ctx, error| {
            push(&error_events, format!("error:{error}"));
            Ok(())
        });

    let error = cli(Vec::<String>::new(), command, options).expect_err("hook fails");

    assert!(matches!(error, CliError::Hook { hook: "on_before_command", .. }));
    assert_eq!(
        snapshot(&events),
        ["error:on_before_command hook failed: not ready"]
    );
}

#[test]
fn failing_after_hook_reports_the_error() {
    let seen = Arc::new(Mutex::new(None));
    let sink = Arc::clone(&seen);
    let options = silent()
        .on_after_command(|_ctx, _output| Err("audit offline".into()))
        .on_error_command(move |_ctx, error| {
            *sink.lock().expect("seen lock") = Some(error.to_string());
            Ok(())
        });

    let error = cli(Vec::<String>::new(), reporter(), options).expect_err("hook fails");

    assert_eq!(error.to_string(), "on_after_command hook failed: audit offline");
    assert_eq!(
        seen.lock().expect("seen lock").as_deref(),
        Some("on_after_command hook failed: audit offline")
    );
}

#[test]
fn error_hook_failure_keeps_the_original_error() {
    let command = Command::named("fail").run(|_ctx| -> Result<(), crate::BoxError> {
        Err("boom".into())
    });
    let options = silent().on_error_command(|_ctx, _error| Err("hook broke too".into()));

    let error = cli(Vec::<String>::new(), command, options).expect_err("runner fails");

    assert!(matches!(error, CliError::Command { ref name, .. } if name == "fail"));
    assert_eq!(error.to_string(), "command 'fail' failed: boom");
}

#[test]
fn runner_cli_errors_pass_through_unwrapped() {
    let command = Command::named("strict").run(|_ctx| -> Result<(), crate::BoxError> {
        Err(Box::new(CliError::invalid_argument("bad input")))
    });

    let error = cli(Vec::<String>::new(), command, silent()).expect_err("runner fails");

    assert!(matches!(error, CliError::InvalidArgument { .. }));
    assert_eq!(error.to_string(), "bad input");
}

#[test]
fn entry_call_mode_is_reported_to_hooks() {
    let modes = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&modes);
    let options = with_tools().on_before_command(move |ctx| {
        sink.lock().expect("modes lock").push(ctx.call_mode());
        Ok(())
    });

    cli(Vec::<String>::new(), reporter(), options.clone()).expect("entry");
    cli(["build"], reporter(), options).expect("sub-command");

    assert_eq!(
        *modes.lock().expect("modes lock"),
        [CallMode::Entry, CallMode::SubCommand]
    );
}
