//! End-to-end dispatch through the public API.

use std::sync::{Arc, Mutex};

use weft::{ArgSchema, ArgValue, CallMode, CliError, CliOptions, Command, cli, runner};

fn silent() -> CliOptions {
    CliOptions::new().usage_silent(true)
}

#[test]
fn inline_runner_is_invoked_once_as_the_entry() {
    let modes = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&modes);
    let entry = runner(move |ctx| {
        sink.lock().expect("modes lock").push(ctx.call_mode());
        Ok(())
    });

    let output = cli(Vec::<String>::new(), entry, silent()).expect("dispatch");

    assert_eq!(output, None);
    assert_eq!(*modes.lock().expect("modes lock"), [CallMode::Entry]);
}

#[test]
fn sub_command_runs_in_sub_command_mode() -> anyhow::Result<()> {
    let command1 = Command::new().run(|ctx| Ok(format!("{} {}", ctx.name(), ctx.call_mode())));
    let options = silent().sub_command("command1", command1);

    let output = cli(["command1"], runner(|_ctx| Ok("entry")), options.clone())?;
    assert_eq!(output.as_deref(), Some("command1 subCommand"));

    let error = cli(["unknown"], runner(|_ctx| Ok("entry")), options).expect_err("unknown");
    assert!(matches!(error, CliError::CommandNotFound { .. }));
    assert_eq!(error.to_string(), "Command not found: unknown");
    Ok(())
}

#[test]
fn values_and_rest_are_split_at_the_terminator() {
    let captured = Arc::new(Mutex::new(None));
    let sink = Arc::clone(&captured);
    let command = Command::new()
        .arg("foo", ArgSchema::string())
        .run(move |ctx| {
            let values: Vec<(String, ArgValue)> = ctx
                .values()
                .iter()
                .map(|(name, value)| (name.to_owned(), value.clone()))
                .filter(|(name, _)| name == "foo")
                .collect();
            *sink.lock().expect("captured lock") = Some((values, ctx.rest().to_vec()));
            Ok(())
        });

    cli(["--foo", "bar", "--", "--baz", "qux"], command, silent()).expect("dispatch");

    let (values, rest) = captured
        .lock()
        .expect("captured lock")
        .clone()
        .expect("runner invoked");
    assert_eq!(values, [("foo".to_owned(), ArgValue::from("bar"))]);
    assert_eq!(rest, ["--baz", "qux"]);
}

#[test]
fn invalid_enum_value_renders_the_validation_error() {
    let invoked = Arc::new(Mutex::new(false));
    let flag = Arc::clone(&invoked);
    let command = Command::new()
        .arg("foo", ArgSchema::enumeration(["a", "b", "c"]))
        .run(move |_ctx| {
            *flag.lock().expect("invoked lock") = true;
            Ok(())
        });

    let output = cli(["--foo", "z"], command, silent()).expect("dispatch");

    assert_eq!(
        output.as_deref(),
        Some(r#"Optional argument '--foo' should be chosen from 'enum' ["a", "b", "c"] values"#)
    );
    assert!(!*invoked.lock().expect("invoked lock"));
}
