//! Unit tests for command selection and lazy loading.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use rstest::{fixture, rstest};
use weft_args::{ArgSchema, ArgSchemas, parse_args};

use super::{register_entry, resolve_command, sub_command_token, to_command};
use crate::command::{Command, Entry, LazyCommand, LoadedCommand, SubCommands, runner};
use crate::context::CallMode;
use crate::error::CliError;

#[fixture]
fn entry() -> Entry {
    Entry::runner(|_ctx| Ok("entry"))
}

#[fixture]
fn commands() -> SubCommands {
    SubCommands::new()
        .with("command1", Command::new().run(|_ctx| Ok("one")))
        .with("command2", Command::named("explicit").run(|_ctx| Ok("two")))
}

#[rstest]
#[case::empty(&[], None)]
#[case::positional(&["build", "--out", "x"], Some("build"))]
#[case::option_first(&["--out", "x", "build"], None)]
#[case::after_terminator(&["--", "build"], None)]
#[case::empty_text(&[""], None)]
fn sub_command_token_is_the_leading_positional(
    #[case] argv: &[&str],
    #[case] expected: Option<&str>,
) {
    let tokens = parse_args(argv);
    assert_eq!(sub_command_token(&tokens), expected);
}

#[rstest]
fn missing_token_selects_the_entry(entry: Entry, mut commands: SubCommands) {
    let resolved = resolve_command(None, &entry, &mut commands, false);
    assert_eq!(resolved.call_mode, CallMode::Entry);
    assert!(resolved.entry.is_some());
    assert_eq!(resolved.name, None);
}

#[rstest]
fn token_without_sub_commands_selects_the_entry(entry: Entry) {
    let mut empty = SubCommands::new();
    let resolved = resolve_command(Some("anything"), &entry, &mut empty, false);
    assert_eq!(resolved.call_mode, CallMode::Entry);
}

#[rstest]
fn known_token_selects_and_names_the_sub_command(entry: Entry, mut commands: SubCommands) {
    let resolved = resolve_command(Some("command1"), &entry, &mut commands, false);

    assert_eq!(resolved.call_mode, CallMode::SubCommand);
    assert_eq!(resolved.name.as_deref(), Some("command1"));
    assert_eq!(
        resolved.entry.as_ref().and_then(Entry::name),
        Some("command1")
    );
    assert_eq!(commands.get("command1").and_then(Entry::name), Some("command1"));
}

#[rstest]
fn explicit_names_are_not_overwritten(entry: Entry, mut commands: SubCommands) {
    resolve_command(Some("command2"), &entry, &mut commands, false);
    assert_eq!(commands.get("command2").and_then(Entry::name), Some("explicit"));
}

#[rstest]
fn unknown_token_is_unexpected(entry: Entry, mut commands: SubCommands) {
    let resolved = resolve_command(Some("unknown"), &entry, &mut commands, false);
    assert_eq!(resolved.call_mode, CallMode::Unexpected);
    assert!(resolved.entry.is_none());
    assert_eq!(resolved.name.as_deref(), Some("unknown"));
}

#[rstest]
fn unknown_token_falls_back_to_entry_when_enabled(entry: Entry, mut commands: SubCommands) {
    let resolved = resolve_command(Some("unknown"), &entry, &mut commands, true);
    assert_eq!(resolved.call_mode, CallMode::Entry);
    assert!(resolved.entry.is_some());
}

#[rstest]
fn named_entry_joins_the_sub_commands(mut commands: SubCommands) {
    let named = Entry::from(Command::named("main").run(|_ctx| Ok(())));
    register_entry(&named, &mut commands);
    assert!(commands.contains("main"));

    let mut empty = SubCommands::new();
    register_entry(&named, &mut empty);
    assert!(empty.is_empty());
}

#[test]
fn inline_runner_becomes_a_minimal_command() {
    let command = to_command(&Entry::runner(|_ctx| Ok(())), None).expect("command");
    assert!(command.has_runner());
    assert_eq!(command.command_name(), None);
}

#[test]
fn lazy_runner_takes_the_stub_metadata() {
    let lazy = LazyCommand::new(|| Ok(LoadedCommand::Runner(runner(|_ctx| Ok("lazy")))))
        .command_name("later")
        .description("Loaded later")
        .args(ArgSchemas::new().with("count", ArgSchema::number()));

    let command = to_command(&Entry::from(lazy), None).expect("command");

    assert_eq!(command.command_name(), Some("later"));
    assert_eq!(command.command_description(), Some("Loaded later"));
    assert!(command.arg_schemas().contains_key("count"));
    assert!(command.has_runner());
}

#[test]
fn loaded_command_fields_win_over_the_stub() {
    let lazy = LazyCommand::new(|| {
        Ok(LoadedCommand::from(
            Command::new()
                .description("from loader")
                .run(|_ctx| Ok(())),
        ))
    })
    .command_name("stub")
    .description("from stub")
    .examples("stub examples");

    let command = to_command(&Entry::from(lazy), None).expect("command");

    assert_eq!(command.command_name(), Some("stub"));
    assert_eq!(command.command_description(), Some("from loader"));
    assert_eq!(command.command_examples(), Some("stub examples"));
}

#[test]
fn loaded_command_without_runner_is_invalid() {
    let lazy = LazyCommand::new(|| Ok(LoadedCommand::from(Command::new()))).command_name("broken");
    let error = to_command(&Entry::from(lazy), None).expect_err("must fail");
    assert!(matches!(error, CliError::InvalidCommand { ref name } if name == "broken"));
    assert_eq!(error.to_string(), "'run' is required in command: broken");
}

#[test]
fn loader_runs_once_per_resolution() {
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&calls);
    let lazy = LazyCommand::new(move || {
        seen.fetch_add(1, Ordering::SeqCst);
        Ok(LoadedCommand::Runner(runner(|_ctx| Ok(()))))
    });

    to_command(&Entry::from(lazy), Some("count")).expect("command");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn loader_failure_names_the_command() {
    let lazy = LazyCommand::new(|| Err("disk unavailable".into())).command_name("load");
    let error = to_command(&Entry::from(lazy), None).expect_err("must fail");
    assert_eq!(error.to_string(), "command 'load' failed: disk unavailable");
}
