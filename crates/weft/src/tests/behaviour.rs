//! Behaviour-driven tests for the plugin pipeline.

use std::sync::{Arc, Mutex};

use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use weft_args::ArgSchema;

use crate::cli::cli;
use crate::command::{Command, runner};
use crate::error::CliError;
use crate::options::CliOptions;
use crate::plugin::{Plugin, PluginBuilder, plugin};

type Calls = Arc<Mutex<Vec<String>>>;

// ---------------------------------------------------------------------------
// Test world
// ---------------------------------------------------------------------------

#[derive(Default)]
struct TestWorld {
    plugins: Vec<Plugin>,
    calls: Calls,
    outcome: Option<Result<Option<String>, CliError>>,
}

#[fixture]
fn world() -> TestWorld {
    TestWorld::default()
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn record(calls: &Calls, entry: impl Into<String>) {
    calls.lock().expect("calls lock").push(entry.into());
}

fn recorded(calls: &Calls, prefix: &str) -> Vec<String> {
    calls
        .lock()
        .expect("calls lock")
        .iter()
        .filter_map(|entry| entry.strip_prefix(prefix).map(str::to_owned))
        .collect()
}

fn recording_plugin(calls: &Calls, id: &str) -> PluginBuilder {
    let setup_calls = Arc::clone(calls);
    let label = id.to_owned();
    plugin(id).setup(move |_ctx| {
        record(&setup_calls, format!("setup:{label}"));
        Ok(())
    })
}

fn output(world: &TestWorld) -> &str {
    world
        .outcome
        .as_ref()
        .expect("no outcome captured")
        .as_ref()
        .expect("expected success")
        .as_deref()
        .unwrap_or_default()
}

fn failure(world: &TestWorld) -> &CliError {
    world
        .outcome
        .as_ref()
        .expect("no outcome captured")
        .as_ref()
        .expect_err("expected failure")
}

fn observed(world: &TestWorld, key: &str) -> String {
    output(world)
        .split(';')
        .find_map(|pair| pair.strip_prefix(key)?.strip_prefix('='))
        .unwrap_or_default()
        .to_owned()
}

// ---------------------------------------------------------------------------
// Given steps
// ---------------------------------------------------------------------------

#[given("a plugin {id} depending on {dependency}")]
fn given_dependent_plugin(world: &mut TestWorld, id: String, dependency: String) {
    let built = recording_plugin(&world.calls, id.trim_matches('"'))
        .dependency(dependency.trim_matches('"'))
        .build();
    world.plugins.push(built);
}

#[given("a plugin {id} without dependencies")]
fn given_plain_plugin(world: &mut TestWorld, id: String) {
    let built = recording_plugin(&world.calls, id.trim_matches('"')).build();
    world.plugins.push(built);
}

#[given("a plugin {id} whose setup fails")]
fn given_failing_plugin(world: &mut TestWorld, id: String) {
    let built = plugin(id.trim_matches('"'))
        .setup(|_ctx| Err("setup exploded".into()))
        .build();
    world.plugins.push(built);
}

#[given("a plugin {id} registering the global flag {flag}")]
fn given_flag_plugin(world: &mut TestWorld, id: String, flag: String) {
    let name = flag.trim_matches('"').to_owned();
    let built = plugin(id.trim_matches('"'))
        .setup(move |ctx| {
            ctx.add_global_option(name.clone(), ArgSchema::boolean())?;
            Ok(())
        })
        .build();
    world.plugins.push(built);
}

#[given("a plugin {id} logging around the command")]
fn given_logging_plugin(world: &mut TestWorld, id: String) {
    let label = id.trim_matches('"').to_owned();
    let calls = Arc::clone(&world.calls);
    let built = plugin(label.clone())
        .setup(move |ctx| {
            let decorator_calls = Arc::clone(&calls);
            let decorator_label = label.clone();
            ctx.decorate_command(move |base| {
                let run_calls = Arc::clone(&decorator_calls);
                let run_label = decorator_label.clone();
                runner(move |command_ctx| {
                    record(&run_calls, format!("call:{run_label}:before"));
                    let result = base(command_ctx)?;
                    record(&run_calls, format!("call:{run_label}:after"));
                    Ok(result)
                })
            });
            Ok(())
        })
        .build();
    world.plugins.push(built);
}

#[given("a plugin {id} with an extension")]
fn given_extension_plugin(world: &mut TestWorld, id: String) {
    let label = id.trim_matches('"').to_owned();
    let calls = Arc::clone(&world.calls);
    let built = plugin(label.clone())
        .extension(move |_ctx, _command| {
            record(&calls, format!("extension:{label}"));
            Ok(label.clone())
        })
        .build();
    world.plugins.push(built);
}

// ---------------------------------------------------------------------------
// When steps
// ---------------------------------------------------------------------------

fn run_cli(world: &mut TestWorld, argv: &[&str]) {
    let calls = Arc::clone(&world.calls);
    let entry = Command::new().run(move |ctx| {
        record(&calls, "call:run");
        let extensions: Vec<&str> = ctx
            .extensions()
            .ids()
            .filter(|id| !id.starts_with("weft:"))
            .collect();
        Ok(format!(
            "verbose={};extensions={}",
            ctx.flag("verbose"),
            extensions.join(",")
        ))
    });
    let options = CliOptions::new()
        .usage_silent(true)
        .plugins(world.plugins.iter().cloned());
    world.outcome = Some(cli(argv.iter().copied(), entry, options));
}

#[when("the CLI runs with no arguments")]
fn when_run_without_arguments(world: &mut TestWorld) {
    run_cli(world, &[]);
}

#[when("the CLI runs with the argument {argument}")]
fn when_run_with_argument(world: &mut TestWorld, argument: String) {
    run_cli(world, &[argument.trim_matches('"')]);
}

// ---------------------------------------------------------------------------
// Then steps
// ---------------------------------------------------------------------------

#[then("the plugins were set up in the order {order}")]
fn then_setup_order(world: &mut TestWorld, order: String) {
    assert_eq!(recorded(&world.calls, "setup:").join(","), order.trim_matches('"'));
}

#[then("the command ran")]
fn then_command_ran(world: &mut TestWorld) {
    assert!(output(world).starts_with("verbose="));
    assert_eq!(recorded(&world.calls, "call:run"), [""]);
}

#[then("the command did not run")]
fn then_command_did_not_run(world: &mut TestWorld) {
    assert!(recorded(&world.calls, "call:run").is_empty());
}

#[then("the invocation fails with a circular dependency through {chain}")]
fn then_circular(world: &mut TestWorld, chain: String) {
    let expected = chain.trim_matches('"').replace(',', " -> ");
    let error = failure(world);
    assert!(
        matches!(error, CliError::CircularDependency { chain: found } if *found == expected),
        "unexpected error: {error}"
    );
    assert_eq!(
        error.to_string(),
        format!("Circular dependency detected: `{expected}`")
    );
}

#[then("the invocation fails with a missing dependency {dependency} on {id}")]
fn then_missing(world: &mut TestWorld, dependency: String, id: String) {
    assert_eq!(
        failure(world).to_string(),
        format!(
            "Missing required dependency: `{}` on `{}`",
            dependency.trim_matches('"'),
            id.trim_matches('"')
        )
    );
}

#[then("the command saw the flag {flag} set")]
fn then_flag_set(world: &mut TestWorld, flag: String) {
    assert_eq!(observed(world, flag.trim_matches('"')), "true");
}

#[then("the call log is {log}")]
fn then_call_log(world: &mut TestWorld, log: String) {
    assert_eq!(recorded(&world.calls, "call:").join(","), log.trim_matches('"'));
}

#[then("the extensions were built in the order {order}")]
fn then_extension_order(world: &mut TestWorld, order: String) {
    assert_eq!(
        recorded(&world.calls, "extension:").join(","),
        order.trim_matches('"')
    );
}

#[then("the command saw the extensions {ids}")]
fn then_extensions_seen(world: &mut TestWorld, ids: String) {
    assert_eq!(observed(world, "extensions"), ids.trim_matches('"'));
}

// ---------------------------------------------------------------------------
// Scenario registration
// ---------------------------------------------------------------------------

#[scenario(
    path = "tests/features/plugin_pipeline.feature",
    name = "Plugins are set up after their dependencies"
)]
fn dependency_order(world: TestWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/plugin_pipeline.feature",
    name = "Circular dependencies abort the invocation"
)]
fn circular_dependencies(world: TestWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/plugin_pipeline.feature",
    name = "Missing required dependencies abort the invocation"
)]
fn missing_dependencies(world: TestWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/plugin_pipeline.feature",
    name = "A failing setup does not stop later plugins"
)]
fn failing_setup(world: TestWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/plugin_pipeline.feature",
    name = "Command decorators nest in reverse registration order"
)]
fn decorator_nesting(world: TestWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/plugin_pipeline.feature",
    name = "Extensions are built in plugin order"
)]
fn extension_order(world: TestWorld) {
    drop(world);
}
