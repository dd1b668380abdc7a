//! The `cli` entry point.
//!
//! One call runs the whole pipeline: plugins are ordered and set up, the
//! command is selected, arguments are resolved against the global options
//! overlaid by the command's own, the context is built with every plugin
//! extension, and the decorated runner executes between the lifecycle
//! hooks. Nothing is shared between calls.

use tracing::{debug, error};
use weft_args::{ResolveArgsConfig, parse_args, resolve_args};

use crate::command::{Entry, Runner, SubCommands, noop_runner};
use crate::context::{CallMode, CommandContext, CommandContextParams, create_command_context};
use crate::dependency::resolve_dependencies;
use crate::error::{BoxError, CliError};
use crate::options::{CliOptions, CommandHooks};
use crate::plugin::{Plugin, PluginContext, PluginExtension, PluginRegistrations};
use crate::plugins::builtin_plugins;
use crate::resolver::{register_entry, resolve_command, sub_command_token, to_command};

/// Tracing target for the dispatch pipeline.
pub(crate) const CLI_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::cli");

/// Runs `entry` (or one of the configured sub-commands) against `argv`.
///
/// `argv` excludes the program name. The returned text is the decorated
/// runner's output: with the built-in plugins this is the header followed
/// by the command output, the help text, the version, or the rendered
/// validation errors.
///
/// # Errors
///
/// Fails when plugin dependencies are missing or circular, when the
/// sub-command is unknown, when a lazy command cannot be loaded, when an
/// extension fails, and when a hook or the runner fails. Plugin setup
/// failures are logged and do not fail the call.
///
/// # Examples
///
/// ```
/// use weft::{ArgSchema, CliOptions, Command, cli};
///
/// let greet = Command::named("greet")
///     .arg("name", ArgSchema::string())
///     .run(|ctx| Ok(format!("hello {}", ctx.value_str("name").unwrap_or("world"))));
///
/// let output = cli(["--name", "kim"], greet, CliOptions::new().usage_silent(true))
///     .expect("dispatch");
/// assert_eq!(output.as_deref(), Some("hello kim"));
/// ```
pub fn cli<I, S>(
    argv: I,
    entry: impl Into<Entry>,
    options: CliOptions,
) -> Result<Option<String>, CliError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let argv: Vec<String> = argv.into_iter().map(Into::into).collect();
    let entry = entry.into();
    let mut cli_options = options;

    let plugins = load_plugins(&cli_options)?;
    let mut sub_commands = cli_options.sub_commands().clone();
    register_entry(&entry, &mut sub_commands);
    let PluginRegistrations {
        global_options,
        decorators,
        sub_commands: mut registered,
    } = setup_plugins(&plugins, sub_commands);
    cli_options.resolve_renderers(&decorators);

    let tokens = parse_args(&argv);
    let sub_command = sub_command_token(&tokens).map(str::to_owned);
    let selection = resolve_command(
        sub_command.as_deref(),
        &entry,
        &mut registered,
        cli_options.falls_back_to_entry(),
    );
    cli_options.replace_sub_commands(registered);

    let Some(selected) = selection.entry else {
        return Err(CliError::CommandNotFound {
            name: selection.name.unwrap_or_default(),
        });
    };
    let command = to_command(&selected, selection.name.as_deref())?;

    let args = global_options.overlay(command.arg_schemas());
    let resolved = resolve_args(
        &args,
        &tokens,
        &ResolveArgsConfig {
            short_grouping: true,
            to_kebab: command.is_kebab(),
            skip_positional: (selection.call_mode == CallMode::SubCommand).then_some(0),
        },
    );
    debug!(
        target: CLI_TARGET,
        command = command.command_name(),
        call_mode = %selection.call_mode,
        valid = resolved.error.is_none(),
        "arguments resolved"
    );

    let extensions = plugin_extensions(&plugins);
    let ctx = create_command_context(CommandContextParams {
        args,
        resolved,
        argv,
        tokens,
        omitted: sub_command.is_none(),
        call_mode: selection.call_mode,
        command: &command,
        extensions: &extensions,
        cli_options: &cli_options,
    })?;

    let run = decorators.decorate_runner(
        command
            .command_runner()
            .cloned()
            .unwrap_or_else(noop_runner),
    );
    execute(&ctx, &run, cli_options.hooks())
}

fn load_plugins(options: &CliOptions) -> Result<Vec<Plugin>, CliError> {
    let mut plugins = builtin_plugins();
    plugins.extend(options.caller_plugins().iter().cloned());
    let sorted = resolve_dependencies(&plugins)?;
    debug!(
        target: CLI_TARGET,
        order = ?sorted.iter().map(Plugin::label).collect::<Vec<_>>(),
        "plugins ordered"
    );
    Ok(sorted)
}

fn setup_plugins(
    plugins: &[Plugin],
    sub_commands: SubCommands,
) -> PluginRegistrations {
    let mut ctx = PluginContext::new(sub_commands);
    for plugin in plugins {
        if let Err(setup_error) = plugin.run_setup(&mut ctx) {
            error!(
                target: CLI_TARGET,
                plugin = plugin.label(),
                error = %setup_error,
                "plugin setup failed; continuing without it"
            );
        }
    }
    ctx.finish()
}

fn plugin_extensions(plugins: &[Plugin]) -> Vec<(String, PluginExtension)> {
    plugins
        .iter()
        .filter_map(|plugin| {
            plugin
                .id()
                .zip(plugin.extension())
                .map(|(id, extension)| (id.to_owned(), extension.clone()))
        })
        .collect()
}

fn execute(
    ctx: &CommandContext,
    run: &Runner,
    hooks: &CommandHooks,
) -> Result<Option<String>, CliError> {
    let outcome = run_with_hooks(ctx, run, hooks);
    if let Err(failure) = &outcome {
        notify_error(ctx, hooks, failure);
    }
    outcome
}

fn run_with_hooks(
    ctx: &CommandContext,
    run: &Runner,
    hooks: &CommandHooks,
) -> Result<Option<String>, CliError> {
    if let Some(before) = &hooks.before {
        before(ctx).map_err(|source| hook_error("on_before_command", source))?;
    }
    let output = run(ctx)?;
    if let Some(after) = &hooks.after {
        after(ctx, output.as_deref()).map_err(|source| hook_error("on_after_command", source))?;
    }
    Ok(output)
}

fn hook_error(hook: &'static str, source: BoxError) -> CliError {
    CliError::lift(source, |wrapped| CliError::Hook {
        hook,
        source: wrapped,
    })
}

fn notify_error(ctx: &CommandContext, hooks: &CommandHooks, failure: &CliError) {
    let Some(on_error) = &hooks.error else {
        return;
    };
    if let Err(hook_failure) = on_error(ctx, failure) {
        error!(
            target: CLI_TARGET,
            command = ctx.name(),
            error = %hook_failure,
            "on_error_command hook failed"
        );
    }
}

#[cfg(test)]
mod tests;
