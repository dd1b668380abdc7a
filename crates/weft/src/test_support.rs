//! Context builders shared by unit tests.

use std::sync::Arc;

use weft_args::{ResolveArgsConfig, parse_args, resolve_args};

use crate::command::Command;
use crate::context::{CallMode, CommandContext, CommandContextParams, create_command_context};
use crate::options::CliOptions;
use crate::plugin::{Plugin, PluginExtension};

/// Context of an anonymous command with no arguments and silenced logging.
pub(crate) fn bare_context() -> CommandContext {
    context_for(
        &Command::new(),
        &CliOptions::new().usage_silent(true),
        &[],
        CallMode::Entry,
        &[],
    )
}

/// Builds a context the way dispatch does, without running plugin setup.
pub(crate) fn context_for(
    command: &Command,
    options: &CliOptions,
    argv: &[&str],
    call_mode: CallMode,
    plugins: &[Plugin],
) -> CommandContext {
    let tokens = parse_args(argv);
    let resolved = resolve_args(
        command.arg_schemas(),
        &tokens,
        &ResolveArgsConfig {
            to_kebab: command.is_kebab(),
            ..ResolveArgsConfig::default()
        },
    );
    let extensions: Vec<(String, PluginExtension)> = plugins
        .iter()
        .filter_map(|plugin| {
            plugin
                .id()
                .zip(plugin.extension())
                .map(|(id, extension)| (id.to_owned(), extension.clone()))
        })
        .collect();
    let context = create_command_context(CommandContextParams {
        args: command.arg_schemas().clone(),
        resolved,
        argv: argv.iter().map(|arg| (*arg).to_owned()).collect(),
        tokens,
        omitted: call_mode != CallMode::SubCommand,
        call_mode,
        command,
        extensions: &extensions,
        cli_options: options,
    })
    .expect("context builds");
    Arc::into_inner(context).expect("context is uniquely owned")
}
