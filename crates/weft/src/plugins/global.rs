//! The `--help` and `--version` plugin.
//!
//! Registers both options globally and decorates every command so that
//! version and help requests, as well as argument validation failures,
//! short-circuit before the command's own runner is reached.

use std::sync::Arc;

use weft_args::{ArgResolveErrors, ArgSchema};

use crate::command::{Rendering, Runner};
use crate::context::CommandContext;
use crate::error::CliError;
use crate::localizer::{BuiltinKey, BuiltinMessages};
use crate::plugin::{Plugin, plugin};

/// Id of the global options plugin.
pub const GLOBAL_PLUGIN_ID: &str = "weft:global";

/// Name of the help option.
pub const HELP_OPTION: &str = "help";

/// Name of the version option.
pub const VERSION_OPTION: &str = "version";

/// Text printed for `--version` when the program has no version.
pub const UNKNOWN_VERSION: &str = "unknown";

/// Extension exposing the renderers, honouring the command's own
/// rendering overrides.
#[derive(Debug, Clone, Default)]
pub struct GlobalExtension {
    rendering: Rendering,
}

impl GlobalExtension {
    /// Creates the extension for a command with the given overrides.
    #[must_use]
    pub const fn new(rendering: Rendering) -> Self {
        Self { rendering }
    }

    /// Logs and returns the program version.
    #[expect(
        clippy::unused_self,
        reason = "kept as a method so every show_* call goes through the extension"
    )]
    pub fn show_version(&self, ctx: &CommandContext) -> String {
        let version = ctx.env().version().unwrap_or(UNKNOWN_VERSION);
        ctx.log(version);
        version.to_owned()
    }

    /// Renders, logs and returns the header; `None` when it is empty or
    /// disabled.
    ///
    /// # Errors
    ///
    /// Propagates renderer failures.
    pub fn show_header(&self, ctx: &CommandContext) -> Result<Option<String>, CliError> {
        let rendered = self
            .rendering
            .header
            .select(ctx.env().render_header())
            .map(|render| render(ctx))
            .transpose()?;
        Ok(emit(ctx, rendered))
    }

    /// Renders, logs and returns the usage; `None` when it is empty or
    /// disabled.
    ///
    /// # Errors
    ///
    /// Propagates renderer failures.
    pub fn show_usage(&self, ctx: &CommandContext) -> Result<Option<String>, CliError> {
        let rendered = self
            .rendering
            .usage
            .select(ctx.env().render_usage())
            .map(|render| render(ctx))
            .transpose()?;
        Ok(emit(ctx, rendered))
    }

    /// Renders, logs and returns the validation errors; `None` when the
    /// rendering is empty or disabled.
    ///
    /// # Errors
    ///
    /// Propagates renderer failures.
    pub fn show_validation_errors(
        &self,
        ctx: &CommandContext,
        errors: &ArgResolveErrors,
    ) -> Result<Option<String>, CliError> {
        let rendered = self
            .rendering
            .validation_errors
            .select(ctx.env().render_validation_errors())
            .map(|render| render(ctx, errors))
            .transpose()?;
        Ok(emit(ctx, rendered))
    }
}

fn emit(ctx: &CommandContext, rendered: Option<String>) -> Option<String> {
    rendered
        .filter(|text| !text.is_empty())
        .inspect(|text| ctx.log(text))
}

fn decorate_with_global_options(base: Runner) -> Runner {
    Arc::new(move |ctx: &CommandContext| {
        let Some(global) = ctx.extension::<GlobalExtension>(GLOBAL_PLUGIN_ID) else {
            return base(ctx);
        };
        if ctx.flag(VERSION_OPTION) {
            return Ok(Some(global.show_version(ctx)));
        }

        let mut sections: Vec<String> = global.show_header(ctx)?.into_iter().collect();
        if ctx.flag(HELP_OPTION) {
            sections.extend(global.show_usage(ctx)?);
            return Ok(join_sections(&sections));
        }
        if let Some(errors) = ctx.validation_error() {
            return global.show_validation_errors(ctx, errors);
        }
        sections.extend(base(ctx)?);
        Ok(join_sections(&sections))
    })
}

fn join_sections(sections: &[String]) -> Option<String> {
    (!sections.is_empty()).then(|| sections.join("\n"))
}

/// Creates the global options plugin.
#[must_use]
pub fn global() -> Plugin {
    plugin(GLOBAL_PLUGIN_ID)
        .name("global options")
        .setup(|ctx| {
            let messages = BuiltinMessages::load();
            ctx.add_global_option(
                HELP_OPTION,
                ArgSchema::boolean()
                    .short('h')
                    .describe(messages.get(BuiltinKey::Help)),
            )?;
            ctx.add_global_option(
                VERSION_OPTION,
                ArgSchema::boolean()
                    .short('v')
                    .describe(messages.get(BuiltinKey::Version)),
            )?;
            ctx.decorate_command(decorate_with_global_options);
            Ok(())
        })
        .extension(|_ctx, command| Ok(GlobalExtension::new(command.command_rendering().clone())))
        .build()
}
