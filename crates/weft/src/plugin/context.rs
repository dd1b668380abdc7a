//! Mutable registration surface handed to plugin setup callbacks.

use tracing::debug;
use weft_args::{ArgResolveErrors, ArgSchema, ArgSchemas};

use crate::command::{Entry, Runner, SubCommands};
use crate::context::CommandContext;
use crate::decorators::{Decorators, Renderer, ValidationErrorsRenderer};
use crate::error::CliError;

/// What plugins registered during setup.
#[derive(Debug, Clone, Default)]
pub struct PluginRegistrations {
    /// Global options, merged under every command's own arguments.
    pub global_options: ArgSchemas,
    /// Renderer and command decorators.
    pub decorators: Decorators,
    /// Sub-commands, including those added by plugins.
    pub sub_commands: SubCommands,
}

/// Registration API available while plugins are set up.
///
/// # Examples
///
/// ```
/// use weft::{ArgSchema, PluginContext, SubCommands};
///
/// let mut ctx = PluginContext::new(SubCommands::new());
/// ctx.add_global_option("debug", ArgSchema::boolean()).expect("register");
/// assert!(ctx.has_global_option("debug"));
/// assert!(ctx.add_global_option("debug", ArgSchema::boolean()).is_err());
/// ```
#[derive(Debug)]
pub struct PluginContext {
    registrations: PluginRegistrations,
}

impl PluginContext {
    /// Starts from a copy of the caller's sub-commands.
    #[must_use]
    pub fn new(sub_commands: SubCommands) -> Self {
        Self {
            registrations: PluginRegistrations {
                sub_commands,
                ..PluginRegistrations::default()
            },
        }
    }

    /// Registers an option accepted by every command.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::InvalidArgument`] for an empty name and
    /// [`CliError::DuplicateOption`] when the name is taken.
    pub fn add_global_option(
        &mut self,
        name: impl Into<String>,
        schema: ArgSchema,
    ) -> Result<(), CliError> {
        let key: String = name.into();
        if key.is_empty() {
            return Err(CliError::invalid_argument(
                "Option name must be a non-empty string",
            ));
        }
        if self.registrations.global_options.contains_key(&key) {
            return Err(CliError::DuplicateOption { name: key });
        }
        self.registrations.global_options.insert(key, schema);
        Ok(())
    }

    /// Global options registered so far.
    #[must_use]
    pub const fn global_options(&self) -> &ArgSchemas {
        &self.registrations.global_options
    }

    /// Returns `true` when `name` is a registered global option.
    #[must_use]
    pub fn has_global_option(&self, name: &str) -> bool {
        self.registrations.global_options.contains_key(name)
    }

    /// Registers a sub-command.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::InvalidArgument`] for an empty name and
    /// [`CliError::DuplicateCommand`] when the name is taken.
    pub fn add_command(
        &mut self,
        name: impl Into<String>,
        entry: impl Into<Entry>,
    ) -> Result<(), CliError> {
        let key: String = name.into();
        if key.is_empty() {
            return Err(CliError::invalid_argument(
                "Command name must be a non-empty string",
            ));
        }
        if self.registrations.sub_commands.contains(&key) {
            return Err(CliError::DuplicateCommand { name: key });
        }
        let mut value = entry.into();
        value.backfill_name(&key);
        self.registrations.sub_commands.insert(key, value);
        Ok(())
    }

    /// Returns `true` when `name` is a registered sub-command.
    #[must_use]
    pub fn has_command(&self, name: &str) -> bool {
        self.registrations.sub_commands.contains(name)
    }

    /// Sub-commands registered so far.
    #[must_use]
    pub const fn sub_commands(&self) -> &SubCommands {
        &self.registrations.sub_commands
    }

    /// Wraps the header renderer.
    pub fn decorate_header_renderer<F>(&mut self, decorator: F)
    where
        F: Fn(&Renderer, &CommandContext) -> Result<String, CliError> + Send + Sync + 'static,
    {
        self.registrations.decorators.add_header_decorator(decorator);
    }

    /// Wraps the usage renderer.
    pub fn decorate_usage_renderer<F>(&mut self, decorator: F)
    where
        F: Fn(&Renderer, &CommandContext) -> Result<String, CliError> + Send + Sync + 'static,
    {
        self.registrations.decorators.add_usage_decorator(decorator);
    }

    /// Wraps the validation errors renderer.
    pub fn decorate_validation_errors_renderer<F>(&mut self, decorator: F)
    where
        F: Fn(&ValidationErrorsRenderer, &CommandContext, &ArgResolveErrors) -> Result<String, CliError>
            + Send
            + Sync
            + 'static,
    {
        self.registrations
            .decorators
            .add_validation_errors_decorator(decorator);
    }

    /// Wraps every command runner.
    pub fn decorate_command<F>(&mut self, decorator: F)
    where
        F: Fn(Runner) -> Runner + Send + Sync + 'static,
    {
        self.registrations.decorators.add_command_decorator(decorator);
    }

    /// Ends setup and returns everything that was registered.
    #[must_use]
    pub fn finish(self) -> PluginRegistrations {
        debug!(
            global_options = self.registrations.global_options.len(),
            sub_commands = self.registrations.sub_commands.len(),
            decorators = ?self.registrations.decorators,
            "plugin setup finished"
        );
        self.registrations
    }
}
