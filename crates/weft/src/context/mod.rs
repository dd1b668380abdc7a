//! The immutable context a command runs with.
//!
//! [`create_command_context`] assembles a [`CommandContext`] from the
//! resolved arguments, the command and the CLI options, then lets each plugin
//! extension attach its object in plugin order. Extension factories receive
//! the context built so far, so a later extension can read an earlier one.
//! Once returned, the context is shared behind an [`Arc`] and never mutated.

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use strum::Display;
use tracing::debug;
use weft_args::{ArgResolveErrors, ArgSchemas, ArgToken, ArgValue, ArgValues, ResolvedArgs};

use crate::command::{Command, SubCommands};
use crate::decorators::{Renderer, ValidationErrorsRenderer};
use crate::error::CliError;
use crate::i18n::TranslationAdapterFactory;
use crate::options::{CliOptions, CommandHooks, LogSink, UsageLayout};
use crate::plugin::PluginExtension;

/// Name reported for commands that do not declare one.
pub const ANONYMOUS_COMMAND_NAME: &str = "(anonymous)";

/// How the running command was selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize)]
#[strum(serialize_all = "camelCase")]
#[serde(rename_all = "camelCase")]
pub enum CallMode {
    /// The entry command ran.
    Entry,
    /// A registered sub-command ran.
    SubCommand,
    /// The first positional named no known sub-command.
    Unexpected,
}

/// Extension objects keyed by plugin id, in plugin order.
#[derive(Clone, Default)]
pub struct Extensions {
    entries: Vec<(String, Arc<dyn Any + Send + Sync>)>,
}

impl Extensions {
    /// Returns the extension registered under `id` when it has type `T`.
    #[must_use]
    pub fn get<T: Any>(&self, id: &str) -> Option<&T> {
        self.entries
            .iter()
            .find(|(key, _)| key == id)
            .and_then(|(_, object)| {
                let erased: &(dyn Any + Send + Sync) = object.as_ref();
                erased.downcast_ref::<T>()
            })
    }

    /// Returns `true` when an extension is registered under `id`.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.entries.iter().any(|(key, _)| key == id)
    }

    /// Plugin ids in registration order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    /// Number of extensions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when no extension is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn insert(&mut self, id: String, object: Arc<dyn Any + Send + Sync>) {
        match self.entries.iter_mut().find(|(key, _)| *key == id) {
            Some((_, slot)) => *slot = object,
            None => self.entries.push((id, object)),
        }
    }
}

impl fmt::Debug for Extensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.ids()).finish()
    }
}

/// Program-level settings visible to every command.
#[derive(Clone)]
pub struct CommandEnvironment {
    name: Option<String>,
    description: Option<String>,
    version: Option<String>,
    locale: String,
    layout: UsageLayout,
    sub_commands: SubCommands,
    render_header: Option<Renderer>,
    render_usage: Option<Renderer>,
    render_validation_errors: Option<ValidationErrorsRenderer>,
    hooks: CommandHooks,
    log_sink: LogSink,
    translation_adapter_factory: Option<TranslationAdapterFactory>,
}

impl CommandEnvironment {
    /// Builds the environment from CLI options.
    #[must_use]
    pub fn from_options(options: &CliOptions) -> Self {
        let renderers = options.renderers();
        Self {
            name: options.cli_name().map(str::to_owned),
            description: options.cli_description().map(str::to_owned),
            version: options.cli_version().map(str::to_owned),
            locale: options.cli_locale().to_owned(),
            layout: options.layout(),
            sub_commands: options.sub_commands().clone(),
            render_header: renderers.header,
            render_usage: renderers.usage,
            render_validation_errors: renderers.validation_errors,
            hooks: options.hooks().clone(),
            log_sink: options.log_sink_handle(),
            translation_adapter_factory: options.adapter_factory(),
        }
    }

    /// Program name.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Program description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Program version.
    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Locale tag.
    #[must_use]
    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// Usage layout settings.
    #[must_use]
    pub const fn layout(&self) -> UsageLayout {
        self.layout
    }

    /// Registered sub-commands, including plugin-added ones.
    #[must_use]
    pub const fn sub_commands(&self) -> &SubCommands {
        &self.sub_commands
    }

    /// Effective header renderer.
    #[must_use]
    pub fn render_header(&self) -> Option<&Renderer> {
        self.render_header.as_ref()
    }

    /// Effective usage renderer.
    #[must_use]
    pub fn render_usage(&self) -> Option<&Renderer> {
        self.render_usage.as_ref()
    }

    /// Effective validation errors renderer.
    #[must_use]
    pub fn render_validation_errors(&self) -> Option<&ValidationErrorsRenderer> {
        self.render_validation_errors.as_ref()
    }

    /// Lifecycle hooks.
    #[must_use]
    pub const fn hooks(&self) -> &CommandHooks {
        &self.hooks
    }

    /// Translation adapter factory configured on the CLI options.
    #[must_use]
    pub fn translation_adapter_factory(&self) -> Option<&TranslationAdapterFactory> {
        self.translation_adapter_factory.as_ref()
    }
}

impl fmt::Debug for CommandEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandEnvironment")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("version", &self.version)
            .field("locale", &self.locale)
            .field("layout", &self.layout)
            .field("sub_commands", &self.sub_commands)
            .field("hooks", &self.hooks)
            .finish_non_exhaustive()
    }
}

/// Everything a command runner can observe.
pub struct CommandContext {
    name: Option<String>,
    description: Option<String>,
    env: CommandEnvironment,
    args: ArgSchemas,
    values: ArgValues,
    explicit: BTreeMap<String, bool>,
    positionals: Vec<String>,
    rest: Vec<String>,
    argv: Vec<String>,
    tokens: Vec<ArgToken>,
    omitted: bool,
    call_mode: CallMode,
    to_kebab: bool,
    validation_error: Option<ArgResolveErrors>,
    extensions: Extensions,
}

impl CommandContext {
    /// Command name, or [`ANONYMOUS_COMMAND_NAME`].
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or(ANONYMOUS_COMMAND_NAME)
    }

    /// Command name as declared.
    #[must_use]
    pub fn command_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Command description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Program environment.
    #[must_use]
    pub const fn env(&self) -> &CommandEnvironment {
        &self.env
    }

    /// Effective schemas: global options overlaid by the command's own.
    #[must_use]
    pub const fn args(&self) -> &ArgSchemas {
        &self.args
    }

    /// Resolved values.
    #[must_use]
    pub const fn values(&self) -> &ArgValues {
        &self.values
    }

    /// Resolved value of one argument.
    #[must_use]
    pub fn value(&self, name: &str) -> Option<&ArgValue> {
        self.values.get(name)
    }

    /// Resolved text of one string-like argument.
    #[must_use]
    pub fn value_str(&self, name: &str) -> Option<&str> {
        self.value(name).and_then(ArgValue::as_str)
    }

    /// Returns `true` when a boolean argument resolved to `true`.
    #[must_use]
    pub fn flag(&self, name: &str) -> bool {
        self.value(name).and_then(ArgValue::as_bool).unwrap_or(false)
    }

    /// Explicitness of every schema key.
    #[must_use]
    pub const fn explicit(&self) -> &BTreeMap<String, bool> {
        &self.explicit
    }

    /// Returns `true` when the user typed the argument.
    #[must_use]
    pub fn is_explicit(&self, name: &str) -> bool {
        self.explicit.get(name).copied().unwrap_or(false)
    }

    /// Positional texts before `--`.
    #[must_use]
    pub fn positionals(&self) -> &[String] {
        &self.positionals
    }

    /// Texts after `--`.
    #[must_use]
    pub fn rest(&self) -> &[String] {
        &self.rest
    }

    /// Raw argv the CLI was invoked with.
    #[must_use]
    pub fn argv(&self) -> &[String] {
        &self.argv
    }

    /// Tokens produced from argv.
    #[must_use]
    pub fn tokens(&self) -> &[ArgToken] {
        &self.tokens
    }

    /// Returns `true` when no sub-command token was given.
    #[must_use]
    pub const fn omitted(&self) -> bool {
        self.omitted
    }

    /// How this command was selected.
    #[must_use]
    pub const fn call_mode(&self) -> CallMode {
        self.call_mode
    }

    /// Whether long options were matched in kebab-case.
    #[must_use]
    pub const fn to_kebab(&self) -> bool {
        self.to_kebab
    }

    /// Argument validation failures, if any.
    #[must_use]
    pub const fn validation_error(&self) -> Option<&ArgResolveErrors> {
        self.validation_error.as_ref()
    }

    /// Every attached extension.
    #[must_use]
    pub const fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    /// Extension object of plugin `id`, typed.
    #[must_use]
    pub fn extension<T: Any>(&self, id: &str) -> Option<&T> {
        self.extensions.get(id)
    }

    /// Writes `message` to the configured sink unless usage is silenced.
    pub fn log(&self, message: &str) {
        if self.env.layout.silent {
            return;
        }
        (self.env.log_sink)(message);
    }
}

impl fmt::Debug for CommandContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandContext")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("env", &self.env)
            .field("values", &self.values)
            .field("positionals", &self.positionals)
            .field("rest", &self.rest)
            .field("argv", &self.argv)
            .field("omitted", &self.omitted)
            .field("call_mode", &self.call_mode)
            .field("validation_error", &self.validation_error)
            .field("extensions", &self.extensions)
            .finish_non_exhaustive()
    }
}

/// Inputs of [`create_command_context`].
pub struct CommandContextParams<'a> {
    /// Effective argument schemas.
    pub args: ArgSchemas,
    /// Output of argument resolution.
    pub resolved: ResolvedArgs,
    /// Raw argv.
    pub argv: Vec<String>,
    /// Tokens produced from argv.
    pub tokens: Vec<ArgToken>,
    /// Whether no sub-command token was given.
    pub omitted: bool,
    /// How the command was selected.
    pub call_mode: CallMode,
    /// The command being run.
    pub command: &'a Command,
    /// Plugin extensions, in plugin order.
    pub extensions: &'a [(String, PluginExtension)],
    /// Effective CLI options.
    pub cli_options: &'a CliOptions,
}

/// Builds the context for one command invocation.
///
/// # Errors
///
/// Returns [`CliError::Extension`] when an extension factory or its
/// `on_extension` hook fails.
pub fn create_command_context(
    params: CommandContextParams<'_>,
) -> Result<Arc<CommandContext>, CliError> {
    let CommandContextParams {
        args,
        resolved,
        argv,
        tokens,
        omitted,
        call_mode,
        command,
        extensions,
        cli_options,
    } = params;

    let mut context = CommandContext {
        name: command.command_name().map(str::to_owned),
        description: command.command_description().map(str::to_owned),
        env: CommandEnvironment::from_options(cli_options),
        args,
        values: resolved.values,
        explicit: resolved.explicit,
        positionals: resolved.positionals,
        rest: resolved.rest,
        argv,
        tokens,
        omitted,
        call_mode,
        to_kebab: command.is_kebab(),
        validation_error: resolved.error,
        extensions: Extensions::default(),
    };

    for (id, extension) in extensions {
        debug!(plugin = %id, command = context.name(), "building extension");
        let object = extension.build(&context, command).map_err(|source| {
            CliError::lift(source, |wrapped| CliError::Extension {
                plugin: id.clone(),
                source: wrapped,
            })
        })?;
        context.extensions.insert(id.clone(), object);
        extension.notify(&context, command).map_err(|source| {
            CliError::lift(source, |wrapped| CliError::Extension {
                plugin: id.clone(),
                source: wrapped,
            })
        })?;
    }

    Ok(Arc::new(context))
}
