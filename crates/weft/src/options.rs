//! Caller-facing configuration for a [`crate::cli`] invocation.

use std::fmt;
use std::io::{self, Write};
use std::sync::Arc;

use tracing::debug;

use crate::command::{Entry, RenderOption, SubCommands};
use crate::context::CommandContext;
use crate::decorators::{Decorators, Renderer, ValidationErrorsRenderer};
use crate::error::{BoxError, CliError};
use crate::i18n::{TranslationAdapter, TranslationAdapterFactory, TranslationAdapterOptions};
use crate::plugin::Plugin;

/// Locale used when none is configured.
pub const DEFAULT_LOCALE: &str = "en-US";

/// Destination for [`CommandContext::log`] output.
pub type LogSink = Arc<dyn Fn(&str) + Send + Sync>;

/// Called before the decorated runner.
pub type BeforeCommandHook = Arc<dyn Fn(&CommandContext) -> Result<(), BoxError> + Send + Sync>;

/// Called after the decorated runner succeeds, with its output.
pub type AfterCommandHook =
    Arc<dyn Fn(&CommandContext, Option<&str>) -> Result<(), BoxError> + Send + Sync>;

/// Called when the before hook or the runner fails.
pub type ErrorCommandHook =
    Arc<dyn Fn(&CommandContext, &CliError) -> Result<(), BoxError> + Send + Sync>;

/// Sink that writes each message as a line on standard output.
#[must_use]
pub fn stdout_sink() -> LogSink {
    Arc::new(|message: &str| {
        let mut out = io::stdout().lock();
        if let Err(error) = writeln!(out, "{message}") {
            debug!(%error, "failed to write command output");
        }
    })
}

/// Lifecycle hooks run around the command.
#[derive(Clone, Default)]
pub struct CommandHooks {
    /// Runs before the runner; a failure skips the runner.
    pub before: Option<BeforeCommandHook>,
    /// Runs after a successful runner.
    pub after: Option<AfterCommandHook>,
    /// Runs on failure; its own failure is logged and ignored.
    pub error: Option<ErrorCommandHook>,
}

impl fmt::Debug for CommandHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandHooks")
            .field("before", &self.before.is_some())
            .field("after", &self.after.is_some())
            .field("error", &self.error.is_some())
            .finish()
    }
}

/// Options accepted by [`crate::cli`].
///
/// # Examples
///
/// ```
/// use weft::{CliOptions, Command};
///
/// let options = CliOptions::new()
///     .name("tool")
///     .version("1.2.3")
///     .sub_command("show", Command::named("show").run(|_ctx| Ok("shown")));
///
/// assert_eq!(options.cli_name(), Some("tool"));
/// assert!(options.sub_commands().contains("show"));
/// ```
#[derive(Clone)]
pub struct CliOptions {
    name: Option<String>,
    description: Option<String>,
    version: Option<String>,
    locale: Option<String>,
    sub_commands: SubCommands,
    left_margin: usize,
    middle_margin: usize,
    usage_option_type: bool,
    usage_option_value: bool,
    usage_silent: bool,
    render_header: RenderOption<Renderer>,
    render_usage: RenderOption<Renderer>,
    render_validation_errors: RenderOption<ValidationErrorsRenderer>,
    plugins: Vec<Plugin>,
    fallback_to_entry: bool,
    hooks: CommandHooks,
    log_sink: LogSink,
    translation_adapter_factory: Option<TranslationAdapterFactory>,
}

impl Default for CliOptions {
    fn default() -> Self {
        Self {
            name: None,
            description: None,
            version: None,
            locale: None,
            sub_commands: SubCommands::new(),
            left_margin: 2,
            middle_margin: 10,
            usage_option_type: false,
            usage_option_value: true,
            usage_silent: false,
            render_header: RenderOption::Inherit,
            render_usage: RenderOption::Inherit,
            render_validation_errors: RenderOption::Inherit,
            plugins: Vec::new(),
            fallback_to_entry: false,
            hooks: CommandHooks::default(),
            log_sink: stdout_sink(),
            translation_adapter_factory: None,
        }
    }
}

impl CliOptions {
    /// Options with every default applied.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the program name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the program description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the program version.
    #[must_use]
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Sets the locale tag, such as `en-US` or `ja-JP`.
    #[must_use]
    pub fn locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    /// Registers one sub-command.
    #[must_use]
    pub fn sub_command(mut self, name: impl Into<String>, entry: impl Into<Entry>) -> Self {
        self.sub_commands.insert(name, entry);
        self
    }

    /// Replaces the sub-command map.
    #[must_use]
    pub fn sub_commands_map(mut self, sub_commands: SubCommands) -> Self {
        self.sub_commands = sub_commands;
        self
    }

    /// Sets the indentation of usage rows.
    #[must_use]
    pub const fn left_margin(mut self, margin: usize) -> Self {
        self.left_margin = margin;
        self
    }

    /// Sets the gap between usage keys and their descriptions.
    #[must_use]
    pub const fn middle_margin(mut self, margin: usize) -> Self {
        self.middle_margin = margin;
        self
    }

    /// Shows `<type>` after value-taking options in usage.
    #[must_use]
    pub const fn usage_option_type(mut self, enabled: bool) -> Self {
        self.usage_option_type = enabled;
        self
    }

    /// Shows defaults and choices after option descriptions in usage.
    #[must_use]
    pub const fn usage_option_value(mut self, enabled: bool) -> Self {
        self.usage_option_value = enabled;
        self
    }

    /// Suppresses [`CommandContext::log`] output.
    #[must_use]
    pub const fn usage_silent(mut self, silent: bool) -> Self {
        self.usage_silent = silent;
        self
    }

    /// Overrides the header renderer.
    #[must_use]
    pub fn render_header(mut self, option: RenderOption<Renderer>) -> Self {
        self.render_header = option;
        self
    }

    /// Overrides the usage renderer.
    #[must_use]
    pub fn render_usage(mut self, option: RenderOption<Renderer>) -> Self {
        self.render_usage = option;
        self
    }

    /// Overrides the validation errors renderer.
    #[must_use]
    pub fn render_validation_errors(
        mut self,
        option: RenderOption<ValidationErrorsRenderer>,
    ) -> Self {
        self.render_validation_errors = option;
        self
    }

    /// Adds a plugin after the built-in ones.
    #[must_use]
    pub fn plugin(mut self, plugin: Plugin) -> Self {
        self.plugins.push(plugin);
        self
    }

    /// Adds several plugins.
    #[must_use]
    pub fn plugins(mut self, plugins: impl IntoIterator<Item = Plugin>) -> Self {
        self.plugins.extend(plugins);
        self
    }

    /// Dispatches unknown sub-command names to the entry instead of failing.
    #[must_use]
    pub const fn fallback_to_entry(mut self, enabled: bool) -> Self {
        self.fallback_to_entry = enabled;
        self
    }

    /// Sets the hook run before the command.
    #[must_use]
    pub fn on_before_command<F>(mut self, hook: F) -> Self
    where
        F: Fn(&CommandContext) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.hooks.before = Some(Arc::new(hook));
        self
    }

    /// Sets the hook run after a successful command.
    #[must_use]
    pub fn on_after_command<F>(mut self, hook: F) -> Self
    where
        F: Fn(&CommandContext, Option<&str>) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.hooks.after = Some(Arc::new(hook));
        self
    }

    /// Sets the hook run when the command fails.
    #[must_use]
    pub fn on_error_command<F>(mut self, hook: F) -> Self
    where
        F: Fn(&CommandContext, &CliError) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.hooks.error = Some(Arc::new(hook));
        self
    }

    /// Redirects [`CommandContext::log`] output.
    #[must_use]
    pub fn log_sink<F>(mut self, sink: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.log_sink = Arc::new(sink);
        self
    }

    /// Sets the translation adapter factory used by the i18n plugin.
    #[must_use]
    pub fn translation_adapter_factory<F>(mut self, factory: F) -> Self
    where
        F: Fn(&TranslationAdapterOptions) -> Box<dyn TranslationAdapter> + Send + Sync + 'static,
    {
        self.translation_adapter_factory = Some(Arc::new(factory));
        self
    }

    /// Program name.
    #[must_use]
    pub fn cli_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Program description.
    #[must_use]
    pub fn cli_description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Program version.
    #[must_use]
    pub fn cli_version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Configured locale, or [`DEFAULT_LOCALE`].
    #[must_use]
    pub fn cli_locale(&self) -> &str {
        self.locale.as_deref().unwrap_or(DEFAULT_LOCALE)
    }

    /// Registered sub-commands.
    #[must_use]
    pub const fn sub_commands(&self) -> &SubCommands {
        &self.sub_commands
    }

    /// Plugins supplied by the caller.
    #[must_use]
    pub fn caller_plugins(&self) -> &[Plugin] {
        &self.plugins
    }

    /// Whether unknown sub-commands fall back to the entry.
    #[must_use]
    pub const fn falls_back_to_entry(&self) -> bool {
        self.fallback_to_entry
    }

    pub(crate) const fn layout(&self) -> UsageLayout {
        UsageLayout {
            left_margin: self.left_margin,
            middle_margin: self.middle_margin,
            option_type: self.usage_option_type,
            option_value: self.usage_option_value,
            silent: self.usage_silent,
        }
    }

    pub(crate) const fn hooks(&self) -> &CommandHooks {
        &self.hooks
    }

    pub(crate) fn log_sink_handle(&self) -> LogSink {
        Arc::clone(&self.log_sink)
    }

    pub(crate) fn adapter_factory(&self) -> Option<TranslationAdapterFactory> {
        self.translation_adapter_factory.clone()
    }

    pub(crate) fn renderers(&self) -> Renderers {
        Renderers {
            header: self.render_header.select(None),
            usage: self.render_usage.select(None),
            validation_errors: self.render_validation_errors.select(None),
        }
    }

    /// Fills every inherited renderer with the plugin-composed chain.
    pub(crate) fn resolve_renderers(&mut self, decorators: &Decorators) {
        if matches!(self.render_header, RenderOption::Inherit) {
            self.render_header = RenderOption::Use(decorators.header_renderer());
        }
        if matches!(self.render_usage, RenderOption::Inherit) {
            self.render_usage = RenderOption::Use(decorators.usage_renderer());
        }
        if matches!(self.render_validation_errors, RenderOption::Inherit) {
            self.render_validation_errors =
                RenderOption::Use(decorators.validation_errors_renderer());
        }
    }

    pub(crate) fn replace_sub_commands(&mut self, sub_commands: SubCommands) {
        self.sub_commands = sub_commands;
    }
}

impl fmt::Debug for CliOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CliOptions")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("version", &self.version)
            .field("locale", &self.locale)
            .field("sub_commands", &self.sub_commands)
            .field("layout", &self.layout())
            .field("render_header", &self.render_header)
            .field("render_usage", &self.render_usage)
            .field("render_validation_errors", &self.render_validation_errors)
            .field("plugins", &self.plugins.len())
            .field("fallback_to_entry", &self.fallback_to_entry)
            .field("hooks", &self.hooks)
            .finish_non_exhaustive()
    }
}

/// Usage layout settings copied into the command environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsageLayout {
    /// Indentation of usage rows.
    pub left_margin: usize,
    /// Gap between keys and descriptions.
    pub middle_margin: usize,
    /// Show `<type>` after value-taking options.
    pub option_type: bool,
    /// Show defaults and choices.
    pub option_value: bool,
    /// Suppress context logging.
    pub silent: bool,
}

#[derive(Clone, Default)]
pub(crate) struct Renderers {
    pub(crate) header: Option<Renderer>,
    pub(crate) usage: Option<Renderer>,
    pub(crate) validation_errors: Option<ValidationErrorsRenderer>,
}
