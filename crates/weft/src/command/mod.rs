//! Command definitions and the entries that name them.
//!
//! An [`Entry`] is what callers hand to [`crate::cli`] or register as a
//! sub-command. It is one of three shapes:
//!
//! - [`Entry::Runner`]: a bare runner, wrapped into a minimal [`Command`].
//! - [`Entry::Command`]: a fully described [`Command`].
//! - [`Entry::Lazy`]: a [`LazyCommand`] whose body is produced by a loader
//!   only when it is dispatched.

use std::fmt;
use std::sync::Arc;

use weft_args::ArgSchemas;

use crate::context::CommandContext;
use crate::decorators::{Renderer, ValidationErrorsRenderer};
use crate::error::{BoxError, CliError};
use crate::i18n::Resource;

/// Callable that runs a command and optionally returns its output text.
pub type Runner = Arc<dyn Fn(&CommandContext) -> Result<Option<String>, CliError> + Send + Sync>;

/// Fetches the translation resource of a command for a locale.
pub type ResourceFetcher = Arc<dyn Fn(&str) -> Result<Resource, BoxError> + Send + Sync>;

/// Produces the body of a [`LazyCommand`].
pub type CommandLoader = Arc<dyn Fn() -> Result<LoadedCommand, BoxError> + Send + Sync>;

/// Values a runner closure may return.
pub trait RunOutput {
    /// Converts the value into optional output text.
    fn into_output(self) -> Option<String>;
}

impl RunOutput for () {
    fn into_output(self) -> Option<String> {
        None
    }
}

impl RunOutput for String {
    fn into_output(self) -> Option<String> {
        Some(self)
    }
}

impl RunOutput for &str {
    fn into_output(self) -> Option<String> {
        Some(self.to_owned())
    }
}

impl RunOutput for Option<String> {
    fn into_output(self) -> Option<String> {
        self
    }
}

/// Wraps a user closure into a [`Runner`].
///
/// Errors that are not already a [`CliError`] are reported as
/// [`CliError::Command`] carrying the context's command name.
///
/// # Examples
///
/// ```
/// use weft::runner;
///
/// let run = runner(|ctx| Ok(format!("hello from {}", ctx.name())));
/// # drop(run);
/// ```
#[must_use]
pub fn runner<F, O>(run: F) -> Runner
where
    F: Fn(&CommandContext) -> Result<O, BoxError> + Send + Sync + 'static,
    O: RunOutput,
{
    Arc::new(move |ctx: &CommandContext| {
        run(ctx)
            .map(RunOutput::into_output)
            .map_err(|error| {
                CliError::lift(error, |source| CliError::Command {
                    name: ctx.name().to_owned(),
                    source,
                })
            })
    })
}

/// Runner that does nothing and produces no output.
#[must_use]
pub fn noop_runner() -> Runner {
    Arc::new(|_ctx: &CommandContext| Ok(None))
}

/// Per-command override for one of the renderers.
#[derive(Clone)]
pub enum RenderOption<T> {
    /// Use whatever the CLI options (or the plugin decorators) provide.
    Inherit,
    /// Render nothing.
    Disable,
    /// Use this renderer.
    Use(T),
}

impl<T> Default for RenderOption<T> {
    fn default() -> Self {
        Self::Inherit
    }
}

impl<T> RenderOption<T> {
    /// Returns the renderer to use given the inherited one.
    #[must_use]
    pub fn select(&self, inherited: Option<&T>) -> Option<T>
    where
        T: Clone,
    {
        match self {
            Self::Inherit => inherited.cloned(),
            Self::Disable => None,
            Self::Use(renderer) => Some(renderer.clone()),
        }
    }
}

impl<T> fmt::Debug for RenderOption<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inherit => f.write_str("Inherit"),
            Self::Disable => f.write_str("Disable"),
            Self::Use(_) => f.write_str("Use(<renderer>)"),
        }
    }
}

/// Renderer overrides carried by a command.
#[derive(Clone, Default, Debug)]
pub struct Rendering {
    /// Header renderer override.
    pub header: RenderOption<Renderer>,
    /// Usage renderer override.
    pub usage: RenderOption<Renderer>,
    /// Validation error renderer override.
    pub validation_errors: RenderOption<ValidationErrorsRenderer>,
}

/// A fully described command.
///
/// # Examples
///
/// ```
/// use weft::{ArgSchema, Command};
///
/// let command = Command::named("greet")
///     .description("Say hello")
///     .arg("name", ArgSchema::string().short('n'))
///     .run(|ctx| Ok(format!("hi {}", ctx.value_str("name").unwrap_or("you"))));
///
/// assert_eq!(command.command_name(), Some("greet"));
/// assert!(command.has_runner());
/// ```
#[derive(Clone, Default)]
pub struct Command {
    name: Option<String>,
    description: Option<String>,
    args: ArgSchemas,
    run: Option<Runner>,
    examples: Option<String>,
    resource: Option<ResourceFetcher>,
    to_kebab: bool,
    rendering: Rendering,
}

impl Command {
    /// Creates an unnamed command with no runner.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a command with a name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self::new().name(name)
    }

    /// Sets the name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the description shown in headers and command listings.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Replaces the argument schemas.
    #[must_use]
    pub fn args(mut self, args: ArgSchemas) -> Self {
        self.args = args;
        self
    }

    /// Adds (or replaces) one argument schema.
    #[must_use]
    pub fn arg(mut self, name: impl Into<String>, schema: weft_args::ArgSchema) -> Self {
        self.args.insert(name, schema);
        self
    }

    /// Sets the runner from a closure. See [`runner`].
    #[must_use]
    pub fn run<F, O>(self, run: F) -> Self
    where
        F: Fn(&CommandContext) -> Result<O, BoxError> + Send + Sync + 'static,
        O: RunOutput,
    {
        self.runner(runner(run))
    }

    /// Sets an already wrapped runner.
    #[must_use]
    pub fn runner(mut self, run: Runner) -> Self {
        self.run = Some(run);
        self
    }

    /// Sets the example text shown in usage.
    #[must_use]
    pub fn examples(mut self, examples: impl Into<String>) -> Self {
        self.examples = Some(examples.into());
        self
    }

    /// Sets the per-locale translation resource fetcher.
    #[must_use]
    pub fn resource<F>(mut self, fetch: F) -> Self
    where
        F: Fn(&str) -> Result<Resource, BoxError> + Send + Sync + 'static,
    {
        self.resource = Some(Arc::new(fetch));
        self
    }

    /// Matches every long option of this command in kebab-case.
    #[must_use]
    pub const fn to_kebab(mut self) -> Self {
        self.to_kebab = true;
        self
    }

    /// Replaces the renderer overrides.
    #[must_use]
    pub fn rendering(mut self, rendering: Rendering) -> Self {
        self.rendering = rendering;
        self
    }

    /// Command name, if any.
    #[must_use]
    pub fn command_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Description, if any.
    #[must_use]
    pub fn command_description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Argument schemas.
    #[must_use]
    pub const fn arg_schemas(&self) -> &ArgSchemas {
        &self.args
    }

    /// Runner, if any.
    #[must_use]
    pub fn command_runner(&self) -> Option<&Runner> {
        self.run.as_ref()
    }

    /// Returns `true` when the command has a runner.
    #[must_use]
    pub const fn has_runner(&self) -> bool {
        self.run.is_some()
    }

    /// Example text, if any.
    #[must_use]
    pub fn command_examples(&self) -> Option<&str> {
        self.examples.as_deref()
    }

    /// Translation resource fetcher, if any.
    #[must_use]
    pub fn resource_fetcher(&self) -> Option<&ResourceFetcher> {
        self.resource.as_ref()
    }

    /// Whether long options are matched in kebab-case.
    #[must_use]
    pub const fn is_kebab(&self) -> bool {
        self.to_kebab
    }

    /// Renderer overrides.
    #[must_use]
    pub const fn command_rendering(&self) -> &Rendering {
        &self.rendering
    }

    pub(crate) fn backfill_name(&mut self, name: &str) {
        if self.name.is_none() {
            self.name = Some(name.to_owned());
        }
    }

    /// Fills every field `self` leaves unset from `stub`.
    pub(crate) fn merge_stub(self, stub: &Self) -> Self {
        Self {
            name: self.name.or_else(|| stub.name.clone()),
            description: self.description.or_else(|| stub.description.clone()),
            args: if self.args.is_empty() {
                stub.args.clone()
            } else {
                self.args
            },
            run: self.run,
            examples: self.examples.or_else(|| stub.examples.clone()),
            resource: self.resource.or_else(|| stub.resource.clone()),
            to_kebab: self.to_kebab || stub.to_kebab,
            rendering: self.rendering,
        }
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("args", &self.args)
            .field("run", &self.run.as_ref().map(|_| "<runner>"))
            .field("examples", &self.examples)
            .field("to_kebab", &self.to_kebab)
            .field("rendering", &self.rendering)
            .finish_non_exhaustive()
    }
}

/// Body produced by a [`LazyCommand`] loader.
#[derive(Clone)]
pub enum LoadedCommand {
    /// A bare runner; metadata comes from the lazy stub.
    Runner(Runner),
    /// A full command; its fields win over the stub's.
    Command(Command),
}

impl From<Command> for LoadedCommand {
    fn from(command: Command) -> Self {
        Self::Command(command)
    }
}

/// A command whose body is loaded on first dispatch.
///
/// The stub carries the metadata needed for command listings so the loader
/// only runs when the command is actually invoked.
#[derive(Clone)]
pub struct LazyCommand {
    loader: CommandLoader,
    stub: Command,
}

impl LazyCommand {
    /// Creates a lazy command from a loader.
    #[must_use]
    pub fn new<F>(loader: F) -> Self
    where
        F: Fn() -> Result<LoadedCommand, BoxError> + Send + Sync + 'static,
    {
        Self {
            loader: Arc::new(loader),
            stub: Command::new(),
        }
    }

    /// Sets the command name shown before loading.
    #[must_use]
    pub fn command_name(mut self, name: impl Into<String>) -> Self {
        self.stub = self.stub.name(name);
        self
    }

    /// Sets the description shown before loading.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.stub = self.stub.description(description);
        self
    }

    /// Sets argument schemas used when the loader returns a bare runner.
    #[must_use]
    pub fn args(mut self, args: ArgSchemas) -> Self {
        self.stub = self.stub.args(args);
        self
    }

    /// Sets example text.
    #[must_use]
    pub fn examples(mut self, examples: impl Into<String>) -> Self {
        self.stub = self.stub.examples(examples);
        self
    }

    /// Sets the translation resource fetcher.
    #[must_use]
    pub fn resource<F>(mut self, fetch: F) -> Self
    where
        F: Fn(&str) -> Result<Resource, BoxError> + Send + Sync + 'static,
    {
        self.stub = self.stub.resource(fetch);
        self
    }

    /// Matches every long option in kebab-case.
    #[must_use]
    pub fn to_kebab(mut self) -> Self {
        self.stub = self.stub.to_kebab();
        self
    }

    /// Metadata available without loading.
    #[must_use]
    pub const fn stub(&self) -> &Command {
        &self.stub
    }

    /// Invokes the loader.
    ///
    /// # Errors
    ///
    /// Returns the loader's failure as [`CliError::Command`] unless it
    /// already is a [`CliError`].
    pub fn load(&self) -> Result<LoadedCommand, CliError> {
        (self.loader)().map_err(|error| {
            CliError::lift(error, |source| CliError::Command {
                name: self
                    .stub
                    .command_name()
                    .unwrap_or(crate::context::ANONYMOUS_COMMAND_NAME)
                    .to_owned(),
                source,
            })
        })
    }

    pub(crate) fn backfill_name(&mut self, name: &str) {
        self.stub.backfill_name(name);
    }
}

impl fmt::Debug for LazyCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyCommand")
            .field("stub", &self.stub)
            .finish_non_exhaustive()
    }
}

/// Anything that can be dispatched as a command.
#[derive(Clone)]
pub enum Entry {
    /// Inline runner.
    Runner(Runner),
    /// Loaded on demand.
    Lazy(LazyCommand),
    /// Fully described command.
    Command(Command),
}

impl Entry {
    /// Wraps a closure as an inline runner entry.
    #[must_use]
    pub fn runner<F, O>(run: F) -> Self
    where
        F: Fn(&CommandContext) -> Result<O, BoxError> + Send + Sync + 'static,
        O: RunOutput,
    {
        Self::Runner(runner(run))
    }

    /// Name declared by the entry, if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Runner(_) => None,
            Self::Lazy(lazy) => lazy.stub().command_name(),
            Self::Command(command) => command.command_name(),
        }
    }

    /// Description declared by the entry, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        match self {
            Self::Runner(_) => None,
            Self::Lazy(lazy) => lazy.stub().command_description(),
            Self::Command(command) => command.command_description(),
        }
    }

    /// Translation resource fetcher declared by the entry, if any.
    #[must_use]
    pub fn resource_fetcher(&self) -> Option<&ResourceFetcher> {
        match self {
            Self::Runner(_) => None,
            Self::Lazy(lazy) => lazy.stub().resource_fetcher(),
            Self::Command(command) => command.resource_fetcher(),
        }
    }

    pub(crate) fn backfill_name(&mut self, name: &str) {
        match self {
            Self::Runner(_) => {}
            Self::Lazy(lazy) => lazy.backfill_name(name),
            Self::Command(command) => command.backfill_name(name),
        }
    }
}

impl From<Command> for Entry {
    fn from(command: Command) -> Self {
        Self::Command(command)
    }
}

impl From<LazyCommand> for Entry {
    fn from(lazy: LazyCommand) -> Self {
        Self::Lazy(lazy)
    }
}

impl From<Runner> for Entry {
    fn from(run: Runner) -> Self {
        Self::Runner(run)
    }
}

impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Runner(_) => f.write_str("Runner(<runner>)"),
            Self::Lazy(lazy) => f.debug_tuple("Lazy").field(lazy).finish(),
            Self::Command(command) => f.debug_tuple("Command").field(command).finish(),
        }
    }
}

/// Insertion-ordered map from sub-command name to [`Entry`].
#[derive(Clone, Default, Debug)]
pub struct SubCommands {
    entries: Vec<(String, Entry)>,
}

impl SubCommands {
    /// Creates an empty map.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Inserts or replaces an entry, keeping the original position on replace.
    pub fn insert(&mut self, name: impl Into<String>, entry: impl Into<Entry>) {
        let key: String = name.into();
        let value = entry.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Builder-style [`SubCommands::insert`].
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, entry: impl Into<Entry>) -> Self {
        self.insert(name, entry);
        self
    }

    /// Looks up an entry.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Entry> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, entry)| entry)
    }

    pub(crate) fn get_mut(&mut self, name: &str) -> Option<&mut Entry> {
        self.entries
            .iter_mut()
            .find(|(key, _)| key == name)
            .map(|(_, entry)| entry)
    }

    /// Returns `true` when `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterates entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Entry)> {
        self.entries.iter().map(|(key, entry)| (key.as_str(), entry))
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when the map is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, E: Into<Entry>> FromIterator<(K, E)> for SubCommands {
    fn from_iter<T: IntoIterator<Item = (K, E)>>(iter: T) -> Self {
        let mut commands = Self::new();
        for (name, entry) in iter {
            commands.insert(name, entry);
        }
        commands
    }
}
