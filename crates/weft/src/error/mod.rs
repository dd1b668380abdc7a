//! Errors raised while loading plugins and dispatching commands.
//!
//! Framework failures are variants of [`CliError`]. User-supplied callbacks
//! (runners, setups, extension factories, hooks, loaders) return [`BoxError`]
//! so application code can use `?` on any error type; [`CliError::lift`]
//! folds those back, passing through anything that already is a
//! [`CliError`].
//!
//! Argument validation failures are not errors here: they travel as data on
//! the command context and are rendered by the built-in global plugin.

use thiserror::Error;

/// Error type returned by user-supplied callbacks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors arising from plugin loading and command dispatch.
#[derive(Debug, Error)]
pub enum CliError {
    /// An argument passed to a registration API was malformed.
    #[error("{message}")]
    InvalidArgument {
        /// Human-readable description of the problem.
        message: String,
    },

    /// A global option with the same name was already registered.
    #[error("Global option '{name}' is already registered")]
    DuplicateOption {
        /// Option name.
        name: String,
    },

    /// A sub-command with the same name was already registered.
    #[error("Command '{name}' is already registered")]
    DuplicateCommand {
        /// Command name.
        name: String,
    },

    /// A plugin declared a required dependency that is not installed.
    #[error("Missing required dependency: `{dependency}` on `{plugin}`")]
    MissingDependency {
        /// Identifier of the missing plugin.
        dependency: String,
        /// Identifier of the plugin that requires it.
        plugin: String,
    },

    /// Plugin dependencies form a cycle.
    #[error("Circular dependency detected: `{chain}`")]
    CircularDependency {
        /// Visit path joined with `" -> "`, ending with the repeated id.
        chain: String,
    },

    /// Neither a sub-command nor the entry matched the invocation.
    #[error("Command not found: {name}")]
    CommandNotFound {
        /// Requested command name.
        name: String,
    },

    /// A lazily loaded command has no runner.
    #[error("'run' is required in command: {name}")]
    InvalidCommand {
        /// Command name, or the anonymous placeholder.
        name: String,
    },

    /// A plugin's setup callback failed.
    #[error("plugin '{plugin}' setup failed: {source}")]
    Setup {
        /// Plugin identifier.
        plugin: String,
        /// Underlying failure.
        source: BoxError,
    },

    /// A plugin's extension factory or extension hook failed.
    #[error("extension '{plugin}' failed: {source}")]
    Extension {
        /// Plugin identifier.
        plugin: String,
        /// Underlying failure.
        source: BoxError,
    },

    /// A lifecycle hook supplied through the CLI options failed.
    #[error("{hook} hook failed: {source}")]
    Hook {
        /// Hook name.
        hook: &'static str,
        /// Underlying failure.
        source: BoxError,
    },

    /// A command runner or lazy loader failed.
    #[error("command '{name}' failed: {source}")]
    Command {
        /// Command name.
        name: String,
        /// Underlying failure.
        source: BoxError,
    },

    /// A renderer could not produce its text.
    #[error("render failed: {message}")]
    Render {
        /// Description of the failure.
        message: String,
    },

    /// A translation resource could not be loaded.
    #[error("translation failed: {message}")]
    Translation {
        /// Description of the failure.
        message: String,
    },
}

impl CliError {
    /// Converts a callback error, keeping it as-is when it already is a
    /// [`CliError`] and applying `wrap` otherwise.
    ///
    /// # Examples
    ///
    /// ```
    /// use weft::{BoxError, CliError};
    ///
    /// let inner: BoxError = Box::new(CliError::CommandNotFound { name: "x".into() });
    /// let lifted = CliError::lift(inner, |source| CliError::Command {
    ///     name: "outer".into(),
    ///     source,
    /// });
    /// assert!(matches!(lifted, CliError::CommandNotFound { .. }));
    /// ```
    #[must_use]
    pub fn lift(error: BoxError, wrap: impl FnOnce(BoxError) -> Self) -> Self {
        match error.downcast::<Self>() {
            Ok(cli) => *cli,
            Err(other) => wrap(other),
        }
    }

    /// Shorthand for [`CliError::InvalidArgument`].
    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }
}
