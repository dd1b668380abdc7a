//! Declarative command-line framework with a plugin pipeline.
//!
//! A CLI is an entry [`Command`] plus optional sub-commands, handed to
//! [`cli`] together with [`CliOptions`]. Every invocation builds its own
//! pipeline from scratch:
//!
//! 1. Plugins (the built-in `weft:global` and `weft:renderer`, then the
//!    caller's) are ordered by their declared dependencies.
//! 2. Each plugin's setup registers global options, sub-commands and
//!    decorators on a [`PluginContext`].
//! 3. The sub-command named by the first argument (or the entry) is
//!    selected, lazy commands are loaded, and arguments are resolved against
//!    the global options overlaid by the command's own schemas.
//! 4. An immutable [`CommandContext`] is built, each plugin attaching its
//!    extension in plugin order.
//! 5. The runner, wrapped by every command decorator (last registered
//!    outermost), runs between the lifecycle hooks.
//!
//! # Example
//!
//! ```
//! use weft::{ArgSchema, CliOptions, Command, cli, plugin};
//!
//! let shout = plugin("shout").setup(|ctx| {
//!     ctx.decorate_command(|base| {
//!         weft::runner(move |command_ctx| {
//!             Ok(base(command_ctx)?.map(|text| text.to_uppercase()))
//!         })
//!     });
//!     Ok(())
//! });
//!
//! let greet = Command::named("greet")
//!     .arg("name", ArgSchema::string().short('n'))
//!     .run(|ctx| Ok(format!("hello {}", ctx.value_str("name").unwrap_or("world"))));
//!
//! let options = CliOptions::new().usage_silent(true).plugin(shout.build());
//! let output = cli(["-n", "kim"], greet, options).expect("dispatch");
//! assert_eq!(output.as_deref(), Some("HELLO KIM"));
//! ```

pub mod cli;
pub mod command;
pub mod context;
pub mod decorators;
pub mod dependency;
pub mod error;
pub mod i18n;
pub mod localizer;
pub mod options;
pub mod plugin;
pub mod plugins;
pub mod render;
pub mod resolver;

#[cfg(test)]
mod test_support;
#[cfg(test)]
mod tests;

pub use weft_args::{
    ArgKind, ArgResolveError, ArgResolveErrorKind, ArgResolveErrors, ArgSchema, ArgSchemas,
    ArgToken, ArgValue, ArgValues,
};

pub use self::cli::cli;
pub use self::command::{
    Command, Entry, LazyCommand, LoadedCommand, RenderOption, Rendering, RunOutput, Runner,
    SubCommands, runner,
};
pub use self::context::{CallMode, CommandContext, CommandEnvironment, Extensions};
pub use self::decorators::{Renderer, ValidationErrorsRenderer};
pub use self::dependency::resolve_dependencies;
pub use self::error::{BoxError, CliError};
pub use self::options::CliOptions;
pub use self::plugin::{Plugin, PluginBuilder, PluginContext, PluginDependency, plugin};
