//! Registries of renderer and command decorators contributed by plugins.
//!
//! Decorators are stored in registration order and composed by folding from
//! first to last: every layer wraps the one before it, so the most recently
//! registered decorator ends up outermost and runs first. The same
//! [`wrap_layers`] fold builds the three renderer chains and the command
//! chain.

use std::fmt;
use std::sync::Arc;

use weft_args::ArgResolveErrors;

use crate::command::Runner;
use crate::context::CommandContext;
use crate::error::CliError;

/// Renders header or usage text for a command context.
pub type Renderer = Arc<dyn Fn(&CommandContext) -> Result<String, CliError> + Send + Sync>;

/// Renders validation errors for a command context.
pub type ValidationErrorsRenderer =
    Arc<dyn Fn(&CommandContext, &ArgResolveErrors) -> Result<String, CliError> + Send + Sync>;

/// Decorates a [`Renderer`]; receives the renderer it wraps.
pub type RendererDecorator =
    Arc<dyn Fn(&Renderer, &CommandContext) -> Result<String, CliError> + Send + Sync>;

/// Decorates a [`ValidationErrorsRenderer`]; receives the renderer it wraps.
pub type ValidationErrorsDecorator = Arc<
    dyn Fn(&ValidationErrorsRenderer, &CommandContext, &ArgResolveErrors) -> Result<String, CliError>
        + Send
        + Sync,
>;

/// Wraps a command [`Runner`] in another.
pub type CommandDecorator = Arc<dyn Fn(Runner) -> Runner + Send + Sync>;

/// Folds `layers` around `base`, first to last.
///
/// The last layer is outermost.
///
/// # Examples
///
/// ```
/// use weft::decorators::wrap_layers;
///
/// let wrapped = wrap_layers(String::from("x"), [
///     |inner: String| format!("[a {inner}]"),
///     |inner: String| format!("[b {inner}]"),
/// ]);
/// assert_eq!(wrapped, "[b [a x]]");
/// ```
pub fn wrap_layers<T, L>(base: T, layers: impl IntoIterator<Item = L>) -> T
where
    L: FnOnce(T) -> T,
{
    layers.into_iter().fold(base, |inner, layer| layer(inner))
}

/// Renderer that always yields an empty string.
#[must_use]
pub fn empty_renderer() -> Renderer {
    Arc::new(|_ctx: &CommandContext| Ok(String::new()))
}

/// Validation errors renderer that always yields an empty string.
#[must_use]
pub fn empty_validation_errors_renderer() -> ValidationErrorsRenderer {
    Arc::new(|_ctx: &CommandContext, _errors: &ArgResolveErrors| Ok(String::new()))
}

fn chain_renderer(decorators: &[RendererDecorator]) -> Renderer {
    wrap_layers(
        empty_renderer(),
        decorators.iter().map(|decorator| {
            let layer = Arc::clone(decorator);
            move |inner: Renderer| -> Renderer {
                Arc::new(move |ctx: &CommandContext| layer(&inner, ctx))
            }
        }),
    )
}

/// Ordered decorator lists, one per decoration point.
#[derive(Clone, Default)]
pub struct Decorators {
    header: Vec<RendererDecorator>,
    usage: Vec<RendererDecorator>,
    validation_errors: Vec<ValidationErrorsDecorator>,
    command: Vec<CommandDecorator>,
}

impl Decorators {
    /// Creates empty registries.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a header renderer decorator.
    pub fn add_header_decorator<F>(&mut self, decorator: F)
    where
        F: Fn(&Renderer, &CommandContext) -> Result<String, CliError> + Send + Sync + 'static,
    {
        self.header.push(Arc::new(decorator));
    }

    /// Appends a usage renderer decorator.
    pub fn add_usage_decorator<F>(&mut self, decorator: F)
    where
        F: Fn(&Renderer, &CommandContext) -> Result<String, CliError> + Send + Sync + 'static,
    {
        self.usage.push(Arc::new(decorator));
    }

    /// Appends a validation errors renderer decorator.
    pub fn add_validation_errors_decorator<F>(&mut self, decorator: F)
    where
        F: Fn(&ValidationErrorsRenderer, &CommandContext, &ArgResolveErrors) -> Result<String, CliError>
            + Send
            + Sync
            + 'static,
    {
        self.validation_errors.push(Arc::new(decorator));
    }

    /// Appends a command decorator.
    pub fn add_command_decorator<F>(&mut self, decorator: F)
    where
        F: Fn(Runner) -> Runner + Send + Sync + 'static,
    {
        self.command.push(Arc::new(decorator));
    }

    /// Header renderer composed over an empty base.
    #[must_use]
    pub fn header_renderer(&self) -> Renderer {
        chain_renderer(&self.header)
    }

    /// Usage renderer composed over an empty base.
    #[must_use]
    pub fn usage_renderer(&self) -> Renderer {
        chain_renderer(&self.usage)
    }

    /// Validation errors renderer composed over an empty base.
    #[must_use]
    pub fn validation_errors_renderer(&self) -> ValidationErrorsRenderer {
        wrap_layers(
            empty_validation_errors_renderer(),
            self.validation_errors.iter().map(|decorator| {
                let layer = Arc::clone(decorator);
                move |inner: ValidationErrorsRenderer| -> ValidationErrorsRenderer {
                    Arc::new(move |ctx: &CommandContext, errors: &ArgResolveErrors| {
                        layer(&inner, ctx, errors)
                    })
                }
            }),
        )
    }

    /// Copy of the registered command decorators, in registration order.
    #[must_use]
    pub fn command_decorators(&self) -> Vec<CommandDecorator> {
        self.command.clone()
    }

    /// Wraps `base` in every command decorator.
    #[must_use]
    pub fn decorate_runner(&self, base: Runner) -> Runner {
        wrap_layers(base, self.command.iter().map(|decorator| &**decorator))
    }
}

impl fmt::Debug for Decorators {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Decorators")
            .field("header", &self.header.len())
            .field("usage", &self.usage.len())
            .field("validation_errors", &self.validation_errors.len())
            .field("command", &self.command.len())
            .finish()
    }
}

#[cfg(test)]
mod tests;
