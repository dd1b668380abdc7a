//! Plugin definitions.
//!
//! A [`Plugin`] contributes to a CLI in two phases. During setup it receives
//! a mutable [`PluginContext`] and may register global options, sub-commands
//! and decorators. During dispatch its optional extension factory builds a
//! typed object that is attached to the [`CommandContext`] under the plugin
//! id, where runners and other plugins retrieve it with
//! [`CommandContext::extension`].
//!
//! # Example
//!
//! ```
//! use weft::{ArgSchema, CommandContext, plugin};
//!
//! struct Counter;
//!
//! let counter = plugin("counter")
//!     .name("counter")
//!     .setup(|ctx| {
//!         ctx.add_global_option("count", ArgSchema::number())?;
//!         Ok(())
//!     })
//!     .extension(|_ctx: &CommandContext, _command| Ok(Counter))
//!     .build();
//!
//! assert_eq!(counter.id(), Some("counter"));
//! ```

mod context;

use std::any::Any;
use std::fmt;
use std::sync::Arc;

pub use self::context::{PluginContext, PluginRegistrations};
use crate::command::Command;
use crate::context::CommandContext;
use crate::error::{BoxError, CliError};

/// Setup callback run once per CLI invocation.
pub type SetupFn = Arc<dyn Fn(&mut PluginContext) -> Result<(), BoxError> + Send + Sync>;

/// Type-erased extension factory.
pub type ExtensionFactory = Arc<
    dyn Fn(&CommandContext, &Command) -> Result<Arc<dyn Any + Send + Sync>, BoxError>
        + Send
        + Sync,
>;

/// Hook run right after an extension has been attached.
pub type ExtensionHook = Arc<dyn Fn(&CommandContext, &Command) -> Result<(), BoxError> + Send + Sync>;

/// A dependency on another plugin, by id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginDependency {
    id: String,
    optional: bool,
}

impl PluginDependency {
    /// A dependency that must be installed.
    #[must_use]
    pub fn required(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            optional: false,
        }
    }

    /// A dependency that is ordered first when installed and ignored
    /// otherwise.
    #[must_use]
    pub fn optional(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            optional: true,
        }
    }

    /// Plugin id depended on.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Whether the dependency may be absent.
    #[must_use]
    pub const fn is_optional(&self) -> bool {
        self.optional
    }
}

impl From<&str> for PluginDependency {
    fn from(id: &str) -> Self {
        Self::required(id)
    }
}

impl From<String> for PluginDependency {
    fn from(id: String) -> Self {
        Self::required(id)
    }
}

/// Extension factory plus its optional post-attach hook.
#[derive(Clone)]
pub struct PluginExtension {
    factory: ExtensionFactory,
    on_extension: Option<ExtensionHook>,
}

impl PluginExtension {
    pub(crate) fn build(
        &self,
        ctx: &CommandContext,
        command: &Command,
    ) -> Result<Arc<dyn Any + Send + Sync>, BoxError> {
        (self.factory)(ctx, command)
    }

    pub(crate) fn notify(&self, ctx: &CommandContext, command: &Command) -> Result<(), BoxError> {
        self.on_extension
            .as_ref()
            .map_or(Ok(()), |hook| hook(ctx, command))
    }
}

/// A plugin ready to be passed to [`crate::CliOptions::plugin`].
#[derive(Clone, Default)]
pub struct Plugin {
    id: Option<String>,
    name: Option<String>,
    dependencies: Vec<PluginDependency>,
    setup: Option<SetupFn>,
    extension: Option<PluginExtension>,
}

impl Plugin {
    /// An id-less plugin made of a setup callback only.
    ///
    /// Such plugins keep their registration position when dependencies are
    /// resolved and cannot expose an extension.
    #[must_use]
    pub fn anonymous<F>(setup: F) -> Self
    where
        F: Fn(&mut PluginContext) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        Self {
            setup: Some(Arc::new(setup)),
            ..Self::default()
        }
    }

    /// Plugin id.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Declared dependencies.
    #[must_use]
    pub fn dependencies(&self) -> &[PluginDependency] {
        &self.dependencies
    }

    /// Extension, when the plugin has an id and declared one.
    #[must_use]
    pub fn extension(&self) -> Option<&PluginExtension> {
        self.extension.as_ref()
    }

    /// Label used in logs and errors.
    #[must_use]
    pub fn label(&self) -> &str {
        self.id
            .as_deref()
            .or(self.name.as_deref())
            .unwrap_or("(anonymous plugin)")
    }

    /// Runs the setup callback against `ctx`.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::Setup`] when the callback fails.
    pub fn run_setup(&self, ctx: &mut PluginContext) -> Result<(), CliError> {
        let Some(setup) = &self.setup else {
            return Ok(());
        };
        setup(ctx).map_err(|source| CliError::Setup {
            plugin: self.label().to_owned(),
            source,
        })
    }
}

impl fmt::Debug for Plugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Plugin")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("dependencies", &self.dependencies)
            .field("setup", &self.setup.is_some())
            .field("extension", &self.extension.is_some())
            .finish()
    }
}

/// Starts building a plugin with the given id.
pub fn plugin(id: impl Into<String>) -> PluginBuilder {
    PluginBuilder::new(id)
}

/// Builder for [`Plugin`].
#[must_use]
pub struct PluginBuilder {
    plugin: Plugin,
    factory: Option<ExtensionFactory>,
    on_extension: Option<ExtensionHook>,
}

impl PluginBuilder {
    /// Starts a plugin with the given id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            plugin: Plugin {
                id: Some(id.into()),
                ..Plugin::default()
            },
            factory: None,
            on_extension: None,
        }
    }

    /// Sets the display name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.plugin.name = Some(name.into());
        self
    }

    /// Adds a dependency. Plain ids are required dependencies.
    pub fn dependency(mut self, dependency: impl Into<PluginDependency>) -> Self {
        self.plugin.dependencies.push(dependency.into());
        self
    }

    /// Adds several dependencies.
    pub fn dependencies<I, D>(mut self, dependencies: I) -> Self
    where
        I: IntoIterator<Item = D>,
        D: Into<PluginDependency>,
    {
        self.plugin
            .dependencies
            .extend(dependencies.into_iter().map(Into::into));
        self
    }

    /// Sets the setup callback.
    pub fn setup<F>(mut self, setup: F) -> Self
    where
        F: Fn(&mut PluginContext) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.plugin.setup = Some(Arc::new(setup));
        self
    }

    /// Sets the extension factory. Its output is attached to every command
    /// context under the plugin id.
    pub fn extension<T, F>(mut self, factory: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn(&CommandContext, &Command) -> Result<T, BoxError> + Send + Sync + 'static,
    {
        self.factory = Some(Arc::new(move |ctx: &CommandContext, command: &Command| {
            factory(ctx, command).map(|object| Arc::new(object) as Arc<dyn Any + Send + Sync>)
        }));
        self
    }

    /// Sets a hook run after the extension is attached.
    pub fn on_extension<F>(mut self, hook: F) -> Self
    where
        F: Fn(&CommandContext, &Command) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.on_extension = Some(Arc::new(hook));
        self
    }

    /// Finishes the plugin.
    pub fn build(self) -> Plugin {
        let Self {
            mut plugin,
            factory,
            on_extension,
        } = self;
        plugin.extension = factory.map(|factory_fn| PluginExtension {
            factory: factory_fn,
            on_extension,
        });
        plugin
    }
}

impl From<PluginBuilder> for Plugin {
    fn from(builder: PluginBuilder) -> Self {
        builder.build()
    }
}
