//! The opt-in internationalization plugin.
//!
//! Builds a [`TranslationAdapter`] per invocation, seeds it with the
//! built-in messages (keys prefixed `_:`) and the running command's own
//! resource, and exposes it to runners and to the renderer plugin through
//! [`I18nExtension`].

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::command::Command;
use crate::context::CommandContext;
use crate::error::{BoxError, CliError};
use crate::i18n::{
    DefaultTranslation, Resource, TranslationAdapter, TranslationAdapterFactory,
    TranslationAdapterOptions, TranslationValues,
};
use crate::localizer::BuiltinMessages;
use crate::plugin::{Plugin, plugin};

/// Id of the i18n plugin.
pub const I18N_PLUGIN_ID: &str = "weft:i18n";

/// Prefix of argument description keys, such as `arg:name`.
pub const ARG_KEY_PREFIX: &str = "arg:";

/// Key of the translated command description.
pub const DESCRIPTION_KEY: &str = "description";

/// Key of the translated command examples.
pub const EXAMPLES_KEY: &str = "examples";

/// Settings of the i18n plugin.
#[derive(Clone, Default)]
pub struct I18nOptions {
    locale: Option<String>,
    translation_adapter_factory: Option<TranslationAdapterFactory>,
    builtin_resources: BTreeMap<String, Resource>,
}

impl I18nOptions {
    /// Defaults: the CLI locale and [`DefaultTranslation`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the locale configured on the CLI options.
    #[must_use]
    pub fn locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    /// Overrides the adapter factory configured on the CLI options.
    #[must_use]
    pub fn translation_adapter_factory<F>(mut self, factory: F) -> Self
    where
        F: Fn(&TranslationAdapterOptions) -> Box<dyn TranslationAdapter> + Send + Sync + 'static,
    {
        self.translation_adapter_factory = Some(Arc::new(factory));
        self
    }

    /// Adds built-in message translations for `locale`.
    ///
    /// Keys are given without the `_:` prefix, for example `USAGE`.
    #[must_use]
    pub fn builtin_resource(mut self, locale: impl Into<String>, resource: Resource) -> Self {
        let prefixed = resource
            .into_iter()
            .map(|(key, text)| (format!("{}{key}", crate::localizer::BUILTIN_KEY_PREFIX), text));
        self.builtin_resources
            .entry(locale.into())
            .or_default()
            .extend(prefixed);
        self
    }
}

impl fmt::Debug for I18nOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("I18nOptions")
            .field("locale", &self.locale)
            .field(
                "translation_adapter_factory",
                &self.translation_adapter_factory.is_some(),
            )
            .field("builtin_resources", &self.builtin_resources)
            .finish()
    }
}

/// Translation access for the running command.
pub struct I18nExtension {
    locale: String,
    adapter: Box<dyn TranslationAdapter>,
}

impl I18nExtension {
    /// Active locale.
    #[must_use]
    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// Resolves `key` in the active locale with fallback.
    #[must_use]
    pub fn translate(&self, key: &str, values: &TranslationValues) -> Option<String> {
        self.adapter.translate(&self.locale, key, values)
    }

    /// The underlying adapter.
    #[must_use]
    pub fn adapter(&self) -> &dyn TranslationAdapter {
        self.adapter.as_ref()
    }
}

impl fmt::Debug for I18nExtension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("I18nExtension")
            .field("locale", &self.locale)
            .finish_non_exhaustive()
    }
}

fn load_command_resource(
    ctx: &CommandContext,
    command: &Command,
    locale: &str,
) -> Result<Option<Resource>, CliError> {
    let Some(fetch) = command.resource_fetcher() else {
        return Ok(None);
    };
    fetch(locale)
        .map(Some)
        .map_err(|source| CliError::Translation {
            message: format!(
                "cannot load resource of command '{}' for {locale}: {source}",
                ctx.name()
            ),
        })
}

fn build_extension(
    options: &I18nOptions,
    ctx: &CommandContext,
    command: &Command,
) -> Result<I18nExtension, BoxError> {
    let locale = options
        .locale
        .clone()
        .unwrap_or_else(|| ctx.env().locale().to_owned());
    let adapter_options = TranslationAdapterOptions::new(locale.clone());
    let fallback_locale = adapter_options.fallback_locale.clone();

    let factory = options
        .translation_adapter_factory
        .clone()
        .or_else(|| ctx.env().translation_adapter_factory().cloned())
        .unwrap_or_else(DefaultTranslation::factory);
    let mut adapter = factory(&adapter_options);

    let mut resources: BTreeMap<String, Resource> = BTreeMap::new();
    resources.insert(
        fallback_locale.clone(),
        BuiltinMessages::load().as_resource(),
    );
    for (resource_locale, resource) in &options.builtin_resources {
        resources
            .entry(resource_locale.clone())
            .or_default()
            .extend(resource.clone());
    }

    if locale != fallback_locale {
        match load_command_resource(ctx, command, &fallback_locale) {
            Ok(Some(resource)) => resources
                .entry(fallback_locale.clone())
                .or_default()
                .extend(resource),
            Ok(None) => {}
            Err(error) => debug!(%error, "fallback locale resource unavailable"),
        }
    }
    if let Some(resource) = load_command_resource(ctx, command, &locale)? {
        resources.entry(locale.clone()).or_default().extend(resource);
    }

    for (resource_locale, resource) in resources {
        adapter.set_resource(&resource_locale, resource);
    }
    debug!(locale = %locale, command = ctx.name(), "translation resources loaded");

    Ok(I18nExtension { locale, adapter })
}

/// Creates the i18n plugin.
///
/// # Examples
///
/// ```
/// use weft::plugins::i18n::{I18nOptions, i18n};
///
/// let plugin = i18n(I18nOptions::new().locale("ja-JP"));
/// assert_eq!(plugin.id(), Some("weft:i18n"));
/// ```
#[must_use]
pub fn i18n(options: I18nOptions) -> Plugin {
    plugin(I18N_PLUGIN_ID)
        .name("internationalization")
        .extension(move |ctx, command| build_extension(&options, ctx, command))
        .build()
}

