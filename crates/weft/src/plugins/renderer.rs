//! The default renderer plugin.
//!
//! Installs [`render_header`], [`render_usage`] and
//! [`render_validation_errors`] as the innermost renderer decorators. When
//! the i18n plugin is installed it is ordered first, and this plugin's
//! extension resolves headings, argument descriptions and examples through
//! it. Descriptions in the command listing come from each sub-command's
//! own resource, fetched for the active locale.

use std::collections::BTreeMap;

use strum::IntoEnumIterator;
use tracing::debug;

use crate::command::Command;
use crate::context::{CallMode, CommandContext};
use crate::i18n::TranslationValues;
use crate::localizer::{BuiltinKey, BuiltinMessages};
use crate::plugin::{Plugin, PluginDependency, plugin};
use crate::plugins::global::{HELP_OPTION, VERSION_OPTION};
use crate::plugins::i18n::{
    ARG_KEY_PREFIX, DESCRIPTION_KEY, EXAMPLES_KEY, I18N_PLUGIN_ID, I18nExtension,
};
use crate::render::{UsageTexts, render_header, render_usage, render_validation_errors};

/// Id of the renderer plugin.
pub const RENDERER_PLUGIN_ID: &str = "weft:renderer";

/// Localized usage text for the running command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RendererExtension {
    texts: UsageTexts,
}

impl RendererExtension {
    /// Resolves the texts for `command`, translating through the i18n
    /// extension already attached to `ctx`, if any.
    #[must_use]
    pub fn new(ctx: &CommandContext, command: &Command) -> Self {
        let i18n = ctx.extension::<I18nExtension>(I18N_PLUGIN_ID);
        let no_values = TranslationValues::new();
        let translate =
            |key: &str| i18n.and_then(|extension| extension.translate(key, &no_values));

        let mut messages = BuiltinMessages::load();
        if i18n.is_some() {
            for key in BuiltinKey::iter() {
                if let Some(text) = translate(&key.prefixed_key()) {
                    messages.set(key, text);
                }
            }
        }

        let descriptions: BTreeMap<String, String> = ctx
            .args()
            .iter()
            .filter_map(|(name, schema)| {
                translate(&format!("{ARG_KEY_PREFIX}{name}"))
                    .or_else(|| {
                        i18n.and(builtin_option_key(name))
                            .map(|key| messages.get(key).to_owned())
                    })
                    .or_else(|| schema.description().map(str::to_owned))
                    .map(|text| (name.to_owned(), text))
            })
            .collect();

        let examples = translate(EXAMPLES_KEY)
            .or_else(|| command.command_examples().map(str::to_owned));

        let command_description = translate(DESCRIPTION_KEY)
            .or_else(|| command.command_description().map(str::to_owned));
        let listing = i18n
            .filter(|_| ctx.call_mode() != CallMode::SubCommand)
            .map(|extension| translated_listing(ctx, extension.locale()))
            .unwrap_or_default();

        Self {
            texts: UsageTexts::new(messages, descriptions, examples)
                .with_command_description(command_description)
                .with_listing(listing),
        }
    }

    /// Every resolved text.
    #[must_use]
    pub const fn texts(&self) -> &UsageTexts {
        &self.texts
    }

    /// One localized built-in message.
    #[must_use]
    pub fn text(&self, key: BuiltinKey) -> &str {
        self.texts.text(key)
    }

    /// Localized examples of the command.
    #[must_use]
    pub fn examples(&self) -> Option<&str> {
        self.texts.examples()
    }
}

/// Sub-command descriptions found in their resources for `locale`.
///
/// A resource that fails to load leaves the declared description in place.
fn translated_listing(ctx: &CommandContext, locale: &str) -> BTreeMap<String, String> {
    ctx.env()
        .sub_commands()
        .iter()
        .filter_map(|(name, entry)| {
            let fetch = entry.resource_fetcher()?;
            match fetch(locale) {
                Ok(mut resource) => resource
                    .remove(DESCRIPTION_KEY)
                    .map(|text| (name.to_owned(), text)),
                Err(error) => {
                    debug!(command = name, locale, %error, "listing resource unavailable");
                    None
                }
            }
        })
        .collect()
}

fn builtin_option_key(name: &str) -> Option<BuiltinKey> {
    match name {
        HELP_OPTION => Some(BuiltinKey::Help),
        VERSION_OPTION => Some(BuiltinKey::Version),
        _ => None,
    }
}

/// Creates the default renderer plugin.
#[must_use]
pub fn renderer() -> Plugin {
    plugin(RENDERER_PLUGIN_ID)
        .name("default renderer")
        .dependency(PluginDependency::optional(I18N_PLUGIN_ID))
        .setup(|ctx| {
            ctx.decorate_header_renderer(|_base, command_ctx| render_header(command_ctx));
            ctx.decorate_usage_renderer(|_base, command_ctx| render_usage(command_ctx));
            ctx.decorate_validation_errors_renderer(|_base, command_ctx, errors| {
                render_validation_errors(command_ctx, errors)
            });
            Ok(())
        })
        .extension(|ctx, command| Ok(RendererExtension::new(ctx, command)))
        .build()
}
