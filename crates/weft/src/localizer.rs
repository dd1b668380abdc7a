//! Built-in message catalogue.
//!
//! Section headings and built-in option descriptions are resolved through a
//! Fluent localizer loaded from the embedded en-US catalogue. Each message
//! also carries a hardcoded English fallback used when the Fluent pipeline
//! fails, so usage output is always produced.

use std::collections::BTreeMap;

use ortho_config::{FluentLocalizer, Localizer, NoOpLocalizer};
use strum::{EnumIter, IntoEnumIterator};

use crate::i18n::Resource;

/// Embedded en-US Fluent catalogue for built-in messages.
pub(crate) static WEFT_EN_US: &str = include_str!("../locales/en-US/messages.ftl");

/// Prefix of built-in keys inside translation resources.
pub const BUILTIN_KEY_PREFIX: &str = "_:";

/// Built-in messages used by the renderers and global options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter)]
pub enum BuiltinKey {
    /// `USAGE:` heading.
    Usage,
    /// `COMMANDS:` heading.
    Commands,
    /// `ARGUMENTS:` heading.
    Arguments,
    /// `OPTIONS:` heading.
    Options,
    /// `EXAMPLES:` heading.
    Examples,
    /// Lead-in of the per-command help hints.
    ForMore,
    /// Prefix of negated option descriptions.
    Negatable,
    /// Label of default values.
    Default,
    /// Label of enum choices.
    Choices,
    /// Description of `--help`.
    Help,
    /// Description of `--version`.
    Version,
}

impl BuiltinKey {
    /// Fluent message id and English fallback.
    ///
    /// The fallbacks must match `locales/en-US/messages.ftl`; the
    /// `fluent_and_fallback_outputs_are_identical` test guards against drift.
    const fn catalogue_entry(self) -> (&'static str, &'static str) {
        match self {
            Self::Usage => ("weft-usage-heading", "USAGE:"),
            Self::Commands => ("weft-commands-heading", "COMMANDS:"),
            Self::Arguments => ("weft-arguments-heading", "ARGUMENTS:"),
            Self::Options => ("weft-options-heading", "OPTIONS:"),
            Self::Examples => ("weft-examples-heading", "EXAMPLES:"),
            Self::ForMore => (
                "weft-for-more",
                "For more info, run any command with the `--help` flag:",
            ),
            Self::Negatable => ("weft-negatable", "Negatable of"),
            Self::Default => ("weft-default", "default"),
            Self::Choices => ("weft-choices", "choices"),
            Self::Help => ("weft-help-description", "Display this help message"),
            Self::Version => ("weft-version-description", "Display this version"),
        }
    }

    /// Key of this message inside a translation resource, without the
    /// built-in prefix.
    #[must_use]
    pub const fn resource_key(self) -> &'static str {
        match self {
            Self::Usage => "USAGE",
            Self::Commands => "COMMANDS",
            Self::Arguments => "ARGUMENTS",
            Self::Options => "OPTIONS",
            Self::Examples => "EXAMPLES",
            Self::ForMore => "FORMORE",
            Self::Negatable => "NEGATABLE",
            Self::Default => "DEFAULT",
            Self::Choices => "CHOICES",
            Self::Help => "help",
            Self::Version => "version",
        }
    }

    /// Prefixed resource key, such as `_:USAGE`.
    #[must_use]
    pub fn prefixed_key(self) -> String {
        format!("{BUILTIN_KEY_PREFIX}{}", self.resource_key())
    }

    /// English text.
    #[must_use]
    pub const fn fallback(self) -> &'static str {
        self.catalogue_entry().1
    }
}

/// Builds the built-in localizer.
///
/// Falls back to [`NoOpLocalizer`] on error so rendering never fails because
/// of a localization problem.
pub(crate) fn build_localizer() -> Box<dyn Localizer> {
    match FluentLocalizer::with_en_us_defaults([WEFT_EN_US]) {
        Ok(loc) => Box::new(loc),
        Err(_) => Box::new(NoOpLocalizer),
    }
}

/// Resolved built-in messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltinMessages {
    texts: BTreeMap<BuiltinKey, String>,
}

impl BuiltinMessages {
    /// Resolves every message through the embedded Fluent catalogue.
    #[must_use]
    pub fn load() -> Self {
        let localizer = build_localizer();
        Self::from_localizer(localizer.as_ref())
    }

    /// Resolves every message through `localizer`.
    #[must_use]
    pub fn from_localizer(localizer: &dyn Localizer) -> Self {
        let texts = BuiltinKey::iter()
            .map(|key| {
                let (id, fallback) = key.catalogue_entry();
                (key, localizer.message(id, None, fallback))
            })
            .collect();
        Self { texts }
    }

    /// Hardcoded English messages.
    #[must_use]
    pub fn english() -> Self {
        Self::from_localizer(&NoOpLocalizer)
    }

    /// Text of one message.
    #[must_use]
    pub fn get(&self, key: BuiltinKey) -> &str {
        self.texts
            .get(&key)
            .map_or_else(|| key.fallback(), String::as_str)
    }

    /// Replaces one message.
    pub fn set(&mut self, key: BuiltinKey, text: impl Into<String>) {
        self.texts.insert(key, text.into());
    }

    /// Messages as a translation resource with prefixed keys.
    #[must_use]
    pub fn as_resource(&self) -> Resource {
        BuiltinKey::iter()
            .map(|key| (key.prefixed_key(), self.get(key).to_owned()))
            .collect()
    }
}
