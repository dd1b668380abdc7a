//! Translation adapters.
//!
//! A [`TranslationAdapter`] stores one flat [`Resource`] per locale and
//! resolves keys against it, falling back to a second locale when the key is
//! missing. [`DefaultTranslation`] is the built-in implementation and
//! interpolates `{$name}` placeholders. Applications can plug their own
//! adapter in through a [`TranslationAdapterFactory`].

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use crate::options::DEFAULT_LOCALE;

/// Flat map from message key to message text.
pub type Resource = BTreeMap<String, String>;

/// Values substituted into `{$name}` placeholders.
pub type TranslationValues = BTreeMap<String, String>;

/// Builds an adapter for a locale.
pub type TranslationAdapterFactory =
    Arc<dyn Fn(&TranslationAdapterOptions) -> Box<dyn TranslationAdapter> + Send + Sync>;

/// Locales an adapter is created for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationAdapterOptions {
    /// Requested locale.
    pub locale: String,
    /// Locale consulted when a key is missing.
    pub fallback_locale: String,
}

impl TranslationAdapterOptions {
    /// Options for `locale` with the default fallback.
    #[must_use]
    pub fn new(locale: impl Into<String>) -> Self {
        Self {
            locale: locale.into(),
            fallback_locale: DEFAULT_LOCALE.to_owned(),
        }
    }
}

/// Resource store and message resolver.
pub trait TranslationAdapter: Send + Sync {
    /// Returns a copy of the resource stored for `locale`.
    fn get_resource(&self, locale: &str) -> Option<Resource>;

    /// Stores `resource` for `locale`, replacing any previous one.
    fn set_resource(&mut self, locale: &str, resource: Resource);

    /// Returns the raw message for `key` in `locale` without fallback.
    fn get_message(&self, locale: &str, key: &str) -> Option<String>;

    /// Resolves `key` in `locale`, falling back to the fallback locale, and
    /// interpolates `values`.
    fn translate(&self, locale: &str, key: &str, values: &TranslationValues) -> Option<String>;
}

/// Replaces every `{$name}` in `message` with `values[name]`.
///
/// Unknown placeholders are left untouched.
///
/// # Examples
///
/// ```
/// use weft::i18n::{TranslationValues, interpolate};
///
/// let values = TranslationValues::from([("user".to_owned(), "kim".to_owned())]);
/// assert_eq!(interpolate("hi {$user} {$other}", &values), "hi kim {$other}");
/// ```
#[must_use]
pub fn interpolate(message: &str, values: &TranslationValues) -> String {
    let mut output = String::with_capacity(message.len());
    let mut remaining = message;
    while let Some(start) = remaining.find("{$") {
        let (before, from_marker) = remaining.split_at(start);
        output.push_str(before);
        let Some(end) = from_marker.find('}') else {
            output.push_str(from_marker);
            return output;
        };
        let (placeholder, after) = from_marker.split_at(end);
        let name = placeholder.trim_start_matches("{$");
        match values.get(name) {
            Some(value) => output.push_str(value),
            None => {
                output.push_str(placeholder);
                output.push('}');
            }
        }
        remaining = after.strip_prefix('}').unwrap_or(after);
    }
    output.push_str(remaining);
    output
}

/// In-memory adapter with `{$name}` interpolation.
#[derive(Clone, Default)]
pub struct DefaultTranslation {
    fallback_locale: String,
    resources: HashMap<String, Resource>,
}

impl DefaultTranslation {
    /// Creates an empty adapter.
    #[must_use]
    pub fn new(options: &TranslationAdapterOptions) -> Self {
        Self {
            fallback_locale: options.fallback_locale.clone(),
            resources: HashMap::new(),
        }
    }

    /// Factory producing [`DefaultTranslation`] adapters.
    #[must_use]
    pub fn factory() -> TranslationAdapterFactory {
        Arc::new(|options: &TranslationAdapterOptions| -> Box<dyn TranslationAdapter> {
            Box::new(Self::new(options))
        })
    }
}

impl TranslationAdapter for DefaultTranslation {
    fn get_resource(&self, locale: &str) -> Option<Resource> {
        self.resources.get(locale).cloned()
    }

    fn set_resource(&mut self, locale: &str, resource: Resource) {
        self.resources.insert(locale.to_owned(), resource);
    }

    fn get_message(&self, locale: &str, key: &str) -> Option<String> {
        self.resources
            .get(locale)
            .and_then(|resource| resource.get(key))
            .cloned()
    }

    fn translate(&self, locale: &str, key: &str, values: &TranslationValues) -> Option<String> {
        self.get_message(locale, key)
            .or_else(|| self.get_message(&self.fallback_locale, key))
            .map(|message| interpolate(&message, values))
    }
}

impl fmt::Debug for DefaultTranslation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut locales: Vec<&String> = self.resources.keys().collect();
        locales.sort();
        f.debug_struct("DefaultTranslation")
            .field("fallback_locale", &self.fallback_locale)
            .field("locales", &locales)
            .finish()
    }
}
