//! Argument schema descriptors and resolved values.
//!
//! An [`ArgSchemas`] map describes every option and positional a command
//! accepts. Key order is significant: usage output lists arguments in the
//! order they were inserted, and [`ArgSchemas::overlay`] keeps the base key
//! order when a later map overrides an existing key.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Parser used by [`ArgKind::Custom`] schemas.
///
/// The error string becomes the validation message verbatim.
pub type CustomParser = Arc<dyn Fn(&str) -> Result<ArgValue, String> + Send + Sync>;

/// Value type accepted by an argument.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ArgKind {
    /// Free-form text.
    String,
    /// Presence flag; never consumes a value.
    Boolean,
    /// Floating point number.
    Number,
    /// One of a fixed set of choices.
    Enum,
    /// Positional argument, matched by order rather than by name.
    Positional,
    /// Text converted by a user-supplied [`CustomParser`].
    Custom,
}

impl ArgKind {
    /// Returns `true` when an option of this kind consumes a value.
    #[must_use]
    pub const fn takes_value(self) -> bool {
        !matches!(self, Self::Boolean | Self::Positional)
    }
}

/// A resolved argument value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ArgValue {
    /// Boolean flag state.
    Boolean(bool),
    /// Parsed number.
    Number(f64),
    /// Text value.
    String(String),
    /// Accumulated values of a `multiple` argument.
    List(Vec<ArgValue>),
}

impl ArgValue {
    /// Returns the text when this is a string value.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(text) => Some(text),
            _ => None,
        }
    }

    /// Returns the flag when this is a boolean value.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(flag) => Some(*flag),
            _ => None,
        }
    }

    /// Returns the number when this is a numeric value.
    #[must_use]
    pub const fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(number) => Some(*number),
            _ => None,
        }
    }

    /// Returns the items when this is a list value.
    #[must_use]
    pub fn as_list(&self) -> Option<&[Self]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean(flag) => write!(f, "{flag}"),
            Self::Number(number) => write!(f, "{number}"),
            Self::String(text) => f.write_str(text),
            Self::List(items) => {
                for (position, item) in items.iter().enumerate() {
                    if position > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
        }
    }
}

impl From<&str> for ArgValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for ArgValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for ArgValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<f64> for ArgValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

/// Declarative description of one argument.
///
/// # Example
///
/// ```
/// use weft_args::{ArgKind, ArgSchema};
///
/// let schema = ArgSchema::enumeration(["json", "text"])
///     .short('f')
///     .describe("Output format")
///     .default_value("text");
///
/// assert_eq!(schema.kind(), ArgKind::Enum);
/// assert_eq!(schema.choices(), ["json", "text"]);
/// ```
#[derive(Clone)]
pub struct ArgSchema {
    kind: ArgKind,
    short: Option<char>,
    description: Option<String>,
    required: bool,
    multiple: bool,
    negatable: bool,
    default: Option<ArgValue>,
    choices: Vec<String>,
    to_kebab: bool,
    parse: Option<CustomParser>,
}

impl ArgSchema {
    const fn with_kind(kind: ArgKind) -> Self {
        Self {
            kind,
            short: None,
            description: None,
            required: false,
            multiple: false,
            negatable: false,
            default: None,
            choices: Vec::new(),
            to_kebab: false,
            parse: None,
        }
    }

    /// A string option.
    #[must_use]
    pub const fn string() -> Self {
        Self::with_kind(ArgKind::String)
    }

    /// A boolean flag.
    #[must_use]
    pub const fn boolean() -> Self {
        Self::with_kind(ArgKind::Boolean)
    }

    /// A numeric option.
    #[must_use]
    pub const fn number() -> Self {
        Self::with_kind(ArgKind::Number)
    }

    /// An option restricted to `choices`.
    #[must_use]
    pub fn enumeration<I, S>(choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut schema = Self::with_kind(ArgKind::Enum);
        schema.choices = choices.into_iter().map(Into::into).collect();
        schema
    }

    /// A positional argument. Positionals are required unless a default is
    /// set or [`ArgSchema::required`] is called with `false`.
    #[must_use]
    pub const fn positional() -> Self {
        let mut schema = Self::with_kind(ArgKind::Positional);
        schema.required = true;
        schema
    }

    /// An option whose text is converted by `parser`.
    #[must_use]
    pub fn custom<F>(parser: F) -> Self
    where
        F: Fn(&str) -> Result<ArgValue, String> + Send + Sync + 'static,
    {
        let mut schema = Self::with_kind(ArgKind::Custom);
        schema.parse = Some(Arc::new(parser));
        schema
    }

    /// Sets the single-letter alias.
    #[must_use]
    pub const fn short(mut self, short: char) -> Self {
        self.short = Some(short);
        self
    }

    /// Sets the help description.
    #[must_use]
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Marks the argument as required (or not).
    #[must_use]
    pub const fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Allows the option to repeat, collecting a list.
    #[must_use]
    pub const fn multiple(mut self) -> Self {
        self.multiple = true;
        self
    }

    /// Allows `--no-<name>` to set a boolean flag to `false`.
    #[must_use]
    pub const fn negatable(mut self) -> Self {
        self.negatable = true;
        self
    }

    /// Sets the value used when the argument is absent.
    #[must_use]
    pub fn default_value(mut self, value: impl Into<ArgValue>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Forces kebab-case matching of this option's long name.
    #[must_use]
    pub const fn to_kebab(mut self) -> Self {
        self.to_kebab = true;
        self
    }

    /// Value type.
    #[must_use]
    pub const fn kind(&self) -> ArgKind {
        self.kind
    }

    /// Single-letter alias.
    #[must_use]
    pub const fn short_alias(&self) -> Option<char> {
        self.short
    }

    /// Help description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Whether the argument must be supplied.
    #[must_use]
    pub const fn is_required(&self) -> bool {
        self.required
    }

    /// Whether the option may repeat.
    #[must_use]
    pub const fn is_multiple(&self) -> bool {
        self.multiple
    }

    /// Whether `--no-<name>` is accepted.
    #[must_use]
    pub const fn is_negatable(&self) -> bool {
        self.negatable
    }

    /// Default value.
    #[must_use]
    pub const fn default(&self) -> Option<&ArgValue> {
        self.default.as_ref()
    }

    /// Allowed choices for [`ArgKind::Enum`].
    #[must_use]
    pub fn choices(&self) -> &[String] {
        &self.choices
    }

    /// Whether the long name is matched in kebab-case.
    #[must_use]
    pub const fn is_kebab(&self) -> bool {
        self.to_kebab
    }

    /// Custom parser for [`ArgKind::Custom`].
    #[must_use]
    pub fn parser(&self) -> Option<&CustomParser> {
        self.parse.as_ref()
    }
}

impl fmt::Debug for ArgSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArgSchema")
            .field("kind", &self.kind)
            .field("short", &self.short)
            .field("description", &self.description)
            .field("required", &self.required)
            .field("multiple", &self.multiple)
            .field("negatable", &self.negatable)
            .field("default", &self.default)
            .field("choices", &self.choices)
            .field("to_kebab", &self.to_kebab)
            .field("parse", &self.parse.as_ref().map(|_| "<parser>"))
            .finish()
    }
}

/// Insertion-ordered map from argument name to [`ArgSchema`].
#[derive(Debug, Clone, Default)]
pub struct ArgSchemas {
    entries: Vec<(String, ArgSchema)>,
}

impl ArgSchemas {
    /// Creates an empty map.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Inserts or replaces a schema, returning the replaced one.
    ///
    /// Replacing keeps the key at its original position.
    pub fn insert(&mut self, name: impl Into<String>, schema: ArgSchema) -> Option<ArgSchema> {
        let key: String = name.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, schema)),
            None => {
                self.entries.push((key, schema));
                None
            }
        }
    }

    /// Builder-style [`ArgSchemas::insert`].
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, schema: ArgSchema) -> Self {
        self.insert(name, schema);
        self
    }

    /// Looks up a schema by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ArgSchema> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, schema)| schema)
    }

    /// Returns `true` when `name` is present.
    #[must_use]
    pub fn contains_key(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterates entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ArgSchema)> {
        self.entries
            .iter()
            .map(|(key, schema)| (key.as_str(), schema))
    }

    /// Iterates names in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
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

    /// Returns a copy of `self` with every entry of `overrides` applied on top.
    ///
    /// Keys already present keep their position; new keys are appended. A
    /// short alias claimed by an override is removed from every base entry
    /// of another name, so `-x` always reaches the overriding argument.
    #[must_use]
    pub fn overlay(&self, overrides: &Self) -> Self {
        let mut merged = self.clone();
        for (name, schema) in overrides.iter() {
            if let Some(alias) = schema.short_alias() {
                merged
                    .entries
                    .iter_mut()
                    .filter(|(key, base)| key != name && base.short_alias() == Some(alias))
                    .for_each(|(_, base)| base.short = None);
            }
            merged.insert(name, schema.clone());
        }
        merged
    }
}

impl<K: Into<String>> FromIterator<(K, ArgSchema)> for ArgSchemas {
    fn from_iter<T: IntoIterator<Item = (K, ArgSchema)>>(iter: T) -> Self {
        let mut schemas = Self::new();
        for (name, schema) in iter {
            schemas.insert(name, schema);
        }
        schemas
    }
}
