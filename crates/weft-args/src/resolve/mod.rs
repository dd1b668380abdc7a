//! Pairs tokens with a schema to produce typed values.
//!
//! Resolution is a single forward pass over the tokens followed by three
//! fix-ups: positional assignment, defaults, and required checks. Every
//! failure is recorded and resolution carries on, so the returned
//! [`ResolvedArgs::error`] lists all problems at once.

use std::collections::{BTreeMap, HashSet};

use tracing::debug;

use crate::error::{ArgResolveError, ArgResolveErrorKind, ArgResolveErrors};
use crate::kebab::to_kebab_case;
use crate::schema::{ArgKind, ArgSchema, ArgSchemas, ArgValue};
use crate::token::{ArgToken, TokenKind};

/// Resolved values keyed by schema name.
pub type ArgValues = BTreeMap<String, ArgValue>;

/// Tuning knobs for [`resolve_args`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveArgsConfig {
    /// Treat `-abc` as three flags. When disabled, the letters following the
    /// first value-taking option in a group become its value (`-ofile`).
    pub short_grouping: bool,
    /// Match every long option name in kebab-case.
    pub to_kebab: bool,
    /// Index of a positional to leave out of positional-schema assignment,
    /// typically the sub-command name.
    pub skip_positional: Option<usize>,
}

impl Default for ResolveArgsConfig {
    fn default() -> Self {
        Self {
            short_grouping: true,
            to_kebab: false,
            skip_positional: None,
        }
    }
}

/// Output of [`resolve_args`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedArgs {
    /// Values for every argument that was supplied or has a default.
    pub values: ArgValues,
    /// `true` for every schema key the user typed explicitly.
    pub explicit: BTreeMap<String, bool>,
    /// Positional texts not consumed as option values, before `--`.
    pub positionals: Vec<String>,
    /// Everything after `--`.
    pub rest: Vec<String>,
    /// Aggregated validation failures, if any.
    pub error: Option<ArgResolveErrors>,
}

/// Resolves `tokens` against `schemas`.
///
/// # Example
///
/// ```
/// use weft_args::{ArgSchema, ArgSchemas, ResolveArgsConfig, parse_args, resolve_args};
///
/// let schemas = ArgSchemas::new().with("foo", ArgSchema::enumeration(["a", "b"]));
/// let tokens = parse_args(["--foo", "z"]);
/// let resolved = resolve_args(&schemas, &tokens, &ResolveArgsConfig::default());
///
/// let error = resolved.error.expect("validation error");
/// assert_eq!(
///     error.to_string(),
///     r#"Optional argument '--foo' should be chosen from 'enum' ["a", "b"] values"#
/// );
/// ```
#[must_use]
pub fn resolve_args(
    schemas: &ArgSchemas,
    tokens: &[ArgToken],
    config: &ResolveArgsConfig,
) -> ResolvedArgs {
    let mut resolver = Resolver::new(schemas, tokens, config);
    resolver.scan();
    resolver.assign_positionals();
    resolver.apply_defaults();
    resolver.finish()
}

struct Resolver<'a> {
    schemas: &'a ArgSchemas,
    tokens: &'a [ArgToken],
    config: &'a ResolveArgsConfig,
    consumed: HashSet<usize>,
    values: ArgValues,
    explicit: BTreeMap<String, bool>,
    positionals: Vec<String>,
    rest: Vec<String>,
    errors: Vec<ArgResolveError>,
}

impl<'a> Resolver<'a> {
    fn new(
        schemas: &'a ArgSchemas,
        tokens: &'a [ArgToken],
        config: &'a ResolveArgsConfig,
    ) -> Self {
        Self {
            schemas,
            tokens,
            config,
            consumed: HashSet::new(),
            values: ArgValues::new(),
            explicit: schemas.keys().map(|key| (key.to_owned(), false)).collect(),
            positionals: Vec::new(),
            rest: Vec::new(),
            errors: Vec::new(),
        }
    }

    fn scan(&mut self) {
        let tokens = self.tokens;
        let mut terminated = false;
        let mut position = 0;
        while let Some(token) = tokens.get(position) {
            match token.kind {
                TokenKind::OptionTerminator => terminated = true,
                TokenKind::Positional => {
                    let text = token.value.clone().unwrap_or_default();
                    if terminated {
                        self.rest.push(text);
                    } else if !self.consumed.contains(&position) {
                        self.positionals.push(text);
                    }
                }
                TokenKind::Option => {
                    position = self.option(position);
                }
            }
            position += 1;
        }
    }

    /// Handles the option at `position`, returning the position of the last
    /// token it used.
    fn option(&mut self, position: usize) -> usize {
        let tokens = self.tokens;
        let Some(token) = tokens.get(position) else {
            return position;
        };
        let name = token.name.as_deref().unwrap_or_default();

        let Some((key, schema)) = self.lookup(token, name) else {
            self.negation(token, name);
            return position;
        };

        match schema.kind() {
            ArgKind::Positional => {
                debug!(option = name, "positional schema addressed as an option; ignored");
                position
            }
            ArgKind::Boolean => {
                let flag = match token.value.as_deref() {
                    None | Some("true") => Some(true),
                    Some("false") => Some(false),
                    Some(_) => None,
                };
                match flag {
                    Some(state) => self.store(key, schema, ArgValue::Boolean(state)),
                    None => self.errors.push(ArgResolveError::type_mismatch(
                        key,
                        schema,
                        self.config.to_kebab,
                    )),
                }
                position
            }
            _ => self.valued_option(position, key, schema),
        }
    }

    fn valued_option(&mut self, position: usize, key: &'a str, schema: &'a ArgSchema) -> usize {
        let (raw, last) = self.take_value(position);
        let Some(text) = raw else {
            self.errors.push(ArgResolveError::type_mismatch(
                key,
                schema,
                self.config.to_kebab,
            ));
            return last;
        };
        match coerce(schema, &text) {
            Ok(value) => self.store(key, schema, value),
            Err(Some(message)) => self.errors.push(ArgResolveError::new(
                key,
                ArgResolveErrorKind::Custom,
                message,
            )),
            Err(None) => self.errors.push(ArgResolveError::type_mismatch(
                key,
                schema,
                self.config.to_kebab,
            )),
        }
        last
    }

    /// Finds the raw value for the value-taking option at `position`.
    fn take_value(&mut self, position: usize) -> (Option<String>, usize) {
        let tokens = self.tokens;
        let Some(token) = tokens.get(position) else {
            return (None, position);
        };
        if let Some(inline) = token.value.clone() {
            return (Some(inline), position);
        }

        if !self.config.short_grouping && !token.is_long() {
            let grouped: Vec<&ArgToken> = tokens
                .iter()
                .skip(position + 1)
                .take_while(|next| next.index == token.index && next.kind == TokenKind::Option)
                .collect();
            if !grouped.is_empty() {
                let remainder: String = grouped
                    .iter()
                    .filter_map(|next| next.name.as_deref())
                    .collect();
                return (Some(remainder), position + grouped.len());
            }
        }

        match tokens.get(position + 1) {
            Some(next) if next.kind == TokenKind::Positional => {
                self.consumed.insert(position + 1);
                (next.value.clone(), position)
            }
            _ => (None, position),
        }
    }

    fn negation(&mut self, token: &ArgToken, name: &str) {
        let negated = name
            .strip_prefix("no-")
            .filter(|_| token.is_long())
            .and_then(|base| self.find_long(base))
            .filter(|(_, schema)| schema.kind() == ArgKind::Boolean && schema.is_negatable());
        match negated {
            Some((key, schema)) => self.store(key, schema, ArgValue::Boolean(false)),
            None => debug!(option = name, "unknown option ignored"),
        }
    }

    fn lookup(&self, token: &ArgToken, name: &str) -> Option<(&'a str, &'a ArgSchema)> {
        if token.is_long() {
            self.find_long(name)
        } else {
            let letter = name.chars().next()?;
            let schemas = self.schemas;
            schemas
                .iter()
                .find(|(_, schema)| schema.short_alias() == Some(letter))
        }
    }

    fn find_long(&self, name: &str) -> Option<(&'a str, &'a ArgSchema)> {
        let schemas = self.schemas;
        schemas.iter().find(|(key, schema)| {
            if self.config.to_kebab || schema.is_kebab() {
                to_kebab_case(key) == name
            } else {
                *key == name
            }
        })
    }

    fn store(&mut self, key: &str, schema: &ArgSchema, value: ArgValue) {
        self.explicit.insert(key.to_owned(), true);
        if schema.is_multiple() {
            match self.values.get_mut(key) {
                Some(ArgValue::List(items)) => items.push(value),
                _ => {
                    self.values.insert(key.to_owned(), ArgValue::List(vec![value]));
                }
            }
        } else {
            self.values.insert(key.to_owned(), value);
        }
    }

    fn assign_positionals(&mut self) {
        let skip = self.config.skip_positional;
        let mut available = self
            .positionals
            .iter()
            .enumerate()
            .filter(|(position, _)| Some(*position) != skip)
            .map(|(_, text)| text.clone())
            .collect::<Vec<_>>()
            .into_iter();

        let schemas = self.schemas;
        for (key, schema) in schemas.iter() {
            if schema.kind() != ArgKind::Positional {
                continue;
            }
            if schema.is_multiple() {
                let items: Vec<ArgValue> = available.by_ref().map(ArgValue::String).collect();
                if !items.is_empty() {
                    self.explicit.insert(key.to_owned(), true);
                    self.values.insert(key.to_owned(), ArgValue::List(items));
                }
            } else if let Some(text) = available.next() {
                self.explicit.insert(key.to_owned(), true);
                self.values.insert(key.to_owned(), ArgValue::String(text));
            }
        }
    }

    fn apply_defaults(&mut self) {
        let schemas = self.schemas;
        for (key, schema) in schemas.iter() {
            if self.values.contains_key(key) {
                continue;
            }
            if let Some(default) = schema.default() {
                self.values.insert(key.to_owned(), default.clone());
            } else if schema.is_required() {
                self.errors.push(ArgResolveError::required(
                    key,
                    schema,
                    self.config.to_kebab,
                ));
            }
        }
    }

    fn finish(self) -> ResolvedArgs {
        let error = if self.errors.is_empty() {
            None
        } else {
            Some(ArgResolveErrors::new(self.errors))
        };
        ResolvedArgs {
            values: self.values,
            explicit: self.explicit,
            positionals: self.positionals,
            rest: self.rest,
            error,
        }
    }
}

/// Converts raw text according to the schema kind.
///
/// `Err(None)` means a plain type mismatch; `Err(Some(message))` carries a
/// custom parser's own message.
fn coerce(schema: &ArgSchema, raw: &str) -> Result<ArgValue, Option<String>> {
    match schema.kind() {
        ArgKind::String | ArgKind::Positional => Ok(ArgValue::from(raw)),
        ArgKind::Boolean => match raw {
            "true" => Ok(ArgValue::Boolean(true)),
            "false" => Ok(ArgValue::Boolean(false)),
            _ => Err(None),
        },
        ArgKind::Number => raw
            .parse::<f64>()
            .ok()
            .filter(|number| number.is_finite())
            .map(ArgValue::Number)
            .ok_or(None),
        ArgKind::Enum => {
            if schema.choices().iter().any(|choice| choice == raw) {
                Ok(ArgValue::from(raw))
            } else {
                Err(None)
            }
        }
        ArgKind::Custom => match schema.parser() {
            Some(parser) => parser(raw).map_err(Some),
            None => Ok(ArgValue::from(raw)),
        },
    }
}
