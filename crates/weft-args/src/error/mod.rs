//! Validation failures produced while resolving arguments.
//!
//! Individual failures are collected into an [`ArgResolveErrors`] aggregate
//! instead of aborting resolution at the first problem, so the caller can
//! report every mistake in one go.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::kebab::to_kebab_case;
use crate::schema::{ArgKind, ArgSchema};

/// Category of a single validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArgResolveErrorKind {
    /// The value could not be converted to the schema's type.
    Type,
    /// A required argument was not supplied.
    Required,
    /// A custom parser rejected the value.
    Custom,
}

/// One argument that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{message}")]
pub struct ArgResolveError {
    name: String,
    kind: ArgResolveErrorKind,
    message: String,
}

impl ArgResolveError {
    /// Creates an error with an explicit message.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        kind: ArgResolveErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            message: message.into(),
        }
    }

    /// The value did not match the schema's type or choices.
    #[must_use]
    pub fn type_mismatch(name: &str, schema: &ArgSchema, to_kebab: bool) -> Self {
        let pair = option_pair(name, schema, to_kebab);
        let expectation = if schema.kind() == ArgKind::Enum {
            format!(
                "chosen from '{}' [{}] values",
                schema.kind(),
                quoted_choices(schema.choices())
            )
        } else {
            format!("'{}'", schema.kind())
        };
        Self::new(
            name,
            ArgResolveErrorKind::Type,
            format!("Optional argument '{pair}' should be {expectation}"),
        )
    }

    /// A required argument is missing.
    #[must_use]
    pub fn required(name: &str, schema: &ArgSchema, to_kebab: bool) -> Self {
        let message = if schema.kind() == ArgKind::Positional {
            format!("Positional argument '{name}' is required")
        } else {
            format!(
                "Optional argument '{}' is required",
                option_pair(name, schema, to_kebab)
            )
        };
        Self::new(name, ArgResolveErrorKind::Required, message)
    }

    /// Schema key of the failing argument.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Failure category.
    #[must_use]
    pub const fn kind(&self) -> ArgResolveErrorKind {
        self.kind
    }

    /// Human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Aggregate of every validation failure from one resolution pass.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ArgResolveErrors {
    errors: Vec<ArgResolveError>,
}

impl ArgResolveErrors {
    /// Wraps a list of failures.
    #[must_use]
    pub const fn new(errors: Vec<ArgResolveError>) -> Self {
        Self { errors }
    }

    /// Individual failures in discovery order.
    #[must_use]
    pub fn errors(&self) -> &[ArgResolveError] {
        &self.errors
    }

    /// Number of failures.
    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Returns `true` when there are no failures.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

impl fmt::Display for ArgResolveErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (position, error) in self.errors.iter().enumerate() {
            if position > 0 {
                f.write_str("\n")?;
            }
            f.write_str(error.message())?;
        }
        Ok(())
    }
}

impl std::error::Error for ArgResolveErrors {}

/// Formats the option as users type it: `-f, --foo` or `--foo`.
#[must_use]
pub fn option_pair(name: &str, schema: &ArgSchema, to_kebab: bool) -> String {
    let long = if to_kebab || schema.is_kebab() {
        to_kebab_case(name)
    } else {
        name.to_owned()
    };
    match schema.short_alias() {
        Some(short) => format!("-{short}, --{long}"),
        None => format!("--{long}"),
    }
}

fn quoted_choices(choices: &[String]) -> String {
    choices
        .iter()
        .map(|choice| serde_json::to_string(choice).unwrap_or_else(|_| format!("\"{choice}\"")))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests;
