//! Schema-agnostic argv tokenizer.
//!
//! [`parse_args`] classifies every argv entry as an option, a positional, or
//! the `--` terminator. It never decides whether an option takes a value;
//! that pairing happens in [`crate::resolve`] once the schema is known.

use serde::Serialize;
use strum::Display;

/// Classification of a single token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum TokenKind {
    /// A `--long` or `-s` option.
    Option,
    /// A bare value.
    Positional,
    /// The `--` marker; everything after it is passed through untouched.
    OptionTerminator,
}

/// One lexical unit of the command line.
///
/// Grouped short options (`-abc`) produce one token per letter, all sharing
/// the argv `index` they came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArgToken {
    /// Position of the originating argv entry.
    pub index: usize,
    /// Token classification.
    pub kind: TokenKind,
    /// Option name without dashes (`foo` for `--foo`, `f` for `-f`).
    pub name: Option<String>,
    /// Option name as typed (`--foo`, `-f`).
    pub raw_name: Option<String>,
    /// Positional text, or the inline value of `--foo=bar`.
    pub value: Option<String>,
    /// `Some(true)` when the value was supplied with `=`.
    pub inline_value: Option<bool>,
}

impl ArgToken {
    /// Builds a positional token.
    #[must_use]
    pub fn positional(index: usize, value: impl Into<String>) -> Self {
        Self {
            index,
            kind: TokenKind::Positional,
            name: None,
            raw_name: None,
            value: Some(value.into()),
            inline_value: None,
        }
    }

    /// Builds an option token, with an optional inline value.
    #[must_use]
    pub fn option(index: usize, raw_name: impl Into<String>, value: Option<String>) -> Self {
        let raw: String = raw_name.into();
        let name = raw.trim_start_matches('-').to_owned();
        let inline_value = value.as_ref().map(|_| true);
        Self {
            index,
            kind: TokenKind::Option,
            name: Some(name),
            raw_name: Some(raw),
            value,
            inline_value,
        }
    }

    /// Builds the `--` terminator token.
    #[must_use]
    pub const fn terminator(index: usize) -> Self {
        Self {
            index,
            kind: TokenKind::OptionTerminator,
            name: None,
            raw_name: None,
            value: None,
            inline_value: None,
        }
    }

    /// Returns `true` for a long (`--name`) option token.
    #[must_use]
    pub fn is_long(&self) -> bool {
        self.raw_name
            .as_deref()
            .is_some_and(|raw| raw.starts_with("--"))
    }
}

/// Splits raw argv entries into tokens.
///
/// The first element is treated as a real argument, so callers must strip
/// the program name themselves.
///
/// # Example
///
/// ```
/// use weft_args::{TokenKind, parse_args};
///
/// let tokens = parse_args(["build", "--out=dist", "-vq"]);
/// assert_eq!(tokens.len(), 4);
/// assert_eq!(tokens[0].kind, TokenKind::Positional);
/// assert_eq!(tokens[1].value.as_deref(), Some("dist"));
/// assert_eq!(tokens[2].index, tokens[3].index);
/// ```
#[must_use]
pub fn parse_args<I, S>(argv: I) -> Vec<ArgToken>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut tokens = Vec::new();
    let mut terminated = false;

    for (index, argument) in argv.into_iter().enumerate() {
        let arg = argument.as_ref();
        if terminated {
            tokens.push(ArgToken::positional(index, arg));
            continue;
        }
        if arg == "--" {
            terminated = true;
            tokens.push(ArgToken::terminator(index));
        } else if let Some(long) = arg.strip_prefix("--") {
            tokens.push(long_option(index, long));
        } else if let Some(shorts) = arg.strip_prefix('-').filter(|rest| !rest.is_empty()) {
            tokens.extend(short_options(index, shorts));
        } else {
            tokens.push(ArgToken::positional(index, arg));
        }
    }

    tokens
}

fn long_option(index: usize, body: &str) -> ArgToken {
    match body.split_once('=') {
        Some((name, value)) => ArgToken::option(index, format!("--{name}"), Some(value.to_owned())),
        None => ArgToken::option(index, format!("--{body}"), None),
    }
}

fn short_options(index: usize, body: &str) -> Vec<ArgToken> {
    let mut chars = body.chars();
    let Some(first) = chars.next() else {
        return Vec::new();
    };
    if let Some(value) = chars.as_str().strip_prefix('=') {
        return vec![ArgToken::option(
            index,
            format!("-{first}"),
            Some(value.to_owned()),
        )];
    }
    body.chars()
        .map(|letter| ArgToken::option(index, format!("-{letter}"), None))
        .collect()
}

#[cfg(test)]
mod tests;
