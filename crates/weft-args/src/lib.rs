//! Argument tokenizing and schema-driven resolution for `weft`.
//!
//! The crate is split into two stages. [`parse_args`] turns raw argv strings
//! into [`ArgToken`]s without knowing anything about the command being run.
//! [`resolve_args`] then pairs those tokens with an [`ArgSchemas`] map to
//! produce typed values, positionals, the rest after `--`, and an aggregate
//! of validation failures.
//!
//! Validation failures are returned as data ([`ArgResolveErrors`]) rather
//! than as an `Err`, because the caller usually wants to render them as help
//! text instead of aborting.
//!
//! # Example
//!
//! ```
//! use weft_args::{ArgSchema, ArgSchemas, ArgValue, ResolveArgsConfig, parse_args, resolve_args};
//!
//! let mut schemas = ArgSchemas::new();
//! schemas.insert("foo", ArgSchema::string().short('f'));
//!
//! let tokens = parse_args(["-f", "bar", "--", "--baz"]);
//! let resolved = resolve_args(&schemas, &tokens, &ResolveArgsConfig::default());
//!
//! assert_eq!(resolved.values.get("foo"), Some(&ArgValue::from("bar")));
//! assert_eq!(resolved.rest, vec![String::from("--baz")]);
//! assert!(resolved.error.is_none());
//! ```

pub mod error;
pub mod kebab;
pub mod resolve;
pub mod schema;
pub mod token;

pub use self::error::{ArgResolveError, ArgResolveErrorKind, ArgResolveErrors, option_pair};
pub use self::kebab::to_kebab_case;
pub use self::resolve::{ArgValues, ResolveArgsConfig, ResolvedArgs, resolve_args};
pub use self::schema::{ArgKind, ArgSchema, ArgSchemas, ArgValue, CustomParser};
pub use self::token::{ArgToken, TokenKind, parse_args};
