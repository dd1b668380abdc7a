//! Layered settings for the demo binary.
//!
//! [`DemoConfig`] is loaded through `ortho_config`: defaults, then any
//! `.weft.toml` configuration file, then `WEFT_*` environment variables.
//! Command-line arguments belong to the weft dispatcher, so the loader is
//! only ever given the program name.

use std::ffi::OsString;
use std::sync::Arc;

use ortho_config::{OrthoConfig, OrthoError};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use thiserror::Error;

use crate::PROGRAM_NAME;

/// Variable selecting the UI locale.
pub const LOCALE_ENV: &str = "WEFT_LOCALE";

/// Variable holding the tracing filter expression.
pub const LOG_FILTER_ENV: &str = "WEFT_LOG_FILTER";

/// Variable selecting the log output format.
pub const LOG_FORMAT_ENV: &str = "WEFT_LOG_FORMAT";

/// Filter used when [`LOG_FILTER_ENV`] is unset.
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Supported logging output formats.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LogFormat {
    /// Structured JSON suitable for ingestion by logging stacks.
    Json,
    /// Human-readable single line output.
    #[default]
    Compact,
}

/// Errors raised while loading [`DemoConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A configuration layer could not be read or merged.
    #[error("failed to load configuration: {source}")]
    Load {
        /// Underlying loader error.
        #[source]
        source: Arc<OrthoError>,
    },
}

/// Settings read once at start-up.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "WEFT")]
pub struct DemoConfig {
    /// Requested UI locale, such as `ja-JP`.
    locale: Option<String>,
    /// Tracing filter expression.
    #[ortho_config(default = DEFAULT_LOG_FILTER.to_owned())]
    log_filter: String,
    /// Log output format.
    #[ortho_config(default = LogFormat::Compact)]
    log_format: LogFormat,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            locale: None,
            log_filter: DEFAULT_LOG_FILTER.to_owned(),
            log_format: LogFormat::default(),
        }
    }
}

impl DemoConfig {
    /// Loads the layered configuration for this process.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Load`] when a configuration file is malformed
    /// or an environment variable holds an unparseable value, such as an
    /// unknown log format.
    pub fn discover() -> Result<Self, ConfigError> {
        Self::load_from_iter([OsString::from(PROGRAM_NAME)])
            .map_err(|source| ConfigError::Load { source })
    }

    /// Overrides the locale.
    #[must_use]
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    /// Requested UI locale; blank values count as unset.
    #[must_use]
    pub fn locale(&self) -> Option<&str> {
        self.locale
            .as_deref()
            .map(str::trim)
            .filter(|locale| !locale.is_empty())
    }

    /// Tracing filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Log output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("json", LogFormat::Json)]
    #[case("JSON", LogFormat::Json)]
    #[case("compact", LogFormat::Compact)]
    fn log_formats_parse_case_insensitively(#[case] raw: &str, #[case] expected: LogFormat) {
        assert_eq!(LogFormat::from_str(raw).expect("known format"), expected);
    }

    #[test]
    fn defaults_are_quiet_and_compact() {
        let config = DemoConfig::default();
        assert_eq!(config.locale(), None);
        assert_eq!(config.log_filter(), "warn");
        assert_eq!(config.log_format(), LogFormat::Compact);
    }

    #[rstest]
    #[case("ja-JP", Some("ja-JP"))]
    #[case("  ", None)]
    fn blank_locales_count_as_unset(#[case] locale: &str, #[case] expected: Option<&str>) {
        let config = DemoConfig::default().with_locale(locale);
        assert_eq!(config.locale(), expected);
    }
}
