//! Layered configuration loading from `WEFT_*` environment variables.

use std::ffi::OsString;
use std::sync::{Mutex, MutexGuard};

use once_cell::sync::Lazy;
use weft_demo::config::{
    ConfigError, DemoConfig, LOCALE_ENV, LOG_FILTER_ENV, LOG_FORMAT_ENV, LogFormat,
};

static ENV_MUTEX: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

struct EnvOverrides {
    previous: Vec<(&'static str, Option<OsString>)>,
    _guard: MutexGuard<'static, ()>,
}

impl EnvOverrides {
    fn set(pairs: &[(&'static str, Option<&str>)]) -> Self {
        let guard = ENV_MUTEX.lock().expect("env mutex poisoned");
        let mut previous = Vec::new();
        for (key, value) in pairs {
            previous.push((*key, std::env::var_os(key)));
            // Environment mutation is unsafe in edition 2024; the mutex keeps
            // the tests in this binary from racing on it.
            match value {
                Some(value) => unsafe { std::env::set_var(key, value) },
                None => unsafe { std::env::remove_var(key) },
            }
        }
        Self {
            previous,
            _guard: guard,
        }
    }
}

impl Drop for EnvOverrides {
    fn drop(&mut self) {
        for (key, value) in self.previous.drain(..) {
            match value {
                Some(value) => unsafe { std::env::set_var(key, value) },
                None => unsafe { std::env::remove_var(key) },
            }
        }
    }
}

#[test]
fn environment_overrides_the_defaults() {
    let _env = EnvOverrides::set(&[
        (LOCALE_ENV, Some("ja-JP")),
        (LOG_FILTER_ENV, Some("weft=debug")),
        (LOG_FORMAT_ENV, Some("json")),
    ]);

    let config = DemoConfig::discover().expect("configuration loads");

    assert_eq!(config.locale(), Some("ja-JP"));
    assert_eq!(config.log_filter(), "weft=debug");
    assert_eq!(config.log_format(), LogFormat::Json);
}

#[test]
fn unset_variables_fall_back_to_the_defaults() {
    let _env = EnvOverrides::set(&[
        (LOCALE_ENV, None),
        (LOG_FILTER_ENV, None),
        (LOG_FORMAT_ENV, None),
    ]);

    let config = DemoConfig::discover().expect("configuration loads");

    assert_eq!(config, DemoConfig::default());
}

#[test]
fn unknown_log_format_fails_to_load() {
    let _env = EnvOverrides::set(&[(LOG_FORMAT_ENV, Some("yaml"))]);

    let error = DemoConfig::discover().expect_err("unknown format");

    assert!(matches!(error, ConfigError::Load { .. }));
    assert!(
        error.to_string().starts_with("failed to load configuration"),
        "unexpected message: {error}"
    );
}
