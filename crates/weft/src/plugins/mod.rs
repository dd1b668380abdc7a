//! Plugins shipped with the framework.
//!
//! [`global`] and [`renderer`] are installed in front of every caller
//! plugin. [`i18n`] is opt-in: add it with [`crate::CliOptions::plugin`] to
//! translate headings, argument descriptions and examples.

pub mod global;
pub mod i18n;
pub mod renderer;

pub use self::global::{GLOBAL_PLUGIN_ID, GlobalExtension, global};
pub use self::i18n::{I18N_PLUGIN_ID, I18nExtension, I18nOptions, i18n};
pub use self::renderer::{RENDERER_PLUGIN_ID, RendererExtension, renderer};

use crate::plugin::Plugin;

/// Plugins installed before the caller's: global options, then the default
/// renderer.
#[must_use]
pub fn builtin_plugins() -> Vec<Plugin> {
    vec![global(), renderer()]
}
