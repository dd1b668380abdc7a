//! A small program built on the weft framework.
//!
//! `greet` is the entry command; `echo` and the lazily loaded `count` are
//! sub-commands. Help, version and validation output come from the built-in
//! plugins, translations from the i18n plugin (set `WEFT_LOCALE=ja-JP`), and
//! the timing plugin logs command durations at debug level.

pub mod commands;
pub mod config;
pub mod telemetry;

use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;

use tracing::debug;
use weft::i18n::Resource;
use weft::plugins::{I18nOptions, i18n};
use weft::{CliOptions, cli};

use crate::commands::{greet, sub_commands, timing};
use crate::config::DemoConfig;

/// Program name shown in usage and headers.
pub const PROGRAM_NAME: &str = "weft-demo";

fn japanese_builtins() -> Resource {
    [
        ("USAGE", "使い方:"),
        ("COMMANDS", "コマンド:"),
        ("ARGUMENTS", "引数:"),
        ("OPTIONS", "オプション:"),
        ("EXAMPLES", "例:"),
        ("FORMORE", "各コマンドの詳細は `--help` を付けて実行してください:"),
        ("NEGATABLE", "否定:"),
        ("DEFAULT", "既定値"),
        ("CHOICES", "選択肢"),
        ("help", "このヘルプを表示"),
        ("version", "バージョンを表示"),
    ]
    .into_iter()
    .map(|(key, text)| (key.to_owned(), text.to_owned()))
    .collect()
}

/// CLI options of the demo for `config`.
#[must_use]
pub fn cli_options(config: &DemoConfig) -> CliOptions {
    let options = CliOptions::new()
        .name(PROGRAM_NAME)
        .description("Demonstration of the weft command framework")
        .version(env!("CARGO_PKG_VERSION"))
        .usage_silent(true)
        .sub_commands_map(sub_commands())
        .plugin(i18n(
            I18nOptions::new().builtin_resource("ja-JP", japanese_builtins()),
        ))
        .plugin(timing());
    match config.locale() {
        Some(locale) => options.locale(locale),
        None => options,
    }
}

/// Converts raw process arguments to text.
///
/// Invalid UTF-8 is replaced with U+FFFD rather than aborting, so such an
/// argument reaches the resolver and fails there like any other bad value.
pub fn lossy_args<I>(args: I) -> impl Iterator<Item = String>
where
    I: IntoIterator<Item = OsString>,
{
    args.into_iter()
        .map(|arg| arg.into_string().unwrap_or_else(|raw| raw.to_string_lossy().into_owned()))
}

/// Runs the demo with `args` (excluding the program name).
///
/// Output goes to `stdout`; failures are reported on `stderr` and yield a
/// failing exit code.
pub fn run<I, W, E>(args: I, config: &DemoConfig, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = String>,
    W: Write,
    E: Write,
{
    match cli(args, greet(), cli_options(config)) {
        Ok(output) => {
            let written = output.map_or(Ok(()), |text| writeln!(stdout, "{text}"));
            match written.and_then(|()| stdout.flush()) {
                Ok(()) => ExitCode::SUCCESS,
                Err(error) => {
                    debug!(%error, "failed to write command output");
                    ExitCode::FAILURE
                }
            }
        }
        Err(error) => {
            if let Err(write_error) = writeln!(stderr, "{PROGRAM_NAME}: {error}") {
                debug!(error = %write_error, "failed to report command failure");
            }
            ExitCode::FAILURE
        }
    }
}
