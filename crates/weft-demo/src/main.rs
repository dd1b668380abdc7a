//! Entry point of the `weft-demo` binary.
//!
//! Loads the layered configuration, installs telemetry and delegates to
//! [`weft_demo::run`].

use std::io::{self, Write};
use std::process::ExitCode;

use weft_demo::config::DemoConfig;
use weft_demo::{PROGRAM_NAME, lossy_args, telemetry};

fn main() -> ExitCode {
    let mut stdout = io::stdout().lock();
    let mut stderr = io::stderr().lock();
    let config = match DemoConfig::discover() {
        Ok(config) => config,
        Err(error) => {
            drop(writeln!(stderr, "{PROGRAM_NAME}: {error}"));
            return ExitCode::FAILURE;
        }
    };
    if let Err(error) = telemetry::initialise(&config) {
        // Telemetry is optional; the command still runs.
        drop(writeln!(stderr, "{PROGRAM_NAME}: {error}"));
    }
    weft_demo::run(
        lossy_args(std::env::args_os().skip(1)),
        &config,
        &mut stdout,
        &mut stderr,
    )
}
