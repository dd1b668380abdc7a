//! Crate-level integration and BDD tests.

use std::thread;

use crate::cli::cli;
use crate::command::Command;
use crate::context::CallMode;
use crate::options::CliOptions;

mod behaviour;

#[test]
fn concurrent_invocations_do_not_share_state() {
    let handles: Vec<_> = (0..4)
        .map(|worker| {
            thread::spawn(move || {
                let command = Command::named("work").run(move |ctx| {
                    assert_eq!(ctx.call_mode(), CallMode::Entry);
                    Ok(format!("worker {worker}"))
                });
                cli(Vec::<String>::new(), command, CliOptions::new().usage_silent(true))
            })
        })
        .collect();

    for (worker, handle) in handles.into_iter().enumerate() {
        let output = handle.join().expect("worker thread").expect("dispatch");
        assert_eq!(output, Some(format!("worker {worker}")));
    }
}
