//! Command selection for one invocation.
//!
//! [`sub_command_token`] extracts the candidate sub-command name from the
//! tokens, [`resolve_command`] picks the entry or a sub-command and its
//! [`CallMode`], and [`to_command`] turns the selected [`Entry`] into a
//! runnable [`Command`], loading lazy commands on the way.

use tracing::debug;
use weft_args::{ArgToken, TokenKind};

use crate::command::{Command, Entry, LoadedCommand, SubCommands};
use crate::context::{ANONYMOUS_COMMAND_NAME, CallMode};
use crate::error::CliError;

/// Tracing target for command resolution.
pub(crate) const RESOLVER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::resolver");

/// Outcome of [`resolve_command`].
#[derive(Debug, Clone)]
pub struct ResolvedCommand {
    /// Name the command was selected by: the sub-command key, the entry's
    /// own name, or the unmatched token.
    pub name: Option<String>,
    /// The selected entry; `None` for [`CallMode::Unexpected`].
    pub entry: Option<Entry>,
    /// How the entry was reached.
    pub call_mode: CallMode,
}

/// Returns the sub-command candidate: the first argument when it is a
/// non-empty positional.
#[must_use]
pub fn sub_command_token(tokens: &[ArgToken]) -> Option<&str> {
    tokens
        .first()
        .filter(|token| token.kind == TokenKind::Positional && token.index == 0)
        .and_then(|token| token.value.as_deref())
        .filter(|value| !value.is_empty())
}

/// Registers a named entry into `sub_commands` so entry and sub-command
/// lookup agree. Does nothing when there are no sub-commands or the entry
/// has no name.
pub fn register_entry(entry: &Entry, sub_commands: &mut SubCommands) {
    if sub_commands.is_empty() {
        return;
    }
    if let Some(name) = entry.name() {
        debug!(target: RESOLVER_TARGET, command = name, "entry registered as sub-command");
        sub_commands.insert(name.to_owned(), entry.clone());
    }
}

/// Selects the entry to run.
///
/// Without a sub-command token, or without sub-commands, the entry runs.
/// Otherwise the token is looked up; a match backfills the stored entry's
/// name with the key. An unknown token yields [`CallMode::Unexpected`]
/// unless `fallback_to_entry` is set.
///
/// # Examples
///
/// ```
/// use weft::{CallMode, Command, Entry, SubCommands};
/// use weft::resolver::resolve_command;
///
/// let entry = Entry::runner(|_ctx| Ok(()));
/// let mut commands = SubCommands::new().with("show", Command::new());
///
/// let resolved = resolve_command(Some("show"), &entry, &mut commands, false);
/// assert_eq!(resolved.call_mode, CallMode::SubCommand);
/// assert_eq!(commands.get("show").and_then(Entry::name), Some("show"));
/// ```
pub fn resolve_command(
    sub_command: Option<&str>,
    entry: &Entry,
    sub_commands: &mut SubCommands,
    fallback_to_entry: bool,
) -> ResolvedCommand {
    let entry_outcome = || ResolvedCommand {
        name: entry.name().map(str::to_owned),
        entry: Some(entry.clone()),
        call_mode: CallMode::Entry,
    };

    let Some(token) = sub_command.filter(|_| !sub_commands.is_empty()) else {
        return entry_outcome();
    };

    match sub_commands.get_mut(token) {
        Some(found) => {
            found.backfill_name(token);
            debug!(target: RESOLVER_TARGET, command = token, "sub-command selected");
            ResolvedCommand {
                name: Some(token.to_owned()),
                entry: Some(found.clone()),
                call_mode: CallMode::SubCommand,
            }
        }
        None if fallback_to_entry => {
            debug!(target: RESOLVER_TARGET, token, "unknown sub-command; falling back to entry");
            entry_outcome()
        }
        None => ResolvedCommand {
            name: Some(token.to_owned()),
            entry: None,
            call_mode: CallMode::Unexpected,
        },
    }
}

/// Produces the command to run from `entry`.
///
/// Inline runners become a minimal command named `name`. Lazy commands are
/// loaded once; a loaded runner takes the stub's metadata, a loaded command
/// keeps its own fields and takes the stub's for the ones it leaves unset.
///
/// # Errors
///
/// Propagates loader failures and returns [`CliError::InvalidCommand`] when
/// a loaded command has no runner.
pub fn to_command(entry: &Entry, name: Option<&str>) -> Result<Command, CliError> {
    let mut command = match entry {
        Entry::Runner(run) => Command::new().runner(run.clone()),
        Entry::Command(command) => command.clone(),
        Entry::Lazy(lazy) => {
            debug!(
                target: RESOLVER_TARGET,
                command = lazy.stub().command_name().or(name).unwrap_or(ANONYMOUS_COMMAND_NAME),
                "loading lazy command"
            );
            match lazy.load()? {
                LoadedCommand::Runner(run) => lazy.stub().clone().runner(run),
                LoadedCommand::Command(loaded) => {
                    let merged = loaded.merge_stub(lazy.stub());
                    if !merged.has_runner() {
                        return Err(CliError::InvalidCommand {
                            name: merged
                                .command_name()
                                .or(name)
                                .unwrap_or(ANONYMOUS_COMMAND_NAME)
                                .to_owned(),
                        });
                    }
                    merged
                }
            }
        }
    };
    if let Some(key) = name {
        command.backfill_name(key);
    }
    Ok(command)
}

#[cfg(test)]
mod tests;
