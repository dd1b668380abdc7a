//! Commands and plugins of the demo program.

use std::time::Instant;

use tracing::debug;
use weft::i18n::{Resource, TranslationValues};
use weft::plugins::{I18N_PLUGIN_ID, I18nExtension};
use weft::{
    ArgSchema, ArgValue, BoxError, Command, CommandContext, LazyCommand, LoadedCommand, Plugin,
    SubCommands, plugin, runner,
};

/// Id of the timing plugin.
pub const TIMING_PLUGIN_ID: &str = "demo:timing";

fn resource(entries: &[(&str, &str)]) -> Resource {
    entries
        .iter()
        .map(|(key, text)| ((*key).to_owned(), (*text).to_owned()))
        .collect()
}

fn greet_resource(locale: &str) -> Result<Resource, BoxError> {
    Ok(match locale {
        "ja-JP" => resource(&[
            ("description", "挨拶を表示します"),
            ("arg:name", "挨拶する相手"),
            ("arg:loud", "大文字で挨拶する"),
            ("greeting", "こんにちは、{$name}!"),
        ]),
        _ => resource(&[("greeting", "Hello, {$name}!")]),
    })
}

fn echo_resource(locale: &str) -> Result<Resource, BoxError> {
    Ok(match locale {
        "ja-JP" => resource(&[
            ("description", "単語を表示します"),
            ("arg:words", "表示する単語"),
            ("arg:separator", "単語の区切り"),
        ]),
        _ => Resource::new(),
    })
}

fn greeting(ctx: &CommandContext, name: &str) -> String {
    let values = TranslationValues::from([("name".to_owned(), name.to_owned())]);
    ctx.extension::<I18nExtension>(I18N_PLUGIN_ID)
        .and_then(|extension| extension.translate("greeting", &values))
        .unwrap_or_else(|| format!("Hello, {name}!"))
}

/// The entry command: prints a greeting.
#[must_use]
pub fn greet() -> Command {
    Command::named("greet")
        .description("Print a greeting")
        .arg(
            "name",
            ArgSchema::string()
                .short('n')
                .describe("Who to greet")
                .default_value("world"),
        )
        .arg(
            "loud",
            ArgSchema::boolean()
                .short('l')
                .negatable()
                .describe("Shout the greeting"),
        )
        .examples("weft-demo --name kim\nweft-demo -l -n kim")
        .resource(greet_resource)
        .run(|ctx| {
            let text = greeting(ctx, ctx.value_str("name").unwrap_or("world"));
            Ok(if ctx.flag("loud") {
                text.to_uppercase()
            } else {
                text
            })
        })
}

/// Echoes its positional words.
#[must_use]
pub fn echo() -> Command {
    Command::new()
        .description("Echo the given words")
        .arg(
            "words",
            ArgSchema::positional()
                .multiple()
                .required(false)
                .describe("Words to print"),
        )
        .arg(
            "separator",
            ArgSchema::string()
                .short('s')
                .describe("Text placed between words")
                .default_value(" "),
        )
        .resource(echo_resource)
        .run(|ctx| {
            let separator = ctx.value_str("separator").unwrap_or(" ");
            let words: Vec<String> = ctx
                .value("words")
                .and_then(ArgValue::as_list)
                .unwrap_or_default()
                .iter()
                .map(ToString::to_string)
                .collect();
            Ok(words.join(separator))
        })
}

fn count_body() -> Command {
    Command::new()
        .arg("items", ArgSchema::positional().multiple().required(false))
        .run(|ctx| {
            let total = ctx
                .value("items")
                .and_then(ArgValue::as_list)
                .map_or(0, <[ArgValue]>::len);
            Ok(total.to_string())
        })
}

/// Counts its positional arguments; the body is loaded on first use.
#[must_use]
pub fn count() -> LazyCommand {
    LazyCommand::new(|| {
        debug!(command = "count", "loading command body");
        Ok(LoadedCommand::Command(count_body()))
    })
    .command_name("count")
    .description("Count the given items")
}

/// Sub-commands reachable from the entry.
#[must_use]
pub fn sub_commands() -> SubCommands {
    SubCommands::new().with("echo", echo()).with("count", count())
}

/// Logs how long each command took at debug level.
#[must_use]
pub fn timing() -> Plugin {
    plugin(TIMING_PLUGIN_ID)
        .name("command timing")
        .setup(|ctx| {
            ctx.decorate_command(|base| {
                runner(move |command_ctx| {
                    let started = Instant::now();
                    let output = base(command_ctx)?;
                    debug!(
                        command = command_ctx.name(),
                        elapsed_us = started.elapsed().as_micros(),
                        "command finished"
                    );
                    Ok(output)
                })
            });
            Ok(())
        })
        .build()
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use weft::{CliOptions, cli};

    use super::*;

    fn dispatch(argv: &[&str]) -> Option<String> {
        let options = CliOptions::new()
            .usage_silent(true)
            .sub_commands_map(sub_commands())
            .plugin(timing());
        cli(argv.iter().copied(), greet(), options).expect("dispatch")
    }

    #[rstest]
    #[case::defaults(&[], "Hello, world!")]
    #[case::named(&["-n", "kim"], "Hello, kim!")]
    #[case::loud(&["--loud", "--name", "kim"], "HELLO, KIM!")]
    #[case::negated(&["--loud", "--no-loud"], "Hello, world!")]
    #[case::echo(&["echo", "a", "b"], "a b")]
    #[case::echo_separator(&["echo", "-s", ",", "a", "b"], "a,b")]
    #[case::count(&["count", "x", "y", "z"], "3")]
    #[case::count_nothing(&["count"], "0")]
    fn commands_produce_their_output(#[case] argv: &[&str], #[case] expected: &str) {
        assert_eq!(dispatch(argv).as_deref(), Some(expected));
    }

    #[test]
    fn greeting_falls_back_without_translations() {
        let output = cli(
            ["--name", "lee"],
            greet(),
            CliOptions::new().usage_silent(true),
        )
        .expect("dispatch");
        assert_eq!(output.as_deref(), Some("Hello, lee!"));
    }
}
