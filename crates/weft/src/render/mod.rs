//! Default header, usage and validation error renderers.
//!
//! The renderers read everything from the [`CommandContext`]: layout and
//! program metadata from the environment, argument schemas from the context,
//! and localized headings, descriptions and examples from the renderer
//! plugin's extension. Without that extension they fall back to the
//! built-in English catalogue and the schema descriptions.
//!
//! Key columns are aligned by display width so wide characters line up.

use std::borrow::Cow;
use std::collections::BTreeMap;

use unicode_width::UnicodeWidthStr;
use weft_args::{
    ArgKind, ArgResolveError, ArgResolveErrors, ArgSchema, ArgSchemas, to_kebab_case,
};

use crate::context::{CallMode, CommandContext};
use crate::error::CliError;
use crate::localizer::{BuiltinKey, BuiltinMessages};
use crate::options::UsageLayout;
use crate::plugins::renderer::{RENDERER_PLUGIN_ID, RendererExtension};

/// Localized text consumed by [`render_usage`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageTexts {
    messages: BuiltinMessages,
    descriptions: BTreeMap<String, String>,
    examples: Option<String>,
    command_description: Option<String>,
    listing: BTreeMap<String, String>,
}

impl UsageTexts {
    /// Bundles pre-resolved texts.
    #[must_use]
    pub const fn new(
        messages: BuiltinMessages,
        descriptions: BTreeMap<String, String>,
        examples: Option<String>,
    ) -> Self {
        Self {
            messages,
            descriptions,
            examples,
            command_description: None,
            listing: BTreeMap::new(),
        }
    }

    /// Sets the description of the running command.
    #[must_use]
    pub fn with_command_description(mut self, description: Option<String>) -> Self {
        self.command_description = description;
        self
    }

    /// Sets sub-command descriptions that replace the declared ones in the
    /// command listing.
    #[must_use]
    pub fn with_listing(mut self, listing: BTreeMap<String, String>) -> Self {
        self.listing = listing;
        self
    }

    /// Built-in headings and the descriptions declared on `args`.
    #[must_use]
    pub fn from_schemas(args: &ArgSchemas) -> Self {
        let descriptions = args
            .iter()
            .filter_map(|(name, schema)| {
                schema
                    .description()
                    .map(|text| (name.to_owned(), text.to_owned()))
            })
            .collect();
        Self::new(BuiltinMessages::load(), descriptions, None)
    }

    /// A built-in message.
    #[must_use]
    pub fn text(&self, key: BuiltinKey) -> &str {
        self.messages.get(key)
    }

    /// Description of argument `name`.
    #[must_use]
    pub fn description(&self, name: &str) -> Option<&str> {
        self.descriptions.get(name).map(String::as_str)
    }

    /// Example text.
    #[must_use]
    pub fn examples(&self) -> Option<&str> {
        self.examples.as_deref()
    }

    /// Description of the running command.
    #[must_use]
    pub fn command_description(&self) -> Option<&str> {
        self.command_description.as_deref()
    }

    /// Listing description of sub-command `name`, when one was resolved.
    #[must_use]
    pub fn listed_description(&self, name: &str) -> Option<&str> {
        self.listing.get(name).map(String::as_str)
    }
}

fn texts_for(ctx: &CommandContext) -> Cow<'_, UsageTexts> {
    ctx.extension::<RendererExtension>(RENDERER_PLUGIN_ID)
        .map_or_else(
            || {
                Cow::Owned(
                    UsageTexts::from_schemas(ctx.args())
                        .with_command_description(ctx.description().map(str::to_owned)),
                )
            },
            |extension| Cow::Borrowed(extension.texts()),
        )
}

/// Renders `<description or name> (<name>[ v<version>])`.
///
/// Returns an empty string when the program has neither a description nor a
/// name.
///
/// # Errors
///
/// Never fails; the signature matches [`crate::Renderer`].
pub fn render_header(ctx: &CommandContext) -> Result<String, CliError> {
    let env = ctx.env();
    let title = env.description().or_else(|| env.name()).unwrap_or_default();
    if title.is_empty() {
        return Ok(String::new());
    }
    let version = env
        .version()
        .map(|text| format!(" v{text}"))
        .unwrap_or_default();
    Ok(format!(
        "{title} ({}{version})",
        env.name().unwrap_or_default()
    ))
}

/// Renders the usage text for the context's command.
///
/// A command reached through its sub-command token is introduced by its
/// description.
///
/// # Errors
///
/// Never fails; the signature matches [`crate::Renderer`].
pub fn render_usage(ctx: &CommandContext) -> Result<String, CliError> {
    let texts = texts_for(ctx);
    let layout = ctx.env().layout();
    let (options, positionals): (Vec<_>, Vec<_>) = ctx
        .args()
        .iter()
        .partition(|(_, schema)| schema.kind() != ArgKind::Positional);

    let introduction = texts
        .command_description()
        .filter(|text| !ctx.omitted() && !text.is_empty());
    let mut sections: Vec<String> = introduction.map(str::to_owned).into_iter().collect();
    sections.push(section(
        texts.text(BuiltinKey::Usage),
        &[usage_line(ctx, !options.is_empty(), &positionals)],
        layout,
    ));
    if let Some(commands) = commands_section(ctx, &texts, layout) {
        sections.push(commands);
    }
    if !positionals.is_empty() {
        let rows = positional_rows(&positionals, &texts);
        sections.push(section(
            texts.text(BuiltinKey::Arguments),
            &align(&rows, layout),
            layout,
        ));
    }
    if !options.is_empty() {
        let rows = option_rows(&options, &texts, ctx.to_kebab(), layout);
        sections.push(section(
            texts.text(BuiltinKey::Options),
            &align(&rows, layout),
            layout,
        ));
    }
    if let Some(examples) = texts.examples().filter(|text| !text.trim().is_empty()) {
        let lines: Vec<String> = examples.lines().map(str::to_owned).collect();
        sections.push(section(texts.text(BuiltinKey::Examples), &lines, layout));
    }
    Ok(sections.join("\n\n"))
}

/// Renders one validation message per line.
///
/// # Errors
///
/// Never fails; the signature matches [`crate::ValidationErrorsRenderer`].
pub fn render_validation_errors(
    _ctx: &CommandContext,
    errors: &ArgResolveErrors,
) -> Result<String, CliError> {
    Ok(errors
        .errors()
        .iter()
        .map(ArgResolveError::message)
        .collect::<Vec<_>>()
        .join("\n"))
}

fn section(heading: &str, lines: &[String], layout: UsageLayout) -> String {
    let margin = " ".repeat(layout.left_margin);
    let mut text = heading.to_owned();
    for line in lines {
        text.push('\n');
        if !line.is_empty() {
            text.push_str(&margin);
            text.push_str(line);
        }
    }
    text
}

fn usage_line(
    ctx: &CommandContext,
    has_options: bool,
    positionals: &[(&str, &ArgSchema)],
) -> String {
    let env = ctx.env();
    let mut line = env.name().unwrap_or_else(|| ctx.name()).to_owned();
    match ctx.call_mode() {
        CallMode::SubCommand => {
            line.push(' ');
            line.push_str(ctx.name());
        }
        CallMode::Entry | CallMode::Unexpected if !env.sub_commands().is_empty() => {
            line.push_str(" [COMMANDS]");
        }
        CallMode::Entry | CallMode::Unexpected => {}
    }
    if has_options {
        line.push_str(" <OPTIONS>");
    }
    for (name, schema) in positionals {
        let suffix = if schema.is_multiple() { "..." } else { "" };
        if schema.is_required() {
            line.push_str(&format!(" <{name}{suffix}>"));
        } else {
            line.push_str(&format!(" [{name}{suffix}]"));
        }
    }
    line
}

fn commands_section(
    ctx: &CommandContext,
    texts: &UsageTexts,
    layout: UsageLayout,
) -> Option<String> {
    let env = ctx.env();
    if ctx.call_mode() == CallMode::SubCommand || env.sub_commands().is_empty() {
        return None;
    }
    let program = env.name().unwrap_or_else(|| ctx.name());
    let rows: Vec<(String, String)> = env
        .sub_commands()
        .iter()
        .map(|(name, entry)| {
            (
                name.to_owned(),
                texts
                    .listed_description(name)
                    .or_else(|| entry.description())
                    .unwrap_or_default()
                    .to_owned(),
            )
        })
        .collect();
    let listing = section(
        texts.text(BuiltinKey::Commands),
        &align(&rows, layout),
        layout,
    );
    let hints: Vec<String> = env
        .sub_commands()
        .iter()
        .map(|(name, _)| format!("{program} {name} --help"))
        .collect();
    let footer = section(texts.text(BuiltinKey::ForMore), &hints, layout);
    Some(format!("{listing}\n\n{footer}"))
}

fn positional_rows(positionals: &[(&str, &ArgSchema)], texts: &UsageTexts) -> Vec<(String, String)> {
    positionals
        .iter()
        .map(|(name, _)| {
            (
                (*name).to_owned(),
                texts.description(name).unwrap_or_default().to_owned(),
            )
        })
        .collect()
}

fn long_name(name: &str, schema: &ArgSchema, to_kebab: bool) -> String {
    if to_kebab || schema.is_kebab() {
        to_kebab_case(name)
    } else {
        name.to_owned()
    }
}

fn option_rows(
    options: &[(&str, &ArgSchema)],
    texts: &UsageTexts,
    to_kebab: bool,
    layout: UsageLayout,
) -> Vec<(String, String)> {
    let indent_long = options
        .iter()
        .any(|(_, schema)| schema.short_alias().is_some());
    let long_prefix = if indent_long { "    --" } else { "--" };
    let mut rows = Vec::with_capacity(options.len());
    for (name, schema) in options {
        let long = long_name(name, schema, to_kebab);
        let mut key = schema.short_alias().map_or_else(
            || format!("{long_prefix}{long}"),
            |short| format!("-{short}, --{long}"),
        );
        if layout.option_type && schema.kind().takes_value() {
            key.push_str(&format!(" <{}>", schema.kind()));
        }
        let mut parts: Vec<String> = texts
            .description(name)
            .map(str::to_owned)
            .into_iter()
            .collect();
        if layout.option_value {
            parts.extend(value_hints(schema, texts));
        }
        rows.push((key, parts.join(" ")));

        if schema.is_negatable() && schema.kind() == ArgKind::Boolean {
            rows.push((
                format!("{long_prefix}no-{long}"),
                format!("{} --{long}", texts.text(BuiltinKey::Negatable)),
            ));
        }
    }
    rows
}

fn value_hints(schema: &ArgSchema, texts: &UsageTexts) -> Vec<String> {
    let mut hints = Vec::new();
    if let Some(default) = schema.default() {
        hints.push(format!("({}: {default})", texts.text(BuiltinKey::Default)));
    }
    if schema.kind() == ArgKind::Enum && !schema.choices().is_empty() {
        hints.push(format!(
            "({}: {})",
            texts.text(BuiltinKey::Choices),
            schema.choices().join(" | ")
        ));
    }
    hints
}

fn align(rows: &[(String, String)], layout: UsageLayout) -> Vec<String> {
    let width = rows
        .iter()
        .map(|(key, _)| key.as_str().width())
        .max()
        .unwrap_or(0);
    rows.iter()
        .map(|(key, description)| {
            let padding = width.saturating_sub(key.as_str().width()) + layout.middle_margin;
            format!("{key}{}{description}", " ".repeat(padding))
                .trim_end()
                .to_owned()
        })
        .collect()
}
