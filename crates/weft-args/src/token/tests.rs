//! Unit tests for the argv tokenizer.

use rstest::rstest;

use super::*;

fn names(tokens: &[ArgToken]) -> Vec<Option<&str>> {
    tokens.iter().map(|t| t.name.as_deref()).collect()
}

#[test]
fn empty_argv_yields_no_tokens() {
    let tokens = parse_args(Vec::<String>::new());
    assert!(tokens.is_empty());
}

#[test]
fn long_option_without_value() {
    let tokens = parse_args(["--foo", "bar"]);
    assert_eq!(
        tokens,
        vec![
            ArgToken::option(0, "--foo", None),
            ArgToken::positional(1, "bar"),
        ]
    );
}

#[test]
fn long_option_with_inline_value() {
    let tokens = parse_args(["--foo=bar=baz"]);
    let token = tokens.first().expect("one token");
    assert_eq!(token.name.as_deref(), Some("foo"));
    assert_eq!(token.value.as_deref(), Some("bar=baz"));
    assert_eq!(token.inline_value, Some(true));
    assert!(token.is_long());
}

#[test]
fn short_group_splits_per_letter() {
    let tokens = parse_args(["-abc"]);
    assert_eq!(names(&tokens), vec![Some("a"), Some("b"), Some("c")]);
    assert!(tokens.iter().all(|t| t.index == 0));
    assert!(tokens.iter().all(|t| !t.is_long()));
}

#[test]
fn short_option_with_inline_value() {
    let tokens = parse_args(["-o=dist"]);
    assert_eq!(tokens, vec![ArgToken::option(0, "-o", Some("dist".into()))]);
}

#[test]
fn terminator_turns_everything_after_into_positionals() {
    let tokens = parse_args(["--foo", "--", "--baz", "-q"]);
    let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::Option,
            TokenKind::OptionTerminator,
            TokenKind::Positional,
            TokenKind::Positional,
        ]
    );
    assert_eq!(
        tokens.get(2).and_then(|t| t.value.as_deref()),
        Some("--baz")
    );
}

#[rstest]
#[case::single_dash("-")]
#[case::word("build")]
#[case::path("./dist/out")]
fn plain_arguments_are_positional(#[case] arg: &str) {
    let tokens = parse_args([arg]);
    assert_eq!(tokens, vec![ArgToken::positional(0, arg)]);
}

#[test]
fn token_kind_display_is_kebab_case() {
    assert_eq!(TokenKind::OptionTerminator.to_string(), "option-terminator");
    assert_eq!(TokenKind::Positional.to_string(), "positional");
}
