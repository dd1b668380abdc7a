//! Unit tests for validation messages.

use rstest::rstest;

use super::*;

#[test]
fn enum_mismatch_lists_quoted_choices() {
    let schema = ArgSchema::enumeration(["a", "b", "c"]);
    let error = ArgResolveError::type_mismatch("foo", &schema, false);
    assert_eq!(
        error.to_string(),
        r#"Optional argument '--foo' should be chosen from 'enum' ["a", "b", "c"] values"#
    );
    assert_eq!(error.kind(), ArgResolveErrorKind::Type);
}

#[rstest]
#[case::number(ArgSchema::number(), "Optional argument '--count' should be 'number'")]
#[case::with_short(
    ArgSchema::string().short('c'),
    "Optional argument '-c, --count' should be 'string'"
)]
fn type_mismatch_messages(#[case] schema: ArgSchema, #[case] expected: &str) {
    let error = ArgResolveError::type_mismatch("count", &schema, false);
    assert_eq!(error.message(), expected);
}

#[test]
fn required_messages_distinguish_positionals() {
    let option = ArgResolveError::required("dryRun", &ArgSchema::boolean(), true);
    let positional = ArgResolveError::required("file", &ArgSchema::positional(), false);
    assert_eq!(
        option.message(),
        "Optional argument '--dry-run' is required"
    );
    assert_eq!(positional.message(), "Positional argument 'file' is required");
}

#[test]
fn aggregate_display_joins_lines() {
    let errors = ArgResolveErrors::new(vec![
        ArgResolveError::new("a", ArgResolveErrorKind::Custom, "first"),
        ArgResolveError::new("b", ArgResolveErrorKind::Custom, "second"),
    ]);
    assert_eq!(errors.to_string(), "first\nsecond");
    assert_eq!(errors.len(), 2);
    assert!(!errors.is_empty());
}
