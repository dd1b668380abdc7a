//! Name normalisation for long option names.

/// Converts a `camelCase` or `snake_case` key into `kebab-case`.
///
/// Already kebab-cased input is returned unchanged.
///
/// # Example
///
/// ```
/// use weft_args::to_kebab_case;
///
/// assert_eq!(to_kebab_case("dryRun"), "dry-run");
/// assert_eq!(to_kebab_case("log_level"), "log-level");
/// ```
#[must_use]
pub fn to_kebab_case(name: &str) -> String {
    let mut kebab = String::with_capacity(name.len() + 4);
    let mut previous_lower = false;
    for ch in name.chars() {
        if ch == '_' || ch == ' ' {
            if !kebab.ends_with('-') && !kebab.is_empty() {
                kebab.push('-');
            }
            previous_lower = false;
        } else if ch.is_uppercase() {
            if previous_lower {
                kebab.push('-');
            }
            kebab.extend(ch.to_lowercase());
            previous_lower = false;
        } else {
            kebab.push(ch);
            previous_lower = ch.is_lowercase() || ch.is_ascii_digit();
        }
    }
    kebab
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::to_kebab_case;

    #[rstest]
    #[case::camel("dryRun", "dry-run")]
    #[case::snake("log_level", "log-level")]
    #[case::already_kebab("output-dir", "output-dir")]
    #[case::single("foo", "foo")]
    #[case::acronym_tail("useHTTP", "use-http")]
    #[case::digits("ipv4Only", "ipv4-only")]
    fn converts_names(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(to_kebab_case(input), expected);
    }
}
