//! Conservative address syntax check, run before any network access.

mod types;

pub use types::{EmailAddress, SyntaxError};

use std::sync::LazyLock;

use regex::Regex;

/// Practical subset of RFC 5322: ASCII local part, dotted domain, alphabetic
/// TLD of at least two characters.
const ADDRESS_PATTERN: &str = r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$";

static ADDRESS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(ADDRESS_PATTERN).expect("address pattern is a valid regex")
});

/// Returns `true` when `address` matches the accepted grammar.
///
/// Total and pure: never touches the network and never panics. Surrounding
/// whitespace is not trimmed and makes the input invalid.
pub fn is_valid_syntax(address: &str) -> bool {
    !address.is_empty() && ADDRESS_RE.is_match(address)
}

impl EmailAddress {
    pub fn parse(address: &str) -> Result<Self, SyntaxError> {
        if address.is_empty() {
            return Err(SyntaxError::Empty);
        }
        if !is_valid_syntax(address) {
            return Err(SyntaxError::Malformed);
        }
        // the grammar forbids '@' on either side, so the first one is the separator
        let (local, domain) = address.split_once('@').ok_or(SyntaxError::Malformed)?;
        Ok(Self {
            local: local.to_string(),
            domain: domain.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn accepts_basic() {
        assert!(is_valid_syntax("alice@example.com"));
        assert!(is_valid_syntax("first.last+tag@mail.example.co.uk"));
        assert!(is_valid_syntax("x_%-y@sub-domain.example.org"));
    }

    #[test]
    fn rejects_malformed() {
        for input in [
            "",
            "plainaddress",
            "@example.com",
            "alice@",
            "alice@example",
            "alice@example.c",
            "alice@example.c0m",
            "a@@example.com",
            "alice@exa mple.com",
            " alice@example.com",
            "alice@example.com ",
            "alice@example.com\n",
            "al!ce@example.com",
            "péché@example.com",
            "alice@exämple.com",
        ] {
            assert!(!is_valid_syntax(input), "{input:?} should be rejected");
        }
    }

    #[test]
    fn parse_splits_parts() {
        let addr = EmailAddress::parse("bob.smith@example.net").unwrap();
        assert_eq!(addr.local(), "bob.smith");
        assert_eq!(addr.domain(), "example.net");
        assert_eq!(addr.to_string(), "bob.smith@example.net");
    }

    #[test]
    fn parse_reports_empty_and_malformed() {
        assert_eq!(EmailAddress::parse(""), Err(SyntaxError::Empty));
        assert_eq!(EmailAddress::parse("nope"), Err(SyntaxError::Malformed));
    }

    proptest! {
        #[test]
        fn syntax_check_is_idempotent(input in ".{0,64}") {
            prop_assert_eq!(is_valid_syntax(&input), is_valid_syntax(&input));
        }

        #[test]
        fn generated_addresses_are_accepted(
            local in "[A-Za-z0-9._%+-]{1,20}",
            label in "[A-Za-z0-9-]{1,20}",
            tld in "[A-Za-z]{2,6}",
        ) {
            let address = format!("{local}@{label}.{tld}");
            prop_assert!(is_valid_syntax(&address));
            let parsed = EmailAddress::parse(&address).unwrap();
            prop_assert_eq!(parsed.local(), local.as_str());
        }

        #[test]
        fn inputs_without_at_are_rejected(input in "[^@]{0,40}") {
            prop_assert!(!is_valid_syntax(&input));
        }
    }
}
