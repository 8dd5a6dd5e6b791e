//! CAS 1.0 plain-text validation responses.
//!
//! ```text
//! yes
//! primary
//! alias-1
//! ```

use std::collections::BTreeMap;

use cas_consumer_sdk::{ProtocolVersion, ValidationResult};
use tracing::{debug, warn};

use super::TicketValidator;
use crate::domain::error::DomainError;

#[derive(Debug, Clone, Copy, Default)]
pub struct Cas1Validator;

impl TicketValidator for Cas1Validator {
    fn protocol(&self) -> ProtocolVersion {
        ProtocolVersion::Cas1
    }

    fn parse(&self, body: &[u8]) -> Result<ValidationResult, DomainError> {
        let text = std::str::from_utf8(body)
            .map_err(|e| DomainError::protocol(format!("CAS1 response is not UTF-8: {e}")))?;
        let mut lines = text.lines();

        let verdict = lines.next().map(str::trim).unwrap_or_default();
        debug!(verdict, "CAS1 verdict");
        if verdict != "yes" {
            return Ok(ValidationResult::failure());
        }

        let mut identifiers = lines.map(str::trim).filter(|line| !line.is_empty());
        let Some(primary) = identifiers.next() else {
            warn!("CAS1 provider answered yes without an identifier");
            return Ok(ValidationResult::failure());
        };

        let result = ValidationResult::success(primary, identifiers, BTreeMap::new());
        debug!(
            count = result.identifiers().len(),
            identifiers = ?result.identifiers(),
            "Verified usernames"
        );
        Ok(result)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn parse(body: &str) -> ValidationResult {
        Cas1Validator.parse(body.as_bytes()).unwrap()
    }

    #[test]
    fn yes_with_single_identifier() {
        let result = parse("yes\nfoo\n");

        assert!(result.is_success());
        assert_eq!(result.primary_identifier(), "foo");
        assert_eq!(result.identifiers(), ["foo"]);
        assert!(result.attributes().is_empty());
    }

    #[test]
    fn yes_with_aliases_skips_blank_lines() {
        let result = parse("yes\r\nfoo\r\n\r\n  bar  \n\n\tbaz\n");

        assert_eq!(result.primary_identifier(), "foo");
        assert_eq!(result.identifiers(), ["foo", "bar", "baz"]);
    }

    #[test]
    fn verdict_tolerates_surrounding_whitespace() {
        assert!(parse("  yes \nfoo").is_success());
    }

    #[test]
    fn no_is_failure_regardless_of_content() {
        let result = parse("no\nfoo\nbar\n");

        assert!(!result.is_success());
        assert!(result.identifiers().is_empty());
        assert!(result.attributes().is_empty());
    }

    #[test]
    fn anything_but_yes_is_failure() {
        for body in ["", "YES\nfoo", "yes please\nfoo", "<html>error</html>", "\nyes\nfoo"] {
            assert_eq!(parse(body), ValidationResult::failure(), "body {body:?}");
        }
    }

    #[test]
    fn yes_without_identifier_is_failure() {
        assert_eq!(parse("yes\n\n  \n"), ValidationResult::failure());
    }

    #[test]
    fn invalid_utf8_is_protocol_error() {
        for body in [&b"yes\nf\xffo\n"[..], &b"yes\nf\xfeo\n"[..]] {
            let err = Cas1Validator.parse(body).unwrap_err();
            assert!(matches!(err, DomainError::Protocol(_)), "got {err:?}");
        }
    }
}
