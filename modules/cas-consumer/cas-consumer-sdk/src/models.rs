//! Domain models for the CAS consumer module.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// CAS ticket validation protocol spoken by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ProtocolVersion {
    /// CAS 1.0: plain-text `yes`/`no` line protocol.
    Cas1,
    /// CAS 2.0: XML `serviceResponse` documents.
    Cas2,
}

impl ProtocolVersion {
    /// Numeric version as it appears in configuration.
    #[must_use]
    pub fn as_u8(self) -> u8 {
        match self {
            Self::Cas1 => 1,
            Self::Cas2 => 2,
        }
    }
}

impl TryFrom<u8> for ProtocolVersion {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Cas1),
            2 => Ok(Self::Cas2),
            other => Err(other),
        }
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cas1 => f.write_str("CAS1"),
            Self::Cas2 => f.write_str("CAS2"),
        }
    }
}

/// Normalized outcome of parsing one provider response.
///
/// The value is immutable and always satisfies:
/// - unsuccessful results carry no identifiers and no attributes;
/// - successful results carry at least one identifier, the first of which
///   is the primary identifier.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationResult {
    success: bool,
    primary_identifier: String,
    identifiers: Vec<String>,
    attributes: BTreeMap<String, String>,
}

impl ValidationResult {
    /// The provider rejected the ticket (or the response could not be read
    /// as an acceptance).
    #[must_use]
    pub fn failure() -> Self {
        Self::default()
    }

    /// The provider accepted the ticket for `primary`.
    ///
    /// Blank secondary identifiers are dropped. A blank `primary` yields
    /// [`ValidationResult::failure`].
    #[must_use]
    pub fn success<I>(primary: &str, secondary: I, attributes: BTreeMap<String, String>) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let primary = primary.trim();
        if primary.is_empty() {
            return Self::failure();
        }

        let mut identifiers = vec![primary.to_owned()];
        identifiers.extend(
            secondary
                .into_iter()
                .map(Into::into)
                .map(|id: String| id.trim().to_owned())
                .filter(|id| !id.is_empty()),
        );

        Self {
            success: true,
            primary_identifier: primary.to_owned(),
            identifiers,
            attributes,
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Empty for failed validations.
    #[must_use]
    pub fn primary_identifier(&self) -> &str {
        &self.primary_identifier
    }

    /// Primary identifier first, then secondary identifiers in response order.
    #[must_use]
    pub fn identifiers(&self) -> &[String] {
        &self.identifiers
    }

    #[must_use]
    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

/// Local password state of a user record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    /// Never accepted as a local credential. Users created from CAS
    /// assertions always carry this marker.
    Unusable,
    /// Store-owned password hash.
    Hashed(String),
}

impl Credential {
    #[must_use]
    pub fn is_usable(&self) -> bool {
        matches!(self, Self::Hashed(_))
    }
}

/// A user record owned by the external user store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocalUser {
    /// Store-assigned identifier; ascending in creation order.
    pub id: i64,
    pub username: String,
    pub email: Option<String>,
    pub is_active: bool,
    #[serde(skip)]
    pub credential: Credential,
}

/// Data for a user record about to be created by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLocalUser {
    pub username: String,
    pub credential: Credential,
    pub email: Option<String>,
}

/// Local users that matched one validation besides the chosen primary.
///
/// Produced only when more than one local user matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeCandidateSet {
    pub primary: LocalUser,
    /// Remaining matches, in ascending id order.
    pub others: Vec<LocalUser>,
}

/// Events announced to subscribers after a ticket was validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CasEvent {
    /// A user was authenticated through CAS.
    Authenticated {
        user: LocalUser,
        attributes: BTreeMap<String, String>,
    },
    /// Several local users matched the validated identities. The others may
    /// be merged into the primary as appropriate for the application.
    MergeCandidates {
        primary: LocalUser,
        others: Vec<LocalUser>,
    },
}

impl CasEvent {
    /// Short event name for logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Authenticated { .. } => "authenticated",
            Self::MergeCandidates { .. } => "merge_candidates",
        }
    }
}

/// Identifies the validation attempt a fatal error belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationContext {
    pub ticket: String,
    pub service: String,
    pub protocol: ProtocolVersion,
}

impl fmt::Display for ValidationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "protocol={} service={} ticket={}",
            self.protocol, self.service, self.ticket
        )
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn success_puts_primary_first() {
        let result = ValidationResult::success("foo", ["bar", "baz"], BTreeMap::new());

        assert!(result.is_success());
        assert_eq!(result.primary_identifier(), "foo");
        assert_eq!(result.identifiers(), ["foo", "bar", "baz"]);
    }

    #[test]
    fn success_drops_blank_secondary_identifiers() {
        let result = ValidationResult::success("foo", ["", "  ", "bar"], BTreeMap::new());

        assert_eq!(result.identifiers(), ["foo", "bar"]);
    }

    #[test]
    fn blank_primary_is_failure() {
        let attributes = BTreeMap::from([("email".to_owned(), "a@b.c".to_owned())]);
        let result = ValidationResult::success("  ", ["bar"], attributes);

        assert_eq!(result, ValidationResult::failure());
        assert!(result.identifiers().is_empty());
        assert!(result.attributes().is_empty());
    }

    #[test]
    fn protocol_version_from_config_number() {
        assert_eq!(ProtocolVersion::try_from(1_u8), Ok(ProtocolVersion::Cas1));
        assert_eq!(ProtocolVersion::try_from(2_u8), Ok(ProtocolVersion::Cas2));
        assert_eq!(ProtocolVersion::try_from(3_u8), Err(3));
    }

    #[test]
    fn local_user_json_omits_credential() {
        let user = LocalUser {
            id: 7,
            username: "foo".to_owned(),
            email: None,
            is_active: true,
            credential: Credential::Hashed("secret-hash".to_owned()),
        };

        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["username"], "foo");
        assert!(json.get("credential").is_none());
    }
}
