//! Contact email captured on sign-up.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing an [`Email`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EmailError {
    /// Nothing was entered.
    #[error("Email address is required")]
    Empty,
    /// The input is not shaped like `name@domain.tld`.
    #[error("Invalid email address")]
    Invalid,
}

/// A contact email address.
///
/// Input is trimmed. A valid address has exactly one `@`, a non-empty name
/// before it and a dotted domain after it whose labels are all non-empty.
/// Whitespace anywhere inside is rejected.
///
/// ```
/// use fabric_core::Email;
///
/// assert!(Email::parse(" orders@weave.example ").is_ok());
/// assert!(Email::parse("orders@localhost").is_err());
/// assert!(Email::parse("orders@@weave.example").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// Longest accepted address (RFC 5321).
    pub const MAX_LENGTH: usize = 254;

    /// Parse an `Email` from user input.
    ///
    /// # Errors
    ///
    /// Returns [`EmailError::Empty`] for blank input and
    /// [`EmailError::Invalid`] for anything that is not a plausible address.
    pub fn parse(s: &str) -> Result<Self, EmailError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(EmailError::Empty);
        }
        if trimmed.len() > Self::MAX_LENGTH || trimmed.chars().any(char::is_whitespace) {
            return Err(EmailError::Invalid);
        }

        let (name, domain) = trimmed.split_once('@').ok_or(EmailError::Invalid)?;
        let domain_ok = domain.contains('.') && domain.split('.').all(|label| !label.is_empty());
        if name.is_empty() || domain.contains('@') || !domain_ok {
            return Err(EmailError::Invalid);
        }

        Ok(Self(trimmed.to_owned()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }

    /// The part after the `@`.
    #[must_use]
    pub fn domain(&self) -> &str {
        self.0.split_once('@').map_or("", |(_, domain)| domain)
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Email {
    type Err = EmailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_ordinary_addresses() {
        for input in [
            "orders@weave.example",
            "sales.team+silk@mills.co.in",
            "a@b.c",
        ] {
            assert!(Email::parse(input).is_ok(), "{input}");
        }
    }

    #[test]
    fn test_trims_surrounding_whitespace() {
        let email = Email::parse("  orders@weave.example\n").unwrap();
        assert_eq!(email.as_str(), "orders@weave.example");
        assert_eq!(email.domain(), "weave.example");
    }

    #[test]
    fn test_blank_is_empty_error() {
        assert_eq!(Email::parse("   "), Err(EmailError::Empty));
        assert_eq!(EmailError::Empty.to_string(), "Email address is required");
    }

    #[test]
    fn test_rejects_malformed_addresses() {
        for input in [
            "bad",
            "@weave.example",
            "orders@",
            "orders@localhost",
            "orders@weave..example",
            "orders@.example",
            "orders@@weave.example",
            "sales team@weave.example",
        ] {
            assert_eq!(Email::parse(input), Err(EmailError::Invalid), "{input}");
        }
    }

    #[test]
    fn test_rejects_overlong_address() {
        let long = format!("{}@weave.example", "a".repeat(250));
        assert_eq!(Email::parse(&long), Err(EmailError::Invalid));
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let email = Email::parse("orders@weave.example").unwrap();
        assert_eq!(
            serde_json::to_string(&email).unwrap(),
            "\"orders@weave.example\""
        );
    }
}
