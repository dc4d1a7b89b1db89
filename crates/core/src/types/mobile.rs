//! Mobile number type used as the admin login identifier.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`MobileNumber`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MobileNumberError {
    /// The input string is empty.
    #[error("Mobile number is required")]
    Empty,
    /// The input is not exactly ten ASCII digits.
    #[error("Mobile number must be exactly {expected} digits")]
    InvalidFormat {
        /// Required number of digits.
        expected: usize,
    },
}

/// A ten-digit mobile number.
///
/// Surrounding whitespace is ignored; anything other than exactly ten ASCII
/// digits is rejected (no country code, no separators).
///
/// ```
/// use fabric_core::MobileNumber;
///
/// assert!(MobileNumber::parse("9876543210").is_ok());
/// assert!(MobileNumber::parse("+919876543210").is_err());
/// assert!(MobileNumber::parse("98765").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct MobileNumber(String);

impl MobileNumber {
    /// Number of digits in a valid mobile number.
    pub const DIGITS: usize = 10;

    /// Parse a `MobileNumber` from user input.
    ///
    /// # Errors
    ///
    /// Returns an error if the trimmed input is empty or is not exactly
    /// [`Self::DIGITS`] ASCII digits.
    pub fn parse(s: &str) -> Result<Self, MobileNumberError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(MobileNumberError::Empty);
        }

        if trimmed.len() != Self::DIGITS || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(MobileNumberError::InvalidFormat {
                expected: Self::DIGITS,
            });
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MobileNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for MobileNumber {
    type Err = MobileNumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_ten_digits() {
        let number = MobileNumber::parse(" 9876543210 ").expect("valid");
        assert_eq!(number.as_str(), "9876543210");
    }

    #[test]
    fn test_rejects_empty() {
        assert_eq!(MobileNumber::parse("   "), Err(MobileNumberError::Empty));
    }

    #[test]
    fn test_rejects_wrong_length_and_non_digits() {
        for input in ["987654321", "98765432101", "98765-4321", "98765432a0"] {
            assert_eq!(
                MobileNumber::parse(input),
                Err(MobileNumberError::InvalidFormat { expected: 10 }),
                "{input} should be rejected"
            );
        }
    }
}
