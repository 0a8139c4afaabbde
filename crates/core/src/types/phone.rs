//! Contact phone number type.

use core::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Characters a phone number may be written with: an optional leading `+`,
/// then digits and the usual separators.
static PHONE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\+?[\d\s()\-]+$").expect("static phone pattern is valid")
});

/// Errors that can occur when parsing a [`Phone`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PhoneError {
    /// The input string is empty (after trimming).
    #[error("phone is required")]
    Empty,
    /// The input contains characters other than digits and separators.
    #[error("phone may only contain digits, spaces, '-', '(' and ')'")]
    InvalidCharacters,
    /// The number of digits is outside the accepted range.
    #[error("phone must contain 10 or 11 digits (got {digits})")]
    WrongLength {
        /// Number of digits found.
        digits: usize,
    },
    /// An 11-digit number that does not start with a 7 or 8 trunk prefix.
    #[error("phone must start with +7, 7 or 8")]
    InvalidPrefix,
}

/// A Russian contact phone number.
///
/// ## Constraints
///
/// - Non-empty after trimming
/// - Only digits, spaces, `-`, `(`, `)` and an optional leading `+`
/// - 10 digits (local form), or 11 digits starting with 7 or 8
/// - A leading `+` must be followed by country code 7
///
/// The input spelling is kept; [`Phone::digits`] gives the bare digits.
///
/// ## Examples
///
/// ```
/// use bosanoga_core::Phone;
///
/// assert!(Phone::parse("+7 (999) 123-45-67").is_ok());
/// assert!(Phone::parse("89991234567").is_ok());
/// assert!(Phone::parse("9991234567").is_ok());
///
/// assert!(Phone::parse("").is_err());
/// assert!(Phone::parse("+1 555 123 4567").is_err());
/// assert!(Phone::parse("12345").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Phone(String);

impl Phone {
    /// Parse a `Phone` from user input. Surrounding whitespace is trimmed.
    ///
    /// # Errors
    ///
    /// Returns an error if the input:
    /// - Is empty
    /// - Contains characters other than digits and separators
    /// - Has fewer than 10 or more than 11 digits
    /// - Has 11 digits but no 7/8 prefix, or a `+` not followed by 7
    pub fn parse(s: &str) -> Result<Self, PhoneError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(PhoneError::Empty);
        }

        if !PHONE_PATTERN.is_match(trimmed) {
            return Err(PhoneError::InvalidCharacters);
        }

        let digits: String = trimmed.chars().filter(char::is_ascii_digit).collect();
        match digits.len() {
            10 => {
                if trimmed.starts_with('+') {
                    return Err(PhoneError::InvalidPrefix);
                }
            }
            11 => {
                let trunk_ok = if trimmed.starts_with('+') {
                    digits.starts_with('7')
                } else {
                    digits.starts_with('7') || digits.starts_with('8')
                };
                if !trunk_ok {
                    return Err(PhoneError::InvalidPrefix);
                }
            }
            n => return Err(PhoneError::WrongLength { digits: n }),
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the phone number as entered (trimmed).
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns only the digits of the number.
    #[must_use]
    pub fn digits(&self) -> String {
        self.0.chars().filter(char::is_ascii_digit).collect()
    }

    /// Consumes the `Phone` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Phone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Phone {
    type Err = PhoneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Phone {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
