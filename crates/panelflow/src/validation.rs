//! Field format checks.
//!
//! Checks never block input: a suspicious value is still entered, the check
//! result only ends up as a warning in logs and in the outcome payload.

use regex::Regex;
use std::sync::OnceLock;

const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";
const PHONE_PATTERN: &str = r"^\+?[0-9()\-\s.]+$";
const MIN_PHONE_DIGITS: usize = 7;

/// Result of a format check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldCheck {
    /// Looks well-formed
    Valid,
    /// Probably wrong; the reason is suitable for a warning
    Suspicious(String),
}

impl FieldCheck {
    /// Whether the value looks well-formed
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// Warning text, if suspicious
    #[must_use]
    pub fn warning(&self) -> Option<&str> {
        match self {
            Self::Valid => None,
            Self::Suspicious(reason) => Some(reason),
        }
    }
}

#[allow(clippy::expect_used)]
fn pattern(cell: &'static OnceLock<Regex>, source: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(source).expect("static pattern compiles"))
}

/// Check that `email` looks like `local@domain.tld`
#[must_use]
pub fn check_email(email: &str) -> FieldCheck {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    if pattern(&EMAIL, EMAIL_PATTERN).is_match(email) {
        FieldCheck::Valid
    } else {
        FieldCheck::Suspicious(format!("Email '{email}' may not be valid format"))
    }
}

/// Check that `phone` is made of digits and separators, with enough digits
#[must_use]
pub fn check_phone(phone: &str) -> FieldCheck {
    static PHONE: OnceLock<Regex> = OnceLock::new();
    let digits = phone.chars().filter(char::is_ascii_digit).count();
    if pattern(&PHONE, PHONE_PATTERN).is_match(phone) && digits >= MIN_PHONE_DIGITS {
        FieldCheck::Valid
    } else {
        FieldCheck::Suspicious(format!("Phone '{phone}' may not be valid format"))
    }
}
