//! Bangladeshi mobile number validation and display formatting.

use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

// ASCII digits only: `\d` would also accept Bengali numerals.
static BD_MOBILE_REGEX: OnceLock<Regex> = OnceLock::new();

fn bd_mobile_regex() -> &'static Regex {
    BD_MOBILE_REGEX
        .get_or_init(|| Regex::new(r"^01[3-9][0-9]{8}$").expect("mobile pattern is valid"))
}

/// Strip whitespace, hyphens and parentheses.
pub fn clean(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '-' | '(' | ')'))
        .collect()
}

/// True when the cleaned input is an 11-digit `01[3-9]XXXXXXXX` number.
///
/// Country-code prefixes such as `+880` are rejected.
pub fn validate(raw: &str) -> bool {
    bd_mobile_regex().is_match(&clean(raw))
}

/// Format as `01-XXXX-XXXXX` for display. Input that does not look like a
/// national number comes back unchanged; this never validates.
pub fn format(raw: &str) -> String {
    let cleaned = clean(raw);
    if cleaned.len() == 11 && cleaned.is_ascii() && cleaned.starts_with("01") {
        format!("{}-{}-{}", &cleaned[0..2], &cleaned[2..6], &cleaned[6..])
    } else {
        raw.to_string()
    }
}

/// Mask the middle digits for logs, e.g. `018****3277`.
pub fn mask(raw: &str) -> String {
    let cleaned = clean(raw);
    if cleaned.len() >= 7 && cleaned.is_ascii() {
        format!("{}****{}", &cleaned[0..3], &cleaned[cleaned.len() - 4..])
    } else {
        "****".to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("please enter a phone number")]
    Empty,
    #[error("invalid phone number format; use Bangladeshi format 01XXXXXXXXX")]
    InvalidFormat { input: String },
}

impl ValidationError {
    /// Form field the error belongs to.
    pub const fn field(&self) -> &'static str {
        "phone"
    }
}

/// A validated national mobile number, stored without separators.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        if raw.trim().is_empty() {
            return Err(ValidationError::Empty);
        }

        let cleaned = clean(raw);
        if bd_mobile_regex().is_match(&cleaned) {
            Ok(Self(cleaned))
        } else {
            Err(ValidationError::InvalidFormat {
                input: raw.to_string(),
            })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn formatted(&self) -> String {
        format(&self.0)
    }

    pub fn masked(&self) -> String {
        mask(&self.0)
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for PhoneNumber {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

impl AsRef<str> for PhoneNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
