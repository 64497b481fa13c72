//! Phone number normalization and display formatting.
//!
//! Stored numbers are always the normalized digit string. Search terms run
//! through the same normalization, which is why [`normalize_phone`] accepts
//! and returns partial digit strings instead of rejecting them.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Phone`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum PhoneError {
    /// The input did not normalize to exactly 10 digits.
    #[error("phone number must have exactly 10 digits (got {got})")]
    WrongLength {
        /// Number of digits after normalization.
        got: usize,
    },
}

/// Normalize a raw phone string to bare digits.
///
/// Strips every non-digit character. An 11-digit result with a leading `1`
/// (the North American country code) drops the `1`. Anything else, including
/// partial digit strings from search input, passes through unmodified.
pub fn normalize_phone(raw: &str) -> String {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.len() == 11 && digits.starts_with('1') {
        digits.chars().skip(1).collect()
    } else {
        digits
    }
}

/// Format a normalized phone number for display.
///
/// Exactly 10 digits render as `(AAA) BBB-CCCC`; anything else is returned
/// unchanged, so partial or foreign numbers still display as stored.
#[must_use]
pub fn format_phone(normalized: &str) -> String {
    if normalized.len() == 10 && normalized.chars().all(|c| c.is_ascii_digit()) {
        format!(
            "({}) {}-{}",
            &normalized[..3],
            &normalized[3..6],
            &normalized[6..]
        )
    } else {
        normalized.to_owned()
    }
}

/// A validated 10-digit phone number.
///
/// Provisioning requires a complete number; searches do not and use
/// [`normalize_phone`] directly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Phone(String);

impl Phone {
    /// Parse a `Phone` from raw input.
    ///
    /// # Errors
    ///
    /// Returns [`PhoneError::WrongLength`] unless the input normalizes to
    /// exactly 10 digits.
    pub fn parse(raw: &str) -> Result<Self, PhoneError> {
        let digits = normalize_phone(raw);
        if digits.len() == 10 {
            Ok(Self(digits))
        } else {
            Err(PhoneError::WrongLength { got: digits.len() })
        }
    }

    /// Returns the normalized digit string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Render as `(AAA) BBB-CCCC`.
    #[must_use]
    pub fn display(&self) -> String {
        format_phone(&self.0)
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

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Phone {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Phone {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self(s))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Phone {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_punctuation() {
        assert_eq!(normalize_phone("(555) 123-4567"), "5551234567");
        assert_eq!(normalize_phone("555.123.4567"), "5551234567");
        assert_eq!(normalize_phone("555 123 4567 ext"), "5551234567");
    }

    #[test]
    fn test_normalize_drops_country_code() {
        assert_eq!(normalize_phone("1-555-123-4567"), "5551234567");
        assert_eq!(normalize_phone("+1 (555) 123-4567"), "5551234567");
    }

    #[test]
    fn test_normalize_keeps_11_digits_without_leading_one() {
        assert_eq!(normalize_phone("25551234567"), "25551234567");
    }

    #[test]
    fn test_normalize_passes_partials_through() {
        assert_eq!(normalize_phone("555"), "555");
        assert_eq!(normalize_phone("55-51"), "5551");
        assert_eq!(normalize_phone(""), "");
    }

    #[test]
    fn test_format_ten_digits() {
        assert_eq!(format_phone("5551234567"), "(555) 123-4567");
    }

    #[test]
    fn test_format_leaves_other_lengths_alone() {
        assert_eq!(format_phone("555"), "555");
        assert_eq!(format_phone("55512345678"), "55512345678");
        assert_eq!(format_phone(""), "");
    }

    #[test]
    fn test_format_normalize_roundtrip() {
        // For all 10-digit normalized numbers, normalize(format(p)) == p.
        for p in ["5551234567", "2125550100", "9999999999", "2025551212"] {
            assert_eq!(normalize_phone(&format_phone(p)), p);
        }
    }

    #[test]
    fn test_parse_requires_ten_digits() {
        assert!(Phone::parse("(555) 123-4567").is_ok());
        assert!(Phone::parse("+1 555 123 4567").is_ok());
        assert!(matches!(
            Phone::parse("12345"),
            Err(PhoneError::WrongLength { got: 5 })
        ));
    }

    #[test]
    fn test_phone_display() {
        let phone = Phone::parse("555-123-4567").unwrap();
        assert_eq!(phone.as_str(), "5551234567");
        assert_eq!(phone.display(), "(555) 123-4567");
    }
}
