//! Customer classification.

use serde::{Deserialize, Serialize};

/// A customer's billing/urgency category.
///
/// Drives job priority in the order intake pipeline together with the
/// service category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "customer_classification", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Residential,
    Commercial,
    Insurance,
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Residential => write!(f, "residential"),
            Self::Commercial => write!(f, "commercial"),
            Self::Insurance => write!(f, "insurance"),
        }
    }
}

impl std::str::FromStr for Classification {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "residential" => Ok(Self::Residential),
            "commercial" => Ok(Self::Commercial),
            "insurance" => Ok(Self::Insurance),
            _ => Err(format!("invalid customer classification: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_from_str_roundtrip() {
        for c in [
            Classification::Residential,
            Classification::Commercial,
            Classification::Insurance,
        ] {
            assert_eq!(c.to_string().parse::<Classification>().unwrap(), c);
        }
    }

    #[test]
    fn test_from_str_rejects_unknown() {
        assert!("fleet".parse::<Classification>().is_err());
    }
}
