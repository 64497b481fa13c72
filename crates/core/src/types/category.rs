//! Service category.

use serde::{Deserialize, Serialize};

/// A service's functional grouping.
///
/// Categories map to the kinds of mobile work a technician performs on a
/// vehicle and, with the customer classification, determine job priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "service_category", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum ServiceCategory {
    /// Advanced driver-assistance calibration.
    Adas,
    /// Airbag module service.
    Airbag,
    /// Immobilizer and key work.
    Immo,
    /// Module programming.
    Prog,
    /// Diagnostics.
    Diag,
}

impl ServiceCategory {
    /// All categories, useful for seeding and exhaustive tests.
    pub const ALL: [Self; 5] = [
        Self::Adas,
        Self::Airbag,
        Self::Immo,
        Self::Prog,
        Self::Diag,
    ];
}

impl std::fmt::Display for ServiceCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Adas => write!(f, "adas"),
            Self::Airbag => write!(f, "airbag"),
            Self::Immo => write!(f, "immo"),
            Self::Prog => write!(f, "prog"),
            Self::Diag => write!(f, "diag"),
        }
    }
}

impl std::str::FromStr for ServiceCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "adas" => Ok(Self::Adas),
            "airbag" => Ok(Self::Airbag),
            "immo" => Ok(Self::Immo),
            "prog" => Ok(Self::Prog),
            "diag" => Ok(Self::Diag),
            _ => Err(format!("invalid service category: {s}")),
        }
    }
}
