//! Deterministic job priority assignment.

use crate::types::category::ServiceCategory;
use crate::types::classification::Classification;

/// Compute the priority for a job, lower is more urgent.
///
/// Rules are evaluated top to bottom, first match wins:
///
/// 1. insurance work
/// 2. commercial ADAS
/// 5. commercial programming or diagnostics
/// 3. airbag (any remaining classification)
/// 4. immobilizer (any remaining classification)
/// 6. residential programming
/// 7. residential ADAS
/// 8. residential diagnostics, and everything else
///
/// The result is always in `1..=8`.
#[must_use]
pub const fn job_priority(classification: Classification, category: ServiceCategory) -> i16 {
    use Classification::{Commercial, Insurance, Residential};
    use ServiceCategory::{Adas, Airbag, Diag, Immo, Prog};

    match (classification, category) {
        (Insurance, _) => 1,
        (Commercial, Adas) => 2,
        (Commercial, Prog | Diag) => 5,
        (_, Airbag) => 3,
        (_, Immo) => 4,
        (Residential, Prog) => 6,
        (Residential, Adas) => 7,
        (Residential, Diag) => 8,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Classification::{Commercial, Insurance, Residential};
    use ServiceCategory::{Adas, Airbag, Diag, Immo, Prog};

    #[test]
    fn test_insurance_always_first() {
        for category in ServiceCategory::ALL {
            assert_eq!(job_priority(Insurance, category), 1);
        }
    }

    #[test]
    fn test_commercial_rows() {
        assert_eq!(job_priority(Commercial, Adas), 2);
        assert_eq!(job_priority(Commercial, Prog), 5);
        assert_eq!(job_priority(Commercial, Diag), 5);
        assert_eq!(job_priority(Commercial, Airbag), 3);
        assert_eq!(job_priority(Commercial, Immo), 4);
    }

    #[test]
    fn test_residential_rows() {
        assert_eq!(job_priority(Residential, Airbag), 3);
        assert_eq!(job_priority(Residential, Immo), 4);
        assert_eq!(job_priority(Residential, Prog), 6);
        assert_eq!(job_priority(Residential, Adas), 7);
        assert_eq!(job_priority(Residential, Diag), 8);
    }

    #[test]
    fn test_range_invariant() {
        for classification in [Residential, Commercial, Insurance] {
            for category in ServiceCategory::ALL {
                let p = job_priority(classification, category);
                assert!((1..=8).contains(&p));
            }
        }
    }
}
