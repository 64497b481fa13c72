//! Duplicate detection and customer search.
//!
//! A search term is classified once into a phone, email, or name strategy;
//! each strategy runs its own typed query instead of sniffing the string
//! again downstream. The containment, token, and ordering rules are pure
//! functions over fetched candidates so they can be tested without a store.

use sqlx::PgPool;
use tracing::instrument;

use roadcall_core::{CustomerId, Email, normalize_name, normalize_phone};

use crate::db::{CustomerRepository, RepositoryError};
use crate::identity::{IdentityClient, IdentityError};
use crate::models::Customer;

/// Queries shorter than this (after trimming) short-circuit to an empty
/// result set without touching any collaborator.
pub const MIN_QUERY_LEN: usize = 2;

/// Minimum digits (after stripping) for a term to count as a phone search.
const MIN_PHONE_DIGITS: usize = 3;

/// Name similarity at or above this counts as a close match. Carried over
/// from operational tuning; adjust here, not inline.
pub const NAME_SIMILARITY_THRESHOLD: f64 = 0.8;

/// Score bands for name matching.
const SCORE_EXACT: u8 = 100;
const SCORE_PREFIX: u8 = 90;
const SCORE_SUBSTRING: u8 = 80;
const FUZZY_SCORE_SCALE: f64 = 70.0;

/// Errors from search and duplicate detection.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// Relational store failure.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// Identity provider failure (email searches only).
    #[error(transparent)]
    Identity(#[from] IdentityError),
}

/// A classified search term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchTerm {
    /// Normalized digit string.
    Phone(String),
    /// Lowercased email fragment.
    Email(String),
    /// Normalized name query.
    Name(String),
}

impl SearchTerm {
    /// Classify a raw term.
    ///
    /// A term with at least three digits after stripping is a phone search;
    /// otherwise a term containing `@` is an email search; everything else
    /// is a name search.
    #[must_use]
    pub fn classify(raw: &str) -> Self {
        let trimmed = raw.trim();

        let digits = normalize_phone(trimmed);
        if digits.len() >= MIN_PHONE_DIGITS {
            return Self::Phone(digits);
        }

        if trimmed.contains('@') {
            return Self::Email(trimmed.to_lowercase());
        }

        Self::Name(normalize_name(trimmed))
    }

    /// The mode label reported to callers.
    #[must_use]
    pub const fn mode(&self) -> &'static str {
        match self {
            Self::Phone(_) => "phone",
            Self::Email(_) => "email",
            Self::Name(_) => "name",
        }
    }
}

/// Search results keyed by the detected mode.
#[derive(Debug)]
pub struct SearchOutcome {
    pub mode: &'static str,
    pub customers: Vec<Customer>,
}

/// A close-match candidate with its score.
#[derive(Debug)]
pub struct ScoredMatch {
    pub customer: Customer,
    pub score: u8,
}

/// Duplicate detector and search service.
pub struct DuplicateDetector<'a> {
    pool: &'a PgPool,
    identity: &'a IdentityClient,
}

impl<'a> DuplicateDetector<'a> {
    /// Create a new duplicate detector.
    #[must_use]
    pub const fn new(pool: &'a PgPool, identity: &'a IdentityClient) -> Self {
        Self { pool, identity }
    }

    /// Search customers by a raw term.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError`] when a collaborator fails.
    #[instrument(skip(self))]
    pub async fn search(&self, raw: &str) -> Result<SearchOutcome, SearchError> {
        let term = SearchTerm::classify(raw);

        if raw.trim().chars().count() < MIN_QUERY_LEN {
            return Ok(SearchOutcome {
                mode: term.mode(),
                customers: Vec::new(),
            });
        }

        let mode = term.mode();
        let customers = match term {
            SearchTerm::Phone(digits) => {
                CustomerRepository::new(self.pool)
                    .search_by_phone(&digits)
                    .await?
            }
            SearchTerm::Email(fragment) => {
                let records = self.identity.find_identities_by_email(&fragment).await?;
                let ids: Vec<CustomerId> = records
                    .into_iter()
                    .map(|record| CustomerId::new(record.id))
                    .collect();
                if ids.is_empty() {
                    Vec::new()
                } else {
                    CustomerRepository::new(self.pool)
                        .get_by_identity_ids(&ids)
                        .await?
                }
            }
            SearchTerm::Name(query) => {
                let patterns: Vec<String> = query
                    .split(' ')
                    .filter(|token| !token.is_empty())
                    .map(|token| format!("%{token}%"))
                    .collect();
                let candidates = CustomerRepository::new(self.pool)
                    .search_by_name_all_patterns(&patterns)
                    .await?;
                rank_name_matches(&query, candidates)
            }
        };

        Ok(SearchOutcome { mode, customers })
    }

    /// Whether the identity provider already has this exact email.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Identity`] when the provider fails.
    pub async fn email_exists(&self, email: &Email) -> Result<bool, SearchError> {
        Ok(self.identity.get_identity_by_email(email).await?.is_some())
    }

    /// Fuzzy close matches for a name, scored and sorted best-first.
    ///
    /// Candidates are pre-filtered to names sharing at least one token with
    /// the query, then kept when their similarity reaches
    /// [`NAME_SIMILARITY_THRESHOLD`] or the name contains the query.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Repository`] when the store fails.
    pub async fn close_matches(&self, name: &str) -> Result<Vec<ScoredMatch>, SearchError> {
        let query = normalize_name(name);
        if query.chars().count() < MIN_QUERY_LEN {
            return Ok(Vec::new());
        }

        let patterns: Vec<String> = query
            .split(' ')
            .filter(|token| !token.is_empty())
            .map(|token| format!("%{token}%"))
            .collect();
        let candidates = CustomerRepository::new(self.pool)
            .search_by_name_any_pattern(&patterns)
            .await?;

        let mut matches: Vec<ScoredMatch> = candidates
            .into_iter()
            .filter_map(|customer| {
                let candidate = normalize_name(&customer.name);
                let is_close = candidate.contains(&query)
                    || similarity(&candidate, &query) >= NAME_SIMILARITY_THRESHOLD;
                is_close.then(|| ScoredMatch {
                    score: match_score(&customer.name, &query),
                    customer,
                })
            })
            .collect();

        matches.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then_with(|| normalize_name(&a.customer.name).cmp(&normalize_name(&b.customer.name)))
        });

        Ok(matches)
    }
}

/// True when every whitespace-delimited token of the normalized query
/// appears as a substring of the normalized name.
#[must_use]
pub fn name_matches_all_tokens(normalized_name: &str, normalized_query: &str) -> bool {
    normalized_query
        .split(' ')
        .filter(|token| !token.is_empty())
        .all(|token| normalized_name.contains(token))
}

/// Apply the conjunctive token rule and order the results: names starting
/// with the exact normalized query sort first, ties broken lexicographically
/// by normalized name.
#[must_use]
pub fn rank_name_matches(normalized_query: &str, candidates: Vec<Customer>) -> Vec<Customer> {
    let mut matches: Vec<(String, Customer)> = candidates
        .into_iter()
        .filter_map(|customer| {
            let name = normalize_name(&customer.name);
            name_matches_all_tokens(&name, normalized_query).then_some((name, customer))
        })
        .collect();

    matches.sort_by(|(a, _), (b, _)| {
        let a_prefix = a.starts_with(normalized_query);
        let b_prefix = b.starts_with(normalized_query);
        b_prefix.cmp(&a_prefix).then_with(|| a.cmp(b))
    });

    matches.into_iter().map(|(_, customer)| customer).collect()
}

/// Levenshtein edit distance.
#[must_use]
#[allow(clippy::indexing_slicing)] // indices are bounded by the vector lengths below
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];

    for (i, &ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let substitution = prev[j] + usize::from(ca != cb);
            curr[j + 1] = substitution.min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Similarity in `[0, 1]`: `1 - distance / max_len`, with 1.0 when both
/// strings are empty.
#[must_use]
#[allow(clippy::cast_precision_loss)] // name lengths never approach f64 precision
pub fn similarity(a: &str, b: &str) -> f64 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }
    1.0 - levenshtein(a, b) as f64 / max_len as f64
}

/// Score a stored name against a normalized query: 100 exact, 90 prefix,
/// 80 substring, otherwise the similarity scaled to 70.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // scaled similarity is in [0, 70]
pub fn match_score(name: &str, normalized_query: &str) -> u8 {
    let name = normalize_name(name);
    if name == normalized_query {
        SCORE_EXACT
    } else if name.starts_with(normalized_query) {
        SCORE_PREFIX
    } else if name.contains(normalized_query) {
        SCORE_SUBSTRING
    } else {
        (similarity(&name, normalized_query) * FUZZY_SCORE_SCALE).round() as u8
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use roadcall_core::{AddressId, Classification, Phone};
    use uuid::Uuid;

    fn customer(name: &str) -> Customer {
        Customer {
            id: CustomerId::new(Uuid::new_v4()),
            name: name.to_string(),
            phone: Phone::parse("5551234567").unwrap(),
            classification: Classification::Residential,
            home_address_id: AddressId::new(1),
            is_administrator: false,
            is_technician: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_classify_phone_needs_three_digits() {
        assert_eq!(
            SearchTerm::classify("(555) 123"),
            SearchTerm::Phone("555123".to_string())
        );
        assert_eq!(
            SearchTerm::classify("55"),
            SearchTerm::Name("55".to_string())
        );
    }

    #[test]
    fn test_classify_email() {
        assert_eq!(
            SearchTerm::classify("Jane@Example.com"),
            SearchTerm::Email("jane@example.com".to_string())
        );
    }

    #[test]
    fn test_classify_digit_heavy_email_is_phone() {
        // The phone rule runs first, matching the documented order.
        assert_eq!(
            SearchTerm::classify("555@1212"),
            SearchTerm::Phone("5551212".to_string())
        );
    }

    #[test]
    fn test_classify_name() {
        assert_eq!(
            SearchTerm::classify("  John   Smith "),
            SearchTerm::Name("john smith".to_string())
        );
    }

    #[test]
    fn test_conjunctive_token_match() {
        assert!(name_matches_all_tokens("smith, john", "john smith"));
        assert!(!name_matches_all_tokens("john doe", "john smith"));
        assert!(name_matches_all_tokens("john smith", "john"));
    }

    #[test]
    fn test_rank_excludes_and_orders() {
        let candidates = vec![
            customer("Smith, John"),
            customer("John Doe"),
            customer("John Smithers"),
            customer("John Smith Jr"),
        ];

        let ranked = rank_name_matches("john smith", candidates);
        let names: Vec<&str> = ranked.iter().map(|c| c.name.as_str()).collect();

        // "John Doe" drops (missing "smith"); prefix matches sort first,
        // then the remaining matches lexicographically.
        assert_eq!(names, vec!["John Smith Jr", "John Smithers", "Smith, John"]);
    }

    #[test]
    fn test_levenshtein() {
        assert_eq!(levenshtein("", ""), 0);
        assert_eq!(levenshtein("abc", ""), 3);
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("smith", "smyth"), 1);
    }

    #[test]
    fn test_similarity() {
        assert!((similarity("", "") - 1.0).abs() < f64::EPSILON);
        assert!((similarity("smith", "smith") - 1.0).abs() < f64::EPSILON);
        assert!((similarity("smith", "smyth") - 0.8).abs() < 1e-9);
        assert!(similarity("smith", "jones") < 0.3);
    }

    #[test]
    fn test_match_score_bands() {
        assert_eq!(match_score("John Smith", "john smith"), 100);
        assert_eq!(match_score("John Smithers", "john smith"), 90);
        assert_eq!(match_score("Big John Smith", "john smith"), 80);
        // "smyth" vs "smith": similarity 0.8 -> round(0.8 * 70) = 56
        assert_eq!(match_score("Smyth", "smith"), 56);
    }
}
