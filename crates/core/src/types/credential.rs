//! Temporary credential generation.
//!
//! Staff-initiated accounts activate through the rate-limited messaging
//! flow; the legacy self-service flow instead hands the caller a one-time
//! temporary credential generated here.

use serde::Serialize;

/// Symbols a credential may contain. 33 characters: digits `1`-`9` plus
/// uppercase letters without `I` and `O`. The glyphs `0`, `O`, and `I` are
/// excluded because customers read these values over the phone.
const ALPHABET: &[u8; 33] = b"123456789ABCDEFGHJKLMNPQRSTUVWXYZ";

/// Number of symbols in a credential, before grouping.
const CREDENTIAL_LEN: usize = 12;

/// Symbols per hyphen-separated block.
const GROUP_LEN: usize = 4;

/// Largest multiple of the alphabet size that fits in a byte. Bytes at or
/// above this bound are discarded so indices stay uniform.
#[allow(clippy::cast_possible_truncation)]
const REJECTION_BOUND: u8 = (u8::MAX as usize + 1 - (u8::MAX as usize + 1) % ALPHABET.len()) as u8;

/// A one-time temporary credential, formatted as `XXXX-XXXX-XXXX`.
///
/// `Debug` is redacted; the value only ever leaves the process inside the
/// provisioning response body.
#[derive(Clone, Serialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct TempCredential(String);

impl TempCredential {
    /// Generate a credential from the supplied random source.
    ///
    /// Callers must pass a cryptographically strong generator (the server
    /// uses the OS RNG); a general-purpose pseudo-random generator is only
    /// acceptable in tests.
    ///
    /// # Errors
    ///
    /// Returns the RNG's error if the random source fails.
    pub fn generate<R: rand::TryRngCore + ?Sized>(rng: &mut R) -> Result<Self, R::Error> {
        let mut symbols = Vec::with_capacity(CREDENTIAL_LEN);
        let mut buf = [0u8; 16];

        while symbols.len() < CREDENTIAL_LEN {
            rng.try_fill_bytes(&mut buf)?;
            for &byte in &buf {
                if byte < REJECTION_BOUND {
                    let index = usize::from(byte) % ALPHABET.len();
                    // index < ALPHABET.len() by construction
                    symbols.push(*ALPHABET.get(index).unwrap_or(&b'9') as char);
                    if symbols.len() == CREDENTIAL_LEN {
                        break;
                    }
                }
            }
        }

        let grouped: Vec<String> = symbols
            .chunks(GROUP_LEN)
            .map(|chunk| chunk.iter().collect())
            .collect();

        Ok(Self(grouped.join("-")))
    }

    /// Returns the formatted credential.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the credential and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Debug for TempCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("TempCredential").field(&"[REDACTED]").finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_format_is_three_hyphenated_blocks() {
        let mut rng = StdRng::seed_from_u64(7);
        let credential = TempCredential::generate(&mut rng).unwrap();
        let blocks: Vec<&str> = credential.as_str().split('-').collect();
        assert_eq!(blocks.len(), 3);
        for block in blocks {
            assert_eq!(block.len(), GROUP_LEN);
        }
        assert_eq!(credential.as_str().len(), CREDENTIAL_LEN + 2);
    }

    #[test]
    fn test_symbols_come_from_alphabet() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..100 {
            let credential = TempCredential::generate(&mut rng).unwrap();
            for c in credential.as_str().chars().filter(|&c| c != '-') {
                assert!(ALPHABET.contains(&(c as u8)), "unexpected symbol {c}");
                assert!(!"0OI".contains(c));
            }
        }
    }

    #[test]
    fn test_distinct_draws_differ() {
        let mut rng = StdRng::seed_from_u64(1);
        let a = TempCredential::generate(&mut rng).unwrap();
        let b = TempCredential::generate(&mut rng).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_debug_is_redacted() {
        let mut rng = StdRng::seed_from_u64(9);
        let credential = TempCredential::generate(&mut rng).unwrap();
        let debug = format!("{credential:?}");
        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains(credential.as_str()));
    }

    #[test]
    fn test_rejection_bound_is_multiple_of_alphabet() {
        assert_eq!(usize::from(REJECTION_BOUND) % ALPHABET.len(), 0);
        assert_eq!(REJECTION_BOUND, 231);
    }
}
