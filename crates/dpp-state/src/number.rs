//! # Application Number Generation
//!
//! Allocates the `PREFIX` + 11-digit identifiers assigned at submission:
//! the low-order 8 digits of the clock's millisecond timestamp followed by
//! a 3-digit random suffix. Collisions are handled by re-drawing fresh
//! timestamp and random digits, up to a fixed attempt budget; every draw
//! keeps the published shape.
//!
//! The clock and RNG are injected at construction, so tests pin both and
//! the generator becomes fully deterministic. Generator output is
//! probabilistically unique; the record store's insert-if-absent check
//! remains the source of truth.

use std::sync::{Arc, Mutex};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

use dpp_core::{ApplicationNumber, Clock};

/// Attempts before giving up on finding an unused number.
const MAX_ATTEMPTS: u32 = 100;

/// Errors raised by the number generator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NumberGeneratorError {
    /// The configured prefix cannot form a valid application number.
    #[error("invalid application number prefix: \"{0}\" (expected 1-8 ASCII letters)")]
    InvalidPrefix(String),

    /// Every draw within the attempt budget collided with an existing
    /// record.
    #[error("application number generation exhausted after {attempts} attempts")]
    Exhausted {
        /// How many draws were made before giving up.
        attempts: u32,
    },
}

/// Allocates unique application numbers.
pub struct NumberGenerator {
    prefix: String,
    clock: Arc<dyn Clock>,
    rng: Mutex<StdRng>,
}

impl std::fmt::Debug for NumberGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NumberGenerator")
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}

impl NumberGenerator {
    /// Create a generator seeded from OS entropy.
    ///
    /// # Errors
    ///
    /// Returns [`NumberGeneratorError::InvalidPrefix`] if `prefix` is not
    /// 1-8 ASCII letters.
    pub fn new(prefix: impl Into<String>, clock: Arc<dyn Clock>) -> Result<Self, NumberGeneratorError> {
        Self::with_rng(prefix, clock, StdRng::from_entropy())
    }

    /// Create a generator with an explicit RNG, for deterministic tests.
    ///
    /// # Errors
    ///
    /// Returns [`NumberGeneratorError::InvalidPrefix`] if `prefix` is not
    /// 1-8 ASCII letters.
    pub fn with_rng(
        prefix: impl Into<String>,
        clock: Arc<dyn Clock>,
        rng: StdRng,
    ) -> Result<Self, NumberGeneratorError> {
        let raw = prefix.into();
        let upper = raw.trim().to_uppercase();
        if upper.is_empty() || upper.len() > 8 || !upper.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(NumberGeneratorError::InvalidPrefix(raw));
        }
        Ok(Self {
            prefix: upper,
            clock,
            rng: Mutex::new(rng),
        })
    }

    /// The configured (uppercase) prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Allocate a number not currently in use.
    ///
    /// `exists` is consulted for every draw; a draw it reports as taken is
    /// discarded and fresh digits are drawn. The caller must still insert
    /// with a uniqueness check, since another writer can take the number
    /// between this call and the insert.
    ///
    /// # Errors
    ///
    /// Returns [`NumberGeneratorError::Exhausted`] when every draw in the
    /// attempt budget collided.
    pub fn generate<F>(&self, exists: F) -> Result<ApplicationNumber, NumberGeneratorError>
    where
        F: Fn(&ApplicationNumber) -> bool,
    {
        let mut rng = self.rng.lock().expect("number generator lock poisoned");

        for _ in 0..MAX_ATTEMPTS {
            let millis = self.clock.now_millis();
            let timestamp_digits = millis.rem_euclid(100_000_000);
            let random_digits: u32 = rng.gen_range(0..1000);

            let candidate = ApplicationNumber::new(format!(
                "{}{:08}{:03}",
                self.prefix, timestamp_digits, random_digits
            ))
            .expect("validated prefix plus 11 digits is always well-formed");

            if !exists(&candidate) {
                return Ok(candidate);
            }
        }

        Err(NumberGeneratorError::Exhausted {
            attempts: MAX_ATTEMPTS,
        })
    }
}
