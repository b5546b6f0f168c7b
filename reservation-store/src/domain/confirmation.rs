//! Confirmation number generation port and its default implementation.
//!
//! The store assigns a confirmation number whenever a reservation arrives
//! without one. Generation is a port so tests can drive the collision-retry
//! loop deterministically; the default implementation draws uniformly from
//! the 36-character alphabet `0-9A-Z`.

use rand::Rng;

use super::reservation::ConfirmationNumber;

/// Alphabet confirmation numbers are drawn from: digits then `A-Z`.
pub const CONFIRMATION_ALPHABET: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Length of generated confirmation numbers.
///
/// Six characters over a 36-symbol alphabet give roughly 2.2 billion
/// combinations, which keeps the generate-then-probe collision window a
/// negligible soft race.
pub const CONFIRMATION_LENGTH: usize = 6;

/// Source of candidate confirmation numbers.
#[cfg_attr(test, mockall::automock)]
pub trait ConfirmationGenerator: Send + Sync {
    /// Produce one candidate. Uniqueness is probed by the caller, not here.
    fn generate(&self) -> ConfirmationNumber;
}

/// Default generator: [`CONFIRMATION_LENGTH`] characters sampled uniformly
/// from [`CONFIRMATION_ALPHABET`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomConfirmationGenerator;

impl ConfirmationGenerator for RandomConfirmationGenerator {
    fn generate(&self) -> ConfirmationNumber {
        let raw = sample(&mut rand::thread_rng(), CONFIRMATION_LENGTH);
        ConfirmationNumber::new(raw)
            .unwrap_or_else(|error| panic!("sampled confirmation number must validate: {error}"))
    }
}

/// Sample `length` characters from [`CONFIRMATION_ALPHABET`].
pub(crate) fn sample<R: Rng>(rng: &mut R, length: usize) -> String {
    (0..length)
        .map(|_| char::from(CONFIRMATION_ALPHABET[rng.gen_range(0..CONFIRMATION_ALPHABET.len())]))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::rngs::SmallRng;
    use rand::SeedableRng;
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn generated_numbers_use_the_alphabet_and_length() {
        let generator = RandomConfirmationGenerator;
        for _ in 0..100 {
            let number = generator.generate();
            assert_eq!(number.as_str().len(), CONFIRMATION_LENGTH);
            assert!(
                number
                    .as_str()
                    .bytes()
                    .all(|b| CONFIRMATION_ALPHABET.contains(&b)),
                "unexpected character in {number}"
            );
        }
    }

    #[rstest]
    fn sampling_is_deterministic_for_a_fixed_seed() {
        let mut a = SmallRng::seed_from_u64(7);
        let mut b = SmallRng::seed_from_u64(7);
        assert_eq!(sample(&mut a, CONFIRMATION_LENGTH), sample(&mut b, CONFIRMATION_LENGTH));
    }

    #[rstest]
    fn ten_thousand_draws_are_effectively_distinct() {
        let generator = RandomConfirmationGenerator;
        let drawn: HashSet<String> = (0..10_000)
            .map(|_| String::from(generator.generate()))
            .collect();
        // Birthday-bound slack: a handful of collisions in 36^6 is expected
        // noise, wholesale repetition is a broken generator.
        assert!(drawn.len() >= 9_990, "only {} distinct draws", drawn.len());
    }
}
