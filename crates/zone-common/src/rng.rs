// rng.rs — the single RNG seam every probability threshold in the spec
// goes through (radar sampling, antiwarp-send, prize selection).
// Converted from: myq2-common's use of `rand` (workspace dependency)
// for gameplay randomness, wrapped behind a trait so tests can replace
// it with a deterministic source (spec.md §8 boundary-behavior tests
// need reproducible draws against `RandMax`).

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// The engine's canonical exclusive bound on its uniform RNG (glossary:
/// "RandMax") — the same constant used in every probability threshold
/// in the spec (radar sampling, antiwarp-send, fast-bombing is exempt
/// since it is a timing check, not a draw).
pub const RAND_MAX: u32 = 0x7fff;

pub trait RngSource: Send {
    /// Draw a value uniformly in `[0, RAND_MAX]`.
    fn next_u32(&mut self) -> u32;
}

/// Production RNG, backed by `rand`'s `StdRng`.
pub struct StdRngSource(StdRng);

impl StdRngSource {
    pub fn from_entropy() -> Self {
        Self(StdRng::from_entropy())
    }

    pub fn from_seed(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl RngSource for StdRngSource {
    fn next_u32(&mut self) -> u32 {
        self.0.gen_range(0..=RAND_MAX)
    }
}

/// A deterministic round-robin source for tests: cycles through a fixed
/// sequence of draws so boundary tests (spec.md §8) can force specific
/// outcomes without depending on entropy.
pub struct FixedRng {
    sequence: Vec<u32>,
    pos: usize,
}

impl FixedRng {
    pub fn new(sequence: Vec<u32>) -> Self {
        assert!(!sequence.is_empty(), "FixedRng requires at least one value");
        Self { sequence, pos: 0 }
    }

    pub fn always(value: u32) -> Self {
        Self::new(vec![value])
    }
}

impl RngSource for FixedRng {
    fn next_u32(&mut self) -> u32 {
        let v = self.sequence[self.pos % self.sequence.len()];
        self.pos += 1;
        v
    }
}
