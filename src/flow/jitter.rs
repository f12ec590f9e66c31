//! Seeded delay source used to simulate uneven work in producers.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;

/// Explicit randomness handed to each task. Same seed, same delays.
#[derive(Clone, Debug)]
pub struct Jitter {
    rng: StdRng,
    max_delay: Duration,
}

impl Jitter {
    pub fn seeded(seed: u64, max_delay: Duration) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            max_delay,
        }
    }

    /// Seed from the OS; for interactive runs without `--seed`.
    pub fn from_entropy(max_delay: Duration) -> Self {
        Self {
            rng: StdRng::from_entropy(),
            max_delay,
        }
    }

    /// No delay at all.
    pub fn none() -> Self {
        Self::seeded(0, Duration::ZERO)
    }

    pub fn max_delay(&self) -> Duration {
        self.max_delay
    }

    /// Uniform in `[0, max_delay)`; zero when `max_delay` is zero.
    pub fn next_delay(&mut self) -> Duration {
        let max_ms = self.max_delay.as_millis() as u64;
        if max_ms == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(self.rng.gen_range(0..max_ms))
    }

    /// Independent child source for another task, derived from this one.
    pub fn fork(&mut self) -> Self {
        Self {
            rng: StdRng::seed_from_u64(self.rng.r#gen()),
            max_delay: self.max_delay,
        }
    }
}
