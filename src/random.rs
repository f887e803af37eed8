use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::{SystemTime, UNIX_EPOCH};

/// Source of uniformly distributed bytes for the random instruction.
pub trait RandomSource {
    fn next_byte(&mut self) -> u8;
}

/// Pseudo random number generator, seeded once when the machine is built.
pub struct ByteRng {
    rng: StdRng,
}

impl ByteRng {
    /// seeded from the wall clock
    pub fn from_time() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or_default();
        Self::seeded(nanos)
    }

    /// repeatable sequence, for tests and replays
    pub fn seeded(seed: u64) -> Self {
        ByteRng {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for ByteRng {
    fn next_byte(&mut self) -> u8 {
        self.rng.gen()
    }
}
