use crate::domain::ports::RandomSource;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;

/// Thread-local RNG; the production traffic splitter
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRngSource;

impl RandomSource for ThreadRngSource {
    fn next_percent(&self) -> f64 {
        rand::rng().random_range(0.0..100.0)
    }
}

/// Reproducible draws for simulations and replay
pub struct SeededRandomSource {
    rng: Mutex<StdRng>,
}

impl SeededRandomSource {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl RandomSource for SeededRandomSource {
    fn next_percent(&self) -> f64 {
        let mut rng = match self.rng.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        rng.random_range(0.0..100.0)
    }
}

/// Always returns the same draw
#[derive(Debug, Clone, Copy)]
pub struct FixedRandomSource {
    value: f64,
}

impl FixedRandomSource {
    pub fn new(value: f64) -> Self {
        Self {
            value: value.clamp(0.0, 100.0 - f64::EPSILON * 100.0),
        }
    }
}

impl RandomSource for FixedRandomSource {
    fn next_percent(&self) -> f64 {
        self.value
    }
}
