use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Upper bound (exclusive) of the exploration term added to each score.
pub const MAX_JITTER: f64 = 5.0;

/// Source of the per-candidate exploration term.
pub trait JitterSource {
    /// Next value, expected in `[0, MAX_JITTER)`.
    fn next_jitter(&mut self) -> f64;
}

impl<F> JitterSource for F
where
    F: FnMut() -> f64,
{
    fn next_jitter(&mut self) -> f64 {
        self()
    }
}

/// Always zero. Makes recommendation order fully deterministic.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoJitter;

impl JitterSource for NoJitter {
    fn next_jitter(&mut self) -> f64 {
        0.0
    }
}

/// Uniform jitter drawn from an RNG.
#[derive(Debug, Clone)]
pub struct RandomJitter<R = StdRng> {
    rng: R,
}

impl RandomJitter<StdRng> {
    /// Seeded from OS entropy; the production default.
    pub fn from_entropy() -> Self {
        Self { rng: StdRng::from_entropy() }
    }

    /// Deterministic sequence for reproducible runs.
    pub fn seeded(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed) }
    }
}

impl<R: Rng> RandomJitter<R> {
    /// Wrap a caller-supplied RNG.
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }
}

impl Default for RandomJitter<StdRng> {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl<R: Rng> JitterSource for RandomJitter<R> {
    fn next_jitter(&mut self) -> f64 {
        self.rng.gen_range(0.0..MAX_JITTER)
    }
}

#[cfg(test)]
mod tests {
    use super::{JitterSource, RandomJitter, MAX_JITTER};

    #[test]
    fn random_jitter_stays_in_range() {
        let mut jitter = RandomJitter::seeded(42);
        for _ in 0..1_000 {
            let value = jitter.next_jitter();
            assert!((0.0..MAX_JITTER).contains(&value), "jitter {value} out of range");
        }
    }

    #[test]
    fn seeded_jitter_is_reproducible() {
        let mut first = RandomJitter::seeded(9);
        let mut second = RandomJitter::seeded(9);

        let a: Vec<f64> = (0..5).map(|_| first.next_jitter()).collect();
        let b: Vec<f64> = (0..5).map(|_| second.next_jitter()).collect();
        assert_eq!(a, b);
    }
}
