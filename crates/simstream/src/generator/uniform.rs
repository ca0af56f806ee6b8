#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{BATCH_SIZE, RandSource, SampleBatch, SampleGenerator, ThreadRandom};

/// A generator that draws every sample independently and uniformly from
/// `[0, limit]`.
///
/// ## Features
/// - ✅ Thread-safe when `R` is (the default [`ThreadRandom`] is)
/// - ✅ Inclusive upper bound, so `limit` itself is a possible sample
/// - ✅ Any `limit` is valid, from `0` (all zeros) to `u64::MAX`
///
/// ## Recommended When
/// - You need synthetic data with a fixed shape and a tunable amplitude
///
/// # Example
/// ```
/// use simstream::{SampleGenerator, UniformGenerator};
///
/// let generator = UniformGenerator::default();
/// let batch = generator.generate(5);
/// assert_eq!(batch.len(), 64);
/// assert!(batch.iter().all(|&s| s <= 5));
/// ```
#[derive(Debug, Clone)]
pub struct UniformGenerator<R = ThreadRandom>
where
    R: RandSource,
{
    batch_size: usize,
    rng: R,
}

impl UniformGenerator<ThreadRandom> {
    /// Creates a generator producing `batch_size` samples per batch from the
    /// thread-local RNG.
    #[must_use]
    pub const fn new(batch_size: usize) -> Self {
        Self::with_rng(batch_size, ThreadRandom)
    }
}

impl<R> UniformGenerator<R>
where
    R: RandSource,
{
    /// Creates a generator backed by a custom [`RandSource`].
    ///
    /// Mostly useful for tests and benchmarks that need a deterministic
    /// source.
    #[must_use]
    pub const fn with_rng(batch_size: usize, rng: R) -> Self {
        Self { batch_size, rng }
    }
}

impl Default for UniformGenerator<ThreadRandom> {
    fn default() -> Self {
        Self::new(BATCH_SIZE)
    }
}

impl<R> SampleGenerator for UniformGenerator<R>
where
    R: RandSource + Send + Sync + 'static,
{
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    fn generate(&self, limit: u64) -> SampleBatch {
        let samples = (0..self.batch_size)
            .map(|_| self.rng.rand_inclusive(limit))
            .collect();
        SampleBatch::new(samples)
    }

    fn batch_size(&self) -> usize {
        self.batch_size
    }
}
