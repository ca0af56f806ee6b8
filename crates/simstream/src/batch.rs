use core::ops::Deref;

/// Number of samples in a batch unless a generator is configured otherwise.
pub const BATCH_SIZE: usize = 64;

/// One unit of generated data, handed to the sink per loop iteration.
///
/// A batch is an ordered sequence of non-negative samples, each within the
/// inclusive `[0, limit]` range the generator was asked for. Batches are
/// ephemeral: they are produced, emitted once, and dropped.
///
/// With the `serde` feature enabled a batch serializes as a plain JSON array of
/// integers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(transparent))]
pub struct SampleBatch(Vec<u64>);

impl SampleBatch {
    /// Wraps already generated samples.
    #[must_use]
    pub const fn new(samples: Vec<u64>) -> Self {
        Self(samples)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[u64] {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> Vec<u64> {
        self.0
    }
}

impl Deref for SampleBatch {
    type Target = [u64];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<u64>> for SampleBatch {
    fn from(samples: Vec<u64>) -> Self {
        Self(samples)
    }
}

impl IntoIterator for SampleBatch {
    type Item = u64;
    type IntoIter = std::vec::IntoIter<u64>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a SampleBatch {
    type Item = &'a u64;
    type IntoIter = core::slice::Iter<'a, u64>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
