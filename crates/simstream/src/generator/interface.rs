use crate::SampleBatch;

/// A minimal interface for producing sample batches.
///
/// Implementations must be pure: every call draws a fresh batch and no call
/// observes another. The session controller shares one generator across
/// producer tasks, hence the `Send + Sync` bound.
pub trait SampleGenerator: Send + Sync + 'static {
    /// Returns one batch whose samples all lie in the inclusive range
    /// `[0, limit]`.
    fn generate(&self, limit: u64) -> SampleBatch;

    /// Number of samples every batch contains.
    fn batch_size(&self) -> usize;
}
