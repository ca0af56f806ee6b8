use crate::{Result, SampleBatch};
use core::future::Future;

/// The consumer-facing end of a session.
///
/// A sink accepts one [`SampleBatch`] at a time and must report failure
/// distinctly from success so the producer can terminate cleanly. Any error
/// returned from either method ends the session with
/// [`Error::SinkFailure`](crate::Error::SinkFailure).
pub trait OutputSink: Send + 'static {
    /// Waits until the sink can accept one more batch.
    ///
    /// Calling `reserve` again before [`emit`](Self::emit) must not reserve
    /// additional capacity.
    fn reserve(&mut self) -> impl Future<Output = Result<()>> + Send;

    /// Hands a batch to the sink.
    ///
    /// Must not block or await: the producer calls this while holding the
    /// session lock.
    fn emit(&mut self, batch: SampleBatch) -> Result<()>;
}
