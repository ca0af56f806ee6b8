use crate::{Error, OutputSink, Result, SampleBatch};
use tokio::sync::mpsc::{self, OwnedPermit, error::TrySendError};

/// An [`OutputSink`] backed by a bounded [`mpsc`] channel.
///
/// [`reserve`](OutputSink::reserve) acquires an owned permit for one slot, so
/// the following [`emit`](OutputSink::emit) never blocks. Dropping the
/// receiving half closes the sink; the next hand-off then fails.
pub struct ChannelSink {
    tx: mpsc::Sender<SampleBatch>,
    permit: Option<OwnedPermit<SampleBatch>>,
}

impl ChannelSink {
    #[must_use]
    pub const fn new(tx: mpsc::Sender<SampleBatch>) -> Self {
        Self { tx, permit: None }
    }

    /// Creates a bounded channel and returns the sink with its receiver.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero, like [`mpsc::channel`].
    #[must_use]
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<SampleBatch>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self::new(tx), rx)
    }

    /// Returns `true` once the consumer dropped its receiver.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

impl OutputSink for ChannelSink {
    async fn reserve(&mut self) -> Result<()> {
        if self.permit.is_none() {
            let permit = self
                .tx
                .clone()
                .reserve_owned()
                .await
                .map_err(|_| Error::sink("receiver dropped"))?;
            self.permit = Some(permit);
        }
        Ok(())
    }

    fn emit(&mut self, batch: SampleBatch) -> Result<()> {
        match self.permit.take() {
            Some(permit) => {
                // A permit outlives a dropped receiver; `send` then discards
                // the value, so surface the closure here.
                if self.tx.is_closed() {
                    return Err(Error::sink("receiver dropped"));
                }
                permit.send(batch);
                Ok(())
            }
            None => self.tx.try_send(batch).map_err(|e| match e {
                TrySendError::Full(_) => Error::sink("channel full"),
                TrySendError::Closed(_) => Error::sink("receiver dropped"),
            }),
        }
    }
}
