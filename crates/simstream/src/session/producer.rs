use super::{Phase, ProducerExit, controller::Inner, state::SessionState};
use crate::{Error, OutputSink, SampleGenerator};
use std::sync::Arc;
use tokio::time::{sleep, timeout};
use tokio_util::sync::CancellationToken;

/// Everything a producer task captures from the start that spawned it.
pub(crate) struct Binding {
    pub(crate) generation: u64,
    pub(crate) limit: u64,
    /// Cancelled by the controller on stop or shutdown.
    pub(crate) stop: CancellationToken,
    /// Cancelled by the request layer when the consumer disconnects.
    pub(crate) disconnect: CancellationToken,
}

impl Binding {
    /// Returns why the producer must stop, if it must.
    fn check(&self, state: &SessionState) -> Option<ProducerExit> {
        if self.disconnect.is_cancelled() {
            return Some(ProducerExit::Disconnected);
        }
        if state.generation != self.generation {
            return Some(ProducerExit::Superseded);
        }
        if state.phase != Phase::Active || self.stop.is_cancelled() {
            return Some(ProducerExit::Stopped);
        }
        None
    }
}

/// Returns the session to idle when the producer goes away, including by
/// panic or by the task being dropped mid-await.
struct ReleaseOnDrop<'a, G> {
    inner: &'a Inner<G>,
    generation: u64,
    armed: bool,
}

impl<'a, G> ReleaseOnDrop<'a, G> {
    const fn new(inner: &'a Inner<G>, generation: u64) -> Self {
        Self {
            inner,
            generation,
            armed: true,
        }
    }

    /// Releases now and reports whether this generation still owned the state.
    fn release(mut self) -> bool {
        self.armed = false;
        self.inner.release(self.generation)
    }
}

impl<G> Drop for ReleaseOnDrop<'_, G> {
    fn drop(&mut self) {
        if self.armed {
            // Any state lock taken by the unwinding frames is already dropped.
            self.inner.release(self.generation);
        }
    }
}

/// Producer task body.
///
/// Runs the emit loop for one session and, on the way out (normal return,
/// panic or cancellation of the task), returns the session to idle if this
/// task still owns its generation.
///
/// # Behavior
///
/// - Checks for cancellation before every generate + emit step.
/// - Waits for sink capacity for at most `emit_timeout`; a timeout or a closed
///   sink ends the session with [`ProducerExit::SinkFailure`].
/// - Commits each batch while holding the session lock, after re-checking
///   ownership, so nothing is emitted once a stop or a newer start completed.
/// - Sleeps `emit_interval` between batches; the sleep wakes early on
///   cancellation.
pub(crate) async fn produce<G, S>(
    inner: Arc<Inner<G>>,
    binding: Binding,
    mut sink: S,
) -> ProducerExit
where
    G: SampleGenerator,
    S: OutputSink,
{
    #[cfg(feature = "tracing")]
    tracing::debug!(
        generation = binding.generation,
        limit = binding.limit,
        "Producer started"
    );

    let release = ReleaseOnDrop::new(&inner, binding.generation);
    let exit = emit_loop(&inner, &binding, &mut sink).await;
    let _released = release.release();

    #[cfg(feature = "tracing")]
    {
        if let Some(e) = exit.error() {
            tracing::warn!(
                generation = binding.generation,
                released = _released,
                "Producer exiting after sink failure: {e}"
            );
        } else {
            tracing::debug!(
                generation = binding.generation,
                released = _released,
                "Producer exiting: {exit:?}"
            );
        }
    }

    exit
}

async fn emit_loop<G, S>(inner: &Inner<G>, binding: &Binding, sink: &mut S) -> ProducerExit
where
    G: SampleGenerator,
    S: OutputSink,
{
    let emit_timeout = inner.config.emit_timeout;
    let emit_interval = inner.config.emit_interval;

    loop {
        let pending = binding.check(&inner.state.lock());
        if let Some(exit) = pending {
            return exit;
        }

        let batch = inner.generator.generate(binding.limit);

        tokio::select! {
            biased;
            () = binding.disconnect.cancelled() => return ProducerExit::Disconnected,
            () = binding.stop.cancelled() => return ProducerExit::Stopped,
            reserved = timeout(emit_timeout, sink.reserve()) => match reserved {
                Ok(Ok(())) => {}
                Ok(Err(e)) => return ProducerExit::SinkFailure(e),
                Err(_) => {
                    return ProducerExit::SinkFailure(Error::sink(format!(
                        "hand-off timed out after {emit_timeout:?}"
                    )));
                }
            },
        }

        {
            let state = inner.state.lock();
            if let Some(exit) = binding.check(&state) {
                return exit;
            }
            if let Err(e) = sink.emit(batch) {
                return ProducerExit::SinkFailure(e);
            }
        }

        tokio::select! {
            biased;
            () = binding.disconnect.cancelled() => return ProducerExit::Disconnected,
            () = binding.stop.cancelled() => return ProducerExit::Stopped,
            () = sleep(emit_interval) => {}
        }
    }
}
