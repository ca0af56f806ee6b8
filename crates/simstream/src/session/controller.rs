//! The session controller.
//!
//! This module defines [`SessionController`], the sole owner of the process
//! wide session state. It exposes the start/stop control surface and binds at
//! most one producer task to the state at any time.
//!
//! ## Responsibilities
//!
//! - Validate start requests and resolve the session limit.
//! - Transition `Idle <-> Active` atomically under a single mutex.
//! - Tag every session with a fresh generation and spawn exactly one producer
//!   task bound to it.
//! - Signal the bound producer on stop and drain all producers on shutdown.
//!
//! The mutex is a [`parking_lot::Mutex`] and is never held across an
//! `.await`; start and stop only take it long enough to flip the state and hand
//! off a cancellation token.

use super::{
    Phase, Session, SessionConfig, SessionStatus, StartOutcome, StopOutcome,
    producer::{Binding, produce},
    state::SessionState,
};
use crate::{Error, OutputSink, Result, SampleGenerator, UniformGenerator};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::watch;
use tokio_util::{sync::CancellationToken, task::TaskTracker};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Race-free start/stop control over a single streaming session.
///
/// Cloning is cheap; clones share the same state, so a controller can be handed
/// to every request handler.
///
/// # Example
/// ```
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// use simstream::{ChannelSink, SessionConfig, SessionController, StartOutcome, StopOutcome};
/// use tokio_util::sync::CancellationToken;
///
/// let controller = SessionController::new(SessionConfig::default());
/// let (sink, mut rx) = ChannelSink::channel(8);
///
/// let outcome = controller
///     .start(Some("5"), sink, CancellationToken::new())
///     .unwrap();
/// let StartOutcome::Started(session) = outcome else { unreachable!() };
/// assert_eq!(session.limit, 5);
///
/// let batch = rx.recv().await.unwrap();
/// assert!(batch.iter().all(|&s| s <= 5));
///
/// assert!(matches!(controller.stop(), StopOutcome::Stopped { .. }));
/// assert_eq!(controller.stop(), StopOutcome::NotRunning);
/// # }
/// ```
pub struct SessionController<G = UniformGenerator>
where
    G: SampleGenerator,
{
    inner: Arc<Inner<G>>,
}

impl<G> Clone for SessionController<G>
where
    G: SampleGenerator,
{
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

pub(crate) struct Inner<G> {
    pub(crate) config: SessionConfig,
    pub(crate) generator: G,
    pub(crate) state: Mutex<SessionState>,
    status_tx: watch::Sender<SessionStatus>,
    tracker: TaskTracker,
}

impl<G> Inner<G> {
    fn publish(&self, state: &SessionState) {
        self.status_tx.send_replace(state.status());
    }

    /// Returns the state to idle if `generation` still owns it.
    ///
    /// Called by a producer on its way out. A producer that was stopped or
    /// superseded no longer owns the state and leaves it untouched.
    pub(crate) fn release(&self, generation: u64) -> bool {
        let mut state = self.state.lock();
        if !state.is_owned_by(generation) {
            return false;
        }
        state.deactivate();
        self.publish(&state);
        true
    }
}

impl SessionController<UniformGenerator> {
    /// Creates a controller that draws batches of
    /// [`BATCH_SIZE`](crate::BATCH_SIZE) samples from the thread-local RNG.
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        Self::with_generator(config, UniformGenerator::default())
    }
}

impl<G> SessionController<G>
where
    G: SampleGenerator,
{
    /// Creates an idle controller around a custom generator.
    #[must_use]
    pub fn with_generator(config: SessionConfig, generator: G) -> Self {
        let state = SessionState::default();
        let (status_tx, _) = watch::channel(state.status());
        Self {
            inner: Arc::new(Inner {
                config,
                generator,
                state: Mutex::new(state),
                status_tx,
                tracker: TaskTracker::new(),
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    /// Starts a new session unless one is already active.
    ///
    /// The limit is resolved first (`None` means the configured default). If
    /// the state is idle, the limit is stored, the generation is bumped, the
    /// phase becomes active and one producer task is spawned. The task owns
    /// `sink` and stops on [`stop`](Self::stop), when `disconnect` fires, or
    /// when the sink fails.
    ///
    /// If a session is already active the call changes nothing and `sink` is
    /// dropped.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidLimit`] if `requested` is not an acceptable limit.
    /// - [`Error::ServiceShutdown`] after [`shutdown`](Self::shutdown).
    ///
    /// Neither error changes the session state.
    #[cfg_attr(feature = "tracing", instrument(skip_all, fields(requested = ?requested)))]
    pub fn start<S>(
        &self,
        requested: Option<&str>,
        sink: S,
        disconnect: CancellationToken,
    ) -> Result<StartOutcome>
    where
        S: OutputSink,
    {
        let limit = self.inner.config.resolve_limit(requested)?;

        let mut state = self.inner.state.lock();
        if self.inner.tracker.is_closed() {
            return Err(Error::ServiceShutdown);
        }
        if state.phase == Phase::Active {
            #[cfg(feature = "tracing")]
            tracing::debug!(generation = state.generation, "Session already running");
            return Ok(StartOutcome::AlreadyRunning {
                generation: state.generation,
            });
        }

        let stop = CancellationToken::new();
        let generation = state.activate(limit, stop.clone());
        self.inner.publish(&state);

        let binding = Binding {
            generation,
            limit,
            stop,
            disconnect,
        };
        // Spawned while the lock is held so no stop can slip in between the
        // transition and the task existing.
        let task = self
            .inner
            .tracker
            .spawn(produce(Arc::clone(&self.inner), binding, sink));
        drop(state);

        #[cfg(feature = "tracing")]
        tracing::info!(generation, limit, "Session started");

        Ok(StartOutcome::Started(Session {
            limit,
            generation,
            task,
        }))
    }

    /// Stops the active session.
    ///
    /// Sets the phase to idle and signals the bound producer, which exits at
    /// its next checkpoint without emitting again. The generation is left
    /// unchanged.
    pub fn stop(&self) -> StopOutcome {
        let mut state = self.inner.state.lock();
        if state.phase == Phase::Idle {
            return StopOutcome::NotRunning;
        }

        state.deactivate();
        self.inner.publish(&state);

        #[cfg(feature = "tracing")]
        tracing::info!(generation = state.generation, "Session stopped");

        StopOutcome::Stopped {
            generation: state.generation,
        }
    }

    /// Returns a snapshot of the session state.
    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.inner.state.lock().status()
    }

    /// Subscribes to state transitions.
    ///
    /// The receiver starts out holding the current status and observes every
    /// later transition (intermediate values may be skipped, as with any
    /// [`watch`] channel).
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionStatus> {
        self.inner.status_tx.subscribe()
    }

    /// Stops the active session and refuses new ones.
    ///
    /// Waits up to [`SessionConfig::shutdown_timeout`] for every producer task
    /// this controller spawned to exit. Returns `true` if all of them did.
    pub async fn shutdown(&self) -> bool {
        {
            let mut state = self.inner.state.lock();
            self.inner.tracker.close();
            if state.phase == Phase::Active {
                state.deactivate();
                self.inner.publish(&state);
            }
        }

        #[cfg(feature = "tracing")]
        tracing::info!(producers = self.inner.tracker.len(), "Draining producer tasks");

        let drained = tokio::time::timeout(
            self.inner.config.shutdown_timeout,
            self.inner.tracker.wait(),
        )
        .await
        .is_ok();

        #[cfg(feature = "tracing")]
        {
            if drained {
                tracing::debug!("All producer tasks exited");
            } else {
                tracing::warn!(
                    producers = self.inner.tracker.len(),
                    "Producer drain timed out"
                );
            }
        }

        drained
    }
}
