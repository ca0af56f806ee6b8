use super::{Phase, SessionStatus};
use tokio_util::sync::CancellationToken;

/// The single mutable record behind a [`SessionController`].
///
/// Only ever touched through the controller's mutex. `stop` is the token the
/// bound producer listens on; it is present exactly while `phase` is
/// [`Phase::Active`].
///
/// [`SessionController`]: crate::SessionController
#[derive(Debug, Default)]
pub(crate) struct SessionState {
    pub(crate) phase: Phase,
    pub(crate) limit: u64,
    pub(crate) generation: u64,
    pub(crate) stop: Option<CancellationToken>,
}

impl SessionState {
    /// Returns `true` while the producer bound to `generation` is still the
    /// authoritative one.
    pub(crate) fn is_owned_by(&self, generation: u64) -> bool {
        self.phase == Phase::Active && self.generation == generation
    }

    /// Moves `Idle -> Active` and returns the new generation.
    pub(crate) fn activate(&mut self, limit: u64, stop: CancellationToken) -> u64 {
        debug_assert_eq!(self.phase, Phase::Idle);
        self.generation += 1;
        self.limit = limit;
        self.phase = Phase::Active;
        self.stop = Some(stop);
        self.generation
    }

    /// Moves `Active -> Idle` and signals the bound producer. Generation is
    /// left as is; only the next start bumps it.
    pub(crate) fn deactivate(&mut self) {
        self.phase = Phase::Idle;
        if let Some(stop) = self.stop.take() {
            stop.cancel();
        }
    }

    pub(crate) const fn status(&self) -> SessionStatus {
        SessionStatus {
            phase: self.phase,
            limit: self.limit,
            generation: self.generation,
        }
    }
}
