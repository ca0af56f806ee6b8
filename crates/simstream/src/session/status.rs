/// Whether a producer loop is currently bound to the session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(rename_all = "lowercase"))]
pub enum Phase {
    #[default]
    Idle,
    Active,
}

/// A read-only snapshot of the session state.
///
/// The controller publishes a new snapshot on every transition. `limit` is the
/// limit of the most recent session and keeps its value after that session
/// ends; `generation` is `0` until the first successful start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SessionStatus {
    pub phase: Phase,
    pub limit: u64,
    pub generation: u64,
}

impl SessionStatus {
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.phase == Phase::Active
    }
}
