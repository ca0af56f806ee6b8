use crate::Error;
use tokio::task::JoinHandle;

/// The result of a successful call to [`SessionController::start`].
///
/// [`SessionController::start`]: crate::SessionController::start
#[derive(Debug)]
pub enum StartOutcome {
    /// A new session began and one producer task is now bound to it.
    Started(Session),
    /// A session was already active. Nothing changed and no task was spawned.
    AlreadyRunning { generation: u64 },
}

impl StartOutcome {
    #[must_use]
    pub const fn is_started(&self) -> bool {
        matches!(self, Self::Started(_))
    }
}

/// Handle to the session a start created.
#[derive(Debug)]
pub struct Session {
    /// Limit every batch of this session is bounded by.
    pub limit: u64,
    /// Generation the producer task is bound to.
    pub generation: u64,
    /// Resolves once the producer task exits.
    pub task: JoinHandle<ProducerExit>,
}

/// The result of [`SessionController::stop`].
///
/// [`SessionController::stop`]: crate::SessionController::stop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    /// The active session was ended and its producer signalled.
    Stopped { generation: u64 },
    /// No session was active. Nothing changed.
    NotRunning,
}

/// Why a producer task ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProducerExit {
    /// The session was stopped through the controller.
    Stopped,
    /// The consumer went away (its cancellation token fired).
    Disconnected,
    /// A newer session took over before this producer noticed it was stopped.
    Superseded,
    /// The sink was closed or stalled past the emit timeout.
    SinkFailure(Error),
}

impl ProducerExit {
    /// Returns the sink error if the producer ended because of one.
    #[must_use]
    pub const fn error(&self) -> Option<&Error> {
        match self {
            Self::SinkFailure(e) => Some(e),
            Self::Stopped | Self::Disconnected | Self::Superseded => None,
        }
    }
}
