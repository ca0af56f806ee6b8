//! Error types for the session core.
//!
//! Only two things can go wrong inside the core: a caller hands in a limit we
//! refuse to use, or the output sink stops accepting batches. Protocol misuse
//! (starting twice, stopping while idle) is *not* an error; it is reported
//! through [`StartOutcome`] and [`StopOutcome`].
//!
//! ## Error Cases
//! - `InvalidLimit`: The requested limit is malformed, negative, or above the
//!   configured maximum. No state is changed.
//! - `SinkFailure`: The sink was closed or did not accept a batch in time. The
//!   owning producer task terminates and the session returns to idle.
//! - `ServiceShutdown`: A start arrived after the controller was shut down.
//!
//! [`StartOutcome`]: crate::StartOutcome
//! [`StopOutcome`]: crate::StopOutcome

pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All error variants that `simstream` can emit.
#[derive(Clone, thiserror::Error, Debug, PartialEq, Eq)]
pub enum Error {
    /// The requested limit could not be used.
    #[error("Invalid limit {value:?}: {reason}")]
    InvalidLimit { value: String, reason: String },

    /// The output sink rejected or stalled a batch.
    #[error("Sink failure: {context}")]
    SinkFailure { context: String },

    /// The controller no longer accepts new sessions.
    #[error("Service is shutting down")]
    ServiceShutdown,
}

impl Error {
    pub(crate) fn invalid_limit(value: &str, reason: impl Into<String>) -> Self {
        Self::InvalidLimit {
            value: value.to_owned(),
            reason: reason.into(),
        }
    }

    pub(crate) fn sink(context: impl Into<String>) -> Self {
        Self::SinkFailure {
            context: context.into(),
        }
    }
}
