use crate::{Error, Result};
use core::time::Duration;

/// Limit applied when a start request does not name one.
pub const DEFAULT_LIMIT: u64 = 100;

/// Pause between two consecutive batches.
pub const DEFAULT_EMIT_INTERVAL: Duration = Duration::from_millis(20);

/// Upper bound on how long a single sink hand-off may wait for capacity.
pub const DEFAULT_EMIT_TIMEOUT: Duration = Duration::from_secs(1);

/// Upper bound on how long [`shutdown`] waits for producer tasks to exit.
///
/// [`shutdown`]: crate::SessionController::shutdown
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(3);

/// Session-level tunables shared by every session a controller runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub default_limit: u64,
    pub max_limit: u64,
    pub emit_interval: Duration,
    pub emit_timeout: Duration,
    pub shutdown_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_LIMIT,
            max_limit: u64::from(u32::MAX),
            emit_interval: DEFAULT_EMIT_INTERVAL,
            emit_timeout: DEFAULT_EMIT_TIMEOUT,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
        }
    }
}

impl SessionConfig {
    /// Resolves the limit for a new session.
    ///
    /// `None` selects [`default_limit`](Self::default_limit). A present value
    /// must parse as a base-10 non-negative integer no larger than
    /// [`max_limit`](Self::max_limit).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidLimit`] for empty, negative, non-numeric or
    /// oversized values.
    pub fn resolve_limit(&self, requested: Option<&str>) -> Result<u64> {
        let Some(raw) = requested else {
            return Ok(self.default_limit);
        };

        if raw.starts_with('-') {
            return Err(Error::invalid_limit(raw, "must be non-negative"));
        }

        let limit: u64 = raw
            .parse()
            .map_err(|e| Error::invalid_limit(raw, format!("not an integer ({e})")))?;

        if limit > self.max_limit {
            return Err(Error::invalid_limit(
                raw,
                format!("exceeds maximum allowed ({})", self.max_limit),
            ));
        }

        Ok(limit)
    }
}
