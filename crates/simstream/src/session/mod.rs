//! Session control: the state machine, its controller, and the producer task.
//!
//! ## Structure
//!
//! - `controller` - [`SessionController`], the only owner of session state.
//! - `producer` - the emit loop spawned per session.
//! - `config` - [`SessionConfig`] and limit resolution.
//! - `status` - read-only [`SessionStatus`] snapshots.
//! - `outcome` - named results of start/stop and producer exits.
//!
//! ```text
//! Idle --start--> Active --{stop | disconnect | sink failure}--> Idle
//! ```

mod config;
mod controller;
mod outcome;
mod producer;
mod state;
mod status;

pub use config::*;
pub use controller::*;
pub use outcome::*;
pub use status::*;
