//! Output sinks that carry batches from a producer task to its consumer.
//!
//! A sink hand-off happens in two phases:
//!
//! 1. [`OutputSink::reserve`] waits (asynchronously) until the consumer can
//!    take one more batch. This is the only point where a slow consumer can
//!    stall the producer, so the producer bounds it with a timeout.
//! 2. [`OutputSink::emit`] hands the batch over without blocking. The producer
//!    calls it while holding the session lock, right after confirming it still
//!    owns the current generation.
//!
//! ## Structure
//!
//! - `interface` - the [`OutputSink`] trait.
//! - `channel` - [`ChannelSink`], a bounded `mpsc` implementation.

mod channel;
mod interface;
pub use channel::*;
pub use interface::*;
