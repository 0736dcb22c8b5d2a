//! Asynchronous event delivery between agents.
//!
//! A bounded, priority-ordered mailbox: producers `put` events, consumers
//! `get` them back strictly high → normal → low, FIFO within a lane.
//! Delivery is at-most-once and non-persistent; when the queue is full a
//! new event is dropped silently and a counter is incremented.
//!
//! # Main types
//!
//! - [`Event`] — One asynchronous message.
//! - [`Priority`] — Tri-level lane selector (high / normal / low).
//! - [`EventQueue`] — The bounded priority mailbox.
//! - [`QueueStats`] — Point-in-time snapshot of lane sizes and counters.

/// Event and priority types.
pub mod event;
/// The bounded priority mailbox.
pub mod queue;

pub use event::{Event, Priority};
pub use queue::{EventQueue, QueueStats};
