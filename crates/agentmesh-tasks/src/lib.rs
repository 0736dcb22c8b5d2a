//! Task and context bookkeeping for multi-step agent work.
//!
//! The [`TaskManager`] is the authoritative store for task records and
//! enforces the lifecycle state machine (Pending → InProgress →
//! Completed/Failed, with an AuthRequired detour). The [`ContextManager`]
//! groups tasks into logical contexts, holding only advisory id references —
//! the task manager stays the source of truth for existence.
//!
//! Neither store persists anything; a process restart loses all records.
//!
//! # Main types
//!
//! - [`Task`] / [`TaskStatus`] — One unit of work and its closed lifecycle.
//! - [`TaskManager`] — Task store, transitions, cleanup.
//! - [`Context`] / [`ContextUpdate`] — A task grouping and its field updates.
//! - [`ContextManager`] — Context store, cascade deletion, statistics.

/// Context record and update types.
pub mod context;
/// Context store and grouping operations.
pub mod context_manager;
/// Task record and status types.
pub mod task;
/// Task store and lifecycle operations.
pub mod task_manager;

pub use context::{Context, ContextStatistics, ContextUpdate};
pub use context_manager::{AllContextsStatistics, ContextManager};
pub use task::{Task, TaskStatus};
pub use task_manager::{TaskManager, TaskStatistics};
