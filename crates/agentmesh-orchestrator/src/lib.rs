//! Multi-agent execution strategies.
//!
//! The orchestrator takes a list of [`Agent`] implementations and one
//! processed input, runs the agents under a [`Strategy`] (sequential,
//! parallel, loop, or conditional), and returns one [`AgentOutcome`] per
//! (agent, iteration) attempt. Every attempt gets a fresh request context
//! and a fresh event queue; failures are isolated to their own outcome.
//!
//! # Main types
//!
//! - [`Agent`] — The seam a concrete worker implements.
//! - [`Strategy`] — Which execution pattern to drive the agents with.
//! - [`Orchestrator`] — Runs the agents and collects outcomes.
//! - [`AgentOutcome`] — Normalized record of one attempt.

/// The agent execution seam.
pub mod agent;
/// The strategy runner.
pub mod engine;
/// Per-attempt outcome records.
pub mod outcome;
/// Execution strategy selection.
pub mod strategy;

pub use agent::Agent;
pub use engine::{Orchestrator, OrchestratorConfig};
pub use outcome::{AgentOutcome, OutcomeStatus};
pub use strategy::{AgentPredicate, Strategy};
