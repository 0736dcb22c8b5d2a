//! Live registry of callable agents with capability-based lookup.
//!
//! Agents advertise themselves as [`AgentCard`]s: a set of skills plus
//! opaque metadata. The [`AgentRegistry`] stores cards by id, answers
//! predicate-based discovery queries, expires entries that have not been
//! seen within a TTL, and applies the separate relevance rule that selects
//! agents for orchestration against a processed input.
//!
//! # Main types
//!
//! - [`AgentSkill`] — One advertised capability with declared I/O shapes.
//! - [`AgentCard`] — An agent's identity, skills, and metadata.
//! - [`AgentRegistry`] — The TTL-expiring card store.
//! - [`DiscoveryQuery`] — Optional skill/metadata constraints for discovery.

/// Agent card and skill types.
pub mod card;
/// The TTL-expiring registry and discovery queries.
pub mod registry;

pub use card::{AgentCard, AgentSkill};
pub use registry::{AgentRegistry, DiscoveryQuery, RegistryStats, DEFAULT_TTL};
