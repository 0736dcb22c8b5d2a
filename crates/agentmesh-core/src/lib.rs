//! Core types and error definitions for the agentmesh coordination core.
//!
//! This crate provides the foundational types shared across all agentmesh
//! crates: the unified error enum, the opaque payload type used for task
//! input/output and metadata, and the per-invocation request context.
//!
//! # Main types
//!
//! - [`MeshError`] — Unified error enum for all coordination subsystems.
//! - [`MeshResult`] — Convenience alias for `Result<T, MeshError>`.
//! - [`Payload`] — Opaque JSON key-value map carried through the core untouched.
//! - [`ProcessedData`] — Input produced by an external pipeline, consumed by
//!   discovery and passed through to agents.
//! - [`RequestContext`] — Per-invocation context handed to each agent.

/// Unified error type and result alias.
pub mod error;
/// Request context and processed-input types.
pub mod request;

pub use error::{MeshError, MeshResult};
pub use request::{ProcessedData, RequestContext};

use std::collections::HashMap;

/// An opaque, serializable key-value payload.
///
/// Used for task `input_data`/`output_data`, context metadata, event content
/// and agent card metadata. The core never interprets these values; any
/// per-skill schema belongs to the agent that declares the skill.
pub type Payload = HashMap<String, serde_json::Value>;
