use crate::Payload;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Input produced by an external processing pipeline.
///
/// The core only reads `text` and `kind` (for the discovery relevance rule)
/// and passes the whole value through to agents untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessedData {
    /// Extracted textual content of the input.
    pub text: String,
    /// Declared input type (e.g. `"text"`, `"document"`, `"image"`).
    #[serde(rename = "type")]
    pub kind: String,
    /// Any further pipeline output, carried opaquely.
    #[serde(flatten, default)]
    pub extra: Payload,
}

impl ProcessedData {
    /// Creates a processed input with the given text and declared type.
    pub fn new(text: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: kind.into(),
            extra: Payload::new(),
        }
    }

    /// Attaches an extra pipeline field.
    pub fn with_field(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}

/// Per-invocation context handed to an agent's `execute`.
///
/// The orchestrator builds a fresh one for every (agent, iteration) attempt;
/// agents never share a context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// Unique id for this invocation.
    pub request_id: String,
    /// The message the agent is asked to act on.
    pub message: String,
    /// UTC timestamp of when the context was built.
    pub timestamp: DateTime<Utc>,
    /// Arbitrary key-value metadata (e.g. the loop iteration index).
    #[serde(default)]
    pub metadata: Payload,
    /// Originating user, when known.
    pub user_id: Option<String>,
    /// Originating session, when known.
    pub session_id: Option<String>,
}

impl RequestContext {
    /// Creates a context with the given message and request id.
    pub fn new(message: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            message: message.into(),
            timestamp: Utc::now(),
            metadata: Payload::new(),
            user_id: None,
            session_id: None,
        }
    }

    /// Creates a context with a generated request id, prefixed by the caller
    /// (e.g. `"seq"`, `"loop"`).
    pub fn generated(message: impl Into<String>, prefix: &str) -> Self {
        Self::new(message, format!("{prefix}_{}", Uuid::new_v4()))
    }

    /// Sets a metadata entry.
    pub fn set_metadata(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.metadata.insert(key.into(), value);
    }

    /// Reads a metadata entry.
    pub fn get_metadata(&self, key: &str) -> Option<&serde_json::Value> {
        self.metadata.get(key)
    }
}
