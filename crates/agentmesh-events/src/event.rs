use agentmesh_core::Payload;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Delivery priority of an [`Event`].
///
/// Selects which FIFO lane the event lands in; dequeue order across lanes
/// is strictly `High` → `Normal` → `Low`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Drained before everything else.
    High,
    /// The default lane.
    Normal,
    /// Drained only when the other lanes are empty.
    Low,
}

impl Priority {
    /// Maps a signed priority level by sign: positive = high, zero = normal,
    /// negative = low. Compatibility shim for callers that still speak the
    /// integer convention.
    pub fn from_level(level: i32) -> Self {
        match level {
            l if l > 0 => Priority::High,
            l if l < 0 => Priority::Low,
            _ => Priority::Normal,
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Priority::High => write!(f, "high"),
            Priority::Normal => write!(f, "normal"),
            Priority::Low => write!(f, "low"),
        }
    }
}

/// One asynchronous message between agents.
///
/// Created at enqueue time and destroyed at dequeue — once a consumer takes
/// it off the queue, the queue retains nothing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Unique identifier for this event.
    pub event_id: String,
    /// Tag describing what kind of event this is (e.g. `"response"`, `"error"`).
    pub event_type: String,
    /// Opaque payload.
    pub content: serde_json::Value,
    /// UTC timestamp of creation.
    pub timestamp: DateTime<Utc>,
    /// Arbitrary key-value metadata.
    #[serde(default)]
    pub metadata: Payload,
    /// Producing agent, when known.
    pub sender_id: Option<String>,
    /// Intended consumer, when known.
    pub receiver_id: Option<String>,
    /// Lane this event is routed to.
    pub priority: Priority,
}

impl Event {
    /// Creates a normal-priority event with a generated id.
    pub fn new(event_type: impl Into<String>, content: serde_json::Value) -> Self {
        Self {
            event_id: Uuid::new_v4().to_string(),
            event_type: event_type.into(),
            content,
            timestamp: Utc::now(),
            metadata: Payload::new(),
            sender_id: None,
            receiver_id: None,
            priority: Priority::Normal,
        }
    }

    /// Sets the priority.
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the sending agent id.
    pub fn with_sender(mut self, sender_id: impl Into<String>) -> Self {
        self.sender_id = Some(sender_id.into());
        self
    }

    /// Sets the receiving agent id.
    pub fn with_receiver(mut self, receiver_id: impl Into<String>) -> Self {
        self.receiver_id = Some(receiver_id.into());
        self
    }

    /// Attaches a metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}
