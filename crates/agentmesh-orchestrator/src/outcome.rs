use agentmesh_core::Payload;
use agentmesh_events::Event;
use serde::{Deserialize, Serialize};

/// How one (agent, iteration) attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    /// The agent ran and produced a terminal event.
    Completed,
    /// The agent's `execute` returned an error.
    Failed,
    /// A conditional predicate ruled the agent out; it was never invoked.
    Skipped,
    /// The agent ran but left nothing on its queue.
    NoResponse,
}

/// Normalized record of one (agent, iteration) attempt.
///
/// Transient: produced by the orchestrator, never stored by it.
#[derive(Debug, Clone, Serialize)]
pub struct AgentOutcome {
    /// Name of the agent this record belongs to.
    pub agent: String,
    /// How the attempt ended.
    pub status: OutcomeStatus,
    /// The terminal event's content, when the attempt completed.
    pub response: Option<serde_json::Value>,
    /// The error message, when the attempt failed.
    pub error: Option<String>,
    /// Loop iteration index, when run under the loop strategy.
    pub iteration: Option<usize>,
    /// The terminal event's metadata, when the attempt completed.
    #[serde(default)]
    pub metadata: Payload,
}

impl AgentOutcome {
    /// A completed attempt, carrying the drained event's content and
    /// metadata.
    pub fn completed(agent: impl Into<String>, event: Event) -> Self {
        Self {
            agent: agent.into(),
            status: OutcomeStatus::Completed,
            response: Some(event.content),
            error: None,
            iteration: None,
            metadata: event.metadata,
        }
    }

    /// A failed attempt.
    pub fn failed(agent: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            agent: agent.into(),
            status: OutcomeStatus::Failed,
            response: None,
            error: Some(error.into()),
            iteration: None,
            metadata: Payload::new(),
        }
    }

    /// An attempt ruled out by a conditional predicate.
    pub fn skipped(agent: impl Into<String>) -> Self {
        Self {
            agent: agent.into(),
            status: OutcomeStatus::Skipped,
            response: None,
            error: None,
            iteration: None,
            metadata: Payload::new(),
        }
    }

    /// An attempt that ran but enqueued nothing.
    pub fn no_response(agent: impl Into<String>) -> Self {
        Self {
            agent: agent.into(),
            status: OutcomeStatus::NoResponse,
            response: None,
            error: None,
            iteration: None,
            metadata: Payload::new(),
        }
    }

    /// Tags the record with its loop iteration.
    pub fn with_iteration(mut self, iteration: usize) -> Self {
        self.iteration = Some(iteration);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_completed_carries_event_payload() {
        let event = Event::new("response", json!({"distance_km": 650}))
            .with_metadata("model", json!("v2"));
        let outcome = AgentOutcome::completed("terrestrial", event);

        assert_eq!(outcome.status, OutcomeStatus::Completed);
        assert_eq!(outcome.response, Some(json!({"distance_km": 650})));
        assert_eq!(outcome.metadata.get("model"), Some(&json!("v2")));
        assert!(outcome.error.is_none());
    }

    #[test]
    fn test_failed_carries_error() {
        let outcome = AgentOutcome::failed("maritime", "backend unavailable").with_iteration(2);
        assert_eq!(outcome.status, OutcomeStatus::Failed);
        assert_eq!(outcome.error.as_deref(), Some("backend unavailable"));
        assert_eq!(outcome.iteration, Some(2));
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(
            serde_json::to_string(&OutcomeStatus::NoResponse).unwrap(),
            "\"no_response\""
        );
        assert_eq!(
            serde_json::to_string(&OutcomeStatus::Skipped).unwrap(),
            "\"skipped\""
        );
    }
}
