use agentmesh_core::Payload;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a [`Task`].
///
/// `Completed` and `Failed` are terminal; every task starts at `Pending`.
/// The allowed edges are encoded in [`TaskStatus::can_transition_to`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Created, not yet picked up.
    Pending,
    /// Actively being worked on.
    InProgress,
    /// Finished successfully. Terminal.
    Completed,
    /// Finished unsuccessfully. Terminal.
    Failed,
    /// Blocked on an authentication step.
    AuthRequired,
}

impl TaskStatus {
    /// Every status, in declaration order. Used for exhaustive statistics.
    pub const ALL: [TaskStatus; 5] = [
        TaskStatus::Pending,
        TaskStatus::InProgress,
        TaskStatus::Completed,
        TaskStatus::Failed,
        TaskStatus::AuthRequired,
    ];

    /// Whether the state machine allows moving from `self` to `next`.
    pub fn can_transition_to(self, next: TaskStatus) -> bool {
        use TaskStatus::*;
        match self {
            Pending => matches!(next, InProgress | Failed | AuthRequired),
            InProgress => matches!(next, Completed | Failed | AuthRequired),
            AuthRequired => matches!(next, InProgress | Failed),
            Completed | Failed => false,
        }
    }

    /// True for `Completed` and `Failed`.
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskStatus::Pending => write!(f, "pending"),
            TaskStatus::InProgress => write!(f, "in_progress"),
            TaskStatus::Completed => write!(f, "completed"),
            TaskStatus::Failed => write!(f, "failed"),
            TaskStatus::AuthRequired => write!(f, "auth_required"),
        }
    }
}

/// One unit of work with a bounded, validated lifecycle.
///
/// Owned exclusively by the `TaskManager`; mutated only through its
/// status-transition operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier.
    pub task_id: String,
    /// The context this task belongs to.
    pub context_id: String,
    /// Current lifecycle status.
    pub status: TaskStatus,
    /// The skill this task asks for.
    pub skill_id: String,
    /// Opaque input payload.
    pub input_data: Payload,
    /// Opaque output payload, set when the task produces one.
    pub output_data: Option<Payload>,
    /// Failure or auth message, when set.
    pub error_message: Option<String>,
    /// UTC timestamp of creation.
    pub created_at: DateTime<Utc>,
    /// UTC timestamp of the last status change.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates a `Pending` task.
    pub fn new(
        task_id: impl Into<String>,
        context_id: impl Into<String>,
        skill_id: impl Into<String>,
        input_data: Payload,
    ) -> Self {
        let now = Utc::now();
        Self {
            task_id: task_id.into(),
            context_id: context_id.into(),
            status: TaskStatus::Pending,
            skill_id: skill_id.into(),
            input_data,
            output_data: None,
            error_message: None,
            created_at: now,
            updated_at: now,
        }
    }
}
