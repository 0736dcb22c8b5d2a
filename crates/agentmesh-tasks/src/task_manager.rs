use crate::task::{Task, TaskStatus};
use agentmesh_core::{MeshError, MeshResult, Payload};
use chrono::{Duration, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info};
use uuid::Uuid;

/// Store-wide task counts.
#[derive(Debug, Clone, Serialize)]
pub struct TaskStatistics {
    /// Tasks currently stored.
    pub total_tasks: usize,
    /// Contexts with at least one indexed task.
    pub total_contexts: usize,
    /// Task count per status, keyed by the status wire name.
    pub status_counts: BTreeMap<String, usize>,
    /// Ids of the indexed contexts, sorted.
    pub contexts: Vec<String>,
}

/// Authoritative task store and lifecycle state machine.
///
/// Owns every [`Task`] record and the per-context index of task ids. All
/// mutation goes through the status-transition operations; an illegal
/// transition fails without touching the task.
#[derive(Debug, Default)]
pub struct TaskManager {
    tasks: HashMap<String, Task>,
    /// context_id -> task ids, in creation order.
    contexts: HashMap<String, Vec<String>>,
}

impl TaskManager {
    /// Creates an empty manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new `Pending` task and indexes it under its context.
    ///
    /// Fails with a validation error if `context_id`, `skill_id`, or
    /// `input_data` is empty, or with a duplicate error if `task_id` is
    /// already taken. A missing `task_id` gets a generated UUID.
    pub fn create_task(
        &mut self,
        context_id: impl Into<String>,
        skill_id: impl Into<String>,
        input_data: Payload,
        task_id: Option<String>,
    ) -> MeshResult<Task> {
        let context_id = context_id.into();
        let skill_id = skill_id.into();
        let task_id = task_id.unwrap_or_else(|| Uuid::new_v4().to_string());

        self.try_create(context_id, skill_id, input_data, task_id)
            .map_err(|e| e.in_operation("create_task"))
    }

    fn try_create(
        &mut self,
        context_id: String,
        skill_id: String,
        input_data: Payload,
        task_id: String,
    ) -> MeshResult<Task> {
        if context_id.is_empty() {
            return Err(MeshError::Validation("task without context_id".to_string()));
        }
        if skill_id.is_empty() {
            return Err(MeshError::Validation(format!(
                "task {task_id} without skill_id"
            )));
        }
        if input_data.is_empty() {
            return Err(MeshError::Validation(format!(
                "task {task_id} without input_data"
            )));
        }
        if self.tasks.contains_key(&task_id) {
            return Err(MeshError::DuplicateTask(task_id));
        }

        let task = Task::new(&task_id, &context_id, skill_id, input_data);
        self.tasks.insert(task_id.clone(), task.clone());
        self.contexts.entry(context_id.clone()).or_default().push(task_id.clone());

        info!(task_id = %task_id, context_id = %context_id, "task created");
        Ok(task)
    }

    /// Looks up a task by id.
    pub fn get_task(&self, task_id: &str) -> Option<&Task> {
        self.tasks.get(task_id)
    }

    /// All tasks indexed under a context, in creation order.
    pub fn get_tasks_by_context(&self, context_id: &str) -> Vec<&Task> {
        self.contexts
            .get(context_id)
            .map(|ids| ids.iter().filter_map(|id| self.tasks.get(id)).collect())
            .unwrap_or_default()
    }

    /// All tasks with the given status, ordered by creation time.
    pub fn get_tasks_by_status(&self, status: TaskStatus) -> Vec<&Task> {
        let mut tasks: Vec<&Task> = self
            .tasks
            .values()
            .filter(|t| t.status == status)
            .collect();
        tasks.sort_by_key(|t| t.created_at);
        tasks
    }

    /// Moves a task to `new_status`, stamping `updated_at` and merging any
    /// provided output payload and error message.
    ///
    /// Fails without mutating the task if the id is unknown or the edge is
    /// outside the transition table.
    pub fn update_task_status(
        &mut self,
        task_id: &str,
        new_status: TaskStatus,
        output_data: Option<Payload>,
        error_message: Option<String>,
    ) -> MeshResult<Task> {
        self.try_update(task_id, new_status, output_data, error_message)
            .map_err(|e| e.in_operation("update_task_status"))
    }

    fn try_update(
        &mut self,
        task_id: &str,
        new_status: TaskStatus,
        output_data: Option<Payload>,
        error_message: Option<String>,
    ) -> MeshResult<Task> {
        let task = self
            .tasks
            .get_mut(task_id)
            .ok_or_else(|| MeshError::NotFound(format!("task {task_id}")))?;

        // Validate before touching anything; a rejected transition must
        // leave the task exactly as it was.
        if !task.status.can_transition_to(new_status) {
            return Err(MeshError::InvalidTransition {
                from: task.status.to_string(),
                to: new_status.to_string(),
            });
        }

        task.status = new_status;
        task.updated_at = Utc::now();
        if let Some(output) = output_data {
            task.output_data.get_or_insert_with(Payload::new).extend(output);
        }
        if let Some(message) = error_message {
            task.error_message = Some(message);
        }

        info!(task_id = %task_id, status = %new_status, "task status updated");
        Ok(task.clone())
    }

    /// Moves a task to `InProgress`.
    pub fn start_task(&mut self, task_id: &str) -> MeshResult<Task> {
        self.update_task_status(task_id, TaskStatus::InProgress, None, None)
    }

    /// Moves a task to `Completed` with its output payload.
    pub fn complete_task(&mut self, task_id: &str, output_data: Payload) -> MeshResult<Task> {
        self.update_task_status(task_id, TaskStatus::Completed, Some(output_data), None)
    }

    /// Moves a task to `Failed` with an error message.
    pub fn fail_task(&mut self, task_id: &str, error_message: impl Into<String>) -> MeshResult<Task> {
        self.update_task_status(task_id, TaskStatus::Failed, None, Some(error_message.into()))
    }

    /// Moves a task to `AuthRequired`. A missing message defaults to
    /// `"Authentication required"`.
    pub fn require_auth_task(
        &mut self,
        task_id: &str,
        auth_message: Option<String>,
    ) -> MeshResult<Task> {
        let message = auth_message.unwrap_or_else(|| "Authentication required".to_string());
        self.update_task_status(task_id, TaskStatus::AuthRequired, None, Some(message))
    }

    /// Removes a task and its context-index entry. Returns false if the id
    /// is unknown.
    pub fn delete_task(&mut self, task_id: &str) -> bool {
        let Some(task) = self.tasks.remove(task_id) else {
            return false;
        };

        if let Some(ids) = self.contexts.get_mut(&task.context_id) {
            ids.retain(|id| id != task_id);
            if ids.is_empty() {
                self.contexts.remove(&task.context_id);
            }
        }

        info!(task_id = %task_id, "task deleted");
        true
    }

    /// Deletes every task indexed under a context. Returns how many were
    /// removed.
    pub fn delete_context(&mut self, context_id: &str) -> usize {
        let task_ids = self.contexts.get(context_id).cloned().unwrap_or_default();
        let deleted = task_ids
            .iter()
            .filter(|id| self.delete_task(id))
            .count();

        info!(context_id = %context_id, deleted, "context tasks deleted");
        deleted
    }

    /// Deletes tasks older than `max_age_hours`. Best-effort: returns how
    /// many were removed.
    pub fn cleanup_old_tasks(&mut self, max_age_hours: u32) -> usize {
        let cutoff = Utc::now() - Duration::hours(i64::from(max_age_hours));
        let stale: Vec<String> = self
            .tasks
            .values()
            .filter(|t| t.created_at < cutoff)
            .map(|t| t.task_id.clone())
            .collect();

        let deleted = stale.iter().filter(|id| self.delete_task(id)).count();
        debug!(deleted, "old task cleanup complete");
        deleted
    }

    /// Store-wide counts per status and per context.
    pub fn task_statistics(&self) -> TaskStatistics {
        let mut status_counts = BTreeMap::new();
        for status in TaskStatus::ALL {
            let count = self.tasks.values().filter(|t| t.status == status).count();
            status_counts.insert(status.to_string(), count);
        }

        let mut contexts: Vec<String> = self.contexts.keys().cloned().collect();
        contexts.sort();

        TaskStatistics {
            total_tasks: self.tasks.len(),
            total_contexts: self.contexts.len(),
            status_counts,
            contexts,
        }
    }

    /// Number of tasks stored.
    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }
}
