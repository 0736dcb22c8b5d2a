use agentmesh_core::Payload;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;

/// A logical grouping of related tasks.
///
/// The `task_ids` list is advisory: the task manager remains the source of
/// truth for whether a task actually exists, and the context never heals
/// inconsistencies on its own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Context {
    /// Unique identifier.
    pub context_id: String,
    /// Human-readable name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Arbitrary key-value metadata.
    #[serde(default)]
    pub metadata: Payload,
    /// UTC timestamp of creation.
    pub created_at: DateTime<Utc>,
    /// UTC timestamp of the last mutation.
    pub updated_at: DateTime<Utc>,
    /// Ids of the tasks this context claims, in the order they were added.
    #[serde(default)]
    pub task_ids: Vec<String>,
}

impl Context {
    /// Creates a context. A missing name defaults to `Context-<id prefix>`,
    /// a missing description to a generic one.
    pub fn new(
        context_id: impl Into<String>,
        name: Option<String>,
        description: Option<String>,
        metadata: Option<Payload>,
    ) -> Self {
        let context_id = context_id.into();
        let short: String = context_id.chars().take(8).collect();
        let now = Utc::now();
        Self {
            name: name.unwrap_or_else(|| format!("Context-{short}")),
            description: description
                .unwrap_or_else(|| "Grouping of related tasks".to_string()),
            metadata: metadata.unwrap_or_default(),
            context_id,
            created_at: now,
            updated_at: now,
            task_ids: Vec::new(),
        }
    }

    /// Adds a task id to the advisory list. Idempotent.
    pub fn add_task(&mut self, task_id: impl Into<String>) {
        let task_id = task_id.into();
        if !self.task_ids.contains(&task_id) {
            self.task_ids.push(task_id);
            self.updated_at = Utc::now();
        }
    }

    /// Removes a task id from the advisory list. Returns false if it was
    /// not present.
    pub fn remove_task(&mut self, task_id: &str) -> bool {
        let before = self.task_ids.len();
        self.task_ids.retain(|id| id != task_id);
        if self.task_ids.len() < before {
            self.updated_at = Utc::now();
            true
        } else {
            false
        }
    }

    /// Number of task ids this context claims.
    pub fn task_count(&self) -> usize {
        self.task_ids.len()
    }

    /// The interchange shape used when a context crosses into a hosting
    /// layer: the struct fields plus a derived `task_count`.
    pub fn external_repr(&self) -> serde_json::Value {
        json!({
            "context_id": self.context_id,
            "name": self.name,
            "description": self.description,
            "metadata": self.metadata,
            "created_at": self.created_at,
            "updated_at": self.updated_at,
            "task_count": self.task_count(),
            "task_ids": self.task_ids,
        })
    }
}

/// Field updates to apply to a context. Absent fields are left untouched;
/// metadata is merged key-by-key rather than replaced.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContextUpdate {
    /// New name, if any.
    pub name: Option<String>,
    /// New description, if any.
    pub description: Option<String>,
    /// Metadata entries to merge in, if any.
    pub metadata: Option<Payload>,
}

impl ContextUpdate {
    /// An empty update.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Adds a metadata entry to merge.
    pub fn metadata_entry(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata
            .get_or_insert_with(Payload::new)
            .insert(key.into(), value);
        self
    }
}

/// Task counts for one context, resolved against the task manager.
#[derive(Debug, Clone, Serialize)]
pub struct ContextStatistics {
    /// The context these counts belong to.
    pub context_id: String,
    /// Context name.
    pub name: String,
    /// Context description.
    pub description: String,
    /// Tasks that actually resolved against the task manager.
    pub total_tasks: usize,
    /// Resolved task count per status, keyed by the status wire name.
    /// Statuses with no tasks are omitted.
    pub status_counts: BTreeMap<String, usize>,
    /// UTC timestamp of context creation.
    pub created_at: DateTime<Utc>,
    /// UTC timestamp of the last context mutation.
    pub updated_at: DateTime<Utc>,
    /// Context metadata.
    pub metadata: Payload,
}
