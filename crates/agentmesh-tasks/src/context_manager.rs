use crate::context::{Context, ContextStatistics, ContextUpdate};
use crate::task::Task;
use crate::task_manager::TaskManager;
use agentmesh_core::{MeshError, MeshResult, Payload};
use chrono::Utc;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

/// Counts across every context, resolved against the task manager.
#[derive(Debug, Clone, Serialize)]
pub struct AllContextsStatistics {
    /// Number of contexts stored.
    pub total_contexts: usize,
    /// Task ids claimed across all contexts (advisory count).
    pub total_tasks: usize,
    /// Per-context statistics.
    pub contexts: Vec<ContextStatistics>,
}

/// Owner of [`Context`] records.
///
/// Holds only weak references (ids) to tasks; operations that resolve or
/// cascade into task records go through the shared [`TaskManager`], when one
/// is attached.
#[derive(Debug, Default)]
pub struct ContextManager {
    contexts: HashMap<String, Context>,
    task_manager: Option<Arc<RwLock<TaskManager>>>,
}

impl ContextManager {
    /// Creates a manager with no task-manager link; task-resolving
    /// operations will return empty results and cascades will be skipped.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a manager that resolves and cascades through the given
    /// shared task manager.
    pub fn with_task_manager(task_manager: Arc<RwLock<TaskManager>>) -> Self {
        Self {
            contexts: HashMap::new(),
            task_manager: Some(task_manager),
        }
    }

    /// Creates a context. A missing id gets a generated UUID; a taken id
    /// fails with a duplicate error.
    pub fn create_context(
        &mut self,
        name: Option<String>,
        description: Option<String>,
        metadata: Option<Payload>,
        context_id: Option<String>,
    ) -> MeshResult<Context> {
        let context_id = context_id.unwrap_or_else(|| Uuid::new_v4().to_string());

        if self.contexts.contains_key(&context_id) {
            return Err(
                MeshError::DuplicateContext(context_id).in_operation("create_context")
            );
        }

        let context = Context::new(&context_id, name, description, metadata);
        self.contexts.insert(context_id.clone(), context.clone());

        info!(context_id = %context_id, "context created");
        Ok(context)
    }

    /// Looks up a context by id.
    pub fn get_context(&self, context_id: &str) -> Option<&Context> {
        self.contexts.get(context_id)
    }

    /// Every context, ordered by creation time.
    pub fn get_all_contexts(&self) -> Vec<&Context> {
        let mut contexts: Vec<&Context> = self.contexts.values().collect();
        contexts.sort_by_key(|c| c.created_at);
        contexts
    }

    /// Applies field updates. Name and description replace; metadata merges
    /// key-by-key.
    pub fn update_context(
        &mut self,
        context_id: &str,
        update: ContextUpdate,
    ) -> MeshResult<Context> {
        let context = self.contexts.get_mut(context_id).ok_or_else(|| {
            MeshError::NotFound(format!("context {context_id}")).in_operation("update_context")
        })?;

        if let Some(name) = update.name {
            context.name = name;
        }
        if let Some(description) = update.description {
            context.description = description;
        }
        if let Some(metadata) = update.metadata {
            context.metadata.extend(metadata);
        }
        context.updated_at = Utc::now();

        info!(context_id = %context_id, "context updated");
        Ok(context.clone())
    }

    /// Deletes a context, optionally cascading into the task manager to
    /// delete every task the context claims. Returns false if the id is
    /// unknown.
    pub async fn delete_context(&mut self, context_id: &str, delete_tasks: bool) -> bool {
        let Some(context) = self.contexts.get(context_id) else {
            return false;
        };

        if delete_tasks {
            if let Some(task_manager) = &self.task_manager {
                let mut manager = task_manager.write().await;
                for task_id in &context.task_ids {
                    manager.delete_task(task_id);
                }
            }
        }

        self.contexts.remove(context_id);
        info!(context_id = %context_id, delete_tasks, "context deleted");
        true
    }

    /// Adds a task id to a context's advisory list. Idempotent on repeat
    /// adds; fails only if the context is unknown.
    pub fn add_task_to_context(&mut self, context_id: &str, task_id: &str) -> MeshResult<()> {
        let context = self.contexts.get_mut(context_id).ok_or_else(|| {
            MeshError::NotFound(format!("context {context_id}"))
                .in_operation("add_task_to_context")
        })?;
        context.add_task(task_id);
        debug!(context_id = %context_id, task_id = %task_id, "task added to context");
        Ok(())
    }

    /// Removes a task id from a context's advisory list. Returns false if
    /// the context is unknown or the id was not listed.
    pub fn remove_task_from_context(&mut self, context_id: &str, task_id: &str) -> bool {
        self.contexts
            .get_mut(context_id)
            .is_some_and(|c| c.remove_task(task_id))
    }

    /// Resolves a context's task ids against the task manager, silently
    /// skipping ids that no longer exist. Empty when the context is unknown
    /// or no task manager is attached.
    pub async fn get_context_tasks(&self, context_id: &str) -> Vec<Task> {
        let Some(context) = self.contexts.get(context_id) else {
            return Vec::new();
        };
        let Some(task_manager) = &self.task_manager else {
            return Vec::new();
        };

        let manager = task_manager.read().await;
        context
            .task_ids
            .iter()
            .filter_map(|id| manager.get_task(id).cloned())
            .collect()
    }

    /// Task counts for one context, grouped by status. `None` when the
    /// context is unknown.
    pub async fn get_context_statistics(&self, context_id: &str) -> Option<ContextStatistics> {
        let context = self.contexts.get(context_id)?;
        let tasks = self.get_context_tasks(context_id).await;

        let mut status_counts: BTreeMap<String, usize> = BTreeMap::new();
        for task in &tasks {
            *status_counts.entry(task.status.to_string()).or_insert(0) += 1;
        }

        Some(ContextStatistics {
            context_id: context.context_id.clone(),
            name: context.name.clone(),
            description: context.description.clone(),
            total_tasks: tasks.len(),
            status_counts,
            created_at: context.created_at,
            updated_at: context.updated_at,
            metadata: context.metadata.clone(),
        })
    }

    /// Statistics across every context.
    pub async fn all_contexts_statistics(&self) -> AllContextsStatistics {
        let mut stats = Vec::new();
        for context in self.get_all_contexts() {
            if let Some(s) = self.get_context_statistics(&context.context_id).await {
                stats.push(s);
            }
        }

        AllContextsStatistics {
            total_contexts: self.contexts.len(),
            total_tasks: self.contexts.values().map(Context::task_count).sum(),
            contexts: stats,
        }
    }

    /// Deletes every context whose advisory task list is empty. Returns how
    /// many were removed.
    pub fn cleanup_empty_contexts(&mut self) -> usize {
        let empty: Vec<String> = self
            .contexts
            .values()
            .filter(|c| c.task_count() == 0)
            .map(|c| c.context_id.clone())
            .collect();

        for context_id in &empty {
            self.contexts.remove(context_id);
        }

        info!(deleted = empty.len(), "empty context cleanup complete");
        empty.len()
    }

    /// Number of contexts stored.
    pub fn context_count(&self) -> usize {
        self.contexts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskStatus;
    use serde_json::json;

    fn input() -> Payload {
        let mut data = Payload::new();
        data.insert("origin".to_string(), json!("A"));
        data
    }

    fn linked_managers() -> (Arc<RwLock<TaskManager>>, ContextManager) {
        let tasks = Arc::new(RwLock::new(TaskManager::new()));
        let contexts = ContextManager::with_task_manager(Arc::clone(&tasks));
        (tasks, contexts)
    }

    #[test]
    fn test_create_context_generates_id() {
        let mut manager = ContextManager::new();
        let ctx = manager.create_context(None, None, None, None).unwrap();
        assert!(!ctx.context_id.is_empty());
        assert!(manager.get_context(&ctx.context_id).is_some());
    }

    #[test]
    fn test_create_context_with_multibyte_id() {
        let mut manager = ContextManager::new();
        let ctx = manager
            .create_context(None, None, None, Some("日本語コンテキスト".to_string()))
            .unwrap();
        assert_eq!(ctx.name, "Context-日本語コンテキス");
    }

    #[test]
    fn test_create_context_rejects_duplicate() {
        let mut manager = ContextManager::new();
        manager
            .create_context(None, None, None, Some("c1".to_string()))
            .unwrap();
        let err = manager
            .create_context(None, None, None, Some("c1".to_string()))
            .unwrap_err();
        assert!(matches!(err.root_cause(), MeshError::DuplicateContext(_)));
    }

    #[test]
    fn test_update_context_merges_metadata() {
        let mut manager = ContextManager::new();
        let mut metadata = Payload::new();
        metadata.insert("region".to_string(), json!("emea"));
        let ctx = manager
            .create_context(None, None, Some(metadata), Some("c1".to_string()))
            .unwrap();

        let updated = manager
            .update_context(
                &ctx.context_id,
                ContextUpdate::new()
                    .name("renamed")
                    .metadata_entry("owner", json!("ops")),
            )
            .unwrap();

        assert_eq!(updated.name, "renamed");
        assert_eq!(updated.metadata.get("region"), Some(&json!("emea")));
        assert_eq!(updated.metadata.get("owner"), Some(&json!("ops")));
    }

    #[test]
    fn test_update_unknown_context_is_not_found() {
        let mut manager = ContextManager::new();
        let err = manager
            .update_context("missing", ContextUpdate::new())
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_add_and_remove_task_ids() {
        let mut manager = ContextManager::new();
        manager
            .create_context(None, None, None, Some("c1".to_string()))
            .unwrap();

        manager.add_task_to_context("c1", "t1").unwrap();
        manager.add_task_to_context("c1", "t1").unwrap();
        assert_eq!(manager.get_context("c1").unwrap().task_count(), 1);

        assert!(manager.remove_task_from_context("c1", "t1"));
        assert!(!manager.remove_task_from_context("c1", "t1"));
        assert!(!manager.remove_task_from_context("missing", "t1"));

        let err = manager.add_task_to_context("missing", "t1").unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_get_context_tasks_skips_missing_ids() {
        let (tasks, mut contexts) = linked_managers();
        contexts
            .create_context(None, None, None, Some("c1".to_string()))
            .unwrap();

        let task = tasks
            .write()
            .await
            .create_task("c1", "skill.route", input(), None)
            .unwrap();
        contexts.add_task_to_context("c1", &task.task_id).unwrap();
        contexts.add_task_to_context("c1", "ghost").unwrap();

        let resolved = contexts.get_context_tasks("c1").await;
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].task_id, task.task_id);
    }

    #[tokio::test]
    async fn test_delete_context_cascades_into_task_manager() {
        let (tasks, mut contexts) = linked_managers();
        contexts
            .create_context(None, None, None, Some("c1".to_string()))
            .unwrap();

        for _ in 0..2 {
            let task = tasks
                .write()
                .await
                .create_task("c1", "skill.route", input(), None)
                .unwrap();
            contexts.add_task_to_context("c1", &task.task_id).unwrap();
        }

        assert!(contexts.delete_context("c1", true).await);
        assert_eq!(tasks.read().await.task_count(), 0);
        assert!(tasks.read().await.get_tasks_by_context("c1").is_empty());
        assert!(!contexts.delete_context("c1", true).await);
    }

    #[tokio::test]
    async fn test_delete_context_without_cascade_keeps_tasks() {
        let (tasks, mut contexts) = linked_managers();
        contexts
            .create_context(None, None, None, Some("c1".to_string()))
            .unwrap();
        let task = tasks
            .write()
            .await
            .create_task("c1", "skill.route", input(), None)
            .unwrap();
        contexts.add_task_to_context("c1", &task.task_id).unwrap();

        assert!(contexts.delete_context("c1", false).await);
        assert!(tasks.read().await.get_task(&task.task_id).is_some());
    }

    #[tokio::test]
    async fn test_context_statistics_groups_by_status() {
        let (tasks, mut contexts) = linked_managers();
        contexts
            .create_context(Some("routing".to_string()), None, None, Some("c1".to_string()))
            .unwrap();

        let t1 = tasks
            .write()
            .await
            .create_task("c1", "skill.route", input(), None)
            .unwrap();
        let t2 = tasks
            .write()
            .await
            .create_task("c1", "skill.route", input(), None)
            .unwrap();
        contexts.add_task_to_context("c1", &t1.task_id).unwrap();
        contexts.add_task_to_context("c1", &t2.task_id).unwrap();

        {
            let mut manager = tasks.write().await;
            manager.start_task(&t1.task_id).unwrap();
            let mut output = Payload::new();
            output.insert("distance_km".to_string(), json!(650));
            manager.complete_task(&t1.task_id, output).unwrap();
        }

        let stats = contexts.get_context_statistics("c1").await.unwrap();
        assert_eq!(stats.total_tasks, 2);
        assert_eq!(stats.status_counts.get("completed"), Some(&1));
        assert_eq!(stats.status_counts.get("pending"), Some(&1));
        assert_eq!(
            tasks.read().await.get_task(&t1.task_id).unwrap().status,
            TaskStatus::Completed
        );

        assert!(contexts.get_context_statistics("missing").await.is_none());
    }

    #[tokio::test]
    async fn test_all_contexts_statistics() {
        let (_tasks, mut contexts) = linked_managers();
        contexts
            .create_context(None, None, None, Some("c1".to_string()))
            .unwrap();
        contexts
            .create_context(None, None, None, Some("c2".to_string()))
            .unwrap();
        contexts.add_task_to_context("c1", "t1").unwrap();

        let stats = contexts.all_contexts_statistics().await;
        assert_eq!(stats.total_contexts, 2);
        assert_eq!(stats.total_tasks, 1);
        assert_eq!(stats.contexts.len(), 2);
    }

    #[test]
    fn test_cleanup_empty_contexts() {
        let mut manager = ContextManager::new();
        manager
            .create_context(None, None, None, Some("empty1".to_string()))
            .unwrap();
        manager
            .create_context(None, None, None, Some("empty2".to_string()))
            .unwrap();
        manager
            .create_context(None, None, None, Some("busy".to_string()))
            .unwrap();
        manager.add_task_to_context("busy", "t1").unwrap();

        assert_eq!(manager.cleanup_empty_contexts(), 2);
        assert_eq!(manager.context_count(), 1);
        assert!(manager.get_context("busy").is_some());
    }
}
