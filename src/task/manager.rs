use crate::task::registry::*;
use crate::task::types::*;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error};

/// Shared, synchronised handle to the task registry.
///
/// Cloning is cheap and every clone talks to the same registry. Mutations
/// hold the write lock for their whole read-modify-write; reads hold the
/// shared lock and hand back owned copies, so no guard ever outlives a call.
#[derive(Clone, Debug, Default)]
pub struct TaskManager {
    registry: Arc<RwLock<TaskRegistry>>,
}

/// Snapshot of registry counters
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaskStatistics {
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub next_id: TaskId,
}

/// Task manager operations
impl TaskManager {
    pub fn new() -> Self {
        Self::with_registry(TaskRegistry::new())
    }

    pub fn with_registry(registry: TaskRegistry) -> Self {
        Self {
            registry: Arc::new(RwLock::new(registry)),
        }
    }

    /// Create a new task
    pub async fn add_task(&self, spec: TaskSpec) -> Result<TaskId, TaskError> {
        let mut registry = self.registry.write().await;
        let result = registry.add_task(spec);
        Self::report(&result);
        result
    }

    pub async fn add_subtask(
        &self,
        task_id: TaskId,
        description: &str,
    ) -> Result<usize, TaskError> {
        let mut registry = self.registry.write().await;
        registry.add_subtask(task_id, description)
    }

    /// Mark task as completed
    pub async fn complete_task(&self, task_id: TaskId) -> Result<(), TaskError> {
        let mut registry = self.registry.write().await;
        registry.complete_task(task_id)
    }

    pub async fn complete_subtask(&self, task_id: TaskId, index: usize) -> Result<(), TaskError> {
        let mut registry = self.registry.write().await;
        registry.complete_subtask(task_id, index)
    }

    /// Remove a task and its subtasks
    pub async fn remove_task(&self, task_id: TaskId) -> Result<Task, TaskError> {
        let mut registry = self.registry.write().await;
        registry.remove_task(task_id)
    }

    /// Get a task by ID
    pub async fn search_task(&self, task_id: TaskId) -> Result<Task, TaskError> {
        let registry = self.registry.read().await;
        registry.search_task(task_id).cloned()
    }

    pub async fn list_subtasks(&self, task_id: TaskId) -> Result<Vec<Subtask>, TaskError> {
        let registry = self.registry.read().await;
        Ok(registry.list_subtasks(task_id)?.to_vec())
    }

    /// Tasks matching `filter`, ascending by id
    pub async fn list(&self, filter: TaskFilter) -> Vec<Task> {
        let registry = self.registry.read().await;
        let tasks: Vec<Task> = registry.list(filter).cloned().collect();
        debug!("Listed {} tasks ({:?})", tasks.len(), filter);
        tasks
    }

    pub async fn count(&self) -> usize {
        self.registry.read().await.count()
    }

    /// Get registry statistics
    pub async fn get_statistics(&self) -> TaskStatistics {
        let registry = self.registry.read().await;
        TaskStatistics {
            total_tasks: registry.count(),
            completed_tasks: registry.list(TaskFilter::All).filter(|t| t.completed).count(),
            next_id: registry.next_id(),
        }
    }

    fn report<T>(result: &Result<T, TaskError>) {
        if let Err(TaskError::Store(e)) = result {
            error!("Ordered store invariant violated: {}", e);
        }
    }
}
