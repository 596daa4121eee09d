use crate::task::tree::OrderedStore;
use crate::task::types::*;
use tracing::{debug, info};

/// Which tasks a listing includes
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskFilter {
    /// Every task, regardless of completion
    All,
    /// Only tasks not yet completed
    Uncompleted,
}

impl TaskFilter {
    pub fn matches(&self, task: &Task) -> bool {
        match self {
            TaskFilter::All => true,
            TaskFilter::Uncompleted => !task.completed,
        }
    }
}

/// Task registry: owns the ordered store and the id counter.
///
/// Not synchronised on its own; [`crate::task::TaskManager`] serialises
/// access across connections.
#[derive(Debug)]
pub struct TaskRegistry {
    store: OrderedStore,
    next_id: TaskId,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self {
            store: OrderedStore::new(),
            next_id: 1,
        }
    }

    /// Id the next successful `add_task` will assign
    pub fn next_id(&self) -> TaskId {
        self.next_id
    }

    /// Create a task and store it, returning its id.
    ///
    /// The counter only advances once the task is stored, so a rejected
    /// spec never burns an id.
    pub fn add_task(&mut self, spec: TaskSpec) -> Result<TaskId, TaskError> {
        let task = Task::new(self.next_id, spec)?;
        let task_id = task.id;

        self.store.insert(task)?;
        self.next_id += 1;

        info!("Added task {}", task_id);
        Ok(task_id)
    }

    /// Append a subtask to an existing task, returning its 1-based position
    pub fn add_subtask(&mut self, task_id: TaskId, description: &str) -> Result<usize, TaskError> {
        let task = self.get_task_mut(task_id)?;
        let position = task.add_subtask(description)?;

        debug!("Added subtask {} to task {}", position, task_id);
        Ok(position)
    }

    /// Mark a task completed; completing an already completed task succeeds
    pub fn complete_task(&mut self, task_id: TaskId) -> Result<(), TaskError> {
        self.get_task_mut(task_id)?.complete();
        debug!("Completed task {}", task_id);
        Ok(())
    }

    /// Mark the 1-based `index` subtask of a task completed
    pub fn complete_subtask(&mut self, task_id: TaskId, index: usize) -> Result<(), TaskError> {
        self.get_task_mut(task_id)?.complete_subtask(index)?;
        debug!("Completed subtask {} of task {}", index, task_id);
        Ok(())
    }

    /// Remove a task together with its subtasks
    pub fn remove_task(&mut self, task_id: TaskId) -> Result<Task, TaskError> {
        let removed = self
            .store
            .delete(task_id)
            .ok_or(TaskError::NotFound(task_id))?;

        info!(
            "Removed task {} ({} subtasks discarded)",
            task_id,
            removed.subtasks.len()
        );
        Ok(removed)
    }

    /// Get a task by ID
    pub fn search_task(&self, task_id: TaskId) -> Result<&Task, TaskError> {
        self.store
            .search(task_id)
            .ok_or(TaskError::NotFound(task_id))
    }

    /// Subtasks of a task, in insertion order
    pub fn list_subtasks(&self, task_id: TaskId) -> Result<&[Subtask], TaskError> {
        Ok(&self.search_task(task_id)?.subtasks)
    }

    /// Tasks matching `filter`, ascending by id
    pub fn list(&self, filter: TaskFilter) -> impl Iterator<Item = &Task> + '_ {
        self.store.iter().filter(move |task| filter.matches(task))
    }

    /// Number of stored tasks
    pub fn count(&self) -> usize {
        self.store.count()
    }

    pub fn store(&self) -> &OrderedStore {
        &self.store
    }

    fn get_task_mut(&mut self, task_id: TaskId) -> Result<&mut Task, TaskError> {
        self.store
            .search_mut(task_id)
            .ok_or(TaskError::NotFound(task_id))
    }
}

impl Default for TaskRegistry {
    fn default() -> Self {
        Self::new()
    }
}
