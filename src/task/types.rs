use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;
use thiserror::Error;

use crate::task::tree::StoreError;

/// Unique identifier for tasks, handed out by the registry and never reused
pub type TaskId = u64;

/// Format accepted for due dates on the wire
pub const DUE_DATE_FORMAT: &str = "%Y-%m-%d";

static DATE_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());

/// Stored task record
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Task {
    pub id: TaskId,
    pub description: String,
    pub completed: bool,
    pub due_date: Option<NaiveDate>,
    pub priority: TaskPriority,
    pub subtasks: Vec<Subtask>,
}

/// Subtask owned by exactly one parent task; addressed by its position
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Subtask {
    pub description: String,
    pub completed: bool,
}

/// Task priority levels
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum TaskPriority {
    High,
    Medium,
    #[default]
    Low,
}

/// Task specification for creating new tasks
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TaskSpec {
    pub description: String,
    /// Raw `YYYY-MM-DD` text; validated when the task is created
    pub due_date: Option<String>,
    pub priority: Option<TaskPriority>,
}

/// Errors surfaced by task-level operations.
///
/// The `Display` text of each variant is the reply a client receives.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TaskError {
    #[error("Erro: {0}")]
    Validation(String),

    #[error("Tarefa {0} não encontrada.")]
    NotFound(TaskId),

    #[error("Subtarefa {index} da tarefa {task_id} não encontrada.")]
    SubtaskNotFound { task_id: TaskId, index: usize },

    #[error("Erro interno: {0}")]
    Store(#[from] StoreError),
}

impl TaskError {
    pub fn validation(message: impl Into<String>) -> Self {
        TaskError::Validation(message.into())
    }
}

impl Task {
    /// Create a new task from a specification, validating description and due date
    pub fn new(id: TaskId, spec: TaskSpec) -> Result<Self, TaskError> {
        let description = spec.description.trim().to_string();
        if description.is_empty() {
            return Err(TaskError::validation("descrição da tarefa não fornecida."));
        }

        let due_date = spec.due_date.as_deref().map(parse_due_date).transpose()?;

        Ok(Self {
            id,
            description,
            completed: false,
            due_date,
            priority: spec.priority.unwrap_or_default(),
            subtasks: Vec::new(),
        })
    }

    /// Mark the task completed. Completing twice is a no-op.
    pub fn complete(&mut self) {
        self.completed = true;
    }

    /// Append a subtask at the end of the list
    pub fn add_subtask(&mut self, description: &str) -> Result<usize, TaskError> {
        let description = description.trim();
        if description.is_empty() {
            return Err(TaskError::validation(
                "descrição da subtarefa não fornecida.",
            ));
        }

        self.subtasks.push(Subtask {
            description: description.to_string(),
            completed: false,
        });
        Ok(self.subtasks.len())
    }

    /// Mark the 1-based `index` subtask completed
    pub fn complete_subtask(&mut self, index: usize) -> Result<(), TaskError> {
        let task_id = self.id;
        index
            .checked_sub(1)
            .and_then(|i| self.subtasks.get_mut(i))
            .map(|subtask| subtask.completed = true)
            .ok_or(TaskError::SubtaskNotFound { task_id, index })
    }

    /// Number of subtasks still open
    pub fn pending_subtasks(&self) -> usize {
        self.subtasks.iter().filter(|s| !s.completed).count()
    }
}

impl TaskPriority {
    /// Wire keyword for this priority
    pub fn keyword(&self) -> &'static str {
        match self {
            TaskPriority::High => "ALTA",
            TaskPriority::Medium => "MEDIA",
            TaskPriority::Low => "BAIXA",
        }
    }

    /// Parse a wire keyword (`ALTA`, `MEDIA`, `BAIXA`), ignoring case
    pub fn from_keyword(token: &str) -> Option<Self> {
        match token.to_uppercase().as_str() {
            "ALTA" => Some(TaskPriority::High),
            "MEDIA" | "MÉDIA" => Some(TaskPriority::Medium),
            "BAIXA" => Some(TaskPriority::Low),
            _ => None,
        }
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// True when `token` has the `YYYY-MM-DD` shape, whether or not it is a real date
pub fn is_date_shaped(token: &str) -> bool {
    DATE_SHAPE.is_match(token)
}

/// Parse and validate a `YYYY-MM-DD` due date
pub fn parse_due_date(raw: &str) -> Result<NaiveDate, TaskError> {
    if !is_date_shaped(raw) {
        return Err(TaskError::validation(format!(
            "data inválida '{}' (formato esperado AAAA-MM-DD).",
            raw
        )));
    }

    NaiveDate::parse_from_str(raw, DUE_DATE_FORMAT).map_err(|_| {
        TaskError::validation(format!(
            "data inválida '{}' (formato esperado AAAA-MM-DD).",
            raw
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(description: &str) -> TaskSpec {
        TaskSpec {
            description: description.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_task_defaults() {
        let task = Task::new(7, spec("buy milk")).unwrap();

        assert_eq!(task.id, 7);
        assert_eq!(task.description, "buy milk");
        assert!(!task.completed);
        assert_eq!(task.due_date, None);
        assert_eq!(task.priority, TaskPriority::Low);
        assert!(task.subtasks.is_empty());
    }

    #[test]
    fn test_task_rejects_blank_description() {
        let err = Task::new(1, spec("   ")).unwrap_err();
        assert!(matches!(err, TaskError::Validation(_)));
    }

    #[test]
    fn test_due_date_validation() {
        assert_eq!(
            parse_due_date("2025-01-01").unwrap(),
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
        );
        assert!(parse_due_date("2025-13-01").is_err());
        assert!(parse_due_date("2025-02-30").is_err());
        assert!(parse_due_date("25-01-01").is_err());
        assert!(parse_due_date("2025/01/01").is_err());
    }

    #[test]
    fn test_date_shape_is_not_calendar_check() {
        assert!(is_date_shaped("2025-99-99"));
        assert!(!is_date_shaped("2025-1-1"));
        assert!(!is_date_shaped("tomorrow"));
    }

    #[test]
    fn test_priority_keywords() {
        assert_eq!(TaskPriority::from_keyword("ALTA"), Some(TaskPriority::High));
        assert_eq!(TaskPriority::from_keyword("media"), Some(TaskPriority::Medium));
        assert_eq!(TaskPriority::from_keyword("Baixa"), Some(TaskPriority::Low));
        assert_eq!(TaskPriority::from_keyword("urgent"), None);
        assert_eq!(TaskPriority::High.to_string(), "ALTA");
    }

    #[test]
    fn test_subtask_lifecycle() {
        let mut task = Task::new(1, spec("walk dog")).unwrap();

        assert_eq!(task.add_subtask("buy leash").unwrap(), 1);
        assert_eq!(task.add_subtask("find park").unwrap(), 2);
        assert_eq!(task.pending_subtasks(), 2);

        task.complete_subtask(1).unwrap();
        task.complete_subtask(1).unwrap();
        assert!(task.subtasks[0].completed);
        assert_eq!(task.pending_subtasks(), 1);

        assert_eq!(
            task.complete_subtask(0),
            Err(TaskError::SubtaskNotFound { task_id: 1, index: 0 })
        );
        assert_eq!(
            task.complete_subtask(3),
            Err(TaskError::SubtaskNotFound { task_id: 1, index: 3 })
        );
    }
}
