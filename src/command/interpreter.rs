use crate::command::parser::{Command, parse};
use crate::task::{Subtask, Task, TaskError, TaskFilter, TaskId, TaskManager};
use tracing::{debug, warn};

pub const UNKNOWN_COMMAND: &str = "Comando desconhecido.";
pub const INVALID_COMMAND: &str = "Comando inválido.";
pub const NO_TASKS: &str = "Nenhuma tarefa encontrada.";

pub const HELP_TEXT: &str = "Comandos disponíveis:
ADD <descrição> [AAAA-MM-DD] [ALTA|MEDIA|BAIXA] - adiciona uma tarefa
ADD_SUBTASK <id> <descrição> - adiciona uma subtarefa
COMPLETE_SUBTASK <id> <n> - conclui a n-ésima subtarefa
LIST_SUBTASKS <id> - lista as subtarefas de uma tarefa
LIST - lista as tarefas pendentes
LIST_DETAILED - lista as tarefas pendentes com subtarefas
TASK_HISTORY - lista todas as tarefas
REMOVE <id> - remove uma tarefa
SEARCH <id> - busca uma tarefa
COMPLETE <id> - conclui uma tarefa";

/// Turns request lines into registry calls and text replies.
///
/// Holds no per-connection state; one interpreter may serve any number of
/// connections.
#[derive(Clone, Debug, Default)]
pub struct CommandInterpreter {
    manager: TaskManager,
}

impl CommandInterpreter {
    pub fn new(manager: TaskManager) -> Self {
        Self { manager }
    }

    pub fn manager(&self) -> &TaskManager {
        &self.manager
    }

    /// Execute one request line and return the full reply
    pub async fn execute(&self, line: &str) -> String {
        if line.trim().is_empty() {
            return INVALID_COMMAND.to_string();
        }

        let command = match parse(line) {
            Ok(command) => command,
            Err(e) => {
                debug!("Rejected command {:?}: {}", line, e);
                return e.to_string();
            }
        };

        debug!("Executing {}", command);
        match self.dispatch(command).await {
            Ok(reply) => reply,
            Err(e) => {
                debug!("Command failed: {}", e);
                e.to_string()
            }
        }
    }

    async fn dispatch(&self, command: Command) -> Result<String, TaskError> {
        let reply = match command {
            Command::Add(spec) => {
                let task_id = self.manager.add_task(spec).await?;
                format!("Tarefa adicionada com sucesso. ID: {}", task_id)
            }
            Command::AddSubtask {
                task_id,
                description,
            } => {
                let position = self.manager.add_subtask(task_id, &description).await?;
                format!(
                    "Subtarefa {} adicionada com sucesso à tarefa {}.",
                    position, task_id
                )
            }
            Command::CompleteSubtask { task_id, index } => {
                self.manager.complete_subtask(task_id, index).await?;
                format!("Subtarefa {} da tarefa {} concluída.", index, task_id)
            }
            Command::ListSubtasks(task_id) => {
                let subtasks = self.manager.list_subtasks(task_id).await?;
                format_subtask_list(task_id, &subtasks)
            }
            Command::List => {
                let tasks = self.manager.list(TaskFilter::Uncompleted).await;
                format_task_list("Tarefas:", &tasks, false)
            }
            Command::ListDetailed => {
                let tasks = self.manager.list(TaskFilter::Uncompleted).await;
                format_task_list("Tarefas:", &tasks, true)
            }
            Command::TaskHistory => {
                let tasks = self.manager.list(TaskFilter::All).await;
                format_task_list("Histórico de tarefas:", &tasks, false)
            }
            Command::Remove(task_id) => {
                self.manager.remove_task(task_id).await?;
                format!("Tarefa {} removida com sucesso.", task_id)
            }
            Command::Search(task_id) => {
                let task = self.manager.search_task(task_id).await?;
                format_task(&task)
            }
            Command::Complete(task_id) => {
                self.manager.complete_task(task_id).await?;
                format!("Tarefa {} marcada como concluída.", task_id)
            }
            Command::Help => HELP_TEXT.to_string(),
            Command::Unknown(word) => {
                warn!("Unknown command word {:?}", word);
                UNKNOWN_COMMAND.to_string()
            }
        };

        Ok(reply)
    }
}

/// One-line summary of a task
pub fn format_task(task: &Task) -> String {
    let mut line = format!(
        "ID: {}, Descrição: {}, Concluída: {}, Prioridade: {}",
        task.id, task.description, task.completed, task.priority
    );
    if let Some(due_date) = task.due_date {
        line.push_str(&format!(", Prazo: {}", due_date));
    }
    if !task.subtasks.is_empty() {
        line.push_str(&format!(
            ", Subtarefas: {}/{}",
            task.subtasks.len() - task.pending_subtasks(),
            task.subtasks.len()
        ));
    }
    line
}

fn format_subtask(position: usize, subtask: &Subtask) -> String {
    format!(
        "{}. {}, Concluída: {}",
        position, subtask.description, subtask.completed
    )
}

fn format_task_list(header: &str, tasks: &[Task], detailed: bool) -> String {
    if tasks.is_empty() {
        return NO_TASKS.to_string();
    }

    let mut lines = vec![header.to_string()];
    for task in tasks {
        lines.push(format_task(task));
        if detailed {
            for (i, subtask) in task.subtasks.iter().enumerate() {
                lines.push(format!("    {}", format_subtask(i + 1, subtask)));
            }
        }
    }
    lines.join("\n")
}

fn format_subtask_list(task_id: TaskId, subtasks: &[Subtask]) -> String {
    if subtasks.is_empty() {
        return format!("Tarefa {} não possui subtarefas.", task_id);
    }

    let mut lines = vec![format!("Subtarefas da tarefa {}:", task_id)];
    lines.extend(
        subtasks
            .iter()
            .enumerate()
            .map(|(i, subtask)| format_subtask(i + 1, subtask)),
    );
    lines.join("\n")
}
