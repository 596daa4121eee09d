//! Line tokenizer and command grammar.
//!
//! A line is split on whitespace; the first token selects the command
//! (case-insensitive) and the rest are positional arguments.

use crate::task::types::{TaskError, TaskId, TaskPriority, TaskSpec, is_date_shaped};
use std::fmt;
use tracing::debug;

/// A parsed request
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Add(TaskSpec),
    AddSubtask { task_id: TaskId, description: String },
    CompleteSubtask { task_id: TaskId, index: usize },
    ListSubtasks(TaskId),
    List,
    ListDetailed,
    TaskHistory,
    Remove(TaskId),
    Search(TaskId),
    Complete(TaskId),
    Help,
    /// Unrecognised command word, kept for the reply
    Unknown(String),
}

/// Command words, as they appear on the wire
pub mod keyword {
    pub const ADD: &str = "ADD";
    pub const ADD_SUBTASK: &str = "ADD_SUBTASK";
    pub const COMPLETE_SUBTASK: &str = "COMPLETE_SUBTASK";
    pub const LIST_SUBTASKS: &str = "LIST_SUBTASKS";
    pub const LIST: &str = "LIST";
    pub const LIST_DETAILED: &str = "LIST_DETAILED";
    pub const TASK_HISTORY: &str = "TASK_HISTORY";
    pub const REMOVE: &str = "REMOVE";
    pub const SEARCH: &str = "SEARCH";
    pub const COMPLETE: &str = "COMPLETE";
    pub const HELP: &str = "HELP";
}

/// Parse one request line.
///
/// Returns a validation error for an empty line or malformed arguments.
/// Unknown command words are not errors; they parse to [`Command::Unknown`].
pub fn parse(line: &str) -> Result<Command, TaskError> {
    let mut tokens = line.split_whitespace();
    let Some(word) = tokens.next() else {
        return Err(TaskError::validation("comando vazio."));
    };
    let args: Vec<&str> = tokens.collect();
    let action = word.to_uppercase();

    debug!("Parsing command {} with {} arguments", action, args.len());

    let command = match action.as_str() {
        keyword::ADD => Command::Add(parse_add(&args)?),
        keyword::ADD_SUBTASK => {
            let (task_id, rest) = split_id(&args)?;
            if rest.is_empty() {
                return Err(TaskError::validation(
                    "descrição da subtarefa não fornecida.",
                ));
            }
            Command::AddSubtask {
                task_id,
                description: rest.join(" "),
            }
        }
        keyword::COMPLETE_SUBTASK => {
            let (task_id, rest) = split_id(&args)?;
            let index = match rest {
                [] => {
                    return Err(TaskError::validation(
                        "número da subtarefa não fornecido.",
                    ));
                }
                [index] => index.parse::<usize>().map_err(|_| {
                    TaskError::validation("número da subtarefa deve ser um número.")
                })?,
                _ => return Err(too_many_arguments(keyword::COMPLETE_SUBTASK)),
            };
            Command::CompleteSubtask { task_id, index }
        }
        keyword::LIST_SUBTASKS => Command::ListSubtasks(single_id(&args, keyword::LIST_SUBTASKS)?),
        keyword::LIST => no_arguments(&args, keyword::LIST, Command::List)?,
        keyword::LIST_DETAILED => no_arguments(&args, keyword::LIST_DETAILED, Command::ListDetailed)?,
        keyword::TASK_HISTORY => no_arguments(&args, keyword::TASK_HISTORY, Command::TaskHistory)?,
        keyword::REMOVE => Command::Remove(single_id(&args, keyword::REMOVE)?),
        keyword::SEARCH => Command::Search(single_id(&args, keyword::SEARCH)?),
        keyword::COMPLETE => Command::Complete(single_id(&args, keyword::COMPLETE)?),
        keyword::HELP => Command::Help,
        _ => Command::Unknown(word.to_string()),
    };

    Ok(command)
}

/// Split `ADD` arguments into description, due date and priority.
///
/// The last token is checked for a priority keyword first, then the new
/// last token for a date shape; whatever remains is the description. A
/// description whose final words look like a date or priority keyword is
/// read as such.
fn parse_add(args: &[&str]) -> Result<TaskSpec, TaskError> {
    let mut rest = args;

    let mut priority = None;
    if let Some((last, head)) = rest.split_last() {
        if let Some(parsed) = TaskPriority::from_keyword(last) {
            priority = Some(parsed);
            rest = head;
        }
    }

    let mut due_date = None;
    if let Some((last, head)) = rest.split_last() {
        if is_date_shaped(last) {
            due_date = Some(last.to_string());
            rest = head;
        }
    }

    if rest.is_empty() {
        return Err(TaskError::validation("descrição da tarefa não fornecida."));
    }

    Ok(TaskSpec {
        description: rest.join(" "),
        due_date,
        priority,
    })
}

fn parse_id(token: &str) -> Result<TaskId, TaskError> {
    token
        .parse::<TaskId>()
        .map_err(|_| TaskError::validation("ID da tarefa deve ser um número."))
}

fn split_id<'a, 'b>(args: &'a [&'b str]) -> Result<(TaskId, &'a [&'b str]), TaskError> {
    match args.split_first() {
        Some((first, rest)) => Ok((parse_id(first)?, rest)),
        None => Err(TaskError::validation("ID da tarefa não fornecido.")),
    }
}

fn single_id(args: &[&str], command: &str) -> Result<TaskId, TaskError> {
    match args {
        [] => Err(TaskError::validation("ID da tarefa não fornecido.")),
        [id] => parse_id(id),
        _ => Err(too_many_arguments(command)),
    }
}

fn no_arguments(args: &[&str], command: &str, parsed: Command) -> Result<Command, TaskError> {
    if args.is_empty() {
        Ok(parsed)
    } else {
        Err(too_many_arguments(command))
    }
}

fn too_many_arguments(command: &str) -> TaskError {
    TaskError::validation(format!("argumentos em excesso para {}.", command))
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Add(_) => f.write_str(keyword::ADD),
            Command::AddSubtask { .. } => f.write_str(keyword::ADD_SUBTASK),
            Command::CompleteSubtask { .. } => f.write_str(keyword::COMPLETE_SUBTASK),
            Command::ListSubtasks(_) => f.write_str(keyword::LIST_SUBTASKS),
            Command::List => f.write_str(keyword::LIST),
            Command::ListDetailed => f.write_str(keyword::LIST_DETAILED),
            Command::TaskHistory => f.write_str(keyword::TASK_HISTORY),
            Command::Remove(_) => f.write_str(keyword::REMOVE),
            Command::Search(_) => f.write_str(keyword::SEARCH),
            Command::Complete(_) => f.write_str(keyword::COMPLETE),
            Command::Help => f.write_str(keyword::HELP),
            Command::Unknown(word) => write!(f, "{} (desconhecido)", word),
        }
    }
}
