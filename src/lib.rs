//! # taskd
//!
//! An in-memory task store served over TCP. Clients send one text command
//! per line; the server applies it to an AVL-balanced ordered store of
//! tasks and answers with a human-readable reply.
//!
//! ## Architecture Overview
//!
//! - **[`task`]**: the ordered store, the task registry and the shared
//!   manager that serialises mutations across connections
//! - **[`command`]**: request-line parsing and reply formatting
//! - **[`server`]**: TCP listener with one task per connection
//! - **[`client`]**: interactive line client
//! - **[`cli`]**: argument parsing and configuration discovery
//!
//! ## Protocol
//!
//! ```text
//! ADD <text...> [YYYY-MM-DD] [ALTA|MEDIA|BAIXA]
//! ADD_SUBTASK <id> <text...>
//! COMPLETE_SUBTASK <id> <n>
//! LIST_SUBTASKS <id>
//! LIST | LIST_DETAILED | TASK_HISTORY
//! REMOVE <id> | SEARCH <id> | COMPLETE <id>
//! HELP
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use taskd::{ServerConfig, TaskManager, TaskServer};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::default();
//!     let server = TaskServer::bind(&config, TaskManager::new()).await?;
//!     server.run().await?;
//!     Ok(())
//! }
//! ```

/// Task storage: AVL ordered store, registry and synchronised manager.
pub mod task;

/// Text command protocol.
pub mod command;

/// TCP server front end.
pub mod server;

/// Interactive client.
pub mod client;

/// Environment constants and path utilities.
pub mod env;

// CLI module for command-line interface
pub mod cli;

pub use cli::{ConfigDiscovery, ServerConfig};
pub use client::TaskClient;
pub use command::{Command, CommandInterpreter};
pub use server::{TaskServer, TransportError};
pub use task::{
    OrderedStore, StoreError, Subtask, Task, TaskError, TaskFilter, TaskId, TaskManager,
    TaskPriority, TaskRegistry, TaskSpec,
};
