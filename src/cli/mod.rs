//! Command-line interface for the task server
//!
//! This module provides argument parsing and configuration discovery.

pub mod args;
pub mod config;

pub use args::{Args, Commands, ConnectionArgs, ExecutionMode};
pub use config::{ConfigDiscovery, ConfigError, ServerConfig};
