//! Command line argument parsing
//!
//! This module handles CLI argument parsing with subcommands:
//! - `serve`: Run the task server
//! - `client`: Run the interactive line client against a server
//! - `show-config`: Show configuration discovery information

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, PartialEq, Eq)]
pub enum ExecutionMode {
    Serve(ConnectionArgs),
    Client(ConnectionArgs),
    ShowConfig,
}

/// Connection settings taken from the command line; unset fields fall back to config
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionArgs {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub config: Option<PathBuf>,
}

#[derive(Debug, Parser)]
#[command(name = "taskd")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Line-oriented TCP task server backed by an AVL-balanced store")]
#[command(long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the task server
    Serve {
        /// Address to bind
        #[arg(long = "host")]
        host: Option<String>,
        /// TCP port to listen on
        #[arg(short = 'p', long = "port")]
        port: Option<u16>,
        /// Configuration file path
        #[arg(short = 'c', long = "config")]
        config: Option<PathBuf>,
    },
    /// Connect to a running server and send commands typed on stdin
    Client {
        /// Server host
        #[arg(long = "host")]
        host: Option<String>,
        /// Server port
        #[arg(short = 'p', long = "port")]
        port: Option<u16>,
        /// Configuration file path
        #[arg(short = 'c', long = "config")]
        config: Option<PathBuf>,
    },
    /// Show configuration discovery information
    ShowConfig,
}

impl Args {
    pub fn parse() -> Self {
        Parser::parse()
    }

    pub fn mode(&self) -> Result<ExecutionMode, String> {
        match &self.command {
            Some(Commands::Serve { host, port, config }) => {
                Ok(ExecutionMode::Serve(ConnectionArgs {
                    host: host.clone(),
                    port: *port,
                    config: config.clone(),
                }))
            }
            Some(Commands::Client { host, port, config }) => {
                Ok(ExecutionMode::Client(ConnectionArgs {
                    host: host.clone(),
                    port: *port,
                    config: config.clone(),
                }))
            }
            Some(Commands::ShowConfig) => Ok(ExecutionMode::ShowConfig),
            None => {
                Err("No command specified. Use 'taskd --help' to see available commands.".to_string())
            }
        }
    }
}
