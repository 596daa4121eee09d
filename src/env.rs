//! Environment constants and path utilities for the task server.
//!
//! This module centralizes the defaults, directory names and file names used
//! throughout the application, making them easier to maintain and modify.

use std::path::{Path, PathBuf};

/// Main application directory name (hidden directory like .git, .vscode)
pub const TASKD_DIR_NAME: &str = ".taskd";

/// Configuration file name inside the application directory
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Configuration file name looked up in the working directory
pub const LOCAL_CONFIG_FILE_NAME: &str = "taskd.toml";

/// System-wide configuration file (unix)
pub const SYSTEM_CONFIG_FILE: &str = "/etc/taskd/config.toml";

/// Network defaults
pub mod net {
    /// Host the server binds to and the client connects to
    pub const DEFAULT_HOST: &str = "localhost";

    /// Default TCP port
    pub const DEFAULT_PORT: u16 = 12345;

    /// Longest accepted request line, in bytes
    pub const DEFAULT_MAX_LINE_LENGTH: usize = 1024;
}

/// Default tracing filter when neither `RUST_LOG` nor the config sets one
pub const DEFAULT_LOG_FILTER: &str = "taskd=info";

/// Build the .taskd directory path from a base directory
pub fn taskd_dir_path(base: &Path) -> PathBuf {
    base.join(TASKD_DIR_NAME)
}

/// Build the config file path under `<base>/.taskd/`
pub fn config_file_path(base: &Path) -> PathBuf {
    taskd_dir_path(base).join(CONFIG_FILE_NAME)
}

/// Build the `./taskd.toml` path for a working directory
pub fn local_config_file_path(current_dir: &Path) -> PathBuf {
    current_dir.join(LOCAL_CONFIG_FILE_NAME)
}
