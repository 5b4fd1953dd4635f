//! Driver input files
//!
//! Loads the TOML inputs that feed the argument store:
//! 1. Build manifest: project `default_args` and per-toolchain
//!    `toolchain_args` and `declare_args` blocks
//! 2. Args file: explicit overrides for this build directory
//! 3. `--arg name=value` command-line overrides

mod args_file;
mod manifest;
mod source;

pub use args_file::{load_args_file, parse_arg_assignment, COMMAND_LINE_ORIGIN};
pub use manifest::{BuildManifest, DeclareBlock, ToolchainSpec};
pub use source::{table_to_map, toml_to_value, ConfigSource};

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {message}")]
    IoError { path: String, message: String },

    #[error("Parse error in {path}: {message}")]
    ParseError { path: String, message: String },

    #[error("Validation error: {0}")]
    ValidationError(String),
}
