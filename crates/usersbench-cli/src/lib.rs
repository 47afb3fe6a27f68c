//! usersbench CLI library
//!
//! Command definitions, handlers and logging setup for the `usersbench`
//! binary.

#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::format_push_string)] // String building is clear and correct
#![allow(clippy::missing_errors_doc)] // Error types are self-documenting

mod commands;
mod config;
mod error;
pub mod handlers;
pub mod logging;

pub use commands::{Cli, Commands, ReportFormat, RunArgs, ShowArgs};
pub use config::{CliConfig, Verbosity};
pub use error::{CliError, CliResult};
