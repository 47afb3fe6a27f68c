//! Command handlers - extracted from main.rs for testability

pub mod run;
pub mod scenarios;

pub use run::{execute_run, resolve_scenario};
pub use scenarios::{execute_list, execute_show, render_list};
