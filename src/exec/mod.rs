// src/exec/mod.rs

//! Config-declared tasks.
//!
//! - [`command`] defines [`CommandTask`], a task whose body runs a shell
//!   command with `std::process::Command` and whose output is a file.
//! - [`catalog`] turns a validated config into shared task instances and
//!   picks the default build roots.

pub mod catalog;
pub mod command;

pub use catalog::Catalog;
pub use command::{CommandError, CommandTask, COMMAND_TAG, EXTERNAL_TAG};
