// src/config/mod.rs

//! Configuration loading and validation for lazydag.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate names, parameters and the task graph (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path, load_from_str};
pub use model::{BuildSection, ConfigFile, RawConfigFile, TaskConfig};
pub use validate::validate_config;
