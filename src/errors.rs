// src/errors.rs

//! Crate-wide error types.
//!
//! - [`DomainError`] is raised by a task body and never aborts a build.
//! - [`ResolutionError`] is raised when a completion check itself fails.
//! - [`GraphError`] covers malformed dependency declarations (cycles etc.).
//! - [`HandlerError`] is raised by an event handler.
//!
//! [`LazydagError`] is the top-level error returned by the build entry
//! points, the config loader and the CLI.

use std::fmt;

use thiserror::Error;

use crate::task::TaskId;

/// Error raised by a task's run body.
///
/// Carries the original cause so FAILURE handlers can inspect it with
/// [`DomainError::cause`] and `downcast_ref`.
#[derive(Error, Debug)]
#[error("task body failed: {0:#}")]
pub struct DomainError(anyhow::Error);

impl DomainError {
    /// Wrap a concrete error type as the cause.
    pub fn new<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self(anyhow::Error::new(err))
    }

    /// Build a domain error from a plain message.
    pub fn msg<M>(message: M) -> Self
    where
        M: fmt::Display + fmt::Debug + Send + Sync + 'static,
    {
        Self(anyhow::Error::msg(message))
    }

    /// The original error raised by the task body.
    pub fn cause(&self) -> &anyhow::Error {
        &self.0
    }
}

impl From<anyhow::Error> for DomainError {
    fn from(err: anyhow::Error) -> Self {
        Self(err)
    }
}

impl From<HandlerError> for DomainError {
    fn from(err: HandlerError) -> Self {
        Self(anyhow::Error::new(err))
    }
}

impl From<std::io::Error> for DomainError {
    fn from(err: std::io::Error) -> Self {
        Self(anyhow::Error::new(err))
    }
}

/// A completion check could not be evaluated.
#[derive(Error, Debug)]
#[error("completion check for {task} failed: {source:#}")]
pub struct ResolutionError {
    pub task: TaskId,
    #[source]
    pub source: anyhow::Error,
}

/// Malformed dependency graph. Always fatal, raised before anything runs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("cycle detected in task graph: {}", format_path(.0))]
    Cycle(Vec<String>),

    #[error("task '{0}' cannot require itself")]
    SelfDependency(String),

    #[error("task '{task}' requires unknown task '{requirement}'")]
    UnknownRequirement { task: String, requirement: String },
}

fn format_path(path: &[String]) -> String {
    path.join(" -> ")
}

/// A subscribed event handler returned an error.
#[derive(Error, Debug)]
#[error("handler for '{event}' failed: {source:#}")]
pub struct HandlerError {
    pub event: String,
    #[source]
    pub source: anyhow::Error,
}

#[derive(Error, Debug)]
pub enum LazydagError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Invalid task graph: {0}")]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error(transparent)]
    Handler(#[from] HandlerError),

    #[error("Execution mode '{0}' is not supported by the in-process executor")]
    UnsupportedMode(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, LazydagError>;
