// src/config/model.rs

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::types::{ExecutionMode, HandlerErrorPolicy};

/// Configuration exactly as read from a TOML file, before validation.
///
/// ```toml
/// [build]
/// mode = "local"
/// handler_errors = "propagate"
///
/// [task.report]
/// params = { day = "2024-01-01" }
/// cmd = "cat in/source.csv > out/report-{day}.txt"
/// output = "out/report-{day}.txt"
/// requires = ["source"]
///
/// [task.source]
/// output = "in/source.csv"
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawConfigFile {
    #[serde(default)]
    pub build: BuildSection,

    /// All tasks from `[task.<name>]`, keyed by task name.
    #[serde(default)]
    pub task: BTreeMap<String, TaskConfig>,
}

/// Validated configuration. Obtain one through `TryFrom<RawConfigFile>`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub build: BuildSection,
    pub task: BTreeMap<String, TaskConfig>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(build: BuildSection, task: BTreeMap<String, TaskConfig>) -> Self {
        Self { build, task }
    }
}

/// `[build]` section.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct BuildSection {
    /// `"local"` (default) or `"distributed"`.
    #[serde(default)]
    pub mode: ExecutionMode,

    /// `"propagate"` (default) or `"isolate"`.
    #[serde(default)]
    pub handler_errors: HandlerErrorPolicy,
}

/// `[task.<name>]` section.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct TaskConfig {
    /// Task family used in the task id; defaults to the section name.
    #[serde(default)]
    pub family: Option<String>,

    /// Parameters, in declaration order. Values must be scalars.
    #[serde(default)]
    pub params: toml::Table,

    /// Shell command producing the output. Tasks without one are external.
    #[serde(default)]
    pub cmd: Option<String>,

    /// Artifact path, relative to the config file's directory.
    #[serde(default)]
    pub output: Option<String>,

    /// Names of the tasks this one requires.
    #[serde(default)]
    pub requires: Vec<String>,
}

impl TaskConfig {
    pub fn effective_family<'a>(&'a self, name: &'a str) -> &'a str {
        self.family.as_deref().unwrap_or(name)
    }

    pub fn is_external(&self) -> bool {
        self.cmd.is_none()
    }
}

/// Render a scalar parameter value in its natural textual form.
///
/// Returns `None` for arrays and tables.
pub fn render_param(value: &toml::Value) -> Option<String> {
    match value {
        toml::Value::String(s) => Some(s.clone()),
        toml::Value::Integer(i) => Some(i.to_string()),
        toml::Value::Float(f) => Some(f.to_string()),
        toml::Value::Boolean(b) => Some(b.to_string()),
        toml::Value::Datetime(d) => Some(d.to_string()),
        toml::Value::Array(_) | toml::Value::Table(_) => None,
    }
}
