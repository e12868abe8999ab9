#![allow(dead_code)]

use std::collections::BTreeMap;

use lazydag::config::{BuildSection, ConfigFile, RawConfigFile, TaskConfig};
use lazydag::errors::Result;
use lazydag::types::{ExecutionMode, HandlerErrorPolicy};

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile {
                build: BuildSection::default(),
                task: BTreeMap::new(),
            },
        }
    }

    pub fn with_task(mut self, name: &str, task: TaskConfig) -> Self {
        self.config.task.insert(name.to_string(), task);
        self
    }

    pub fn mode(mut self, mode: ExecutionMode) -> Self {
        self.config.build.mode = mode;
        self
    }

    pub fn handler_errors(mut self, policy: HandlerErrorPolicy) -> Self {
        self.config.build.handler_errors = policy;
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn try_build(self) -> Result<ConfigFile> {
        ConfigFile::try_from(self.config)
    }

    pub fn build(self) -> ConfigFile {
        self.try_build()
            .expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `TaskConfig`.
pub struct TaskConfigBuilder {
    task: TaskConfig,
}

impl TaskConfigBuilder {
    /// A task running `cmd`.
    pub fn command(cmd: &str) -> Self {
        Self {
            task: TaskConfig {
                cmd: Some(cmd.to_string()),
                ..TaskConfig::default()
            },
        }
    }

    /// An external task whose artifact lives at `output`.
    pub fn external(output: &str) -> Self {
        Self {
            task: TaskConfig {
                output: Some(output.to_string()),
                ..TaskConfig::default()
            },
        }
    }

    pub fn family(mut self, family: &str) -> Self {
        self.task.family = Some(family.to_string());
        self
    }

    pub fn param(mut self, name: &str, value: impl Into<toml::Value>) -> Self {
        self.task.params.insert(name.to_string(), value.into());
        self
    }

    pub fn output(mut self, output: &str) -> Self {
        self.task.output = Some(output.to_string());
        self
    }

    pub fn requires(mut self, dep: &str) -> Self {
        self.task.requires.push(dep.to_string());
        self
    }

    pub fn build(self) -> TaskConfig {
        self.task
    }
}
