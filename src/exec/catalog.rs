// src/exec/catalog.rs

//! Task instances built from a validated config.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::config::model::{render_param, TaskConfig};
use crate::config::validate::PLACEHOLDER_RE;
use crate::config::ConfigFile;
use crate::errors::{LazydagError, Result};
use crate::exec::command::CommandTask;
use crate::target::{ArtifactStore, LocalStore, Target};
use crate::task::{TaskId, TaskRef};

/// All config tasks, keyed by section name.
///
/// Each section becomes exactly one [`CommandTask`]; tasks that require it
/// share the same instance.
#[derive(Debug)]
pub struct Catalog {
    tasks: BTreeMap<String, TaskRef>,
    /// Names of tasks no other task requires.
    sinks: Vec<String>,
}

impl Catalog {
    /// Build tasks whose outputs and commands are relative to `root_dir`.
    pub fn from_config(cfg: &ConfigFile, root_dir: &Path) -> Result<Self> {
        let store: Arc<dyn ArtifactStore> = Arc::new(LocalStore::new(root_dir));
        Self::with_store(cfg, store, root_dir)
    }

    /// Like [`from_config`](Self::from_config) with an explicit store.
    pub fn with_store(cfg: &ConfigFile, store: Arc<dyn ArtifactStore>, root_dir: &Path) -> Result<Self> {
        let mut builder = Builder {
            cfg,
            store,
            workdir: root_dir.to_path_buf(),
            built: BTreeMap::new(),
            in_progress: HashSet::new(),
        };
        for name in cfg.task.keys() {
            builder.build(name)?;
        }

        let required: HashSet<&str> = cfg
            .task
            .values()
            .flat_map(|t| t.requires.iter().map(String::as_str))
            .collect();
        let sinks = cfg
            .task
            .keys()
            .filter(|name| !required.contains(name.as_str()))
            .cloned()
            .collect();

        Ok(Self {
            tasks: builder.built,
            sinks,
        })
    }

    pub fn get(&self, name: &str) -> Option<&TaskRef> {
        self.tasks.get(name)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tasks.keys().map(String::as_str)
    }

    /// Tasks nothing else requires; the default build roots.
    pub fn default_roots(&self) -> Vec<TaskRef> {
        self.sinks
            .iter()
            .filter_map(|name| self.tasks.get(name).cloned())
            .collect()
    }

    /// Look up the given names, failing on the first unknown one.
    pub fn select(&self, names: &[String]) -> Result<Vec<TaskRef>> {
        names
            .iter()
            .map(|name| {
                self.tasks
                    .get(name)
                    .cloned()
                    .ok_or_else(|| LazydagError::ConfigError(format!("unknown task '{name}'")))
            })
            .collect()
    }
}

struct Builder<'a> {
    cfg: &'a ConfigFile,
    store: Arc<dyn ArtifactStore>,
    workdir: PathBuf,
    built: BTreeMap<String, TaskRef>,
    in_progress: HashSet<String>,
}

impl Builder<'_> {
    fn build(&mut self, name: &str) -> Result<TaskRef> {
        if let Some(task) = self.built.get(name) {
            return Ok(TaskRef::clone(task));
        }
        if !self.in_progress.insert(name.to_string()) {
            return Err(LazydagError::ConfigError(format!(
                "task '{name}' requires itself transitively"
            )));
        }

        let cfg = self.cfg;
        let tc = cfg
            .task
            .get(name)
            .ok_or_else(|| LazydagError::ConfigError(format!("unknown task '{name}'")))?;

        let mut requires = Vec::with_capacity(tc.requires.len());
        for dep in &tc.requires {
            requires.push(self.build(dep)?);
        }

        let id = task_id(name, tc);
        let output = tc
            .output
            .as_deref()
            .map(|tpl| Target::new(Arc::clone(&self.store), expand(tpl, tc)));
        let cmd = tc.cmd.as_deref().map(|tpl| expand(tpl, tc));

        debug!(task = %id, name, external = cmd.is_none(), "built config task");

        let task: TaskRef = Arc::new(CommandTask::new(id, cmd, output, requires, self.workdir.clone()));
        self.in_progress.remove(name);
        self.built.insert(name.to_string(), TaskRef::clone(&task));
        Ok(task)
    }
}

fn task_id(name: &str, tc: &TaskConfig) -> TaskId {
    tc.params
        .iter()
        .fold(TaskId::new(tc.effective_family(name)), |id, (key, value)| {
            id.with_param(key, render_param(value).unwrap_or_default())
        })
}

/// Substitute `{param}` placeholders with rendered parameter values.
///
/// Unknown placeholders are left untouched.
pub fn expand(template: &str, tc: &TaskConfig) -> String {
    PLACEHOLDER_RE
        .replace_all(template, |caps: &regex::Captures<'_>| {
            tc.params
                .get(&caps[1])
                .and_then(render_param)
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}
