// src/config/validate.rs

use std::collections::HashSet;
use std::sync::LazyLock;

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;
use regex::Regex;

use crate::config::model::{render_param, ConfigFile, RawConfigFile, TaskConfig};
use crate::errors::{GraphError, LazydagError, Result};

static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_.-]*$").expect("valid name regex"));

/// Matches `{param}` placeholders in `cmd` and `output`.
pub(crate) static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("valid placeholder regex"));

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = LazydagError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.build, raw.task))
    }
}

pub fn validate_config(cfg: &RawConfigFile) -> Result<()> {
    ensure_has_tasks(cfg)?;
    for (name, task) in cfg.task.iter() {
        validate_task(name, task)?;
    }
    validate_unique_ids(cfg)?;
    validate_task_dependencies(cfg)?;
    validate_dag(cfg)?;
    Ok(())
}

fn ensure_has_tasks(cfg: &RawConfigFile) -> Result<()> {
    if cfg.task.is_empty() {
        return Err(LazydagError::ConfigError(
            "config must contain at least one [task.<name>] section".to_string(),
        ));
    }
    Ok(())
}

fn validate_task(name: &str, task: &TaskConfig) -> Result<()> {
    if !NAME_RE.is_match(name) {
        return Err(LazydagError::ConfigError(format!(
            "invalid task name '{name}'"
        )));
    }

    let family = task.effective_family(name);
    if !NAME_RE.is_match(family) {
        return Err(LazydagError::ConfigError(format!(
            "task '{name}' has invalid family '{family}'"
        )));
    }

    for (key, value) in task.params.iter() {
        if render_param(value).is_none() {
            return Err(LazydagError::ConfigError(format!(
                "task '{name}': parameter '{key}' must be a string, number, boolean or datetime"
            )));
        }
    }

    for template in [task.cmd.as_deref(), task.output.as_deref()].into_iter().flatten() {
        for caps in PLACEHOLDER_RE.captures_iter(template) {
            let param = &caps[1];
            if !task.params.contains_key(param) {
                return Err(LazydagError::ConfigError(format!(
                    "task '{name}' uses undeclared parameter '{{{param}}}'"
                )));
            }
        }
    }

    if task.is_external() && task.output.is_none() {
        return Err(LazydagError::ConfigError(format!(
            "external task '{name}' needs an `output` (it has no `cmd`)"
        )));
    }

    Ok(())
}

/// Two sections must not describe the same task identity.
fn validate_unique_ids(cfg: &RawConfigFile) -> Result<()> {
    let mut seen: HashSet<(String, Vec<(String, String)>)> = HashSet::new();
    for (name, task) in cfg.task.iter() {
        let params = task
            .params
            .iter()
            .filter_map(|(k, v)| render_param(v).map(|v| (k.clone(), v)))
            .collect();
        let key = (task.effective_family(name).to_string(), params);
        if !seen.insert(key) {
            return Err(LazydagError::ConfigError(format!(
                "task '{name}' has the same family and parameters as another task"
            )));
        }
    }
    Ok(())
}

fn validate_task_dependencies(cfg: &RawConfigFile) -> Result<()> {
    for (name, task) in cfg.task.iter() {
        for dep in task.requires.iter() {
            if dep == name {
                return Err(GraphError::SelfDependency(name.clone()).into());
            }
            if !cfg.task.contains_key(dep) {
                return Err(GraphError::UnknownRequirement {
                    task: name.clone(),
                    requirement: dep.clone(),
                }
                .into());
            }
        }
    }
    Ok(())
}

fn validate_dag(cfg: &RawConfigFile) -> Result<()> {
    // Edge direction: requirement -> task.
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();

    for name in cfg.task.keys() {
        graph.add_node(name.as_str());
    }

    for (name, task) in cfg.task.iter() {
        for dep in task.requires.iter() {
            graph.add_edge(dep.as_str(), name.as_str(), ());
        }
    }

    match toposort(&graph, None) {
        Ok(_order) => Ok(()),
        Err(cycle) => Err(GraphError::Cycle(vec![cycle.node_id().to_string()]).into()),
    }
}
