// src/task/id.rs

//! Task identity.

use std::fmt;

/// Immutable identity of a task instance: its family (type tag) plus the
/// ordered list of named parameter values.
///
/// Two tasks are the same node iff their ids are equal. The `Display` form
/// is the canonical `Family(p1=v1, p2=v2)` string used in events and logs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId {
    family: String,
    params: Vec<(String, String)>,
}

impl TaskId {
    pub fn new(family: impl Into<String>) -> Self {
        Self {
            family: family.into(),
            params: Vec::new(),
        }
    }

    /// Append a parameter. Values are rendered in their natural textual form.
    pub fn with_param(mut self, name: impl Into<String>, value: impl fmt::Display) -> Self {
        self.params.push((name.into(), value.to_string()));
        self
    }

    pub fn family(&self) -> &str {
        &self.family
    }

    /// Parameters in declaration order.
    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    /// Rendered value of a parameter, if declared.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.family)?;
        for (i, (name, value)) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name}={value}")?;
        }
        f.write_str(")")
    }
}
