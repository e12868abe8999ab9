use std::fmt;
use std::str::FromStr;
use serde::Deserialize;

/// Where a build runs.
///
/// - `Local`: the in-process, single-threaded executor (default).
/// - `Distributed`: a remote scheduler with workers. Accepted by the config
///   layer so files stay portable, but rejected by [`crate::engine::build`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    Local,
    Distributed,
}

impl Default for ExecutionMode {
    fn default() -> Self {
        ExecutionMode::Local
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionMode::Local => f.write_str("local"),
            ExecutionMode::Distributed => f.write_str("distributed"),
        }
    }
}

impl FromStr for ExecutionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" => Ok(ExecutionMode::Local),
            "distributed" => Ok(ExecutionMode::Distributed),
            other => Err(format!(
                "invalid mode: {other} (expected \"local\" or \"distributed\")"
            )),
        }
    }
}

/// What happens when an event handler returns an error.
///
/// - `Propagate` (default): the emission stops at the failing handler. For
///   lifecycle events the build is aborted with the handler error; inside a
///   task body the error is returned from `trigger_event`.
/// - `Isolate`: the failure is logged and the remaining handlers still run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandlerErrorPolicy {
    Propagate,
    Isolate,
}

impl Default for HandlerErrorPolicy {
    fn default() -> Self {
        HandlerErrorPolicy::Propagate
    }
}

impl FromStr for HandlerErrorPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "propagate" => Ok(HandlerErrorPolicy::Propagate),
            "isolate" => Ok(HandlerErrorPolicy::Isolate),
            other => Err(format!(
                "invalid handler_errors: {other} (expected \"propagate\" or \"isolate\")"
            )),
        }
    }
}
