//! Engine options

use forge_core::limits::{DEFAULT_MAX_CONCURRENCY, DEFAULT_MAX_RANGE_SPAN};
use serde::{Deserialize, Serialize};

/// How a bulk operation schedules its items
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// Fan out with bounded concurrency, collect every failure
    #[default]
    Parallel,
    /// One item at a time in input order, stop at the first failure
    Sequential,
}

impl std::str::FromStr for ExecutionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "parallel" => Ok(Self::Parallel),
            "sequential" => Ok(Self::Sequential),
            other => Err(format!(
                "unknown execution mode '{}' (expected parallel or sequential)",
                other
            )),
        }
    }
}

impl std::fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecutionMode::Parallel => write!(f, "parallel"),
            ExecutionMode::Sequential => write!(f, "sequential"),
        }
    }
}

/// Options shared by every operation of a [`crate::Forge`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForgeOptions {
    /// Mode used by bulk operations that do not pick one
    pub default_mode: ExecutionMode,
    /// Upper bound on in-flight store calls in parallel mode
    pub max_concurrency: usize,
    /// Largest id range `fetch_many_by_ids` will expand
    pub max_range_span: u64,
    /// Index declared fields under the entity's name on create
    pub auto_index: bool,
}

impl Default for ForgeOptions {
    fn default() -> Self {
        Self {
            default_mode: ExecutionMode::Parallel,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            max_range_span: DEFAULT_MAX_RANGE_SPAN,
            auto_index: true,
        }
    }
}

impl ForgeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mut self, mode: ExecutionMode) -> Self {
        self.default_mode = mode;
        self
    }

    /// Values below one are raised to one
    pub fn with_max_concurrency(mut self, n: usize) -> Self {
        self.max_concurrency = n.max(1);
        self
    }

    pub fn with_max_range_span(mut self, span: u64) -> Self {
        self.max_range_span = span;
        self
    }

    pub fn with_auto_index(mut self, enabled: bool) -> Self {
        self.auto_index = enabled;
        self
    }
}
