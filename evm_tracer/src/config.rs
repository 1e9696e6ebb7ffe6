use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::callstack::MAX_CALLSTACK_SIZE;
use crate::gas::GasSchedule;

/// Settings of a tracing session.
///
/// Every field is optional in the serialized form, missing ones falling back
/// to their Ethereum mainnet value:
///
/// ```json
/// { "gas_schedule": { "create": 32000 }, "max_call_depth": 1024 }
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TracerConfig {
    pub gas_schedule: GasSchedule,
    pub max_call_depth: usize,
}

impl Default for TracerConfig {
    fn default() -> Self {
        Self {
            gas_schedule: GasSchedule::MAINNET,
            max_call_depth: MAX_CALLSTACK_SIZE,
        }
    }
}

impl TracerConfig {
    pub fn from_json_str(json: &str) -> anyhow::Result<Self> {
        serde_json::from_str(json).context("invalid tracer configuration")
    }

    pub fn from_path(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)
            .with_context(|| format!("Unable to open tracer configuration {}", path.display()))?;
        let config = serde_json::from_reader(std::io::BufReader::new(file))
            .with_context(|| format!("Unable to parse tracer configuration {}", path.display()))?;
        log::info!("Loaded tracer configuration from {}", path.display());
        Ok(config)
    }
}
