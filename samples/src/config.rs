//! Settings for the demos, readable from a TOML file.
//!
//! Every field has a default, so an empty file (or no file at all) is a valid
//! configuration. Command line flags take precedence over values from the file.
//!
//! ```toml
//! type_names = ["Dictionary`2<String, List`1<Int32>>"]
//!
//! [sequence]
//! count = 20
//! cancel_at = 3
//! step_delay_ms = 10
//! even_only = false
//! timeout_ms = 1000
//! ```

use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SamplesConfig {
    /// Settings for the `sequence` demo
    pub sequence: SequenceConfig,

    /// Type expressions formatted by the `type-name` demo in addition to those given on the
    /// command line
    pub type_names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SequenceConfig {
    /// Number of elements produced, starting at zero
    pub count: u32,

    /// Request cancellation from within the action once this element was processed
    pub cancel_at: Option<u32>,

    /// Delay before each element is produced
    pub step_delay_ms: u64,

    /// Only process even elements
    pub even_only: bool,

    /// Request cancellation from a timer after this many milliseconds
    pub timeout_ms: Option<u64>,
}

impl Default for SequenceConfig {
    fn default() -> Self {
        Self {
            count: 20,
            cancel_at: None,
            step_delay_ms: 0,
            even_only: false,
            timeout_ms: None,
        }
    }
}

impl SamplesConfig {
    /// Read the configuration from a TOML file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let s = fs::read_to_string(path)
            .with_context(|| format!("could not read config file {path:?}"))?;
        Self::parse_toml(&s).with_context(|| format!("could not parse config file {path:?}"))
    }

    pub fn parse_toml(s: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(s)?)
    }
}
