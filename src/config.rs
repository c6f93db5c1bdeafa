use std::path::Path;
use std::time::Duration;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::types::DEFAULT_RESYNC_INTERVAL;
use crate::ReactiveError;

/// Engine configuration as written in the host's YAML:
///
/// ```yaml
/// aliases:
///   is_dark: binary_sensor.dark | input_boolean.bedtime
/// outputs:
///   light.hall:
///     - binary_sensor.motion & is_dark
///     - binary_sensor.lightswitch
/// resync_interval_secs: 3600
/// ```
///
/// Map order is kept, so rules are created and resynced in the order written.
/// Unknown keys are ignored; hosts usually mix their own settings in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// output entity -> input expressions, any of which turns it on
    pub outputs: IndexMap<String, Vec<String>>,

    #[serde(default)]
    pub aliases: IndexMap<String, String>,

    #[serde(default = "default_resync_secs")]
    pub resync_interval_secs: u64,
}

fn default_resync_secs() -> u64 {
    DEFAULT_RESYNC_INTERVAL.as_secs()
}

impl Config {
    /// Parse a YAML document.
    ///
    /// # Errors
    ///
    /// Returns [`ReactiveError::Config`] if the document does not match the schema.
    pub fn from_yaml(input: &str) -> Result<Self, ReactiveError> {
        Ok(serde_yaml::from_str(input)?)
    }

    /// Read and parse a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`ReactiveError`] on I/O or schema failure.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ReactiveError> {
        let input = std::fs::read_to_string(path)?;
        Self::from_yaml(&input)
    }

    #[must_use]
    pub fn resync_interval(&self) -> Duration {
        Duration::from_secs(self.resync_interval_secs)
    }
}
