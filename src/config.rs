use std::fmt;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::FeederError;
use crate::whitelist::parse_whitelist;

/// Engine backend selected by the `feeder-target` configuration key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    #[default]
    Docker,
    Crio,
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Docker => write!(f, "docker"),
            Target::Crio => write!(f, "crio"),
        }
    }
}

/// Runtime configuration, read from a small JSON file:
///
/// ```json
/// {
///   "feeder-target": "crio",
///   "whitelist": ["opensuse/salt-api", "sles12/portus"]
/// }
/// ```
///
/// Both keys are optional. A missing target selects docker, a missing or
/// empty whitelist admits every image.
#[derive(Debug, Default, Deserialize)]
pub struct FeederConfig {
    #[serde(rename = "feeder-target", default)]
    pub target: Option<Target>,
    #[serde(default)]
    pub whitelist: Vec<String>,
}

impl FeederConfig {
    /// Where the configuration lives unless told otherwise.
    pub const DEFAULT_PATH: &'static str = "/etc/container-feeder.json";

    /// Loads the configuration from `path` and normalizes the whitelist
    /// entries it carries.
    pub fn load(path: &Path) -> Result<Self, FeederError> {
        let failed = |reason: String| FeederError::Config {
            path: path.to_path_buf(),
            reason,
        };

        let contents = fs::read_to_string(path).map_err(|error| failed(error.to_string()))?;
        let mut config: FeederConfig =
            serde_json::from_str(&contents).map_err(|error| failed(error.to_string()))?;
        config.whitelist = parse_whitelist(&config.whitelist)?;
        Ok(config)
    }
}
