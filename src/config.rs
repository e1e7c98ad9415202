use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{IoResultExt, Result};

/// on-disk format version written by this build
pub const FORMAT_VERSION: u32 = 1;

/// store configuration persisted as config.toml
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// object/ref layout version; stores written by an incompatible
    /// version are refused at open time
    pub format: u32,
}

impl Config {
    /// load config from file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).with_path(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// save config to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).with_path(path)?;
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            format: FORMAT_VERSION,
        }
    }
}
