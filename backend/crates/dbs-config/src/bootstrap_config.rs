use crate::{ConfigError, ConfigErrorResult};

use std::path::PathBuf;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct BootstrapConfig {
    /// SQL files streamed to the bootstrap process, in this order
    pub scripts: Vec<PathBuf>,
}

impl BootstrapConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        if let Some(index) = self
            .scripts
            .iter()
            .position(|script| script.as_os_str().is_empty())
        {
            return Err(ConfigError::bootstrap(format!(
                "bootstrap.scripts[{index}] must not be empty"
            )));
        }

        Ok(())
    }
}
