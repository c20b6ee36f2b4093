use crate::{ConfigError, ConfigErrorResult, DEFAULT_IP, DEFAULT_PORT, MIN_PORT};

use std::net::IpAddr;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Address passed to `--bind-address`
    pub ip: IpAddr,
    pub port: u16,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            ip: DEFAULT_IP,
            port: DEFAULT_PORT,
        }
    }
}

impl NetworkConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        if self.port < MIN_PORT {
            return Err(ConfigError::network(format!(
                "network.port must be >= {}, got {}",
                MIN_PORT, self.port
            )));
        }

        Ok(())
    }
}
