use crate::{
    ConfigError, ConfigErrorResult, DEFAULT_COMMAND_QUEUE_CAPACITY, MAX_COMMAND_QUEUE_CAPACITY,
    MIN_COMMAND_QUEUE_CAPACITY,
};

use std::time::Duration;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SupervisorConfig {
    /// Pending lifecycle commands accepted before callers wait
    pub command_queue_capacity: usize,
    /// How long terminate waits after SIGTERM before sending SIGKILL,
    /// e.g. "30s". None waits for exit indefinitely.
    pub terminate_grace_period: Option<String>,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            command_queue_capacity: DEFAULT_COMMAND_QUEUE_CAPACITY,
            terminate_grace_period: None,
        }
    }
}

impl SupervisorConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        if self.command_queue_capacity < MIN_COMMAND_QUEUE_CAPACITY
            || self.command_queue_capacity > MAX_COMMAND_QUEUE_CAPACITY
        {
            return Err(ConfigError::supervisor(format!(
                "supervisor.command_queue_capacity must be {}-{}, got {}",
                MIN_COMMAND_QUEUE_CAPACITY, MAX_COMMAND_QUEUE_CAPACITY, self.command_queue_capacity
            )));
        }

        self.grace_period()?;

        Ok(())
    }

    /// Parsed `terminate_grace_period`.
    pub fn grace_period(&self) -> ConfigErrorResult<Option<Duration>> {
        match self.terminate_grace_period.as_deref() {
            None => Ok(None),
            Some(raw) => humantime::parse_duration(raw).map(Some).map_err(|e| {
                ConfigError::supervisor(format!(
                    "supervisor.terminate_grace_period '{raw}' is not a duration: {e}"
                ))
            }),
        }
    }
}
