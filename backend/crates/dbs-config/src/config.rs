use crate::{
    AdministratorConfig, BootstrapConfig, CONFIG_DIR_ENV, CONFIG_FILENAME, ConfigError,
    ConfigErrorResult, DEFAULT_CONFIG_DIR, LoggingConfig, NetworkConfig, PathsConfig,
    SupervisorConfig,
};

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::info;

/// Everything the supervisor needs to launch one database instance.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub paths: PathsConfig,
    pub network: NetworkConfig,
    pub administrator: AdministratorConfig,
    pub bootstrap: BootstrapConfig,
    pub logging: LoggingConfig,
    pub supervisor: SupervisorConfig,
}

impl Config {
    /// Load config from the default config directory.
    ///
    /// Loading order:
    /// 1. Check for DBS_CONFIG_DIR env var, else use ./.dbs/
    /// 2. Load config.toml if it exists, else use defaults
    /// 3. Apply DBS_* environment variable overrides
    ///
    /// Does NOT validate - call validate() after load().
    pub fn load() -> ConfigErrorResult<Self> {
        let config_dir = Self::config_dir()?;
        Self::load_from(&config_dir)
    }

    /// Load config from an explicit directory.
    pub fn load_from(config_dir: &Path) -> ConfigErrorResult<Self> {
        let config_path = config_dir.join(CONFIG_FILENAME);

        let mut config = if config_path.exists() {
            Self::load_toml(&config_path)?
        } else {
            Config::default()
        };

        config.apply_env_overrides();

        Ok(config)
    }

    /// Load and parse TOML file with detailed error context.
    fn load_toml(path: &Path) -> ConfigErrorResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::Toml {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Get the config directory.
    /// Priority: DBS_CONFIG_DIR env var > ./.dbs/ (relative to cwd)
    pub fn config_dir() -> ConfigErrorResult<PathBuf> {
        if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
            return Ok(PathBuf::from(dir));
        }

        let cwd = std::env::current_dir()
            .map_err(|_| ConfigError::config("Cannot determine current working directory"))?;
        Ok(cwd.join(DEFAULT_CONFIG_DIR))
    }

    /// Validate all configuration.
    /// Call after load() to catch all errors at startup.
    pub fn validate(&self) -> ConfigErrorResult<()> {
        self.paths.validate()?;
        self.network.validate()?;
        self.bootstrap.validate()?;
        self.supervisor.validate()?;

        Ok(())
    }

    /// Log configuration summary (NEVER logs the administrator password).
    pub fn log_summary(&self) {
        info!("Configuration loaded:");
        info!("  executable: {}", self.paths.executable.display());
        info!("  databases: {}", self.paths.databases.display());
        info!("  temporary: {}", self.paths.temporary.display());
        info!("  network: {}:{}", self.network.ip, self.network.port);
        info!(
            "  administrator: password {}",
            if self.administrator.password.is_empty() {
                "empty"
            } else {
                "set"
            }
        );
        info!("  bootstrap: {} script(s)", self.bootstrap.scripts.len());
        info!(
            "  logging: {} (colored: {})",
            self.logging.level, self.logging.colored
        );
        info!(
            "  supervisor: queue={}, grace={}",
            self.supervisor.command_queue_capacity,
            self.supervisor
                .terminate_grace_period
                .as_deref()
                .unwrap_or("none")
        );
    }

    fn apply_env_overrides(&mut self) {
        // Paths
        Self::apply_env_path("DBS_EXECUTABLE_PATH", &mut self.paths.executable);
        Self::apply_env_path("DBS_PACKAGE_BASE_PATH", &mut self.paths.package_base);
        Self::apply_env_path("DBS_CHARSETS_PATH", &mut self.paths.charsets);
        Self::apply_env_path("DBS_PLUGINS_PATH", &mut self.paths.plugins);
        Self::apply_env_path("DBS_DATABASES_PATH", &mut self.paths.databases);
        Self::apply_env_path("DBS_TEMPORARY_PATH", &mut self.paths.temporary);
        Self::apply_env_path("DBS_SOCKET_PATH", &mut self.paths.socket);
        Self::apply_env_path("DBS_PID_PATH", &mut self.paths.pid);

        // Network
        Self::apply_env_parse("DBS_NETWORK_IP", &mut self.network.ip);
        Self::apply_env_parse("DBS_NETWORK_PORT", &mut self.network.port);

        // Administrator
        Self::apply_env_string("DBS_ADMIN_PASSWORD", &mut self.administrator.password);

        // Logging
        Self::apply_env_parse("DBS_LOG_LEVEL", &mut self.logging.level);
        Self::apply_env_bool("DBS_LOG_COLORED", &mut self.logging.colored);
        Self::apply_env_option_string("DBS_LOG_FILE", &mut self.logging.file);

        // Supervisor
        Self::apply_env_parse(
            "DBS_COMMAND_QUEUE_CAPACITY",
            &mut self.supervisor.command_queue_capacity,
        );
        Self::apply_env_option_string(
            "DBS_TERMINATE_GRACE_PERIOD",
            &mut self.supervisor.terminate_grace_period,
        );
    }

    /// Helper: Apply environment variable override for String values
    fn apply_env_string(var_name: &str, target: &mut String) {
        if let Ok(val) = std::env::var(var_name) {
            *target = val;
        }
    }

    /// Helper: Apply environment variable override for PathBuf values
    fn apply_env_path(var_name: &str, target: &mut PathBuf) {
        if let Some(val) = std::env::var_os(var_name) {
            *target = PathBuf::from(val);
        }
    }

    /// Helper: Apply environment variable override for bool values (accepts "true"/"1")
    fn apply_env_bool(var_name: &str, target: &mut bool) {
        if let Ok(val) = std::env::var(var_name) {
            *target = val == "true" || val == "1";
        }
    }

    /// Helper: Apply environment variable override for parseable values
    fn apply_env_parse<T: std::str::FromStr>(var_name: &str, target: &mut T) {
        if let Ok(val) = std::env::var(var_name)
            && let Ok(parsed) = val.parse()
        {
            *target = parsed;
        }
    }

    /// Helper: Apply environment variable override for Option<String> values
    fn apply_env_option_string(var_name: &str, target: &mut Option<String>) {
        if let Ok(val) = std::env::var(var_name) {
            *target = Some(val);
        }
    }
}
