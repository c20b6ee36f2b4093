mod administrator_config;
mod bootstrap_config;
mod config;
mod error;
mod log_level;
mod logging_config;
mod network_config;
mod paths_config;
mod supervisor_config;

#[cfg(test)]
mod tests;

pub use administrator_config::AdministratorConfig;
pub use bootstrap_config::BootstrapConfig;
pub use config::Config;
pub use error::{ConfigError, ConfigErrorResult};
pub use log_level::LogLevel;
pub use logging_config::LoggingConfig;
pub use network_config::NetworkConfig;
pub use paths_config::PathsConfig;
pub use supervisor_config::SupervisorConfig;

use std::net::{IpAddr, Ipv4Addr};

const CONFIG_DIR_ENV: &str = "DBS_CONFIG_DIR";
const DEFAULT_CONFIG_DIR: &str = ".dbs";
const CONFIG_FILENAME: &str = "config.toml";

const DEFAULT_EXECUTABLE_PATH: &str = "/usr/sbin/mysqld";
const DEFAULT_PACKAGE_BASE_PATH: &str = "/usr";
const DEFAULT_CHARSETS_PATH: &str = "/usr/share/mysql/charsets";
const DEFAULT_PLUGINS_PATH: &str = "/usr/lib/mysql/plugin";
const DEFAULT_DATABASES_PATH: &str = "/var/lib/mysql";
const DEFAULT_TEMPORARY_PATH: &str = "/tmp";
const DEFAULT_SOCKET_PATH: &str = "/run/mysqld/mysqld.sock";
const DEFAULT_PID_PATH: &str = "/run/mysqld/mysqld.pid";

const DEFAULT_IP: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);
const DEFAULT_PORT: u16 = 3306;
const MIN_PORT: u16 = 1;

const DEFAULT_LOG_LEVEL: tracing::level_filters::LevelFilter =
    tracing::level_filters::LevelFilter::INFO;
const DEFAULT_LOG_DIRECTORY: &str = "log";
const DEFAULT_LOG_COLORED: bool = true;

const DEFAULT_COMMAND_QUEUE_CAPACITY: usize = 16;
const MIN_COMMAND_QUEUE_CAPACITY: usize = 1;
const MAX_COMMAND_QUEUE_CAPACITY: usize = 1024;
