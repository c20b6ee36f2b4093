use crate::{
    ConfigError, ConfigErrorResult, DEFAULT_CHARSETS_PATH, DEFAULT_DATABASES_PATH,
    DEFAULT_EXECUTABLE_PATH, DEFAULT_PACKAGE_BASE_PATH, DEFAULT_PID_PATH, DEFAULT_PLUGINS_PATH,
    DEFAULT_SOCKET_PATH, DEFAULT_TEMPORARY_PATH,
};

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Filesystem layout of the database package and its runtime files.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub executable: PathBuf,
    pub package_base: PathBuf,
    pub charsets: PathBuf,
    pub plugins: PathBuf,
    /// Data directory; also holds the bootstrap marker
    pub databases: PathBuf,
    /// Scratch directory; the child runs with this as its working directory
    pub temporary: PathBuf,
    pub socket: PathBuf,
    pub pid: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            executable: PathBuf::from(DEFAULT_EXECUTABLE_PATH),
            package_base: PathBuf::from(DEFAULT_PACKAGE_BASE_PATH),
            charsets: PathBuf::from(DEFAULT_CHARSETS_PATH),
            plugins: PathBuf::from(DEFAULT_PLUGINS_PATH),
            databases: PathBuf::from(DEFAULT_DATABASES_PATH),
            temporary: PathBuf::from(DEFAULT_TEMPORARY_PATH),
            socket: PathBuf::from(DEFAULT_SOCKET_PATH),
            pid: PathBuf::from(DEFAULT_PID_PATH),
        }
    }
}

impl PathsConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        for (name, path) in self.entries() {
            if !path.is_absolute() {
                return Err(ConfigError::paths(format!(
                    "paths.{name} must be absolute, got '{}'",
                    path.display()
                )));
            }
        }

        Ok(())
    }

    fn entries(&self) -> [(&'static str, &Path); 8] {
        [
            ("executable", &self.executable),
            ("package_base", &self.package_base),
            ("charsets", &self.charsets),
            ("plugins", &self.plugins),
            ("databases", &self.databases),
            ("temporary", &self.temporary),
            ("socket", &self.socket),
            ("pid", &self.pid),
        ]
    }
}
