use std::fmt;

use serde::Deserialize;

/// Credential applied to the `root` account during bootstrap.
#[derive(Clone, Deserialize, Default)]
#[serde(default)]
pub struct AdministratorConfig {
    pub password: String,
}

// Keeps the password out of logs.
impl fmt::Debug for AdministratorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdministratorConfig")
            .field("password", &"<redacted>")
            .finish()
    }
}
