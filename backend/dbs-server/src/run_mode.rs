use crate::cli::Cli;

use std::path::Path;

use dbs_supervisor::BootstrapMarker;

/// What the process does with its database server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Bootstrap only, then exit
    BootstrapOnly,
    /// Start and serve until signalled
    Serve { bootstrap: bool },
}

impl RunMode {
    /// `--bootstrap` is skipped when the data directory already carries a
    /// marker; `--bootstrap-only` always attempts and reports the conflict.
    pub fn resolve(cli: &Cli, data_dir: &Path) -> Self {
        if cli.bootstrap_only {
            Self::BootstrapOnly
        } else {
            Self::Serve {
                bootstrap: cli.bootstrap && !BootstrapMarker::exists(data_dir),
            }
        }
    }
}
