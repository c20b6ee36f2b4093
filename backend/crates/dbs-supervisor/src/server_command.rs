use crate::{ServerResult, ServerStatus};

use tokio::sync::oneshot;

/// Commands from [`crate::Server`] handles to the executor.
///
/// Every variant carries its own reply channel; the executor answers each
/// command exactly once.
#[derive(Debug)]
pub enum ServerCommand {
    /// Initialize a fresh data directory
    Bootstrap {
        reply: oneshot::Sender<ServerResult<()>>,
    },
    /// Launch the server, optionally bootstrapping first in the same command
    Start {
        bootstrap: bool,
        reply: oneshot::Sender<ServerResult<()>>,
    },
    /// Gracefully stop the running server
    Terminate {
        reply: oneshot::Sender<ServerResult<()>>,
    },
    /// Report the current lifecycle snapshot
    Status {
        reply: oneshot::Sender<ServerStatus>,
    },
    /// Stop accepting commands, drain the queue, then stop the executor
    Close {
        reply: oneshot::Sender<ServerStatus>,
    },
}

impl ServerCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Bootstrap { .. } => "bootstrap",
            Self::Start {
                bootstrap: false, ..
            } => "start",
            Self::Start {
                bootstrap: true, ..
            } => "bootstrap-and-start",
            Self::Terminate { .. } => "terminate",
            Self::Status { .. } => "status",
            Self::Close { .. } => "close",
        }
    }
}
