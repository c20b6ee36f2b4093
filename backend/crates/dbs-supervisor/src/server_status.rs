use crate::ServerState;

/// Snapshot of the lifecycle, taken by the executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerStatus {
    pub state: ServerState,
    /// Child process id while running
    pub pid: Option<u32>,
}
