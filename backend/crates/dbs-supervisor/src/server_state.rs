use std::fmt;

/// Lifecycle state of the supervised process.
///
/// Only moves forward: `Created -> Running -> Terminated`. A failed
/// operation leaves the state where it was.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    /// No process started yet; bootstrap and start are allowed
    Created,
    /// Process started and owned by the executor
    Running,
    /// Process stopped; terminal
    Terminated,
}

impl ServerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Running => "running",
            Self::Terminated => "terminated",
        }
    }
}

impl fmt::Display for ServerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
