//! Narrow logging seam between the supervisor and whatever records its output.

use std::fmt;

use tracing::{debug, info, warn};

/// Log target for lifecycle events.
pub const SUPERVISOR_TARGET: &str = "dbs_supervisor::server";
/// Log target for lines captured from the child's console.
pub const CONSOLE_TARGET: &str = "dbs_supervisor::console";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceLevel {
    Debug,
    Information,
    Warning,
}

/// Who produced a trace line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceOrigin {
    Supervisor,
    /// A line read from the database process's console
    Child,
}

/// Receives lifecycle events and captured console lines.
///
/// Implementations must return quickly; they are called from the executor
/// and from the console relay.
pub trait TraceSink: Send + Sync {
    fn emit(&self, level: TraceLevel, origin: TraceOrigin, message: fmt::Arguments<'_>);

    fn debug(&self, message: fmt::Arguments<'_>) {
        self.emit(TraceLevel::Debug, TraceOrigin::Supervisor, message);
    }

    fn information(&self, message: fmt::Arguments<'_>) {
        self.emit(TraceLevel::Information, TraceOrigin::Supervisor, message);
    }

    fn warning(&self, message: fmt::Arguments<'_>) {
        self.emit(TraceLevel::Warning, TraceOrigin::Supervisor, message);
    }
}

/// Forwards everything to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl TraceSink for TracingSink {
    fn emit(&self, level: TraceLevel, origin: TraceOrigin, message: fmt::Arguments<'_>) {
        match (origin, level) {
            (TraceOrigin::Supervisor, TraceLevel::Debug) => {
                debug!(target: SUPERVISOR_TARGET, "{message}")
            }
            (TraceOrigin::Supervisor, TraceLevel::Information) => {
                info!(target: SUPERVISOR_TARGET, "{message}")
            }
            (TraceOrigin::Supervisor, TraceLevel::Warning) => {
                warn!(target: SUPERVISOR_TARGET, "{message}")
            }
            (TraceOrigin::Child, TraceLevel::Debug) => debug!(target: CONSOLE_TARGET, "{message}"),
            (TraceOrigin::Child, TraceLevel::Information) => {
                info!(target: CONSOLE_TARGET, "{message}")
            }
            (TraceOrigin::Child, TraceLevel::Warning) => warn!(target: CONSOLE_TARGET, "{message}"),
        }
    }
}
