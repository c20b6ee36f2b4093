//! Supervises one database server process: one-time bootstrap of its data
//! directory, start, graceful termination and console capture.
//!
//! All lifecycle operations go through [`Server`], which forwards them as
//! [`ServerCommand`]s to a single executor task. The executor is the only
//! code that touches the lifecycle state or the child process handle.

mod console;
mod error;
mod launch;
mod lifecycle;
mod marker;
mod script;
mod server;
mod server_command;
mod server_state;
mod server_status;
mod trace;

#[cfg(test)]
mod tests;

pub use console::{CHILD_OUTPUT_PREFIX, ConsoleRelay};
pub use error::{Result as ServerResult, ServerError, ServerErrorKind};
pub use launch::{LaunchIntent, LaunchPlan};
pub use marker::{BootstrapMarker, FAILED_CONTENT, MARKER_FILENAME, PENDING_CONTENT};
pub use script::{BootstrapScript, ScriptStreamer, password_statement};
pub use server::Server;
pub use server_command::ServerCommand;
pub use server_state::ServerState;
pub use server_status::ServerStatus;
pub use trace::{TraceLevel, TraceOrigin, TraceSink, TracingSink};
