use crate::ServerState;

use std::panic::Location;
use std::path::PathBuf;
use std::process::ExitStatus;

use dbs_config::ConfigError;
use error_location::ErrorLocation;
use nix::errno::Errno;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Cannot {operation} while server is {state} {location}")]
    IllegalState {
        operation: &'static str,
        state: ServerState,
        location: ErrorLocation,
    },

    #[error("Bootstrap already attempted (marker file: {path}) {location}")]
    AlreadyBootstrapped {
        path: PathBuf,
        location: ErrorLocation,
    },

    #[error("Failed to create bootstrap marker at {path}: {source} {location}")]
    MarkerCreation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
        location: ErrorLocation,
    },

    #[error("Failed to launch {executable}: {source} {location}")]
    LaunchFailure {
        executable: PathBuf,
        #[source]
        source: std::io::Error,
        location: ErrorLocation,
    },

    #[error("Bootstrap process failed ({status}) {location}")]
    ChildExitFailure {
        status: ExitStatus,
        location: ErrorLocation,
    },

    #[error("Failed to read initialization script {path}: {source} {location}")]
    ScriptReadFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
        location: ErrorLocation,
    },

    #[error("Failed to stream bootstrap script: {source} {location}")]
    ScriptStreamFailure {
        #[source]
        source: std::io::Error,
        location: ErrorLocation,
    },

    #[error("Console relay failed: {source} {location}")]
    ConsoleRelayFailure {
        #[source]
        source: std::io::Error,
        location: ErrorLocation,
    },

    #[error("Failed to signal process {pid}: {source} {location}")]
    SignalFailure {
        pid: u32,
        #[source]
        source: Errno,
        location: ErrorLocation,
    },

    #[error("Failed to wait for process {pid}: {source} {location}")]
    WaitFailure {
        pid: u32,
        #[source]
        source: std::io::Error,
        location: ErrorLocation,
    },

    #[error("Failed to release {resource}: {source}{} {location}", primary_suffix(.primary))]
    CleanupFailure {
        resource: &'static str,
        /// Outcome of the operation before cleanup failed; None if it had succeeded
        primary: Option<Box<ServerError>>,
        #[source]
        source: std::io::Error,
        location: ErrorLocation,
    },

    #[error("Command executor is closed {location}")]
    ExecutorClosed { location: ErrorLocation },

    #[error("Configuration error: {source} {location}")]
    Config {
        #[source]
        source: ConfigError,
        location: ErrorLocation,
    },

    #[error("IO error: {source} {location}")]
    Io {
        #[source]
        source: std::io::Error,
        location: ErrorLocation,
    },
}

/// Field-free discriminant of [`ServerError`], for matching in callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerErrorKind {
    IllegalState,
    AlreadyBootstrapped,
    MarkerCreation,
    LaunchFailure,
    ChildExitFailure,
    ScriptReadFailure,
    ScriptStreamFailure,
    ConsoleRelayFailure,
    SignalFailure,
    WaitFailure,
    CleanupFailure,
    ExecutorClosed,
    Config,
    Io,
}

fn primary_suffix(primary: &Option<Box<ServerError>>) -> String {
    match primary {
        Some(primary) => format!(" (after: {primary})"),
        None => String::new(),
    }
}

impl ServerError {
    pub fn kind(&self) -> ServerErrorKind {
        match self {
            Self::IllegalState { .. } => ServerErrorKind::IllegalState,
            Self::AlreadyBootstrapped { .. } => ServerErrorKind::AlreadyBootstrapped,
            Self::MarkerCreation { .. } => ServerErrorKind::MarkerCreation,
            Self::LaunchFailure { .. } => ServerErrorKind::LaunchFailure,
            Self::ChildExitFailure { .. } => ServerErrorKind::ChildExitFailure,
            Self::ScriptReadFailure { .. } => ServerErrorKind::ScriptReadFailure,
            Self::ScriptStreamFailure { .. } => ServerErrorKind::ScriptStreamFailure,
            Self::ConsoleRelayFailure { .. } => ServerErrorKind::ConsoleRelayFailure,
            Self::SignalFailure { .. } => ServerErrorKind::SignalFailure,
            Self::WaitFailure { .. } => ServerErrorKind::WaitFailure,
            Self::CleanupFailure { .. } => ServerErrorKind::CleanupFailure,
            Self::ExecutorClosed { .. } => ServerErrorKind::ExecutorClosed,
            Self::Config { .. } => ServerErrorKind::Config,
            Self::Io { .. } => ServerErrorKind::Io,
        }
    }

    /// The error that ended the operation itself, looking through a
    /// cleanup failure that was attached afterwards.
    pub fn primary(&self) -> Option<&ServerError> {
        match self {
            Self::CleanupFailure { primary, .. } => primary.as_deref(),
            other => Some(other),
        }
    }

    #[track_caller]
    pub(crate) fn illegal_state(operation: &'static str, state: ServerState) -> Self {
        Self::IllegalState {
            operation,
            state,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub(crate) fn executor_closed() -> Self {
        Self::ExecutorClosed {
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub(crate) fn io_other(message: &str) -> Self {
        Self::Io {
            source: std::io::Error::other(message.to_owned()),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<std::io::Error> for ServerError {
    #[track_caller]
    fn from(source: std::io::Error) -> Self {
        Self::Io {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<ConfigError> for ServerError {
    #[track_caller]
    fn from(source: ConfigError) -> Self {
        Self::Config {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

pub type Result<T> = std::result::Result<T, ServerError>;
