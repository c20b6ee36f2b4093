//! Lifecycle state machine for one database process.
//!
//! Owned exclusively by the executor task in [`crate::server`]; nothing
//! else ever reads or mutates the state or the child handle.

use crate::{
    BootstrapMarker, BootstrapScript, ConsoleRelay, LaunchPlan, ServerError, ServerResult,
    ServerState, ServerStatus, TraceSink,
};

use std::panic::Location;
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use std::time::Duration;

use dbs_config::Config;
use error_location::ErrorLocation;
use nix::sys::signal::{Signal, kill};
use nix::unistd::Pid;
use tokio::process::Child;

struct RunningProcess {
    child: Child,
    pid: u32,
    console: Option<ConsoleRelay>,
}

pub(crate) struct Lifecycle {
    config: Arc<Config>,
    sink: Arc<dyn TraceSink>,
    grace_period: Option<Duration>,
    state: ServerState,
    process: Option<RunningProcess>,
}

impl Lifecycle {
    pub(crate) fn new(config: Arc<Config>, sink: Arc<dyn TraceSink>) -> ServerResult<Self> {
        let grace_period = config.supervisor.grace_period()?;

        Ok(Self {
            config,
            sink,
            grace_period,
            state: ServerState::Created,
            process: None,
        })
    }

    pub(crate) fn state(&self) -> ServerState {
        self.state
    }

    pub(crate) fn status(&self) -> ServerStatus {
        ServerStatus {
            state: self.state,
            pid: self.process.as_ref().map(|process| process.pid),
        }
    }

    #[track_caller]
    fn require(&self, expected: ServerState, operation: &'static str) -> ServerResult<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(ServerError::illegal_state(operation, self.state))
        }
    }

    /// One-time initialization of the data directory. Leaves the state at
    /// `Created` whether it succeeds or not.
    pub(crate) async fn bootstrap(&mut self) -> ServerResult<()> {
        self.require(ServerState::Created, "bootstrap")?;

        self.sink.information(format_args!("bootstrapping..."));

        let marker = BootstrapMarker::acquire(&self.config.paths.databases)?;

        match run_bootstrap(&self.config, &self.sink).await {
            Ok(()) => {
                marker.complete()?;
                self.sink.information(format_args!("bootstrapped."));
                Ok(())
            }
            Err(e) => Err(marker.fail(e)),
        }
    }

    /// Launch the long-running server and move to `Running`.
    pub(crate) async fn start(&mut self) -> ServerResult<()> {
        self.require(ServerState::Created, "start")?;

        self.sink.information(format_args!("starting..."));

        let plan = LaunchPlan::normal(&self.config);
        self.sink.debug(format_args!("process arguments: `{:?}`", plan.display_arguments()));

        let mut child = plan.spawn(Stdio::null())?;

        let Some(pid) = child.id() else {
            abandon(&mut child).await;
            return Err(ServerError::io_other("server process exited before it was tracked"));
        };

        let console = child
            .stderr
            .take()
            .map(|stderr| ConsoleRelay::spawn(stderr, Arc::clone(&self.sink)));

        self.process = Some(RunningProcess {
            child,
            pid,
            console,
        });
        self.state = ServerState::Running;

        self.sink.information(format_args!("started."));

        Ok(())
    }

    /// Bootstrap (when asked) and start as one uninterrupted operation.
    pub(crate) async fn start_with_bootstrap(&mut self, bootstrap: bool) -> ServerResult<()> {
        if bootstrap {
            self.bootstrap().await?;
        }
        self.start().await
    }

    /// SIGTERM the running server and wait for it to exit.
    pub(crate) async fn terminate(&mut self) -> ServerResult<()> {
        self.require(ServerState::Running, "terminate")?;

        let grace_period = self.grace_period;
        let Some(process) = self.process.as_mut() else {
            return Err(ServerError::io_other("running server has no process handle"));
        };

        self.sink.information(format_args!("stopping..."));

        send_signal(process.pid, Signal::SIGTERM)?;

        let status = match grace_period {
            None => wait_for_exit(process).await?,
            Some(grace_period) => {
                match tokio::time::timeout(grace_period, process.child.wait()).await {
                    Ok(waited) => waited.map_err(|source| ServerError::WaitFailure {
                        pid: process.pid,
                        source,
                        location: ErrorLocation::from(Location::caller()),
                    })?,
                    Err(_) => {
                        self.sink.warning(format_args!(
                            "process {} still running after {}ms, killing",
                            process.pid,
                            grace_period.as_millis()
                        ));
                        send_signal(process.pid, Signal::SIGKILL)?;
                        wait_for_exit(process).await?
                    }
                }
            }
        };

        self.sink.debug(format_args!("process exited with {status}"));

        if let Some(process) = self.process.take()
            && let Some(console) = process.console
            && let Err(e) = console.finish().await
        {
            self.sink.warning(format_args!("console relay ended with an error: {e}"));
        }

        self.state = ServerState::Terminated;
        self.sink.information(format_args!("stopped."));

        Ok(())
    }
}

async fn run_bootstrap(config: &Config, sink: &Arc<dyn TraceSink>) -> ServerResult<()> {
    // Every script is read before a pipe or child exists.
    let script = BootstrapScript::prepare(config).await?;

    let plan = LaunchPlan::bootstrap(config);
    sink.debug(format_args!("process arguments: `{:?}`", plan.display_arguments()));

    let mut child = plan.spawn(Stdio::piped())?;
    let pid = child.id().unwrap_or_default();

    let (Some(stdin), Some(stderr)) = (child.stdin.take(), child.stderr.take()) else {
        abandon(&mut child).await;
        return Err(ServerError::io_other("bootstrap process pipes are unavailable"));
    };

    let streamer = script.stream(stdin);
    let console = ConsoleRelay::spawn(stderr, Arc::clone(sink));

    let waited = child.wait().await;
    let streamed = streamer.finish().await;
    let relayed = console.finish().await;

    let status = waited.map_err(|source| ServerError::WaitFailure {
        pid,
        source,
        location: ErrorLocation::from(Location::caller()),
    })?;
    ensure_success(status)?;
    streamed?;
    relayed?;

    Ok(())
}

#[track_caller]
fn ensure_success(status: ExitStatus) -> ServerResult<()> {
    if status.success() {
        Ok(())
    } else {
        Err(ServerError::ChildExitFailure {
            status,
            location: ErrorLocation::from(Location::caller()),
        })
    }
}

#[track_caller]
fn send_signal(pid: u32, signal: Signal) -> ServerResult<()> {
    let location = ErrorLocation::from(Location::caller());

    kill(Pid::from_raw(pid as i32), signal).map_err(|source| ServerError::SignalFailure {
        pid,
        source,
        location,
    })
}

async fn wait_for_exit(process: &mut RunningProcess) -> ServerResult<ExitStatus> {
    let pid = process.pid;
    process
        .child
        .wait()
        .await
        .map_err(|source| ServerError::WaitFailure {
            pid,
            source,
            location: ErrorLocation::from(Location::caller()),
        })
}

/// Kill and reap a child that cannot be supervised.
async fn abandon(child: &mut Child) {
    let _ = child.start_kill();
    let _ = child.wait().await;
}
