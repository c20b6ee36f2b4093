//! Public handle and the command executor behind it.

use crate::lifecycle::Lifecycle;
use crate::{
    ServerCommand, ServerError, ServerResult, ServerState, ServerStatus, TraceSink, TracingSink,
};

use std::sync::Arc;

use dbs_config::Config;
use tokio::sync::{mpsc, oneshot};

/// Cloneable handle to one supervised database server.
///
/// Every call is queued to a single executor task and resolves once that
/// task has finished the command, so operations on one instance never
/// overlap and run in submission order. Dropping a call's future does not
/// cancel the queued work.
#[derive(Clone)]
pub struct Server {
    command_tx: mpsc::Sender<ServerCommand>,
}

impl Server {
    /// Spawn the executor for `config`. Must be called inside a tokio runtime.
    pub fn create(config: Arc<Config>, sink: Arc<dyn TraceSink>) -> ServerResult<Self> {
        let capacity = config.supervisor.command_queue_capacity.max(1);
        let lifecycle = Lifecycle::new(config, Arc::clone(&sink))?;
        let (command_tx, command_rx) = mpsc::channel(capacity);

        tokio::spawn(run_executor(lifecycle, command_rx, sink));

        Ok(Self { command_tx })
    }

    /// Like [`Server::create`], tracing through `tracing`.
    pub fn with_tracing(config: Arc<Config>) -> ServerResult<Self> {
        Self::create(config, Arc::new(TracingSink))
    }

    pub async fn bootstrap(&self) -> ServerResult<()> {
        self.submit(|reply| ServerCommand::Bootstrap { reply }).await?
    }

    pub async fn start(&self) -> ServerResult<()> {
        self.start_with_bootstrap(false).await
    }

    /// Start, bootstrapping first within the same command when `bootstrap`
    /// is set. A failed bootstrap skips the start.
    pub async fn start_with_bootstrap(&self, bootstrap: bool) -> ServerResult<()> {
        self.submit(|reply| ServerCommand::Start { bootstrap, reply }).await?
    }

    pub async fn terminate(&self) -> ServerResult<()> {
        self.submit(|reply| ServerCommand::Terminate { reply }).await?
    }

    pub async fn status(&self) -> ServerResult<ServerStatus> {
        self.submit(|reply| ServerCommand::Status { reply }).await
    }

    pub async fn state(&self) -> ServerResult<ServerState> {
        Ok(self.status().await?.state)
    }

    /// Stop accepting commands and wait for the executor to run the ones
    /// already queued. A server still running at that point is terminated.
    pub async fn close(&self) -> ServerResult<ServerStatus> {
        self.submit(|reply| ServerCommand::Close { reply }).await
    }

    async fn submit<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> ServerCommand,
    ) -> ServerResult<T> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(command(reply_tx))
            .await
            .map_err(|_| ServerError::executor_closed())?;

        reply_rx.await.map_err(|_| ServerError::executor_closed())
    }
}

async fn run_executor(
    mut lifecycle: Lifecycle,
    mut command_rx: mpsc::Receiver<ServerCommand>,
    sink: Arc<dyn TraceSink>,
) {
    let mut close_replies = Vec::new();

    while let Some(command) = command_rx.recv().await {
        let name = command.name();
        sink.debug(format_args!("executing {name} command"));

        match command {
            ServerCommand::Bootstrap { reply } => {
                let result = lifecycle.bootstrap().await;
                report(&*sink, name, &result);
                let _ = reply.send(result);
            }
            ServerCommand::Start { bootstrap, reply } => {
                let result = lifecycle.start_with_bootstrap(bootstrap).await;
                report(&*sink, name, &result);
                let _ = reply.send(result);
            }
            ServerCommand::Terminate { reply } => {
                let result = lifecycle.terminate().await;
                report(&*sink, name, &result);
                let _ = reply.send(result);
            }
            ServerCommand::Status { reply } => {
                let status = lifecycle.status();
                sink.debug(format_args!("completed {name} command"));
                let _ = reply.send(status);
            }
            ServerCommand::Close { reply } => {
                // Queued commands still run; new ones are refused.
                command_rx.close();
                close_replies.push(reply);
                sink.debug(format_args!("completed {name} command"));
            }
        }
    }

    // Every handle is gone or the queue was closed; the child must not
    // outlive its supervisor.
    if lifecycle.state() == ServerState::Running {
        if let Err(e) = lifecycle.terminate().await {
            sink.warning(format_args!("terminate on executor stop failed: {e}"));
        }
    }

    let status = lifecycle.status();
    for reply in close_replies {
        let _ = reply.send(status);
    }

    sink.debug(format_args!("command executor stopped"));
}

/// Trace the outcome of a command, before its caller is answered.
fn report(sink: &dyn TraceSink, name: &str, result: &ServerResult<()>) {
    if let Err(e) = result {
        sink.warning(format_args!("{name} command failed: {e}"));
    }
    sink.debug(format_args!("completed {name} command"));
}
