//! Relays the child's console output to the trace sink.

use crate::{ServerError, ServerResult, TraceLevel, TraceOrigin, TraceSink};

use std::panic::Location;
use std::sync::Arc;

use error_location::ErrorLocation;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::task::JoinHandle;

/// Prefix put in front of every relayed console line.
pub const CHILD_OUTPUT_PREFIX: &str = ">>  ";

/// Background reader forwarding newline-delimited lines to a [`TraceSink`].
///
/// The reader ends when the write side of the pipe is closed. A final line
/// without a trailing newline is still forwarded.
pub struct ConsoleRelay {
    handle: JoinHandle<std::io::Result<usize>>,
}

impl ConsoleRelay {
    pub fn spawn<R>(reader: R, sink: Arc<dyn TraceSink>) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let handle = tokio::spawn(relay_lines(reader, sink));
        Self { handle }
    }

    /// Wait for the pipe to close; returns the number of lines relayed.
    pub async fn finish(self) -> ServerResult<usize> {
        let location = ErrorLocation::from(Location::caller());

        match self.handle.await {
            Ok(Ok(lines)) => Ok(lines),
            Ok(Err(source)) => Err(ServerError::ConsoleRelayFailure { source, location }),
            Err(join_error) => Err(ServerError::ConsoleRelayFailure {
                source: std::io::Error::other(join_error),
                location,
            }),
        }
    }
}

async fn relay_lines<R>(reader: R, sink: Arc<dyn TraceSink>) -> std::io::Result<usize>
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut line = Vec::with_capacity(256);
    let mut relayed = 0;

    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line).await? == 0 {
            break;
        }
        if line.last() == Some(&b'\n') {
            line.pop();
        }

        sink.emit(
            TraceLevel::Information,
            TraceOrigin::Child,
            format_args!("{CHILD_OUTPUT_PREFIX}{}", String::from_utf8_lossy(&line)),
        );
        relayed += 1;
    }

    Ok(relayed)
}
