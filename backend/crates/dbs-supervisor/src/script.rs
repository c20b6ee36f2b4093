//! SQL fed to the bootstrap process on its standard input.

use crate::{ServerError, ServerResult};

use std::panic::Location;

use dbs_config::Config;
use error_location::ErrorLocation;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::task::JoinHandle;

const CREATE_DATABASE_STATEMENT: &[u8] = b"CREATE DATABASE mysql;\n";
const USE_DATABASE_STATEMENT: &[u8] = b"USE mysql;";

/// Statement setting the `root` password, with `\` and `'` escaped.
pub fn password_statement(password: &str) -> Vec<u8> {
    let escaped = password.replace('\\', "\\\\").replace('\'', "\\'");
    format!("UPDATE mysql.user SET password = PASSWORD ('{escaped}') WHERE user = 'root';")
        .into_bytes()
}

/// Ordered fragments of the bootstrap input, all read before anything is
/// written so a missing script never produces a truncated stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapScript {
    fragments: Vec<Vec<u8>>,
}

impl BootstrapScript {
    /// Read every configured script, in order.
    pub async fn prepare(config: &Config) -> ServerResult<Self> {
        let scripts = &config.bootstrap.scripts;
        let mut fragments = Vec::with_capacity(scripts.len() + 3);

        fragments.push(CREATE_DATABASE_STATEMENT.to_vec());
        fragments.push(USE_DATABASE_STATEMENT.to_vec());

        for path in scripts {
            let content =
                tokio::fs::read(path)
                    .await
                    .map_err(|source| ServerError::ScriptReadFailure {
                        path: path.clone(),
                        source,
                        location: ErrorLocation::from(Location::caller()),
                    })?;
            fragments.push(content);
        }

        fragments.push(password_statement(&config.administrator.password));

        Ok(Self { fragments })
    }

    pub fn fragments(&self) -> impl Iterator<Item = &[u8]> {
        self.fragments.iter().map(Vec::as_slice)
    }

    /// Total number of bytes that will be streamed.
    pub fn len(&self) -> usize {
        self.fragments.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Write all fragments to `writer` in a background task, then close it.
    pub fn stream<W>(self, writer: W) -> ScriptStreamer
    where
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let handle = tokio::spawn(write_fragments(self.fragments, writer));
        ScriptStreamer { handle }
    }
}

/// Background writer feeding the bootstrap process.
pub struct ScriptStreamer {
    handle: JoinHandle<std::io::Result<u64>>,
}

impl ScriptStreamer {
    /// Wait until the input is fully written and closed; returns bytes written.
    pub async fn finish(self) -> ServerResult<u64> {
        let location = ErrorLocation::from(Location::caller());

        match self.handle.await {
            Ok(Ok(written)) => Ok(written),
            Ok(Err(source)) => Err(ServerError::ScriptStreamFailure { source, location }),
            Err(join_error) => Err(ServerError::ScriptStreamFailure {
                source: std::io::Error::other(join_error),
                location,
            }),
        }
    }
}

async fn write_fragments<W>(fragments: Vec<Vec<u8>>, mut writer: W) -> std::io::Result<u64>
where
    W: AsyncWrite + Unpin,
{
    let mut written = 0u64;

    for fragment in &fragments {
        writer.write_all(fragment).await?;
        written += fragment.len() as u64;
    }

    writer.flush().await?;
    writer.shutdown().await?;
    drop(writer);

    Ok(written)
}
