//! Bootstrap marker for at-most-once data directory initialization.

use crate::{ServerError, ServerResult};

use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::panic::Location;
use std::path::{Path, PathBuf};

use error_location::ErrorLocation;
use tracing::warn;

#[cfg(unix)]
use std::os::unix::fs::OpenOptionsExt;

pub const MARKER_FILENAME: &str = ".bootstrap.marker";
const MARKER_FILE_MODE: u32 = 0o400; // Owner read only

/// Written when a bootstrap attempt begins.
pub const PENDING_CONTENT: &[u8] = b"pending...\n";
/// Appended when the supervisor sees the attempt fail.
pub const FAILED_CONTENT: &[u8] = b"failed!\n";

/// Exclusively-created marker in the data directory.
///
/// The file records that bootstrap was attempted:
/// - `pending...\n`: attempt started (and, if nothing follows, the
///   supervisor died before recording an outcome)
/// - `pending...\nfailed!\n`: attempt failed
/// - empty: attempt succeeded
///
/// If the pending note cannot be written, the failure note is tried
/// instead so the file does not read as a success.
///
/// Any existing marker, whatever its content, means "already attempted".
pub struct BootstrapMarker {
    path: PathBuf,
    file: Option<File>,
}

impl BootstrapMarker {
    /// Marker location for a data directory.
    pub fn path_for(data_dir: &Path) -> PathBuf {
        data_dir.join(MARKER_FILENAME)
    }

    /// Whether a bootstrap was ever attempted in this data directory.
    pub fn exists(data_dir: &Path) -> bool {
        Self::path_for(data_dir).exists()
    }

    /// Create the marker and record the attempt as pending.
    ///
    /// Fails with `AlreadyBootstrapped` if any marker is already present.
    #[track_caller]
    pub fn acquire(data_dir: &Path) -> ServerResult<Self> {
        let path = Self::path_for(data_dir);

        let mut options = OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        options.mode(MARKER_FILE_MODE);

        let file = options.open(&path).map_err(|e| {
            if e.kind() == ErrorKind::AlreadyExists {
                ServerError::AlreadyBootstrapped {
                    path: path.clone(),
                    location: ErrorLocation::from(Location::caller()),
                }
            } else {
                ServerError::MarkerCreation {
                    path: path.clone(),
                    source: e,
                    location: ErrorLocation::from(Location::caller()),
                }
            }
        })?;

        let mut marker = Self {
            path,
            file: Some(file),
        };

        if let Err(e) = marker.write_pending() {
            // The file exists, so the attempt still counts as made.
            marker.file.take();
            return Err(ServerError::MarkerCreation {
                path: marker.path.clone(),
                source: e,
                location: ErrorLocation::from(Location::caller()),
            });
        }

        Ok(marker)
    }

    fn write_pending(&mut self) -> std::io::Result<()> {
        if let Some(ref mut file) = self.file {
            begin_attempt(file)?;
            file.sync_all()?;
        }
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Record success: truncate to an empty marker and close it.
    #[track_caller]
    pub fn complete(mut self) -> ServerResult<()> {
        let result = match self.file.take() {
            Some(file) => file.set_len(0).and_then(|()| file.sync_all()),
            None => Ok(()),
        };

        result.map_err(|source| ServerError::CleanupFailure {
            resource: "bootstrap marker",
            primary: None,
            source,
            location: ErrorLocation::from(Location::caller()),
        })
    }

    /// Record failure: append the failure note and close the marker.
    ///
    /// Returns `primary` unchanged, or a `CleanupFailure` carrying it if the
    /// note could not be written.
    #[track_caller]
    pub fn fail(mut self, primary: ServerError) -> ServerError {
        match self.append_failure() {
            Ok(()) => primary,
            Err(source) => ServerError::CleanupFailure {
                resource: "bootstrap marker",
                primary: Some(Box::new(primary)),
                source,
                location: ErrorLocation::from(Location::caller()),
            },
        }
    }

    fn append_failure(&mut self) -> std::io::Result<()> {
        match self.file.take() {
            Some(mut file) => {
                file.write_all(FAILED_CONTENT)?;
                file.sync_all()
            }
            None => Ok(()),
        }
    }
}

/// Record a started attempt, falling back to the failure note when the
/// pending note cannot be written.
pub(crate) fn begin_attempt<W: Write>(file: &mut W) -> std::io::Result<()> {
    let pending = file.write_all(PENDING_CONTENT).and_then(|()| file.flush());
    if pending.is_err() {
        let _ = file.write_all(FAILED_CONTENT).and_then(|()| file.flush());
    }
    pending
}

impl Drop for BootstrapMarker {
    fn drop(&mut self) {
        // Neither complete() nor fail() ran, e.g. the operation unwound.
        if self.file.is_some()
            && let Err(e) = self.append_failure()
        {
            warn!(
                "Failed to annotate bootstrap marker {}: {e}",
                self.path.display()
            );
        }
    }
}
