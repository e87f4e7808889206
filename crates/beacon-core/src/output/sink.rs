//! Output destinations.
//!
//! A sink is either the process stdout or a named file (opened with full
//! overwrite). Writes are synchronous and append-only; callers must see a
//! successful flush before an invocation reports success. Nothing is ever
//! rolled back: on a fatal error upstream, bytes already written stay put.

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use super::error::SinkError;

/// Where rendered bytes go.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Destination {
    /// The default output channel.
    #[default]
    Stdout,
    /// A named file, replacing any existing content.
    File(PathBuf),
}

impl Destination {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File(path.into())
    }
}

/// An open, append-only byte destination.
#[derive(Debug)]
pub enum Sink {
    Stdout(io::Stdout),
    File { path: PathBuf, file: File },
}

impl Sink {
    /// Open the destination. Opening a file truncates it immediately, so a
    /// sink should only be opened once the caller intends to produce bytes.
    pub fn open(destination: &Destination) -> Result<Self, SinkError> {
        match destination {
            Destination::Stdout => Ok(Self::Stdout(io::stdout())),
            Destination::File(path) => {
                let file = File::create(path).map_err(|source| SinkError::Create {
                    path: path.clone(),
                    source,
                })?;
                Ok(Self::File {
                    path: path.clone(),
                    file,
                })
            }
        }
    }

    /// Append bytes; used by the streaming path for each incremental write.
    pub fn append(&mut self, bytes: &[u8]) -> Result<(), SinkError> {
        if bytes.is_empty() {
            return Ok(());
        }
        match self {
            Self::Stdout(stdout) => stdout.write_all(bytes).map_err(SinkError::Stdout),
            Self::File { path, file } => {
                file.write_all(bytes).map_err(|source| SinkError::File {
                    path: path.clone(),
                    source,
                })
            }
        }
    }

    /// Single write plus flush; used by the buffered path.
    pub fn write_once(&mut self, bytes: &[u8]) -> Result<(), SinkError> {
        self.append(bytes)?;
        self.flush()
    }

    /// Flush pending bytes to the destination.
    pub fn flush(&mut self) -> Result<(), SinkError> {
        match self {
            Self::Stdout(stdout) => stdout.flush().map_err(SinkError::Stdout),
            Self::File { path, file } => file.flush().map_err(|source| SinkError::File {
                path: path.clone(),
                source,
            }),
        }
    }

    /// Path of the backing file, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Stdout(_) => None,
            Self::File { path, .. } => Some(path),
        }
    }
}
