//! Error types for rbook.
//!
//! Library code returns [`Error`] via `thiserror`. The binary wraps it with
//! `anyhow` for reporting.

use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// Result type for rbook operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Unreadable standard input or an unsupported input mode.
    Input,
    /// Invalid step or undecodable/unencodable runbook.
    Document,
    /// Temp directory, staged file or output file failures.
    Filesystem,
    /// The execution engine could not run or reported a failed run.
    Engine,
}

/// Errors that can occur while building, running or capturing a runbook.
#[derive(Debug, Error)]
pub enum Error {
    /// No arguments were given and stdin is attached to a terminal.
    #[error("interactive mode is planned, but not yet implemented")]
    InteractiveUnsupported,

    /// Reading step lines from standard input failed.
    #[error("failed to read steps from standard input")]
    Input(#[source] std::io::Error),

    /// A step was rejected by the step-definition contract.
    #[error("invalid step #{position}: {reason}")]
    InvalidStep { position: usize, reason: String },

    /// An existing runbook could not be decoded.
    #[error("failed to decode runbook {path:?}")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The runbook could not be encoded.
    #[error("failed to encode runbook")]
    Encode(#[source] serde_yaml::Error),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing to the output sink failed.
    #[error("failed to write output")]
    Output(#[source] std::io::Error),

    /// The output was fully written but releasing the file failed.
    #[error("output was written but closing {path:?} failed")]
    Close {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The engine process could not be started.
    #[error("failed to start engine '{program}'")]
    EngineSpawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The engine started, but its status could not be collected.
    #[error("lost track of engine '{program}'")]
    EngineWait {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The engine ran but reported failure.
    #[error("engine '{program}' failed ({status})")]
    EngineFailed { program: String, status: ExitStatus },

    /// The engine run was interrupted.
    #[error("engine run was cancelled")]
    Cancelled,
}

impl Error {
    /// Build an I/O error tagged with the path it happened at.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }

    /// Which of the four error families this belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InteractiveUnsupported | Self::Input(_) => ErrorKind::Input,
            Self::InvalidStep { .. } | Self::Decode { .. } | Self::Encode(_) => {
                ErrorKind::Document
            }
            Self::Io { .. } | Self::Output(_) | Self::Close { .. } => ErrorKind::Filesystem,
            Self::EngineSpawn { .. }
            | Self::EngineWait { .. }
            | Self::EngineFailed { .. }
            | Self::Cancelled => ErrorKind::Engine,
        }
    }

    /// Whether the primary operation completed and only resource release failed.
    pub fn is_release_failure(&self) -> bool {
        matches!(self, Self::Close { .. })
    }
}
