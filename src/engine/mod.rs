//! Execution engine interface.
//!
//! The engine is the external program that actually runs a runbook's steps.
//! rbook only hands it a configuration bundle and waits for it to finish.

mod process;

pub use process::ProcessEngine;

use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::Result;

/// Filesystem permissions granted to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Allow reading files above the runbook's directory (the caller's cwd).
    AllowReadParent,
}

impl Scope {
    /// Name the engine understands.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AllowReadParent => "read:parent",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the engine writes its capture artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureTarget {
    /// Directory receiving the artifacts
    pub dir: PathBuf,
    /// Also capture the runbook description
    pub load_desc: bool,
}

/// Everything the engine needs to run one runbook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Runbook file to execute
    pub book: PathBuf,
    /// Capture destination
    pub capture: CaptureTarget,
    /// Disable TLS for gRPC steps
    pub grpc_no_tls: bool,
    /// Proto files for gRPC steps
    pub grpc_protos: Vec<String>,
    /// Proto import paths for gRPC steps
    pub grpc_import_paths: Vec<String>,
    /// Filesystem permissions
    pub scopes: Vec<Scope>,
}

/// Cancellation state threaded through an engine run.
///
/// Clones share the same flag. Nothing here imposes a deadline.
#[derive(Debug, Clone, Default)]
pub struct RunContext {
    cancelled: Arc<AtomicBool>,
}

impl RunContext {
    /// Create a context that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Something that can run a runbook.
pub trait Engine {
    /// Run the runbook described by `config`, blocking until it completes.
    fn run(&self, config: &EngineConfig, ctx: &RunContext) -> Result<()>;
}
