//! Execution sandbox.
//!
//! A sandbox is a private temporary directory holding the staged runbook
//! (always named [`INPUT_FILE`]) and whatever capture artifacts the engine
//! writes next to it. The directory is removed when the sandbox is closed or
//! dropped, whether or not the run succeeded.

mod merge;

pub use merge::{merge_captures, MergeOrder};

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::engine::{CaptureTarget, Engine, EngineConfig, RunContext, Scope};
use crate::error::{Error, Result};
use crate::runbook::{write_runbook, Runbook};

/// Name of the staged runbook inside the sandbox.
pub const INPUT_FILE: &str = "new.yml";

/// Settings for one execute-and-capture run.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Prefix for the temporary directory name
    pub prefix: String,
    /// Order of merged capture artifacts
    pub merge_order: MergeOrder,
    /// Disable TLS for gRPC steps
    pub grpc_no_tls: bool,
    /// Proto files for gRPC steps
    pub grpc_protos: Vec<String>,
    /// Proto import paths for gRPC steps
    pub grpc_import_paths: Vec<String>,
}

/// A private, self-removing working directory for one engine run.
#[derive(Debug)]
pub struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    /// Create a uniquely named temporary directory.
    pub fn create(prefix: &str) -> Result<Self> {
        let tmp = std::env::temp_dir();
        let dir =
            tempfile::Builder::new().prefix(prefix).tempdir().map_err(|e| Error::io(tmp, e))?;
        tracing::debug!(dir = %dir.path().display(), "Created sandbox");
        Ok(Self { dir })
    }

    /// Sandbox directory.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Path of the staged runbook.
    pub fn input_path(&self) -> PathBuf {
        self.dir.path().join(INPUT_FILE)
    }

    /// Create the staged runbook file and fill it with `encode`.
    ///
    /// The file is flushed and synced before returning so that write-back
    /// errors surface here rather than being lost on close.
    pub fn stage<F>(&self, encode: F) -> Result<PathBuf>
    where
        F: FnOnce(&mut dyn Write) -> Result<()>,
    {
        let path = self.input_path();
        let file = File::create(&path).map_err(|e| Error::io(&path, e))?;
        let mut writer = BufWriter::new(file);
        encode(&mut writer)?;
        let file = writer.into_inner().map_err(|e| Error::io(&path, e.into_error()))?;
        file.sync_all().map_err(|e| Error::io(&path, e))?;
        tracing::debug!(path = %path.display(), "Staged runbook");
        Ok(path)
    }

    /// Stage a runbook as YAML.
    pub fn stage_runbook(&self, runbook: &Runbook) -> Result<PathBuf> {
        self.stage(|w| write_runbook(w, runbook))
    }

    /// Engine configuration for running the staged runbook.
    pub fn engine_config(&self, opts: &RunOptions) -> EngineConfig {
        EngineConfig {
            book: self.input_path(),
            capture: CaptureTarget { dir: self.path().to_path_buf(), load_desc: true },
            grpc_no_tls: opts.grpc_no_tls,
            grpc_protos: opts.grpc_protos.clone(),
            grpc_import_paths: opts.grpc_import_paths.clone(),
            scopes: vec![Scope::AllowReadParent],
        }
    }

    /// Run the staged runbook and wait for the engine to finish.
    pub fn execute<E: Engine + ?Sized>(
        &self,
        engine: &E,
        opts: &RunOptions,
        ctx: &RunContext,
    ) -> Result<()> {
        engine.run(&self.engine_config(opts), ctx)
    }

    /// Concatenate every capture artifact into `sink`.
    pub fn merge_into<W: Write + ?Sized>(&self, order: MergeOrder, sink: &mut W) -> Result<usize> {
        merge_captures(self.path(), INPUT_FILE, order, sink)
    }

    /// Remove the directory. Failures are logged, never returned.
    pub fn close(self) {
        let path = self.dir.path().to_path_buf();
        if let Err(e) = self.dir.close() {
            tracing::warn!(dir = %path.display(), error = %e, "Failed to remove sandbox");
        }
    }
}

/// Stage `runbook`, run it, and merge its captures into the sink from `open_sink`.
///
/// `open_sink` is only called after the engine succeeded, so a failed run never
/// touches the output. The sandbox is removed on every path. The opened sink is
/// handed back for the caller to finish.
pub fn run_and_capture<E, W, F>(
    runbook: &Runbook,
    engine: &E,
    opts: &RunOptions,
    ctx: &RunContext,
    open_sink: F,
) -> Result<W>
where
    E: Engine + ?Sized,
    W: Write,
    F: FnOnce() -> Result<W>,
{
    let sandbox = Sandbox::create(&opts.prefix)?;
    let result = capture_in(&sandbox, runbook, engine, opts, ctx, open_sink);
    sandbox.close();
    result
}

fn capture_in<E, W, F>(
    sandbox: &Sandbox,
    runbook: &Runbook,
    engine: &E,
    opts: &RunOptions,
    ctx: &RunContext,
    open_sink: F,
) -> Result<W>
where
    E: Engine + ?Sized,
    W: Write,
    F: FnOnce() -> Result<W>,
{
    sandbox.stage_runbook(runbook)?;
    sandbox.execute(engine, opts, ctx)?;

    let mut sink = open_sink()?;
    let merged = sandbox.merge_into(opts.merge_order, &mut sink)?;
    tracing::info!(artifacts = merged, "Merged capture results");
    Ok(sink)
}
