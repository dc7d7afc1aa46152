//! Engine backed by an external runner binary.

use std::ffi::OsString;
use std::process::{Command, Stdio};
use std::time::Duration;

use super::{Engine, EngineConfig, RunContext};
use crate::error::{Error, Result};

/// How often a running engine is checked for completion or cancellation.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Runs a runbook by spawning an external runner process.
///
/// The command line is `program args... <book> --capture <dir>` followed by
/// the passthrough flags. The child's stdout is sent to our stderr so it can
/// never end up in the captured output.
#[derive(Debug, Clone)]
pub struct ProcessEngine {
    program: String,
    args: Vec<String>,
}

impl ProcessEngine {
    /// Create an engine for `program` with leading `args` (e.g. `["run"]`).
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self { program: program.into(), args }
    }

    /// The program that will be spawned.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Full argument list for one run.
    pub fn command_args(&self, config: &EngineConfig) -> Vec<OsString> {
        let mut args: Vec<OsString> = self.args.iter().map(OsString::from).collect();
        args.push(config.book.clone().into_os_string());
        args.push("--capture".into());
        args.push(config.capture.dir.clone().into_os_string());
        if config.capture.load_desc {
            args.push("--capture-desc".into());
        }
        if config.grpc_no_tls {
            args.push("--grpc-no-tls".into());
        }
        for proto in &config.grpc_protos {
            args.push("--grpc-proto".into());
            args.push(proto.into());
        }
        for path in &config.grpc_import_paths {
            args.push("--grpc-import-path".into());
            args.push(path.into());
        }
        for scope in &config.scopes {
            args.push("--scopes".into());
            args.push(scope.as_str().into());
        }
        args
    }
}

impl Engine for ProcessEngine {
    fn run(&self, config: &EngineConfig, ctx: &RunContext) -> Result<()> {
        let args = self.command_args(config);
        tracing::info!(program = self.program, book = %config.book.display(), "Running engine");
        tracing::debug!(?args, "Engine arguments");

        let mut cmd = Command::new(&self.program);
        cmd.args(&args);
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::from(std::io::stderr()));
        cmd.stderr(Stdio::inherit());

        let mut child = cmd
            .spawn()
            .map_err(|source| Error::EngineSpawn { program: self.program.clone(), source })?;

        let status = loop {
            if ctx.is_cancelled() {
                tracing::warn!(program = self.program, "Cancelling engine run");
                let _ = child.kill();
                let _ = child.wait();
                return Err(Error::Cancelled);
            }
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => std::thread::sleep(POLL_INTERVAL),
                Err(source) => {
                    tracing::warn!(program = self.program, error = %source, "Lost engine status");
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(Error::EngineWait { program: self.program.clone(), source });
                }
            }
        };

        if status.success() {
            tracing::debug!(program = self.program, "Engine finished");
            Ok(())
        } else {
            Err(Error::EngineFailed { program: self.program.clone(), status })
        }
    }
}
