//! Runbook authoring pipeline.
//!
//! Reads steps, appends them to a new or existing runbook and writes the
//! result, optionally running it first and writing the captured results
//! instead. Every run parameter arrives through one [`AuthorOptions`] value.

use std::fs::File;
use std::io::{BufRead, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::engine::{Engine, RunContext};
use crate::error::{Error, Result};
use crate::input::{collect_steps, InputSource};
use crate::runbook::{encode_runbook, load_or_create};
use crate::sandbox::{run_and_capture, RunOptions};

/// Parameters of one authoring run.
#[derive(Debug, Clone, Default)]
pub struct AuthorOptions {
    /// Description override (ignored when empty)
    pub desc: Option<String>,
    /// Output runbook path; `None` or empty writes to stdout
    pub out: Option<PathBuf>,
    /// Run the runbook and write its captured results
    pub and_run: bool,
    /// Settings for the run
    pub run: RunOptions,
}

impl AuthorOptions {
    /// Output path, if output goes to a file.
    pub fn out_path(&self) -> Option<&Path> {
        self.out.as_deref().filter(|p| !p.as_os_str().is_empty())
    }
}

/// Summary of a finished authoring run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorReport {
    /// Steps added by this run
    pub appended: usize,
    /// Steps in the runbook afterwards
    pub total: usize,
    /// Whether the runbook was executed
    pub executed: bool,
}

/// A file-like writer that can be forced to stable storage.
trait Durable: Write {
    fn sync(&self) -> std::io::Result<()>;
}

impl Durable for File {
    fn sync(&self) -> std::io::Result<()> {
        self.sync_all()
    }
}

/// Where the final bytes go.
enum Sink<'a, W: Write, F: Durable = File> {
    Stdout(&'a mut W),
    File { path: PathBuf, writer: BufWriter<F> },
}

impl<'a, W: Write> Sink<'a, W> {
    fn open(path: Option<&Path>, stdout: &'a mut W) -> Result<Self> {
        match path {
            None => Ok(Self::Stdout(stdout)),
            Some(path) => {
                let file = File::create(path).map_err(|e| Error::io(path, e))?;
                Ok(Self::File { path: path.to_path_buf(), writer: BufWriter::new(file) })
            }
        }
    }
}

impl<W: Write, F: Durable> Sink<'_, W, F> {
    /// Flush everything and release the file.
    fn finish(self) -> Result<()> {
        match self {
            Self::Stdout(out) => out.flush().map_err(Error::Output),
            Self::File { path, writer } => {
                let file = writer.into_inner().map_err(|e| Error::Output(e.into_error()))?;
                file.sync().map_err(|source| Error::Close { path, source })
            }
        }
    }
}

impl<W: Write, F: Durable> Write for Sink<'_, W, F> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match self {
            Self::Stdout(out) => out.write(buf),
            Self::File { writer, .. } => writer.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(out) => out.flush(),
            Self::File { writer, .. } => writer.flush(),
        }
    }
}

/// Build the runbook and write it (or its run's captures) out.
///
/// The output is only opened once the runbook is complete, and in run mode
/// only once the engine succeeded; any earlier failure leaves it untouched.
pub fn author_runbook<R, E, W>(
    opts: &AuthorOptions,
    source: InputSource,
    reader: R,
    engine: &E,
    ctx: &RunContext,
    stdout: &mut W,
) -> Result<AuthorReport>
where
    R: BufRead,
    E: Engine + ?Sized,
    W: Write,
{
    let lists = collect_steps(source, reader)?;
    let out_path = opts.out_path();

    let mut runbook = load_or_create(out_path, opts.desc.as_deref())?;
    let before = runbook.step_count();
    runbook.append_steps(lists)?;
    let report = AuthorReport {
        appended: runbook.step_count() - before,
        total: runbook.step_count(),
        executed: opts.and_run,
    };

    if opts.and_run {
        let sink = run_and_capture(&runbook, engine, &opts.run, ctx, move || {
            Sink::open(out_path, stdout)
        })?;
        sink.finish()?;
    } else {
        let yaml = encode_runbook(&runbook)?;
        let mut sink = Sink::open(out_path, stdout)?;
        sink.write_all(yaml.as_bytes()).map_err(Error::Output)?;
        sink.finish()?;
    }

    tracing::info!(
        appended = report.appended,
        total = report.total,
        executed = report.executed,
        "Runbook written"
    );
    Ok(report)
}
