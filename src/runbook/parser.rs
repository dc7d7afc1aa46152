//! Runbook parser.
//!
//! Decodes YAML runbook files into [`Runbook`] values, encodes them back, and
//! loads the seed document an authoring run appends to.

use std::io::Write;
use std::path::Path;

use super::Runbook;
use crate::error::{Error, Result};

/// Parse a runbook from a file.
///
/// The whole file must decode; there is no best-effort partial load.
pub fn parse_runbook(path: &Path) -> Result<Runbook> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    parse_runbook_str(&content).map_err(|source| Error::Decode { path: path.to_path_buf(), source })
}

/// Parse a runbook from a string.
pub fn parse_runbook_str(content: &str) -> serde_yaml::Result<Runbook> {
    serde_yaml::from_str(content)
}

/// Encode a runbook as YAML.
pub fn encode_runbook(runbook: &Runbook) -> Result<String> {
    serde_yaml::to_string(runbook).map_err(Error::Encode)
}

/// Encode a runbook as YAML straight into a writer.
pub fn write_runbook<W: Write>(writer: W, runbook: &Runbook) -> Result<()> {
    serde_yaml::to_writer(writer, runbook).map_err(Error::Encode)
}

/// Load the runbook at `path`, or start a fresh one.
///
/// A missing path (or one that does not exist yet) yields an empty runbook
/// carrying `desc`. An existing file is decoded in full, and a non-empty
/// `desc` replaces the description it was saved with.
pub fn load_or_create(path: Option<&Path>, desc: Option<&str>) -> Result<Runbook> {
    let Some(path) = path.filter(|p| p.exists()) else {
        tracing::debug!("Starting a new runbook");
        return Ok(Runbook::new(desc));
    };

    let mut runbook = parse_runbook(path)?;
    tracing::debug!(path = %path.display(), steps = runbook.step_count(), "Loaded existing runbook");
    if runbook.override_desc(desc) {
        tracing::debug!("Replaced runbook description");
    }
    Ok(runbook)
}
