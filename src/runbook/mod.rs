//! Runbook document model.
//!
//! A runbook is a YAML file with an optional description and an ordered list
//! of steps. Each step is a list of tokens understood by the execution engine.

mod parser;
mod schema;

pub use parser::{encode_runbook, load_or_create, parse_runbook, parse_runbook_str, write_runbook};
pub use schema::{Runbook, Step};
