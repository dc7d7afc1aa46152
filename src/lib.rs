//! # rbook
//!
//! Build runbooks from the command line, optionally run them and capture the
//! results.
//!
//! A runbook is a YAML document with a description and an ordered list of
//! steps. `rbook new` appends steps to a runbook (creating it if needed),
//! taken either from its arguments or from piped stdin, one step per line.
//! With `--and-run`, the runbook is staged in a private temporary directory,
//! handed to an external runner, and the artifacts the runner captured are
//! written out instead.
//!
//! ## Quick Start
//!
//! ```bash
//! # One step from arguments
//! rbook new --desc "Ping" --out ping.yml GET /ping
//!
//! # One step per line from stdin, appended to the same file
//! printf 'GET /a\nPOST /b\n' | rbook append --out ping.yml
//!
//! # Run it and keep the captured results
//! rbook new --and-run GET https://example.com/health > captured.yml
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
// Allow common patterns that are intentional in this codebase
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::manual_let_else)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::redundant_closure_for_method_calls)]

pub mod author;
pub mod core;
pub mod engine;
pub mod error;
pub mod input;
pub mod runbook;
pub mod sandbox;

// Re-export commonly used types
pub use author::{author_runbook, AuthorOptions, AuthorReport};
pub use crate::core::Config;
pub use engine::{Engine, EngineConfig, ProcessEngine, RunContext};
pub use error::{Error, ErrorKind, Result};
pub use input::InputSource;
pub use runbook::{Runbook, Step};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "rbook";
