//! Core configuration shared by the library and the CLI.

mod config;

pub use config::{Config, EngineSettings, SandboxSettings, ENGINE_ENV};
