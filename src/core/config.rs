//! Configuration management for rbook.
//!
//! Handles loading configuration from TOML files.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::sandbox::MergeOrder;

/// Environment variable overriding the engine program.
pub const ENGINE_ENV: &str = "RBOOK_ENGINE";

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Execution engine settings
    pub engine: EngineSettings,

    /// Sandbox settings
    pub sandbox: SandboxSettings,
}

/// Execution engine settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Runner binary to invoke (`~` is expanded)
    pub program: String,

    /// Arguments placed before the runbook path
    pub args: Vec<String>,
}

/// Sandbox settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxSettings {
    /// Prefix of the temporary directory name
    pub prefix: String,

    /// Order in which capture artifacts are merged
    pub merge_order: MergeOrder,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self { program: "runn".to_string(), args: vec!["run".to_string()] }
    }
}

impl Default for SandboxSettings {
    fn default() -> Self {
        Self { prefix: "rbook".to_string(), merge_order: MergeOrder::Name }
    }
}

impl Config {
    /// Load configuration from the default locations.
    ///
    /// `.rbook.toml` in the current directory wins over the global
    /// `<config dir>/rbook/config.toml`. Without either, defaults are used.
    pub fn load() -> anyhow::Result<Self> {
        // Try local config first
        let local_config = PathBuf::from(".rbook.toml");
        if local_config.exists() {
            return Self::load_from_file(&local_config);
        }

        // Try global config
        if let Some(config_dir) = Self::config_dir() {
            let global_config = config_dir.join("config.toml");
            if global_config.exists() {
                return Self::load_from_file(&global_config);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        use anyhow::Context;

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        tracing::debug!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    /// Apply environment overrides.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(program) = std::env::var(ENGINE_ENV) {
            if !program.is_empty() {
                self.engine.program = program;
            }
        }
        self
    }

    /// Engine program with `~` and `$VARS` expanded.
    pub fn engine_program(&self) -> String {
        shellexpand::full(&self.engine.program)
            .map(|p| p.into_owned())
            .unwrap_or_else(|_| self.engine.program.clone())
    }

    /// Get the config directory path.
    pub fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("rbook"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.engine.program, "runn");
        assert_eq!(config.engine.args, vec!["run"]);
        assert_eq!(config.sandbox.prefix, "rbook");
        assert_eq!(config.sandbox.merge_order, MergeOrder::Name);
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();
        assert!(toml_str.contains("[engine]"));
        assert!(toml_str.contains("[sandbox]"));
        assert!(toml_str.contains("merge_order = \"name\""));
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            [engine]
            program = "/opt/bin/runn"

            [sandbox]
            merge_order = "listing"
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.engine.program, "/opt/bin/runn");
        assert_eq!(config.engine.args, vec!["run"]);
        assert_eq!(config.sandbox.prefix, "rbook");
        assert_eq!(config.sandbox.merge_order, MergeOrder::Listing);
    }

    #[test]
    fn test_load_from_file() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "[engine]\nargs = [\"run\", \"--verbose\"]\n").unwrap();

        let config = Config::load_from_file(&path).unwrap();
        assert_eq!(config.engine.args, vec!["run", "--verbose"]);

        std::fs::write(&path, "[engine\n").unwrap();
        assert!(Config::load_from_file(&path).is_err());
    }

    #[test]
    fn test_engine_program_expands_home() {
        let mut config = Config::default();
        config.engine.program = "~/bin/runn".to_string();

        let expanded = config.engine_program();
        if let Some(home) = dirs::home_dir() {
            assert_eq!(PathBuf::from(expanded), home.join("bin/runn"));
        }
    }

    #[test]
    #[serial]
    fn test_env_override() {
        std::env::set_var(ENGINE_ENV, "my-runner");
        let config = Config::default().with_env_overrides();
        std::env::remove_var(ENGINE_ENV);

        assert_eq!(config.engine.program, "my-runner");
    }

    #[test]
    #[serial]
    fn test_empty_env_override_is_ignored() {
        std::env::set_var(ENGINE_ENV, "");
        let config = Config::default().with_env_overrides();
        std::env::remove_var(ENGINE_ENV);

        assert_eq!(config.engine.program, "runn");
    }
}
