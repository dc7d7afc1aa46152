//! Runbook schema definitions.
//!
//! Defines the YAML structure for runbook files.

use serde::{Deserialize, Serialize};
use serde_yaml::Mapping;

use crate::error::{Error, Result};

/// A runbook definition.
///
/// Steps are append-only: nothing in this crate removes or reorders them.
/// Top-level keys other than `desc` and `steps` (`runners`, `vars`, ...) are
/// kept as-is and written back between the two.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Runbook {
    /// Description of what this runbook does
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,

    /// Other top-level keys, in document order
    #[serde(flatten)]
    pub extra: Mapping,

    /// Steps to execute, in order
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// A step in the runbook.
///
/// The tokens are positional arguments of the engine's step grammar,
/// e.g. `["GET", "/users"]`. They are stored verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Step(Vec<String>);

impl Step {
    /// Create a step from its tokens, checking the step-definition contract.
    pub fn new<I, S>(tokens: I) -> std::result::Result<Self, String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tokens: Vec<String> = tokens.into_iter().map(Into::into).collect();
        match tokens.first() {
            None => Err("no step arguments".to_string()),
            Some(head) if head.trim().is_empty() => Err("step is blank".to_string()),
            Some(_) => Ok(Self(tokens)),
        }
    }

    /// The step's tokens.
    pub fn tokens(&self) -> &[String] {
        &self.0
    }
}

impl Runbook {
    /// Create an empty runbook with an optional description.
    pub fn new(desc: Option<&str>) -> Self {
        Self {
            desc: desc.filter(|d| !d.is_empty()).map(str::to_string),
            ..Self::default()
        }
    }

    /// Replace the description if `desc` is non-empty.
    ///
    /// Returns whether the description changed.
    pub fn override_desc(&mut self, desc: Option<&str>) -> bool {
        match desc {
            Some(d) if !d.is_empty() => {
                self.desc = Some(d.to_string());
                true
            }
            _ => false,
        }
    }

    /// Append one step.
    pub fn append_step<I, S>(&mut self, tokens: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let position = self.steps.len() + 1;
        let step = Step::new(tokens).map_err(|reason| Error::InvalidStep { position, reason })?;
        tracing::debug!(position, tokens = ?step.tokens(), "Appending step");
        self.steps.push(step);
        Ok(())
    }

    /// Append steps in order, stopping at the first invalid one.
    ///
    /// Steps appended before the failure stay in the runbook.
    pub fn append_steps<I, T>(&mut self, lists: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: IntoIterator<Item = String>,
    {
        for tokens in lists {
            self.append_step(tokens)?;
        }
        Ok(())
    }

    /// Get the number of steps.
    #[must_use]
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|t| (*t).to_string()).collect()
    }

    #[test]
    fn test_parse_runbook_yaml() {
        let yaml = r#"
desc: Smoke test
steps:
  - [GET, /users]
  - ["POST /users"]
"#;

        let runbook: Runbook = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(runbook.desc.as_deref(), Some("Smoke test"));
        assert_eq!(runbook.step_count(), 2);
        assert_eq!(runbook.steps[0].tokens(), ["GET", "/users"]);
        assert_eq!(runbook.steps[1].tokens(), ["POST /users"]);
        assert!(runbook.extra.is_empty());
    }

    #[test]
    fn test_unknown_keys_are_kept() {
        let yaml = r#"
desc: Smoke test
runners:
  req: https://example.com
vars:
  id: 1
steps:
  - [GET, /users]
"#;

        let runbook: Runbook = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(runbook.step_count(), 1);
        assert_eq!(runbook.extra.len(), 2);
        assert_eq!(runbook.extra["runners"]["req"].as_str(), Some("https://example.com"));
        assert_eq!(runbook.extra["vars"]["id"].as_u64(), Some(1));
    }

    #[test]
    fn test_new_ignores_empty_desc() {
        assert_eq!(Runbook::new(Some("")).desc, None);
        assert_eq!(Runbook::new(Some("hello")).desc.as_deref(), Some("hello"));
    }

    #[test]
    fn test_append_keeps_order() {
        let mut runbook = Runbook::new(None);
        runbook
            .append_steps(vec![list(&["GET", "/a"]), list(&["POST", "/b"]), list(&["HEAD /c"])])
            .unwrap();

        assert_eq!(runbook.step_count(), 3);
        assert_eq!(runbook.steps[0].tokens(), ["GET", "/a"]);
        assert_eq!(runbook.steps[1].tokens(), ["POST", "/b"]);
        assert_eq!(runbook.steps[2].tokens(), ["HEAD /c"]);
    }

    #[test]
    fn test_invalid_step_leaves_count_unchanged() {
        let mut runbook = Runbook::new(None);
        runbook.append_step(["GET", "/a"]).unwrap();

        let err = runbook.append_step(Vec::<String>::new()).unwrap_err();
        assert!(matches!(err, Error::InvalidStep { position: 2, .. }));
        assert_eq!(runbook.step_count(), 1);

        let err = runbook.append_step(["   "]).unwrap_err();
        assert!(matches!(err, Error::InvalidStep { position: 2, .. }));
        assert_eq!(runbook.step_count(), 1);
    }

    #[test]
    fn test_append_steps_stops_at_first_failure() {
        let mut runbook = Runbook::new(None);
        let result =
            runbook.append_steps(vec![list(&["GET /a"]), list(&[""]), list(&["GET /never"])]);

        assert!(result.is_err());
        assert_eq!(runbook.step_count(), 1);
        assert_eq!(runbook.steps[0].tokens(), ["GET /a"]);
    }

    #[test]
    fn test_override_desc() {
        let mut runbook = Runbook::new(Some("original"));
        assert!(!runbook.override_desc(None));
        assert!(!runbook.override_desc(Some("")));
        assert_eq!(runbook.desc.as_deref(), Some("original"));

        assert!(runbook.override_desc(Some("replaced")));
        assert_eq!(runbook.desc.as_deref(), Some("replaced"));
    }
}
