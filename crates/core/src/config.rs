//! Annotator runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into the session. The
//! core never reads environment variables itself; callers hand in the raw values they found.

use crate::{AnnotatorError, AnnotatorResult};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// How many values the `Action` slot may hold.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ActionPolicy {
    /// At most one value; assigning to an occupied Action is rejected.
    #[default]
    Single,
    /// Action promotes to a list like every other role.
    Multiple,
}

impl FromStr for ActionPolicy {
    type Err = AnnotatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "single" => Ok(ActionPolicy::Single),
            "multiple" => Ok(ActionPolicy::Multiple),
            other => Err(AnnotatorError::InvalidConfig(format!(
                "action policy must be 'single' or 'multiple', got '{other}'"
            ))),
        }
    }
}

impl fmt::Display for ActionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionPolicy::Single => f.write_str("single"),
            ActionPolicy::Multiple => f.write_str("multiple"),
        }
    }
}

/// Annotator configuration resolved at startup.
#[derive(Clone, Debug, Default)]
pub struct AnnotatorConfig {
    action_policy: ActionPolicy,
    require_action_first: bool,
    output_dir: Option<PathBuf>,
}

impl AnnotatorConfig {
    pub fn new(
        action_policy: ActionPolicy,
        require_action_first: bool,
        output_dir: Option<PathBuf>,
    ) -> Self {
        Self {
            action_policy,
            require_action_first,
            output_dir,
        }
    }

    /// Builds a configuration from raw string settings, as read from flags or the environment.
    ///
    /// Missing values take their defaults: `single` action policy, no action-first rule, and
    /// no output directory.
    ///
    /// # Errors
    ///
    /// Returns [`AnnotatorError::InvalidConfig`] if the policy or the flag cannot be parsed.
    pub fn resolve(
        action_policy: Option<&str>,
        require_action_first: Option<&str>,
        output_dir: Option<PathBuf>,
    ) -> AnnotatorResult<Self> {
        let action_policy = action_policy
            .map(|raw| raw.trim().parse::<ActionPolicy>())
            .transpose()?
            .unwrap_or_default();
        let require_action_first = require_action_first
            .map(parse_flag)
            .transpose()?
            .unwrap_or(false);
        let output_dir = output_dir.filter(|dir| !dir.as_os_str().is_empty());

        Ok(Self::new(action_policy, require_action_first, output_dir))
    }

    pub fn action_policy(&self) -> ActionPolicy {
        self.action_policy
    }

    /// Whether non-Action slots are rejected while the event's Action is empty.
    pub fn require_action_first(&self) -> bool {
        self.require_action_first
    }

    pub fn output_dir(&self) -> Option<&Path> {
        self.output_dir.as_deref()
    }
}

fn parse_flag(raw: &str) -> AnnotatorResult<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(AnnotatorError::InvalidConfig(format!(
            "expected a boolean flag, got '{other}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_policy_parsing_is_strict() {
        assert_eq!("single".parse::<ActionPolicy>().unwrap(), ActionPolicy::Single);
        assert_eq!(
            "multiple".parse::<ActionPolicy>().unwrap(),
            ActionPolicy::Multiple
        );
        assert!("Multiple".parse::<ActionPolicy>().is_err());
        assert!("many".parse::<ActionPolicy>().is_err());
    }

    #[test]
    fn resolve_defaults() {
        let config = AnnotatorConfig::resolve(None, None, None).unwrap();
        assert_eq!(config.action_policy(), ActionPolicy::Single);
        assert!(!config.require_action_first());
        assert!(config.output_dir().is_none());
    }

    #[test]
    fn resolve_reads_raw_values() {
        let config =
            AnnotatorConfig::resolve(Some(" multiple "), Some("TRUE"), Some(PathBuf::from("out")))
                .unwrap();
        assert_eq!(config.action_policy(), ActionPolicy::Multiple);
        assert!(config.require_action_first());
        assert_eq!(config.output_dir(), Some(Path::new("out")));
    }

    #[test]
    fn resolve_rejects_bad_values() {
        let err = AnnotatorConfig::resolve(Some("sometimes"), None, None).unwrap_err();
        assert!(matches!(err, AnnotatorError::InvalidConfig(_)));

        let err = AnnotatorConfig::resolve(None, Some("maybe"), None).unwrap_err();
        assert!(err.to_string().contains("maybe"));
    }

    #[test]
    fn empty_output_dir_is_ignored() {
        let config = AnnotatorConfig::resolve(None, None, Some(PathBuf::new())).unwrap();
        assert!(config.output_dir().is_none());
    }
}
