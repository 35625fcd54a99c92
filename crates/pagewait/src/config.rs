//! Page-object configuration.
//!
//! Settings can be built in code, loaded from YAML or JSON, and then
//! overridden from `PAGEWAIT_*` environment variables:
//!
//! ```yaml
//! timeout_ms: 10000
//! poll_interval_ms: 250
//! field_policy: strict
//! ```

use crate::result::{PageError, PageResult};
use crate::wait::{WaitOptions, DEFAULT_POLL_INTERVAL_MS, DEFAULT_WAIT_TIMEOUT_MS};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable overriding [`PageConfig::timeout_ms`]
pub const ENV_TIMEOUT_MS: &str = "PAGEWAIT_TIMEOUT_MS";
/// Environment variable overriding [`PageConfig::poll_interval_ms`]
pub const ENV_POLL_INTERVAL_MS: &str = "PAGEWAIT_POLL_INTERVAL_MS";
/// Environment variable overriding [`PageConfig::field_policy`]
pub const ENV_FIELD_POLICY: &str = "PAGEWAIT_FIELD_POLICY";

/// How the load wait treats a tagged field whose value cannot be obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldPolicy {
    /// Log the field and treat it as satisfied
    #[default]
    Lenient,
    /// Fail with `PageError::FieldUnavailable`
    Strict,
}

impl std::str::FromStr for FieldPolicy {
    type Err = PageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lenient" => Ok(Self::Lenient),
            "strict" => Ok(Self::Strict),
            other => Err(PageError::Config {
                message: format!("unknown field policy `{other}`"),
            }),
        }
    }
}

/// Settings shared by every page object built on one [`crate::PageBase`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    /// Explicit-wait timeout in milliseconds
    pub timeout_ms: u64,
    /// Explicit-wait polling interval in milliseconds
    pub poll_interval_ms: u64,
    /// Handling of unreadable tagged fields
    pub field_policy: FieldPolicy,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            field_policy: FieldPolicy::Lenient,
        }
    }
}

impl PageConfig {
    /// Create new config with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the wait timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set the polling interval
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Set the unreadable-field policy
    #[must_use]
    pub const fn with_field_policy(mut self, policy: FieldPolicy) -> Self {
        self.field_policy = policy;
        self
    }

    /// Wait options derived from this config
    #[must_use]
    pub const fn wait_options(&self) -> WaitOptions {
        WaitOptions {
            timeout_ms: self.timeout_ms,
            poll_interval_ms: self.poll_interval_ms,
        }
    }

    /// Parse a config from YAML.
    ///
    /// # Errors
    /// Returns error if YAML is invalid or validation fails.
    pub fn from_yaml(yaml: &str) -> PageResult<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml).map_err(|e| PageError::Config {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a config from JSON.
    ///
    /// # Errors
    /// Returns error if JSON is invalid or validation fails.
    pub fn from_json(json: &str) -> PageResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file, choosing the format by extension (`.json`,
    /// otherwise YAML).
    ///
    /// # Errors
    /// Returns error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> PageResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json(&text)
        } else {
            Self::from_yaml(&text)
        }
    }

    /// Apply `PAGEWAIT_*` environment overrides.
    ///
    /// # Errors
    /// Returns error if a variable is set but does not parse.
    pub fn with_env_overrides(self) -> PageResult<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> PageResult<Self> {
        if let Some(v) = lookup(ENV_TIMEOUT_MS) {
            self.timeout_ms = parse_ms(ENV_TIMEOUT_MS, &v)?;
        }
        if let Some(v) = lookup(ENV_POLL_INTERVAL_MS) {
            self.poll_interval_ms = parse_ms(ENV_POLL_INTERVAL_MS, &v)?;
        }
        if let Some(v) = lookup(ENV_FIELD_POLICY) {
            self.field_policy = v.parse()?;
        }
        self.validate()?;
        Ok(self)
    }

    /// Check the config for values the waiter cannot use.
    ///
    /// # Errors
    /// Returns error if the polling interval is zero.
    pub fn validate(&self) -> PageResult<()> {
        if self.poll_interval_ms == 0 {
            return Err(PageError::Config {
                message: "poll_interval_ms must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

fn parse_ms(key: &str, value: &str) -> PageResult<u64> {
    value.trim().parse().map_err(|_| PageError::Config {
        message: format!("{key} must be a whole number of milliseconds, got `{value}`"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    mod parse_tests {
        use super::*;

        #[test]
        fn test_defaults() {
            let config = PageConfig::default();
            assert_eq!(config.timeout_ms, 30_000);
            assert_eq!(config.poll_interval_ms, 500);
            assert_eq!(config.field_policy, FieldPolicy::Lenient);
        }

        #[test]
        fn test_from_yaml_partial() {
            let config = PageConfig::from_yaml("timeout_ms: 5000\nfield_policy: strict\n").unwrap();
            assert_eq!(config.timeout_ms, 5000);
            assert_eq!(config.poll_interval_ms, DEFAULT_POLL_INTERVAL_MS);
            assert_eq!(config.field_policy, FieldPolicy::Strict);
        }

        #[test]
        fn test_from_yaml_invalid() {
            let result = PageConfig::from_yaml("timeout_ms: [1, 2]");
            assert!(matches!(result, Err(PageError::Config { .. })));
        }

        #[test]
        fn test_from_json() {
            let config = PageConfig::from_json(r#"{"poll_interval_ms": 100}"#).unwrap();
            assert_eq!(config.poll_interval_ms, 100);
            assert_eq!(config.timeout_ms, DEFAULT_WAIT_TIMEOUT_MS);
        }

        #[test]
        fn test_zero_poll_interval_rejected() {
            let result = PageConfig::from_json(r#"{"poll_interval_ms": 0}"#);
            assert!(matches!(result, Err(PageError::Config { .. })));
        }

        #[test]
        fn test_load_by_extension() {
            let dir = tempfile::tempdir().unwrap();
            let json = dir.path().join("page.json");
            std::fs::write(&json, r#"{"timeout_ms": 42}"#).unwrap();
            assert_eq!(PageConfig::load(&json).unwrap().timeout_ms, 42);

            let yaml = dir.path().join("page.yaml");
            std::fs::write(&yaml, "timeout_ms: 43\n").unwrap();
            assert_eq!(PageConfig::load(&yaml).unwrap().timeout_ms, 43);
        }

        #[test]
        fn test_load_missing_file() {
            let result = PageConfig::load("/definitely/not/here.yaml");
            assert!(matches!(result, Err(PageError::Io(_))));
        }
    }

    mod override_tests {
        use super::*;

        fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
            let map: HashMap<String, String> = pairs
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect();
            move |key: &str| map.get(key).cloned()
        }

        #[test]
        fn test_overrides_applied() {
            let config = PageConfig::default()
                .with_overrides(env(&[
                    (ENV_TIMEOUT_MS, "1500"),
                    (ENV_POLL_INTERVAL_MS, " 25 "),
                    (ENV_FIELD_POLICY, "Strict"),
                ]))
                .unwrap();
            assert_eq!(config.timeout_ms, 1500);
            assert_eq!(config.poll_interval_ms, 25);
            assert_eq!(config.field_policy, FieldPolicy::Strict);
        }

        #[test]
        fn test_no_overrides_is_identity() {
            let config = PageConfig::new().with_timeout(7).with_overrides(env(&[])).unwrap();
            assert_eq!(config, PageConfig::new().with_timeout(7));
        }

        #[test]
        fn test_bad_override_rejected() {
            let result = PageConfig::default().with_overrides(env(&[(ENV_TIMEOUT_MS, "soon")]));
            assert!(matches!(result, Err(PageError::Config { .. })));
            let result = PageConfig::default().with_overrides(env(&[(ENV_FIELD_POLICY, "maybe")]));
            assert!(matches!(result, Err(PageError::Config { .. })));
        }

        #[test]
        fn test_wait_options() {
            let opts = PageConfig::new().with_timeout(9).with_poll_interval(3).wait_options();
            assert_eq!(opts.timeout_ms, 9);
            assert_eq!(opts.poll_interval_ms, 3);
        }
    }
}
