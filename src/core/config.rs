//! # Gate configuration.
//!
//! [`Config`] is supplied once at construction and is immutable afterwards.
//!
//! ## Sentinel values
//! - `max_in_flight = 0` → unlimited (no completion permits created)
//! - `sync_timeout_secs = 0` → wait for the event source replay indefinitely
//!
//! ## Loading
//! [`load_config`] reads a TOML file and overlays `JOBGATE_`-prefixed environment
//! variables (nested keys separated by `__`, e.g. `JOBGATE_SELECTOR__TAGS`).
//!
//! ```toml
//! max_in_flight = 25
//! sync_timeout_secs = 30
//!
//! [selector]
//! tags = ["queue=default"]
//! ```

use std::path::Path;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Global configuration for a gate.
///
/// ## Field semantics
/// - `max_in_flight`: in-flight ceiling (`0` = unlimited)
/// - `bus_capacity`: event bus ring buffer size (min 1; clamped by Bus)
/// - `sync_timeout_secs`: max time for the event source replay (`0` = no limit)
/// - `selector`: which backend objects this gate reconciles against
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Maximum number of jobs admitted and not yet terminal.
    ///
    /// With `n > 0` the gate holds a permit pool of size `n`; see
    /// [`Gate::admit_and_create`](crate::Gate::admit_and_create) for how closely the
    /// ceiling is honoured.
    pub max_in_flight: usize,

    /// Capacity of the event bus broadcast channel.
    pub bus_capacity: usize,

    /// Seconds to wait for the event source to finish replaying existing objects.
    pub sync_timeout_secs: u64,

    /// Backend object filter criteria.
    pub selector: SelectorConfig,
}

/// Filter criteria for the event source subscription.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// Agent tags (`key=value`) this gate admits jobs for.
    pub tags: Vec<String>,
}

impl Config {
    /// Returns the in-flight ceiling as an `Option` (`None` = unlimited).
    #[inline]
    pub fn capacity_limit(&self) -> Option<usize> {
        if self.max_in_flight == 0 {
            None
        } else {
            Some(self.max_in_flight)
        }
    }

    /// Returns the replay timeout as an `Option` (`None` = wait indefinitely).
    #[inline]
    pub fn sync_timeout(&self) -> Option<Duration> {
        if self.sync_timeout_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(self.sync_timeout_secs))
        }
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for Config {
    /// - `max_in_flight = 0` (unlimited)
    /// - `bus_capacity = 1024`
    /// - `sync_timeout_secs = 60`
    /// - no tags
    fn default() -> Self {
        Self {
            max_in_flight: 0,
            bus_capacity: 1024,
            sync_timeout_secs: 60,
            selector: SelectorConfig::default(),
        }
    }
}

/// Loads configuration from a TOML file with `JOBGATE_` environment overrides.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    Figment::new()
        .merge(Toml::file(path))
        .merge(Env::prefixed("JOBGATE_").split("__"))
        .extract()
        .map_err(|e| ConfigError::Parse(e.to_string()))
}

/// Loads configuration from a TOML string.
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::Parse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_are_unlimited() {
        let cfg = Config::default();
        assert_eq!(cfg.capacity_limit(), None);
        assert_eq!(cfg.sync_timeout(), Some(Duration::from_secs(60)));
        assert_eq!(cfg.bus_capacity_clamped(), 1024);
    }

    #[test]
    fn test_zero_sentinels() {
        let cfg = Config {
            max_in_flight: 3,
            bus_capacity: 0,
            sync_timeout_secs: 0,
            ..Config::default()
        };
        assert_eq!(cfg.capacity_limit(), Some(3));
        assert_eq!(cfg.sync_timeout(), None);
        assert_eq!(cfg.bus_capacity_clamped(), 1);
    }

    #[test]
    fn test_load_from_str_fills_missing_fields() {
        let cfg = load_config_from_str(
            r#"
max_in_flight = 5

[selector]
tags = ["queue=default", "os=linux"]
"#,
        )
        .unwrap();
        assert_eq!(cfg.max_in_flight, 5);
        assert_eq!(cfg.selector.tags, vec!["queue=default", "os=linux"]);
        assert_eq!(cfg.bus_capacity, 1024);
    }

    #[test]
    fn test_load_from_str_rejects_bad_types() {
        let err = load_config_from_str("max_in_flight = \"lots\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_config_file_not_found() {
        let err = load_config(Path::new("/nonexistent/jobgate.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound(_)));
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
max_in_flight = 2
sync_timeout_secs = 10

[selector]
tags = ["queue=gpu"]
"#
        )
        .unwrap();

        let cfg = load_config(file.path()).unwrap();
        assert_eq!(cfg.capacity_limit(), Some(2));
        assert_eq!(cfg.sync_timeout(), Some(Duration::from_secs(10)));
        assert_eq!(cfg.selector.tags, vec!["queue=gpu"]);
    }
}
