//! Runtime settings.
//!
//! Settings are layered: built-in defaults, then an optional TOML file, then
//! environment variables prefixed with `SYNCPULSE_`. Nested keys use a
//! double underscore.
//!
//! ```toml
//! endpoint = "ws://localhost:5000"
//! capacity = 20
//! simulate_interval_ms = 3000
//!
//! [ranges.pressure]
//! min = 900.0
//! max = 1000.0
//! ```
//!
//! ```bash
//! SYNCPULSE_ENDPOINT=wss://relay.example.com/ws syncpulse
//! SYNCPULSE_RANGES__BMP_TEMP__MAX=35 syncpulse --simulate
//! ```

use std::path::Path;
use std::time::Duration;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::data::{Metric, Ranges, DEFAULT_CAPACITY};
use crate::error::ConfigError;

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "SYNCPULSE";

/// Largest accepted history capacity per metric.
pub const MAX_CAPACITY: usize = 100_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Endpoint used when `connect` is called without a target.
    pub endpoint: Option<String>,
    /// Points kept per metric.
    pub capacity: usize,
    /// Normal ranges used for classification.
    pub ranges: Ranges,
    /// Tick of the simulated feed, in milliseconds.
    pub simulate_interval_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            endpoint: None,
            capacity: DEFAULT_CAPACITY,
            ranges: Ranges::default(),
            simulate_interval_ms: 3000,
        }
    }
}

impl Settings {
    /// Load settings from an optional file plus the process environment.
    ///
    /// A path that is given but missing is an error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_from(path, environment())
    }

    fn load_from(path: Option<&Path>, env: Environment) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }
        let settings: Settings = builder.add_source(env).build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn simulate_interval(&self) -> Duration {
        Duration::from_millis(self.simulate_interval_ms)
    }

    /// Check values that deserialized but cannot be used.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 || self.capacity > MAX_CAPACITY {
            return Err(ConfigError::Invalid(format!(
                "capacity must be between 1 and {}, got {}",
                MAX_CAPACITY, self.capacity
            )));
        }
        if self.simulate_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "simulate_interval_ms must be positive".to_string(),
            ));
        }
        for metric in Metric::ALL {
            let range = self.ranges.get(metric);
            if range.min.is_nan() || range.max.is_nan() || range.min > range.max {
                return Err(ConfigError::Invalid(format!(
                    "range for {} has min {} above max {}",
                    metric.snake_name(),
                    range.min,
                    range.max
                )));
            }
        }
        Ok(())
    }
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(vars: &[(&str, &str)]) -> Environment {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        environment().source(Some(map))
    }

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::load_from(None, env(&[])).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.capacity, 20);
        assert!(settings.endpoint.is_none());
        assert_eq!(settings.simulate_interval(), Duration::from_secs(3));
    }

    #[test]
    fn test_file_values() {
        let file = write_config(
            r#"
endpoint = "ws://localhost:5000"
capacity = 5

[ranges.pressure]
min = 950.0
max = 1050.0
"#,
        );
        let settings = Settings::load_from(Some(file.path()), env(&[])).unwrap();
        assert_eq!(settings.endpoint.as_deref(), Some("ws://localhost:5000"));
        assert_eq!(settings.capacity, 5);
        assert_eq!(settings.ranges.pressure.min, 950.0);
        // Untouched ranges keep their defaults.
        assert_eq!(settings.ranges.bmp_temp, Ranges::default().bmp_temp);
    }

    #[test]
    fn test_environment_overrides_file() {
        let file = write_config("endpoint = \"ws://from-file\"\ncapacity = 5\n");
        let settings = Settings::load_from(
            Some(file.path()),
            env(&[
                ("SYNCPULSE_ENDPOINT", "wss://from-env/ws"),
                ("SYNCPULSE_CAPACITY", "8"),
            ]),
        )
        .unwrap();
        assert_eq!(settings.endpoint.as_deref(), Some("wss://from-env/ws"));
        assert_eq!(settings.capacity, 8);
    }

    #[test]
    fn test_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        assert!(matches!(
            Settings::load_from(Some(&path), env(&[])),
            Err(ConfigError::Load(_))
        ));
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let file = write_config("capacity = 0\n");
        assert!(matches!(
            Settings::load_from(Some(file.path()), env(&[])),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_oversized_capacity_rejected() {
        let result = Settings::load_from(
            None,
            env(&[("SYNCPULSE_CAPACITY", "2305843009213693951")]),
        );
        assert!(matches!(result, Err(ConfigError::Invalid(_))));

        let settings = Settings {
            capacity: MAX_CAPACITY,
            ..Settings::default()
        };
        assert!(settings.validate().is_ok());
        let settings = Settings {
            capacity: MAX_CAPACITY + 1,
            ..Settings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_inverted_range_rejected() {
        let file = write_config("[ranges.bmp_temp]\nmin = 40.0\nmax = 30.0\n");
        let err = Settings::load_from(Some(file.path()), env(&[])).unwrap_err();
        assert!(err.to_string().contains("bmp_temp"));
    }
}
