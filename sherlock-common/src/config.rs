//! Configuration management for Sherlock
//!
//! Settings are layered, highest priority first:
//! 1. Environment variables
//! 2. Configuration file (TOML format)
//! 3. Default values

use crate::allowlist::BrokerAllowList;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration struct for Sherlock
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SherlockConfig {
    /// Druid broker settings
    pub druid: DruidConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Druid broker settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DruidConfig {
    /// Brokers permitted for use, as `host:port`
    pub valid_brokers: Vec<String>,
    /// Timeout for a broker status probe, in milliseconds
    pub probe_timeout_ms: u64,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Directory for rolling log files. No file logging when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,
    /// Write file logs as JSON
    pub json_format: bool,
}

impl Default for DruidConfig {
    fn default() -> Self {
        Self {
            valid_brokers: Vec::new(),
            probe_timeout_ms: 5000,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_dir: None,
            json_format: false,
        }
    }
}

impl SherlockConfig {
    /// Load configuration from the standard config file locations and the environment.
    ///
    /// A discovered file that cannot be read or parsed is skipped in favour of
    /// the defaults, and the reason is returned so the caller can report it
    /// once logging is up.
    pub fn load() -> (Self, Option<ConfigError>) {
        let (mut config, skipped) = Self::load_discovered(Self::find_config_file().as_deref());
        config.apply_env_overrides();
        (config, skipped)
    }

    /// File layer of [`load`](Self::load): the file at `path` if it loads,
    /// otherwise the defaults plus the reason it was skipped
    pub fn load_discovered(path: Option<&Path>) -> (Self, Option<ConfigError>) {
        match path.map(Self::load_from_file) {
            Some(Ok(file_config)) => (file_config, None),
            Some(Err(e)) => (Self::default(), Some(e)),
            None => (Self::default(), None),
        }
    }

    /// Load configuration from a specific file, then apply the environment
    pub fn load_with_file(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load_from_file(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from a specific file path
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.to_path_buf(), e.to_string()))?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Find configuration file in standard locations
    fn find_config_file() -> Option<PathBuf> {
        let paths = [
            std::env::var("SHERLOCK_CONFIG").ok().map(PathBuf::from),
            Some(PathBuf::from("/etc/sherlock/config.toml")),
            Some(PathBuf::from("./sherlock.toml")),
        ];

        paths.into_iter().flatten().find(|p| p.exists())
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from a variable lookup such as `std::env::var`
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        // Druid
        if let Some(brokers) = lookup("SHERLOCK_VALID_DRUID_BROKERS") {
            self.druid.valid_brokers = brokers
                .split(',')
                .map(str::trim)
                .filter(|b| !b.is_empty())
                .map(String::from)
                .collect();
        }
        if let Some(timeout) = lookup("SHERLOCK_PROBE_TIMEOUT_MS") {
            if let Ok(timeout) = timeout.parse() {
                self.druid.probe_timeout_ms = timeout;
            }
        }

        // Logging
        if let Some(level) = lookup("SHERLOCK_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(dir) = lookup("SHERLOCK_LOG_DIR") {
            self.logging.log_dir = Some(PathBuf::from(dir));
        }
        if let Some(json) = lookup("SHERLOCK_LOG_JSON") {
            if let Ok(json) = json.parse() {
                self.logging.json_format = json;
            }
        }
    }

    /// Generate a sample configuration file
    pub fn generate_sample() -> String {
        let mut config = Self::default();
        config.druid.valid_brokers = vec!["localhost:8082".to_string()];
        toml::to_string_pretty(&config).unwrap_or_default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.druid.probe_timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "Probe timeout cannot be 0".to_string(),
            ));
        }

        for broker in &self.druid.valid_brokers {
            let valid = match broker.rsplit_once(':') {
                Some((host, port)) => {
                    !host.is_empty() && !host.contains(['/', ':']) && port.parse::<u16>().is_ok()
                }
                None => false,
            };
            if !valid {
                return Err(ConfigError::Validation(format!(
                    "Invalid broker '{}', expected host:port",
                    broker
                )));
            }
        }

        Ok(())
    }

    /// The configured broker allow-list
    pub fn allow_list(&self) -> BrokerAllowList {
        self.druid.valid_brokers.iter().cloned().collect()
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.druid.probe_timeout_ms)
    }
}

/// Configuration errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read configuration file
    #[error("Failed to read config file {0:?}: {1}")]
    FileRead(PathBuf, String),
    /// Failed to parse configuration
    #[error("Failed to parse config: {0}")]
    Parse(String),
    /// Configuration validation failed
    #[error("Config validation failed: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = SherlockConfig::default();
        assert!(config.druid.valid_brokers.is_empty());
        assert_eq!(config.probe_timeout(), Duration::from_secs(5));
        assert_eq!(config.logging.level, "info");
        assert!(config.logging.log_dir.is_none());
        assert!(config.allow_list().is_empty());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[druid]
valid_brokers = ["bkr123.p1.abc.com:4443", "localhost:1234"]
probe_timeout_ms = 250

[logging]
level = "debug"
"#
        )
        .unwrap();

        let config = SherlockConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.druid.valid_brokers.len(), 2);
        assert_eq!(config.probe_timeout(), Duration::from_millis(250));
        assert_eq!(config.logging.level, "debug");
        assert!(!config.logging.json_format);

        let allowed = config.allow_list();
        assert!(allowed.contains_key("bkr123.p1.abc.com:4443"));
        assert!(!allowed.contains_key("bkr123.p2.abc.com:4443"));
    }

    #[test]
    fn test_load_missing_file() {
        let result = SherlockConfig::load_from_file(Path::new("/nonexistent/sherlock.toml"));
        assert!(matches!(result, Err(ConfigError::FileRead(_, _))));
    }

    #[test]
    fn test_load_malformed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[druid\nvalid_brokers = 3").unwrap();
        let result = SherlockConfig::load_from_file(file.path());
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_malformed_discovered_file_is_reported() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[druid\nvalid_brokers = [\"localhost:1234\"]").unwrap();

        let (config, skipped) = SherlockConfig::load_discovered(Some(file.path()));
        assert_eq!(config, SherlockConfig::default());
        match skipped {
            Some(ConfigError::Parse(msg)) => assert!(!msg.is_empty()),
            other => panic!("Expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_unreadable_discovered_file_is_reported() {
        let (config, skipped) =
            SherlockConfig::load_discovered(Some(Path::new("/nonexistent/sherlock.toml")));
        assert_eq!(config, SherlockConfig::default());
        assert!(matches!(skipped, Some(ConfigError::FileRead(_, _))));
    }

    #[test]
    fn test_no_discovered_file_uses_defaults() {
        let (config, skipped) = SherlockConfig::load_discovered(None);
        assert_eq!(config, SherlockConfig::default());
        assert!(skipped.is_none());
    }

    #[test]
    fn test_discovered_file_loads() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[druid]\nvalid_brokers = [\"localhost:1234\"]").unwrap();

        let (config, skipped) = SherlockConfig::load_discovered(Some(file.path()));
        assert!(skipped.is_none());
        assert_eq!(config.druid.valid_brokers, vec!["localhost:1234"]);
    }

    #[test]
    fn test_env_overrides_file_values() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[druid]
valid_brokers = ["bkr123.p1.abc.com:4443"]
probe_timeout_ms = 250

[logging]
level = "debug"
"#
        )
        .unwrap();

        let mut config = SherlockConfig::load_from_file(file.path()).unwrap();
        config.apply_overrides(lookup_from(&[(
            "SHERLOCK_VALID_DRUID_BROKERS",
            "broker1.cluster2.com:4080",
        )]));

        assert_eq!(config.druid.valid_brokers, vec!["broker1.cluster2.com:4080"]);
        assert_eq!(config.probe_timeout(), Duration::from_millis(250));
        assert_eq!(config.logging.level, "debug");

        let allowed = config.allow_list();
        assert!(allowed.contains_key("broker1.cluster2.com:4080"));
        assert!(!allowed.contains_key("bkr123.p1.abc.com:4443"));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = SherlockConfig::default();
        config.apply_overrides(lookup_from(&[
            ("SHERLOCK_VALID_DRUID_BROKERS", " broker1.cluster2.com:4080, ,localhost:1234"),
            ("SHERLOCK_PROBE_TIMEOUT_MS", "1500"),
            ("SHERLOCK_LOG_LEVEL", "warn"),
            ("SHERLOCK_LOG_DIR", "/var/log/sherlock"),
            ("SHERLOCK_LOG_JSON", "true"),
        ]));

        assert_eq!(
            config.druid.valid_brokers,
            vec!["broker1.cluster2.com:4080", "localhost:1234"]
        );
        assert_eq!(config.druid.probe_timeout_ms, 1500);
        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.logging.log_dir, Some(PathBuf::from("/var/log/sherlock")));
        assert!(config.logging.json_format);
    }

    #[test]
    fn test_unparseable_env_values_are_ignored() {
        let mut config = SherlockConfig::default();
        config.apply_overrides(lookup_from(&[
            ("SHERLOCK_PROBE_TIMEOUT_MS", "soon"),
            ("SHERLOCK_LOG_JSON", "maybe"),
        ]));
        assert_eq!(config.druid.probe_timeout_ms, 5000);
        assert!(!config.logging.json_format);
    }

    #[test]
    fn test_config_validation() {
        let mut config = SherlockConfig::default();
        config.druid.valid_brokers = vec!["localhost:1234".to_string()];
        assert!(config.validate().is_ok());

        config.druid.valid_brokers = vec!["localhost".to_string()];
        assert!(config.validate().is_err());

        config.druid.valid_brokers = vec![":1234".to_string()];
        assert!(config.validate().is_err());

        config.druid.valid_brokers = vec!["localhost:http".to_string()];
        assert!(config.validate().is_err());

        config.druid.valid_brokers = vec!["a:b:8082".to_string()];
        assert!(config.validate().is_err());

        config.druid.valid_brokers = vec!["a/b:8082".to_string()];
        assert!(config.validate().is_err());

        let mut zero_timeout = SherlockConfig::default();
        zero_timeout.druid.probe_timeout_ms = 0;
        assert!(zero_timeout.validate().is_err());
    }

    #[test]
    fn test_generate_sample_config() {
        let sample = SherlockConfig::generate_sample();
        assert!(sample.contains("[druid]"));
        assert!(sample.contains("[logging]"));
        assert!(sample.contains("localhost:8082"));

        let parsed: SherlockConfig = toml::from_str(&sample).unwrap();
        assert!(parsed.validate().is_ok());
    }
}
