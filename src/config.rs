//! Query configuration
//!
//! Carried by every [`crate::Query`] and handed down through each operator.

use serde::{Deserialize, Serialize};

use crate::observability::{Logger, Severity};

/// What a record source does when a field accessor cannot produce a value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingFieldPolicy {
    /// Fail the element with `RECORD_MISSING_FIELD`
    Fail,
    /// Log a warning and store `null` in the cell
    WarnAndNull,
}

/// Configuration shared by a query pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Policy for unreadable fields (default: fail)
    #[serde(default = "default_missing_field")]
    pub missing_field: MissingFieldPolicy,

    /// Minimum severity that is written to the log (default: WARN)
    #[serde(default = "default_log_level")]
    pub log_level: Severity,
}

fn default_missing_field() -> MissingFieldPolicy {
    MissingFieldPolicy::Fail
}

fn default_log_level() -> Severity {
    Severity::Warn
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            missing_field: default_missing_field(),
            log_level: default_log_level(),
        }
    }
}

impl QueryConfig {
    /// Parse a config from JSON; absent keys take their defaults
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn with_missing_field(mut self, policy: MissingFieldPolicy) -> Self {
        self.missing_field = policy;
        self
    }

    pub fn with_log_level(mut self, level: Severity) -> Self {
        self.log_level = level;
        self
    }

    /// Whether an event of this severity passes the threshold
    pub fn enabled(&self, severity: Severity) -> bool {
        severity >= self.log_level
    }

    /// Log an event if it passes the configured threshold
    pub fn log(&self, severity: Severity, event: &str, fields: &[(&str, &str)]) {
        if self.enabled(severity) {
            Logger::log(severity, event, fields);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = QueryConfig::default();
        assert_eq!(config.missing_field, MissingFieldPolicy::Fail);
        assert_eq!(config.log_level, Severity::Warn);
    }

    #[test]
    fn test_from_json_partial() {
        let config = QueryConfig::from_json(r#"{"missing_field": "warn_and_null"}"#).unwrap();
        assert_eq!(config.missing_field, MissingFieldPolicy::WarnAndNull);
        assert_eq!(config.log_level, Severity::Warn);

        let config = QueryConfig::from_json("{}").unwrap();
        assert_eq!(config, QueryConfig::default());
    }

    #[test]
    fn test_threshold() {
        let config = QueryConfig::default().with_log_level(Severity::Info);
        assert!(!config.enabled(Severity::Trace));
        assert!(config.enabled(Severity::Info));
        assert!(config.enabled(Severity::Error));
    }
}
