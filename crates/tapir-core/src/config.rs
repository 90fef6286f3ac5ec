//! sandman.toml configuration parser.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{TapirError, TapirResult};
use crate::types::MetricDefinition;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SandmanConfig {
    #[serde(default)]
    pub policy: PolicyConfig,
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default = "default_metrics")]
    pub metrics: Vec<MetricDefinition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Absolute utilization (percent) an instance must exceed.
    pub threshold: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowConfig {
    pub minutes: u64,
    pub period_secs: u64,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self { threshold: 90.0 }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            minutes: 20,
            period_secs: 300,
        }
    }
}

impl WindowConfig {
    /// Saturates instead of overflowing; `validate` rejects such windows.
    pub fn duration(&self) -> Duration {
        Duration::from_secs(self.minutes.saturating_mul(60))
    }

    pub fn period(&self) -> Duration {
        Duration::from_secs(self.period_secs)
    }
}

fn default_metrics() -> Vec<MetricDefinition> {
    vec![MetricDefinition::ec2_cpu()]
}

impl Default for SandmanConfig {
    fn default() -> Self {
        Self {
            policy: PolicyConfig::default(),
            window: WindowConfig::default(),
            metrics: default_metrics(),
        }
    }
}

impl SandmanConfig {
    pub fn from_file(path: &Path) -> TapirResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| TapirError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> TapirResult<Self> {
        let config: SandmanConfig =
            toml::from_str(content).map_err(|e| TapirError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> TapirResult<String> {
        toml::to_string_pretty(self).map_err(|e| TapirError::Config(e.to_string()))
    }

    /// Reject values the decision rule cannot work with.
    pub fn validate(&self) -> TapirResult<()> {
        let threshold = self.policy.threshold;
        if !(0.0..=100.0).contains(&threshold) {
            return Err(TapirError::Config(format!(
                "policy.threshold must be within 0-100, got {threshold}"
            )));
        }
        if self.window.minutes.checked_mul(60).is_none() {
            return Err(TapirError::Config(format!(
                "window.minutes ({}) is too large",
                self.window.minutes
            )));
        }
        if self.window.period_secs == 0 {
            return Err(TapirError::Config("window.period_secs must be positive".into()));
        }
        if self.window.period() > self.window.duration() {
            return Err(TapirError::Config(format!(
                "window.period_secs ({}) exceeds the {} minute window",
                self.window.period_secs, self.window.minutes
            )));
        }
        if self.metrics.is_empty() {
            return Err(TapirError::Config("at least one [[metrics]] entry is required".into()));
        }
        if let Some(m) = self
            .metrics
            .iter()
            .find(|m| m.namespace.is_empty() || m.name.is_empty())
        {
            return Err(TapirError::Config(format!(
                "metric namespace and name must be non-empty (got {m:?})"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_policy() {
        let config = SandmanConfig::default();
        assert_eq!(config.policy.threshold, 90.0);
        assert_eq!(config.window.duration(), Duration::from_secs(20 * 60));
        assert_eq!(config.window.period(), Duration::from_secs(300));
        assert_eq!(config.metrics, vec![MetricDefinition::ec2_cpu()]);
        config.validate().unwrap();
    }

    #[test]
    fn parse_empty_uses_defaults() {
        let config = SandmanConfig::from_toml_str("").unwrap();
        assert_eq!(config, SandmanConfig::default());
    }

    #[test]
    fn parse_full() {
        let toml_str = r#"
[policy]
threshold = 85.0

[window]
minutes = 30
period_secs = 60

[[metrics]]
namespace = "AWS/EC2"
name = "CPUUtilization"

[[metrics]]
namespace = "System/Linux"
name = "MemoryUtilization"
"#;
        let config = SandmanConfig::from_toml_str(toml_str).unwrap();
        assert_eq!(config.policy.threshold, 85.0);
        assert_eq!(config.window.minutes, 30);
        assert_eq!(config.metrics.len(), 2);
        assert_eq!(config.metrics[1].name, "MemoryUtilization");
    }

    #[test]
    fn rejects_out_of_range_threshold() {
        let err = SandmanConfig::from_toml_str("[policy]\nthreshold = 120.0\n").unwrap_err();
        assert!(err.to_string().contains("threshold"));
    }

    #[test]
    fn rejects_period_longer_than_window() {
        let err =
            SandmanConfig::from_toml_str("[window]\nminutes = 1\nperiod_secs = 300\n").unwrap_err();
        assert!(matches!(err, TapirError::Config(_)));
    }

    #[test]
    fn rejects_window_too_large_to_represent() {
        let err = SandmanConfig::from_toml_str(
            "[window]\nminutes = 9223372036854775807\nperiod_secs = 300\n",
        )
        .unwrap_err();
        assert!(matches!(err, TapirError::Config(ref msg) if msg.contains("window.minutes")));
    }

    #[test]
    fn oversized_window_duration_saturates() {
        let window = WindowConfig {
            minutes: u64::MAX,
            period_secs: 300,
        };
        assert_eq!(window.duration(), Duration::from_secs(u64::MAX));
    }

    #[test]
    fn rejects_empty_metric_list() {
        let config = SandmanConfig {
            metrics: Vec::new(),
            ..SandmanConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn round_trips_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sandman.toml");
        let config = SandmanConfig::default();
        std::fs::write(&path, config.to_toml_string().unwrap()).unwrap();

        let loaded = SandmanConfig::from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn missing_file_is_config_error() {
        let err = SandmanConfig::from_file(Path::new("/nonexistent/sandman.toml")).unwrap_err();
        assert!(matches!(err, TapirError::Config(_)));
    }
}
