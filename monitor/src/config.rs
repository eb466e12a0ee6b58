//! Monitor configuration, loaded from YAML.

use inputhook_core::HookConfig;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "monitor.yaml";

/// Longest allowed gap between polls. Windows removes low-level hooks whose
/// thread stops pumping messages for longer than `LowLevelHooksTimeout`.
pub const MAX_POLL_INTERVAL_MS: u64 = 50;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub hook: HookConfig,
    /// Sleep between polls, 1..=[`MAX_POLL_INTERVAL_MS`].
    pub poll_interval_ms: u64,
    /// Info-level logging plus a daily log file.
    pub production: bool,
    /// Where the daily log file goes; defaults to `<config_dir>/logs`.
    pub log_directory: Option<PathBuf>,
    pub show_mouse: bool,
    pub show_wheel: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            hook: HookConfig::default(),
            poll_interval_ms: 16,
            production: false,
            log_directory: None,
            show_mouse: true,
            show_wheel: true,
        }
    }
}

impl MonitorConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if !(1..=MAX_POLL_INTERVAL_MS).contains(&self.poll_interval_ms) {
            anyhow::bail!(
                "poll_interval_ms must be between 1 and {} (got {})",
                MAX_POLL_INTERVAL_MS,
                self.poll_interval_ms
            );
        }
        self.hook.validate()?;
        Ok(())
    }

    pub fn log_dir(&self) -> PathBuf {
        self.log_directory
            .clone()
            .unwrap_or_else(|| config_dir().join("logs"))
    }
}

/// Platform-specific configuration directory.
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("inputhook")
}

pub fn default_config_path() -> PathBuf {
    config_dir().join(CONFIG_FILE)
}

/// Load a YAML file from disk.
pub fn load_yaml<T: DeserializeOwned>(path: impl AsRef<Path>) -> anyhow::Result<T> {
    let content = std::fs::read_to_string(path)?;
    let config: T = serde_yaml::from_str(&content)?;
    Ok(config)
}

/// Outcome of [`load`], reported once logging is up.
#[derive(Debug)]
pub enum LoadOutcome {
    Loaded(PathBuf),
    Missing(PathBuf),
    Invalid(PathBuf, String),
}

/// Load from `explicit` or the default location. A missing or broken file
/// yields defaults; the outcome says which happened.
pub fn load(explicit: Option<PathBuf>) -> (MonitorConfig, LoadOutcome) {
    let path = explicit.unwrap_or_else(default_config_path);
    if !path.exists() {
        return (MonitorConfig::default(), LoadOutcome::Missing(path));
    }
    match load_yaml::<MonitorConfig>(&path) {
        Ok(config) => (config, LoadOutcome::Loaded(path)),
        Err(e) => (MonitorConfig::default(), LoadOutcome::Invalid(path, e.to_string())),
    }
}

impl LoadOutcome {
    pub fn report(&self) {
        match self {
            Self::Loaded(path) => tracing::info!("Loaded monitor config from {:?}", path),
            Self::Missing(path) => tracing::debug!("No config at {:?}, using defaults", path),
            Self::Invalid(path, e) => {
                tracing::warn!("Failed to parse {:?}: {}, using defaults", path, e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_file(name: &str, content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "inputhook-monitor-{}-{}",
            std::process::id(),
            name
        ));
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let path = temp_file(
            "partial.yaml",
            "poll_interval_ms: 50\nhook:\n  capture_mouse: false\n",
        );
        let (config, outcome) = load(Some(path.clone()));
        std::fs::remove_file(&path).unwrap();

        assert!(matches!(outcome, LoadOutcome::Loaded(_)));
        assert_eq!(config.poll_interval_ms, 50);
        assert!(!config.hook.capture_mouse);
        assert!(config.hook.capture_keyboard);
        assert!(config.show_wheel);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let path = std::env::temp_dir().join("inputhook-monitor-does-not-exist.yaml");
        let (config, outcome) = load(Some(path));
        assert!(matches!(outcome, LoadOutcome::Missing(_)));
        assert_eq!(config, MonitorConfig::default());
    }

    #[test]
    fn test_invalid_file_uses_defaults() {
        let path = temp_file("invalid.yaml", "poll_interval_ms: [not, a, number]\n");
        let (config, outcome) = load(Some(path.clone()));
        std::fs::remove_file(&path).unwrap();

        assert!(matches!(outcome, LoadOutcome::Invalid(_, _)));
        assert_eq!(config, MonitorConfig::default());
    }

    #[test]
    fn test_poll_interval_bounds() {
        assert!(MonitorConfig::default().validate().is_ok());

        let slow = MonitorConfig {
            poll_interval_ms: 1000,
            ..MonitorConfig::default()
        };
        let err = slow.validate().unwrap_err();
        assert!(err.to_string().contains("poll_interval_ms"));

        let zero = MonitorConfig {
            poll_interval_ms: 0,
            ..MonitorConfig::default()
        };
        assert!(zero.validate().is_err());

        let edge = MonitorConfig {
            poll_interval_ms: MAX_POLL_INTERVAL_MS,
            ..MonitorConfig::default()
        };
        assert!(edge.validate().is_ok());
    }

    #[test]
    fn test_validate_checks_hook_config() {
        let config = MonitorConfig {
            hook: HookConfig {
                capture_keyboard: false,
                capture_mouse: false,
                ..HookConfig::default()
            },
            ..MonitorConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_explicit_log_directory() {
        let config = MonitorConfig {
            log_directory: Some(PathBuf::from("/tmp/inputhook-logs")),
            ..MonitorConfig::default()
        };
        assert_eq!(config.log_dir(), PathBuf::from("/tmp/inputhook-logs"));
        assert!(MonitorConfig::default().log_dir().ends_with("logs"));
    }
}
