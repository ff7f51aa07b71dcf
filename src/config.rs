use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    pub assets: AssetConfig,
    pub topics: TopicConfig,
    /// Undo an optimistic breaker flip when the remote call fails.
    ///
    /// On by default: the local vector is rebuilt from the last confirmed
    /// outputs plus the toggles still in flight, so the next full-state write
    /// cannot carry a flip the base refused. `false` leaves the flipped bit in
    /// place until the next digital outputs report, as older panels did.
    pub rollback_failed_toggles: bool,
    /// Seconds without a report before telemetry counts as stale.
    pub stale_after_secs: u64,
    pub console_capacity: usize,
    /// Unacknowledged alerts kept; the oldest is dropped beyond this.
    pub alert_capacity: usize,
    pub link: LinkConfig,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            assets: AssetConfig::default(),
            topics: TopicConfig::default(),
            rollback_failed_toggles: true,
            stale_after_secs: 5,
            console_capacity: 200,
            alert_capacity: 20,
            link: LinkConfig::default(),
        }
    }
}

/// Icon locations, resolved against `root`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    pub root: PathBuf,
    pub breaker_on_background: String,
    pub breaker_off_background: String,
    pub breaker_glyph: String,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("images"),
            breaker_on_background: "bg-green.svg".into(),
            breaker_off_background: "bg-red.svg".into(),
            breaker_glyph: "ic-breaker.svg".into(),
        }
    }
}

impl AssetConfig {
    pub fn path(&self, file: &str) -> PathBuf {
        self.root.join(file)
    }

    /// Background and glyph for a breaker in the given state.
    pub fn breaker_icon(&self, on: bool) -> [PathBuf; 2] {
        let background = if on {
            &self.breaker_on_background
        } else {
            &self.breaker_off_background
        };
        [self.path(background), self.path(&self.breaker_glyph)]
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TopicConfig {
    pub diagnostics: String,
    pub set_digital_outputs: String,
    pub set_operation_mode: String,
}

impl Default for TopicConfig {
    fn default() -> Self {
        Self {
            diagnostics: "diagnostics_agg".into(),
            set_digital_outputs: "turtlebot_node/set_digital_outputs".into(),
            set_operation_mode: "/turtlebot_node/set_operation_mode".into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    pub port: Option<String>,
    pub baud_rate: u32,
    pub command_timeout_ms: u64,
    /// Fraction of simulated commands that fail, 0.0..=1.0.
    pub sim_failure_rate: f64,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            port: None,
            baud_rate: 115200,
            command_timeout_ms: 3000,
            sim_failure_rate: 0.0,
        }
    }
}

impl LinkConfig {
    pub fn command_timeout(&self) -> Duration {
        Duration::from_millis(self.command_timeout_ms)
    }
}

impl PanelConfig {
    pub fn stale_after(&self) -> Duration {
        Duration::from_secs(self.stale_after_secs)
    }

    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        assert_eq!(PanelConfig::from_toml("").unwrap(), PanelConfig::default());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = PanelConfig::from_toml(
            r#"
            rollback_failed_toggles = false

            [assets]
            root = "/opt/panel/icons"

            [link]
            port = "/dev/ttyUSB0"
            "#,
        )
        .unwrap();
        assert!(!config.rollback_failed_toggles);
        assert_eq!(config.link.port.as_deref(), Some("/dev/ttyUSB0"));
        assert_eq!(config.link.baud_rate, 115200);
        assert_eq!(config.assets.breaker_glyph, "ic-breaker.svg");
        assert_eq!(
            config.assets.breaker_icon(true)[0],
            PathBuf::from("/opt/panel/icons/bg-green.svg")
        );
        assert_eq!(config.topics.diagnostics, "diagnostics_agg");
    }

    #[test]
    fn failed_toggles_roll_back_by_default() {
        let config = PanelConfig::default();
        assert!(config.rollback_failed_toggles);
        assert_eq!(config.alert_capacity, 20);
        assert_eq!(PanelConfig::from_toml("alert_capacity = 3").unwrap().alert_capacity, 3);
    }

    #[test]
    fn invalid_toml_is_an_error() {
        assert!(matches!(
            PanelConfig::from_toml("stale_after_secs = \"soon\""),
            Err(ConfigError::Parse(_))
        ));
    }
}
