//! Aggregated diagnostics as delivered on `diagnostics_agg`.

use serde::{Deserialize, Serialize};
use std::fmt;

pub const BATTERY_ENTRY: &str = "/Power System/Battery";
pub const LAPTOP_BATTERY_ENTRY: &str = "/Power System/Laptop Battery";
pub const OPERATING_MODE_ENTRY: &str = "/Mode/Operating Mode";
pub const DIGITAL_OUTPUTS_ENTRY: &str = "/Digital IO/Digital Outputs";
pub const RAW_BYTE_KEY: &str = "Raw Byte";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", from = "u8")]
pub enum Level {
    #[default]
    Ok,
    Warn,
    Error,
    Stale,
}

impl From<u8> for Level {
    fn from(raw: u8) -> Self {
        match raw {
            0 => Level::Ok,
            1 => Level::Warn,
            2 => Level::Error,
            _ => Level::Stale,
        }
    }
}

impl From<Level> for u8 {
    fn from(level: Level) -> Self {
        match level {
            Level::Ok => 0,
            Level::Warn => 1,
            Level::Error => 2,
            Level::Stale => 3,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Level::Ok => "OK",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
            Level::Stale => "STALE",
        };
        f.write_str(label)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValue {
    pub key: String,
    pub value: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticStatus {
    #[serde(default)]
    pub level: Level,
    pub name: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub hardware_id: String,
    #[serde(default)]
    pub values: Vec<KeyValue>,
}

impl DiagnosticStatus {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.push(KeyValue {
            key: key.into(),
            value: value.into(),
        });
        self
    }

    /// Last value stored under `key`, since the format allows duplicates.
    pub fn value(&self, key: &str) -> Option<&str> {
        self.values
            .iter()
            .rev()
            .find(|kv| kv.key == key)
            .map(|kv| kv.value.as_str())
    }
}

/// One delivery of the aggregated diagnostics; entry order is preserved.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticReport {
    pub status: Vec<DiagnosticStatus>,
}

impl DiagnosticReport {
    pub fn new(status: Vec<DiagnosticStatus>) -> Self {
        Self { status }
    }

}

/// Most severe level among `statuses`, `None` when there are none.
pub fn worst_level(statuses: &[DiagnosticStatus]) -> Option<Level> {
    statuses.iter().map(|s| s.level).max()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_lookup_prefers_last_duplicate() {
        let status = DiagnosticStatus::new(DIGITAL_OUTPUTS_ENTRY)
            .with_value(RAW_BYTE_KEY, "1")
            .with_value(RAW_BYTE_KEY, "6");
        assert_eq!(status.value(RAW_BYTE_KEY), Some("6"));
        assert_eq!(status.value("missing"), None);
    }

    #[test]
    fn level_serializes_as_number() {
        let status = DiagnosticStatus::new("/Sensors").with_level(Level::Error);
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["level"], 2);

        let back: DiagnosticStatus =
            serde_json::from_str(r#"{"name":"/Sensors","level":7}"#).unwrap();
        assert_eq!(back.level, Level::Stale);
        assert!(back.values.is_empty());
    }

    #[test]
    fn worst_level_of_statuses() {
        let report = DiagnosticReport::new(vec![
            DiagnosticStatus::new("a"),
            DiagnosticStatus::new("b").with_level(Level::Warn),
        ]);
        assert_eq!(worst_level(&report.status), Some(Level::Warn));
        assert_eq!(worst_level(&[]), None);
    }
}
