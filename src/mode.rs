use serde::{Deserialize, Serialize};
use std::fmt;

/// Drive modes the base accepts. Discriminants are the open-interface constants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperatingMode {
    Passive = 1,
    Safe = 2,
    Full = 3,
}

impl OperatingMode {
    /// Menu order.
    pub const ALL: [OperatingMode; 3] = [
        OperatingMode::Full,
        OperatingMode::Passive,
        OperatingMode::Safe,
    ];

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(OperatingMode::Passive),
            2 => Some(OperatingMode::Safe),
            3 => Some(OperatingMode::Full),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            OperatingMode::Full => "Full",
            OperatingMode::Safe => "Safe",
            OperatingMode::Passive => "Passive",
        }
    }
}

impl fmt::Display for OperatingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What the base last reported under `/Mode/Operating Mode`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModeReading {
    pub message: String,
    pub mode: Option<ReportedMode>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReportedMode {
    Off,
    Drive(OperatingMode),
}

impl ModeReading {
    pub fn parse(message: &str) -> Self {
        let lower = message.to_ascii_lowercase();
        let mode = if lower.contains("full") {
            Some(ReportedMode::Drive(OperatingMode::Full))
        } else if lower.contains("safe") {
            Some(ReportedMode::Drive(OperatingMode::Safe))
        } else if lower.contains("passive") {
            Some(ReportedMode::Drive(OperatingMode::Passive))
        } else if lower.contains("off") {
            Some(ReportedMode::Off)
        } else {
            None
        };
        Self {
            message: message.to_string(),
            mode,
        }
    }
}
