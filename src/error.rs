use std::time::Duration;
use thiserror::Error;

/// Failure of a remote command sent over a `CommandBus`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("rejected by remote: {0}")]
    Rejected(String),
    #[error("no reply within {0:?}")]
    Timeout(Duration),
    #[error("link disconnected")]
    Disconnected,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PanelError {
    #[error("breaker index {0} out of range (expected 0..=2)")]
    InvalidBreaker(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("digital outputs entry has no `Raw Byte` value")]
    MissingRawByte,
    #[error("`Raw Byte` value {0:?} is not a non-negative integer")]
    InvalidRawByte(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    #[error("COBS decoding failed")]
    Cobs,
    #[error("frame too short ({0} bytes)")]
    TooShort(usize),
    #[error("CRC mismatch: expected {expected:#010x}, got {actual:#010x}")]
    Crc { expected: u32, actual: u32 },
}

#[derive(Debug, Error)]
pub enum LinkError {
    #[error("serial port error: {0}")]
    Serial(#[from] serialport::Error),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed frame: {0}")]
    Frame(#[from] FrameError),
    #[error("malformed message: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

impl From<LinkError> for CommandError {
    fn from(err: LinkError) -> Self {
        CommandError::Transport(err.to_string())
    }
}
