// Error types for the viewer.
// Only `CaptureError::DeviceUnavailable` ends a session early; everything
// else is absorbed where it happens and turned into a log line.
use std::path::PathBuf;
use thiserror::Error;

/// Fatal failure to acquire the image sensor.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// The device could not be opened (busy, absent, permission denied).
    #[error("camera {index} unavailable: {reason}")]
    DeviceUnavailable { index: u32, reason: String },
}

/// Transient failure to obtain a frame on one tick. The render loop retries
/// on the next tick.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CaptureMiss {
    #[error("no frame available: {0}")]
    NoFrame(String),
    #[error("frame could not be decoded: {0}")]
    Decode(String),
    #[error("device returned a zero-sized frame")]
    EmptyFrame,
    #[error("capture handle already released")]
    Released,
}

/// Errors from loading `config.toml`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config file '{}': {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Crate-level error. Every variant states *where* things went wrong.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Capture(#[from] CaptureError),
    #[error("window init error: {0}")]
    WindowInit(String),
    #[error("window update error: {0}")]
    WindowUpdate(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("shutdown command '{command}' failed: {reason}")]
    ShutdownInvocation { command: String, reason: String },
    #[error("failed to query cameras: {0}")]
    DeviceQuery(String),
}
