//! Link errors

use thiserror::Error;

use crate::config::ConfigError;

/// Errors raised by the transport, the mode line, or link setup.
///
/// Protocol-level faults (buffer overflow, checksum mismatch, failed probes)
/// are reported as result values, never as errors.
#[derive(Error, Debug)]
pub enum LinkError {
    #[error("Serial port error: {0}")]
    SerialError(String),

    #[error("Mode line error: {0}")]
    ModeLineError(String),

    #[error("Link not started")]
    NotStarted,

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
