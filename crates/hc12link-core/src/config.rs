//! Link configuration
//!
//! [`LinkConfig`] holds everything fixed for the lifetime of one connection:
//! framing bytes, message capacity, checksum mode and the hardware settle
//! times mandated by the HC-12 datasheet. It is stored as pretty-printed JSON.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::protocol::{
    FrameMarkers, BAUD_RATES, DEFAULT_BAUD_RATE, DEFAULT_CMD_RESPONSE_CAPACITY,
    MAX_CHECKSUM_MESSAGE_CAPACITY,
};

/// Errors found while loading or validating a configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Message capacity must be at least 1 byte")]
    ZeroCapacity,

    #[error("Message capacity {capacity} exceeds the {max} bytes allowed in checksum mode")]
    CapacityTooLargeForChecksum { capacity: usize, max: usize },

    #[error("Framing character {0:?} is not ASCII")]
    NonAsciiMarker(char),

    #[error("Framing characters must be distinct: start={start:?}, end={end:?}, delimiter={delim:?}")]
    MarkersNotDistinct { start: char, end: char, delim: char },

    #[error("Command response capacity {0} is too small to hold an acknowledgement")]
    ResponseCapacityTooSmall(usize),

    #[error("Unsupported baud rate: {0}")]
    UnsupportedBaudRate(u32),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Hardware settle times in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Wait after pulling SET low before sending a command
    pub set_low_ms: u32,
    /// Wait after pulling SET high before sending data
    pub set_high_ms: u32,
    /// Wait after sending a command before reading the response
    pub cmd_ms: u32,
    /// Wait around every speed change while probing
    pub probe_settle_ms: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        // Values from the HC-12 v2.4 datasheet
        Self {
            set_low_ms: 50,
            set_high_ms: 90,
            cmd_ms: 100,
            probe_settle_ms: 500,
        }
    }
}

/// Configuration of one HC-12 link
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// Serial port name (e.g., "/dev/ttyUSB0" or "COM3")
    pub port_name: String,
    /// Speed the link is opened at
    pub baud_rate: u32,
    /// Payload width of every frame
    pub message_capacity: usize,
    /// Append a checksum to every frame
    pub use_checksum: bool,
    /// Minimum spacing between sent messages.
    /// Some transmission modes of the module need a gap between packets.
    pub transfer_delay_ms: u32,
    /// Start-of-frame character
    pub start_marker: char,
    /// End-of-frame character
    pub end_marker: char,
    /// Payload/checksum separator
    pub checksum_delim: char,
    /// Size of the AT command response buffer
    pub cmd_response_capacity: usize,
    /// Hardware settle times
    pub timing: TimingConfig,
}

impl Default for LinkConfig {
    fn default() -> Self {
        let markers = FrameMarkers::default();
        Self {
            port_name: String::new(),
            baud_rate: DEFAULT_BAUD_RATE,
            message_capacity: 32,
            use_checksum: false,
            transfer_delay_ms: 0,
            start_marker: markers.start as char,
            end_marker: markers.end as char,
            checksum_delim: markers.checksum_delim as char,
            cmd_response_capacity: DEFAULT_CMD_RESPONSE_CAPACITY,
            timing: TimingConfig::default(),
        }
    }
}

impl LinkConfig {
    /// Create a configuration with the given payload width and defaults elsewhere
    pub fn new(message_capacity: usize) -> Self {
        Self {
            message_capacity,
            ..Default::default()
        }
    }

    /// Load and validate a configuration from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: LinkConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save the configuration as pretty-printed JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Check the configuration for values the protocol cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.message_capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }

        // The payload sum must stay below 65536: 255 * 255 = 65025
        if self.use_checksum && self.message_capacity > MAX_CHECKSUM_MESSAGE_CAPACITY {
            return Err(ConfigError::CapacityTooLargeForChecksum {
                capacity: self.message_capacity,
                max: MAX_CHECKSUM_MESSAGE_CAPACITY,
            });
        }

        for marker in [self.start_marker, self.end_marker, self.checksum_delim] {
            if !marker.is_ascii() {
                return Err(ConfigError::NonAsciiMarker(marker));
            }
        }

        if self.start_marker == self.end_marker
            || self.start_marker == self.checksum_delim
            || self.end_marker == self.checksum_delim
        {
            return Err(ConfigError::MarkersNotDistinct {
                start: self.start_marker,
                end: self.end_marker,
                delim: self.checksum_delim,
            });
        }

        if self.cmd_response_capacity < 2 {
            return Err(ConfigError::ResponseCapacityTooSmall(
                self.cmd_response_capacity,
            ));
        }

        if !BAUD_RATES.contains(&self.baud_rate) {
            return Err(ConfigError::UnsupportedBaudRate(self.baud_rate));
        }

        Ok(())
    }

    /// Framing bytes described by this configuration.
    ///
    /// Only meaningful after [`validate`](Self::validate) has accepted the
    /// markers as ASCII.
    pub fn markers(&self) -> FrameMarkers {
        FrameMarkers {
            start: self.start_marker as u8,
            end: self.end_marker as u8,
            checksum_delim: self.checksum_delim as u8,
        }
    }
}
