//! # hc12link Core Library
//!
//! Framed messaging and module configuration for HC-12 serial transceivers.
//!
//! This library provides:
//! - Fixed-width message framing with an optional 16-bit checksum
//! - An incremental, self-synchronizing frame decoder
//! - AT command exchange through the module's SET line
//! - Baud rate detection, factory reset and safe speed changes
//! - A `serialport` backend and in-memory mocks
//!
//! ## Example
//!
//! ```rust,ignore
//! use hc12link_core::prelude::*;
//!
//! let transport = SerialTransport::new("/dev/ttyUSB0");
//! let mode_line = transport.mode_line();
//! let mut link = Hc12Link::new(transport, mode_line, SystemClock::new(), LinkConfig::new(16))?;
//! link.begin()?;
//!
//! BaudProber::new(&mut link).detect_speed()?;
//!
//! if link.is_ready_to_send() {
//!     link.send("hello")?;
//! }
//! ```

#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod config;
pub mod hal;
pub mod protocol;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{ConfigError, LinkConfig, TimingConfig};
    pub use crate::hal::{
        Clock, DiagnosticSink, ModeLine, SerialTransport, SystemClock, TracingSink, Transport,
    };
    pub use crate::protocol::{
        BaudProber, DetectOutcome, FrameDecoder, FrameEncoder, Hc12Link, LinkError,
        SetSpeedOutcome,
    };
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
