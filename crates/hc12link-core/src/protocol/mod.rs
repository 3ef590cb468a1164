//! HC-12 link protocol
//!
//! Implements the framed message protocol spoken over an HC-12 transceiver and
//! the AT command sub-protocol used to configure the module.
//!
//! Frames look like `<payload>` or, with checksum mode enabled,
//! `<payload,ccccc>` where `ccccc` is a five character decimal checksum.

pub mod checksum;
mod decoder;
mod error;
pub mod field;
mod frame;
mod link;
mod prober;
mod shared;

pub use decoder::{DecoderState, FrameDecoder, ReceivedFrame};
pub use error::LinkError;
pub use field::{format_field, Alignment, FieldValue};
pub use frame::{FrameEncoder, FrameMarkers};
pub use link::{CommandResponse, Hc12Link};
pub use prober::{BaudProber, DetectOutcome, ProbeOutcome, SetSpeedOutcome};
pub use shared::SharedDecoder;

/// Default start-of-frame marker
pub const DEFAULT_START_MARKER: u8 = b'<';

/// Default end-of-frame marker
pub const DEFAULT_END_MARKER: u8 = b'>';

/// Default delimiter between payload and checksum
pub const DEFAULT_CHECKSUM_DELIM: u8 = b',';

/// Width of the rendered checksum field.
/// A u16 checksum never needs more than 5 decimal digits.
pub const CHECKSUM_WIDTH: usize = 5;

/// Largest message capacity accepted when checksum mode is enabled
pub const MAX_CHECKSUM_MESSAGE_CAPACITY: usize = 255;

/// Every link speed the HC-12 module supports, probed lowest first
pub const BAUD_RATES: [u32; 8] = [1200, 2400, 4800, 9600, 19200, 38400, 57600, 115200];

/// Factory default speed of the module
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Default size of the AT command response buffer
pub const DEFAULT_CMD_RESPONSE_CAPACITY: usize = 20;

/// Prefix the module answers with when it accepts a command
pub const ACK_PREFIX: &[u8] = b"OK";

/// Inert command used to check whether the module is listening
pub const PROBE_COMMAND: &str = "AT";

/// Command restoring the module's factory settings
pub const RESET_DEFAULT_COMMAND: &str = "AT+DEFAULT";

/// Build the AT command that changes the module's link speed
pub fn set_baud_command(baud_rate: u32) -> String {
    format!("AT+B{}", baud_rate)
}
