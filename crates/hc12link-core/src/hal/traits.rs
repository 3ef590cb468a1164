//! Hardware collaborator interfaces
//!
//! The link controller does not talk to hardware directly. It drives these
//! traits, which are implemented by the serial backend for real use and by
//! the [`mock`](super::mock) module for tests.

use crate::protocol::LinkError;

/// Byte-stream transport to the HC-12 module
///
/// # Invariants
///
/// - Only one link owns a transport at a time
/// - Bytes are delivered in arrival order
pub trait Transport {
    /// Open the transport at the given speed
    fn open(&mut self, baud_rate: u32) -> Result<(), LinkError>;

    /// Close the transport. Closing an already closed transport is a no-op.
    fn close(&mut self) -> Result<(), LinkError>;

    /// Write all bytes
    fn write(&mut self, data: &[u8]) -> Result<(), LinkError>;

    /// Whether at least one received byte can be read without blocking
    fn bytes_available(&mut self) -> Result<bool, LinkError>;

    /// Read one byte if available, without blocking
    fn read_byte(&mut self) -> Result<Option<u8>, LinkError>;

    /// Change the speed of an open transport
    fn reconfigure(&mut self, baud_rate: u32) -> Result<(), LinkError>;
}

/// The module's SET line.
///
/// Low selects command mode, high selects transparent data mode.
pub trait ModeLine {
    /// Pull SET low (command mode)
    fn set_low(&mut self) -> Result<(), LinkError>;

    /// Pull SET high (data mode)
    fn set_high(&mut self) -> Result<(), LinkError>;
}

/// Monotonic millisecond clock
pub trait Clock {
    /// Milliseconds since an arbitrary origin. Wraps at `u32::MAX`.
    fn now_millis(&self) -> u32;

    /// Block for the given number of milliseconds
    fn delay_ms(&mut self, ms: u32);
}

/// Line-oriented diagnostic output.
///
/// Emitting is best effort and must never block the protocol.
pub trait DiagnosticSink {
    /// Emit one line of diagnostic text
    fn emit(&mut self, line: &str);
}
