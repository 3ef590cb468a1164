//! Hardware abstraction
//!
//! Interfaces to the transport, SET line, clock and diagnostic output, plus
//! the serial port backend and in-memory mocks.

pub mod clock;
pub mod mock;
pub mod serial;
mod sink;
mod traits;

pub use clock::{elapsed_ms, SystemClock};
pub use serial::{list_ports, open_port, PortInfo, RtsModeLine, SerialTransport, UsbDevice};
pub use sink::{RecordingSink, TracingSink};
pub use traits::{Clock, DiagnosticSink, ModeLine, Transport};
