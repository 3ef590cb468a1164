//! In-memory collaborators for testing
//!
//! [`MockTransport`] plays the HC-12 module: replies can be scripted per link
//! speed, so baud probing can be exercised without hardware.
//!
//! # Example
//!
//! ```
//! use hc12link_core::hal::mock::MockTransport;
//! use hc12link_core::hal::Transport;
//!
//! let mut transport = MockTransport::new();
//! transport.respond_at(9600, b"OK\r\n");
//!
//! transport.open(9600).unwrap();
//! transport.write(b"AT").unwrap();
//! assert_eq!(transport.read_byte().unwrap(), Some(b'O'));
//! ```

use std::collections::{HashMap, VecDeque};

use super::{Clock, ModeLine, Transport};
use crate::protocol::LinkError;

type Responder = Box<dyn FnMut(u32, &[u8]) -> Vec<u8> + Send>;

/// Scripted in-memory transport
pub struct MockTransport {
    open: bool,
    baud_rate: u32,
    baud_history: Vec<u32>,
    writes: Vec<Vec<u8>>,
    rx_buffer: VecDeque<u8>,
    responses: HashMap<u32, Vec<u8>>,
    responder: Option<Responder>,
    fail_on_write: bool,
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTransport {
    /// Create a closed transport with no scripted replies
    pub fn new() -> Self {
        Self {
            open: false,
            baud_rate: 0,
            baud_history: Vec::new(),
            writes: Vec::new(),
            rx_buffer: VecDeque::new(),
            responses: HashMap::new(),
            responder: None,
            fail_on_write: false,
        }
    }

    /// Reply with `response` to every write made at `baud_rate`
    pub fn respond_at(&mut self, baud_rate: u32, response: &[u8]) {
        self.responses.insert(baud_rate, response.to_vec());
    }

    /// Compute replies from the current speed and the written bytes.
    /// Takes precedence over [`respond_at`](Self::respond_at).
    pub fn set_responder<F>(&mut self, responder: F)
    where
        F: FnMut(u32, &[u8]) -> Vec<u8> + Send + 'static,
    {
        self.responder = Some(Box::new(responder));
    }

    /// Make every following write fail
    pub fn fail_writes(&mut self, fail: bool) {
        self.fail_on_write = fail;
    }

    /// Inject received data (for test setup)
    pub fn inject_rx_data(&mut self, data: &[u8]) {
        self.rx_buffer.extend(data.iter().copied());
    }

    /// Number of received bytes not yet read
    pub fn pending_rx(&self) -> usize {
        self.rx_buffer.len()
    }

    /// Every write, in order
    pub fn writes(&self) -> &[Vec<u8>] {
        &self.writes
    }

    /// All written bytes concatenated
    pub fn tx_buffer(&self) -> Vec<u8> {
        self.writes.concat()
    }

    /// Speeds set through `open` and `reconfigure`, in order
    pub fn baud_history(&self) -> &[u32] {
        &self.baud_history
    }

    /// Current speed
    pub fn baud_rate(&self) -> u32 {
        self.baud_rate
    }

    /// Whether the transport is open
    pub fn is_open(&self) -> bool {
        self.open
    }
}

impl Transport for MockTransport {
    fn open(&mut self, baud_rate: u32) -> Result<(), LinkError> {
        self.open = true;
        self.baud_rate = baud_rate;
        self.baud_history.push(baud_rate);
        Ok(())
    }

    fn close(&mut self) -> Result<(), LinkError> {
        self.open = false;
        Ok(())
    }

    fn write(&mut self, data: &[u8]) -> Result<(), LinkError> {
        if !self.open {
            return Err(LinkError::NotStarted);
        }
        if self.fail_on_write {
            return Err(LinkError::SerialError("mock write failure".to_string()));
        }
        self.writes.push(data.to_vec());

        let reply = match self.responder.as_mut() {
            Some(responder) => responder(self.baud_rate, data),
            None => self
                .responses
                .get(&self.baud_rate)
                .cloned()
                .unwrap_or_default(),
        };
        self.rx_buffer.extend(reply);
        Ok(())
    }

    fn bytes_available(&mut self) -> Result<bool, LinkError> {
        Ok(self.open && !self.rx_buffer.is_empty())
    }

    fn read_byte(&mut self) -> Result<Option<u8>, LinkError> {
        if !self.open {
            return Ok(None);
        }
        Ok(self.rx_buffer.pop_front())
    }

    fn reconfigure(&mut self, baud_rate: u32) -> Result<(), LinkError> {
        if !self.open {
            return Err(LinkError::NotStarted);
        }
        self.baud_rate = baud_rate;
        self.baud_history.push(baud_rate);
        Ok(())
    }
}

/// Level of the SET line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineLevel {
    /// Command mode
    Low,
    /// Data mode
    High,
}

/// Mode line that records every transition
#[derive(Debug, Default)]
pub struct MockModeLine {
    transitions: Vec<LineLevel>,
    fail_on_high: bool,
}

impl MockModeLine {
    /// Create a line with no recorded transitions
    pub fn new() -> Self {
        Self::default()
    }

    /// Transitions in order
    pub fn transitions(&self) -> &[LineLevel] {
        &self.transitions
    }

    /// Last level set, if any
    pub fn level(&self) -> Option<LineLevel> {
        self.transitions.last().copied()
    }

    /// Make driving the line high fail without changing it
    pub fn fail_set_high(&mut self, fail: bool) {
        self.fail_on_high = fail;
    }
}

impl ModeLine for MockModeLine {
    fn set_low(&mut self) -> Result<(), LinkError> {
        self.transitions.push(LineLevel::Low);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), LinkError> {
        if self.fail_on_high {
            return Err(LinkError::ModeLineError("mock line failure".to_string()));
        }
        self.transitions.push(LineLevel::High);
        Ok(())
    }
}

/// Simulated clock. Delays advance time instantly.
#[derive(Debug, Default)]
pub struct MockClock {
    now_ms: u32,
    delays: Vec<u32>,
}

impl MockClock {
    /// Create a clock at time zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a clock starting at the given time
    pub fn starting_at(now_ms: u32) -> Self {
        Self {
            now_ms,
            delays: Vec::new(),
        }
    }

    /// Move time forward without recording a delay
    pub fn advance(&mut self, ms: u32) {
        self.now_ms = self.now_ms.wrapping_add(ms);
    }

    /// Every delay requested, in order
    pub fn delays(&self) -> &[u32] {
        &self.delays
    }

    /// Sum of all requested delays
    pub fn total_delay_ms(&self) -> u64 {
        self.delays.iter().map(|&d| u64::from(d)).sum()
    }
}

impl Clock for MockClock {
    fn now_millis(&self) -> u32 {
        self.now_ms
    }

    fn delay_ms(&mut self, ms: u32) {
        self.delays.push(ms);
        self.advance(ms);
    }
}
