//! Incremental frame decoding
//!
//! [`FrameDecoder`] consumes one byte at a time and never blocks. Marker bytes
//! always win over accumulation, so an interrupted frame is abandoned as soon
//! as the next start marker arrives.
//!
//! Once a frame is complete the decoder is receive-locked: every further byte,
//! start markers included, is dropped until the consumer calls
//! [`FrameDecoder::rearm`] or [`FrameDecoder::take_frame`].

use super::{checksum, FrameMarkers, CHECKSUM_WIDTH};

/// Decoder state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoderState {
    /// Waiting for a start marker
    Idle,
    /// Accumulating payload bytes
    ReadingPayload,
    /// Accumulating checksum digits
    ReadingChecksum,
    /// A frame is ready; input is dropped until re-armed
    FrameComplete,
}

/// A completed frame detached from the decoder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedFrame {
    /// Received payload bytes
    pub payload: Vec<u8>,
    /// Checksum verdict (always true without checksum mode)
    pub checksum_ok: bool,
    /// Bytes were discarded because a field overflowed
    pub truncated: bool,
}

/// Incremental receive state machine
#[derive(Debug, Clone)]
pub struct FrameDecoder {
    markers: FrameMarkers,
    use_checksum: bool,
    message_capacity: usize,
    payload: Vec<u8>,
    checksum: [u8; CHECKSUM_WIDTH],
    checksum_len: usize,
    state: DecoderState,
    truncated: bool,
}

impl FrameDecoder {
    /// Create a decoder for frames of the given payload capacity
    pub fn new(markers: FrameMarkers, message_capacity: usize, use_checksum: bool) -> Self {
        Self {
            markers,
            use_checksum,
            message_capacity,
            payload: Vec::with_capacity(message_capacity),
            checksum: [b' '; CHECKSUM_WIDTH],
            checksum_len: 0,
            state: DecoderState::Idle,
            truncated: false,
        }
    }

    /// Feed one byte and return the resulting state
    pub fn push(&mut self, byte: u8) -> DecoderState {
        if self.state == DecoderState::FrameComplete {
            return self.state;
        }

        if byte == self.markers.start {
            self.clear_buffers();
            self.state = DecoderState::ReadingPayload;
        } else if byte == self.markers.end {
            if self.is_reading() {
                self.state = DecoderState::FrameComplete;
            }
        } else if self.use_checksum && byte == self.markers.checksum_delim {
            if self.state == DecoderState::ReadingPayload {
                self.checksum_len = 0;
                self.state = DecoderState::ReadingChecksum;
            }
        } else {
            self.accumulate(byte);
        }

        self.state
    }

    /// Feed a run of bytes in arrival order
    pub fn feed(&mut self, bytes: &[u8]) -> DecoderState {
        for &byte in bytes {
            self.push(byte);
        }
        self.state
    }

    fn accumulate(&mut self, byte: u8) {
        match self.state {
            DecoderState::ReadingPayload => {
                if self.payload.len() < self.message_capacity {
                    self.payload.push(byte);
                } else {
                    self.truncated = true;
                    // Without a checksum there is nothing left to wait for
                    if !self.use_checksum {
                        self.state = DecoderState::FrameComplete;
                    }
                }
            }
            DecoderState::ReadingChecksum => {
                if self.checksum_len < CHECKSUM_WIDTH {
                    self.checksum[self.checksum_len] = byte;
                    self.checksum_len += 1;
                } else {
                    self.truncated = true;
                    self.state = DecoderState::FrameComplete;
                }
            }
            DecoderState::Idle | DecoderState::FrameComplete => {}
        }
    }

    fn is_reading(&self) -> bool {
        matches!(
            self.state,
            DecoderState::ReadingPayload | DecoderState::ReadingChecksum
        )
    }

    fn clear_buffers(&mut self) {
        self.payload.clear();
        self.checksum = [b' '; CHECKSUM_WIDTH];
        self.checksum_len = 0;
        self.truncated = false;
    }

    /// Current state
    pub fn state(&self) -> DecoderState {
        self.state
    }

    /// Whether a complete frame is waiting for the consumer
    pub fn is_frame_ready(&self) -> bool {
        self.state == DecoderState::FrameComplete
    }

    /// Payload bytes received so far
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Raw checksum digits received so far
    pub fn checksum_field(&self) -> &[u8] {
        &self.checksum[..self.checksum_len]
    }

    /// Parsed checksum, if one was received
    pub fn received_checksum(&self) -> Option<u16> {
        checksum::parse(self.checksum_field())
    }

    /// Whether the payload overflowed its field
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// Whether frames are expected to carry a checksum
    pub fn uses_checksum(&self) -> bool {
        self.use_checksum
    }

    /// Verify the received checksum against the received payload.
    ///
    /// Vacuously true when checksum mode is off. A missing or unparsable
    /// checksum field fails verification.
    pub fn checksum_ok(&self) -> bool {
        if !self.use_checksum {
            return true;
        }
        self.received_checksum()
            .map(|received| checksum::verify(&self.payload, received))
            .unwrap_or(false)
    }

    /// Clear all buffers and return to `Idle`
    pub fn rearm(&mut self) {
        self.clear_buffers();
        self.state = DecoderState::Idle;
    }

    /// Detach the completed frame, if any, and re-arm
    pub fn take_frame(&mut self) -> Option<ReceivedFrame> {
        if !self.is_frame_ready() {
            return None;
        }
        let frame = ReceivedFrame {
            payload: self.payload.clone(),
            checksum_ok: self.checksum_ok(),
            truncated: self.truncated,
        };
        self.rearm();
        Some(frame)
    }
}
