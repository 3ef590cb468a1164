//! Link controller
//!
//! Owns the transport, the SET line and the clock for one physical connection
//! and sequences everything that touches them: AT commands in command mode,
//! message sends with inter-message spacing, and non-blocking receive polling.

use std::borrow::Cow;
use tracing::{debug, info, trace};

use super::{
    FieldValue, FrameDecoder, FrameEncoder, LinkError, ReceivedFrame, ACK_PREFIX,
};
use crate::config::LinkConfig;
use crate::hal::{elapsed_ms, Clock, ModeLine, Transport};

/// Response to an AT command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResponse {
    /// Bytes received before the transport went idle or the buffer filled
    pub bytes: Vec<u8>,
    /// The buffer filled while more bytes were pending; the content must not
    /// be trusted
    pub overflow: bool,
}

impl CommandResponse {
    /// Whether the module acknowledged the command
    pub fn is_ack(&self) -> bool {
        !self.overflow && self.bytes.starts_with(ACK_PREFIX)
    }

    /// Response as text, trimmed of the trailing line break
    pub fn text(&self) -> Cow<'_, str> {
        match String::from_utf8_lossy(&self.bytes) {
            Cow::Borrowed(s) => Cow::Borrowed(s.trim_end()),
            Cow::Owned(s) => Cow::Owned(s.trim_end().to_string()),
        }
    }
}

/// HC-12 link controller
pub struct Hc12Link<T, M, C> {
    transport: T,
    mode_line: M,
    clock: C,
    config: LinkConfig,
    encoder: FrameEncoder,
    decoder: FrameDecoder,
    /// Transport opened by `begin`
    started: bool,
    /// Speed the transport currently runs at
    baud_rate: u32,
    /// A frame write is in progress
    sending: bool,
    /// When the last frame write finished
    last_send_ms: Option<u32>,
    /// Receive polling enabled
    receiving: bool,
}

impl<T: Transport, M: ModeLine, C: Clock> Hc12Link<T, M, C> {
    /// Create a link. The configuration is validated; the transport is not
    /// opened until [`begin`](Self::begin).
    pub fn new(
        transport: T,
        mode_line: M,
        clock: C,
        config: LinkConfig,
    ) -> Result<Self, LinkError> {
        config.validate()?;
        let markers = config.markers();
        Ok(Self {
            transport,
            mode_line,
            clock,
            encoder: FrameEncoder::new(markers, config.message_capacity, config.use_checksum),
            decoder: FrameDecoder::new(markers, config.message_capacity, config.use_checksum),
            started: false,
            baud_rate: config.baud_rate,
            sending: false,
            last_send_ms: None,
            receiving: true,
            config,
        })
    }

    /// Open the transport at the configured speed and put the module in data mode
    pub fn begin(&mut self) -> Result<(), LinkError> {
        info!("Starting HC-12 link at {} baud", self.config.baud_rate);
        self.transport.open(self.config.baud_rate)?;
        self.started = true;
        self.baud_rate = self.config.baud_rate;
        self.mode_line.set_high()?;
        self.clock.delay_ms(self.config.timing.set_high_ms);
        Ok(())
    }

    /// Close the transport
    pub fn end(&mut self) -> Result<(), LinkError> {
        self.transport.close()?;
        self.started = false;
        Ok(())
    }

    /// Whether [`begin`](Self::begin) has opened the transport
    pub fn is_started(&self) -> bool {
        self.started
    }

    fn ensure_started(&self) -> Result<(), LinkError> {
        if self.started {
            Ok(())
        } else {
            Err(LinkError::NotStarted)
        }
    }

    /// Send an AT command in command mode and collect the response.
    ///
    /// SET is pulled low for the duration of the command and always restored
    /// high, even when the transport fails mid-command.
    pub fn send_command(&mut self, command: &str) -> Result<CommandResponse, LinkError> {
        self.ensure_started()?;
        let timing = self.config.timing;

        self.mode_line.set_low()?;
        self.clock.delay_ms(timing.set_low_ms);

        let exchanged = self.exchange_command(command, timing.cmd_ms);

        // SET goes back high even when the exchange failed; the exchange
        // error is reported first
        let restored = self.mode_line.set_high();
        self.clock.delay_ms(timing.set_high_ms);

        let response = exchanged?;
        restored?;
        debug!(
            command,
            response = %response.text(),
            overflow = response.overflow,
            baud_rate = self.baud_rate,
            "AT command"
        );
        Ok(response)
    }

    fn exchange_command(&mut self, command: &str, cmd_ms: u32) -> Result<CommandResponse, LinkError> {
        self.transport.write(command.as_bytes())?;
        self.clock.delay_ms(cmd_ms);

        let capacity = self.config.cmd_response_capacity;
        let mut bytes = Vec::with_capacity(capacity);
        while bytes.len() < capacity && self.transport.bytes_available()? {
            match self.transport.read_byte()? {
                Some(b) => bytes.push(b),
                None => break,
            }
        }

        let overflow = bytes.len() == capacity && self.transport.bytes_available()?;
        Ok(CommandResponse { bytes, overflow })
    }

    /// Format, frame and write one message
    pub fn send<V: FieldValue + ?Sized>(&mut self, value: &V) -> Result<(), LinkError> {
        self.ensure_started()?;
        let frame = self.encoder.encode(value);

        self.sending = true;
        let written = self.transport.write(&frame);
        self.sending = false;
        written?;

        self.last_send_ms = Some(self.clock.now_millis());
        trace!(frame = %String::from_utf8_lossy(&frame), "frame sent");
        Ok(())
    }

    /// Whether a new message may be sent: no write in progress and at least
    /// `transfer_delay_ms` since the previous one finished
    pub fn is_ready_to_send(&self) -> bool {
        if self.sending {
            return false;
        }
        match self.last_send_ms {
            Some(last) => {
                elapsed_ms(self.clock.now_millis(), last) >= self.config.transfer_delay_ms
            }
            None => true,
        }
    }

    /// Change the minimum spacing between sent messages
    pub fn set_transfer_delay(&mut self, transfer_delay_ms: u32) {
        self.config.transfer_delay_ms = transfer_delay_ms;
    }

    /// Move available transport bytes into the decoder without blocking.
    ///
    /// Reading stops once a frame is complete; later bytes stay in the
    /// transport until the consumer re-arms. Returns whether a frame is ready.
    pub fn poll_receive(&mut self) -> Result<bool, LinkError> {
        self.ensure_started()?;
        if !self.receiving {
            return Ok(self.decoder.is_frame_ready());
        }

        while !self.decoder.is_frame_ready() && self.transport.bytes_available()? {
            match self.transport.read_byte()? {
                Some(b) => {
                    self.decoder.push(b);
                }
                None => break,
            }
        }
        Ok(self.decoder.is_frame_ready())
    }

    /// Whether a received frame is waiting
    pub fn data_is_ready(&self) -> bool {
        self.decoder.is_frame_ready()
    }

    /// Payload of the received frame
    pub fn received_payload(&self) -> &[u8] {
        self.decoder.payload()
    }

    /// Checksum verdict of the received frame
    pub fn checksum_ok(&self) -> bool {
        self.decoder.checksum_ok()
    }

    /// Detach the received frame, if any, and re-arm the receiver
    pub fn take_frame(&mut self) -> Option<ReceivedFrame> {
        self.decoder.take_frame()
    }

    /// Clear receive buffers and resume receiving
    pub fn set_ready_to_receive(&mut self) {
        self.decoder.rearm();
        self.receiving = true;
    }

    /// Stop reading from the transport until
    /// [`set_ready_to_receive`](Self::set_ready_to_receive)
    pub fn set_not_ready_to_receive(&mut self) {
        self.receiving = false;
    }

    /// Whether receive polling is enabled
    pub fn is_receiving(&self) -> bool {
        self.receiving
    }

    /// Switch the transport to another speed, opening it if needed
    pub(crate) fn switch_baud(&mut self, baud_rate: u32) -> Result<(), LinkError> {
        if self.started {
            self.transport.reconfigure(baud_rate)?;
        } else {
            self.transport.open(baud_rate)?;
            self.started = true;
        }
        self.baud_rate = baud_rate;
        Ok(())
    }

    /// Make `baud_rate` the speed used by future `begin` calls
    pub(crate) fn set_configured_baud(&mut self, baud_rate: u32) {
        self.config.baud_rate = baud_rate;
    }

    /// Block for a settle time
    pub(crate) fn settle(&mut self, ms: u32) {
        self.clock.delay_ms(ms);
    }

    /// Speed the transport currently runs at
    pub fn baud_rate(&self) -> u32 {
        self.baud_rate
    }

    /// Active configuration
    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    /// Receive state machine
    pub fn decoder(&self) -> &FrameDecoder {
        &self.decoder
    }

    /// Frame encoder
    pub fn encoder(&self) -> &FrameEncoder {
        &self.encoder
    }

    /// Transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Transport, mutably
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Mode line
    pub fn mode_line(&self) -> &M {
        &self.mode_line
    }

    /// Mode line, mutably
    pub fn mode_line_mut(&mut self) -> &mut M {
        &mut self.mode_line
    }

    /// Clock
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Clock, mutably
    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    /// Take the collaborators back
    pub fn into_parts(self) -> (T, M, C) {
        (self.transport, self.mode_line, self.clock)
    }
}
