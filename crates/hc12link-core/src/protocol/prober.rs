//! Baud rate probing
//!
//! The HC-12 only answers AT commands at its configured speed, which is lost
//! whenever the module is reconfigured and forgotten. [`BaudProber`] walks the
//! candidate speeds lowest first, sends a command at each one and watches for
//! an `OK` acknowledgement.

use tracing::{info, warn};

use super::{
    set_baud_command, CommandResponse, Hc12Link, LinkError, BAUD_RATES, DEFAULT_BAUD_RATE,
    PROBE_COMMAND, RESET_DEFAULT_COMMAND,
};
use crate::config::ConfigError;
use crate::hal::{Clock, DiagnosticSink, ModeLine, TracingSink, Transport};

/// Result of probing one command across the speed table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOutcome {
    /// A speed acknowledged the command
    pub found: bool,
    /// A response overflowed its buffer; probing stopped there
    pub overflow: bool,
    /// Index of the acknowledging (or overflowing) speed, or the table
    /// length if every speed was tried
    pub index: usize,
    /// Last response received
    pub response: Option<CommandResponse>,
}

/// Result of [`BaudProber::detect_speed`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectOutcome {
    /// The module answered at this speed
    Detected(u32),
    /// A response overflowed; another transmitter may be interfering
    BufferFault,
    /// No speed answered
    NotFound,
}

/// Result of [`BaudProber::set_speed_safely`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetSpeedOutcome {
    /// The module accepted the new speed
    Acknowledged {
        /// Module response, e.g. `OK+B19200`
        response: String,
    },
    /// A response overflowed; another transmitter may be interfering
    BufferFault,
    /// The module did not accept the command; detection was run instead
    NotAcknowledged(DetectOutcome),
}

/// Drives a link across every candidate speed
pub struct BaudProber<'a, T, M, C, D = TracingSink> {
    link: &'a mut Hc12Link<T, M, C>,
    sink: D,
    speeds: Vec<u32>,
}

impl<'a, T, M, C> BaudProber<'a, T, M, C, TracingSink>
where
    T: Transport,
    M: ModeLine,
    C: Clock,
{
    /// Create a prober over the full HC-12 speed table reporting through `tracing`
    pub fn new(link: &'a mut Hc12Link<T, M, C>) -> Self {
        Self {
            link,
            sink: TracingSink,
            speeds: BAUD_RATES.to_vec(),
        }
    }
}

impl<'a, T, M, C, D> BaudProber<'a, T, M, C, D>
where
    T: Transport,
    M: ModeLine,
    C: Clock,
    D: DiagnosticSink,
{
    /// Report through another diagnostic sink
    pub fn with_sink<E: DiagnosticSink>(self, sink: E) -> BaudProber<'a, T, M, C, E> {
        BaudProber {
            link: self.link,
            sink,
            speeds: self.speeds,
        }
    }

    /// Probe a custom speed table, in the given order
    pub fn with_speeds(mut self, speeds: &[u32]) -> Self {
        self.speeds = speeds.to_vec();
        self
    }

    /// Speed table being probed
    pub fn speeds(&self) -> &[u32] {
        &self.speeds
    }

    /// Diagnostic sink
    pub fn sink(&self) -> &D {
        &self.sink
    }

    /// Send `command` at each speed until one acknowledges.
    ///
    /// Stops early on the first acknowledgement, and aborts on a response
    /// overflow since the content of later responses could not be trusted
    /// either. The transport is left at the last speed tried.
    pub fn probe(&mut self, command: &str) -> Result<ProbeOutcome, LinkError> {
        let settle_ms = self.link.config().timing.probe_settle_ms;
        let mut last_response = None;

        for (index, &speed) in self.speeds.iter().enumerate() {
            self.link.settle(settle_ms);
            self.link.switch_baud(speed)?;
            self.link.settle(settle_ms);

            let response = self.link.send_command(command)?;
            if response.overflow {
                warn!(command, baud_rate = speed, "command response overflowed while probing");
                return Ok(ProbeOutcome {
                    found: false,
                    overflow: true,
                    index,
                    response: Some(response),
                });
            }

            let found = response.is_ack();
            self.link.settle(settle_ms);
            if found {
                info!(command, baud_rate = speed, "module acknowledged");
                return Ok(ProbeOutcome {
                    found: true,
                    overflow: false,
                    index,
                    response: Some(response),
                });
            }
            last_response = Some(response);
        }

        Ok(ProbeOutcome {
            found: false,
            overflow: false,
            index: self.speeds.len(),
            response: last_response,
        })
    }

    /// Find the speed the module is currently set to
    pub fn detect_speed(&mut self) -> Result<DetectOutcome, LinkError> {
        self.sink.emit("***Detecting baud rate***");
        let outcome = self.probe(PROBE_COMMAND)?;

        let detected = if outcome.overflow {
            self.buffer_overflow_msg();
            DetectOutcome::BufferFault
        } else if outcome.found {
            let speed = self.speeds[outcome.index];
            self.sink.emit(&format!("Detected baud rate at: {}", speed));
            DetectOutcome::Detected(speed)
        } else {
            self.sink.emit("Could not detect baud rate.");
            self.sink.emit(&format!(
                "Maybe try force_default_across_all_speeds to reset to {}.",
                DEFAULT_BAUD_RATE
            ));
            DetectOutcome::NotFound
        };
        Ok(detected)
    }

    /// Send the factory reset command at every speed, whatever the module's
    /// current setting, then close the transport.
    ///
    /// The module comes back at [`DEFAULT_BAUD_RATE`], and so does the
    /// link's configured speed; call [`Hc12Link::begin`] to reopen.
    pub fn force_default_across_all_speeds(&mut self) -> Result<(), LinkError> {
        self.sink.emit("***Resetting to defaults***");
        let settle_ms = self.link.config().timing.probe_settle_ms;

        for &speed in &self.speeds {
            self.link.settle(settle_ms);
            self.link.switch_baud(speed)?;
            self.link.settle(settle_ms);

            // No acknowledgement is expected at the wrong speeds
            let response = self.link.send_command(RESET_DEFAULT_COMMAND)?;
            if response.is_ack() {
                info!(baud_rate = speed, "module reset to defaults");
            }
            self.link.settle(settle_ms);
        }

        self.link.set_configured_baud(DEFAULT_BAUD_RATE);
        self.link.end()?;
        self.sink.emit(&format!(
            "Module reset; it now listens at {} baud",
            DEFAULT_BAUD_RATE
        ));
        Ok(())
    }

    /// Change the module to `target` without knowing its current speed.
    ///
    /// The set command is probed across every speed. When the module
    /// acknowledges, the host side follows it to `target`. Otherwise the
    /// module's actual speed is detected and reported so an operator can
    /// intervene.
    pub fn set_speed_safely(&mut self, target: u32) -> Result<SetSpeedOutcome, LinkError> {
        if !BAUD_RATES.contains(&target) {
            return Err(ConfigError::UnsupportedBaudRate(target).into());
        }

        self.sink.emit("***Safe-setting baud rate***");
        let outcome = self.probe(&set_baud_command(target))?;

        if outcome.overflow {
            self.buffer_overflow_msg();
            return Ok(SetSpeedOutcome::BufferFault);
        }

        match outcome.response {
            Some(response) if outcome.found => {
                let text = response.text().into_owned();
                self.sink.emit(&text);
                // The new speed takes effect once SET is back high
                self.link.switch_baud(target)?;
                self.link.set_configured_baud(target);
                Ok(SetSpeedOutcome::Acknowledged { response: text })
            }
            _ => {
                let detected = self.detect_speed()?;
                Ok(SetSpeedOutcome::NotAcknowledged(detected))
            }
        }
    }

    fn buffer_overflow_msg(&mut self) {
        self.sink.emit("- Buffer overflow while probing baud rates");
        self.sink.emit("- This might be due to an interfering sending module");
        self.sink.emit("- Turn it off and try again");
    }
}
