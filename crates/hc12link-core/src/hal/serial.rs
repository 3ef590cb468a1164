//! Serial port backend
//!
//! Drives an HC-12 module attached through a USB-serial adapter. The adapter's
//! RTS output is wired to the module's SET pin, so the transport and the mode
//! line share one port handle.

use serialport::{SerialPort, SerialPortInfo, SerialPortType};
use std::collections::BTreeMap;
#[cfg(target_os = "linux")]
use std::fs;
use std::io::{ErrorKind, Read, Write};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::debug;

use super::{ModeLine, Transport};
use crate::protocol::LinkError;

/// USB identity of an adapter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsbDevice {
    /// Vendor ID
    pub vid: u16,
    /// Product ID
    pub pid: u16,
    /// Product string reported by the adapter
    pub product: Option<String>,
}

/// A serial port an HC-12 adapter may be attached to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortInfo {
    /// Device path or name ("/dev/ttyUSB0", "COM3")
    pub name: String,
    /// Present when the port is a USB adapter
    pub usb: Option<UsbDevice>,
}

impl From<SerialPortInfo> for PortInfo {
    fn from(info: SerialPortInfo) -> Self {
        let usb = match info.port_type {
            SerialPortType::UsbPort(usb) => Some(UsbDevice {
                vid: usb.vid,
                pid: usb.pid,
                product: usb.product,
            }),
            _ => None,
        };
        Self {
            name: info.port_name,
            usb,
        }
    }
}

/// Linux device families, in the order they are listed. HC-12 boards sit
/// behind CP210x/CH340 bridges (ttyUSB) far more often than CDC-ACM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum DeviceFamily {
    UsbSerial,
    CdcAcm,
    Other,
}

impl DeviceFamily {
    /// Family and unit number of a device node name
    fn classify(node: &str) -> (Self, Option<usize>) {
        let families = [("ttyUSB", Self::UsbSerial), ("ttyACM", Self::CdcAcm)];
        families
            .iter()
            .find_map(|&(prefix, family)| {
                node.strip_prefix(prefix)
                    .map(|unit| (family, unit.parse().ok()))
            })
            .unwrap_or((Self::Other, None))
    }
}

fn node_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Sort key: family, then unit number (unnumbered last), then node name
fn listing_order(path: &str) -> (DeviceFamily, usize, &str) {
    let node = node_name(path);
    let (family, unit) = DeviceFamily::classify(node);
    (family, unit.unwrap_or(usize::MAX), node)
}

/// List serial ports, USB-serial adapters first
pub fn list_ports() -> Vec<PortInfo> {
    let mut found: BTreeMap<String, PortInfo> = serialport::available_ports()
        .unwrap_or_default()
        .into_iter()
        .map(|info| {
            let port = PortInfo::from(info);
            (port.name.clone(), port)
        })
        .collect();

    // Enumeration can miss adapters without udev metadata
    #[cfg(target_os = "linux")]
    if let Ok(entries) = fs::read_dir("/dev") {
        let nodes = entries
            .flatten()
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|node| DeviceFamily::classify(node).0 != DeviceFamily::Other);
        for node in nodes {
            let path = format!("/dev/{}", node);
            found
                .entry(path.clone())
                .or_insert(PortInfo { name: path, usb: None });
        }
    }

    let mut ports: Vec<PortInfo> = found.into_values().collect();
    ports.sort_by(|a, b| listing_order(&a.name).cmp(&listing_order(&b.name)));
    ports
}

/// Open a serial port configured for the HC-12 (8N1, no flow control)
pub fn open_port(name: &str, baud_rate: u32) -> Result<Box<dyn SerialPort>, LinkError> {
    // Short timeout keeps single-byte reads responsive
    let port = serialport::new(name, baud_rate)
        .data_bits(serialport::DataBits::Eight)
        .parity(serialport::Parity::None)
        .stop_bits(serialport::StopBits::One)
        .flow_control(serialport::FlowControl::None)
        .timeout(Duration::from_millis(10))
        .open()
        .map_err(|e| LinkError::SerialError(e.to_string()))?;
    debug!(port = name, baud_rate, "serial port opened");
    Ok(port)
}

type SharedPort = Arc<Mutex<Option<Box<dyn SerialPort>>>>;

fn lock(port: &SharedPort) -> MutexGuard<'_, Option<Box<dyn SerialPort>>> {
    port.lock().unwrap_or_else(PoisonError::into_inner)
}

fn serial_err(e: serialport::Error) -> LinkError {
    LinkError::SerialError(e.to_string())
}

/// [`Transport`] over a `serialport` handle
pub struct SerialTransport {
    port_name: String,
    port: SharedPort,
}

impl SerialTransport {
    /// Create a transport for the named port. The port is opened by
    /// [`Transport::open`].
    pub fn new(port_name: impl Into<String>) -> Self {
        Self {
            port_name: port_name.into(),
            port: Arc::new(Mutex::new(None)),
        }
    }

    /// Port name
    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    /// Mode line driving SET through this port's RTS output
    pub fn mode_line(&self) -> RtsModeLine {
        RtsModeLine {
            port: Arc::clone(&self.port),
        }
    }

    fn with_port<R>(
        &self,
        f: impl FnOnce(&mut Box<dyn SerialPort>) -> Result<R, LinkError>,
    ) -> Result<R, LinkError> {
        let mut guard = lock(&self.port);
        match guard.as_mut() {
            Some(port) => f(port),
            None => Err(LinkError::NotStarted),
        }
    }
}

impl Transport for SerialTransport {
    fn open(&mut self, baud_rate: u32) -> Result<(), LinkError> {
        let mut guard = lock(&self.port);
        // Release any previous handle before reopening
        guard.take();
        *guard = Some(open_port(&self.port_name, baud_rate)?);
        Ok(())
    }

    fn close(&mut self) -> Result<(), LinkError> {
        if lock(&self.port).take().is_some() {
            debug!(port = %self.port_name, "serial port closed");
        }
        Ok(())
    }

    fn write(&mut self, data: &[u8]) -> Result<(), LinkError> {
        self.with_port(|port| {
            port.write_all(data)?;
            port.flush()?;
            Ok(())
        })
    }

    fn bytes_available(&mut self) -> Result<bool, LinkError> {
        self.with_port(|port| Ok(port.bytes_to_read().map_err(serial_err)? > 0))
    }

    fn read_byte(&mut self) -> Result<Option<u8>, LinkError> {
        self.with_port(|port| {
            if port.bytes_to_read().map_err(serial_err)? == 0 {
                return Ok(None);
            }
            let mut buf = [0u8; 1];
            match port.read(&mut buf) {
                Ok(1) => Ok(Some(buf[0])),
                Ok(_) => Ok(None),
                Err(e) if e.kind() == ErrorKind::TimedOut => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
    }

    fn reconfigure(&mut self, baud_rate: u32) -> Result<(), LinkError> {
        self.with_port(|port| port.set_baud_rate(baud_rate).map_err(serial_err))
    }
}

/// [`ModeLine`] on the RTS output of a [`SerialTransport`]'s port.
///
/// USB-serial adapters drive the RTS pin low while RTS is asserted, so
/// asserting RTS selects command mode.
pub struct RtsModeLine {
    port: SharedPort,
}

impl RtsModeLine {
    fn write_rts(&mut self, asserted: bool) -> Result<(), LinkError> {
        let mut guard = lock(&self.port);
        let port = guard.as_mut().ok_or(LinkError::NotStarted)?;
        port.write_request_to_send(asserted)
            .map_err(|e| LinkError::ModeLineError(e.to_string()))
    }
}

impl ModeLine for RtsModeLine {
    fn set_low(&mut self) -> Result<(), LinkError> {
        self.write_rts(true)
    }

    fn set_high(&mut self) -> Result<(), LinkError> {
        self.write_rts(false)
    }
}
