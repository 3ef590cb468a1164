use std::io;
use std::sync::{Arc, Mutex};

use hc12link_core::config::LinkConfig;
use hc12link_core::hal::mock::{MockClock, MockModeLine, MockTransport};
use hc12link_core::protocol::{BaudProber, DetectOutcome, Hc12Link, BAUD_RATES};
use pretty_assertions::assert_eq;
use tracing::Level;

/// Shared buffer the fmt subscriber writes into
#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl Captured {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn capture_logs(max_level: Level, f: impl FnOnce()) -> String {
    let captured = Captured::default();
    let writer = captured.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(max_level)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    tracing::subscriber::with_default(subscriber, f);
    captured.text()
}

#[test]
fn test_detection_diagnostics_go_to_tracing() {
    let logs = capture_logs(Level::INFO, || {
        let mut transport = MockTransport::new();
        transport.respond_at(BAUD_RATES[2], b"OK\r\n");
        let mut link = Hc12Link::new(
            transport,
            MockModeLine::new(),
            MockClock::new(),
            LinkConfig::new(8),
        )
        .unwrap();
        link.begin().unwrap();

        let outcome = BaudProber::new(&mut link).detect_speed().unwrap();
        assert_eq!(outcome, DetectOutcome::Detected(BAUD_RATES[2]));
    });

    assert!(logs.contains("Starting HC-12 link at 9600 baud"));
    assert!(logs.contains("***Detecting baud rate***"));
    assert!(logs.contains("Detected baud rate at: 4800"));
    assert!(logs.contains("hc12link::diagnostic"));
    // AT traffic is debug level
    assert!(!logs.contains("AT command"));
}

#[test]
fn test_command_traffic_logged_at_debug() {
    let logs = capture_logs(Level::DEBUG, || {
        let mut transport = MockTransport::new();
        transport.respond_at(9600, b"OK\r\n");
        let mut link = Hc12Link::new(
            transport,
            MockModeLine::new(),
            MockClock::new(),
            LinkConfig::new(8),
        )
        .unwrap();
        link.begin().unwrap();
        link.send_command("AT").unwrap();
    });

    assert!(logs.contains("AT command"));
    assert!(logs.contains("overflow=false"));
}
