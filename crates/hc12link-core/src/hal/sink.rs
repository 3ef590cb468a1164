//! Diagnostic sinks

use tracing::info;

use super::DiagnosticSink;

/// Forwards diagnostic lines to `tracing` at info level
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn emit(&mut self, line: &str) {
        info!(target: "hc12link::diagnostic", "{}", line);
    }
}

/// Keeps every emitted line in memory
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    lines: Vec<String>,
}

impl RecordingSink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines emitted so far
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Whether any line contains the given text
    pub fn contains(&self, needle: &str) -> bool {
        self.lines.iter().any(|line| line.contains(needle))
    }
}

impl DiagnosticSink for RecordingSink {
    fn emit(&mut self, line: &str) {
        self.lines.push(line.to_string());
    }
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for &mut S {
    fn emit(&mut self, line: &str) {
        (**self).emit(line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_sink() {
        let mut sink = RecordingSink::new();
        sink.emit("Detected baud rate: 9600");
        sink.emit("done");
        assert_eq!(sink.lines().len(), 2);
        assert!(sink.contains("9600"));
        assert!(!sink.contains("overflow"));
    }

    #[test]
    fn test_sink_through_mutable_reference() {
        fn report<S: DiagnosticSink>(mut sink: S) {
            sink.emit("line");
        }

        let mut sink = RecordingSink::new();
        report(&mut sink);
        assert_eq!(sink.lines(), ["line".to_string()]);
    }
}
