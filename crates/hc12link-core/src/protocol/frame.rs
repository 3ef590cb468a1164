//! Frame encoding
//!
//! Frame format:
//! - 1 byte: start marker
//! - N bytes: payload, always exactly `message_capacity` bytes
//! - optional: checksum delimiter + 5 byte checksum field
//! - 1 byte: end marker
//!
//! Marker bytes are not escaped. A payload containing a marker byte will
//! desynchronize the receiver.

use super::{
    checksum, field::format_field, FieldValue, CHECKSUM_WIDTH, DEFAULT_CHECKSUM_DELIM,
    DEFAULT_END_MARKER, DEFAULT_START_MARKER,
};

/// The reserved bytes that delimit a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameMarkers {
    /// Begins a frame
    pub start: u8,
    /// Ends a frame
    pub end: u8,
    /// Separates payload and checksum
    pub checksum_delim: u8,
}

impl Default for FrameMarkers {
    fn default() -> Self {
        Self {
            start: DEFAULT_START_MARKER,
            end: DEFAULT_END_MARKER,
            checksum_delim: DEFAULT_CHECKSUM_DELIM,
        }
    }
}

impl FrameMarkers {
    /// Check whether a byte is reserved for framing
    pub fn is_reserved(&self, byte: u8) -> bool {
        byte == self.start || byte == self.end || byte == self.checksum_delim
    }
}

/// Builds wire frames for a fixed message capacity
#[derive(Debug, Clone)]
pub struct FrameEncoder {
    markers: FrameMarkers,
    message_capacity: usize,
    use_checksum: bool,
}

impl FrameEncoder {
    /// Create a new encoder
    pub fn new(markers: FrameMarkers, message_capacity: usize, use_checksum: bool) -> Self {
        Self {
            markers,
            message_capacity,
            use_checksum,
        }
    }

    /// Encode a value into a complete frame
    pub fn encode<V: FieldValue + ?Sized>(&self, value: &V) -> Vec<u8> {
        let payload = format_field(value, self.message_capacity);

        let mut frame = Vec::with_capacity(self.frame_len());
        frame.push(self.markers.start);
        frame.extend_from_slice(&payload);

        if self.use_checksum {
            frame.push(self.markers.checksum_delim);
            frame.extend_from_slice(&checksum::render(checksum::compute(&payload)));
        }

        frame.push(self.markers.end);
        frame
    }

    /// Total size of every frame this encoder produces
    pub fn frame_len(&self) -> usize {
        let checksum_len = if self.use_checksum {
            1 + CHECKSUM_WIDTH
        } else {
            0
        };
        2 + self.message_capacity + checksum_len
    }

    /// Payload width in bytes
    pub fn message_capacity(&self) -> usize {
        self.message_capacity
    }

    /// Whether frames carry a checksum
    pub fn uses_checksum(&self) -> bool {
        self.use_checksum
    }

    /// Framing bytes in use
    pub fn markers(&self) -> FrameMarkers {
        self.markers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_frame_layout() {
        let encoder = FrameEncoder::new(FrameMarkers::default(), 4, false);
        let frame = encoder.encode("hi");
        assert_eq!(frame, b"<hi  >");
        assert_eq!(frame.len(), encoder.frame_len());
    }

    #[test]
    fn test_checksum_frame_layout() {
        let encoder = FrameEncoder::new(FrameMarkers::default(), 2, true);
        let frame = encoder.encode("AB");
        // 65 + 66 = 131, negated = 65405
        assert_eq!(frame, b"<AB,65405>");
        assert_eq!(frame.len(), encoder.frame_len());
    }

    #[test]
    fn test_checksum_covers_padding() {
        let encoder = FrameEncoder::new(FrameMarkers::default(), 3, true);
        let frame = encoder.encode(&7u32);
        // "  7" = 32 + 32 + 55 = 119, negated = 65417
        assert_eq!(frame, b"<  7,65417>");
    }

    #[test]
    fn test_custom_markers() {
        let markers = FrameMarkers {
            start: b'[',
            end: b']',
            checksum_delim: b'|',
        };
        let encoder = FrameEncoder::new(markers, 2, true);
        let frame = encoder.encode("ok");
        assert_eq!(frame[0], b'[');
        assert_eq!(frame[3], b'|');
        assert_eq!(*frame.last().unwrap(), b']');
    }

    #[test]
    fn test_over_long_value_is_truncated() {
        let encoder = FrameEncoder::new(FrameMarkers::default(), 3, false);
        assert_eq!(encoder.encode("abcdef"), b"<abc>");
    }
}
