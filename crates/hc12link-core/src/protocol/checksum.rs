//! Frame checksum
//!
//! The checksum is the two's-complement negation of the 16-bit sum of the
//! payload bytes, so an intact frame satisfies `(received + sum) % 65536 == 0`.
//! On the wire it is a right-aligned, space padded decimal field of
//! [`CHECKSUM_WIDTH`] characters.

use super::CHECKSUM_WIDTH;

fn byte_sum(payload: &[u8]) -> u16 {
    payload
        .iter()
        .fold(0u16, |sum, &b| sum.wrapping_add(u16::from(b)))
}

/// Compute the checksum of a payload
pub fn compute(payload: &[u8]) -> u16 {
    byte_sum(payload).wrapping_neg()
}

/// Check a received checksum against a payload
pub fn verify(payload: &[u8], received: u16) -> bool {
    received.wrapping_add(byte_sum(payload)) == 0
}

/// Render a checksum as its fixed-width wire field
pub fn render(value: u16) -> [u8; CHECKSUM_WIDTH] {
    let mut field = [b' '; CHECKSUM_WIDTH];
    let digits = value.to_string();
    let offset = CHECKSUM_WIDTH - digits.len();
    field[offset..].copy_from_slice(digits.as_bytes());
    field
}

/// Parse a received checksum field.
///
/// Leading spaces and zeros are accepted; parsing stops at the first
/// non-digit. Returns `None` when no digit is present or the value does
/// not fit in a u16.
pub fn parse(field: &[u8]) -> Option<u16> {
    let digits: Vec<u8> = field
        .iter()
        .copied()
        .skip_while(|b| *b == b' ')
        .take_while(u8::is_ascii_digit)
        .collect();

    if digits.is_empty() {
        return None;
    }

    digits.iter().try_fold(0u16, |acc, &d| {
        acc.checked_mul(10)?.checked_add(u16::from(d - b'0'))
    })
}
