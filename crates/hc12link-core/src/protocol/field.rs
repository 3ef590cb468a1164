//! Fixed-width payload fields
//!
//! Every message occupies exactly `message_capacity` bytes on the wire. Values
//! are serialized through [`FieldValue`], whose implementation picks the
//! padding policy: text is left aligned, numbers are right aligned, and both
//! are padded with spaces. Values wider than the field are truncated.

use std::borrow::Cow;

/// Where a value sits inside its fixed-width field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    /// Value first, spaces after (text)
    Left,
    /// Spaces first, value after (numbers)
    Right,
}

/// A value that can be written into a fixed-width payload field
pub trait FieldValue {
    /// Unpadded byte representation of the value
    fn field_bytes(&self) -> Cow<'_, [u8]>;

    /// Padding policy for this kind of value
    fn alignment(&self) -> Alignment;
}

impl FieldValue for str {
    fn field_bytes(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(self.as_bytes())
    }

    fn alignment(&self) -> Alignment {
        Alignment::Left
    }
}

impl FieldValue for String {
    fn field_bytes(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(self.as_bytes())
    }

    fn alignment(&self) -> Alignment {
        Alignment::Left
    }
}

impl FieldValue for [u8] {
    fn field_bytes(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(self)
    }

    fn alignment(&self) -> Alignment {
        Alignment::Left
    }
}

impl FieldValue for Vec<u8> {
    fn field_bytes(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(self.as_slice())
    }

    fn alignment(&self) -> Alignment {
        Alignment::Left
    }
}

macro_rules! numeric_field {
    ($($t:ty),*) => {
        $(
            impl FieldValue for $t {
                fn field_bytes(&self) -> Cow<'_, [u8]> {
                    Cow::Owned(self.to_string().into_bytes())
                }

                fn alignment(&self) -> Alignment {
                    Alignment::Right
                }
            }
        )*
    };
}

numeric_field!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

/// Serialize a value into exactly `width` bytes
pub fn format_field<V: FieldValue + ?Sized>(value: &V, width: usize) -> Vec<u8> {
    let raw = value.field_bytes();
    let len = raw.len().min(width);

    let mut field = Vec::with_capacity(width);
    match value.alignment() {
        Alignment::Left => {
            field.extend_from_slice(&raw[..len]);
            field.resize(width, b' ');
        }
        Alignment::Right => {
            field.resize(width - len, b' ');
            field.extend_from_slice(&raw[..len]);
        }
    }
    field
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_is_right_padded() {
        assert_eq!(format_field("ab", 5), b"ab   ");
        assert_eq!(format_field(&"ab".to_string(), 2), b"ab");
    }

    #[test]
    fn test_numbers_are_left_padded() {
        assert_eq!(format_field(&42i32, 5), b"   42");
        assert_eq!(format_field(&-7i32, 4), b"  -7");
        assert_eq!(format_field(&65535u32, 5), b"65535");
    }

    #[test]
    fn test_truncation_keeps_leading_bytes() {
        assert_eq!(format_field("abcdef", 3), b"abc");
        assert_eq!(format_field(&123456u32, 4), b"1234");
    }

    #[test]
    fn test_raw_bytes_use_text_policy() {
        assert_eq!(format_field(&b"\x01\x02"[..], 3), vec![1, 2, b' ']);
    }

    #[test]
    fn test_zero_width() {
        assert!(format_field("abc", 0).is_empty());
        assert!(format_field(&1u8, 0).is_empty());
    }
}
