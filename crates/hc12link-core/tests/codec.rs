use hc12link_core::protocol::{checksum, DecoderState, FrameDecoder, FrameEncoder, FrameMarkers};
use pretty_assertions::assert_eq;

fn codec(capacity: usize, use_checksum: bool) -> (FrameEncoder, FrameDecoder) {
    let markers = FrameMarkers::default();
    (
        FrameEncoder::new(markers, capacity, use_checksum),
        FrameDecoder::new(markers, capacity, use_checksum),
    )
}

fn padded(text: &str, width: usize) -> Vec<u8> {
    let mut v = text.as_bytes().to_vec();
    v.resize(width, b' ');
    v
}

#[test]
fn test_text_roundtrip_with_checksum() {
    for text in ["", "a", "hello", "sixteen chars!!!"] {
        let (encoder, mut decoder) = codec(16, true);
        let frame = encoder.encode(text);

        assert_eq!(decoder.feed(&frame), DecoderState::FrameComplete);
        assert_eq!(decoder.payload(), padded(text, 16).as_slice());
        assert!(decoder.checksum_ok());
        assert!(!decoder.is_truncated());
    }
}

#[test]
fn test_text_roundtrip_without_checksum() {
    let (encoder, mut decoder) = codec(6, false);
    decoder.feed(&encoder.encode("temp"));
    assert_eq!(decoder.payload(), b"temp  ");
    assert!(decoder.checksum_ok());
}

#[test]
fn test_numeric_roundtrip() {
    let (encoder, mut decoder) = codec(6, true);
    decoder.feed(&encoder.encode(&-1234i32));
    assert_eq!(decoder.payload(), b" -1234");
    assert!(decoder.checksum_ok());

    let parsed: i32 = std::str::from_utf8(decoder.payload())
        .unwrap()
        .trim()
        .parse()
        .unwrap();
    assert_eq!(parsed, -1234);
}

#[test]
fn test_high_bytes_roundtrip() {
    let (encoder, mut decoder) = codec(4, true);
    let payload = vec![0x80u8, 0xFF, 0x01, 0x7F];
    decoder.feed(&encoder.encode(&payload));
    assert_eq!(decoder.payload(), payload.as_slice());
    assert!(decoder.checksum_ok());
}

#[test]
fn test_corrupted_payload_detected() {
    let (encoder, mut decoder) = codec(5, true);
    let mut frame = encoder.encode("hello");
    decoder.feed(&frame);
    assert!(decoder.checksum_ok());

    frame[2] = b'a';
    decoder.rearm();
    decoder.feed(&frame);
    assert!(decoder.is_frame_ready());
    assert_eq!(decoder.payload(), b"hallo");
    assert!(!decoder.checksum_ok());
}

#[test]
fn test_stream_with_noise_and_interrupted_frame() {
    let (encoder, mut decoder) = codec(4, true);
    let good = encoder.encode("good");

    let mut stream = b"\x00\xffnoise<ba".to_vec();
    stream.extend_from_slice(&good);

    decoder.feed(&stream);
    assert!(decoder.is_frame_ready());
    assert_eq!(decoder.payload(), b"good");
    assert!(decoder.checksum_ok());
}

#[test]
fn test_consecutive_frames_need_rearm() {
    let (encoder, mut decoder) = codec(3, false);
    let mut stream = encoder.encode("one");
    stream.extend_from_slice(&encoder.encode("two"));

    let mut received = Vec::new();
    for &b in &stream {
        if decoder.push(b) == DecoderState::FrameComplete {
            received.push(decoder.take_frame().unwrap().payload);
        }
    }
    assert_eq!(received, vec![b"one".to_vec(), b"two".to_vec()]);
}

#[test]
fn test_idempotent_after_complete() {
    let (encoder, mut decoder) = codec(3, true);
    decoder.feed(&encoder.encode("abc"));
    let payload = decoder.payload().to_vec();
    let field = decoder.checksum_field().to_vec();

    for b in 0..=255u8 {
        assert_eq!(decoder.push(b), DecoderState::FrameComplete);
    }
    assert_eq!(decoder.payload(), payload.as_slice());
    assert_eq!(decoder.checksum_field(), field.as_slice());
}

#[test]
fn test_overflow_without_checksum_completes_at_capacity() {
    let (_, mut decoder) = codec(4, false);
    decoder.feed(b"<abcdefgh>");
    assert!(decoder.is_frame_ready());
    assert!(decoder.is_truncated());
    assert_eq!(decoder.payload(), b"abcd");
}

#[test]
fn test_overflow_with_checksum_waits_for_terminator() {
    let (_, mut decoder) = codec(4, true);
    assert_eq!(decoder.feed(b"<abcdefgh"), DecoderState::ReadingPayload);
    assert!(decoder.is_truncated());

    let field = checksum::render(checksum::compute(b"abcd"));
    decoder.push(b',');
    decoder.feed(&field);
    assert_eq!(decoder.push(b'>'), DecoderState::FrameComplete);
    assert_eq!(decoder.payload(), b"abcd");
    assert!(decoder.checksum_ok());
}

#[test]
fn test_checksum_law() {
    let samples: [&[u8]; 5] = [b"", b"x", b"The quick brown fox", &[0xFF; 255], &[0u8; 10]];
    for p in samples {
        assert!(checksum::verify(p, checksum::compute(p)));
        assert_eq!(checksum::parse(&checksum::render(checksum::compute(p))), Some(checksum::compute(p)));
    }
}
