use hc12link_core::config::LinkConfig;
use hc12link_core::hal::mock::{LineLevel, MockClock, MockModeLine, MockTransport};
use hc12link_core::hal::RecordingSink;
use hc12link_core::protocol::{
    BaudProber, DetectOutcome, Hc12Link, SetSpeedOutcome, BAUD_RATES, DEFAULT_BAUD_RATE,
};
use pretty_assertions::assert_eq;

type MockLink = Hc12Link<MockTransport, MockModeLine, MockClock>;

fn started_link(transport: MockTransport) -> MockLink {
    let mut link = Hc12Link::new(
        transport,
        MockModeLine::new(),
        MockClock::new(),
        LinkConfig::new(16),
    )
    .unwrap();
    link.begin().unwrap();
    link
}

#[test]
fn test_probe_finds_index_three_without_testing_higher_speeds() {
    let mut transport = MockTransport::new();
    transport.respond_at(BAUD_RATES[3], b"OK\r\n");
    let mut link = started_link(transport);

    let outcome = BaudProber::new(&mut link).probe("AT").unwrap();
    assert!(outcome.found);
    assert!(!outcome.overflow);
    assert_eq!(outcome.index, 3);

    let tried: Vec<u32> = link.transport().baud_history()[1..].to_vec();
    assert_eq!(tried, BAUD_RATES[..4].to_vec());
}

#[test]
fn test_probe_overflow_takes_precedence_over_later_ack() {
    let mut transport = MockTransport::new();
    transport.respond_at(1200, &[b'#'; 100]);
    transport.respond_at(2400, b"OK");
    let mut link = started_link(transport);

    let outcome = BaudProber::new(&mut link).probe("AT").unwrap();
    assert!(outcome.overflow);
    assert!(!outcome.found);
    assert_eq!(outcome.index, 0);
    assert_eq!(link.transport().baud_history(), &[DEFAULT_BAUD_RATE, 1200]);
}

#[test]
fn test_every_probe_leaves_module_in_data_mode() {
    let mut link = started_link(MockTransport::new());
    BaudProber::new(&mut link).probe("AT").unwrap();

    let transitions = link.mode_line().transitions();
    // begin: High, then Low/High per probed speed
    assert_eq!(transitions.len(), 1 + 2 * BAUD_RATES.len());
    assert_eq!(transitions.last(), Some(&LineLevel::High));
    for pair in transitions[1..].chunks(2) {
        assert_eq!(pair, &[LineLevel::Low, LineLevel::High]);
    }
}

#[test]
fn test_detect_then_talk_at_detected_speed() {
    let mut transport = MockTransport::new();
    transport.respond_at(38400, b"OK\r\n");
    let mut link = started_link(transport);

    let mut sink = RecordingSink::new();
    let detected = BaudProber::new(&mut link)
        .with_sink(&mut sink)
        .detect_speed()
        .unwrap();
    assert_eq!(detected, DetectOutcome::Detected(38400));
    assert!(sink.contains("38400"));

    link.send("ping").unwrap();
    assert_eq!(link.transport().baud_rate(), 38400);
    assert_eq!(
        link.transport().writes().last().unwrap().as_slice(),
        b"<ping            >"
    );
}

#[test]
fn test_reset_then_reopen_at_default() {
    let mut link = started_link(MockTransport::new());
    let mut sink = RecordingSink::new();
    BaudProber::new(&mut link)
        .with_sink(&mut sink)
        .force_default_across_all_speeds()
        .unwrap();

    assert!(!link.is_started());
    assert!(sink.contains("Resetting to defaults"));

    link.begin().unwrap();
    assert_eq!(link.transport().baud_rate(), DEFAULT_BAUD_RATE);
}

#[test]
fn test_reset_from_other_speed_reopens_at_default() {
    let mut config = LinkConfig::new(16);
    config.baud_rate = 19200;
    let mut link = Hc12Link::new(
        MockTransport::new(),
        MockModeLine::new(),
        MockClock::new(),
        config,
    )
    .unwrap();
    link.begin().unwrap();
    assert_eq!(link.transport().baud_rate(), 19200);

    BaudProber::new(&mut link)
        .with_sink(RecordingSink::new())
        .force_default_across_all_speeds()
        .unwrap();
    assert_eq!(link.config().baud_rate, DEFAULT_BAUD_RATE);

    link.begin().unwrap();
    assert_eq!(link.transport().baud_rate(), DEFAULT_BAUD_RATE);
    assert_eq!(link.baud_rate(), DEFAULT_BAUD_RATE);
}

#[test]
fn test_safe_set_when_module_is_silent() {
    let mut link = started_link(MockTransport::new());
    let mut sink = RecordingSink::new();
    let outcome = BaudProber::new(&mut link)
        .with_sink(&mut sink)
        .set_speed_safely(19200)
        .unwrap();

    assert_eq!(outcome, SetSpeedOutcome::NotAcknowledged(DetectOutcome::NotFound));
    assert!(sink.contains("Safe-setting"));
    assert!(sink.contains("Could not detect baud rate"));
    // Configured speed untouched
    assert_eq!(link.config().baud_rate, DEFAULT_BAUD_RATE);
}

#[test]
fn test_probe_total_wait_is_bounded_by_settle_times() {
    let mut link = started_link(MockTransport::new());
    let before = link.clock().total_delay_ms();
    BaudProber::new(&mut link).probe("AT").unwrap();

    // Per speed: 3 settles of 500ms plus 50 + 100 + 90 for the command
    let per_speed = 3 * 500 + 50 + 100 + 90;
    assert_eq!(
        link.clock().total_delay_ms() - before,
        (per_speed * BAUD_RATES.len()) as u64
    );
}
