use pretty_assertions::assert_eq;
use rankseries::encode::{encode, RecordEncoder};
use rankseries::{decode, resample, Event, RankSample, RecordDecoder};
use rankseries_test_support::{setup_tracing, HistoryGen};
use rstest::rstest;

#[rstest]
fn generated_history_survives(
    #[values(0, 1, 2, 3)] seed: u64,
    #[values(5.0, 60.0, 3600.0)] mean_gap: f64,
) {
    setup_tracing();

    let events = HistoryGen::from_seed(seed, 1_500_000_000, mean_gap).events(5_000);
    let buffer = encode(events.iter().copied()).unwrap();

    let mut decoder = RecordDecoder::new(&buffer);
    assert_eq!(decoder.decode().unwrap(), events);
    assert!(decoder.violations().is_empty());
    assert!(!decoder.truncated());
}

#[test]
fn time_may_go_back() {
    let events = vec![
        Event::count(1_000_000, 1),
        Event::count(10, 2),
        Event::unreachable(20),
    ];
    let buffer = encode(events.iter().copied()).unwrap();
    assert_eq!(decode(&buffer).unwrap(), events);
}

#[test]
fn appending_live_file() {
    setup_tracing();

    let mut encoder = RecordEncoder::new();
    encoder.push(Event::count(900, 5)).unwrap();
    let mut buffer = encoder.finish();
    // reader sees the file while the collector is half way through a write
    buffer.extend_from_slice(&[0b0100_0110]);
    assert_eq!(decode(&buffer).unwrap(), vec![Event::count(900, 5)]);

    let mut encoder = RecordEncoder::append_to(buffer).unwrap();
    encoder.mark_restart();
    encoder.push(Event::count(950, 6)).unwrap();
    let buffer = encoder.finish();

    assert_eq!(
        decode(&buffer).unwrap(),
        vec![
            Event::count(900, 5),
            Event::unreachable(900),
            Event::count(950, 6)
        ]
    );
}

#[test]
fn collector_restart_shows_as_down() {
    setup_tracing();

    let mut encoder = RecordEncoder::new();
    encoder.push(Event::count(700, 5)).unwrap();
    encoder.mark_restart();
    let buffer = encoder.finish();

    let events = decode(&buffer).unwrap();
    assert_eq!(
        resample(&events, 1000, 600, 60),
        [
            vec![RankSample::NoDataYet; 6],
            vec![RankSample::CollectorDown; 4]
        ]
        .concat()
    );
}
