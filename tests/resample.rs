use pretty_assertions::assert_eq;
use rankseries::resample::{outages, Outage, OutageKind};
use rankseries::{resample, Event, Granularity, RankSample as S, Resampler};
use rankseries_test_support::{setup_tracing, HistoryGen};
use rstest::rstest;

#[test]
fn three_minute_window() {
    setup_tracing();

    let events = [
        Event::count(830, 3),
        Event::count(910, 3),
        Event::unreachable(910),
    ];
    assert_eq!(
        resample(&events, 1000, 180, 60),
        vec![S::NoDataYet, S::PlayerCount(3), S::CollectorDown]
    );
}

#[test]
fn later_unreachable_is_the_server() {
    setup_tracing();

    let events = [Event::count(830, 3), Event::unreachable(910)];
    assert_eq!(
        resample(&events, 1000, 180, 60),
        vec![S::NoDataYet, S::PlayerCount(3), S::ServerUnreachable]
    );
}

#[rstest]
fn count_from_before_the_window_fills_it(#[values(1, 5, 60, 1440)] n: u64) {
    setup_tracing();

    let now = 1_000_000;
    let window = n * 60;
    let grid_start = now - window;

    let samples = resample(&[Event::count(grid_start - 1, 5)], now, window, 60);
    assert_eq!(samples, vec![S::PlayerCount(5); n as usize]);
}

#[test]
fn event_on_first_boundary_shows_up_from_the_second() {
    let samples = resample(&[Event::count(820, 5)], 1000, 180, 60);
    assert_eq!(
        samples,
        vec![S::NoDataYet, S::PlayerCount(5), S::PlayerCount(5)]
    );
}

#[test]
fn no_data_before_history() {
    let samples = resample(&[Event::count(1500, 2)], 2000, 600, 60);

    let mut expected = vec![S::NoDataYet; 2];
    expected.extend([S::PlayerCount(2); 8]);
    assert_eq!(samples, expected);
}

#[test]
fn no_events_is_all_no_data() {
    assert_eq!(resample(&[], 2000, 600, 60), vec![S::NoDataYet; 10]);
}

#[test]
fn restart_until_next_real_event() {
    setup_tracing();

    let events = [
        Event::count(300, 4),
        Event::unreachable(300),
        Event::count(700, 6),
        Event::unreachable(760),
    ];

    let mut expected = vec![S::CollectorDown; 6];
    expected.push(S::PlayerCount(6));
    expected.extend([S::ServerUnreachable; 3]);
    assert_eq!(resample(&events, 1000, 600, 60), expected);
}

#[test]
fn first_unreachable_at_epoch_counts_as_restart() {
    // there is no previous record, its time is taken as zero
    let samples = resample(&[Event::unreachable(0)], 600, 300, 60);
    assert_eq!(samples, vec![S::CollectorDown; 5]);
}

#[test]
fn events_after_now_discard_everything() {
    setup_tracing();

    let events = [Event::count(850, 1), Event::count(1100, 3)];
    assert_eq!(resample(&events, 1000, 180, 60), Vec::new());
}

#[rstest]
#[case(600, 0)]
#[case(600, 601)]
fn impossible_grids_are_empty(#[case] window: u64, #[case] interval: u64) {
    assert_eq!(resample(&[Event::count(100, 1)], 600, window, interval), Vec::new());
}

#[test]
fn window_before_epoch_is_empty() {
    assert_eq!(resample(&[Event::count(10, 1)], 100, 600, 60), Vec::new());
}

#[test]
fn uneven_window_rounds_down() {
    let resampler = Resampler::new(170, 60);
    assert_eq!(resampler.expected_len(), 2);
    assert_eq!(
        resampler.resample(&[Event::count(0, 9)], 1000),
        vec![S::PlayerCount(9); 2]
    );
}

#[rstest]
fn generated_histories_give_full_timelines(
    #[values(0, 1, 2, 3, 4)] seed: u64,
    #[values(Granularity::Live, Granularity::Averaged)] granularity: Granularity,
) {
    setup_tracing();

    let start = 1_600_000_000;
    let events = HistoryGen::from_seed(seed, start, 60.0).events(20_000);
    let now = events.last().unwrap().timestamp + 30;

    let window = 3 * 24 * 60 * 60;
    let resampler = Resampler::for_granularity(window, granularity);
    let samples = resampler.resample(&events, now);
    assert_eq!(samples.len(), resampler.expected_len());
}

#[test]
fn outages_of_a_timeline() {
    let events = [
        Event::count(300, 4),
        Event::unreachable(300),
        Event::count(700, 6),
        Event::unreachable(760),
    ];
    let samples = resample(&events, 1000, 600, 60);
    assert_eq!(
        outages(&samples),
        vec![
            Outage {
                kind: OutageKind::CollectorDown,
                range: 0..6,
            },
            Outage {
                kind: OutageKind::ServerUnreachable,
                range: 7..10,
            }
        ]
    );
}
