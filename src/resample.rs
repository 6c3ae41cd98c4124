use std::ops::Range;

use itertools::Itertools;
use tracing::{debug, instrument};

use crate::record::{Event, State};
use crate::{Config, Granularity, Timestamp};

/// One interval of the resampled timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RankSample {
    /// The interval lies before the first record
    NoDataYet,
    /// The stat collector was not running
    CollectorDown,
    /// The collector was fine but the server did not respond
    ServerUnreachable,
    PlayerCount(u8),
}

impl RankSample {
    /// Integer form used by chart renderers, negative values are the
    /// sentinels for the non numeric states.
    pub fn sentinel(self) -> i16 {
        match self {
            Self::NoDataYet => -3,
            Self::CollectorDown => -2,
            Self::ServerUnreachable => -1,
            Self::PlayerCount(n) => n as i16,
        }
    }

    pub fn players(self) -> Option<u8> {
        match self {
            Self::PlayerCount(n) => Some(n),
            Self::NoDataYet | Self::CollectorDown | Self::ServerUnreachable => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{0} is not a player count or a known sentinel")]
pub struct InvalidSentinel(pub i16);

impl TryFrom<i16> for RankSample {
    type Error = InvalidSentinel;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        Ok(match value {
            -3 => Self::NoDataYet,
            -2 => Self::CollectorDown,
            -1 => Self::ServerUnreachable,
            n => Self::PlayerCount(u8::try_from(n).map_err(|_| InvalidSentinel(value))?),
        })
    }
}

/// What the last applied event left us with
#[derive(Debug, Clone, Copy)]
enum Last {
    NoHistory,
    Count(u8),
    /// `restart` is set if the marker had the same time as the record
    /// before it.
    Unreachable { restart: bool },
}

impl Last {
    fn sample(self) -> RankSample {
        match self {
            Last::NoHistory => RankSample::NoDataYet,
            Last::Count(n) => RankSample::PlayerCount(n),
            Last::Unreachable { restart: true } => RankSample::CollectorDown,
            Last::Unreachable { restart: false } => RankSample::ServerUnreachable,
        }
    }
}

#[derive(Debug)]
struct TooManySamples;

const MAX_PREALLOC: usize = 1 << 16;

/// Working state of a single resample
#[derive(Debug)]
struct Backfill {
    grid_start: Timestamp,
    interval: Timestamp,
    next_boundary: Timestamp,
    /// we produce one more then this before dropping the incomplete
    /// last interval
    expected: usize,
    samples: Vec<RankSample>,
    last: Last,
    prev_timestamp: Timestamp,
}

impl Backfill {
    /// Push the current state for every boundary up to and including `until`
    fn fill_through(&mut self, until: Timestamp) -> Result<(), TooManySamples> {
        while until >= self.next_boundary {
            if self.samples.len() > self.expected {
                return Err(TooManySamples);
            }
            self.samples.push(self.last.sample());
            self.next_boundary = self
                .grid_start
                .saturating_add((self.samples.len() as Timestamp).saturating_mul(self.interval));
        }
        Ok(())
    }

    fn run<'a>(
        &mut self,
        events: impl IntoIterator<Item = &'a Event>,
        now: Timestamp,
    ) -> Result<(), TooManySamples> {
        for event in events {
            self.fill_through(event.timestamp)?;
            self.apply(event);
        }
        self.fill_through(now)
    }

    fn apply(&mut self, event: &Event) {
        self.last = match event.state {
            State::PlayerCount(n) => Last::Count(n),
            State::Unreachable => Last::Unreachable {
                // the collector writes an unreachable marker with the time of
                // its last record when it starts back up
                restart: event.timestamp == self.prev_timestamp,
            },
        };
        self.prev_timestamp = event.timestamp;
    }
}

/// Turns events into a timeline with one sample per interval. The
/// timeline spans the `window` seconds before now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resampler {
    window: Timestamp,
    interval: Timestamp,
}

impl Resampler {
    pub fn new(window: Timestamp, interval: Timestamp) -> Self {
        Self { window, interval }
    }

    pub fn for_granularity(window: Timestamp, granularity: Granularity) -> Self {
        Self::new(window, granularity.interval())
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.window, config.interval())
    }

    pub fn window(&self) -> Timestamp {
        self.window
    }

    pub fn interval(&self) -> Timestamp {
        self.interval
    }

    /// Number of samples a successful resample returns
    pub fn expected_len(&self) -> usize {
        self.window
            .checked_div(self.interval)
            .unwrap_or(0) as usize
    }

    /// Returns exactly [`expected_len`](Self::expected_len) samples, or
    /// nothing if the events do not fit the grid. An empty timeline means
    /// there is no chartable data.
    #[instrument(level = "debug", skip(events))]
    pub fn resample<'a>(
        &self,
        events: impl IntoIterator<Item = &'a Event>,
        now: Timestamp,
    ) -> Vec<RankSample> {
        if self.interval == 0 {
            debug!("Interval of zero seconds, can not build a grid");
            return Vec::new();
        }
        let Some(grid_start) = now.checked_sub(self.window) else {
            debug!("Window reaches back before the unix epoch");
            return Vec::new();
        };

        let expected = self.expected_len();
        let mut backfill = Backfill {
            grid_start,
            interval: self.interval,
            next_boundary: grid_start,
            expected,
            samples: Vec::with_capacity(expected.saturating_add(1).min(MAX_PREALLOC)),
            last: Last::NoHistory,
            prev_timestamp: 0,
        };

        if let Err(TooManySamples) = backfill.run(events, now) {
            debug!("Events reach past now, more samples then the {expected} expected");
            return Vec::new();
        }

        let mut samples = backfill.samples;
        // the interval that is still in progress
        samples.pop();

        if samples.len() != expected {
            debug!(
                "Unexpected number of rank data points {}/{expected}",
                samples.len()
            );
            return Vec::new();
        }
        samples
    }
}

/// See [`Resampler::resample`]
pub fn resample(
    events: &[Event],
    now: Timestamp,
    window: Timestamp,
    interval: Timestamp,
) -> Vec<RankSample> {
    Resampler::new(window, interval).resample(events, now)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutageKind {
    CollectorDown,
    ServerUnreachable,
}

/// A run of intervals during which we have no player count
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outage {
    /// decided by the first interval of the run
    pub kind: OutageKind,
    /// indices into the resampled timeline
    pub range: Range<usize>,
}

/// Groups the unreachable intervals of a timeline
pub fn outages(samples: &[RankSample]) -> Vec<Outage> {
    samples
        .iter()
        .enumerate()
        .chunk_by(|(_, sample)| {
            matches!(
                sample,
                RankSample::CollectorDown | RankSample::ServerUnreachable
            )
        })
        .into_iter()
        .filter(|(is_outage, _)| *is_outage)
        .filter_map(|(_, mut run)| {
            let (start, first) = run.next()?;
            let end = run.last().map_or(start, |(i, _)| i) + 1;
            let kind = match first {
                RankSample::CollectorDown => OutageKind::CollectorDown,
                _ => OutageKind::ServerUnreachable,
            };
            Some(Outage {
                kind,
                range: start..end,
            })
        })
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;
    use RankSample as S;

    #[test]
    fn sentinels() {
        for sample in [
            S::NoDataYet,
            S::CollectorDown,
            S::ServerUnreachable,
            S::PlayerCount(0),
            S::PlayerCount(32),
        ] {
            assert_eq!(RankSample::try_from(sample.sentinel()), Ok(sample));
        }
        assert_eq!(RankSample::try_from(-4), Err(InvalidSentinel(-4)));
        assert_eq!(RankSample::try_from(300), Err(InvalidSentinel(300)));
    }

    #[test]
    fn runaway_timestamp_is_cut_short() {
        let events = [Event::count(0, 1), Event::count(u32::MAX as u64, 2)];
        assert!(resample(&events, 100_000, 6_000, 60).is_empty());
    }

    #[test]
    fn outage_runs() {
        let samples = [
            S::NoDataYet,
            S::PlayerCount(3),
            S::CollectorDown,
            S::CollectorDown,
            S::ServerUnreachable,
            S::PlayerCount(4),
            S::ServerUnreachable,
        ];
        assert_eq!(
            outages(&samples),
            vec![
                Outage {
                    kind: OutageKind::CollectorDown,
                    range: 2..5
                },
                Outage {
                    kind: OutageKind::ServerUnreachable,
                    range: 6..7
                },
            ]
        );
    }
}
