use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Exp};
use rand_xoshiro::Xoshiro128StarStar;
use rankseries::{Event, Timestamp, MAX_PLAYERS};

pub fn setup_tracing() {
    use tracing_error::ErrorLayer;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::builder()
        .from_env()
        .unwrap()
        .add_directive("rankseries=debug".parse().unwrap());

    let fmt = fmt::layer()
        .pretty()
        .with_line_number(true)
        .with_test_writer();

    let _ignore_err = tracing_subscriber::registry()
        .with(ErrorLayer::default())
        .with(filter)
        .with(fmt)
        .try_init();
}

/// Generates what a stat collector would have written, including the
/// odd unreachable stretch, restarts and long gaps.
pub struct HistoryGen {
    rng: Xoshiro128StarStar,
    poll_gap: Exp<f64>,
    time: Timestamp,
    players: u8,
}

impl HistoryGen {
    /// Polls happen on average once every `mean_gap` seconds
    pub fn from_seed(seed: u64, start: Timestamp, mean_gap: f64) -> Self {
        Self {
            rng: Xoshiro128StarStar::seed_from_u64(seed),
            poll_gap: Exp::new(1.0 / mean_gap).expect("mean_gap should be positive"),
            time: start,
            players: 0,
        }
    }

    fn next_gap(&mut self) -> Timestamp {
        // rarely the collector is gone for a long time
        if self.rng.random_bool(0.01) {
            self.rng.random_range(70_000..500_000)
        } else {
            self.poll_gap.sample(&mut self.rng).round() as Timestamp
        }
    }

    pub fn events(&mut self, n: usize) -> Vec<Event> {
        let mut events = Vec::with_capacity(n);
        while events.len() < n {
            self.time += self.next_gap();
            match self.rng.random_range(0..100) {
                0..=2 => {
                    events.push(Event::count(self.time, self.players));
                    events.push(Event::unreachable(self.time));
                }
                3..=7 => events.push(Event::unreachable(self.time)),
                _ => {
                    let step: i16 = self.rng.random_range(-3..=3);
                    self.players =
                        (self.players as i16 + step).clamp(0, MAX_PLAYERS as i16) as u8;
                    events.push(Event::count(self.time, self.players));
                }
            }
        }
        events.truncate(n);
        events
    }
}
