use ron::ser::PrettyConfig;
use serde::{Deserialize, Serialize};

use crate::Timestamp;

const DAY: Timestamp = 24 * 60 * 60;

/// Stat files come in two flavors, both with their own interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Granularity {
    /// One point per minute
    Live,
    /// Hourly averages
    Averaged,
}

impl Granularity {
    pub const LIVE_INTERVAL: Timestamp = 60;
    pub const AVERAGED_INTERVAL: Timestamp = 60 * 60;
    /// Windows longer then this use averaged data by default
    pub const DEFAULT_AVG_THRESHOLD: Timestamp = 30 * DAY;

    pub fn interval(self) -> Timestamp {
        match self {
            Granularity::Live => Self::LIVE_INTERVAL,
            Granularity::Averaged => Self::AVERAGED_INTERVAL,
        }
    }

    pub fn for_window(window: Timestamp) -> Self {
        Self::for_window_with_threshold(window, Self::DEFAULT_AVG_THRESHOLD)
    }

    pub fn for_window_with_threshold(window: Timestamp, threshold: Timestamp) -> Self {
        if window > threshold {
            Granularity::Averaged
        } else {
            Granularity::Live
        }
    }

    /// directory the stat files of this granularity are served from
    pub fn dir(self) -> &'static str {
        match self {
            Granularity::Live => "live",
            Granularity::Averaged => "avg",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Failed to deserialize config: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("Could not serialize the config to a ron encoded string: {0}")]
    Serialize(ron::Error),
    #[error(
        "The time window ({window}s) must span at least one interval ({interval}s)"
    )]
    WindowTooShort {
        window: Timestamp,
        interval: Timestamp,
    },
}

/// What part of the history to show and at what resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// seconds of history before now
    pub window: Timestamp,
    /// If None the granularity follows from the window, see
    /// [`Granularity::for_window_with_threshold`]
    pub granularity: Option<Granularity>,
    pub avg_threshold: Timestamp,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            window: 7 * DAY,
            granularity: None,
            avg_threshold: Granularity::DEFAULT_AVG_THRESHOLD,
        }
    }
}

impl Config {
    pub fn from_ron(text: &str) -> Result<Self, Error> {
        let config: Self = ron::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_ron(&self) -> Result<String, Error> {
        ron::ser::to_string_pretty(self, PrettyConfig::new()).map_err(Error::Serialize)
    }

    pub fn validate(&self) -> Result<(), Error> {
        let interval = self.interval();
        if self.window < interval {
            return Err(Error::WindowTooShort {
                window: self.window,
                interval,
            });
        }
        Ok(())
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity.unwrap_or_else(|| {
            Granularity::for_window_with_threshold(self.window, self.avg_threshold)
        })
    }

    pub fn interval(&self) -> Timestamp {
        self.granularity().interval()
    }

    /// Change the window, the granularity follows unless it was forced.
    /// Returns true if that changed the granularity.
    pub fn set_window(&mut self, window: Timestamp) -> bool {
        let before = self.granularity();
        self.window = window;
        before != self.granularity()
    }
}
