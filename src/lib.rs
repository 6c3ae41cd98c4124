pub mod cache;
pub mod config;
pub mod decode;
pub mod encode;
pub mod header;
pub mod record;
pub mod resample;

pub use cache::StatCache;
pub use config::{Config, Granularity};
pub use decode::{decode, RecordDecoder, Violation};
pub use encode::RecordEncoder;
pub use header::Error as FormatError;
pub use record::{Event, State};
pub use resample::{resample, RankSample, Resampler};

/// Seconds since the unix epoch
pub type Timestamp = u64;

/// Highest player count a server can report, anything above is logged
/// as a violation but still passed through.
pub const MAX_PLAYERS: u8 = 32;
