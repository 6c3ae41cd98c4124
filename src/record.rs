//! A record is one status byte followed by a time field. The status byte
//! either holds a player count or marks the server as unreachable. Both
//! variants select the width of the time field that follows, they just
//! keep that selector in different bits:
//!
//! ```text
//!  count:        [ s s c c c c c c ]   s: time selector, c: player count
//!  unreachable:  [ 1 1 s s 0 0 0 0 ]   s: time selector, 0: reserved
//! ```
//!
//! The selector is `00` for an 8 bit delta, `01` for a 16 bit delta and
//! `10` for a 32 bit absolute time.

pub(crate) mod time;

pub use time::TimeField;

use crate::Timestamp;

const TIME16: u8 = 0b0100_0000;
const TIME32: u8 = 0b1000_0000;
const SELECTOR_MASK: u8 = TIME16 | TIME32;
const UNREACHABLE: u8 = SELECTOR_MASK;
const COUNT_MASK: u8 = !SELECTOR_MASK;
const RESERVED_MASK: u8 = 0b0000_1111;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum State {
    PlayerCount(u8),
    Unreachable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Event {
    pub timestamp: Timestamp,
    pub state: State,
}

impl Event {
    pub fn count(timestamp: Timestamp, players: u8) -> Self {
        Self {
            timestamp,
            state: State::PlayerCount(players),
        }
    }

    pub fn unreachable(timestamp: Timestamp) -> Self {
        Self {
            timestamp,
            state: State::Unreachable,
        }
    }
}

/// How the time field following a status byte is stored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeEncoding {
    Delta8,
    Delta16,
    Absolute32,
}

impl TimeEncoding {
    /// Takes the two selector bits in their count position (bits 7 and 6).
    /// The 32 bit flag wins if both are set.
    fn from_selector(bits: u8) -> Self {
        if bits & TIME32 != 0 {
            Self::Absolute32
        } else if bits & TIME16 != 0 {
            Self::Delta16
        } else {
            Self::Delta8
        }
    }

    fn selector(self) -> u8 {
        match self {
            Self::Delta8 => 0,
            Self::Delta16 => TIME16,
            Self::Absolute32 => TIME32,
        }
    }

    /// number of bytes in the time field
    pub fn width(self) -> usize {
        match self {
            Self::Delta8 => 1,
            Self::Delta16 => 2,
            Self::Absolute32 => 4,
        }
    }
}

/// The status byte split into what it means
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Count {
        /// not checked against [`MAX_PLAYERS`](crate::MAX_PLAYERS) here
        players: u8,
        time: TimeEncoding,
    },
    Unreachable {
        time: TimeEncoding,
        /// low 4 bits, should always be zero
        reserved: u8,
    },
}

impl Status {
    pub fn parse(byte: u8) -> Self {
        if byte & SELECTOR_MASK == UNREACHABLE {
            // the unreachable marker takes the selector space, the real
            // selector moved two bits down
            Self::Unreachable {
                time: TimeEncoding::from_selector((byte << 2) & SELECTOR_MASK),
                reserved: byte & RESERVED_MASK,
            }
        } else {
            Self::Count {
                players: byte & COUNT_MASK,
                time: TimeEncoding::from_selector(byte & SELECTOR_MASK),
            }
        }
    }

    /// # Panics
    /// If the player count does not fit in the 6 available bits
    pub fn to_byte(self) -> u8 {
        match self {
            Self::Count { players, time } => {
                assert!(
                    players <= COUNT_MASK,
                    "player count {players} does not fit in a status byte"
                );
                time.selector() | players
            }
            Self::Unreachable { time, reserved } => {
                UNREACHABLE | (time.selector() >> 2) | (reserved & RESERVED_MASK)
            }
        }
    }

    pub fn time_encoding(&self) -> TimeEncoding {
        match self {
            Self::Count { time, .. } | Self::Unreachable { time, .. } => *time,
        }
    }

    pub fn state(&self) -> State {
        match self {
            Self::Count { players, .. } => State::PlayerCount(*players),
            Self::Unreachable { .. } => State::Unreachable,
        }
    }
}
