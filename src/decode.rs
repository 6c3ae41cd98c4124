use tracing::{debug, instrument, warn};

use crate::header;
use crate::record::{Event, Status, TimeField};
use crate::{Timestamp, MAX_PLAYERS};

/// Something off about a single record. Decoding continues past these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Violation {
    /// The player count is larger then [`MAX_PLAYERS`]. The count is still
    /// used as is.
    TooManyPlayers { offset: usize, players: u8 },
    /// The low 4 bits of an unreachable marker should be zero
    ReservedBitsSet { offset: usize, status: u8 },
}

/// Outcome of reading the next record from the body
#[derive(Debug)]
enum Step {
    Record { event: Event, consumed: usize },
    /// The status byte is there but the buffer ends within its time field
    Incomplete,
    End,
}

/// Iterates over the records in a stat file body (everything after the
/// header). Stops at the end of the body or at a partially written
/// trailing record.
#[derive(Debug)]
pub struct Records<'a> {
    body: &'a [u8],
    /// offset into body
    pos: usize,
    running: Timestamp,
    violations: Vec<Violation>,
    truncated: bool,
}

impl<'a> Records<'a> {
    pub(crate) fn new(body: &'a [u8]) -> Self {
        Self {
            body,
            pos: 0,
            running: 0,
            violations: Vec::new(),
            truncated: false,
        }
    }

    fn step(&mut self) -> Step {
        let body = self.body;
        let Some((&byte, rest)) = body[self.pos..].split_first() else {
            return Step::End;
        };

        let status = Status::parse(byte);
        self.check(status, byte);

        let Some((field, width)) = TimeField::read(status.time_encoding(), rest) else {
            return Step::Incomplete;
        };
        self.running = field.apply(self.running);

        Step::Record {
            event: Event {
                timestamp: self.running,
                state: status.state(),
            },
            consumed: 1 + width,
        }
    }

    fn check(&mut self, status: Status, byte: u8) {
        let offset = header::SIZE + self.pos;
        match status {
            Status::Count { players, .. } if players > MAX_PLAYERS => {
                warn!("Invalid player count {players} in record at byte {offset}");
                self.violations
                    .push(Violation::TooManyPlayers { offset, players });
            }
            Status::Unreachable { reserved, .. } if reserved != 0 => {
                warn!("Invalid flags in unreachable byte {byte:#010b} at byte {offset}");
                self.violations.push(Violation::ReservedBitsSet {
                    offset,
                    status: byte,
                });
            }
            Status::Count { .. } | Status::Unreachable { .. } => (),
        }
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// true if decoding stopped at a partially written record
    pub fn truncated(&self) -> bool {
        self.truncated
    }

    /// Length of the buffer (including the header) up to and including
    /// the last complete record read
    pub(crate) fn complete_len(&self) -> usize {
        header::SIZE + self.pos
    }

    /// Timestamp of the last complete record read
    pub(crate) fn last_timestamp(&self) -> Timestamp {
        self.running
    }
}

impl Iterator for Records<'_> {
    type Item = Event;

    fn next(&mut self) -> Option<Self::Item> {
        if self.truncated {
            return None;
        }

        match self.step() {
            Step::Record { event, consumed } => {
                self.pos += consumed;
                Some(event)
            }
            Step::Incomplete => {
                debug!(
                    "Last record (at byte {}) is incomplete, treating it as not yet written",
                    header::SIZE + self.pos
                );
                self.truncated = true;
                None
            }
            Step::End => None,
        }
    }
}

/// Decodes a whole stat file. Create one per buffer.
///
/// Header problems are fatal. Problems with individual records are logged,
/// collected as [`Violation`]s and otherwise ignored.
#[derive(Debug)]
pub struct RecordDecoder<'a> {
    buffer: &'a [u8],
    violations: Vec<Violation>,
    truncated: bool,
}

impl<'a> RecordDecoder<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Self {
            buffer,
            violations: Vec::new(),
            truncated: false,
        }
    }

    /// Checks the header and returns a streaming iterator over the records
    pub fn records(&self) -> Result<Records<'a>, header::Error> {
        let body = header::check_and_split_off(self.buffer)?;
        Ok(Records::new(body))
    }

    #[instrument(level = "debug", skip(self), fields(len = self.buffer.len()))]
    pub fn decode(&mut self) -> Result<Vec<Event>, header::Error> {
        let mut records = self.records()?;
        let events: Vec<_> = records.by_ref().collect();

        self.violations = records.violations;
        self.truncated = records.truncated;
        Ok(events)
    }

    /// soft violations found by the last call to [`decode`](Self::decode)
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// whether the last call to [`decode`](Self::decode) stopped at a
    /// partial record
    pub fn truncated(&self) -> bool {
        self.truncated
    }
}

/// Decode a stat file in one go, see [`RecordDecoder`]
pub fn decode(buffer: &[u8]) -> Result<Vec<Event>, header::Error> {
    RecordDecoder::new(buffer).decode()
}
