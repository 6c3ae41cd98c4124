use tracing::{instrument, warn};

use crate::decode::RecordDecoder;
use crate::header;
use crate::record::{Event, State, Status, TimeEncoding, TimeField};
use crate::Timestamp;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("Player count {0} does not fit in the 6 bits of a status byte")]
    TooManyPlayers(u8),
    #[error("Timestamp {0} is past the largest time (u32::MAX) a stat file can hold")]
    TimeOutOfRange(Timestamp),
    #[error("Can not append to existing stat file: {0}")]
    Existing(header::Error),
}

/// Writes stat files. Records are stored with the smallest time field
/// that can reach them from the previous record.
#[derive(Debug)]
pub struct RecordEncoder {
    buffer: Vec<u8>,
    /// time of the last record written, the decoder starts counting at zero
    last: Timestamp,
}

impl Default for RecordEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordEncoder {
    /// New file, only the header
    pub fn new() -> Self {
        Self {
            buffer: header::to_bytes().to_vec(),
            last: 0,
        }
    }

    /// Continue writing after the records in `buffer`. A partial trailing
    /// record is removed first.
    #[instrument(level = "debug", skip(buffer), fields(len = buffer.len()))]
    pub fn append_to(mut buffer: Vec<u8>) -> Result<Self, Error> {
        let mut records = RecordDecoder::new(&buffer)
            .records()
            .map_err(Error::Existing)?;
        records.by_ref().for_each(drop);

        let complete_len = records.complete_len();
        let last = records.last_timestamp();
        if records.truncated() {
            warn!(
                "Last write incomplete, truncating {} bytes",
                buffer.len() - complete_len
            );
        }
        buffer.truncate(complete_len);

        Ok(Self { buffer, last })
    }

    pub fn push(&mut self, event: Event) -> Result<(), Error> {
        let (field, time) = TimeField::smallest(self.last, event.timestamp)
            .ok_or(Error::TimeOutOfRange(event.timestamp))?;

        let status = match event.state {
            State::PlayerCount(players) if players > 0b0011_1111 => {
                return Err(Error::TooManyPlayers(players))
            }
            State::PlayerCount(players) => Status::Count { players, time },
            State::Unreachable => Status::Unreachable { time, reserved: 0 },
        };

        self.buffer.push(status.to_byte());
        field.write(time, &mut self.buffer);
        self.last = event.timestamp;
        Ok(())
    }

    /// The collector logs this when it starts up. The marker gets the time
    /// of the last record which is how readers tell the collector was down
    /// from the server being unreachable.
    pub fn mark_restart(&mut self) {
        let status = Status::Unreachable {
            time: TimeEncoding::Delta8,
            reserved: 0,
        };
        self.buffer.push(status.to_byte());
        TimeField::Delta(0).write(status.time_encoding(), &mut self.buffer);
    }

    pub fn last_timestamp(&self) -> Timestamp {
        self.last
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    pub fn finish(self) -> Vec<u8> {
        self.buffer
    }
}

/// Encode events into a complete stat file
pub fn encode(events: impl IntoIterator<Item = Event>) -> Result<Vec<u8>, Error> {
    let mut encoder = RecordEncoder::new();
    for event in events {
        encoder.push(event)?;
    }
    Ok(encoder.finish())
}
