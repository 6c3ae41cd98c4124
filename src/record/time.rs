use super::TimeEncoding;
use crate::Timestamp;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeField {
    Delta(u16),
    Absolute(u32),
}

impl TimeField {
    /// returns None if the field is cut off by the end of `bytes`, otherwise
    /// the field and the number of bytes it took
    pub(crate) fn read(encoding: TimeEncoding, bytes: &[u8]) -> Option<(Self, usize)> {
        let field = match encoding {
            TimeEncoding::Delta8 => Self::Delta(*bytes.first()? as u16),
            TimeEncoding::Delta16 => {
                let (raw, _) = bytes.split_first_chunk::<2>()?;
                Self::Delta(u16::from_le_bytes(*raw))
            }
            TimeEncoding::Absolute32 => {
                let (raw, _) = bytes.split_first_chunk::<4>()?;
                Self::Absolute(u32::from_le_bytes(*raw))
            }
        };
        Some((field, encoding.width()))
    }

    /// Pick the smallest field able to step from `prev` to `next`. Going
    /// back in time always needs an absolute field.
    ///
    /// Returns None if `next` can not be stored at all (beyond u32::MAX).
    pub(crate) fn smallest(prev: Timestamp, next: Timestamp) -> Option<(Self, TimeEncoding)> {
        match next.checked_sub(prev) {
            Some(delta) if delta <= u8::MAX as u64 => {
                Some((Self::Delta(delta as u16), TimeEncoding::Delta8))
            }
            Some(delta) if delta <= u16::MAX as u64 => {
                Some((Self::Delta(delta as u16), TimeEncoding::Delta16))
            }
            Some(_) | None => {
                let abs = u32::try_from(next).ok()?;
                Some((Self::Absolute(abs), TimeEncoding::Absolute32))
            }
        }
    }

    pub(crate) fn apply(self, running: Timestamp) -> Timestamp {
        match self {
            Self::Delta(delta) => running + delta as Timestamp,
            Self::Absolute(time) => time as Timestamp,
        }
    }

    pub(crate) fn write(self, encoding: TimeEncoding, out: &mut Vec<u8>) {
        match (self, encoding) {
            (Self::Delta(delta), TimeEncoding::Delta8) => out.push(delta as u8),
            (Self::Delta(delta), TimeEncoding::Delta16) => {
                out.extend_from_slice(&delta.to_le_bytes())
            }
            (Self::Absolute(time), TimeEncoding::Absolute32) => {
                out.extend_from_slice(&time.to_le_bytes())
            }
            (field, encoding) => {
                unreachable!("time field {field:?} can not be encoded as {encoding:?}")
            }
        }
    }
}
