pub(crate) const VERSION: u32 = 1;
pub(crate) const MAGIC: [u8; 4] = *b"SVTK";

/// version (u32 little endian) followed by the magic bytes
pub const SIZE: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("Stat file is {len} bytes, too short to hold the 8 byte header")]
    Truncated { len: usize },
    #[error("Invalid stat file version: {found} != 1")]
    UnsupportedVersion { found: u32 },
    #[error("Invalid stat file magic bytes: {found:?} should be \"SVTK\"")]
    BadMagic { found: [u8; 4] },
}

/// Checks the header and returns the body that follows it
pub(crate) fn check_and_split_off(buffer: &[u8]) -> Result<&[u8], Error> {
    let Some((header, body)) = buffer.split_first_chunk::<SIZE>() else {
        return Err(Error::Truncated { len: buffer.len() });
    };

    let [v0, v1, v2, v3, magic @ ..] = *header;
    let version = u32::from_le_bytes([v0, v1, v2, v3]);
    if version != VERSION {
        return Err(Error::UnsupportedVersion { found: version });
    }

    if magic != MAGIC {
        return Err(Error::BadMagic { found: magic });
    }

    Ok(body)
}

pub(crate) fn to_bytes() -> [u8; SIZE] {
    let mut header = [0u8; SIZE];
    header[0..4].copy_from_slice(&VERSION.to_le_bytes());
    header[4..8].copy_from_slice(&MAGIC);
    header
}
