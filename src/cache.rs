//! Keeps raw stat files around so changing the time window only needs
//! a new decode and resample, not a new fetch. Only bytes are cached,
//! timelines depend on the time and are always rebuilt.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;

use tracing::{debug, instrument};

use crate::decode::RecordDecoder;
use crate::{header, Config, Granularity, RankSample, Resampler, Timestamp};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Key {
    pub server: String,
    pub granularity: Granularity,
}

impl Key {
    pub fn new(server: impl Into<String>, granularity: Granularity) -> Self {
        Self {
            server: server.into(),
            granularity,
        }
    }
}

/// Where stat files come from
pub trait Source {
    type Error: std::error::Error;
    fn fetch(&mut self, key: &Key) -> Result<Vec<u8>, Self::Error>;
}

/// Reads `<root>/<live|avg>/<server>.dat`
#[derive(Debug, Clone)]
pub struct FileSource {
    root: PathBuf,
}

impl FileSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path(&self, key: &Key) -> PathBuf {
        self.root
            .join(key.granularity.dir())
            .join(format!("{}.dat", key.server))
    }
}

impl Source for FileSource {
    type Error = io::Error;

    fn fetch(&mut self, key: &Key) -> Result<Vec<u8>, Self::Error> {
        fs::read(self.path(key))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error<E: std::error::Error> {
    #[error("Could not fetch stat file: {0}")]
    Fetch(E),
    #[error("Stat file is not usable: {0}")]
    Format(header::Error),
}

#[derive(Debug)]
pub struct StatCache<S> {
    source: S,
    buffers: HashMap<Key, Vec<u8>>,
}

impl<S: Source> StatCache<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            buffers: HashMap::new(),
        }
    }

    /// Fetch failures are not cached
    pub fn buffer(&mut self, key: &Key) -> Result<&[u8], Error<S::Error>> {
        let buffer = match self.buffers.entry(key.clone()) {
            Entry::Occupied(cached) => {
                debug!("Use cached: {key:?}");
                cached.into_mut()
            }
            Entry::Vacant(empty) => {
                debug!("Fetch: {key:?}");
                empty.insert(self.source.fetch(key).map_err(Error::Fetch)?)
            }
        };
        Ok(buffer.as_slice())
    }

    /// Timeline for the window in `config` ending at `now`. Empty if the
    /// stat file does not cover the window consistently.
    #[instrument(level = "debug", skip(self, config))]
    pub fn timeline(
        &mut self,
        server: &str,
        config: &Config,
        now: Timestamp,
    ) -> Result<Vec<RankSample>, Error<S::Error>> {
        let key = Key::new(server, config.granularity());
        let buffer = self.buffer(&key)?;
        let events = RecordDecoder::new(buffer)
            .decode()
            .map_err(Error::Format)?;
        Ok(Resampler::from_config(config).resample(&events, now))
    }

    pub fn into_source(self) -> S {
        self.source
    }

    pub fn is_cached(&self, key: &Key) -> bool {
        self.buffers.contains_key(key)
    }

    /// Next access to `key` fetches again
    pub fn invalidate(&mut self, key: &Key) {
        self.buffers.remove(key);
    }

    /// Drop everything, done when the server list refreshes
    pub fn clear(&mut self) {
        self.buffers.clear();
    }
}
