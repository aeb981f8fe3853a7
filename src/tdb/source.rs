//! Sources of TDB chunks.
//!
//! The loader only knows chunks by their start index. A [`ChunkSource`] maps a start index
//! to a parsed [`RawChunk`], or reports that no chunk exists there, which ends the probe.

use std::{
    collections::BTreeMap,
    fs,
    io::{BufReader, ErrorKind},
    path::{Path, PathBuf},
};

use crate::{tdb::raw::RawChunk, Result};

/// Provides TDB chunks by start index
pub trait ChunkSource {
    /// Fetch and parse the chunk starting at `start`.
    ///
    /// Returns `Ok(None)` if no such chunk exists.
    ///
    /// # Errors
    /// Returns an error if the chunk exists but can not be read or parsed.
    fn fetch(&mut self, start: u32) -> Result<Option<RawChunk>>;

    /// Describe where the chunk starting at `start` is expected, for error messages.
    fn location(&self, start: u32) -> PathBuf;
}

/// Chunks stored as `<start>.json` files in one directory
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    /// Create a source reading from `root`
    pub fn new(root: impl AsRef<Path>) -> Self {
        DirectorySource {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// The directory chunks are read from
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ChunkSource for DirectorySource {
    fn fetch(&mut self, start: u32) -> Result<Option<RawChunk>> {
        let path = self.location(start);
        let file = match fs::File::open(&path) {
            Ok(file) => file,
            Err(error) if error.kind() == ErrorKind::NotFound => return Ok(None),
            Err(error) => return Err(error.into()),
        };

        let chunk = serde_json::from_reader(BufReader::new(file))?;
        Ok(Some(chunk))
    }

    fn location(&self, start: u32) -> PathBuf {
        self.root.join(format!("{start}.json"))
    }
}

/// Chunks that are already parsed and held in memory.
///
/// Every fetch is counted, which lets callers check how often a start index was probed.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    chunks: BTreeMap<u32, RawChunk>,
    probes: BTreeMap<u32, usize>,
}

impl MemorySource {
    /// Create an empty source
    #[must_use]
    pub fn new() -> Self {
        MemorySource::default()
    }

    /// Add a chunk, keyed by its own `start_index`
    pub fn insert(&mut self, chunk: RawChunk) {
        self.chunks.insert(chunk.start_index, chunk);
    }

    /// Add a chunk under an explicit start index, regardless of its `start_index`
    pub fn insert_at(&mut self, start: u32, chunk: RawChunk) {
        self.chunks.insert(start, chunk);
    }

    /// Number of times the chunk at `start` was fetched
    #[must_use]
    pub fn probe_count(&self, start: u32) -> usize {
        self.probes.get(&start).copied().unwrap_or(0)
    }
}

impl FromIterator<RawChunk> for MemorySource {
    fn from_iter<I: IntoIterator<Item = RawChunk>>(iter: I) -> Self {
        let mut source = MemorySource::new();
        for chunk in iter {
            source.insert(chunk);
        }
        source
    }
}

impl ChunkSource for MemorySource {
    fn fetch(&mut self, start: u32) -> Result<Option<RawChunk>> {
        *self.probes.entry(start).or_default() += 1;
        Ok(self.chunks.get(&start).cloned())
    }

    fn location(&self, start: u32) -> PathBuf {
        PathBuf::from(format!("<memory>/{start}.json"))
    }
}
