use std::{
    fs,
    path::{Path, PathBuf},
};

use log::{debug, info, warn};
use serde::Serialize;

use crate::{
    memory::MappedFile,
    target::{RegionPermissions, Target},
    Error::InvalidChunkName,
    Result,
};

/// Number of hex digits encoding the base address in a chunk file name
const ADDRESS_DIGITS: usize = 16;
/// Extension of memory chunk files
const CHUNK_EXTENSION: &str = ".bin";

/// A memory dump file and the address it belongs at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryChunk {
    /// File on disk
    pub path: PathBuf,
    /// File name, used as region name
    pub name: String,
    /// First address of the region
    pub base: u64,
}

/// Outcome of a memory import
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MemoryReport {
    /// Regions created
    pub imported: usize,
    /// Chunks that could not be read or mapped
    pub failed: usize,
    /// Bytes copied into the target
    pub bytes: u64,
}

/// Parse the base address out of a chunk file name.
///
/// Valid names consist of exactly 16 lowercase hex digits followed by `.bin`, e.g.
/// `0000000140000000.bin`.
///
/// # Errors
/// Returns [`crate::Error::InvalidChunkName`] for any other name.
pub fn parse_chunk_name(name: &str) -> Result<u64> {
    let digits = name
        .strip_suffix(CHUNK_EXTENSION)
        .filter(|digits| {
            digits.len() == ADDRESS_DIGITS
                && digits.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
        })
        .ok_or_else(|| InvalidChunkName(name.to_string()))?;

    u64::from_str_radix(digits, 16).map_err(|_| InvalidChunkName(name.to_string()))
}

/// List all memory chunks in `dir`, sorted by base address.
///
/// Files that do not follow the naming scheme are skipped.
///
/// # Errors
/// Returns [`crate::Error::FileError`] if the directory cannot be read.
pub fn discover_chunks(dir: impl AsRef<Path>) -> Result<Vec<MemoryChunk>> {
    let mut chunks = Vec::new();

    for entry in fs::read_dir(dir.as_ref())? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }

        let name = entry.file_name().to_string_lossy().into_owned();
        match parse_chunk_name(&name) {
            Ok(base) => chunks.push(MemoryChunk {
                path: entry.path(),
                name,
                base,
            }),
            Err(_) => debug!("Skipping {name}, not a memory chunk"),
        }
    }

    chunks.sort_by_key(|chunk| chunk.base);
    Ok(chunks)
}

/// Map every chunk of `dir` into `target` as a readable, writable and executable region.
///
/// Chunks that cannot be read or that the target rejects are logged and counted.
///
/// # Errors
/// Returns [`crate::Error::FileError`] if the directory cannot be read.
pub fn import_memory<T: Target>(dir: impl AsRef<Path>, target: &mut T) -> Result<MemoryReport> {
    let permissions = RegionPermissions::READ | RegionPermissions::WRITE | RegionPermissions::EXECUTE;
    let mut report = MemoryReport::default();

    for chunk in discover_chunks(dir)? {
        info!("Importing {}", chunk.name);

        let mapped = match MappedFile::open(&chunk.path) {
            Ok(mapped) => mapped,
            Err(error) => {
                warn!("could not read {}: {error}", chunk.path.display());
                report.failed += 1;
                continue;
            }
        };

        match target.create_memory_region(&chunk.name, chunk.base, mapped.data(), permissions) {
            Ok(()) => {
                report.imported += 1;
                report.bytes += mapped.len() as u64;
            }
            Err(error) => {
                warn!(
                    "could not create region {} at 0x{:016x}: {error}",
                    chunk.name, chunk.base
                );
                report.failed += 1;
            }
        }
    }

    info!("Done");
    Ok(report)
}
