//! Loading of chunked TDB dumps into a [`TypeCatalog`].
//!
//! Chunks are discovered by probing start indices `0, chunk_size, 2 * chunk_size, ...`
//! until one is missing. The total number of types is derived from the last chunk found,
//! which may be shorter than `chunk_size`. Each chunk is fetched exactly once.

use log::{debug, info, warn};
use serde::Serialize;

use crate::{
    tdb::{raw::RawChunk, ChunkSource, TypeCatalog, TypeIndex, TypeRecord},
    target::Target,
    Error::{self, MissingChunk},
    Result,
};

/// Default index stride between two chunk files
pub const DEFAULT_CHUNK_SIZE: u32 = 1000;

/// Builds a [`TypeCatalog`] from a [`ChunkSource`]
#[derive(Debug, Clone, Copy)]
pub struct TdbLoader {
    chunk_size: u32,
}

impl Default for TdbLoader {
    fn default() -> Self {
        TdbLoader::new(DEFAULT_CHUNK_SIZE)
    }
}

impl TdbLoader {
    /// Create a loader probing chunks every `chunk_size` indices
    #[must_use]
    pub fn new(chunk_size: u32) -> Self {
        TdbLoader { chunk_size }
    }

    /// The index stride between two chunks
    #[must_use]
    pub fn chunk_size(&self) -> u32 {
        self.chunk_size
    }

    /// Load every chunk of `source` and build the catalog.
    ///
    /// # Errors
    /// Returns [`crate::Error::MissingChunk`] if there is no chunk at index 0,
    /// [`crate::Error::Malformed`] if chunks disagree about their placement or leave gaps,
    /// and any error the source reports while reading a chunk.
    pub fn load<S: ChunkSource>(&self, source: &mut S) -> Result<TypeCatalog> {
        if self.chunk_size == 0 {
            return Err(Error::Error("TDB chunk size must not be zero".to_string()));
        }

        let chunks = self.fetch_all(source)?;
        let Some((_, last)) = chunks.last() else {
            return Err(MissingChunk {
                path: source.location(0),
            });
        };

        let type_count = last.start_index as usize + last.types.len();
        info!("typeCount = {type_count}");

        let mut slots: Vec<Option<TypeRecord>> = std::iter::repeat_with(|| None)
            .take(type_count)
            .collect();

        for (start, chunk) in chunks {
            for (offset, raw) in chunk.types.into_iter().enumerate() {
                let position = start as usize + offset;
                let Some(slot) = slots.get_mut(position) else {
                    return Err(malformed_error!(
                        "Chunk {} extends past the last type index {}",
                        start,
                        type_count
                    ));
                };
                if slot.is_some() {
                    return Err(malformed_error!("Type index {} appears twice", position));
                }

                let index = TypeIndex::new(u32::try_from(position).map_err(|_| {
                    malformed_error!("Type index {} exceeds the index range", position)
                })?);
                *slot = Some(TypeRecord::from_raw(index, raw));
            }
        }

        let types = slots
            .into_iter()
            .enumerate()
            .map(|(position, slot)| {
                slot.ok_or_else(|| malformed_error!("Type index {} is not in any chunk", position))
            })
            .collect::<Result<Vec<_>>>()?;

        TypeCatalog::new(types)
    }

    fn fetch_all<S: ChunkSource>(&self, source: &mut S) -> Result<Vec<(u32, RawChunk)>> {
        let mut chunks = Vec::new();
        let mut start = 0u32;

        while let Some(chunk) = source.fetch(start)? {
            // The type count derives from the last start index, so it must be the probed one
            if chunk.start_index != start {
                return Err(malformed_error!(
                    "Chunk {} declares start index {}",
                    start,
                    chunk.start_index
                ));
            }
            info!("    {start}");
            debug!("Chunk {start} holds {} types", chunk.types.len());
            chunks.push((start, chunk));

            let Some(next) = start.checked_add(self.chunk_size) else {
                break;
            };
            start = next;
        }

        Ok(chunks)
    }
}

/// Outcome of the type definition label pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LabelReport {
    /// Labels that were created
    pub created: usize,
    /// Labels the target rejected
    pub failed: usize,
}

/// Place a `"<prefix><full name>"` label at the type definition address of every type.
///
/// Rejected labels are logged and counted, they never abort the import.
pub fn apply_type_labels<T: Target>(
    catalog: &TypeCatalog,
    target: &mut T,
    prefix: &str,
) -> LabelReport {
    let mut report = LabelReport::default();

    for record in catalog {
        let label = format!("{prefix}{}", record.full_name);
        match target.create_label(record.type_def_address, &label) {
            Ok(()) => report.created += 1,
            Err(error) => {
                warn!(
                    "Couldn't create type def label for type {}: {error}",
                    record.full_name
                );
                report.failed += 1;
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        tdb::MemorySource,
        target::Program,
        test::{raw_chunk, raw_type},
    };

    #[test]
    fn test_short_last_chunk() {
        let mut source: MemorySource = [raw_chunk(0, 1000), raw_chunk(1000, 37)]
            .into_iter()
            .collect();

        let catalog = TdbLoader::default().load(&mut source).unwrap();

        assert_eq!(catalog.len(), 1037);
        assert_eq!(catalog[TypeIndex(1036)].full_name, "app.Type1036");
        assert_eq!(source.probe_count(0), 1);
        assert_eq!(source.probe_count(1000), 1);
        assert_eq!(source.probe_count(2000), 1);
        assert_eq!(source.probe_count(3000), 0);
    }

    #[test]
    fn test_missing_first_chunk() {
        let mut source = MemorySource::new();
        let result = TdbLoader::default().load(&mut source);
        assert!(matches!(result, Err(Error::MissingChunk { .. })));
    }

    #[test]
    fn test_probe_stops_at_gap() {
        let mut source: MemorySource = [raw_chunk(0, 4), raw_chunk(8, 4)].into_iter().collect();

        let catalog = TdbLoader::new(4).load(&mut source).unwrap();
        assert_eq!(catalog.len(), 4);
        assert_eq!(source.probe_count(8), 0);
    }

    #[test]
    fn test_start_index_mismatch() {
        let mut source = MemorySource::new();
        source.insert(raw_chunk(0, 4));
        source.insert_at(4, raw_chunk(5, 4));

        let result = TdbLoader::new(4).load(&mut source);
        assert!(matches!(result, Err(Error::Malformed { .. })));
    }

    #[test]
    fn test_huge_start_index_rejected_before_allocation() {
        let mut source = MemorySource::new();
        let mut chunk = raw_chunk(0, 1);
        chunk.start_index = 4_000_000_000;
        source.insert_at(0, chunk);

        let result = TdbLoader::default().load(&mut source);
        assert!(matches!(result, Err(Error::Malformed { .. })));
        assert_eq!(source.probe_count(1000), 0);
    }

    #[test]
    fn test_short_middle_chunk() {
        let mut source: MemorySource = [raw_chunk(0, 3), raw_chunk(4, 2)].into_iter().collect();

        let result = TdbLoader::new(4).load(&mut source);
        assert!(matches!(result, Err(Error::Malformed { .. })));
    }

    #[test]
    fn test_overlong_chunk() {
        let mut source: MemorySource = [raw_chunk(0, 6), raw_chunk(4, 1)].into_iter().collect();

        let result = TdbLoader::new(4).load(&mut source);
        assert!(matches!(result, Err(Error::Malformed { .. })));
    }

    #[test]
    fn test_zero_chunk_size() {
        let mut source: MemorySource = [raw_chunk(0, 1)].into_iter().collect();
        assert!(TdbLoader::new(0).load(&mut source).is_err());
    }

    #[test]
    fn test_type_labels() {
        let mut first = raw_type("app.Mapped");
        first.type_def_address = 0x1_4000_1000;
        let mut second = raw_type("app.Unmapped");
        second.type_def_address = 0;

        let mut source: MemorySource = [RawChunk {
            start_index: 0,
            types: vec![first, second],
        }]
        .into_iter()
        .collect();
        let catalog = TdbLoader::default().load(&mut source).unwrap();

        let mut program = Program::new();
        let report = apply_type_labels(&catalog, &mut program, "TypeDef:");

        assert_eq!(report, LabelReport { created: 1, failed: 1 });
        assert_eq!(
            program.labels_at(0x1_4000_1000),
            ["TypeDef:app.Mapped".to_string()]
        );
    }
}
