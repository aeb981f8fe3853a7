//! Physical field layout of structured types.
//!
//! For every type that gets a layout the resolver:
//!
//! 1. collects the fields of the type and of all its ancestors, placing each at its declared
//!    offset plus the header length of the type being laid out,
//! 2. puts the `$vtable` and `$lock` slots in front if the header is at least 16 bytes,
//! 3. sorts everything by offset (stable),
//! 4. walks the sorted fields with a cursor, inserting filler bytes into gaps and skipping
//!    fields that overlap what is already placed,
//! 5. pads the result up to the declared size,
//! 6. appends the bookkeeping fields and a sample element array for array containers.
//!
//! The output is a pure function of the catalog and the handles.

use std::fmt;

use log::{info, warn};
use serde::Serialize;

use crate::{
    layout::{Storage, TypeHandles, TypeRepr},
    tdb::{TypeCatalog, TypeIndex, TypeRecord},
    target::{DataType, Member, ScalarKind, Target, POINTER_SIZE},
    Result,
};

/// Header length from which a type carries `$vtable` and `$lock` slots
pub const OBJECT_HEADER_THRESHOLD: i64 = 16;
/// Name of the vtable slot at offset 0
pub const VTABLE_FIELD: &str = "$vtable";
/// Name of the lock slot at offset 8
pub const LOCK_FIELD: &str = "$lock";
/// Bookkeeping fields in front of the elements of an array container
pub const DEARRAY_HEADER_FIELDS: [&str; 4] = ["$x", "$y", "$rank", "$count"];
/// Name of the element trailer of an array container
pub const DEARRAY_DATA_FIELD: &str = "$data";
/// Default element count of the `$data` trailer.
///
/// The trailer only gives tools something to display, the real length is in `$count`.
pub const DEFAULT_DEARRAY_SAMPLE_LEN: u32 = 42;

/// A non-fatal problem found while laying out a type
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind")]
pub enum LayoutWarning {
    /// A field starts inside a previously placed field and was skipped
    Overlap {
        /// Type being laid out
        type_name: String,
        /// Skipped field
        field_name: String,
        /// Absolute offset of the skipped field
        offset: i64,
        /// End of the previously placed data
        cursor: u64,
    },
    /// The placed fields extend past the declared size
    Overflow {
        /// Type being laid out
        type_name: String,
        /// End of the placed fields
        occupied: u64,
        /// Declared size
        size: u32,
    },
}

impl fmt::Display for LayoutWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutWarning::Overlap {
                type_name,
                field_name,
                offset,
                cursor,
            } => write!(
                f,
                "skipped field {field_name} for type {type_name} because of overlap (offset 0x{offset:x}, occupied up to 0x{cursor:x})"
            ),
            LayoutWarning::Overflow {
                type_name,
                occupied,
                size,
            } => write!(
                f,
                "member overflow size for type {type_name} (0x{occupied:x} > 0x{size:x})"
            ),
        }
    }
}

/// The computed layout of one type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructLayout {
    /// The type that was laid out
    pub type_index: TypeIndex,
    /// Members in offset order, fillers and trailer included
    pub members: Vec<Member>,
    /// End of the fields and padding, before any array trailer
    pub occupied: u64,
    /// Problems found on the way
    pub warnings: Vec<LayoutWarning>,
}

/// Outcome of laying out a whole catalog
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolveReport {
    /// Types whose structure was rebuilt
    pub resolved: usize,
    /// Primitives, placeholders and generic definitions
    pub skipped: usize,
    /// All warnings in catalog order
    pub warnings: Vec<LayoutWarning>,
}

struct Candidate<'a> {
    offset: i64,
    name: &'a str,
    storage: Storage,
}

/// Computes structure layouts from a catalog and its registered handles
#[derive(Debug, Clone, Copy)]
pub struct LayoutResolver<'a> {
    catalog: &'a TypeCatalog,
    handles: &'a TypeHandles,
    dearray_sample_len: u32,
}

impl<'a> LayoutResolver<'a> {
    /// Create a resolver.
    ///
    /// `handles` must come from registering `catalog`.
    #[must_use]
    pub fn new(catalog: &'a TypeCatalog, handles: &'a TypeHandles) -> Self {
        LayoutResolver {
            catalog,
            handles,
            dearray_sample_len: DEFAULT_DEARRAY_SAMPLE_LEN,
        }
    }

    /// Set the element count of the `$data` trailer of array containers
    #[must_use]
    pub fn with_dearray_sample_len(mut self, len: u32) -> Self {
        self.dearray_sample_len = len;
        self
    }

    /// Returns true if the type gets a layout: it is backed by a structure and is neither a
    /// placeholder nor an uninstantiated generic definition.
    #[must_use]
    pub fn needs_layout(&self, record: &TypeRecord) -> bool {
        matches!(self.handles.get(record.index), Some(TypeRepr::Structure(_)))
            && !record.is_placeholder
            && !record.is_template_definition
    }

    /// Compute the layout of one type without touching any target.
    #[must_use]
    pub fn compute(&self, index: TypeIndex) -> StructLayout {
        let record = &self.catalog[index];
        let candidates = self.collect_candidates(record);

        let mut members = Vec::with_capacity(candidates.len() * 2 + 1);
        let mut warnings = Vec::new();
        let mut cursor = 0u64;

        for candidate in candidates {
            if candidate.storage.length == 0 {
                continue;
            }

            let offset = match u64::try_from(candidate.offset) {
                Ok(offset) if offset >= cursor => offset,
                _ => {
                    warnings.push(LayoutWarning::Overlap {
                        type_name: record.full_name.clone(),
                        field_name: candidate.name.to_string(),
                        offset: candidate.offset,
                        cursor,
                    });
                    continue;
                }
            };

            if cursor < offset {
                members.push(Member::filler(cursor, offset - cursor));
                cursor = offset;
            }

            members.push(Member::field(
                cursor,
                candidate.name,
                candidate.storage.data_type,
                candidate.storage.length,
            ));
            cursor += candidate.storage.length;
        }

        let size = u64::from(record.size);
        if cursor > size {
            warnings.push(LayoutWarning::Overflow {
                type_name: record.full_name.clone(),
                occupied: cursor,
                size: record.size,
            });
        } else if cursor < size {
            members.push(Member::filler(cursor, size - cursor));
            cursor = size;
        }
        let occupied = cursor;

        if let Some(element) = record.element {
            for name in DEARRAY_HEADER_FIELDS {
                members.push(Member::field(
                    cursor,
                    name,
                    DataType::Scalar(ScalarKind::I32),
                    4,
                ));
                cursor += 4;
            }

            let storage = self.handles.storage(self.catalog, element);
            let count = u64::from(self.dearray_sample_len);
            members.push(Member::field(
                cursor,
                DEARRAY_DATA_FIELD,
                DataType::Array {
                    element: Box::new(storage.data_type),
                    count,
                    element_len: storage.length,
                },
                count * storage.length,
            ));
        }

        StructLayout {
            type_index: index,
            members,
            occupied,
            warnings,
        }
    }

    fn collect_candidates(&self, record: &'a TypeRecord) -> Vec<Candidate<'a>> {
        let header = record.header_length();
        let mut candidates = Vec::new();

        if header >= OBJECT_HEADER_THRESHOLD {
            for (offset, name) in [(0, VTABLE_FIELD), (8, LOCK_FIELD)] {
                candidates.push(Candidate {
                    offset,
                    name,
                    storage: Storage {
                        data_type: DataType::void_pointer(),
                        length: u64::from(POINTER_SIZE),
                    },
                });
            }
        }

        for ancestor in self.catalog.base_chain(record.index) {
            for field in &ancestor.fields {
                candidates.push(Candidate {
                    offset: i64::from(field.offset) + header,
                    name: &field.name,
                    storage: self.handles.storage(self.catalog, field.type_index),
                });
            }
        }

        candidates.sort_by_key(|candidate| candidate.offset);
        candidates
    }

    /// Lay out every eligible type and rebuild its structure in the target.
    ///
    /// Overlaps and overflows are logged and reported, never fatal.
    ///
    /// # Errors
    /// Returns an error if the target refuses to rebuild a structure it handed out.
    pub fn resolve_all<T: Target>(
        &self,
        target: &mut T,
        progress_interval: usize,
    ) -> Result<ResolveReport> {
        let mut report = ResolveReport::default();

        for record in self.catalog {
            if progress_interval != 0 && record.index.as_usize() % progress_interval == 0 {
                info!("    {}", record.index);
            }

            let Some(TypeRepr::Structure(handle)) = self.handles.get(record.index).copied()
            else {
                report.skipped += 1;
                continue;
            };
            if !self.needs_layout(record) {
                report.skipped += 1;
                continue;
            }

            let layout = self.compute(record.index);
            for warning in &layout.warnings {
                warn!("{warning}");
            }

            target.rebuild_structure(handle, layout.members)?;
            report.resolved += 1;
            report.warnings.extend(layout.warnings);
        }

        info!(
            "Resolved {} layouts, skipped {}, {} warnings",
            report.resolved,
            report.skipped,
            report.warnings.len()
        );
        Ok(report)
    }
}
