//! Registration of every catalog type with the target.
//!
//! Types tagged with one of the runtime's scalar system types map onto a built-in scalar.
//! Every other type, placeholders and generic definitions included, gets an empty named
//! structure up front so later stages can reference it before it is laid out.

use log::{debug, info};

use crate::{
    layout::{TypeHandles, TypeRepr},
    tdb::TypeCatalog,
    target::{ConflictPolicy, ScalarKind, Target},
    Error::TypeCreationFailed,
    Result,
};

/// Runtime system type tags with a scalar representation.
///
/// Tags 17, 24 and 25 repeat the mappings of 15, 20 and 21. Whether the runtime means
/// distinct kinds there (e.g. `char`, `intptr`, `uintptr`) is unconfirmed, the duplicates
/// are kept as they are.
const SYSTEM_TYPE_TABLE: [(u32, ScalarKind); 15] = [
    (13, ScalarKind::U8),
    (14, ScalarKind::I8),
    (15, ScalarKind::U16),
    (16, ScalarKind::I16),
    (17, ScalarKind::U16),
    (18, ScalarKind::I32),
    (19, ScalarKind::U32),
    (20, ScalarKind::I64),
    (21, ScalarKind::U64),
    (22, ScalarKind::F32),
    (23, ScalarKind::F64),
    (24, ScalarKind::I64),
    (25, ScalarKind::U64),
    (26, ScalarKind::Bool),
    (31, ScalarKind::Void),
];

/// Look up the scalar representation of a system type tag.
///
/// Returns `None` for every tag without one, these types are structured.
#[must_use]
pub fn scalar_for_system_type(tag: u32) -> Option<ScalarKind> {
    SYSTEM_TYPE_TABLE
        .iter()
        .find(|(known, _)| *known == tag)
        .map(|(_, kind)| *kind)
}

/// Give every type of the catalog a representation in the target.
///
/// Structures are created in `category` with [`ConflictPolicy::Replace`], so registering a
/// catalog a second time resets the existing definitions instead of failing.
///
/// # Errors
/// Returns [`crate::Error::TypeCreationFailed`] if the target does not return a handle.
/// Nothing is rolled back, the target keeps the structures created so far.
pub fn register_types<T: Target>(
    catalog: &TypeCatalog,
    target: &mut T,
    category: &str,
) -> Result<TypeHandles> {
    let mut reprs = Vec::with_capacity(catalog.len());

    for record in catalog {
        let repr = match scalar_for_system_type(record.system_type) {
            Some(kind) => TypeRepr::Primitive(kind),
            None => {
                let handle = target
                    .define_structure(
                        category,
                        &record.full_name,
                        record.size,
                        ConflictPolicy::Replace,
                    )
                    .ok_or_else(|| TypeCreationFailed(record.full_name.clone()))?;
                debug!("Created structure {} ({} bytes)", record.full_name, record.size);
                TypeRepr::Structure(handle)
            }
        };
        reprs.push(repr);
    }

    let handles = TypeHandles::new(reprs);
    info!(
        "Registered {} types, {} primitive",
        handles.len(),
        handles.primitive_count()
    );
    Ok(handles)
}
