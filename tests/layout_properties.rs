//! Generated catalogs checked against the layout coverage rule.
//!
//! Every laid out type must be covered contiguously from offset 0 up to the end of its
//! padded body. That end equals the type's size, unless the fields run past it, in which
//! case an overflow warning is reported.

use proptest::prelude::*;
use tdbscope::{
    layout::{register_types, LayoutResolver, LayoutWarning, StructLayout},
    tdb::{
        raw::{RawChunk, RawField, RawType},
        MemorySource, TdbLoader, TypeCatalog, TypeIndex,
    },
    target::Program,
};

/// `System.Int32`, `System.Int64` and `System.Object`
const BUILTIN_COUNT: u32 = 3;

#[derive(Debug, Clone)]
struct TypeSpec {
    is_value_type: bool,
    len: u32,
    runtime_len: u32,
    base_seed: Option<u32>,
    fields: Vec<(u32, u32)>,
}

fn type_spec_strategy() -> impl Strategy<Value = TypeSpec> {
    (
        any::<bool>(),
        0u32..64,
        0u32..96,
        prop::option::of(any::<u32>()),
        prop::collection::vec((any::<u32>(), 0u32..64), 0..6),
    )
        .prop_map(
            |(is_value_type, len, runtime_len, base_seed, fields)| TypeSpec {
                is_value_type,
                len,
                runtime_len,
                base_seed,
                fields,
            },
        )
}

fn builtin(name: &str, vm_obj_type: u32, len: u32, runtime_len: u32, system_type: u32) -> RawType {
    RawType {
        full_name: name.to_string(),
        vm_obj_type,
        len,
        runtime_len,
        system_type,
        ..RawType::default()
    }
}

/// Bases and field types only point at earlier types or the type itself, so base chains
/// always terminate.
fn build_catalog(specs: &[TypeSpec]) -> TypeCatalog {
    let mut types = vec![
        builtin("System.Int32", 5, 4, 20, 18),
        builtin("System.Int64", 5, 8, 24, 20),
        builtin("System.Object", 1, 0, 16, 28),
    ];

    for (position, spec) in specs.iter().enumerate() {
        let index = BUILTIN_COUNT + position as u32;
        let mut ty = if spec.is_value_type {
            builtin(&format!("app.Value{index}"), 5, spec.len, spec.len, 29)
        } else {
            builtin(&format!("app.Class{index}"), 1, spec.len, spec.runtime_len, 28)
        };
        ty.ti_base = spec.base_seed.map(|seed| TypeIndex(seed % index));
        ty.fields = spec
            .fields
            .iter()
            .enumerate()
            .map(|(n, (type_seed, position))| RawField {
                name: format!("_f{n}"),
                ti: TypeIndex(type_seed % (index + 1)),
                position: *position,
                flags: 1,
            })
            .collect();
        types.push(ty);
    }

    let mut source: MemorySource = [RawChunk {
        start_index: 0,
        types,
    }]
    .into_iter()
    .collect();
    TdbLoader::default().load(&mut source).unwrap()
}

fn check_coverage(layout: &StructLayout, size: u64) -> Result<(), TestCaseError> {
    let mut cursor = 0u64;
    for member in layout
        .members
        .iter()
        .take_while(|member| member.offset < layout.occupied)
    {
        prop_assert_eq!(member.offset, cursor, "gap or overlap at {:?}", member);
        prop_assert!(member.length > 0);
        cursor += member.length;
    }
    prop_assert_eq!(cursor, layout.occupied);

    let overflowed = layout
        .warnings
        .iter()
        .any(|warning| matches!(warning, LayoutWarning::Overflow { .. }));
    if overflowed {
        prop_assert!(layout.occupied > size);
    } else {
        prop_assert_eq!(layout.occupied, size);
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        ..ProptestConfig::default()
    })]

    #[test]
    fn prop_layouts_cover_declared_size(
        specs in prop::collection::vec(type_spec_strategy(), 1..12)
    ) {
        let catalog = build_catalog(&specs);
        let mut program = Program::new();
        let handles = register_types(&catalog, &mut program, "/TDB").unwrap();
        let resolver = LayoutResolver::new(&catalog, &handles);

        for record in &catalog {
            if !resolver.needs_layout(record) {
                continue;
            }
            let layout = resolver.compute(record.index);
            check_coverage(&layout, u64::from(record.size))?;
        }
    }

    #[test]
    fn prop_resolve_all_matches_compute(
        specs in prop::collection::vec(type_spec_strategy(), 1..8)
    ) {
        let catalog = build_catalog(&specs);
        let mut program = Program::new();
        let handles = register_types(&catalog, &mut program, "/TDB").unwrap();
        let resolver = LayoutResolver::new(&catalog, &handles);
        resolver.resolve_all(&mut program, 0).unwrap();

        for record in catalog.iter().filter(|record| resolver.needs_layout(record)) {
            let structure = program.structure_by_name("/TDB", &record.full_name).unwrap();
            prop_assert_eq!(&structure.members, &resolver.compute(record.index).members);
        }
    }
}
