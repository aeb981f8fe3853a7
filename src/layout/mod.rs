//! Type registration and structure layout.
//!
//! Layout happens in two passes over the catalog. [`register_types`] first gives every
//! type a representation in the target: a built-in scalar for runtime primitives, an empty
//! named structure for everything else. Only then does [`LayoutResolver`] fill in the
//! members, so fields may refer to any type regardless of catalog order, including
//! self-referential and mutually recursive types.
//!
//! # Key Components
//!
//! - [`register_types`]: Scalars and empty structures for the whole catalog
//! - [`TypeHandles`]: Target representation of every type, indexed by [`crate::tdb::TypeIndex`]
//! - [`LayoutResolver`]: Physical member list of one or all structured types
//!
//! # Examples
//!
//! ```rust,no_run
//! use tdbscope::{
//!     layout::{register_types, LayoutResolver},
//!     tdb::{DirectorySource, TdbLoader},
//!     target::Program,
//! };
//!
//! let mut source = DirectorySource::new("dump/tdb");
//! let catalog = TdbLoader::default().load(&mut source)?;
//!
//! let mut program = Program::new();
//! let handles = register_types(&catalog, &mut program, "/TDB")?;
//! let report = LayoutResolver::new(&catalog, &handles).resolve_all(&mut program, 1000)?;
//! println!("{} layouts, {} warnings", report.resolved, report.warnings.len());
//! # Ok::<(), tdbscope::Error>(())
//! ```

mod handles;
mod registrar;
mod resolver;

pub use handles::{Storage, TypeHandles, TypeRepr};
pub use registrar::{register_types, scalar_for_system_type};
pub use resolver::{
    LayoutResolver, LayoutWarning, ResolveReport, StructLayout, DEARRAY_DATA_FIELD,
    DEARRAY_HEADER_FIELDS, DEFAULT_DEARRAY_SAMPLE_LEN, LOCK_FIELD, OBJECT_HEADER_THRESHOLD,
    VTABLE_FIELD,
};
