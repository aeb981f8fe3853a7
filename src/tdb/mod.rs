//! Type database (TDB) catalog and loading.
//!
//! A TDB dump describes every type a managed runtime knows about: its size, whether it is a
//! value or a reference type, its base type, its fields and its methods. The dumper writes
//! it as a series of JSON chunk files. This module reads those chunks into a
//! [`TypeCatalog`], a fixed-size arena of [`TypeRecord`]s addressed by [`TypeIndex`].
//!
//! # Key Components
//!
//! - [`TypeIndex`]: Dense identifier types use to refer to each other
//! - [`TypeRecord`], [`MethodRecord`]: Interpreted descriptors
//! - [`TypeCatalog`]: Validated arena of all records
//! - [`ChunkSource`]: Where chunks come from ([`DirectorySource`], [`MemorySource`])
//! - [`TdbLoader`]: Probes and assembles the chunks
//!
//! # Examples
//!
//! ```rust,no_run
//! use tdbscope::tdb::{DirectorySource, TdbLoader};
//!
//! let mut source = DirectorySource::new("dump/tdb");
//! let catalog = TdbLoader::default().load(&mut source)?;
//!
//! for record in catalog.iter().filter(|record| record.is_dearray()) {
//!     println!("array container: {}", record.full_name);
//! }
//! # Ok::<(), tdbscope::Error>(())
//! ```

mod catalog;
mod flags;
mod index;
mod loader;
pub mod raw;
mod record;
mod source;

pub use catalog::TypeCatalog;
pub use flags::{FieldFlags, MethodFlags, ParamModifiers, VmObjType};
pub use index::TypeIndex;
pub use loader::{apply_type_labels, LabelReport, TdbLoader, DEFAULT_CHUNK_SIZE};
pub use record::{FieldRecord, MethodRecord, ParamRecord, TypeRecord, PLACEHOLDER_MARKER};
pub use source::{ChunkSource, DirectorySource, MemorySource};
