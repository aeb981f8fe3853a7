//! Import of raw memory dumps.
//!
//! A memory dump is a directory of files, one per contiguous block of the process, each
//! named after the block's base address as 16 lowercase hex digits with a `.bin`
//! extension. [`import_memory`] maps every such file into a [`crate::target::Target`] as
//! an initialized region, so that type definition labels and method functions land on
//! real bytes.
//!
//! # Examples
//!
//! ```rust,no_run
//! use tdbscope::{memory::import_memory, target::Program};
//!
//! let mut program = Program::new();
//! let report = import_memory("dump/memory", &mut program)?;
//! println!("{} regions, {} bytes", report.imported, report.bytes);
//! # Ok::<(), tdbscope::Error>(())
//! ```

mod chunks;
mod mapped;

pub use chunks::{discover_chunks, import_memory, parse_chunk_name, MemoryChunk, MemoryReport};
pub use mapped::MappedFile;
