// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
//#![deny(unsafe_code)]
// - 'memory/mapped.rs' uses mmap to map a memory dump into memory

//! # tdbscope
//!
//! Reconstruct the type layouts and method signatures of a managed game runtime inside a
//! disassembler database, from a dump of the runtime's type database (TDB).
//!
//! The TDB lists every type the runtime knows: its size, value or reference semantics, base
//! type, instance fields with their offsets, and methods with their compiled addresses and
//! parameter types. `tdbscope` turns this into:
//!
//! - **Labels** at every runtime type definition
//! - **Structures** with the physical field layout of every type, including the object
//!   header slots and the bookkeeping fields of array containers
//! - **Functions** at every method address, named after the method and typed with the
//!   runtime's calling convention
//!
//! Where all of this is written to is abstracted by the [`target::Target`] trait. The
//! crate ships [`target::Program`], an in-memory implementation that can be rendered as a
//! C header.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tdbscope::prelude::*;
//!
//! let mut program = Program::new();
//! let importer = Importer::new(ImportConfig::default());
//!
//! importer.import_memory("dump/memory", &mut program)?;
//! let report = importer.run(&mut DirectorySource::new("dump/tdb"), &mut program)?;
//!
//! println!("{} types, {} layouts", report.type_count, report.layouts);
//! std::fs::write("types.h", render_header(&program))?;
//! # Ok::<(), tdbscope::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`tdb`] - JSON chunk loading into a validated [`tdb::TypeCatalog`]
//! - [`target`] - The sink trait, the data type model and the in-memory [`target::Program`]
//! - [`layout`] - Type registration and structure layout
//! - [`signature`] - Function naming and signatures
//! - [`memory`] - Raw memory dump import
//! - [`Importer`] - The full pipeline
//!
//! ## Error Handling
//!
//! A missing first chunk, an inconsistent catalog or a target that refuses to create a
//! structure abort the import with an [`Error`]. Problems with single items (a label at
//! an unmapped address, an overlapping field) are logged through the `log` facade and
//! counted in the [`ImportReport`].
//!
//! ```rust,no_run
//! use tdbscope::{Error, Importer, tdb::DirectorySource, target::Program};
//!
//! let mut program = Program::new();
//! match Importer::default().run(&mut DirectorySource::new("dump/tdb"), &mut program) {
//!     Ok(report) => println!("{} warnings", report.warnings.len()),
//!     Err(Error::MissingChunk { path }) => println!("no TDB at {}", path.display()),
//!     Err(e) => println!("Other error: {}", e),
//! }
//! ```
//!
//! ## Development and Testing
//!
//! ```bash
//! cargo test
//!
//! # Fuzzing the chunk parser and pipeline
//! cargo +nightly fuzz run chunk --release
//! ```

#[macro_use]
pub(crate) mod error;

/// Shared functionality which is used in unit-tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust,no_run
/// use tdbscope::prelude::*;
///
/// let catalog = TdbLoader::default().load(&mut DirectorySource::new("dump/tdb"))?;
/// println!("{} types", catalog.len());
/// # Ok::<(), tdbscope::Error>(())
/// ```
pub mod prelude;

pub mod layout;
pub mod memory;
pub mod signature;
pub mod target;
pub mod tdb;

mod config;
mod import;

/// `tdbscope` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
/// This is used consistently throughout the crate for all fallible operations.
pub type Result<T> = std::result::Result<T, Error>;

/// `tdbscope` Error type
///
/// The main error type for all operations in this crate.
pub use error::Error;

pub use config::ImportConfig;
pub use import::{ImportReport, ImportSession, Importer};
