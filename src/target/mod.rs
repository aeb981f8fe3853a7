//! The environment reconstructed layouts and signatures are written into.
//!
//! A disassembler database is treated as an opaque sink that offers a handful of
//! primitives: labels, named structures, functions with signatures and memory regions. The
//! [`Target`] trait captures exactly these primitives; the pipeline never reaches into a
//! host's internals beyond them.
//!
//! [`Program`] is a complete in-memory implementation. It backs the command line tool,
//! which renders it as a C header via [`render_header`], and it is what the tests inspect.
//!
//! # Key Components
//!
//! - [`Target`]: Sink primitives
//! - [`DataType`], [`Member`], [`FunctionSignature`]: Composed layout data
//! - [`Program`]: In-memory target
//! - [`render_header`]: C header rendering of a [`Program`]

mod header;
mod program;
mod types;

pub use header::{render_header, sanitize_identifier};
pub use program::{Function, MemoryRegion, Program, Structure};
pub use types::{
    ConflictPolicy, DataType, FunctionId, FunctionSignature, Member, Parameter,
    RegionPermissions, ScalarKind, StructHandle, POINTER_SIZE,
};

use crate::Result;

/// Primitives of a disassembler database.
///
/// Operations that can fail for a single item return a [`Result`] and leave the decision
/// to log and continue or to abort to the caller.
pub trait Target {
    /// Attach a label to an address.
    ///
    /// # Errors
    /// Returns an error if the address can not carry a label.
    fn create_label(&mut self, address: u64, name: &str) -> Result<()>;

    /// Create an empty structure of `size` bytes named `name` in `category`.
    ///
    /// Returns `None` if the target could not produce a usable handle.
    fn define_structure(
        &mut self,
        category: &str,
        name: &str,
        size: u32,
        policy: ConflictPolicy,
    ) -> Option<StructHandle>;

    /// Clear all members of a structure and replace them with `members`, in order.
    ///
    /// # Errors
    /// Returns an error if the handle is unknown to the target.
    fn rebuild_structure(&mut self, handle: StructHandle, members: Vec<Member>) -> Result<()>;

    /// Look up the function starting at `address`
    fn function_at(&self, address: u64) -> Option<FunctionId>;

    /// Create a function starting at `address`.
    ///
    /// # Errors
    /// Returns an error if no function can live at the address.
    fn create_function(&mut self, address: u64, name: &str) -> Result<FunctionId>;

    /// Rename an existing function.
    ///
    /// # Errors
    /// Returns an error if the function is unknown to the target.
    fn rename_function(&mut self, function: FunctionId, name: &str) -> Result<()>;

    /// Replace return type and parameter list of a function at once.
    ///
    /// # Errors
    /// Returns an error if the function is unknown to the target.
    fn apply_signature(&mut self, function: FunctionId, signature: FunctionSignature)
        -> Result<()>;

    /// Map `data` at `base` as an initialized memory region.
    ///
    /// # Errors
    /// Returns an error if the region can not be created, e.g. because it overlaps an
    /// existing one.
    fn create_memory_region(
        &mut self,
        name: &str,
        base: u64,
        data: &[u8],
        permissions: RegionPermissions,
    ) -> Result<()>;
}
