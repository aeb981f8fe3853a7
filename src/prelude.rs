//! # tdbscope Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and traits
//! from the tdbscope library.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all tdbscope operations
pub use crate::Error;

/// The result type used throughout tdbscope
pub use crate::Result;

// ================================================================================================
// Main Entry Points
// ================================================================================================

/// The import pipeline and its configuration
pub use crate::{ImportConfig, ImportReport, ImportSession, Importer};

// ================================================================================================
// Type Database
// ================================================================================================

/// Catalog, records and loading
pub use crate::tdb::{
    ChunkSource, DirectorySource, MemorySource, MethodRecord, TdbLoader, TypeCatalog, TypeIndex,
    TypeRecord,
};

// ================================================================================================
// Targets
// ================================================================================================

/// Sink trait, data model and the in-memory program
pub use crate::target::{
    render_header, DataType, FunctionSignature, Member, Program, ScalarKind, Target,
};

// ================================================================================================
// Stages
// ================================================================================================

/// Registration and layout
pub use crate::layout::{register_types, LayoutResolver, LayoutWarning, TypeHandles};

/// Function signatures
pub use crate::signature::SignatureBuilder;

/// Memory dump import
pub use crate::memory::import_memory;
