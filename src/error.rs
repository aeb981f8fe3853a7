use std::path::PathBuf;

use thiserror::Error;

use crate::tdb::TypeIndex;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Errors fall into two groups. Fatal errors abort an import and are propagated to the caller
/// of [`crate::Importer::run`]: a missing first TDB chunk, a malformed catalog, or a target
/// that refuses to hand out a structure handle. Per-item errors (a label at an unmapped
/// address, a function that cannot be created, an overlapping memory region) are returned by
/// the individual [`crate::target::Target`] operations and the pipeline decides to log them
/// and continue.
///
/// # Error Categories
///
/// ## Input Errors
/// - [`Error::MissingChunk`] - The first TDB chunk could not be found
/// - [`Error::InvalidChunkName`] - A memory chunk file name does not encode a base address
/// - [`Error::Malformed`] - The TDB content is inconsistent
/// - [`Error::InvalidTypeIndex`] - A type index points outside of the catalog
/// - [`Error::FileError`] - Filesystem I/O errors
/// - [`Error::Json`] - A chunk is not valid JSON or misses required keys
///
/// ## Target Errors
/// - [`Error::TypeCreationFailed`] - The target did not return a structure handle
/// - [`Error::InvalidAddress`] - The target rejected an address for a label or function
/// - [`Error::RegionOverlap`] - A memory region collides with an existing one
///
/// # Examples
///
/// ```rust,no_run
/// use tdbscope::{Error, Importer, ImportConfig, tdb::DirectorySource, target::Program};
///
/// let mut source = DirectorySource::new("dump/tdb");
/// let mut program = Program::new();
///
/// match Importer::new(ImportConfig::default()).run(&mut source, &mut program) {
///     Ok(report) => println!("imported {} types", report.type_count),
///     Err(Error::MissingChunk { path }) => eprintln!("no TDB found at {}", path.display()),
///     Err(e) => eprintln!("import failed: {e}"),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The first chunk of the type database is missing.
    ///
    /// Without chunk 0 the number of types can not be determined and nothing can be
    /// imported.
    #[error("Missing TDB chunk - {}", path.display())]
    MissingChunk {
        /// Location where the chunk was expected
        path: PathBuf,
    },

    /// The target environment did not return a usable structure handle.
    ///
    /// Later stages dereference handles by type index unconditionally, so this aborts the
    /// whole import. The associated value is the full name of the type.
    #[error("Failed to create structure for type - {0}")]
    TypeCreationFailed(String),

    /// A type index referenced a type outside of the catalog.
    #[error("Type index out of range - {0}")]
    InvalidTypeIndex(TypeIndex),

    /// The type database is inconsistent and could not be loaded.
    ///
    /// The error includes the source location where the problem was detected for debugging
    /// purposes.
    ///
    /// # Fields
    ///
    /// * `message` - Detailed description of what was malformed
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// A memory chunk file name does not start with a 16 digit hexadecimal base address.
    #[error("Invalid memory chunk name - {0}")]
    InvalidChunkName(String),

    /// The target environment rejected an address.
    ///
    /// Returned when a label, function or region can not be placed at the requested
    /// address, e.g. because no memory is mapped there.
    #[error("Invalid address - 0x{0:016x}")]
    InvalidAddress(u64),

    /// A new memory region overlaps an existing one.
    #[error("Memory region 0x{base:016x}+0x{len:x} overlaps an existing region")]
    RegionOverlap {
        /// Requested base address
        base: u64,
        /// Requested length in bytes
        len: u64,
    },

    /// File I/O error.
    ///
    /// Wraps standard I/O errors that can occur while reading chunk files.
    #[error("{0}")]
    FileError(#[from] std::io::Error),

    /// JSON decoding error.
    ///
    /// A chunk file is not valid JSON or lacks one of the keys a type descriptor must carry.
    #[error("{0}")]
    Json(#[from] serde_json::Error),

    /// Generic error for miscellaneous failures.
    #[error("{0}")]
    Error(String),
}
