//! Configuration of an import run.

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::{layout::DEFAULT_DEARRAY_SAMPLE_LEN, tdb::DEFAULT_CHUNK_SIZE, Result};

/// Configuration for the [`crate::Importer`].
///
/// Every key is optional when read from JSON, missing keys take their default.
///
/// ```json
/// { "category": "/Game", "apply_signatures": false }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// Index stride between TDB chunk files (default: 1000).
    pub chunk_size: u32,

    /// Category created structures are placed in (default: `/TDB`).
    pub category: String,

    /// Prefix of the type definition labels (default: `TypeDef:`).
    pub label_prefix: String,

    /// Element count of the `$data` trailer of array containers (default: 42).
    ///
    /// Only a visualization aid, the real length is in the `$count` field.
    pub dearray_sample_len: u32,

    /// Types between two resolver progress lines, `0` disables them (default: 1000).
    pub progress_interval: usize,

    /// Label every type definition address (default: true).
    pub label_types: bool,

    /// Create functions and signatures for methods (default: true).
    pub apply_signatures: bool,
}

impl Default for ImportConfig {
    fn default() -> Self {
        ImportConfig {
            chunk_size: DEFAULT_CHUNK_SIZE,
            category: "/TDB".to_string(),
            label_prefix: "TypeDef:".to_string(),
            dearray_sample_len: DEFAULT_DEARRAY_SAMPLE_LEN,
            progress_interval: 1000,
            label_types: true,
            apply_signatures: true,
        }
    }
}

impl ImportConfig {
    /// Creates a new configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a configuration from a JSON file.
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] if the file cannot be read and
    /// [`crate::Error::Json`] if it is not a valid configuration.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Sets the chunk stride.
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: u32) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Sets the structure category.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Sets the type definition label prefix.
    #[must_use]
    pub fn with_label_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.label_prefix = prefix.into();
        self
    }

    /// Sets the `$data` trailer element count.
    #[must_use]
    pub fn with_dearray_sample_len(mut self, len: u32) -> Self {
        self.dearray_sample_len = len;
        self
    }

    /// Sets the progress interval.
    #[must_use]
    pub fn with_progress_interval(mut self, interval: usize) -> Self {
        self.progress_interval = interval;
        self
    }

    /// Enables or disables the type definition label pass.
    #[must_use]
    pub fn with_label_types(mut self, enabled: bool) -> Self {
        self.label_types = enabled;
        self
    }

    /// Enables or disables the signature stage.
    #[must_use]
    pub fn with_apply_signatures(mut self, enabled: bool) -> Self {
        self.apply_signatures = enabled;
        self
    }
}
