use std::{fs, path::Path};

use memmap2::Mmap;

use crate::{
    Error::{Error, FileError},
    Result,
};

/// Read-only memory mapping of a file on disk.
///
/// Memory dumps are often hundreds of megabytes; mapping them lets the operating system
/// page the content in while it is copied into the target. Empty files are not mapped at
/// all, since most platforms reject zero-length mappings.
#[derive(Debug)]
pub struct MappedFile {
    data: Option<Mmap>,
}

impl MappedFile {
    /// Map the file at `path`.
    ///
    /// ## Arguments
    /// * `path` - File to map
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] if the file cannot be opened or
    /// [`crate::Error::Error`] if memory mapping fails.
    pub fn open(path: impl AsRef<Path>) -> Result<MappedFile> {
        let file = match fs::File::open(path) {
            Ok(file) => file,
            Err(error) => return Err(FileError(error)),
        };

        if file.metadata().map_err(FileError)?.len() == 0 {
            return Ok(MappedFile { data: None });
        }

        // The mapping is read-only and dropped before the import returns
        let mmap = match unsafe { Mmap::map(&file) } {
            Ok(mmap) => mmap,
            Err(error) => return Err(Error(error.to_string())),
        };

        Ok(MappedFile { data: Some(mmap) })
    }

    /// The mapped bytes
    #[must_use]
    pub fn data(&self) -> &[u8] {
        self.data.as_deref().unwrap_or_default()
    }

    /// Length of the file in bytes
    #[must_use]
    pub fn len(&self) -> usize {
        self.data().len()
    }

    /// Returns true if the file is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_map_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[0x48, 0x89, 0x5C, 0x24]).unwrap();
        file.flush().unwrap();

        let mapped = MappedFile::open(file.path()).unwrap();
        assert_eq!(mapped.len(), 4);
        assert_eq!(mapped.data(), [0x48, 0x89, 0x5C, 0x24]);
    }

    #[test]
    fn test_map_empty_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let mapped = MappedFile::open(file.path()).unwrap();
        assert!(mapped.is_empty());
        assert!(mapped.data().is_empty());
    }

    #[test]
    fn test_map_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = MappedFile::open(dir.path().join("0000000140000000.bin"));
        assert!(matches!(result, Err(crate::Error::FileError(_))));
    }
}
