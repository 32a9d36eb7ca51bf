use camino::Utf8Path;
use memmap2::Mmap;
use std::fs::File;

use crate::core::error::BundleError;

const MMAP_THRESHOLD: u64 = 1024 * 1024; // 1 MiB

/// Source text, memory-mapped when large
pub enum FileContent {
    Mapped(Mmap),
    Buffered(String),
}

impl AsRef<str> for FileContent {
    fn as_ref(&self) -> &str {
        match self {
            // Validated as UTF-8 in read_source
            FileContent::Mapped(mmap) => std::str::from_utf8(mmap).unwrap_or_default(),
            FileContent::Buffered(s) => s.as_str(),
        }
    }
}

/// Read a defining file, mapping it when it is over the threshold
pub fn read_source(path: &Utf8Path) -> Result<FileContent, BundleError> {
    let metadata = std::fs::metadata(path).map_err(|e| BundleError::io(path, e))?;

    if metadata.len() > MMAP_THRESHOLD {
        let file = File::open(path).map_err(|e| BundleError::io(path, e))?;

        // Safety: read-only mapping; the file is not modified while mapped
        let mmap = unsafe { Mmap::map(&file) }.map_err(|e| BundleError::io(path, e))?;

        std::str::from_utf8(&mmap).map_err(|e| BundleError::io(path, e))?;
        Ok(FileContent::Mapped(mmap))
    } else {
        let content = std::fs::read_to_string(path).map_err(|e| BundleError::io(path, e))?;
        Ok(FileContent::Buffered(content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;

    #[test]
    fn small_files_are_buffered() {
        let dir = tempfile::tempdir().unwrap();
        let path = Utf8PathBuf::from_path_buf(dir.path().join("a.go")).unwrap();
        std::fs::write(&path, "package a\n").unwrap();

        let content = read_source(&path).unwrap();
        assert!(matches!(content, FileContent::Buffered(_)));
        assert_eq!(content.as_ref(), "package a\n");
    }

    #[test]
    fn large_files_are_mapped() {
        let dir = tempfile::tempdir().unwrap();
        let path = Utf8PathBuf::from_path_buf(dir.path().join("big.go")).unwrap();
        let body = "// filler line\n".repeat(80_000);
        std::fs::write(&path, &body).unwrap();

        let content = read_source(&path).unwrap();
        assert!(matches!(content, FileContent::Mapped(_)));
        assert_eq!(content.as_ref().len(), body.len());
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = read_source(Utf8Path::new("/definitely/not/here.go")).err().unwrap();
        assert!(matches!(err, BundleError::Io { .. }));
    }
}
