//! Header file I/O.
//!
//! Thin helpers for the surrounding image container: reading a `.hdr` file
//! into an [`AnalyzeHeader`] and writing one back. Sibling-file discovery and
//! extension handling live with the caller.

use std::fs::File;
use std::path::Path;

use memmap2::Mmap;

use crate::error::{AnlzError, Result};

use super::diagnostics;
use super::header::{AnalyzeHeader, HeaderVariant};

/// Load a header from a file.
///
/// The file must start with a full 348-byte record; trailing bytes (some
/// tools pad `.hdr` files) are ignored. Diagnostics are logged as warnings,
/// never enforced.
#[allow(unsafe_code)]
pub fn load_header<P: AsRef<Path>>(path: P, variant: HeaderVariant) -> Result<AnalyzeHeader> {
    let file = File::open(path.as_ref())?;
    // SAFETY: Memory mapping is safe - file just opened, read-only access
    let mmap = unsafe { Mmap::map(&file)? };

    if mmap.len() < AnalyzeHeader::SIZE {
        return Err(AnlzError::InvalidFormat(format!(
            "file is {} bytes; a header needs at least {}",
            mmap.len(),
            AnalyzeHeader::SIZE
        )));
    }

    let hdr = AnalyzeHeader::from_bytes(&mmap[..AnalyzeHeader::SIZE], variant)?;
    for problem in diagnostics::diagnose(hdr.as_bytes(), variant) {
        log::warn!(
            "header diagnostic for {}: {problem}",
            path.as_ref().display()
        );
    }
    Ok(hdr)
}

/// Write a header to a file as its exact 348-byte block.
pub fn save_header<P: AsRef<Path>>(hdr: &AnalyzeHeader, path: P) -> Result<()> {
    std::fs::write(path, hdr.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze::header::DataType;
    use tempfile::NamedTempFile;

    #[test]
    fn test_header_file_roundtrip() {
        let mut hdr = AnalyzeHeader::default();
        hdr.set_data_shape(&[4, 5, 6]).unwrap();
        hdr.set_data_dtype(DataType::Int16);
        hdr.set_origin(&[2, 3, 3]).unwrap();

        let file = NamedTempFile::new().unwrap();
        save_header(&hdr, file.path()).unwrap();

        let loaded = load_header(file.path(), HeaderVariant::Spm99).unwrap();
        assert_eq!(loaded, hdr);
    }

    #[test]
    fn test_load_header_too_short() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), [0u8; 20]).unwrap();
        let err = load_header(file.path(), HeaderVariant::Spm99).unwrap_err();
        assert!(matches!(err, AnlzError::InvalidFormat(_)));
    }
}
