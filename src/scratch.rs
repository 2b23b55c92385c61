use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use memmap2::Mmap;
use tempfile::TempDir;

/// `libil2cpp.so` and `global-metadata.dat` spilled to a private temporary
/// directory and mapped into memory.
///
/// The maps stay valid for as long as this value lives. Both files are removed
/// when it is dropped.
pub struct Il2CppScratch {
    il2cpp: Mmap,
    metadata: Mmap,
    // declared last so the maps are released before the directory is removed
    dir: TempDir,
}

impl Il2CppScratch {
    pub fn create(il2cpp: &[u8], metadata: &[u8]) -> Result<Il2CppScratch> {
        let dir = tempfile::Builder::new()
            .prefix("phi-info-")
            .tempdir()
            .context("could not create temporary directory")?;

        let il2cpp = spill(&dir.path().join("libil2cpp.so"), il2cpp)?;
        let metadata = spill(&dir.path().join("global-metadata.dat"), metadata)?;

        let scratch = Il2CppScratch {
            il2cpp,
            metadata,
            dir,
        };
        tracing::debug!("spilled il2cpp pair to {}", scratch.dir().display());
        Ok(scratch)
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    /// `(libil2cpp.so, global-metadata.dat)`
    pub fn map(&self) -> (&[u8], &[u8]) {
        (&self.il2cpp, &self.metadata)
    }
}

fn spill(path: &Path, data: &[u8]) -> Result<Mmap> {
    std::fs::write(path, data).with_context(|| format!("failed to write '{}'", path.display()))?;
    let file = File::open(path).with_context(|| format!("could not open '{}'", path.display()))?;
    let mmap = unsafe { Mmap::map(&file)? };
    Ok(mmap)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn files_are_written_and_mapped() {
        let scratch = Il2CppScratch::create(b"\x7fELF", b"metadata").unwrap();
        assert!(scratch.dir().join("libil2cpp.so").is_file());
        assert!(scratch.dir().join("global-metadata.dat").is_file());

        let (il2cpp, metadata) = scratch.map();
        assert_eq!(il2cpp, b"\x7fELF");
        assert_eq!(metadata, b"metadata");
    }

    #[test]
    fn maps_are_shared_across_calls() {
        let scratch = Il2CppScratch::create(b"binary", b"metadata").unwrap();
        let (first, _) = scratch.map();
        let (second, _) = scratch.map();
        assert_eq!(first.as_ptr(), second.as_ptr());
    }

    #[test]
    fn files_are_removed_on_drop() {
        let scratch = Il2CppScratch::create(b"a", b"b").unwrap();
        let dir = scratch.dir().to_owned();
        assert!(dir.join("libil2cpp.so").exists());

        drop(scratch);
        assert!(!dir.exists());
    }

    #[test]
    fn files_are_removed_on_unwind() {
        let mut dir = None;
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let scratch = Il2CppScratch::create(b"a", b"b").unwrap();
            dir = Some(scratch.dir().to_owned());
            panic!("extraction failed");
        }));
        assert!(result.is_err());
        assert!(!dir.unwrap().exists());
    }
}
