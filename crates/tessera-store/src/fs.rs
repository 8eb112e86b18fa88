use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use tessera_types::Reference;

use crate::error::{StoreError, StoreResult};
use crate::traits::ObjectStore;

/// Directory holding object files, relative to the store root.
const OBJECTS_DIR: &str = "objects";

/// Filesystem-backed object store.
///
/// Each object is a file at `objects/<first two hex chars>/<remaining hex>`.
/// Writes go to a temporary file in the target directory and are renamed into
/// place, so a reader never observes a partially written object. Reads
/// recompute the hash and fail with [`StoreError::HashMismatch`] on corruption.
#[derive(Debug, Clone)]
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    /// Open a store rooted at `root`, creating the directory layout if needed.
    pub fn open(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        std::fs::create_dir_all(root.join(OBJECTS_DIR))?;
        Ok(Self { root })
    }

    /// The store's root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn object_path(&self, reference: &Reference) -> PathBuf {
        let hex = reference.to_hex();
        self.root.join(OBJECTS_DIR).join(&hex[..2]).join(&hex[2..])
    }

    /// All references present on disk, sorted.
    pub fn all_references(&self) -> StoreResult<Vec<Reference>> {
        let mut refs = Vec::new();
        for shard in std::fs::read_dir(self.root.join(OBJECTS_DIR))? {
            let shard = shard?;
            if !shard.file_type()?.is_dir() {
                continue;
            }
            let prefix = shard.file_name().to_string_lossy().into_owned();
            for entry in std::fs::read_dir(shard.path())? {
                let entry = entry?;
                let name = entry.file_name().to_string_lossy().into_owned();
                // Leftover temp files from interrupted writes are not objects.
                if name.starts_with('.') {
                    continue;
                }
                let reference = Reference::from_hex(&format!("{prefix}{name}")).map_err(|e| {
                    StoreError::CorruptLayout {
                        path: entry.path().display().to_string(),
                        reason: e.to_string(),
                    }
                })?;
                refs.push(reference);
            }
        }
        refs.sort();
        Ok(refs)
    }

    /// Number of objects and their total size in bytes.
    pub fn stat(&self) -> StoreResult<(usize, u64)> {
        let refs = self.all_references()?;
        let mut bytes = 0;
        for r in &refs {
            bytes += std::fs::metadata(self.object_path(r))?.len();
        }
        Ok((refs.len(), bytes))
    }
}

impl ObjectStore for FsObjectStore {
    fn get(&self, reference: &Reference) -> StoreResult<Option<Vec<u8>>> {
        let data = match std::fs::read(self.object_path(reference)) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let computed = Reference::sum(&data);
        if computed != *reference {
            return Err(StoreError::HashMismatch {
                reference: *reference,
                computed,
            });
        }
        Ok(Some(data))
    }

    fn put(&self, data: &[u8]) -> StoreResult<Reference> {
        let reference = Reference::sum(data);
        let path = self.object_path(&reference);
        if path.exists() {
            return Ok(reference);
        }
        let dir = path.parent().ok_or_else(|| StoreError::CorruptLayout {
            path: path.display().to_string(),
            reason: "object path has no parent".into(),
        })?;
        std::fs::create_dir_all(dir)?;

        let mut tmp = tempfile::Builder::new().prefix(".tmp").tempfile_in(dir)?;
        tmp.write_all(data)?;
        tmp.as_file().sync_all()?;
        persist(tmp, &path)?;
        debug!(reference = %reference.short_hex(), size = data.len(), "object written");
        Ok(reference)
    }

    fn exists(&self, reference: &Reference) -> StoreResult<bool> {
        Ok(self.object_path(reference).is_file())
    }

    fn delete(&self, reference: &Reference) -> StoreResult<bool> {
        match std::fs::remove_file(self.object_path(reference)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

fn persist(tmp: NamedTempFile, path: &Path) -> StoreResult<()> {
    tmp.persist(path).map_err(|e| StoreError::Io(e.error))?;
    Ok(())
}
