use anyhow::{bail, Result};
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Storage for attachment files, addressed by the key kept in `binding_attachments`
pub trait FileStore: Send + Sync {
    /// Remove the file behind `storage_key`. A key with no file behind it is already deleted.
    fn delete(&self, storage_key: &str) -> Result<()>;
}

/// Files under a root directory on the local disk
pub struct LocalFileStore {
    root: PathBuf,
}

impl LocalFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Default root: `<data_local_dir>/fiscaldesk/files`
    pub fn default_root() -> Result<PathBuf> {
        let data_dir = dirs::data_local_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine local data directory"))?;
        Ok(data_dir.join("fiscaldesk").join("files"))
    }

    fn resolve(&self, storage_key: &str) -> Result<PathBuf> {
        let key = Path::new(storage_key);
        if storage_key.is_empty()
            || key
                .components()
                .any(|c| !matches!(c, Component::Normal(_)))
        {
            bail!("Invalid storage key: {:?}", storage_key);
        }
        Ok(self.root.join(key))
    }
}

impl FileStore for LocalFileStore {
    fn delete(&self, storage_key: &str) -> Result<()> {
        let path = self.resolve(storage_key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => {
                debug!("Deleted stored file {:?}", path);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
