use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use anyhow::anyhow;
use async_trait::async_trait;
use bytes::Bytes;

use crate::storage::{DeleteAck, ObjectStore};

pub struct FileSystemBackend {
    directory: PathBuf,
}

impl FileSystemBackend {
    pub fn new(dir: PathBuf) -> Self {
        Self { directory: dir }
    }

    /// Resolves a key below the store directory.
    ///
    /// Keys may only consist of plain path segments, anything that could
    /// escape the directory (`..`, roots, prefixes) is rejected.
    fn format_path(&self, key: &str) -> anyhow::Result<PathBuf> {
        let relative = Path::new(key);
        let is_plain = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));

        if key.is_empty() || !is_plain {
            return Err(anyhow!("Refusing object key {:?} outside of the store directory", key));
        }

        Ok(self.directory.join(relative))
    }
}

#[async_trait]
impl ObjectStore for FileSystemBackend {
    async fn put(&self, key: &str, data: Bytes, _content_type: &str) -> anyhow::Result<()> {
        let path = self.format_path(key)?;

        debug!("Storing object @ {:?}", &path);
        match tokio::fs::write(&path, &data).await {
            Ok(()) => Ok(()),
            Err(ref e) if e.kind() == ErrorKind::NotFound => {
                if let Some(parent) = path.parent() {
                    tokio::fs::create_dir_all(parent).await?;
                }
                tokio::fs::write(&path, data).await?;
                Ok(())
            },
            Err(other) => Err(other.into()),
        }
    }

    async fn delete(&self, key: &str) -> anyhow::Result<DeleteAck> {
        let path = self.format_path(key)?;

        debug!("Purging object @ {:?}", &path);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(DeleteAck { removed: true }),
            Err(ref e) if e.kind() == ErrorKind::NotFound => Ok(DeleteAck { removed: false }),
            Err(other) => Err(other.into()),
        }
    }

    fn public_base_url(&self) -> String {
        format!("file://{}", self.directory.display())
    }
}
