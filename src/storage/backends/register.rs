use std::path::PathBuf;
use std::sync::Arc;

use serde::Deserialize;

use crate::storage::ObjectStore;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendConfigs {
    S3 {
        bucket: String,
        region: String,

        #[serde(default)]
        /// A custom endpoint for S3 compatible stores.
        endpoint: Option<String>,

        #[serde(default)]
        access_key: Option<String>,

        #[serde(default)]
        secret_key: Option<String>,
    },
    FileSystem {
        directory: PathBuf,
    },
}

impl BackendConfigs {
    pub fn connect(&self) -> anyhow::Result<Arc<dyn ObjectStore>> {
        match self {
            Self::S3 {
                bucket,
                region,
                endpoint,
                access_key,
                secret_key,
            } => {
                let backend = super::blob_storage::BlobStorageBackend::new(
                    bucket.clone(),
                    region.clone(),
                    endpoint.clone(),
                    access_key.as_deref(),
                    secret_key.as_deref(),
                )?;
                Ok(Arc::new(backend))
            },
            Self::FileSystem { directory } => {
                Ok(Arc::new(super::filesystem::FileSystemBackend::new(directory.clone())))
            },
        }
    }
}
