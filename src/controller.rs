use std::sync::Arc;

use bytes::Bytes;
use futures::future::join_all;
use once_cell::sync::Lazy;
use tracing::instrument;
use tracing_futures::Instrument;

use crate::asset::{Asset, StoredAsset, VariantMetadata};
use crate::config::{FormatSpec, PipelineConfig, SizeSpec};
use crate::error::PipelineError;
use crate::keys::{self, FileName};
use crate::processor::{self, VariantPlan};
use crate::storage::ObjectStore;

/// Hashes containing this (in any case) belong to thumbnails themselves.
pub const THUMBNAIL_MARKER: &str = "thumbnail_";

static THUMBNAIL_FORMATS: Lazy<Vec<FormatSpec>> = Lazy::new(|| vec![FormatSpec::new("webp")]);
static THUMBNAIL_SIZES: Lazy<Vec<SizeSpec>> = Lazy::new(|| vec![SizeSpec::new("thumbnail", 256)]);

#[inline]
pub fn is_thumbnail(hash: &str) -> bool {
    hash.to_lowercase().contains(THUMBNAIL_MARKER)
}

/// The result of storing an asset.
///
/// Uploads are not transactional, `stored` holds everything written
/// before `error` occurred.
#[derive(Debug)]
pub struct UploadOutcome {
    pub stored: StoredAsset,
    pub error: Option<PipelineError>,
}

#[derive(Debug)]
pub struct DeleteOutcome {
    pub key: String,
    pub result: Result<(), PipelineError>,
}

pub struct AssetController {
    storage: Arc<dyn ObjectStore>,
    base_url: String,
    root_path: Option<String>,
    formats: Vec<FormatSpec>,
    sizes: Vec<SizeSpec>,
}

impl AssetController {
    pub fn new(config: &PipelineConfig, storage: Arc<dyn ObjectStore>) -> Self {
        let base_url = keys::resolve_base_url(config.base_url.as_deref(), || {
            storage.public_base_url()
        });

        Self {
            storage,
            base_url,
            root_path: config.root_path().map(ToString::to_string),
            formats: config.formats.clone(),
            sizes: config.sizes.clone(),
        }
    }

    /// Connects to the configured backend and builds a controller around it.
    pub fn connect(config: &PipelineConfig) -> anyhow::Result<Self> {
        let storage = config.backend.connect()?;
        Ok(Self::new(config, storage))
    }

    #[inline]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The configured variants followed by the thumbnail.
    ///
    /// A configured size named `thumbnail` is replaced by the thumbnail.
    pub fn plan(&self) -> VariantPlan {
        VariantPlan::build(&self.formats, &self.sizes, false)
            .merge(VariantPlan::build(&THUMBNAIL_FORMATS, &THUMBNAIL_SIZES, true))
    }

    /// Renders and uploads every variant of the asset, then the original.
    ///
    /// The asset itself is not touched, see `upload` for that.
    pub async fn store(&self, asset: &Asset) -> UploadOutcome {
        let mut stored = StoredAsset::default();
        let error = self.store_into(asset, &mut stored).await.err();
        UploadOutcome { stored, error }
    }

    async fn store_into(&self, asset: &Asset, stored: &mut StoredAsset) -> Result<(), PipelineError> {
        if is_thumbnail(&asset.hash) {
            debug!("Skipping variant generation for thumbnail {}", &asset.hash);
            return Ok(());
        }

        let rendered = processor::render_async(asset.buffer.clone(), self.plan()).await?;

        // One at a time to bound the number of buffers in flight.
        for variant in rendered {
            let spec = variant.spec;
            let file_name = FileName::Variant {
                hash: &asset.hash,
                size_name: &spec.size_name,
                format: &spec.format,
            };
            let name = file_name.to_string();
            let key = keys::to_key(self.root_path.as_deref(), &file_name);
            let mime = format!("image/{}", spec.format);

            let url = self.put(&key, variant.buffer, &mime).await?;
            stored.formats.insert(spec.key, VariantMetadata {
                name,
                ext: format!(".{}", spec.format),
                mime,
                url,
            });
        }

        let key = keys::to_key(self.root_path.as_deref(), &FileName::Original {
            hash: &asset.hash,
            ext: &asset.ext,
        });
        stored.url = Some(self.put(&key, asset.buffer.clone(), &asset.mime).await?);

        Ok(())
    }

    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> Result<String, PipelineError> {
        self.storage
            .put(key, data, content_type)
            .await
            .map_err(|e| PipelineError::upload(key, e))?;

        Ok(keys::to_url(&self.base_url, key))
    }

    /// Uploads the asset and writes the resulting metadata onto it.
    ///
    /// Never fails, errors are logged and whatever was uploaded before
    /// the error is still recorded on the asset.
    #[instrument(name = "upload", skip_all, fields(hash = %asset.hash))]
    pub async fn upload(&self, asset: &mut Asset) {
        let outcome = self.store(asset).await;

        match (&outcome.error, &outcome.stored.url) {
            (Some(e), _) => error!("Error uploading file(s): {}", e),
            (None, Some(url)) => info!("File incl. its variants uploaded successfully: {}", url),
            (None, None) => info!("Nothing uploaded for thumbnail {}", &asset.hash),
        }

        outcome.stored.apply_to(asset);
    }

    /// The storage keys of every object recorded on the asset.
    ///
    /// URLs outside of this store's base URL are skipped.
    pub fn delete_keys<'a>(&self, asset: &'a Asset) -> Vec<&'a str> {
        asset
            .stored_urls()
            .into_iter()
            .filter_map(|url| {
                let key = keys::to_key_from_url(&self.base_url, url);
                if key.is_none() {
                    warn!("Skipping {} as it is not owned by this store", url);
                }
                key
            })
            .collect()
    }

    /// Deletes every object recorded on the asset in parallel.
    ///
    /// Never fails, each key's result is logged and returned.
    #[instrument(name = "delete", skip_all, fields(hash = %asset.hash))]
    pub async fn delete(&self, asset: &Asset) -> Vec<DeleteOutcome> {
        let targets = self.delete_keys(asset);

        let requests = targets.iter().map(|key| {
            self.storage
                .delete(key)
                .instrument(debug_span!("delete_object", key = %key))
        });
        let responses = join_all(requests).await;

        targets
            .into_iter()
            .zip(responses)
            .map(|(key, response)| {
                let result = match response {
                    Ok(ack) if ack.removed => {
                        info!("Deleted file {}", key);
                        Ok(())
                    },
                    Ok(_) => Err(PipelineError::NotRemoved { key: key.to_string() }),
                    Err(e) => Err(PipelineError::delete(key, e)),
                };

                if let Err(ref e) = result {
                    error!("Error deleting file {}: {}", key, e);
                }

                DeleteOutcome {
                    key: key.to_string(),
                    result,
                }
            })
            .collect()
    }
}
