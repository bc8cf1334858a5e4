use thiserror::Error;

pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Failures raised while rendering, uploading or deleting variants.
///
/// None of these escape `AssetController::upload` or `AssetController::delete`,
/// they end up in the logs and in the returned outcome values.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Unable to decode source image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("Rendering variant {key} failed: {source}")]
    Render {
        key: String,
        #[source]
        source: BoxedError,
    },

    #[error("Render worker exited before reporting every variant")]
    RenderAborted,

    #[error("Uploading {key} failed: {source}")]
    Upload {
        key: String,
        #[source]
        source: BoxedError,
    },

    #[error("Deleting {key} failed: {source}")]
    Delete {
        key: String,
        #[source]
        source: BoxedError,
    },

    #[error("Store did not acknowledge removal of {key}")]
    NotRemoved { key: String },
}

impl PipelineError {
    pub fn render(key: impl Into<String>, error: anyhow::Error) -> Self {
        Self::Render {
            key: key.into(),
            source: error.into(),
        }
    }

    pub fn upload(key: impl Into<String>, error: anyhow::Error) -> Self {
        Self::Upload {
            key: key.into(),
            source: error.into(),
        }
    }

    pub fn delete(key: impl Into<String>, error: anyhow::Error) -> Self {
        Self::Delete {
            key: key.into(),
            source: error.into(),
        }
    }
}
