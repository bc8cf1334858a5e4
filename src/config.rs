use std::path::Path;
use std::str::FromStr;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use strum::{EnumIter, EnumString};

use crate::storage::backends::BackendConfigs;

/// The encodings a variant can be rendered to.
///
/// Parsing is case-insensitive and accepts both `jpg` and `jpeg`, the
/// configured format name itself is kept verbatim for keys and file names.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, EnumString, EnumIter)]
#[strum(ascii_case_insensitive, serialize_all = "lowercase")]
pub enum ImageKind {
    Webp,

    #[strum(serialize = "jpeg", serialize = "jpg")]
    Jpeg,

    Png,

    Gif,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// The object store the variants and originals are written to.
    pub backend: BackendConfigs,

    #[serde(default)]
    /// The public URL prefix of stored objects.
    ///
    /// When absent it is derived from the backend, e.g.
    /// `https://{bucket}.s3.{region}.amazonaws.com` for S3.
    pub base_url: Option<String>,

    #[serde(default)]
    /// A path segment prepended to every object key.
    pub root_path: Option<String>,

    #[serde(default = "default_formats")]
    /// The encodings every configured size is rendered to.
    ///
    /// Defaults to `webp` and `jpg` at quality 90.
    pub formats: Vec<FormatSpec>,

    #[serde(default = "default_sizes")]
    /// The named target widths.
    ///
    /// Defaults to a single `medium` size 960 pixels wide.
    pub sizes: Vec<SizeSpec>,
}

impl PipelineConfig {
    pub fn from_yaml(raw: &str) -> Result<Self> {
        let cfg: Self = serde_yaml::from_str(raw)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| anyhow!("Unable to read config file {:?}: {}", path, e))?;

        Self::from_yaml(&raw)
    }

    pub fn validate(&self) -> Result<()> {
        for format in self.formats.iter() {
            format.kind()?;
        }

        for size in self.sizes.iter() {
            if size.width == 0 {
                return Err(anyhow!("Size {:?} must have a width greater than 0", size.name));
            }
        }

        Ok(())
    }

    /// The configured root path, with an empty string counting as unset.
    pub fn root_path(&self) -> Option<&str> {
        self.root_path.as_deref().filter(|p| !p.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormatSpec {
    /// The encoding name, e.g. `webp` or `jpg`.
    pub name: String,

    #[serde(default)]
    pub options: EncoderOptions,
}

impl FormatSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            options: EncoderOptions::default(),
        }
    }

    pub fn with_quality(name: impl Into<String>, quality: f32) -> Self {
        Self {
            name: name.into(),
            options: EncoderOptions {
                quality: Some(quality),
                ..EncoderOptions::default()
            },
        }
    }

    pub fn kind(&self) -> Result<ImageKind> {
        ImageKind::from_str(&self.name)
            .map_err(|_| anyhow!("Unsupported image format {:?}", self.name))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizeSpec {
    pub name: String,

    /// The width to resize to, height follows the source aspect ratio.
    pub width: u32,
}

impl SizeSpec {
    pub fn new(name: impl Into<String>, width: u32) -> Self {
        Self {
            name: name.into(),
            width,
        }
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EncoderOptions {
    /// The lossy quality from 0.0 to 100.0 inclusive.
    ///
    /// Applies to webp and jpeg, both default to 80.
    pub quality: Option<f32>,

    /// Puts the webp encoder into lossless mode, `quality` is ignored.
    pub lossless: Option<bool>,
}

fn default_formats() -> Vec<FormatSpec> {
    vec![FormatSpec::new("webp"), FormatSpec::with_quality("jpg", 90.0)]
}

fn default_sizes() -> Vec<SizeSpec> {
    vec![SizeSpec::new("medium", 960)]
}
