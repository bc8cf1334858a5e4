use std::collections::BTreeMap;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// An uploaded file as handed over by the host.
///
/// `hash`, `ext`, `mime` and `buffer` are inputs, `url` and `formats`
/// are written by uploads and read back by deletes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Asset {
    pub hash: String,

    /// The original file extension including its leading dot, e.g. `.png`.
    pub ext: String,

    pub mime: String,

    #[serde(skip)]
    pub buffer: Bytes,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default)]
    pub formats: BTreeMap<String, FormatEntry>,
}

impl Asset {
    pub fn new(
        hash: impl Into<String>,
        ext: impl Into<String>,
        mime: impl Into<String>,
        buffer: impl Into<Bytes>,
    ) -> Self {
        Self {
            hash: hash.into(),
            ext: ext.into(),
            mime: mime.into(),
            buffer: buffer.into(),
            url: None,
            formats: BTreeMap::new(),
        }
    }

    /// Every URL an upload of this asset could have produced.
    ///
    /// This is the asset's own URL followed by each `formats` entry,
    /// nested records are flattened exactly one level deep and
    /// unrecognised entries contribute nothing.
    pub fn stored_urls(&self) -> Vec<&str> {
        let mut urls: Vec<&str> = self.url.iter().map(String::as_str).collect();
        for entry in self.formats.values() {
            entry.collect_urls(&mut urls);
        }
        urls
    }
}

/// The persisted record of one uploaded variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantMetadata {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub ext: String,

    #[serde(default)]
    pub mime: String,

    pub url: String,
}

/// A value found in an asset's `formats` map.
///
/// Hosts do not all store the same shape, a variant may be recorded
/// as a bare URL, as a full record, or as a record bundling its own
/// sub variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FormatEntry {
    PlainUrl(String),
    NestedVariantRecord(NestedVariantRecord),
    VariantRecord(VariantMetadata),
    Unrecognised(serde_json::Value),
}

impl FormatEntry {
    fn collect_urls<'a>(&'a self, urls: &mut Vec<&'a str>) {
        match self {
            Self::PlainUrl(url) => urls.push(url),
            Self::VariantRecord(record) => urls.push(&record.url),
            Self::NestedVariantRecord(record) => {
                urls.extend(record.url.as_deref());
                urls.extend(record.formats.values().filter_map(NestedEntry::url));
            },
            Self::Unrecognised(_) => {},
        }
    }
}

impl From<VariantMetadata> for FormatEntry {
    fn from(record: VariantMetadata) -> Self {
        Self::VariantRecord(record)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NestedVariantRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    pub formats: BTreeMap<String, NestedEntry>,
}

/// A sub variant of a nested record, never flattened any further.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NestedEntry {
    PlainUrl(String),
    Record { url: String },
    Unrecognised(serde_json::Value),
}

impl NestedEntry {
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::PlainUrl(url) => Some(url),
            Self::Record { url } => Some(url),
            Self::Unrecognised(_) => None,
        }
    }
}

/// The metadata written by an upload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoredAsset {
    /// The URL of the original file, unset until it has been uploaded.
    pub url: Option<String>,

    /// Every uploaded variant keyed by its plan key.
    pub formats: BTreeMap<String, VariantMetadata>,
}

impl StoredAsset {
    pub fn is_empty(&self) -> bool {
        self.url.is_none() && self.formats.is_empty()
    }

    /// Writes the uploaded metadata onto the host's asset.
    ///
    /// Fields with nothing uploaded are left untouched.
    pub fn apply_to(self, asset: &mut Asset) {
        if let Some(url) = self.url {
            asset.url = Some(url);
        }

        if !self.formats.is_empty() {
            asset.formats = self
                .formats
                .into_iter()
                .map(|(key, record)| (key, record.into()))
                .collect();
        }
    }
}
