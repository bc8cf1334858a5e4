#[macro_use]
extern crate tracing;

pub mod asset;
pub mod config;
pub mod controller;
pub mod error;
pub mod keys;
pub mod processor;
pub mod storage;


pub use asset::{Asset, FormatEntry, StoredAsset, VariantMetadata};
pub use config::{EncoderOptions, FormatSpec, ImageKind, PipelineConfig, SizeSpec};
pub use controller::{AssetController, DeleteOutcome, UploadOutcome};
pub use error::PipelineError;
pub use storage::{DeleteAck, ObjectStore};
