use std::str::FromStr;
use std::sync::Arc;

use anyhow::anyhow;
use bytes::Bytes;
use hashbrown::HashMap;
use image::DynamicImage;

use crate::config::ImageKind;
use crate::error::PipelineError;

pub mod encoder;
pub mod plan;
pub mod resizer;

pub use encoder::{Codec, VariantCodec};
pub use plan::{VariantPlan, VariantSpec};

/// A planned variant with its encoded data.
#[derive(Debug, Clone)]
pub struct RenderedVariant {
    pub spec: VariantSpec,
    pub buffer: Bytes,
}

/// Renders every variant of `plan` from the `data` source image.
///
/// Each variant is resized and encoded on the rayon pool independently.
/// The batch is all-or-nothing: if any single variant fails the whole
/// call fails and none of the rendered buffers are returned.
///
/// The returned variants follow the order of the plan.
pub fn render(data: &[u8], plan: &VariantPlan) -> Result<Vec<RenderedVariant>, PipelineError> {
    if plan.is_empty() {
        return Ok(vec![]);
    }

    let original_image = Arc::new(image::load_from_memory(data)?);

    let (tx, rx) = crossbeam::channel::bounded(plan.len());
    for (idx, spec) in plan.iter().enumerate() {
        let local_tx = tx.clone();
        let local = original_image.clone();
        let spec = spec.clone();
        rayon::spawn(move || {
            let result = render_one(&local, &spec);
            let _ = local_tx.send((idx, spec.key, result));
        });
    }

    // Needed to prevent deadlock.
    drop(tx);

    let mut buffers = HashMap::with_capacity(plan.len());
    while let Ok((idx, key, result)) = rx.recv() {
        let buff = result.map_err(|e| PipelineError::render(key, e))?;
        buffers.insert(idx, buff);
    }

    let mut finished = Vec::with_capacity(plan.len());
    for (idx, spec) in plan.iter().enumerate() {
        let buffer = buffers.remove(&idx).ok_or(PipelineError::RenderAborted)?;
        finished.push(RenderedVariant {
            spec: spec.clone(),
            buffer,
        });
    }

    Ok(finished)
}

/// Runs `render` on the blocking pool so async callers are not stalled.
pub async fn render_async(
    data: Bytes,
    plan: VariantPlan,
) -> Result<Vec<RenderedVariant>, PipelineError> {
    tokio::task::spawn_blocking(move || render(&data, &plan))
        .await
        .map_err(|_| PipelineError::RenderAborted)?
}

fn render_one(img: &DynamicImage, spec: &VariantSpec) -> anyhow::Result<Bytes> {
    let kind = ImageKind::from_str(&spec.format)
        .map_err(|_| anyhow!("Unsupported image format {:?}", spec.format))?;

    let codec = Codec::new(kind, &spec.options);

    // Checked up front so oversized variants are never resized at all.
    let height = resizer::target_height(img.width(), img.height(), spec.width);
    codec.check_dimensions(spec.width, height)?;

    let resized = resizer::resize_to_width(img, spec.width)?;
    codec.encode(&resized)
}
