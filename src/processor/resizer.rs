use anyhow::anyhow;
use image::imageops::FilterType;
use image::DynamicImage;

/// Resizes `img` to exactly `width` pixels wide keeping the aspect ratio.
///
/// Upscaling is allowed, the height never drops below 1 pixel.
pub fn resize_to_width(img: &DynamicImage, width: u32) -> anyhow::Result<DynamicImage> {
    if width == 0 {
        return Err(anyhow!("Target width must be greater than 0"));
    }

    if img.width() == 0 {
        return Err(anyhow!("Source image has no width"));
    }

    let height = target_height(img.width(), img.height(), width);
    Ok(img.resize_exact(width, height, FilterType::Lanczos3))
}

#[inline]
pub fn target_height(src_width: u32, src_height: u32, width: u32) -> u32 {
    let scaled = (src_height as f64 * width as f64 / src_width as f64).round();
    (scaled as u32).max(1)
}
