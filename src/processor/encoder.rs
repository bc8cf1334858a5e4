use std::io::Cursor;

use anyhow::anyhow;
use bytes::Bytes;
use enum_dispatch::enum_dispatch;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageOutputFormat};

use crate::config::{EncoderOptions, ImageKind};

const DEFAULT_QUALITY: f32 = 80.0;

/// libwebp refuses anything larger on either side.
pub const WEBP_MAX_DIMENSION: u32 = 16383;

/// Both the jpeg and gif headers store dimensions as u16.
pub const U16_MAX_DIMENSION: u32 = u16::MAX as u32;

#[enum_dispatch]
pub trait VariantCodec {
    fn encode(&self, img: &DynamicImage) -> anyhow::Result<Bytes>;

    /// The largest width or height the encoding can represent.
    fn max_dimension(&self) -> u32 {
        u32::MAX
    }

    fn check_dimensions(&self, width: u32, height: u32) -> anyhow::Result<()> {
        let max = self.max_dimension();
        if width > max || height > max {
            return Err(anyhow!(
                "Image of {}x{} exceeds the encoder limit of {} pixels per side",
                width,
                height,
                max,
            ));
        }
        Ok(())
    }
}

/// Codecs are selected per variant here.
///
/// This is not a Box<dyn Trait> as every variant of every upload
/// goes through it and the set of encodings is closed.
#[enum_dispatch(VariantCodec)]
#[derive(Debug, Clone, Copy)]
pub enum Codec {
    WebpCodec,
    JpegCodec,
    PngCodec,
    GifCodec,
}

impl Codec {
    pub fn new(kind: ImageKind, options: &EncoderOptions) -> Self {
        match kind {
            ImageKind::Webp => WebpCodec {
                quality: options.quality.unwrap_or(DEFAULT_QUALITY),
                lossless: options.lossless.unwrap_or(false),
            }
            .into(),
            ImageKind::Jpeg => JpegCodec {
                quality: quality_to_u8(options.quality.unwrap_or(DEFAULT_QUALITY)),
            }
            .into(),
            ImageKind::Png => PngCodec.into(),
            ImageKind::Gif => GifCodec.into(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct WebpCodec {
    quality: f32,
    lossless: bool,
}

impl VariantCodec for WebpCodec {
    fn encode(&self, img: &DynamicImage) -> anyhow::Result<Bytes> {
        // libwebp hands back a null buffer for oversized images.
        self.check_dimensions(img.width(), img.height())?;

        // The webp encoder only understands 8 bit RGB(A) layouts.
        let img = if img.color().has_alpha() {
            DynamicImage::ImageRgba8(img.to_rgba8())
        } else {
            DynamicImage::ImageRgb8(img.to_rgb8())
        };

        let encoder = webp::Encoder::from_image(&img)
            .map_err(|e| anyhow!("Unable to prepare webp encoder: {}", e))?;

        let encoded = if self.lossless {
            encoder.encode_lossless()
        } else {
            encoder.encode(self.quality.clamp(0.0, 100.0))
        };

        if encoded.is_empty() {
            return Err(anyhow!("webp encoder produced no output"));
        }

        Ok(Bytes::copy_from_slice(&encoded))
    }

    fn max_dimension(&self) -> u32 {
        WEBP_MAX_DIMENSION
    }
}

#[derive(Debug, Clone, Copy)]
pub struct JpegCodec {
    quality: u8,
}

impl VariantCodec for JpegCodec {
    fn encode(&self, img: &DynamicImage) -> anyhow::Result<Bytes> {
        self.check_dimensions(img.width(), img.height())?;
        let rgb = img.to_rgb8();

        let mut buff = Vec::new();
        JpegEncoder::new_with_quality(&mut buff, self.quality).encode_image(&rgb)?;
        Ok(Bytes::from(buff))
    }

    fn max_dimension(&self) -> u32 {
        U16_MAX_DIMENSION
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PngCodec;

impl VariantCodec for PngCodec {
    fn encode(&self, img: &DynamicImage) -> anyhow::Result<Bytes> {
        write_with(img, ImageOutputFormat::Png)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct GifCodec;

impl VariantCodec for GifCodec {
    fn encode(&self, img: &DynamicImage) -> anyhow::Result<Bytes> {
        self.check_dimensions(img.width(), img.height())?;
        write_with(img, ImageOutputFormat::Gif)
    }

    fn max_dimension(&self) -> u32 {
        U16_MAX_DIMENSION
    }
}

#[inline]
fn write_with(img: &DynamicImage, format: ImageOutputFormat) -> anyhow::Result<Bytes> {
    let mut buff = Cursor::new(Vec::new());
    img.write_to(&mut buff, format)?;
    Ok(Bytes::from(buff.into_inner()))
}

#[inline]
fn quality_to_u8(quality: f32) -> u8 {
    quality.clamp(1.0, 100.0).round() as u8
}
