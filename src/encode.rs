//! PNG encoder
//!
//! Lossless serialization of a [`RasterBuffer`]. Encoding is deterministic:
//! the same pixels and compression level always give the same bytes.

use std::io::Cursor;
use std::str::FromStr;

use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ExtendedColorType, ImageEncoder, ImageFormat};
use serde::Deserialize;

use crate::error::{LazyPdfError, Result};
use crate::geometry::PixelDimensions;
use crate::raster::RasterBuffer;

/// zlib effort used for PNG output
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PngCompression {
    #[default]
    Fast,
    Default,
    Best,
}

impl PngCompression {
    fn compression_type(self) -> CompressionType {
        match self {
            PngCompression::Fast => CompressionType::Fast,
            PngCompression::Default => CompressionType::Default,
            PngCompression::Best => CompressionType::Best,
        }
    }
}

impl FromStr for PngCompression {
    type Err = LazyPdfError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fast" => Ok(PngCompression::Fast),
            "default" => Ok(PngCompression::Default),
            "best" => Ok(PngCompression::Best),
            other => Err(LazyPdfError::invalid_parameter(format!(
                "unknown PNG compression '{}', expected fast, default or best",
                other
            ))),
        }
    }
}

/// An encoded image owned by whoever holds it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    data: Vec<u8>,
    dims: PixelDimensions,
}

impl EncodedImage {
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn dimensions(&self) -> PixelDimensions {
        self.dims
    }
}

/// Encode a raster as an RGB8 PNG
pub fn encode_png(raster: &RasterBuffer, compression: PngCompression) -> Result<EncodedImage> {
    let dims = raster.dimensions();
    let mut data = Vec::new();
    // Compressed output rarely exceeds a quarter of the raw size
    data.try_reserve(raster.as_bytes().len() / 4 + 1024)?;

    let encoder = PngEncoder::new_with_quality(
        Cursor::new(&mut data),
        compression.compression_type(),
        FilterType::Adaptive,
    );
    encoder.write_image(
        raster.as_bytes(),
        dims.width,
        dims.height,
        ExtendedColorType::Rgb8,
    )?;

    Ok(EncodedImage { data, dims })
}

/// Decode PNG bytes back into an RGB raster
pub fn decode_png(bytes: &[u8]) -> Result<RasterBuffer> {
    let img = image::load_from_memory_with_format(bytes, ImageFormat::Png)
        .map_err(|e| LazyPdfError::encoding(format!("invalid PNG: {}", e)))?
        .to_rgb8();
    let dims = PixelDimensions::new(img.width(), img.height());
    RasterBuffer::from_rgb(dims, img.into_raw())
}
