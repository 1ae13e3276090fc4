//! Rasterizer
//!
//! Turns a page into an RGB pixel grid of exactly the requested dimensions.
//! Painting is the engine's job; this module owns the output contract:
//! exact size, opaque RGB, memory bounded by `width × height × 3`.

use crate::document::PageRef;
use crate::engine::{EngineDocument, EnginePixmap};
use crate::error::{LazyPdfError, Result};
use crate::geometry::PixelDimensions;

/// Bytes per pixel in a [`RasterBuffer`]
pub const CHANNELS: usize = 3;

/// Opaque RGB8 pixel grid, row-major, no row padding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterBuffer {
    dims: PixelDimensions,
    pixels: Vec<u8>,
}

impl RasterBuffer {
    /// Allocate a white raster, failing gracefully on exhaustion
    pub fn white(dims: PixelDimensions) -> Result<Self> {
        let len = byte_len(dims)?;
        let mut pixels = Vec::new();
        pixels.try_reserve_exact(len)?;
        pixels.resize(len, 0xFF);
        Ok(Self { dims, pixels })
    }

    /// Wrap existing RGB8 pixels
    pub fn from_rgb(dims: PixelDimensions, pixels: Vec<u8>) -> Result<Self> {
        if pixels.len() != byte_len(dims)? {
            return Err(LazyPdfError::invalid_parameter(format!(
                "{} bytes do not form a {}x{} RGB raster",
                pixels.len(),
                dims.width,
                dims.height
            )));
        }
        Ok(Self { dims, pixels })
    }

    pub fn dimensions(&self) -> PixelDimensions {
        self.dims
    }

    pub fn width(&self) -> u32 {
        self.dims.width
    }

    pub fn height(&self) -> u32 {
        self.dims.height
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.dims.width || y >= self.dims.height {
            return None;
        }
        let at = (y as usize * self.dims.width as usize + x as usize) * CHANNELS;
        Some([self.pixels[at], self.pixels[at + 1], self.pixels[at + 2]])
    }
}

fn byte_len(dims: PixelDimensions) -> Result<usize> {
    usize::try_from(dims.area())
        .ok()
        .and_then(|area| area.checked_mul(CHANNELS))
        .ok_or_else(|| {
            LazyPdfError::allocation(format!(
                "raster {}x{} does not fit in memory",
                dims.width, dims.height
            ))
        })
}

/// Render `page` into a raster of exactly `dims`
pub fn rasterize<D: EngineDocument>(page: &PageRef<'_, D>, dims: PixelDimensions) -> Result<RasterBuffer> {
    let pixmap = page.engine_document().render_page(page.index(), dims)?;

    if pixmap.width != dims.width || pixmap.height != dims.height {
        tracing::warn!(
            page = page.index(),
            engine_width = pixmap.width,
            engine_height = pixmap.height,
            width = dims.width,
            height = dims.height,
            "Engine output size differs from target, normalizing"
        );
    }

    normalize(&pixmap, dims)
}

/// Copy an engine pixmap into an exact-size RGB raster.
///
/// Surplus rows/columns are cropped, missing ones stay white. Alpha is
/// composited over white.
pub fn normalize(pixmap: &EnginePixmap, dims: PixelDimensions) -> Result<RasterBuffer> {
    let n = pixmap.components;
    if !(1..=4).contains(&n) {
        return Err(LazyPdfError::render(format!(
            "unsupported pixmap with {} components",
            n
        )));
    }

    let stride = pixmap.stride();
    if pixmap.width > 0 && stride < pixmap.width as usize * n {
        return Err(LazyPdfError::render(format!(
            "pixmap has {} sample bytes, too few for {}x{}x{}",
            pixmap.samples.len(),
            pixmap.width,
            pixmap.height,
            n
        )));
    }

    let mut raster = RasterBuffer::white(dims)?;
    let rows = pixmap.height.min(dims.height) as usize;
    let cols = pixmap.width.min(dims.width) as usize;
    let out_stride = dims.width as usize * CHANNELS;

    for y in 0..rows {
        let src = &pixmap.samples[y * stride..y * stride + cols * n];
        let dst = &mut raster.pixels[y * out_stride..y * out_stride + cols * CHANNELS];
        for (s, d) in src.chunks_exact(n).zip(dst.chunks_exact_mut(CHANNELS)) {
            d.copy_from_slice(&to_rgb(s));
        }
    }

    Ok(raster)
}

fn to_rgb(sample: &[u8]) -> [u8; 3] {
    match *sample {
        [g] => [g, g, g],
        [g, a] => {
            let g = over_white(g, a);
            [g, g, g]
        }
        [r, g, b] => [r, g, b],
        [r, g, b, a] => [over_white(r, a), over_white(g, a), over_white(b, a)],
        _ => [0xFF, 0xFF, 0xFF],
    }
}

fn over_white(c: u8, a: u8) -> u8 {
    let (c, a) = (c as u32, a as u32);
    ((c * a + 255 * (255 - a) + 127) / 255) as u8
}
