//! Page geometry
//!
//! Converts a page's native size in points into pixel dimensions for a
//! render request. Both the size-only query and the render path go through
//! [`resolve_size`], so a size reported for a request is exactly the size a
//! render of that request produces.
//!
//! # Precedence
//!
//! When several parameters are set, the first strictly positive one wins:
//!
//! 1. `dpi`: `points × dpi / 72`
//! 2. `width`: uniform scale so the rendered width equals `width`
//! 3. `scale`: `points × scale`
//!
//! Every side is rounded half away from zero and is at least 1 pixel.

use serde::{Deserialize, Serialize};

use crate::error::{LazyPdfError, Result};

/// Points per inch; scale 1.0 renders at this resolution
pub const POINTS_PER_INCH: f64 = 72.0;

/// Native page size in points (1/72 inch), rotation applied
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

impl PageSize {
    /// Build a page size, rejecting non-positive or non-finite sides
    pub fn new(width: f32, height: f32) -> Result<Self> {
        if !(width.is_finite() && height.is_finite()) || width <= 0.0 || height <= 0.0 {
            return Err(LazyPdfError::render(format!(
                "page has degenerate bounds {}x{} points",
                width, height
            )));
        }
        Ok(Self { width, height })
    }

    pub fn is_landscape(&self) -> bool {
        self.width > self.height
    }
}

/// Output raster size in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PixelDimensions {
    pub width: u32,
    pub height: u32,
}

impl PixelDimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Total pixel count, computed without overflow
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

/// Request for sizing or rendering a page
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderRequest {
    /// Page index (0-indexed)
    #[serde(default)]
    pub page: usize,
    /// Requested output width in pixels
    #[serde(default)]
    pub width: Option<u32>,
    /// Scale factor (1.0 = 72 DPI)
    #[serde(default)]
    pub scale: Option<f32>,
    /// Output resolution in dots per inch
    #[serde(default)]
    pub dpi: Option<f32>,
}

impl RenderRequest {
    pub fn for_page(page: usize) -> Self {
        Self {
            page,
            ..Default::default()
        }
    }

    pub fn with_width(mut self, width: u32) -> Self {
        self.width = Some(width);
        self
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = Some(scale);
        self
    }

    pub fn with_dpi(mut self, dpi: f32) -> Self {
        self.dpi = Some(dpi);
        self
    }

    /// The parameter that drives sizing for this request, if any
    pub fn driver(&self) -> Option<SizeDriver> {
        if let Some(dpi) = self.dpi.filter(|d| is_positive(*d)) {
            return Some(SizeDriver::Dpi(dpi));
        }
        if let Some(width) = self.width.filter(|w| *w > 0) {
            return Some(SizeDriver::Width(width));
        }
        self.scale.filter(|s| is_positive(*s)).map(SizeDriver::Scale)
    }
}

/// The request parameter that won the precedence check
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SizeDriver {
    Dpi(f32),
    Width(u32),
    Scale(f32),
}

fn is_positive(v: f32) -> bool {
    v.is_finite() && v > 0.0
}

/// Resolve the pixel dimensions a request produces for a page
pub fn resolve_size(page: PageSize, request: &RenderRequest) -> Result<PixelDimensions> {
    let driver = request.driver().ok_or_else(|| {
        LazyPdfError::invalid_parameter(
            "no positive width, scale or dpi given, cannot resolve output size",
        )
    })?;

    let (w, h) = (page.width as f64, page.height as f64);
    match driver {
        SizeDriver::Dpi(dpi) => {
            let factor = dpi as f64 / POINTS_PER_INCH;
            Ok(PixelDimensions::new(
                to_pixels(w * factor)?,
                to_pixels(h * factor)?,
            ))
        }
        SizeDriver::Width(width) => {
            let factor = width as f64 / w;
            Ok(PixelDimensions::new(width, to_pixels(h * factor)?))
        }
        SizeDriver::Scale(scale) => {
            let factor = scale as f64;
            Ok(PixelDimensions::new(
                to_pixels(w * factor)?,
                to_pixels(h * factor)?,
            ))
        }
    }
}

fn to_pixels(value: f64) -> Result<u32> {
    let rounded = value.round();
    if !rounded.is_finite() || rounded > u32::MAX as f64 {
        return Err(LazyPdfError::invalid_parameter(format!(
            "resolved size {} is not representable",
            value
        )));
    }
    Ok((rounded as u32).max(1))
}

/// Upper bounds on raster size, checked before any pixel buffer exists
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderLimits {
    /// Maximum pixels on either side
    pub max_dimension: u32,
    /// Maximum total pixels
    pub max_pixels: u64,
}

impl Default for RenderLimits {
    fn default() -> Self {
        Self {
            max_dimension: 20_000,
            max_pixels: 200_000_000,
        }
    }
}

impl RenderLimits {
    pub fn check(&self, dims: PixelDimensions) -> Result<()> {
        if dims.width > self.max_dimension || dims.height > self.max_dimension {
            return Err(LazyPdfError::invalid_parameter(format!(
                "requested raster {}x{} exceeds the maximum side of {} pixels",
                dims.width, dims.height, self.max_dimension
            )));
        }
        if dims.area() > self.max_pixels {
            return Err(LazyPdfError::invalid_parameter(format!(
                "requested raster {}x{} exceeds the limit of {} pixels",
                dims.width, dims.height, self.max_pixels
            )));
        }
        Ok(())
    }
}
