//! PDF engine capability surface
//!
//! Parsing, page-tree resolution and painting live in an external engine.
//! This module pins down the little the rest of the crate needs from it:
//!
//! ```text
//! open(bytes)                     -> document
//! page_count(document)            -> int
//! page_size(document, idx)        -> (w, h) in points
//! render_page(document, idx, w,h) -> pixels
//! ```
//!
//! [`MupdfEngine`] is the production implementation.

mod mupdf_backend;

#[cfg(test)]
pub(crate) mod fake;

pub use mupdf_backend::{MupdfDocument, MupdfEngine};

use crate::error::Result;
use crate::geometry::{PageSize, PixelDimensions};
use crate::input::PdfBytes;

/// Opens documents from in-memory bytes.
///
/// Implementations hold no per-document state: each `open` returns an
/// independent document, so concurrent calls on different buffers never
/// share anything.
pub trait PdfEngine: Send + Sync {
    type Document: EngineDocument;

    fn open(&self, bytes: PdfBytes<'_>) -> Result<Self::Document>;
}

/// A parsed document as seen through the engine
pub trait EngineDocument {
    fn page_count(&self) -> Result<usize>;

    /// Displayed page size in points, rotation applied
    fn page_size(&self, index: usize) -> Result<PageSize>;

    /// Paint the page scaled to fill `target`, top-left origin at pixel (0, 0).
    ///
    /// Engines may be off by a pixel at the edges; the rasterizer normalizes.
    fn render_page(&self, index: usize, target: PixelDimensions) -> Result<EnginePixmap>;

    /// Vector rendition of the page with a `target`-sized viewport
    fn render_svg(&self, index: usize, target: PixelDimensions) -> Result<String>;
}

/// Pixels as produced by an engine, before normalization
#[derive(Debug, Clone)]
pub struct EnginePixmap {
    pub width: u32,
    pub height: u32,
    /// Components per pixel: 1 (gray), 2 (gray+alpha), 3 (RGB) or 4 (RGBA)
    pub components: usize,
    /// Row-major samples; rows may be padded past `width * components`
    pub samples: Vec<u8>,
}

impl EnginePixmap {
    /// Bytes per row, derived from the sample count
    pub fn stride(&self) -> usize {
        if self.height == 0 {
            return 0;
        }
        self.samples.len() / self.height as usize
    }
}
