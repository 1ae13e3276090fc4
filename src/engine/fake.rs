//! Deterministic in-memory engine for unit tests

use super::{EngineDocument, EnginePixmap, PdfEngine};
use crate::error::{LazyPdfError, Result};
use crate::geometry::{PageSize, PixelDimensions};
use crate::input::PdfBytes;

/// Marker that makes [`FakeEngine::open`] fail like a damaged xref table
pub const TRUNCATED_MARKER: &[u8] = b"%%TRUNCATED";

#[derive(Debug, Clone, Default)]
pub struct FakeEngine {
    pages: Vec<PageSize>,
    unrenderable: Vec<usize>,
    /// Added to the target size of every render, to mimic engine rounding
    skew: (i32, i32),
    components: usize,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self {
            components: 3,
            ..Default::default()
        }
    }

    pub fn page(mut self, width: f32, height: f32) -> Self {
        self.pages.push(PageSize { width, height });
        self
    }

    pub fn unrenderable(mut self, index: usize) -> Self {
        self.unrenderable.push(index);
        self
    }

    pub fn skew(mut self, dx: i32, dy: i32) -> Self {
        self.skew = (dx, dy);
        self
    }

    pub fn components(mut self, n: usize) -> Self {
        self.components = n;
        self
    }
}

impl PdfEngine for FakeEngine {
    type Document = FakeDocument;

    fn open(&self, bytes: PdfBytes<'_>) -> Result<FakeDocument> {
        let data = bytes.as_slice();
        if data
            .windows(TRUNCATED_MARKER.len())
            .any(|w| w == TRUNCATED_MARKER)
        {
            return Err(LazyPdfError::parse(
                "unable to open document: truncated cross-reference table",
            ));
        }
        Ok(FakeDocument {
            engine: self.clone(),
        })
    }
}

pub struct FakeDocument {
    engine: FakeEngine,
}

impl FakeDocument {
    fn size(&self, index: usize) -> Result<PageSize> {
        self.engine
            .pages
            .get(index)
            .copied()
            .ok_or_else(|| LazyPdfError::render(format!("no page {}", index)))
    }
}

/// Sample value the fake paints at (x, y) for channel c
pub fn pattern(x: u32, y: u32, c: usize) -> u8 {
    ((x as usize * 7 + y as usize * 13 + c * 31) % 251) as u8
}

impl EngineDocument for FakeDocument {
    fn page_count(&self) -> Result<usize> {
        Ok(self.engine.pages.len())
    }

    fn page_size(&self, index: usize) -> Result<PageSize> {
        let size = self.size(index)?;
        PageSize::new(size.width, size.height)
    }

    fn render_page(&self, index: usize, target: PixelDimensions) -> Result<EnginePixmap> {
        self.size(index)?;
        if self.engine.unrenderable.contains(&index) {
            return Err(LazyPdfError::render(format!(
                "unable to render page {}: broken content stream",
                index
            )));
        }

        let width = (target.width as i64 + self.engine.skew.0 as i64).max(1) as u32;
        let height = (target.height as i64 + self.engine.skew.1 as i64).max(1) as u32;
        let n = self.engine.components;

        let mut samples = Vec::with_capacity(width as usize * height as usize * n);
        for y in 0..height {
            for x in 0..width {
                for c in 0..n {
                    samples.push(pattern(x, y, c));
                }
            }
        }

        Ok(EnginePixmap {
            width,
            height,
            components: n,
            samples,
        })
    }

    fn render_svg(&self, index: usize, target: PixelDimensions) -> Result<String> {
        self.size(index)?;
        if self.engine.unrenderable.contains(&index) {
            return Err(LazyPdfError::render(format!(
                "unable to render page {} as SVG",
                index
            )));
        }
        Ok(format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{}\" height=\"{}\"></svg>\n",
            target.width, target.height
        ))
    }
}
