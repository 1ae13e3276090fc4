//! MuPDF-backed engine
//!
//! MuPDF's `fz_context` is not thread-safe. The `mupdf` crate gives every
//! thread its own context, so the only rule here is that a document never
//! leaves the thread that opened it: documents are opened, used and dropped
//! inside a single call.

use mupdf::{Colorspace, Document, Matrix, Page};

use super::{EngineDocument, EnginePixmap, PdfEngine};
use crate::error::{LazyPdfError, Result};
use crate::geometry::{PageSize, PixelDimensions};
use crate::input::PdfBytes;

const PDF_MIME: &str = "application/pdf";

/// Stateless MuPDF engine
#[derive(Debug, Default, Clone, Copy)]
pub struct MupdfEngine;

impl MupdfEngine {
    pub fn new() -> Self {
        Self
    }
}

impl PdfEngine for MupdfEngine {
    type Document = MupdfDocument;

    fn open(&self, bytes: PdfBytes<'_>) -> Result<MupdfDocument> {
        let doc = Document::from_bytes(bytes.as_slice(), PDF_MIME)
            .map_err(|e| LazyPdfError::parse(format!("unable to open document: {}", e)))?;
        Ok(MupdfDocument { doc })
    }
}

/// A document opened by [`MupdfEngine`]
pub struct MupdfDocument {
    doc: Document,
}

impl MupdfDocument {
    fn load_page(&self, index: usize) -> Result<Page> {
        let page_no = i32::try_from(index).map_err(|_| LazyPdfError::PageOutOfRange {
            index: index as i64,
            count: self.page_count().unwrap_or(0),
        })?;
        self.doc
            .load_page(page_no)
            .map_err(|e| LazyPdfError::render(format!("unable to load page {}: {}", index, e)))
    }

    /// Transform mapping the page bounds exactly onto `target`
    fn fit_matrix(page: &Page, index: usize, target: PixelDimensions) -> Result<Matrix> {
        let bounds = page
            .bounds()
            .map_err(|e| LazyPdfError::render(format!("unable to bound page {}: {}", index, e)))?;
        let size = PageSize::new(bounds.x1 - bounds.x0, bounds.y1 - bounds.y0)?;

        let sx = target.width as f32 / size.width;
        let sy = target.height as f32 / size.height;

        let mut matrix = Matrix::new_translate(-bounds.x0, -bounds.y0);
        matrix.concat(Matrix::new_scale(sx, sy));
        Ok(matrix)
    }
}

impl EngineDocument for MupdfDocument {
    fn page_count(&self) -> Result<usize> {
        let count = self
            .doc
            .page_count()
            .map_err(|e| LazyPdfError::parse(format!("unable to count pages: {}", e)))?;
        usize::try_from(count)
            .map_err(|_| LazyPdfError::parse(format!("engine reported {} pages", count)))
    }

    fn page_size(&self, index: usize) -> Result<PageSize> {
        let page = self.load_page(index)?;
        let bounds = page
            .bounds()
            .map_err(|e| LazyPdfError::render(format!("unable to bound page {}: {}", index, e)))?;
        PageSize::new(bounds.x1 - bounds.x0, bounds.y1 - bounds.y0)
    }

    fn render_page(&self, index: usize, target: PixelDimensions) -> Result<EnginePixmap> {
        let page = self.load_page(index)?;
        let matrix = Self::fit_matrix(&page, index, target)?;

        // No alpha: pages are painted over an opaque white background
        let pixmap = page
            .to_pixmap(&matrix, &Colorspace::device_rgb(), false, true)
            .map_err(|e| LazyPdfError::render(format!("unable to render page {}: {}", index, e)))?;

        let samples = pixmap.samples();
        let mut owned = Vec::new();
        owned.try_reserve_exact(samples.len())?;
        owned.extend_from_slice(samples);

        Ok(EnginePixmap {
            width: pixmap.width() as u32,
            height: pixmap.height() as u32,
            components: pixmap.n() as usize,
            samples: owned,
        })
    }

    fn render_svg(&self, index: usize, target: PixelDimensions) -> Result<String> {
        let page = self.load_page(index)?;
        let matrix = Self::fit_matrix(&page, index, target)?;
        page.to_svg(&matrix)
            .map_err(|e| LazyPdfError::render(format!("unable to render page {} as SVG: {}", index, e)))
    }
}
