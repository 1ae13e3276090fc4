//! Render pipeline
//!
//! Composes parse → resolve → rasterize → encode for a single call. A
//! [`Renderer`] holds only immutable settings; every operation opens its
//! own [`Document`] and drops it before returning, so one renderer can be
//! shared freely between threads.

use tracing::{debug, info_span};

use crate::document::{Document, PageRef};
use crate::encode::{encode_png, EncodedImage, PngCompression};
use crate::engine::{EngineDocument, PdfEngine};
use crate::error::Result;
use crate::geometry::{resolve_size, PixelDimensions, RenderLimits, RenderRequest};
use crate::input::PdfBytes;
use crate::raster::{rasterize, RasterBuffer};

/// Stateless PDF renderer over an engine
#[derive(Debug, Clone)]
pub struct Renderer<E> {
    engine: E,
    limits: RenderLimits,
    compression: PngCompression,
}

impl<E: PdfEngine> Renderer<E> {
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            limits: RenderLimits::default(),
            compression: PngCompression::default(),
        }
    }

    pub fn with_limits(mut self, limits: RenderLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_compression(mut self, compression: PngCompression) -> Self {
        self.compression = compression;
        self
    }

    pub fn limits(&self) -> RenderLimits {
        self.limits
    }

    pub fn compression(&self) -> PngCompression {
        self.compression
    }

    /// Number of addressable pages
    pub fn page_count(&self, bytes: PdfBytes<'_>) -> Result<usize> {
        let _span = info_span!("lazypdf.page_count", bytes = bytes.len()).entered();
        let doc = Document::open(&self.engine, bytes)?;
        Ok(doc.page_count())
    }

    /// Pixel dimensions a render of `request` would produce, without painting
    pub fn pixel_size(&self, bytes: PdfBytes<'_>, request: &RenderRequest) -> Result<PixelDimensions> {
        let _span = info_span!("lazypdf.get_pdf_size", page = request.page).entered();
        let doc = Document::open(&self.engine, bytes)?;
        let page = doc.page(request.page)?;
        self.resolve(&page, request)
    }

    /// Render a page to an RGB raster
    pub fn render(&self, bytes: PdfBytes<'_>, request: &RenderRequest) -> Result<RasterBuffer> {
        let doc = Document::open(&self.engine, bytes)?;
        let page = doc.page(request.page)?;
        let dims = self.resolve(&page, request)?;
        self.limits.check(dims)?;
        rasterize(&page, dims)
    }

    /// Render a page and encode it as PNG
    pub fn save_to_png(&self, bytes: PdfBytes<'_>, request: &RenderRequest) -> Result<EncodedImage> {
        let _span = info_span!("lazypdf.save_to_png", page = request.page).entered();
        let raster = self.render(bytes, request)?;
        let png = encode_png(&raster, self.compression)?;
        debug!(bytes = png.len(), "Encoded PNG");
        Ok(png)
    }

    /// Export a page as SVG with a viewport of the resolved pixel size
    pub fn save_to_svg(&self, bytes: PdfBytes<'_>, request: &RenderRequest) -> Result<String> {
        let _span = info_span!("lazypdf.save_to_svg", page = request.page).entered();
        let doc = Document::open(&self.engine, bytes)?;
        let page = doc.page(request.page)?;
        let dims = self.resolve(&page, request)?;
        self.limits.check(dims)?;
        page.engine_document().render_svg(page.index(), dims)
    }

    fn resolve<D: EngineDocument>(&self, page: &PageRef<'_, D>, request: &RenderRequest) -> Result<PixelDimensions> {
        let size = page.size();
        let dims = resolve_size(size, request)?;
        debug!(
            page = page.index(),
            points_width = size.width,
            points_height = size.height,
            driver = ?request.driver(),
            width = dims.width,
            height = dims.height,
            "Resolved page geometry"
        );
        Ok(dims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::decode_png;
    use crate::engine::fake::FakeEngine;
    use crate::engine::MupdfEngine;
    use crate::error::{ErrorKind, LazyPdfError};
    use crate::testing::PdfFixture;
    use std::sync::Arc;
    use std::thread;

    const HEADER: &[u8] = b"%PDF-1.7\n";

    fn letter_pages(n: usize) -> FakeEngine {
        (0..n).fold(FakeEngine::new(), |engine, _| engine.page(612.0, 792.0))
    }

    #[test]
    fn test_three_page_scenario() {
        let renderer = Renderer::new(letter_pages(3));
        let bytes = PdfBytes::new(HEADER);

        assert_eq!(renderer.page_count(bytes).unwrap(), 3);

        let size = renderer
            .pixel_size(bytes, &RenderRequest::for_page(0).with_dpi(72.0))
            .unwrap();
        assert_eq!(size, PixelDimensions::new(612, 792));

        let png = renderer
            .save_to_png(bytes, &RenderRequest::for_page(0).with_width(300).with_scale(0.0))
            .unwrap();
        let decoded = decode_png(png.as_bytes()).unwrap();
        assert_eq!(decoded.dimensions(), PixelDimensions::new(300, 388));

        let err = renderer
            .save_to_png(bytes, &RenderRequest::for_page(5).with_width(300))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Index);
    }

    #[test]
    fn test_no_dimension_is_invalid() {
        let renderer = Renderer::new(letter_pages(1));
        let request = RenderRequest::for_page(0).with_width(0).with_scale(0.0);
        let err = renderer.save_to_png(PdfBytes::new(HEADER), &request).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);

        let err = renderer
            .pixel_size(PdfBytes::new(HEADER), &RenderRequest::for_page(0))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);
    }

    #[test]
    fn test_size_query_matches_render() {
        let renderer = Renderer::new(FakeEngine::new().page(595.0, 842.0).page(842.0, 595.0));
        let bytes = PdfBytes::new(HEADER);
        let requests = [
            RenderRequest::for_page(0).with_dpi(150.0),
            RenderRequest::for_page(0).with_width(1024).with_scale(1.1),
            RenderRequest::for_page(1).with_scale(1.1),
            RenderRequest::for_page(1).with_scale(0.01),
        ];

        for request in &requests {
            let size = renderer.pixel_size(bytes, request).unwrap();
            let png = renderer.save_to_png(bytes, request).unwrap();
            assert_eq!(png.dimensions(), size, "{:?}", request);
            assert_eq!(decode_png(png.as_bytes()).unwrap().dimensions(), size);
        }
    }

    #[test]
    fn test_limits_checked_before_rendering() {
        let renderer = Renderer::new(letter_pages(1)).with_limits(RenderLimits {
            max_dimension: 1000,
            max_pixels: 10_000_000,
        });
        let err = renderer
            .render(PdfBytes::new(HEADER), &RenderRequest::for_page(0).with_dpi(300.0))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);

        // Size queries are not limited, nothing is allocated for them
        let size = renderer
            .pixel_size(PdfBytes::new(HEADER), &RenderRequest::for_page(0).with_dpi(300.0))
            .unwrap();
        assert_eq!(size, PixelDimensions::new(2550, 3300));
    }

    #[test]
    fn test_unrenderable_page_does_not_poison_others() {
        let renderer = Renderer::new(letter_pages(2).unrenderable(0));
        let bytes = PdfBytes::new(HEADER);

        let err = renderer
            .save_to_png(bytes, &RenderRequest::for_page(0).with_scale(0.5))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Render);
        assert!(renderer
            .save_to_png(bytes, &RenderRequest::for_page(1).with_scale(0.5))
            .is_ok());
    }

    #[test]
    fn test_empty_buffer() {
        let renderer = Renderer::new(letter_pages(1));
        match renderer.page_count(PdfBytes::new(&[])) {
            Err(LazyPdfError::Parse(msg)) => assert!(msg.contains("empty buffer")),
            other => panic!("Expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_svg_viewport() {
        let renderer = Renderer::new(letter_pages(1));
        let svg = renderer
            .save_to_svg(PdfBytes::new(HEADER), &RenderRequest::for_page(0).with_width(306))
            .unwrap();
        assert!(svg.contains("width=\"306\""));
        assert!(svg.contains("height=\"396\""));
    }

    #[test]
    fn test_mupdf_three_page_scenario() {
        let data = PdfFixture::new().pages(3, 612.0, 792.0).build();
        let renderer = Renderer::new(MupdfEngine::new());
        let bytes = PdfBytes::from(&data);

        assert_eq!(renderer.page_count(bytes).unwrap(), 3);
        assert_eq!(
            renderer
                .pixel_size(bytes, &RenderRequest::for_page(0).with_dpi(72.0))
                .unwrap(),
            PixelDimensions::new(612, 792)
        );

        let request = RenderRequest::for_page(0).with_width(300);
        let size = renderer.pixel_size(bytes, &request).unwrap();
        let png = renderer.save_to_png(bytes, &request).unwrap();
        let decoded = decode_png(png.as_bytes()).unwrap();
        assert_eq!(size, PixelDimensions::new(300, 388));
        assert_eq!(decoded.dimensions(), size);

        assert_eq!(
            renderer
                .save_to_png(bytes, &RenderRequest::for_page(5).with_width(300))
                .unwrap_err()
                .kind(),
            ErrorKind::Index
        );
    }

    #[test]
    fn test_mupdf_rotated_page_size() {
        let data = PdfFixture::new().rotated_page(612.0, 792.0, 90).build();
        let renderer = Renderer::new(MupdfEngine::new());
        let size = renderer
            .pixel_size(PdfBytes::from(&data), &RenderRequest::for_page(0).with_dpi(72.0))
            .unwrap();
        assert_eq!(size, PixelDimensions::new(792, 612));
    }

    #[test]
    fn test_mupdf_svg_export() {
        let data = PdfFixture::new().page(612.0, 792.0).build();
        let renderer = Renderer::new(MupdfEngine::new());
        let svg = renderer
            .save_to_svg(PdfBytes::from(&data), &RenderRequest::for_page(0).with_scale(1.0))
            .unwrap();
        assert!(svg.contains("<svg"));
    }

    #[test]
    fn test_concurrent_renders() {
        let renderer = Arc::new(Renderer::new(MupdfEngine::new()));
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let renderer = Arc::clone(&renderer);
                thread::spawn(move || {
                    let pages = 1 + i % 3;
                    let data = PdfFixture::new().pages(pages, 200.0 + i as f32, 300.0).build();
                    let bytes = PdfBytes::from(&data);

                    assert_eq!(renderer.page_count(bytes).unwrap(), pages);
                    let request = RenderRequest::for_page(pages - 1).with_scale(0.5);
                    let size = renderer.pixel_size(bytes, &request).unwrap();
                    let png = renderer.save_to_png(bytes, &request).unwrap();
                    assert_eq!(png.dimensions(), size);
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
    }
}
