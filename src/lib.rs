//! LazyPDF
//!
//! Page counting, page sizing and PNG/SVG rendering of in-memory PDF
//! documents, exposed both as a Rust API and as a C ABI (see `ffi` and
//! `include/lazypdf.h`).
//!
//! Every operation is synchronous and self-contained: it parses the given
//! bytes, works on one page and releases everything before returning.
//! Page indices are zero-based.
//!
//! # Modules
//!
//! - `input`: borrowed view over caller bytes
//! - `engine`: PDF engine capability surface, backed by MuPDF
//! - `document`: per-call document handle and page addressing
//! - `geometry`: page size in points to pixel dimensions
//! - `raster`: exact-size RGB rasterization
//! - `encode`: lossless PNG encoding
//! - `render`: the parse/resolve/rasterize/encode pipeline
//! - `runtime`: process-wide `init()`/shutdown lifecycle
//! - `config`: environment-driven settings
//! - `ffi`: C records, operations and release functions
//!
//! ```no_run
//! use lazypdf::{MupdfEngine, PdfBytes, RenderRequest, Renderer};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let data = std::fs::read("document.pdf")?;
//! let renderer = Renderer::new(MupdfEngine::new());
//! let bytes = PdfBytes::new(&data);
//!
//! let pages = renderer.page_count(bytes)?;
//! let png = renderer.save_to_png(bytes, &RenderRequest::for_page(0).with_width(300))?;
//! println!("{} pages, first page is {} PNG bytes", pages, png.len());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod document;
pub mod encode;
pub mod engine;
pub mod error;
pub mod ffi;
pub mod geometry;
pub mod input;
pub mod raster;
pub mod render;
pub mod runtime;

#[cfg(test)]
mod testing;

pub use config::Config;
pub use document::{Document, PageRef};
pub use encode::{EncodedImage, PngCompression};
pub use engine::{EngineDocument, MupdfEngine, PdfEngine};
pub use error::{ErrorKind, LazyPdfError, Result};
pub use geometry::{PageSize, PixelDimensions, RenderLimits, RenderRequest};
pub use input::PdfBytes;
pub use raster::RasterBuffer;
pub use render::Renderer;
