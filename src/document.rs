//! Document handle
//!
//! Opens a byte buffer into a navigable page collection. The handle owns
//! everything the engine derived from the buffer and releases it when it
//! goes out of scope, on success and error paths alike.

use crate::engine::{EngineDocument, PdfEngine};
use crate::error::{LazyPdfError, Result};
use crate::geometry::PageSize;
use crate::input::PdfBytes;

/// An open document, scoped to a single call
pub struct Document<D> {
    inner: D,
    page_count: usize,
}

impl<D: EngineDocument> Document<D> {
    /// Open a document through `engine`.
    ///
    /// Only the page count is resolved eagerly; pages are loaded on demand.
    pub fn open<E>(engine: &E, bytes: PdfBytes<'_>) -> Result<Self>
    where
        E: PdfEngine<Document = D>,
    {
        bytes.check_header()?;
        let inner = engine.open(bytes)?;
        let page_count = inner.page_count()?;

        tracing::trace!(bytes = bytes.len(), page_count, "Opened document");

        Ok(Self { inner, page_count })
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// Address a page by its zero-based index
    pub fn page(&self, index: usize) -> Result<PageRef<'_, D>> {
        if index >= self.page_count {
            return Err(LazyPdfError::PageOutOfRange {
                index: index as i64,
                count: self.page_count,
            });
        }
        let size = self.inner.page_size(index)?;
        Ok(PageRef {
            doc: &self.inner,
            index,
            size,
        })
    }
}

/// A validated page of an open [`Document`]
pub struct PageRef<'a, D> {
    doc: &'a D,
    index: usize,
    size: PageSize,
}

impl<'a, D: EngineDocument> PageRef<'a, D> {
    pub fn index(&self) -> usize {
        self.index
    }

    /// Displayed size in points
    pub fn size(&self) -> PageSize {
        self.size
    }

    pub(crate) fn engine_document(&self) -> &'a D {
        self.doc
    }
}
