//! Input buffer view
//!
//! A non-owning view over caller-supplied PDF bytes. The view never copies
//! and never outlives the call it was created for.

use crate::error::{LazyPdfError, Result};

/// Header every PDF starts with. Producers may prepend junk, so the header
/// is searched for within the first [`HEADER_SEARCH_WINDOW`] bytes.
const PDF_MAGIC: &[u8] = b"%PDF-";

/// Same window MuPDF tolerates before giving up on the header
const HEADER_SEARCH_WINDOW: usize = 1024;

/// Borrowed PDF bytes for the duration of one call
#[derive(Debug, Clone, Copy)]
pub struct PdfBytes<'a> {
    bytes: &'a [u8],
}

impl<'a> PdfBytes<'a> {
    /// Wrap a byte slice
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    /// Build a view from a raw pointer/length pair handed over a C boundary.
    ///
    /// A null pointer with a zero length yields an empty view; a null pointer
    /// with a non-zero length is rejected.
    ///
    /// # Safety
    /// When `ptr` is non-null it must point to `len` readable bytes that stay
    /// valid and unmodified for `'a`.
    pub unsafe fn from_raw_parts(ptr: *const u8, len: usize) -> Result<Self> {
        if ptr.is_null() {
            if len == 0 {
                return Ok(Self { bytes: &[] });
            }
            return Err(LazyPdfError::invalid_parameter(format!(
                "payload pointer is null but payload_length is {}",
                len
            )));
        }
        // SAFETY: caller guarantees ptr points to len valid bytes for 'a.
        let bytes = unsafe { std::slice::from_raw_parts(ptr, len) };
        Ok(Self { bytes })
    }

    pub fn as_slice(&self) -> &'a [u8] {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Check that the buffer is non-empty and carries a PDF header.
    ///
    /// This is a cheap sniff, not a parse: cross-reference damage is left to
    /// the engine, which may repair it.
    pub fn check_header(&self) -> Result<()> {
        if self.bytes.is_empty() {
            return Err(LazyPdfError::parse(
                "unable to open document: empty buffer",
            ));
        }

        let window = &self.bytes[..self.bytes.len().min(HEADER_SEARCH_WINDOW)];
        if window.windows(PDF_MAGIC.len()).any(|w| w == PDF_MAGIC) {
            Ok(())
        } else {
            Err(LazyPdfError::parse(
                "unable to open document: missing %PDF header",
            ))
        }
    }
}

impl<'a> From<&'a [u8]> for PdfBytes<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        Self::new(bytes)
    }
}

impl<'a> From<&'a Vec<u8>> for PdfBytes<'a> {
    fn from(bytes: &'a Vec<u8>) -> Self {
        Self::new(bytes.as_slice())
    }
}
