//! Error types
//!
//! Every failure a boundary operation can produce, with a stable numeric
//! kind for callers that only see integers.

use thiserror::Error;

/// Error kinds surfaced across the C boundary.
///
/// The discriminants are part of the ABI: `get_pdf_size` returns the negated
/// code of the failure kind.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Parse = 1,
    Index = 2,
    InvalidParameter = 3,
    Render = 4,
    Encoding = 5,
    Allocation = 6,
    NotInitialized = 7,
    Internal = 8,
}

impl ErrorKind {
    /// Code reported by status-returning boundary functions
    pub fn code(self) -> i32 {
        self as i32
    }
}

/// Unified error type for all LazyPDF operations
#[derive(Debug, Error)]
pub enum LazyPdfError {
    /// Malformed, empty or truncated document
    #[error("parse error: {0}")]
    Parse(String),

    /// Page index outside `[0, count)`
    #[error("page {index} out of range (document has {count} pages)")]
    PageOutOfRange { index: i64, count: usize },

    /// No positive pixel dimension could be resolved, or limits exceeded
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The page could not be painted at all
    #[error("render error: {0}")]
    Render(String),

    /// Image serialization failed
    #[error("encoding error: {0}")]
    Encoding(String),

    /// Resource exhaustion while allocating output buffers
    #[error("allocation error: {0}")]
    Allocation(String),

    /// An operation was called before `init()` or after `shutdown()`
    #[error("lazypdf has not been initialized, call init() first")]
    NotInitialized,

    /// A panic was caught at the boundary
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type alias for LazyPDF operations
pub type Result<T> = std::result::Result<T, LazyPdfError>;

impl LazyPdfError {
    pub fn parse<S: Into<String>>(msg: S) -> Self {
        LazyPdfError::Parse(msg.into())
    }

    pub fn invalid_parameter<S: Into<String>>(msg: S) -> Self {
        LazyPdfError::InvalidParameter(msg.into())
    }

    pub fn render<S: Into<String>>(msg: S) -> Self {
        LazyPdfError::Render(msg.into())
    }

    pub fn encoding<S: Into<String>>(msg: S) -> Self {
        LazyPdfError::Encoding(msg.into())
    }

    pub fn allocation<S: Into<String>>(msg: S) -> Self {
        LazyPdfError::Allocation(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            LazyPdfError::Parse(_) => ErrorKind::Parse,
            LazyPdfError::PageOutOfRange { .. } => ErrorKind::Index,
            LazyPdfError::InvalidParameter(_) => ErrorKind::InvalidParameter,
            LazyPdfError::Render(_) => ErrorKind::Render,
            LazyPdfError::Encoding(_) => ErrorKind::Encoding,
            LazyPdfError::Allocation(_) => ErrorKind::Allocation,
            LazyPdfError::NotInitialized => ErrorKind::NotInitialized,
            LazyPdfError::Internal(_) => ErrorKind::Internal,
        }
    }
}

impl From<std::collections::TryReserveError> for LazyPdfError {
    fn from(err: std::collections::TryReserveError) -> Self {
        LazyPdfError::Allocation(err.to_string())
    }
}

impl From<image::ImageError> for LazyPdfError {
    fn from(err: image::ImageError) -> Self {
        match err {
            image::ImageError::Limits(e) => LazyPdfError::Allocation(e.to_string()),
            other => LazyPdfError::Encoding(other.to_string()),
        }
    }
}
