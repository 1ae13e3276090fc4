//! C ABI
//!
//! Record layouts and symbol names match `include/lazypdf.h`.
//!
//! # Memory Management
//!
//! Every producing function returns a heap record owned by the caller.
//! Release it exactly once with the matching `drop_*` function:
//!
//! | producer      | release                   |
//! |---------------|---------------------------|
//! | `page_count`  | `drop_page_count_output`  |
//! | `save_to_png` | `drop_save_to_png_output` |
//! | `save_to_svg` | `drop_save_to_svg_output` |
//!
//! Releasing a record twice, or reading it after release, is undefined
//! behavior. Releasing a null pointer is a no-op. Never free records or
//! their fields with `free()`.
//!
//! A record carries either a payload or an error, never both. `error` is a
//! NUL-terminated UTF-8 message owned by the record.
//!
//! Page indices are zero-based.

use std::ffi::{c_char, c_float, c_int, CString};
use std::panic::{self, AssertUnwindSafe};
use std::ptr;

use crate::engine::PdfEngine;
use crate::error::{LazyPdfError, Result};
use crate::geometry::{PixelDimensions, RenderRequest};
use crate::input::PdfBytes;
use crate::render::Renderer;
use crate::runtime;

// ============================================================================
// Records
// ============================================================================

#[repr(C)]
pub struct PageCountInput {
    pub payload: *const u8,
    pub payload_length: usize,
}

#[repr(C)]
pub struct PageCountOutput {
    /// Number of pages; 0 when `error` is set
    pub count: c_int,
    /// Null on success
    pub error: *const c_char,
}

/// Input shared by `save_to_png`, `save_to_svg` and `get_pdf_size`
#[repr(C)]
pub struct SaveToPngInput {
    /// Zero-based page index
    pub page: c_int,
    /// Output width in pixels; ignored when not positive
    pub width: c_int,
    /// Scale factor (1.0 = 72 DPI); ignored when not positive
    pub scale: c_float,
    pub payload: *const u8,
    pub payload_length: usize,
}

#[repr(C)]
pub struct SaveToPngOutput {
    /// PNG bytes, null when `error` is set
    pub data: *mut c_char,
    pub len: usize,
    /// Null on success
    pub error: *const c_char,
}

#[repr(C)]
pub struct SaveToSvgOutput {
    /// NUL-terminated SVG document, null when `error` is set
    pub data: *mut c_char,
    /// Length of `data` in bytes, not counting the terminator
    pub len: usize,
    /// Null on success
    pub error: *const c_char,
}

// ============================================================================
// Lifecycle
// ============================================================================

/// Set up the library. Must be called before any other function; calling
/// it again is harmless.
#[no_mangle]
pub extern "C" fn init() {
    let _ = guard("init", || Ok(runtime::init()));
}

/// Tear down process-wide state. Later calls fail until `init()` runs again.
#[no_mangle]
pub extern "C" fn teardown() {
    let _ = guard("teardown", || Ok(runtime::shutdown()));
}

// ============================================================================
// Page count
// ============================================================================

/// Count the pages of a document.
///
/// # Safety
/// `input` must be null or point to a valid `PageCountInput` whose payload
/// stays readable for the duration of the call.
#[no_mangle]
pub unsafe extern "C" fn page_count(input: *const PageCountInput) -> *mut PageCountOutput {
    let result = guard("page_count", || {
        let input = unsafe { input.as_ref() }
            .ok_or_else(|| LazyPdfError::invalid_parameter("page_count input is null"))?;
        let bytes = unsafe { PdfBytes::from_raw_parts(input.payload, input.payload_length) }?;
        let count = runtime::current()?.renderer().page_count(bytes)?;
        c_int::try_from(count)
            .map_err(|_| LazyPdfError::parse(format!("document has {} pages", count)))
    });

    let output = match result {
        Ok(count) => PageCountOutput {
            count,
            error: ptr::null(),
        },
        Err(e) => PageCountOutput {
            count: 0,
            error: error_string(&e),
        },
    };
    Box::into_raw(Box::new(output))
}

/// Release a record returned by `page_count`.
///
/// # Safety
/// `output` must be null or a record from `page_count` not yet released.
#[no_mangle]
pub unsafe extern "C" fn drop_page_count_output(output: *mut PageCountOutput) {
    if output.is_null() {
        return;
    }
    let output = unsafe { Box::from_raw(output) };
    unsafe { free_error(output.error) };
}

// ============================================================================
// Size query
// ============================================================================

/// Compute the pixel size `save_to_png` would produce at `dpi`.
///
/// A positive `dpi` drives the size; otherwise `input.width` then
/// `input.scale` do. Returns 0 on success, or the negated error kind code,
/// in which case both out-parameters are set to 0.
///
/// # Safety
/// `input` must be null or point to a valid `SaveToPngInput` whose payload
/// stays readable for the duration of the call. `width` and `height` must be
/// null or writable.
#[no_mangle]
pub unsafe extern "C" fn get_pdf_size(
    input: *const SaveToPngInput,
    dpi: c_int,
    width: *mut c_int,
    height: *mut c_int,
) -> c_int {
    let result = guard("get_pdf_size", || {
        if width.is_null() || height.is_null() {
            return Err(LazyPdfError::invalid_parameter(
                "get_pdf_size output pointers are null",
            ));
        }
        let (runtime, bytes, mut request) = unsafe { prepare(input) }?;
        if dpi > 0 {
            request = request.with_dpi(dpi as f32);
        }
        let dims = runtime.renderer().pixel_size(bytes, &request)?;
        to_c_dimensions(dims)
    });

    let (status, (w, h)) = match result {
        Ok(dims) => (0, dims),
        Err(e) => (-e.kind().code(), (0, 0)),
    };
    if !width.is_null() {
        unsafe { *width = w };
    }
    if !height.is_null() {
        unsafe { *height = h };
    }
    status
}

// ============================================================================
// Rendering
// ============================================================================

/// Render a page to PNG.
///
/// `input.width` takes precedence over `input.scale`; at least one of them
/// must be positive.
///
/// # Safety
/// `input` must be null or point to a valid `SaveToPngInput` whose payload
/// stays readable for the duration of the call.
#[no_mangle]
pub unsafe extern "C" fn save_to_png(input: *const SaveToPngInput) -> *mut SaveToPngOutput {
    let result = guard("save_to_png", || {
        let (runtime, bytes, request) = unsafe { prepare(input) }?;
        runtime.renderer().save_to_png(bytes, &request)
    });

    let output = match result {
        Ok(png) => {
            let data = png.into_bytes().into_boxed_slice();
            let len = data.len();
            SaveToPngOutput {
                data: Box::into_raw(data) as *mut u8 as *mut c_char,
                len,
                error: ptr::null(),
            }
        }
        Err(e) => SaveToPngOutput {
            data: ptr::null_mut(),
            len: 0,
            error: error_string(&e),
        },
    };
    Box::into_raw(Box::new(output))
}

/// Release a record returned by `save_to_png`.
///
/// # Safety
/// `output` must be null or a record from `save_to_png` not yet released.
#[no_mangle]
pub unsafe extern "C" fn drop_save_to_png_output(output: *mut SaveToPngOutput) {
    if output.is_null() {
        return;
    }
    let output = unsafe { Box::from_raw(output) };
    if !output.data.is_null() {
        let slice = ptr::slice_from_raw_parts_mut(output.data as *mut u8, output.len);
        drop(unsafe { Box::from_raw(slice) });
    }
    unsafe { free_error(output.error) };
}

/// Export a page as SVG, sized like `save_to_png` would size it.
///
/// # Safety
/// `input` must be null or point to a valid `SaveToPngInput` whose payload
/// stays readable for the duration of the call.
#[no_mangle]
pub unsafe extern "C" fn save_to_svg(input: *const SaveToPngInput) -> *mut SaveToSvgOutput {
    let result = guard("save_to_svg", || {
        let (runtime, bytes, request) = unsafe { prepare(input) }?;
        runtime.renderer().save_to_svg(bytes, &request)
    });

    let output = match result {
        Ok(svg) => {
            let svg = to_c_string(svg);
            let len = svg.as_bytes().len();
            SaveToSvgOutput {
                data: svg.into_raw(),
                len,
                error: ptr::null(),
            }
        }
        Err(e) => SaveToSvgOutput {
            data: ptr::null_mut(),
            len: 0,
            error: error_string(&e),
        },
    };
    Box::into_raw(Box::new(output))
}

/// Release a record returned by `save_to_svg`.
///
/// # Safety
/// `output` must be null or a record from `save_to_svg` not yet released.
#[no_mangle]
pub unsafe extern "C" fn drop_save_to_svg_output(output: *mut SaveToSvgOutput) {
    if output.is_null() {
        return;
    }
    let output = unsafe { Box::from_raw(output) };
    if !output.data.is_null() {
        drop(unsafe { CString::from_raw(output.data) });
    }
    unsafe { free_error(output.error) };
}

// ============================================================================
// Helpers
// ============================================================================

/// Run a boundary operation, turning panics into errors and logging failures
fn guard<T, F>(operation: &'static str, f: F) -> Result<T>
where
    F: FnOnce() -> Result<T>,
{
    let result = panic::catch_unwind(AssertUnwindSafe(f)).unwrap_or_else(|payload| {
        let msg = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        Err(LazyPdfError::Internal(format!("panic in {}: {}", operation, msg)))
    });

    if let Err(e) = &result {
        tracing::error!(operation, kind = ?e.kind(), "{}", e);
    }
    result
}

/// Resolve the runtime, the payload view and the request of a render input
unsafe fn prepare<'a>(
    input: *const SaveToPngInput,
) -> Result<(runtime::Runtime, PdfBytes<'a>, RenderRequest)> {
    let input = unsafe { input.as_ref() }
        .ok_or_else(|| LazyPdfError::invalid_parameter("render input is null"))?;
    let runtime = runtime::current()?;
    let bytes = unsafe { PdfBytes::from_raw_parts(input.payload, input.payload_length) }?;

    let page = page_index(runtime.renderer(), bytes, input.page)?;
    let mut request = RenderRequest::for_page(page).with_scale(input.scale);
    if let Ok(width) = u32::try_from(input.width) {
        request = request.with_width(width);
    }
    Ok((runtime, bytes, request))
}

fn page_index<E: PdfEngine>(renderer: &Renderer<E>, bytes: PdfBytes<'_>, page: c_int) -> Result<usize> {
    match usize::try_from(page) {
        Ok(index) => Ok(index),
        Err(_) => Err(LazyPdfError::PageOutOfRange {
            index: page as i64,
            count: renderer.page_count(bytes)?,
        }),
    }
}

fn to_c_dimensions(dims: PixelDimensions) -> Result<(c_int, c_int)> {
    match (c_int::try_from(dims.width), c_int::try_from(dims.height)) {
        (Ok(w), Ok(h)) => Ok((w, h)),
        _ => Err(LazyPdfError::invalid_parameter(format!(
            "resolved size {}x{} does not fit a C int",
            dims.width, dims.height
        ))),
    }
}

fn to_c_string(s: String) -> CString {
    CString::new(s).unwrap_or_else(|e| {
        let mut bytes = e.into_vec();
        bytes.retain(|&b| b != 0);
        // No NULs remain
        CString::new(bytes).unwrap_or_default()
    })
}

fn error_string(e: &LazyPdfError) -> *const c_char {
    to_c_string(e.to_string()).into_raw()
}

unsafe fn free_error(error: *const c_char) {
    if !error.is_null() {
        drop(unsafe { CString::from_raw(error as *mut c_char) });
    }
}
