//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type with C-compatible representations:
//! `*mut c_char` for strings, pointer + length for arrays and byte buffers,
//! and enums with explicit discriminants. Conversions live here so `lib.rs`
//! stays focused on the `extern "C"` surface.

use std::ffi::CString;
use std::os::raw::c_char;

use http_client_core::{ErrorKind, HttpError, Response};

/// Opaque handle to an `HttpClient`. C callers receive a pointer to this
/// and pass it back into every FFI function.
pub struct FfiHttpClient {
    pub(crate) inner: http_client_core::HttpClient,
}

// ---------------------------------------------------------------------------
// Request input (caller-provided, read but never freed by us)
// ---------------------------------------------------------------------------

/// A query parameter or header supplied by the C caller.
#[repr(C)]
pub struct FfiKeyValue {
    pub key: *const c_char,
    pub value: *const c_char,
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Error codes returned in `FfiGetResult`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    SessionNotInitialized = 1,
    MalformedUrl = 2,
    UrlTooLong = 3,
    ConnectFailed = 4,
    RequestSendFailed = 5,
    StatusUnavailable = 6,
    HeadersUnavailable = 7,
    ReadFailed = 8,
    Panic = 9,
    NullArg = 10,
    InvalidUtf8 = 11,
}

impl From<ErrorKind> for FfiErrorCode {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::SessionNotInitialized => FfiErrorCode::SessionNotInitialized,
            ErrorKind::MalformedUrl => FfiErrorCode::MalformedUrl,
            ErrorKind::UrlTooLong => FfiErrorCode::UrlTooLong,
            ErrorKind::ConnectFailed => FfiErrorCode::ConnectFailed,
            ErrorKind::RequestSendFailed => FfiErrorCode::RequestSendFailed,
            ErrorKind::StatusUnavailable => FfiErrorCode::StatusUnavailable,
            ErrorKind::HeadersUnavailable => FfiErrorCode::HeadersUnavailable,
            ErrorKind::ReadFailed => FfiErrorCode::ReadFailed,
        }
    }
}

/// A single response header as a key-value pair of C strings.
#[repr(C)]
pub struct FfiHeader {
    pub key: *mut c_char,
    pub value: *mut c_char,
}

/// A response exposed to C. `content` is not NUL-terminated; use
/// `content_len`.
#[repr(C)]
pub struct FfiResponse {
    pub status_code: u16,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
    pub content: *mut u8,
    pub content_len: usize,
}

/// Result envelope for `http_client_get`.
///
/// On success `error_code` is `Ok`, `error_message` is null, and `response`
/// points to the response. On failure `error_code` describes the category,
/// `error_message` is a human-readable C string, `transport_code` carries the
/// transport error number (0 when none was reported), and `response` is null.
#[repr(C)]
pub struct FfiGetResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub transport_code: i32,
    pub response: *mut FfiResponse,
}

impl FfiGetResult {
    pub(crate) fn ok(response: Response) -> *mut Self {
        let headers_len = response.headers.len() as u32;
        let headers = if response.headers.is_empty() {
            std::ptr::null_mut()
        } else {
            let ffi_headers: Box<[FfiHeader]> = response
                .headers
                .into_iter()
                .map(|(k, v)| FfiHeader {
                    key: CString::new(k).unwrap_or_default().into_raw(),
                    value: CString::new(v).unwrap_or_default().into_raw(),
                })
                .collect();
            Box::into_raw(ffi_headers) as *mut FfiHeader
        };

        let content_len = response.content.len();
        let content = if content_len == 0 {
            std::ptr::null_mut()
        } else {
            Box::into_raw(response.content.into_boxed_slice()) as *mut u8
        };

        let ffi_response = Box::new(FfiResponse {
            status_code: response.status_code,
            headers,
            headers_len,
            content,
            content_len,
        });
        Box::into_raw(Box::new(FfiGetResult {
            error_code: FfiErrorCode::Ok,
            error_message: std::ptr::null_mut(),
            transport_code: 0,
            response: Box::into_raw(ffi_response),
        }))
    }

    pub(crate) fn from_error(err: HttpError) -> *mut Self {
        Self::failure(
            err.kind().into(),
            &err.to_string(),
            err.code().unwrap_or(0),
        )
    }

    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::failure(FfiErrorCode::NullArg, &format!("null argument: {name}"), 0)
    }

    pub(crate) fn invalid_utf8(name: &str) -> *mut Self {
        Self::failure(
            FfiErrorCode::InvalidUtf8,
            &format!("argument is not valid UTF-8: {name}"),
            0,
        )
    }

    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::failure(FfiErrorCode::Panic, msg, 0)
    }

    fn failure(error_code: FfiErrorCode, msg: &str, transport_code: i32) -> *mut Self {
        Box::into_raw(Box::new(FfiGetResult {
            error_code,
            error_message: CString::new(msg).unwrap_or_default().into_raw(),
            transport_code,
            response: std::ptr::null_mut(),
        }))
    }
}

/// Release an `FfiResponse` and everything it owns.
///
/// # Safety
/// `response` must come from `FfiGetResult::ok` and not have been freed.
pub(crate) unsafe fn free_response(response: *mut FfiResponse) {
    let response = unsafe { Box::from_raw(response) };
    if !response.headers.is_null() && response.headers_len > 0 {
        let slice = std::ptr::slice_from_raw_parts_mut(response.headers, response.headers_len as usize);
        let headers = unsafe { Box::from_raw(slice) };
        for h in headers.iter() {
            if !h.key.is_null() {
                drop(unsafe { CString::from_raw(h.key) });
            }
            if !h.value.is_null() {
                drop(unsafe { CString::from_raw(h.value) });
            }
        }
    }
    if !response.content.is_null() && response.content_len > 0 {
        let slice = std::ptr::slice_from_raw_parts_mut(response.content, response.content_len);
        drop(unsafe { Box::from_raw(slice) });
    }
}
