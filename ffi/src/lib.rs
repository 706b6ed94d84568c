//! C-ABI wrapper around `http-client-core`.
//!
//! # Overview
//! Exposes `HttpClient` through `extern "C"` functions so any language with
//! a C FFI can issue GET requests without linking against Rust types.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - `http_client_get` mirrors `HttpClient::get_with`; query parameters and
//!   headers arrive as arrays of `FfiKeyValue`.
//! - A single `FfiGetResult` envelope conveys the response or the error kind,
//!   message and transport error number.
//! - `http_client_user_agent` hands out a standalone string, released with
//!   `http_free_string`.
//! - The C caller owns all returned pointers and must call the matching
//!   `http_*_free` function to release them.

pub mod types;

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};

use http_client_core::kv::{KeyValues, Style};
use http_client_core::{ClientConfig, HttpClient};

use types::*;

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a new client identifying itself with `user_agent`.
///
/// A null `user_agent` selects the default (`HttpClient`). Returns null if
/// `user_agent` is not valid UTF-8 or if an internal panic occurs.
/// The caller must free the returned pointer with `http_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn http_client_new(user_agent: *const c_char) -> *mut FfiHttpClient {
    catch_unwind(AssertUnwindSafe(|| {
        let config = if user_agent.is_null() {
            ClientConfig::default()
        } else {
            match unsafe { CStr::from_ptr(user_agent) }.to_str() {
                Ok(ua) => ClientConfig::with_user_agent(ua),
                Err(_) => return std::ptr::null_mut(),
            }
        };
        let client = HttpClient::with_config(config);
        Box::into_raw(Box::new(FfiHttpClient { inner: client }))
    }))
    .unwrap_or(std::ptr::null_mut())
}

/// Free a client created by `http_client_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn http_client_free(client: *mut FfiHttpClient) {
    if !client.is_null() {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            drop(unsafe { Box::from_raw(client) });
        }));
    }
}

/// The user agent `client` identifies itself with, as a new C string.
///
/// Returns null if `client` is null. The caller must free the result with
/// `http_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn http_client_user_agent(client: *const FfiHttpClient) -> *mut c_char {
    if client.is_null() {
        return std::ptr::null_mut();
    }
    catch_unwind(AssertUnwindSafe(|| {
        let client = unsafe { &*client };
        CString::new(client.inner.config().user_agent.as_str())
            .map(CString::into_raw)
            .unwrap_or(std::ptr::null_mut())
    }))
    .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// GET
// ---------------------------------------------------------------------------

/// Issue a blocking GET for `url`.
///
/// `query` / `headers` may be null when their length is 0. Every entry must
/// have non-null, UTF-8 `key` and `value`. Never returns null; the caller
/// must free the result with `http_free_result`.
#[unsafe(no_mangle)]
pub extern "C" fn http_client_get(
    client: *mut FfiHttpClient,
    url: *const c_char,
    query: *const FfiKeyValue,
    query_len: u32,
    headers: *const FfiKeyValue,
    headers_len: u32,
) -> *mut FfiGetResult {
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() {
            return FfiGetResult::null_arg("client");
        }
        if url.is_null() {
            return FfiGetResult::null_arg("url");
        }
        let client = unsafe { &mut *client };
        let Ok(url) = unsafe { CStr::from_ptr(url) }.to_str() else {
            return FfiGetResult::invalid_utf8("url");
        };
        let params = match unsafe { collect_pairs(query, query_len, "query") } {
            Ok(params) => params,
            Err(result) => return result,
        };
        let headers = match unsafe { collect_pairs(headers, headers_len, "headers") } {
            Ok(headers) => headers,
            Err(result) => return result,
        };

        match client.inner.get_with(url, &params, &headers) {
            Ok(response) => FfiGetResult::ok(response),
            Err(e) => {
                log::debug!("http_client_get failed: {e}");
                FfiGetResult::from_error(e)
            }
        }
    }))
    .unwrap_or_else(|_| FfiGetResult::panic("panic in http_client_get"))
}

/// Copy a caller-provided key/value array into a core collection.
///
/// # Safety
/// When `len > 0`, `ptr` must point to `len` readable `FfiKeyValue`s whose
/// strings are NUL-terminated.
unsafe fn collect_pairs<S: Style>(
    ptr: *const FfiKeyValue,
    len: u32,
    what: &str,
) -> Result<KeyValues<S>, *mut FfiGetResult> {
    let mut kv = KeyValues::new();
    if len == 0 {
        return Ok(kv);
    }
    if ptr.is_null() {
        return Err(FfiGetResult::null_arg(what));
    }
    let pairs = unsafe { std::slice::from_raw_parts(ptr, len as usize) };
    for pair in pairs {
        if pair.key.is_null() || pair.value.is_null() {
            return Err(FfiGetResult::null_arg(what));
        }
        let key = unsafe { CStr::from_ptr(pair.key) }.to_str();
        let value = unsafe { CStr::from_ptr(pair.value) }.to_str();
        match (key, value) {
            (Ok(key), Ok(value)) => {
                kv.set(key, value);
            }
            _ => return Err(FfiGetResult::invalid_utf8(what)),
        }
    }
    Ok(kv)
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free an `FfiGetResult` returned by `http_client_get`, including its
/// response. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn http_free_result(result: *mut FfiGetResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(AssertUnwindSafe(|| {
        let result = unsafe { Box::from_raw(result) };
        if !result.error_message.is_null() {
            drop(unsafe { CString::from_raw(result.error_message) });
        }
        if !result.response.is_null() {
            unsafe { free_response(result.response) };
        }
    }));
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn http_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { CString::from_raw(s) });
        });
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
