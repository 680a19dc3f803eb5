//! C-ABI wrapper around `ajax-core`.
//!
//! # Overview
//! Exposes the dispatcher through `extern "C"` functions so any language with
//! a C FFI can fire a request and receive its lifecycle through plain
//! function pointers, without linking against Rust types directly.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - `ajax_request` copies every input before returning; the C caller may
//!   free its strings immediately. Callbacks run later on the exchange's
//!   worker thread and receive the caller's `user_data` untouched.
//! - Pointers handed to callbacks are borrowed for the duration of the call.
//!   The only heap value the caller owns is the `FfiHttpRequest` from
//!   `ajax_prepare`, released with `ajax_free_request`.

pub mod types;

use std::ffi::{c_void, CString};
use std::os::raw::c_char;
use std::panic::catch_unwind;

use ajax_core::config::{ProgressCallback, StateCallback, StatusCallback, SuccessCallback};
use ajax_core::{Callbacks, Progress, ReadyState, RequestOptions, ResponseBody};

use types::*;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// Start one HTTP exchange. Returns as soon as the exchange is dispatched;
/// results arrive through the callbacks in `options`.
///
/// Returns `NullArg` if `url` or `options` is null, `InvalidUtf8` if any
/// string is not UTF-8. No callback fires in either case.
#[unsafe(no_mangle)]
pub extern "C" fn ajax_request(url: *const c_char, options: *const FfiRequestOptions) -> FfiErrorCode {
    catch_unwind(|| {
        if options.is_null() {
            return FfiErrorCode::NullArg;
        }
        let url = match unsafe { read_str(url) } {
            Ok(url) => url,
            Err(e) => return e.into(),
        };
        let options = unsafe { &*options };
        let settings = match unsafe { options.to_settings() } {
            Ok(settings) => settings,
            Err(e) => return e.into(),
        };

        ajax_core::ajax(
            &url,
            RequestOptions {
                settings,
                callbacks: callbacks(options),
            },
        );
        FfiErrorCode::Ok
    })
    .unwrap_or_else(|_| {
        tracing::error!("panic in ajax_request");
        FfiErrorCode::Panic
    })
}

/// Wrap the C function pointers in core callbacks bound to `user_data`.
fn callbacks(options: &FfiRequestOptions) -> Callbacks {
    let user_data = UserData::new(options.user_data);

    Callbacks {
        state_change: options.on_state_change.map(|f| -> StateCallback {
            Box::new(move |state: ReadyState| f(user_data.get(), state.as_u8()))
        }),
        progress: options.on_progress.map(|f| -> ProgressCallback {
            Box::new(move |p: Progress| f(user_data.get(), p.loaded, p.total.unwrap_or(0), p.length_computable()))
        }),
        success: options.on_success.map(|f| -> SuccessCallback {
            Box::new(move |body: ResponseBody| {
                let (bytes, mime_type) = match body {
                    ResponseBody::Blob { bytes, mime_type } => (bytes, mime_type.and_then(|m| CString::new(m).ok())),
                    other => (other.into_bytes(), None),
                };
                let mime_ptr = mime_type.as_ref().map_or(std::ptr::null(), |m| m.as_ptr());
                f(user_data.get(), bytes.as_ptr(), bytes.len(), mime_ptr);
            })
        }),
        fail: options.on_fail.map(|f| status_callback(f, user_data)),
        error: options.on_error.map(|f| status_callback(f, user_data)),
    }
}

fn status_callback(
    f: extern "C" fn(*mut c_void, u16, *const c_char),
    user_data: UserData,
) -> StatusCallback {
    Box::new(move |status: u16, status_text: String| {
        let text = CString::new(status_text).unwrap_or_default();
        f(user_data.get(), status, text.as_ptr());
    })
}

// ---------------------------------------------------------------------------
// Prepare
// ---------------------------------------------------------------------------

/// Build the request `ajax_request` would send, without sending it.
///
/// Returns null if `url` or `options` is null or holds invalid UTF-8.
/// Callbacks and `user_data` in `options` are ignored.
/// The caller must free the returned pointer with `ajax_free_request`.
#[unsafe(no_mangle)]
pub extern "C" fn ajax_prepare(url: *const c_char, options: *const FfiRequestOptions) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if options.is_null() {
            return std::ptr::null_mut();
        }
        let Ok(url) = (unsafe { read_str(url) }) else {
            return std::ptr::null_mut();
        };
        let Ok(settings) = (unsafe { (*options).to_settings() }) else {
            return std::ptr::null_mut();
        };
        FfiHttpRequest::from_core(ajax_core::prepare(&url, &settings))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free an `FfiHttpRequest` returned by `ajax_prepare`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn ajax_free_request(req: *mut FfiHttpRequest) {
    if req.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let req = unsafe { Box::from_raw(req) };
        if !req.url.is_null() {
            drop(unsafe { CString::from_raw(req.url) });
        }
        if !req.body.is_null() {
            drop(unsafe { CString::from_raw(req.body) });
        }
        if !req.headers.is_null() && req.headers_len > 0 {
            let headers = unsafe {
                Box::from_raw(std::ptr::slice_from_raw_parts_mut(req.headers, req.headers_len as usize))
            };
            for h in headers.iter() {
                if !h.key.is_null() {
                    drop(unsafe { CString::from_raw(h.key) });
                }
                if !h.value.is_null() {
                    drop(unsafe { CString::from_raw(h.value) });
                }
            }
        }
    });
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
