//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type but uses C-compatible representations:
//! `*const c_char` instead of `String`, pointer + length instead of `Vec`,
//! and enums with explicit discriminants. Conversion functions live here to
//! keep `lib.rs` focused on the `extern "C"` surface.

use std::ffi::{c_void, CStr, CString};
use std::os::raw::c_char;

use ajax_core::{HttpMethod, Payload, RequestSettings, ResponseType};

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// HTTP method as a C enum.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiHttpMethod {
    Get = 0,
    Post = 1,
    Put = 2,
    Patch = 3,
    Delete = 4,
}

impl From<HttpMethod> for FfiHttpMethod {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Get => FfiHttpMethod::Get,
            HttpMethod::Post => FfiHttpMethod::Post,
            HttpMethod::Put => FfiHttpMethod::Put,
            HttpMethod::Patch => FfiHttpMethod::Patch,
            HttpMethod::Delete => FfiHttpMethod::Delete,
        }
    }
}

impl From<FfiHttpMethod> for HttpMethod {
    fn from(m: FfiHttpMethod) -> Self {
        match m {
            FfiHttpMethod::Get => HttpMethod::Get,
            FfiHttpMethod::Post => HttpMethod::Post,
            FfiHttpMethod::Put => HttpMethod::Put,
            FfiHttpMethod::Patch => HttpMethod::Patch,
            FfiHttpMethod::Delete => HttpMethod::Delete,
        }
    }
}

/// Response type as a C enum.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiResponseType {
    Text = 0,
    ArrayBuffer = 1,
    Blob = 2,
    Document = 3,
    Json = 4,
}

impl From<FfiResponseType> for ResponseType {
    fn from(t: FfiResponseType) -> Self {
        match t {
            FfiResponseType::Text => ResponseType::Text,
            FfiResponseType::ArrayBuffer => ResponseType::ArrayBuffer,
            FfiResponseType::Blob => ResponseType::Blob,
            FfiResponseType::Document => ResponseType::Document,
            FfiResponseType::Json => ResponseType::Json,
        }
    }
}

/// Status codes returned by `ajax_request`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    NullArg = 1,
    InvalidUtf8 = 2,
    Panic = 3,
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// A name/value pair of C strings. Used for headers and payload fields.
#[repr(C)]
pub struct FfiHeader {
    pub key: *mut c_char,
    pub value: *mut c_char,
}

pub type FfiStateCallback = Option<extern "C" fn(user_data: *mut c_void, state: u8)>;
pub type FfiProgressCallback =
    Option<extern "C" fn(user_data: *mut c_void, loaded: u64, total: u64, length_computable: bool)>;
/// `body` and `mime_type` are only valid for the duration of the call.
/// `mime_type` is the Content-Type of a blob response and null otherwise.
pub type FfiSuccessCallback =
    Option<extern "C" fn(user_data: *mut c_void, body: *const u8, len: usize, mime_type: *const c_char)>;
/// `status_text` is only valid for the duration of the call.
pub type FfiStatusCallback = Option<extern "C" fn(user_data: *mut c_void, status: u16, status_text: *const c_char)>;

/// Request configuration as seen from C.
///
/// `fields` takes precedence over `data` when both are set. Every pointer is
/// read during `ajax_request` only; the callbacks run later on a worker
/// thread and receive `user_data` unchanged.
#[repr(C)]
pub struct FfiRequestOptions {
    pub method: FfiHttpMethod,
    pub response_type: FfiResponseType,
    pub timeout_ms: u64,
    /// Pre-formatted payload, used verbatim. May be null.
    pub data: *const c_char,
    /// Key/value payload, percent-encoded on send. May be null.
    pub fields: *const FfiHeader,
    pub fields_len: u32,
    pub headers: *const FfiHeader,
    pub headers_len: u32,
    pub asynchronous: bool,
    pub user_data: *mut c_void,
    pub on_state_change: FfiStateCallback,
    pub on_progress: FfiProgressCallback,
    pub on_success: FfiSuccessCallback,
    pub on_fail: FfiStatusCallback,
    pub on_error: FfiStatusCallback,
}

/// Why C input could not be read.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum InputError {
    NullArg,
    InvalidUtf8,
}

impl From<InputError> for FfiErrorCode {
    fn from(e: InputError) -> Self {
        match e {
            InputError::NullArg => FfiErrorCode::NullArg,
            InputError::InvalidUtf8 => FfiErrorCode::InvalidUtf8,
        }
    }
}

/// Copy a C string into an owned `String`.
///
/// # Safety
/// `ptr` must be null or point to a NUL-terminated string.
pub(crate) unsafe fn read_str(ptr: *const c_char) -> Result<String, InputError> {
    if ptr.is_null() {
        return Err(InputError::NullArg);
    }
    unsafe { CStr::from_ptr(ptr) }
        .to_str()
        .map(str::to_string)
        .map_err(|_| InputError::InvalidUtf8)
}

/// Copy `len` name/value pairs. A null array is an empty list.
///
/// # Safety
/// `ptr` must be null or point to `len` valid `FfiHeader`s.
unsafe fn read_pairs(ptr: *const FfiHeader, len: u32) -> Result<Vec<(String, String)>, InputError> {
    if ptr.is_null() || len == 0 {
        return Ok(Vec::new());
    }
    let pairs = unsafe { std::slice::from_raw_parts(ptr, len as usize) };
    pairs
        .iter()
        .map(|p| -> Result<(String, String), InputError> {
            Ok((unsafe { read_str(p.key) }?, unsafe { read_str(p.value) }?))
        })
        .collect()
}

impl FfiRequestOptions {
    /// Copy the plain-data part into core `RequestSettings`.
    ///
    /// # Safety
    /// Every non-null pointer in `self` must be valid for reads.
    pub(crate) unsafe fn to_settings(&self) -> Result<RequestSettings, InputError> {
        let data = if !self.fields.is_null() {
            Some(Payload::fields(unsafe { read_pairs(self.fields, self.fields_len) }?))
        } else if !self.data.is_null() {
            Some(Payload::Raw(unsafe { read_str(self.data) }?))
        } else {
            None
        };

        Ok(RequestSettings {
            method: self.method.into(),
            response_type: self.response_type.into(),
            timeout: self.timeout_ms,
            data,
            headers: unsafe { read_pairs(self.headers, self.headers_len) }?,
            asynchronous: self.asynchronous,
        })
    }
}

// ---------------------------------------------------------------------------
// Prepared request (heap-allocated by us, freed by `ajax_free_request`)
// ---------------------------------------------------------------------------

/// An HTTP request described as C-compatible plain data.
#[repr(C)]
pub struct FfiHttpRequest {
    pub method: FfiHttpMethod,
    pub url: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
    /// Null when no body is sent.
    pub body: *mut c_char,
    /// 0 when there is no timeout.
    pub timeout_ms: u64,
}

/// Interior NULs cannot be represented in C; they are dropped.
pub(crate) fn to_c_string(s: String) -> *mut c_char {
    let bytes: Vec<u8> = s.into_bytes().into_iter().filter(|b| *b != 0).collect();
    CString::new(bytes).unwrap_or_default().into_raw()
}

impl FfiHttpRequest {
    /// Convert a core `HttpRequest` into a heap-allocated `FfiHttpRequest`.
    pub(crate) fn from_core(req: ajax_core::HttpRequest) -> *mut Self {
        let url = to_c_string(req.url);
        let body = match req.body {
            Some(b) => to_c_string(b),
            None => std::ptr::null_mut(),
        };

        let headers_len = req.headers.len() as u32;
        let headers = if req.headers.is_empty() {
            std::ptr::null_mut()
        } else {
            let ffi_headers: Box<[FfiHeader]> = req
                .headers
                .into_iter()
                .map(|(k, v)| FfiHeader {
                    key: to_c_string(k),
                    value: to_c_string(v),
                })
                .collect();
            Box::into_raw(ffi_headers) as *mut FfiHeader
        };

        let timeout_ms = req
            .timeout
            .map(|t| u64::try_from(t.as_millis()).unwrap_or(u64::MAX))
            .unwrap_or(0);

        Box::into_raw(Box::new(FfiHttpRequest {
            method: req.method.into(),
            url,
            headers,
            headers_len,
            body,
            timeout_ms,
        }))
    }
}

// ---------------------------------------------------------------------------
// Callback context
// ---------------------------------------------------------------------------

/// The caller's opaque pointer, carried to the worker thread.
#[derive(Clone, Copy)]
pub(crate) struct UserData(*mut c_void);

// SAFETY: the pointer is never dereferenced on the Rust side; the C caller
// promised it may be used from the worker thread by passing it in.
unsafe impl Send for UserData {}

impl UserData {
    pub(crate) fn new(ptr: *mut c_void) -> Self {
        Self(ptr)
    }

    pub(crate) fn get(self) -> *mut c_void {
        self.0
    }
}
