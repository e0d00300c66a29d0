//! FFI bindings for the Synheart emotion SDK
//!
//! C-compatible wrappers over the JSON entry points. All functions take
//! null-terminated C strings and return allocated strings that must be freed
//! by the caller using `synheart_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::adapter::{infer_from_batch, parse_batch, parse_window};
use crate::classifier::infer;
use crate::error::SdkError;
use crate::ingest::ingest_batch_json;
use crate::sample::create_sample_batch;

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Helper to convert C string to Rust string
unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

/// Helper to convert Rust string to C string (caller must free)
fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

/// Read a JSON input string, run `f` on it and hand back its JSON output.
unsafe fn json_call<F>(json: *const c_char, f: F) -> *mut c_char
where
    F: FnOnce(&str) -> Result<String, SdkError>,
{
    clear_last_error();

    let json_str = match cstr_to_string(json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid JSON string pointer");
            return ptr::null_mut();
        }
    };

    match f(&json_str) {
        Ok(output) => string_to_cstr(&output),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Inference API
// ============================================================================

/// Infer an emotion state from a JSON array of signal points.
///
/// # Safety
/// - `json` must be a valid null-terminated C string.
/// - Returns a newly allocated Inference JSON string that must be freed with
///   `synheart_free_string`.
/// - Returns NULL on error; call `synheart_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn synheart_infer(json: *const c_char) -> *mut c_char {
    json_call(json, |input| {
        let window = parse_window(input)?;
        Ok(serde_json::to_string(&infer(&window))?)
    })
}

/// Infer an emotion state from an ingestion batch JSON.
///
/// # Safety
/// - `json` must be a valid null-terminated C string.
/// - Returns a newly allocated Inference JSON string that must be freed with
///   `synheart_free_string`.
/// - Returns NULL on error; call `synheart_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn synheart_infer_from_batch(json: *const c_char) -> *mut c_char {
    json_call(json, |input| {
        let batch = parse_batch(input)?;
        Ok(serde_json::to_string(&infer_from_batch(&batch))?)
    })
}

/// Validate and check an ingestion batch JSON, returning the ingestion response.
///
/// # Safety
/// - `json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `synheart_free_string`.
/// - Returns NULL on error; call `synheart_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn synheart_ingest_batch(json: *const c_char) -> *mut c_char {
    json_call(json, |input| Ok(serde_json::to_string(&ingest_batch_json(input)?)?))
}

/// Build the sample ingestion batch.
///
/// # Safety
/// - `session_id` may be NULL (default session id) or a valid null-terminated C string.
/// - Returns a newly allocated batch JSON string that must be freed with
///   `synheart_free_string`.
#[no_mangle]
pub unsafe extern "C" fn synheart_sample_batch(session_id: *const c_char) -> *mut c_char {
    clear_last_error();

    let session = cstr_to_string(session_id);
    let batch = create_sample_batch(session.as_deref());

    match serde_json::to_string(&batch) {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by SDK functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by an SDK function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn synheart_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Get the last error message.
///
/// # Safety
/// - Returns a pointer to a thread-local error string.
/// - The returned pointer is valid until the next SDK call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn synheart_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

/// Get the SDK version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn synheart_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}
