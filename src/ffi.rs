//! C FFI bindings for u-eda.
//!
//! Exposes the dataset summary through a C-compatible interface. Results
//! cross the boundary as JSON text.
//!
//! # Design
//!
//! - **Integer error codes**: 0 = success, negative = error
//! - **Thread-local error message**: `eda_last_error()`
//! - **Owned output strings**: written to an out-parameter, released with
//!   `eda_string_free()`
//! - **`catch_unwind`**: All FFI entry points wrapped to prevent panic propagation
//!
//! # Safety
//!
//! Null pointer arguments return error code -1. Input strings must be
//! null-terminated UTF-8.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::panic;
use std::ptr;

use crate::config::SummaryConfig;
use crate::error::EdaError;
use crate::summary::{summarize_csv, summarize_json, DatasetSummary};

// ── Error handling ────────────────────────────────────────────────────

/// Error codes returned by FFI functions.
pub const EDA_OK: i32 = 0;
pub const EDA_ERR_NULL_PTR: i32 = -1;
pub const EDA_ERR_INVALID_INPUT: i32 = -2;
pub const EDA_ERR_PARSE_FAILED: i32 = -3;
pub const EDA_ERR_PANIC: i32 = -99;

thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

fn set_last_error(msg: &str) {
    LAST_ERROR.with(|cell| {
        *cell.borrow_mut() = CString::new(msg).ok();
    });
}

/// Returns the last error message, or null if no error.
/// The returned string is valid until the next FFI call on this thread.
///
/// # Safety
/// The caller must not free the returned pointer.
#[no_mangle]
pub extern "C" fn eda_last_error() -> *const c_char {
    LAST_ERROR.with(|cell| {
        let borrow = cell.borrow();
        match borrow.as_ref() {
            Some(cstr) => cstr.as_ptr(),
            None => ptr::null(),
        }
    })
}

/// Clears the last error message.
#[no_mangle]
pub extern "C" fn eda_clear_error() {
    LAST_ERROR.with(|cell| {
        *cell.borrow_mut() = None;
    });
}

fn error_code(err: &EdaError) -> i32 {
    match err {
        EdaError::Json { .. } | EdaError::CsvParse { .. } | EdaError::InvalidConfig { .. } => {
            EDA_ERR_PARSE_FAILED
        }
        EdaError::NotATable { .. }
        | EdaError::InvalidRow { .. }
        | EdaError::TooManyRows { .. }
        | EdaError::Io(_) => EDA_ERR_INVALID_INPUT,
    }
}

// ── Shared plumbing ──────────────────────────────────────────────────

/// Borrows a C string as `&str`, recording an error on failure.
///
/// # Safety
/// `ptr` must be null or a valid null-terminated string.
unsafe fn read_str<'a>(ptr: *const c_char, what: &str) -> Result<&'a str, i32> {
    if ptr.is_null() {
        set_last_error(&format!("null {what} pointer"));
        return Err(EDA_ERR_NULL_PTR);
    }
    unsafe { CStr::from_ptr(ptr) }.to_str().map_err(|e| {
        set_last_error(&format!("invalid UTF-8 in {what}: {e}"));
        EDA_ERR_INVALID_INPUT
    })
}

type Summarizer = fn(&str, &SummaryConfig) -> Result<DatasetSummary, EdaError>;

/// Runs a summarizer over C inputs and writes the JSON result.
///
/// # Safety
/// Same contract as [`eda_summarize_json`].
unsafe fn summarize_into(
    name: &str,
    input: *const c_char,
    config_json: *const c_char,
    out_json: *mut *mut c_char,
    summarize: Summarizer,
) -> i32 {
    let result = panic::catch_unwind(|| {
        if out_json.is_null() {
            set_last_error("null out_json pointer");
            return EDA_ERR_NULL_PTR;
        }
        unsafe { *out_json = ptr::null_mut() };

        let text = match unsafe { read_str(input, "input") } {
            Ok(s) => s,
            Err(code) => return code,
        };

        let config = if config_json.is_null() {
            SummaryConfig::default()
        } else {
            let raw = match unsafe { read_str(config_json, "config") } {
                Ok(s) => s,
                Err(code) => return code,
            };
            match SummaryConfig::from_json_str(raw) {
                Ok(c) => c,
                Err(e) => {
                    set_last_error(&e.to_string());
                    return error_code(&e);
                }
            }
        };

        let json = match summarize(text, &config).and_then(|s| s.to_json()) {
            Ok(json) => json,
            Err(e) => {
                set_last_error(&format!("{name}: {e}"));
                return error_code(&e);
            }
        };

        match CString::new(json) {
            Ok(cstr) => {
                unsafe { *out_json = cstr.into_raw() };
                EDA_OK
            }
            Err(e) => {
                set_last_error(&format!("{name}: output contains NUL: {e}"));
                EDA_ERR_INVALID_INPUT
            }
        }
    });

    match result {
        Ok(code) => code,
        Err(_) => {
            set_last_error(&format!("panic in {name}"));
            EDA_ERR_PANIC
        }
    }
}

// ── Summary FFI ──────────────────────────────────────────────────────

/// Summarizes a JSON array of row objects.
///
/// On success `*out_json` receives the summary as a JSON string and 0 is
/// returned. On failure `*out_json` is set to null, a negative code is
/// returned and `eda_last_error()` describes the problem.
///
/// # Safety
/// - `input` must be a valid null-terminated UTF-8 string.
/// - `config_json` must be null (defaults) or a valid null-terminated
///   UTF-8 string holding a configuration object.
/// - `out_json` must point to writable storage for one pointer.
/// - The string written to `*out_json` must be freed with `eda_string_free`.
#[no_mangle]
pub unsafe extern "C" fn eda_summarize_json(
    input: *const c_char,
    config_json: *const c_char,
    out_json: *mut *mut c_char,
) -> i32 {
    unsafe {
        summarize_into(
            "eda_summarize_json",
            input,
            config_json,
            out_json,
            summarize_json,
        )
    }
}

/// Summarizes comma-delimited CSV text with a header row.
///
/// Same output and error contract as [`eda_summarize_json`].
///
/// # Safety
/// Same requirements as [`eda_summarize_json`].
#[no_mangle]
pub unsafe extern "C" fn eda_summarize_csv(
    input: *const c_char,
    config_json: *const c_char,
    out_json: *mut *mut c_char,
) -> i32 {
    unsafe {
        summarize_into(
            "eda_summarize_csv",
            input,
            config_json,
            out_json,
            summarize_csv,
        )
    }
}

/// Frees a string returned by a u-eda FFI function.
///
/// # Safety
/// `s` must have been returned by a u-eda FFI function, or be null.
#[no_mangle]
pub unsafe extern "C" fn eda_string_free(s: *mut c_char) {
    if !s.is_null() {
        let _ = unsafe { CString::from_raw(s) };
    }
}

// ── Version ──────────────────────────────────────────────────────────

/// Returns the version string of u-eda.
///
/// # Safety
/// The returned string is a static string literal. Do not free it.
#[no_mangle]
pub extern "C" fn eda_version() -> *const c_char {
    c"0.1.0".as_ptr()
}

// ── Tests ────────────────────────────────────────────────────────────
