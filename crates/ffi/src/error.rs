use std::cell::RefCell;
use std::ffi::CString;
use std::os::raw::c_char;
use std::ptr;

use wise_fire_growth_core::EngineError;

/// Common interface for FFI error types.
///
/// # Design
/// - `code()` - Returns the error code to be passed across the FFI boundary
/// - `msg()` - Returns the error message for diagnostic purposes
pub(crate) trait FireSimError {
    fn code(&self) -> FireSimErrorCode;
    fn msg(&self) -> &str;
}

/// Wraps an [`EngineError`] (or an FFI-local failure such as a null pointer)
/// with the [`FireSimErrorCode`] it projects onto.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct DefaultFireSimError {
    code: FireSimErrorCode,
    msg: String,
}

impl DefaultFireSimError {
    pub fn null_pointer(param_name: &str) -> Self {
        Self {
            code: FireSimErrorCode::NullPointer,
            msg: format!("parameter '{param_name}' cannot be null"),
        }
    }

    pub fn lock_poisoned() -> Self {
        Self {
            code: FireSimErrorCode::Internal,
            msg: "scenario lock was poisoned by a panic in another thread".into(),
        }
    }

    pub fn no_current_step() -> Self {
        Self {
            code: FireSimErrorCode::FireNotStarted,
            msg: "scenario has no current step; call fire_growth_reset first".into(),
        }
    }

    pub fn index_out_of_range(param_name: &str, value: u32) -> Self {
        Self {
            code: FireSimErrorCode::InvalidParameter,
            msg: format!("{param_name} {value} is out of range"),
        }
    }

    pub fn buffer_too_small(needed: u32, capacity: u32) -> Self {
        Self {
            code: FireSimErrorCode::InvalidParameter,
            msg: format!("output buffer holds {capacity} vertices, {needed} needed"),
        }
    }
}

impl FireSimError for DefaultFireSimError {
    fn code(&self) -> FireSimErrorCode {
        self.code
    }

    fn msg(&self) -> &str {
        &self.msg
    }
}

impl From<EngineError> for DefaultFireSimError {
    fn from(error: EngineError) -> Self {
        let code = FireSimErrorCode::from(&error);
        Self {
            code,
            msg: error.to_string(),
        }
    }
}

/// FFI error codes returned by every `fire_growth_*` function.
///
/// Follows standard C convention: 0 = success, non-zero = error. Grouped
/// from [`EngineError`]'s finer-grained variants into a small, stable table
/// suitable for a C switch statement; callers needing the full detail should
/// read [`fire_sim_get_last_error`].
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireSimErrorCode {
    Ok = 0,
    NullPointer = 1,
    InvalidParameter = 2,
    Uninitialized = 3,
    ScenarioBadState = 4,
    FireNotStarted = 5,
    ObjectInvalid = 6,
    Internal = 7,
}

impl From<&EngineError> for FireSimErrorCode {
    fn from(error: &EngineError) -> Self {
        match error {
            EngineError::InvalidArgument { .. } => FireSimErrorCode::InvalidParameter,
            EngineError::Uninitialized { .. } => FireSimErrorCode::Uninitialized,
            EngineError::ScenarioBadState { .. } | EngineError::ScenarioSimulationRunning => {
                FireSimErrorCode::ScenarioBadState
            }
            EngineError::FireNotStarted => FireSimErrorCode::FireNotStarted,
            EngineError::ObjectInvalid { .. } | EngineError::VersionMismatch { .. } => FireSimErrorCode::ObjectInvalid,
            _ => FireSimErrorCode::Internal,
        }
    }
}

thread_local! {
    /// Thread-local storage for the most recent FFI error (C string, error code).
    static LAST_ERROR: RefCell<(Option<CString>, FireSimErrorCode)> = const { RefCell::new((None, FireSimErrorCode::Ok)) };
}

pub(crate) fn with_last_error<F, R>(f: F) -> R
where
    F: FnOnce(&(Option<CString>, FireSimErrorCode)) -> R,
{
    LAST_ERROR.with_borrow(f)
}

pub(crate) fn with_last_error_mut<F, R>(f: F) -> R
where
    F: FnOnce(&mut (Option<CString>, FireSimErrorCode)) -> R,
{
    LAST_ERROR.with_borrow_mut(f)
}

/// Retrieve the most recent FFI error message as a null-terminated C string.
///
/// Returns null if no error has occurred on this thread. The returned
/// pointer is valid until the next FFI call that sets or clears the error,
/// or until the thread exits. Do not free it.
#[no_mangle]
pub extern "C" fn fire_sim_get_last_error() -> *const c_char {
    with_last_error(|(cstring, _code)| cstring.as_ref().map_or(ptr::null(), |cs| cs.as_ptr()))
}

/// Retrieve the most recent FFI error code on this thread.
#[no_mangle]
pub extern "C" fn fire_sim_get_last_error_code() -> FireSimErrorCode {
    with_last_error(|(_cstring, code)| *code)
}
