use std::ffi::CString;

use crate::error::{with_last_error_mut, DefaultFireSimError, FireSimError, FireSimErrorCode};

/// Set the thread-local error message and code.
pub(crate) fn set_last_error(error: &impl FireSimError) {
    with_last_error_mut(|(cstring, code)| {
        *cstring = CString::new(error.msg()).ok();
        *code = error.code();
    });
}

/// Track an error by setting it in thread-local storage and returning its code.
#[inline]
pub(crate) fn track_error(error: &impl FireSimError) -> FireSimErrorCode {
    set_last_error(error);
    error.code()
}

/// Clear the thread-local error message and code.
pub(crate) fn clear_last_error() {
    with_last_error_mut(|(cstring, code)| {
        *cstring = None;
        *code = FireSimErrorCode::Ok;
    });
}

/// Collapse a `Result<T, impl Into<DefaultFireSimError>>` into the
/// FFI-function pattern: record the error (if any) and hand back a plain
/// [`FireSimErrorCode`], clearing any stale error from a previous call on
/// success.
pub(crate) fn track_result<T>(result: Result<T, impl Into<DefaultFireSimError>>) -> Result<T, FireSimErrorCode> {
    match result {
        Ok(value) => {
            clear_last_error();
            Ok(value)
        }
        Err(err) => Err(track_error(&err.into())),
    }
}
