//! The fatal path.
//!
//! Operations in this crate return their failures. A caller that considers a
//! failing lock, wait or notification unrecoverable (the shared state behind it
//! can no longer be trusted) routes the error here: it is logged at error level
//! and the process aborts without unwinding.

use crate::Error;
use std::process;

/// Logs `error` and aborts the process.
#[cold]
pub fn abort(error: &Error) -> ! {
    tracing::error!(kind = ?error.kind(), "{}", error);
    process::abort()
}

/// Turns any crate [`Result`](crate::Result) into its value, taking the fatal
/// path on error.
///
/// ```
/// use pinned_thread::{fatal::OrAbort, Mutex};
///
/// let m = Mutex::boxed(0).or_abort();
/// *m.as_ref().lock().or_abort() += 1;
/// ```
pub trait OrAbort<T> {
    fn or_abort(self) -> T;
}

impl<T> OrAbort<T> for crate::Result<T> {
    #[inline]
    fn or_abort(self) -> T {
        match self {
            Ok(value) => value,
            Err(error) => abort(&error),
        }
    }
}
