//! This provides a thin wrapper around the standard library primitives, for
//! platforms without pthreads.
//!
//! The standard primitives poison on panic. Poisoning is not part of this
//! crate, so it is ignored here.

use std::sync::{LockResult, TryLockError, TryLockResult};

pub mod condvar;
pub mod mutex;
pub mod thread;

#[inline]
fn try_ignore_poison<T>(result: TryLockResult<T>) -> Option<T> {
    match result {
        Ok(lock) => Some(lock),
        Err(TryLockError::Poisoned(error)) => Some(error.into_inner()),
        Err(TryLockError::WouldBlock) => None,
    }
}

#[inline]
fn ignore_poison<T>(result: LockResult<T>) -> T {
    match result {
        Ok(lock) => lock,
        Err(error) => error.into_inner(),
    }
}
