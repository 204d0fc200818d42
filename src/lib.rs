//! Threads, mutexes and condition variables as a thin layer over the platform
//! primitives: POSIX threads on unix, the standard library elsewhere.
//!
//! Mutexes and condition variables are pinned, so they can be created
//! uninitialized in a `const` context and initialized in place. Every operation
//! that the platform can fail returns a [`Result`]; creation failures are
//! ordinary errors, while a failing lock, unlock, wait or notification means the
//! shared state can no longer be trusted and is usually passed to
//! [`fatal::abort`].
//!
//! ```
//! use pinned_thread::{Condvar, Mutex, Thread};
//! use std::pin::Pin;
//! use std::sync::Arc;
//!
//! struct Shared {
//!     ready: Mutex<bool>,
//!     cond: Condvar,
//! }
//!
//! let shared = Arc::pin(Shared {
//!     ready: Mutex::uninit(false),
//!     cond: Condvar::uninit(),
//! });
//! let ready = unsafe { shared.as_ref().map_unchecked(|s| &s.ready) };
//! let cond = unsafe { shared.as_ref().map_unchecked(|s| &s.cond) };
//! ready.init().unwrap();
//! cond.init().unwrap();
//!
//! let remote = shared.clone();
//! let t = Thread::spawn("notifier", move || {
//!     let shared: Pin<&Shared> = remote.as_ref();
//!     let ready = unsafe { shared.map_unchecked(|s| &s.ready) };
//!     let cond = unsafe { shared.map_unchecked(|s| &s.cond) };
//!     *ready.lock().unwrap() = true;
//!     cond.notify_one().unwrap();
//!     0
//! })
//! .unwrap();
//!
//! let guard = cond.wait_while(ready.lock().unwrap(), |ready| !*ready).unwrap();
//! assert!(*guard);
//! drop(guard);
//! assert_eq!(t.join().unwrap(), 0);
//! ```

mod condvar;
mod error;
pub mod fatal;
mod mutex;
mod sys;
mod sys_common;
pub mod thread;

pub use condvar::*;
pub use error::*;
pub use mutex::*;
pub use thread::{Builder, Thread, ThreadId};
