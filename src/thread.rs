//! Named threads returning an exit status.

use crate::sys::thread as sys;
use crate::{Error, Result};
use std::fmt;
use std::io;
use std::num::NonZeroU64;
use std::sync::atomic::{AtomicU64, Ordering::Relaxed};

/// Thread factory, used to configure a thread before spawning it.
///
/// ```
/// use pinned_thread::thread::Builder;
///
/// let t = Builder::new("worker")
///     .stack_size(256 * 1024)
///     .spawn(|| 7)
///     .unwrap();
/// assert_eq!(t.join().unwrap(), 7);
/// ```
#[derive(Debug)]
pub struct Builder {
    name: String,
    stack_size: Option<usize>,
}

impl Builder {
    /// Starts configuring a thread with the given diagnostic name.
    ///
    /// The name is visible to debuggers and `ps`, truncated to the platform
    /// limit (15 bytes on Linux).
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stack_size: None,
        }
    }

    /// Sets the stack size of the new thread, in bytes.
    ///
    /// The platform may round it up.
    pub fn stack_size(mut self, size: usize) -> Self {
        self.stack_size = Some(size);
        self
    }

    /// Spawns a thread running `f`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Spawn`] if the platform cannot create the thread or if
    /// the name contains a NUL byte.
    pub fn spawn<F>(self, f: F) -> Result<Thread>
    where
        F: FnOnce() -> i32 + Send + 'static,
    {
        let Builder { name, stack_size } = self;
        if name.contains('\0') {
            return Err(Error::Spawn(io::Error::new(
                io::ErrorKind::InvalidInput,
                "thread name may not contain interior null bytes",
            )));
        }

        let inner = sys::Thread::spawn(&name, stack_size, Box::new(f)).map_err(Error::Spawn)?;
        tracing::debug!(thread = %name, "spawned thread");
        Ok(Thread { inner, name })
    }
}

/// An owned handle to a running thread.
///
/// Dropping the handle detaches the thread.
pub struct Thread {
    inner: sys::Thread,
    name: String,
}

impl Thread {
    /// Spawns a thread named `name` running `f`, with the default stack size.
    ///
    /// The value returned by `f` is the exit status reported by [`join`].
    ///
    /// [`join`]: Self::join
    pub fn spawn<F>(name: &str, f: F) -> Result<Thread>
    where
        F: FnOnce() -> i32 + Send + 'static,
    {
        Builder::new(name).spawn(f)
    }

    /// The name given at spawn, before any platform truncation.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Waits for the thread to finish and returns its exit status.
    ///
    /// There is no timeout.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Panicked`] if the thread panicked, or [`Error::Join`]
    /// if the platform refused to join it.
    pub fn join(self) -> Result<i32> {
        let Thread { inner, name } = self;
        match inner.join().map_err(Error::Join)? {
            Ok(status) => {
                tracing::debug!(thread = %name, status, "joined thread");
                Ok(status)
            }
            Err(message) => Err(Error::Panicked { name, message }),
        }
    }
}

impl fmt::Debug for Thread {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Thread").field("name", &self.name).finish()
    }
}

/// A process-unique identifier of a thread. Identifiers are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ThreadId(NonZeroU64);

impl ThreadId {
    fn new() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);

        match NonZeroU64::new(NEXT.fetch_add(1, Relaxed)) {
            Some(id) => Self(id),
            None => exhausted(),
        }
    }

    /// The raw identifier. Never zero.
    #[inline]
    pub fn as_u64(self) -> NonZeroU64 {
        self.0
    }
}

#[cold]
fn exhausted() -> ! {
    panic!("failed to generate unique thread ID: bitspace exhausted")
}

/// Returns the identifier of the calling thread.
#[inline]
pub fn current_id() -> ThreadId {
    thread_local! {
        static ID: ThreadId = ThreadId::new();
    }
    ID.with(|id| *id)
}
