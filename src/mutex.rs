use crate::sys::mutex as sys;
use crate::sys_common::holder::Holder;
use crate::{Error, Result};
use std::cell::UnsafeCell;
use std::fmt;
use std::marker::PhantomPinned;
use std::mem;
use std::ops::{Deref, DerefMut};
use std::pin::Pin;
use std::ptr;
use std::sync::Arc;

/// A mutual exclusion primitive useful for protecting shared data
///
/// This mutex will block threads waiting for the lock to become available. The
/// mutex can be created uninitialized in a `const` context and initialized once
/// pinned, or created initialized via [`boxed`] and [`arc`]. Each mutex has a
/// type parameter which represents the data that it is protecting. The data can
/// only be accessed through the RAII guards returned from [`lock`] and
/// [`try_lock`], which guarantees that the data is only ever accessed when the
/// mutex is locked.
///
/// # Failures
///
/// Locking and unlocking return a [`Result`]. The platform only reports a
/// failure when the mutex is misused or corrupted, so the shared data can no
/// longer be trusted; most callers hand such errors to [`fatal::abort`]. A
/// guard that fails to unlock while being dropped takes that path by itself.
///
/// # Holder tracking
///
/// With `debug_assertions` or the `track-holder` feature, the mutex records
/// which thread holds it, so code that requires a lock can assert it with
/// [`is_held`].
///
/// [`boxed`]: Self::boxed
/// [`arc`]: Self::arc
/// [`lock`]: Self::lock
/// [`try_lock`]: Self::try_lock
/// [`is_held`]: Self::is_held
/// [`fatal::abort`]: crate::fatal::abort
pub struct Mutex<T: ?Sized> {
    inner: sys::Mutex,
    holder: Holder,
    _p: PhantomPinned,
    data: UnsafeCell<T>,
}

unsafe impl<T: ?Sized + Send> Send for Mutex<T> {}

unsafe impl<T: ?Sized + Send> Sync for Mutex<T> {}

impl<T> Mutex<T> {
    /// Create a new, uninitialized mutex.
    ///
    /// This is *NOT* equivalent to `MaybeUninit::uninit().assume_init()`, which will cause
    /// undefined behaviour if used to create a new mutex.
    #[inline]
    pub const fn uninit(value: T) -> Self {
        Self {
            inner: sys::Mutex::uninit(),
            holder: Holder::new(),
            _p: PhantomPinned,
            data: UnsafeCell::new(value),
        }
    }

    /// Create a new, initialized mutex.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MutexInit`] if the platform cannot create the mutex.
    #[inline]
    pub fn boxed(value: T) -> Result<Pin<Box<Self>>> {
        let this = Box::pin(Self::uninit(value));
        this.as_ref().init()?;
        Ok(this)
    }

    /// Create a new, initialized mutex.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MutexInit`] if the platform cannot create the mutex.
    #[inline]
    pub fn arc(value: T) -> Result<Pin<Arc<Self>>> {
        let this = Arc::pin(Self::uninit(value));
        this.as_ref().init()?;
        Ok(this)
    }
}

impl<T: ?Sized> Mutex<T> {
    /// Initialize a mutex, making it ready for use.
    ///
    /// A failed initialization leaves the mutex uninitialized.
    ///
    /// # Panics
    ///
    /// This function panics if the mutex was already initialized.
    #[inline]
    pub fn init(self: Pin<&Self>) -> Result<()> {
        self.inner().init().map_err(Error::MutexInit)
    }

    /// Acquires a mutex, blocking the current thread until it is able to do so.
    ///
    /// Upon returning, the thread is the only thread with the lock held. An
    /// RAII guard is returned to allow scoped unlock of the lock. When the
    /// guard goes out of scope, the mutex will be unlocked.
    ///
    /// Locking a mutex in the thread which already holds it fails with
    /// [`Error::Lock`] in debug builds on unix and deadlocks otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Lock`] if the platform reports a failure.
    ///
    /// # Panics
    ///
    /// This function panics if the mutex is not initialized.
    #[inline]
    pub fn lock(self: Pin<&Self>) -> Result<MutexGuard<'_, T>> {
        let guard = self.inner().lock().map_err(Error::Lock)?;
        Ok(MutexGuard::new(self, guard))
    }

    /// Attempts to acquire this lock without blocking.
    ///
    /// Returns `Ok(None)` if the lock is held elsewhere.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Lock`] if the platform reports a failure.
    ///
    /// # Panics
    ///
    /// This function panics if the mutex is not initialized.
    #[inline]
    pub fn try_lock(self: Pin<&Self>) -> Result<Option<MutexGuard<'_, T>>> {
        let guard = self.inner().try_lock().map_err(Error::Lock)?;
        Ok(guard.map(|guard| MutexGuard::new(self, guard)))
    }

    /// Returns whether the calling thread holds this mutex.
    ///
    /// Only meant for assertions:
    ///
    /// ```
    /// # use pinned_thread::Mutex;
    /// # use std::pin::Pin;
    /// fn bump(counter: Pin<&Mutex<u32>>, value: &mut u32) {
    ///     debug_assert!(counter.is_held());
    ///     *value += 1;
    /// }
    ///
    /// let m = Mutex::boxed(0).unwrap();
    /// let mut g = m.as_ref().lock().unwrap();
    /// bump(m.as_ref(), &mut g);
    /// ```
    #[cfg(any(debug_assertions, feature = "track-holder"))]
    #[inline]
    pub fn is_held(self: Pin<&Self>) -> bool {
        self.holder.is_current()
    }

    /// Consumes this mutex, returning the underlying data.
    pub fn into_inner(self) -> T
    where
        T: Sized,
    {
        let Self { data, .. } = self;
        data.into_inner()
    }

    /// Returns a mutable reference to the underlying data.
    ///
    /// Since this call borrows the `Mutex` mutably, no actual locking needs to
    /// take place -- the mutable borrow statically guarantees no locks exist.
    pub fn get_mut(&mut self) -> &mut T {
        self.data.get_mut()
    }

    #[inline]
    fn inner(self: Pin<&Self>) -> Pin<&sys::Mutex> {
        unsafe { self.map_unchecked(|this| &this.inner) }
    }
}

impl<T: ?Sized> fmt::Debug for Mutex<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mutex").finish_non_exhaustive()
    }
}

/// An RAII guard of a locked [`Mutex`].
///
/// Dropping the guard unlocks the mutex; if the platform fails to unlock it,
/// the process aborts. Use [`unlock`](Self::unlock) to get the failure as an
/// error instead.
pub struct MutexGuard<'a, T: ?Sized> {
    guard: sys::MutexGuard<'a>,
    mutex: Pin<&'a Mutex<T>>,
}

unsafe impl<T: ?Sized + Sync> Sync for MutexGuard<'_, T> {}

impl<'a, T: ?Sized> MutexGuard<'a, T> {
    #[inline]
    fn new(mutex: Pin<&'a Mutex<T>>, guard: sys::MutexGuard<'a>) -> Self {
        mutex.holder.acquired();
        Self { guard, mutex }
    }

    /// Unlocks the mutex.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unlock`] if the platform reports a failure.
    #[inline]
    pub fn unlock(self) -> Result<()> {
        let (guard, mutex) = self.into_parts();
        mutex.holder.released();
        guard.unlock().map_err(Error::Unlock)
    }

    /// Runs `f` on the raw guard with the holder cleared, as while waiting on a
    /// condition variable, and rebuilds the guard from what `f` returns.
    #[inline]
    pub(crate) fn map<R>(
        self,
        f: impl FnOnce(sys::MutexGuard<'a>) -> Result<(sys::MutexGuard<'a>, R)>,
    ) -> Result<(Self, R)> {
        let (guard, mutex) = self.into_parts();
        mutex.holder.released();
        let (guard, r) = f(guard)?;
        Ok((Self::new(mutex, guard), r))
    }

    #[inline]
    pub(crate) fn mutex_addr(&self) -> usize {
        &*self.mutex as *const Mutex<T> as *const () as usize
    }

    #[inline]
    fn into_parts(self) -> (sys::MutexGuard<'a>, Pin<&'a Mutex<T>>) {
        unsafe {
            let guard = ptr::read(&self.guard);
            let mutex = ptr::read(&self.mutex);
            mem::forget(self);
            (guard, mutex)
        }
    }
}

impl<T: ?Sized> Deref for MutexGuard<'_, T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        unsafe { &*self.mutex.data.get() }
    }
}

impl<T: ?Sized> DerefMut for MutexGuard<'_, T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut T {
        unsafe { &mut *self.mutex.data.get() }
    }
}

impl<T: ?Sized + fmt::Debug> fmt::Debug for MutexGuard<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&**self, f)
    }
}

impl<T: ?Sized> Drop for MutexGuard<'_, T> {
    #[inline]
    fn drop(&mut self) {
        // Cleared before the raw guard field unlocks.
        self.mutex.holder.released();
    }
}
