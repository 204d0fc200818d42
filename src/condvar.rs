use crate::sys::condvar as sys;
use crate::{Error, MutexGuard, Result};
use std::fmt;
use std::marker::PhantomPinned;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering::*};
use std::sync::Arc;
use std::time::Duration;
use std::time::Instant;

/// A type indicating whether a timed wait on a condition variable returned
/// due to a time out or not.
///
/// It is returned by the [`wait_timeout`] method.
///
/// [`wait_timeout`]: Condvar::wait_timeout
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub struct WaitTimeoutResult(bool);

impl WaitTimeoutResult {
    /// Returns `true` if the wait was known to have timed out.
    pub fn timed_out(&self) -> bool {
        self.0
    }
}

/// A Condition Variable
///
/// Condition variables represent the ability to block a thread such that it
/// consumes no CPU time while waiting for an event to occur. Condition
/// variables are typically associated with a boolean predicate (a condition)
/// and a mutex. The predicate is always verified inside of the mutex before
/// determining that a thread must block.
///
/// Functions in this module will block the current **thread** of execution.
/// A condition variable is bound to the first mutex it is waited on with;
/// waiting with any other mutex fails with [`Error::MutexMismatch`].
pub struct Condvar {
    inner: sys::Condvar,
    mutex: AtomicUsize,
    _p: PhantomPinned,
}

impl Condvar {
    /// Create a new, uninitialized condvar.
    ///
    /// This is *NOT* equivalent to `MaybeUninit::uninit().assume_init()`, which will cause
    /// undefined behaviour if used to create a new condvar.
    #[inline]
    pub const fn uninit() -> Self {
        Self {
            inner: sys::Condvar::uninit(),
            mutex: AtomicUsize::new(0),
            _p: PhantomPinned,
        }
    }

    /// Initialize a condvar, making it ready for use.
    ///
    /// # Panics
    ///
    /// This function panics if the condvar was already initialized.
    #[inline]
    pub fn init(self: Pin<&Self>) -> Result<()> {
        self.inner().init().map_err(Error::CondInit)
    }

    /// Create a new, initialized condition variable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CondInit`] if the platform cannot create it.
    #[inline]
    pub fn boxed() -> Result<Pin<Box<Self>>> {
        let this = Box::pin(Self::uninit());
        this.as_ref().init()?;
        Ok(this)
    }

    /// Create a new, initialized condition variable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CondInit`] if the platform cannot create it.
    #[inline]
    pub fn arc() -> Result<Pin<Arc<Self>>> {
        let this = Arc::pin(Self::uninit());
        this.as_ref().init()?;
        Ok(this)
    }

    /// Wakes up one blocked thread on this condvar.
    ///
    /// If there is a blocked thread on this condition variable, then it will
    /// be woken up from its call to [`wait`] or [`wait_timeout`]. Calls to
    /// `notify_one` are not buffered in any way.
    ///
    /// To wake up all threads, see [`notify_all`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Signal`] if the platform reports a failure.
    ///
    /// [`wait`]: Self::wait
    /// [`wait_timeout`]: Self::wait_timeout
    /// [`notify_all`]: Self::notify_all
    #[inline]
    pub fn notify_one(self: Pin<&Self>) -> Result<()> {
        self.inner().notify_one().map_err(Error::Signal)
    }

    /// Wakes up all blocked threads on this condvar.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Broadcast`] if the platform reports a failure.
    #[inline]
    pub fn notify_all(self: Pin<&Self>) -> Result<()> {
        self.inner().notify_all().map_err(Error::Broadcast)
    }

    /// Blocks the current thread until this condition variable receives a
    /// notification.
    ///
    /// This function will atomically unlock the mutex specified (represented by
    /// `guard`) and block the current thread. This means that any calls
    /// to [`notify_one`] or [`notify_all`] which happen logically after the
    /// mutex is unlocked are candidates to wake this thread up. When this
    /// function call returns, the lock specified will have been re-acquired.
    ///
    /// Note that this function is susceptible to spurious wakeups. Condition
    /// variables normally have a boolean predicate associated with them, and
    /// the predicate must always be checked each time this function returns to
    /// protect against spurious wakeups.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MutexMismatch`] if this condvar was waited on with
    /// another mutex before, or [`Error::Wait`] if the platform reports a
    /// failure. The lock is released in both cases.
    ///
    /// [`notify_one`]: Self::notify_one
    /// [`notify_all`]: Self::notify_all
    pub fn wait<'a, T: ?Sized>(self: Pin<&Self>, guard: MutexGuard<'a, T>) -> Result<MutexGuard<'a, T>> {
        self.bind(&guard)?;
        let (guard, ()) = guard.map(|guard| {
            let guard = unsafe { self.inner().wait(guard) }.map_err(Error::Wait)?;
            Ok((guard, ()))
        })?;
        Ok(guard)
    }

    /// Blocks the current thread until this condition variable receives a
    /// notification and the provided condition is false.
    ///
    /// # Errors
    ///
    /// As [`wait`](Self::wait).
    pub fn wait_while<'a, T, F>(
        self: Pin<&Self>,
        mut guard: MutexGuard<'a, T>,
        mut condition: F,
    ) -> Result<MutexGuard<'a, T>>
    where
        T: ?Sized,
        F: FnMut(&mut T) -> bool,
    {
        while condition(&mut *guard) {
            guard = self.wait(guard)?;
        }
        Ok(guard)
    }

    /// Waits on this condition variable for a notification, timing out after a
    /// specified duration.
    ///
    /// The semantics of this function are equivalent to [`wait`] except that
    /// the thread will be blocked for roughly no longer than `dur`, and never
    /// reports a time out before `dur` has elapsed. The time waited is measured
    /// with a monotonic clock where the platform allows it.
    ///
    /// The returned [`WaitTimeoutResult`] value indicates if the timeout is
    /// known to have elapsed. Like [`wait`], the lock specified will be
    /// re-acquired when this function returns, regardless of whether the
    /// timeout elapsed or not.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MutexMismatch`] if this condvar was waited on with
    /// another mutex before, or [`Error::TimedWait`] if the platform reports
    /// anything but a wake up or a time out.
    ///
    /// [`wait`]: Self::wait
    pub fn wait_timeout<'a, T: ?Sized>(
        self: Pin<&Self>,
        guard: MutexGuard<'a, T>,
        dur: Duration,
    ) -> Result<(MutexGuard<'a, T>, WaitTimeoutResult)> {
        self.bind(&guard)?;
        let (guard, woken) = guard.map(|guard| {
            let (woken, guard) =
                unsafe { self.inner().wait_timeout(guard, dur) }.map_err(Error::TimedWait)?;
            Ok((guard, woken))
        })?;
        Ok((guard, WaitTimeoutResult(!woken)))
    }

    /// [`wait_timeout`](Self::wait_timeout) with the timeout in milliseconds.
    #[inline]
    pub fn wait_timeout_ms<'a, T: ?Sized>(
        self: Pin<&Self>,
        guard: MutexGuard<'a, T>,
        ms: u32,
    ) -> Result<(MutexGuard<'a, T>, WaitTimeoutResult)> {
        self.wait_timeout(guard, Duration::from_millis(u64::from(ms)))
    }

    /// Waits on this condition variable for a notification, timing out after a
    /// specified duration.
    ///
    /// The semantics of this function are equivalent to [`wait_while`] except
    /// that the thread will be blocked for roughly no longer than `dur` in
    /// total, across spurious wake ups.
    ///
    /// The returned [`WaitTimeoutResult`] value indicates if the timeout is
    /// known to have elapsed without the condition being met.
    ///
    /// [`wait_while`]: Self::wait_while
    pub fn wait_timeout_while<'a, T, F>(
        self: Pin<&Self>,
        mut guard: MutexGuard<'a, T>,
        dur: Duration,
        mut condition: F,
    ) -> Result<(MutexGuard<'a, T>, WaitTimeoutResult)>
    where
        T: ?Sized,
        F: FnMut(&mut T) -> bool,
    {
        let start = Instant::now();
        loop {
            if !condition(&mut *guard) {
                return Ok((guard, WaitTimeoutResult(false)));
            }
            let timeout = match dur.checked_sub(start.elapsed()) {
                Some(timeout) => timeout,
                None => return Ok((guard, WaitTimeoutResult(true))),
            };
            guard = self.wait_timeout(guard, timeout)?.0;
        }
    }

    /// Binds this condvar to the guard's mutex on first use.
    fn bind<T: ?Sized>(&self, guard: &MutexGuard<'_, T>) -> Result<()> {
        let addr = guard.mutex_addr();
        match self.mutex.compare_exchange(0, addr, SeqCst, SeqCst) {
            Ok(_) => Ok(()),
            Err(bound) if bound == addr => Ok(()),
            Err(_) => Err(Error::MutexMismatch),
        }
    }

    #[inline]
    fn inner(self: Pin<&Self>) -> Pin<&sys::Condvar> {
        unsafe { self.map_unchecked(|this| &this.inner) }
    }
}

impl fmt::Debug for Condvar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Condvar").finish_non_exhaustive()
    }
}
