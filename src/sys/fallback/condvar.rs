use super::ignore_poison;
use super::mutex::MutexGuard;
use crate::sys_common::init_assert::InitAssert;
use std::convert::Infallible;
use std::io;
use std::pin::Pin;
use std::sync;
use std::time::Duration;

pub struct Condvar {
    inner: InitAssert<sync::Condvar>,
}

unsafe impl Send for Condvar {}
unsafe impl Sync for Condvar {}

impl Condvar {
    #[inline]
    pub const fn uninit() -> Self {
        Self {
            inner: InitAssert::new(),
        }
    }

    #[inline]
    pub fn init(self: Pin<&Self>) -> io::Result<()> {
        self.inner
            .init(|| Ok::<_, Infallible>(sync::Condvar::new()))
            .map_err(|never| match never {})
    }

    #[inline]
    pub fn notify_one(self: Pin<&Self>) -> io::Result<()> {
        self.inner.get_ref().notify_one();
        Ok(())
    }

    #[inline]
    pub fn notify_all(self: Pin<&Self>) -> io::Result<()> {
        self.inner.get_ref().notify_all();
        Ok(())
    }

    /// # Safety
    ///
    /// A condvar must always be waited on with the same mutex.
    #[inline]
    pub unsafe fn wait<'a>(self: Pin<&Self>, guard: MutexGuard<'a>) -> io::Result<MutexGuard<'a>> {
        Ok(MutexGuard(ignore_poison(self.inner.get_ref().wait(guard.0))))
    }

    /// Returns `true` if woken before the timeout.
    ///
    /// # Safety
    ///
    /// A condvar must always be waited on with the same mutex.
    #[inline]
    pub unsafe fn wait_timeout<'a>(
        self: Pin<&Self>,
        guard: MutexGuard<'a>,
        dur: Duration,
    ) -> io::Result<(bool, MutexGuard<'a>)> {
        let (guard, r) = ignore_poison(self.inner.get_ref().wait_timeout(guard.0, dur));
        Ok((!r.timed_out(), MutexGuard(guard)))
    }
}
