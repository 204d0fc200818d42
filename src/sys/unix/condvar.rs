use super::cvt_nz;
use super::mutex::MutexGuard;
use crate::sys_common::init_assert::InitAssert;
use std::io;
use std::marker::PhantomPinned;
use std::mem::MaybeUninit;
use std::pin::Pin;
use std::time::Duration;

const NSEC_PER_SEC: i64 = 1_000_000_000;

cfg_if::cfg_if! {
    if #[cfg(any(target_os = "macos", target_os = "ios"))] {
        // No pthread_condattr_setclock: deadlines are wall-clock.
        const CLOCK: libc::clockid_t = libc::CLOCK_REALTIME;

        unsafe fn set_clock(_: *mut libc::pthread_condattr_t) -> io::Result<()> {
            Ok(())
        }
    } else {
        const CLOCK: libc::clockid_t = libc::CLOCK_MONOTONIC;

        unsafe fn set_clock(attr: *mut libc::pthread_condattr_t) -> io::Result<()> {
            cvt_nz(libc::pthread_condattr_setclock(attr, CLOCK))
        }
    }
}

pub struct Condvar {
    cond: InitAssert<libc::pthread_cond_t>,
    _p: PhantomPinned,
}

unsafe impl Send for Condvar {}
unsafe impl Sync for Condvar {}

impl Condvar {
    #[inline]
    pub const fn uninit() -> Self {
        Self {
            cond: InitAssert::new(),
            _p: PhantomPinned,
        }
    }

    pub fn init(self: Pin<&Self>) -> io::Result<()> {
        unsafe {
            self.cond.init_with(|p| {
                let mut attr = MaybeUninit::<libc::pthread_condattr_t>::uninit();

                cvt_nz(libc::pthread_condattr_init(attr.as_mut_ptr()))?;
                let attr = PthreadCondAttr(&mut attr);
                set_clock(attr.0.as_mut_ptr())?;
                cvt_nz(libc::pthread_cond_init(p, attr.0.as_ptr()))
            })
        }
    }

    #[inline]
    pub fn notify_one(self: Pin<&Self>) -> io::Result<()> {
        unsafe { cvt_nz(libc::pthread_cond_signal(self.cond.get())) }
    }

    #[inline]
    pub fn notify_all(self: Pin<&Self>) -> io::Result<()> {
        unsafe { cvt_nz(libc::pthread_cond_broadcast(self.cond.get())) }
    }

    /// # Safety
    ///
    /// A condvar must always be waited on with the same mutex.
    #[inline]
    pub unsafe fn wait<'a>(self: Pin<&Self>, guard: MutexGuard<'a>) -> io::Result<MutexGuard<'a>> {
        cvt_nz(libc::pthread_cond_wait(self.cond.get(), guard.as_raw()))?;
        Ok(guard)
    }

    /// Returns `true` if woken before the deadline.
    ///
    /// # Safety
    ///
    /// A condvar must always be waited on with the same mutex.
    pub unsafe fn wait_timeout<'a>(
        self: Pin<&Self>,
        guard: MutexGuard<'a>,
        dur: Duration,
    ) -> io::Result<(bool, MutexGuard<'a>)> {
        let deadline = deadline(dur);
        match libc::pthread_cond_timedwait(self.cond.get(), guard.as_raw(), &deadline) {
            0 => Ok((true, guard)),
            libc::ETIMEDOUT => Ok((false, guard)),
            error => Err(io::Error::from_raw_os_error(error)),
        }
    }
}

impl Drop for Condvar {
    fn drop(&mut self) {
        if self.cond.is_init() {
            let result = unsafe { libc::pthread_cond_destroy(self.cond.get()) };
            debug_assert_eq!(result, 0);
        }
    }
}

/// `now + dur` on the condvar clock, saturating on overflow.
fn deadline(dur: Duration) -> libc::timespec {
    let mut now = MaybeUninit::<libc::timespec>::uninit();
    let now = unsafe {
        let result = libc::clock_gettime(CLOCK, now.as_mut_ptr());
        debug_assert_eq!(result, 0);
        now.assume_init()
    };

    let mut nsec = i64::from(now.tv_nsec) + i64::from(dur.subsec_nanos());
    let mut sec = i64::try_from(dur.as_secs())
        .ok()
        .and_then(|secs| i64::from(now.tv_sec).checked_add(secs));
    if nsec >= NSEC_PER_SEC {
        nsec -= NSEC_PER_SEC;
        sec = sec.and_then(|s| s.checked_add(1));
    }

    let mut deadline: libc::timespec = unsafe { std::mem::zeroed() };
    match sec.and_then(|s| libc::time_t::try_from(s).ok()) {
        Some(s) => {
            deadline.tv_sec = s;
            deadline.tv_nsec = nsec as _;
        }
        None => {
            deadline.tv_sec = libc::time_t::MAX;
            deadline.tv_nsec = (NSEC_PER_SEC - 1) as _;
        }
    }
    deadline
}

struct PthreadCondAttr<'a>(&'a mut MaybeUninit<libc::pthread_condattr_t>);

impl Drop for PthreadCondAttr<'_> {
    fn drop(&mut self) {
        unsafe {
            let result = libc::pthread_condattr_destroy(self.0.as_mut_ptr());
            debug_assert_eq!(result, 0);
        }
    }
}
