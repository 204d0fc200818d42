use super::cvt_nz;
use crate::fatal;
use crate::sys_common::init_assert::InitAssert;
use crate::Error;
use std::io;
use std::marker::{PhantomData, PhantomPinned};
use std::mem::{self, MaybeUninit};
use std::pin::Pin;

// Error checking turns relocking and foreign unlocks into reported errors
// instead of deadlocks or undefined behaviour.
#[cfg(debug_assertions)]
const MUTEX_TYPE: libc::c_int = libc::PTHREAD_MUTEX_ERRORCHECK;
#[cfg(not(debug_assertions))]
const MUTEX_TYPE: libc::c_int = libc::PTHREAD_MUTEX_NORMAL;

pub struct Mutex {
    lock: InitAssert<libc::pthread_mutex_t>,
    _p: PhantomPinned,
}

unsafe impl Send for Mutex {}
unsafe impl Sync for Mutex {}

impl Mutex {
    #[inline]
    pub const fn uninit() -> Self {
        Self {
            lock: InitAssert::new(),
            _p: PhantomPinned,
        }
    }

    pub fn init(self: Pin<&Self>) -> io::Result<()> {
        unsafe {
            self.lock.init_with(|p| {
                let mut attr = MaybeUninit::<libc::pthread_mutexattr_t>::uninit();

                cvt_nz(libc::pthread_mutexattr_init(attr.as_mut_ptr()))?;
                let attr = PthreadMutexAttr(&mut attr);
                cvt_nz(libc::pthread_mutexattr_settype(attr.0.as_mut_ptr(), MUTEX_TYPE))?;
                cvt_nz(libc::pthread_mutex_init(p, attr.0.as_ptr()))
            })
        }
    }

    #[inline]
    pub fn lock(self: Pin<&Self>) -> io::Result<MutexGuard> {
        unsafe { cvt_nz(libc::pthread_mutex_lock(self.lock.get()))? };
        Ok(MutexGuard::new(self))
    }

    #[inline]
    pub fn try_lock(self: Pin<&Self>) -> io::Result<Option<MutexGuard>> {
        match unsafe { libc::pthread_mutex_trylock(self.lock.get()) } {
            0 => Ok(Some(MutexGuard::new(self))),
            libc::EBUSY => Ok(None),
            error => Err(io::Error::from_raw_os_error(error)),
        }
    }
}

impl Drop for Mutex {
    fn drop(&mut self) {
        if !self.lock.is_init() {
            return;
        }
        // A forgotten guard leaves the mutex locked, and destroying a locked
        // pthread mutex is undefined. Such a mutex is left undestroyed.
        let raw = self.lock.get();
        unsafe {
            if libc::pthread_mutex_trylock(raw) != 0 {
                return;
            }
            let result = libc::pthread_mutex_unlock(raw);
            debug_assert_eq!(result, 0);
            let result = libc::pthread_mutex_destroy(raw);
            debug_assert_eq!(result, 0);
        }
    }
}

pub struct MutexGuard<'a> {
    mutex: Pin<&'a Mutex>,
    // pthread mutexes must be unlocked by the thread that locked them.
    _not_send: PhantomData<*const ()>,
}

impl<'a> MutexGuard<'a> {
    #[inline]
    fn new(mutex: Pin<&'a Mutex>) -> Self {
        Self {
            mutex,
            _not_send: PhantomData,
        }
    }

    #[inline]
    pub fn as_raw(&self) -> *mut libc::pthread_mutex_t {
        self.mutex.lock.get()
    }

    #[inline]
    pub fn unlock(self) -> io::Result<()> {
        let raw = self.as_raw();
        mem::forget(self);
        unsafe { cvt_nz(libc::pthread_mutex_unlock(raw)) }
    }
}

impl Drop for MutexGuard<'_> {
    #[inline]
    fn drop(&mut self) {
        if let Err(e) = unsafe { cvt_nz(libc::pthread_mutex_unlock(self.as_raw())) } {
            fatal::abort(&Error::Unlock(e));
        }
    }
}

struct PthreadMutexAttr<'a>(&'a mut MaybeUninit<libc::pthread_mutexattr_t>);

impl Drop for PthreadMutexAttr<'_> {
    fn drop(&mut self) {
        unsafe {
            let result = libc::pthread_mutexattr_destroy(self.0.as_mut_ptr());
            debug_assert_eq!(result, 0);
        }
    }
}
