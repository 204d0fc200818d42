#![allow(dead_code)]

use std::cell::UnsafeCell;
use std::mem::MaybeUninit;
use std::ptr;
use std::sync::atomic::{AtomicIsize, Ordering::*};

const UNINIT: isize = 0;
const INIT_IN_PROGRESS: isize = -1;
const INIT: isize = 1;

/// Storage for a platform object that is created after the owner has been
/// pinned.
///
/// Using the object before a successful initialization, or initializing it
/// twice, panics. A failed initialization leaves the storage uninitialized.
pub struct InitAssert<T = ()> {
    state: AtomicIsize,
    data: UnsafeCell<MaybeUninit<T>>,
}

impl<T> InitAssert<T> {
    pub const fn new() -> Self {
        Self {
            state: AtomicIsize::new(UNINIT),
            data: UnsafeCell::new(MaybeUninit::uninit()),
        }
    }

    #[inline]
    pub fn init<F, E>(&self, f: F) -> Result<(), E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        unsafe {
            self.init_with(|p| {
                p.write(f()?);
                Ok(())
            })
        }
    }

    /// # Safety
    ///
    /// `f` must either fully initialize the pointee and return `Ok`, or return
    /// `Err` leaving nothing that needs to be dropped.
    #[inline]
    pub unsafe fn init_with<F, E>(&self, f: F) -> Result<(), E>
    where
        F: FnOnce(*mut T) -> Result<(), E>,
    {
        assert_eq!(
            self.state.swap(INIT_IN_PROGRESS, Acquire),
            UNINIT,
            "primitive initialized twice"
        );
        match f((*self.data.get()).as_mut_ptr()) {
            Ok(()) => {
                self.state.store(INIT, Release);
                Ok(())
            }
            Err(e) => {
                self.state.store(UNINIT, Release);
                Err(e)
            }
        }
    }

    #[inline]
    pub fn is_init(&self) -> bool {
        self.state.load(Acquire) == INIT
    }

    #[inline]
    pub fn get_ref(&self) -> &T {
        unsafe { &*self.get() }
    }

    #[inline]
    pub fn get(&self) -> *mut T {
        assert_eq!(self.state.load(Acquire), INIT, "primitive used before init");
        self.data.get() as *mut T
    }
}

impl<T> Drop for InitAssert<T> {
    #[inline]
    fn drop(&mut self) {
        if self.is_init() {
            unsafe { ptr::drop_in_place((*self.data.get()).as_mut_ptr()) };
        }
    }
}
