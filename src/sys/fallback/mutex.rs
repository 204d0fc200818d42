use super::{ignore_poison, try_ignore_poison};
use crate::sys_common::init_assert::InitAssert;
use std::convert::Infallible;
use std::io;
use std::pin::Pin;
use std::sync;

pub struct Mutex {
    mutex: InitAssert<sync::Mutex<()>>,
}

unsafe impl Send for Mutex {}
unsafe impl Sync for Mutex {}

impl Mutex {
    #[inline]
    pub const fn uninit() -> Self {
        Self {
            mutex: InitAssert::new(),
        }
    }

    pub fn init(self: Pin<&Self>) -> io::Result<()> {
        self.mutex
            .init(|| Ok::<_, Infallible>(sync::Mutex::new(())))
            .map_err(|never| match never {})
    }

    #[inline]
    pub fn try_lock(self: Pin<&Self>) -> io::Result<Option<MutexGuard>> {
        Ok(try_ignore_poison(self.get_ref().mutex.get_ref().try_lock()).map(MutexGuard))
    }

    #[inline]
    pub fn lock(self: Pin<&Self>) -> io::Result<MutexGuard> {
        Ok(MutexGuard(ignore_poison(self.get_ref().mutex.get_ref().lock())))
    }
}

pub struct MutexGuard<'a>(pub(super) sync::MutexGuard<'a, ()>);

impl MutexGuard<'_> {
    #[inline]
    pub fn unlock(self) -> io::Result<()> {
        drop(self);
        Ok(())
    }
}
