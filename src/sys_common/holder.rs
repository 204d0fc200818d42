//! Which thread holds a mutex, for assertions.
//!
//! Only the holding thread writes, and a thread only ever compares the value
//! against its own id, so relaxed ordering is enough. Without
//! `debug_assertions` or the `track-holder` feature this is a zero-sized no-op.

cfg_if::cfg_if! {
    if #[cfg(any(debug_assertions, feature = "track-holder"))] {
        use crate::thread;
        use std::sync::atomic::{AtomicU64, Ordering::Relaxed};

        const UNHELD: u64 = 0;

        pub struct Holder(AtomicU64);

        impl Holder {
            #[inline]
            pub const fn new() -> Self {
                Self(AtomicU64::new(UNHELD))
            }

            #[inline]
            pub fn acquired(&self) {
                self.0.store(thread::current_id().as_u64().get(), Relaxed);
            }

            #[inline]
            pub fn released(&self) {
                self.0.store(UNHELD, Relaxed);
            }

            #[inline]
            pub fn is_current(&self) -> bool {
                self.0.load(Relaxed) == thread::current_id().as_u64().get()
            }
        }
    } else {
        pub struct Holder;

        impl Holder {
            #[inline]
            pub const fn new() -> Self {
                Self
            }

            #[inline]
            pub fn acquired(&self) {}

            #[inline]
            pub fn released(&self) {}
        }
    }
}
