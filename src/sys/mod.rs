cfg_if::cfg_if! {
    if #[cfg(unix)] {
        mod unix;
        pub use unix::*;
    } else {
        mod fallback;
        pub use fallback::*;
    }
}

/// Entry point of a spawned thread, returning its exit status.
pub type ThreadMain = Box<dyn FnOnce() -> i32 + Send + 'static>;
