use std::io;
use thiserror::Error;

/// Result type used by `pinned_thread`.
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A primitive could not be created. Recoverable in principle.
    Resource,
    /// A primitive reported a failure despite correct usage. The shared state
    /// it guards can no longer be trusted.
    Invariant,
    /// A joined thread panicked.
    Panicked,
}

/// Errors produced by threads, mutexes and condition variables.
///
/// The display string carries the platform error string, so it can be logged
/// as is before a fatal exit (see [`fatal`](crate::fatal)).
#[derive(Debug, Error)]
pub enum Error {
    #[error("could not create thread: {0}")]
    Spawn(#[source] io::Error),

    #[error("could not join thread: {0}")]
    Join(#[source] io::Error),

    #[error("thread {name:?} panicked: {message}")]
    Panicked { name: String, message: String },

    #[error("could not create mutex: {0}")]
    MutexInit(#[source] io::Error),

    #[error("could not lock mutex: {0}")]
    Lock(#[source] io::Error),

    #[error("could not unlock mutex: {0}")]
    Unlock(#[source] io::Error),

    #[error("could not create condition: {0}")]
    CondInit(#[source] io::Error),

    #[error("could not wait on condition: {0}")]
    Wait(#[source] io::Error),

    #[error("could not wait on condition with timeout: {0}")]
    TimedWait(#[source] io::Error),

    #[error("could not signal a condition: {0}")]
    Signal(#[source] io::Error),

    #[error("could not broadcast a condition: {0}")]
    Broadcast(#[source] io::Error),

    #[error("condition variable used with more than one mutex")]
    MutexMismatch,
}

impl Error {
    /// Whether this is a creation failure, a broken invariant or a panic.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Spawn(_) | Error::MutexInit(_) | Error::CondInit(_) => ErrorKind::Resource,
            Error::Panicked { .. } => ErrorKind::Panicked,
            Error::Join(_)
            | Error::Lock(_)
            | Error::Unlock(_)
            | Error::Wait(_)
            | Error::TimedWait(_)
            | Error::Signal(_)
            | Error::Broadcast(_)
            | Error::MutexMismatch => ErrorKind::Invariant,
        }
    }
}
