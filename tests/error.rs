use pinned_thread::fatal::OrAbort;
use pinned_thread::{Condvar, Error, ErrorKind, Mutex};
use std::io;

fn os_error() -> io::Error {
    io::Error::from_raw_os_error(22)
}

#[test]
fn kinds() {
    assert_eq!(Error::Spawn(os_error()).kind(), ErrorKind::Resource);
    assert_eq!(Error::MutexInit(os_error()).kind(), ErrorKind::Resource);
    assert_eq!(Error::CondInit(os_error()).kind(), ErrorKind::Resource);

    for e in [
        Error::Join(os_error()),
        Error::Lock(os_error()),
        Error::Unlock(os_error()),
        Error::Wait(os_error()),
        Error::TimedWait(os_error()),
        Error::Signal(os_error()),
        Error::Broadcast(os_error()),
        Error::MutexMismatch,
    ] {
        assert_eq!(e.kind(), ErrorKind::Invariant, "{}", e);
    }

    let panicked = Error::Panicked {
        name: "t".to_owned(),
        message: "boom".to_owned(),
    };
    assert_eq!(panicked.kind(), ErrorKind::Panicked);
}

#[test]
fn display_carries_platform_error() {
    let e = Error::Lock(os_error());
    let text = e.to_string();
    assert!(text.starts_with("could not lock mutex: "), "{}", text);
    assert!(text.ends_with(&os_error().to_string()), "{}", text);
    assert!(std::error::Error::source(&e).is_some());
}

#[test]
fn or_abort_passes_values_through() {
    let m = Mutex::boxed(1).or_abort();
    let c = Condvar::boxed().or_abort();
    let mut g = m.as_ref().lock().or_abort();
    *g += 1;
    c.as_ref().notify_all().or_abort();
    g.unlock().or_abort();
    assert_eq!(*m.as_ref().lock().or_abort(), 2);
}
