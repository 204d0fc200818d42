use pinned_thread::thread::{self, Builder, ThreadId};
use pinned_thread::{Error, ErrorKind, Thread};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::channel;
use std::sync::Arc;
use std::time::Duration;

#[test]
fn join_returns_status() {
    let t = Thread::spawn("status", || 42).unwrap();
    assert_eq!(t.name(), "status");
    assert_eq!(t.join().unwrap(), 42);
}

#[test]
fn join_waits_for_completion() {
    let done = Arc::new(AtomicBool::new(false));
    let done2 = done.clone();
    let t = Thread::spawn("slow", move || {
        std::thread::sleep(Duration::from_millis(20));
        done2.store(true, Ordering::SeqCst);
        -1
    })
    .unwrap();
    assert_eq!(t.join().unwrap(), -1);
    assert!(done.load(Ordering::SeqCst));
}

#[test]
fn user_data_is_moved_in() {
    let data = vec![1, 2, 3, 4];
    let t = Thread::spawn("sum", move || data.iter().sum()).unwrap();
    assert_eq!(t.join().unwrap(), 10);
}

#[test]
fn panic_is_reported() {
    let t = Thread::spawn("doomed", || panic!("boom")).unwrap();
    match t.join() {
        Err(e @ Error::Panicked { .. }) => {
            assert_eq!(e.kind(), ErrorKind::Panicked);
            if let Error::Panicked { name, message } = e {
                assert_eq!(name, "doomed");
                assert_eq!(message, "boom");
            }
        }
        other => panic!("join returned {:?}", other),
    }
}

#[test]
fn interior_nul_in_name_is_rejected() {
    match Thread::spawn("bad\0name", || 0) {
        Err(e @ Error::Spawn(_)) => assert_eq!(e.kind(), ErrorKind::Resource),
        other => panic!("spawn returned {:?}", other),
    }
}

#[test]
fn long_names_are_accepted() {
    let t = Thread::spawn("a-rather-long-thread-name-for-the-kernel", || 3).unwrap();
    assert_eq!(t.join().unwrap(), 3);
}

#[test]
fn builder_stack_size() {
    let t = Builder::new("small-stack")
        .stack_size(1)
        .spawn(|| {
            let buf = [7u8; 1024];
            buf.iter().map(|&b| i32::from(b)).sum()
        })
        .unwrap();
    assert_eq!(t.join().unwrap(), 7 * 1024);

    let t = Builder::new("big-stack")
        .stack_size(4 * 1024 * 1024 + 1)
        .spawn(|| 1)
        .unwrap();
    assert_eq!(t.join().unwrap(), 1);
}

#[test]
fn dropped_handle_detaches() {
    let (tx, rx) = channel();
    let t = Thread::spawn("detached", move || {
        tx.send(thread::current_id()).unwrap();
        0
    })
    .unwrap();
    drop(t);
    let id = rx.recv().unwrap();
    assert_ne!(id, thread::current_id());
}

#[test]
fn ids_are_stable_and_distinct() {
    let me = thread::current_id();
    assert_eq!(me, thread::current_id());

    let (tx, rx) = channel();
    let workers: Vec<_> = (0..8)
        .map(|i| {
            let tx = tx.clone();
            Thread::spawn(&format!("id-{}", i), move || {
                let id = thread::current_id();
                assert_eq!(id, thread::current_id());
                tx.send(id).unwrap();
                0
            })
            .unwrap()
        })
        .collect();
    drop(tx);
    for t in workers {
        t.join().unwrap();
    }

    let mut seen: HashSet<ThreadId> = rx.iter().collect();
    assert_eq!(seen.len(), 8);
    assert!(seen.insert(me));
}

#[test]
fn huge_stack_size_is_a_spawn_error() {
    match Builder::new("huge").stack_size(usize::MAX).spawn(|| 0) {
        Err(e @ Error::Spawn(_)) => assert_eq!(e.kind(), ErrorKind::Resource),
        other => panic!("spawn returned {:?}", other),
    }
}

#[test]
#[cfg(any(all(target_os = "linux", target_env = "gnu"), target_os = "macos"))]
fn joining_own_handle_is_an_error() {
    let (handle_tx, handle_rx) = channel::<Thread>();
    let (result_tx, result_rx) = channel();
    let t = Thread::spawn("self-join", move || {
        let me = handle_rx.recv().unwrap();
        let failed = matches!(me.join(), Err(Error::Join(_)));
        result_tx.send(failed).unwrap();
        0
    })
    .unwrap();
    handle_tx.send(t).unwrap();
    assert!(result_rx.recv_timeout(Duration::from_secs(10)).unwrap());
}
