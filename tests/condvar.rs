use pinned_thread::{Condvar, Error, Mutex, Thread};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

#[test]
fn smoke() {
    let c = Condvar::boxed().unwrap();
    c.as_ref().notify_one().unwrap();
    c.as_ref().notify_all().unwrap();
}

#[test]
#[cfg_attr(target_os = "emscripten", ignore)]
fn notify_one() {
    let m = Mutex::arc(()).unwrap();
    let m2 = m.clone();
    let c = Condvar::arc().unwrap();
    let c2 = c.clone();

    let g = m.as_ref().lock().unwrap();
    let _t = thread::spawn(move || {
        let _g = m2.as_ref().lock().unwrap();
        c2.as_ref().notify_one().unwrap();
    });
    let g = c.as_ref().wait(g).unwrap();
    drop(g);
}

#[test]
#[cfg_attr(target_os = "emscripten", ignore)]
fn notify_all() {
    const N: usize = 10;

    let m = Mutex::arc(0).unwrap();
    let c = Condvar::arc().unwrap();
    let (tx, rx) = channel();
    for _ in 0..N {
        let m = m.clone();
        let c = c.clone();
        let tx = tx.clone();
        thread::spawn(move || {
            let mut cnt = m.as_ref().lock().unwrap();
            *cnt += 1;
            if *cnt == N {
                tx.send(()).unwrap();
            }
            while *cnt != 0 {
                cnt = c.as_ref().wait(cnt).unwrap();
            }
            tx.send(()).unwrap();
        });
    }
    drop(tx);

    rx.recv().unwrap();
    let mut cnt = m.as_ref().lock().unwrap();
    *cnt = 0;
    c.as_ref().notify_all().unwrap();
    drop(cnt);

    // Every waiter must be released by the single broadcast.
    for _ in 0..N {
        match rx.recv_timeout(Duration::from_secs(10)) {
            Ok(()) => {}
            Err(RecvTimeoutError::Timeout) => panic!("a waiter was not woken by notify_all"),
            Err(RecvTimeoutError::Disconnected) => panic!("a waiter exited early"),
        }
    }
}

#[test]
#[cfg_attr(target_os = "emscripten", ignore)]
fn wait_while() {
    let m = Mutex::arc(false).unwrap();
    let m2 = m.clone();
    let c = Condvar::arc().unwrap();
    let c2 = c.clone();

    // Inside of our lock, spawn a new thread, and then wait for it to start.
    thread::spawn(move || {
        let mut started = m2.as_ref().lock().unwrap();
        *started = true;
        // We notify the condvar that the value has changed.
        c2.as_ref().notify_one().unwrap();
    });

    // Wait for the thread to start up.
    let guard = c
        .as_ref()
        .wait_while(m.as_ref().lock().unwrap(), |started| !*started);
    assert!(*guard.unwrap());
}

#[test]
#[cfg_attr(target_os = "emscripten", ignore)]
fn wait_timeout_wait() {
    let m = Mutex::arc(()).unwrap();
    let c = Condvar::arc().unwrap();

    loop {
        let g = m.as_ref().lock().unwrap();
        let (_g, no_timeout) = c
            .as_ref()
            .wait_timeout(g, Duration::from_millis(1))
            .unwrap();
        // spurious wakeups mean this isn't necessarily true
        // so execute test again, if not timeout
        if !no_timeout.timed_out() {
            continue;
        }

        break;
    }
}

#[test]
#[cfg_attr(target_os = "emscripten", ignore)]
fn wait_timeout_not_before_deadline() {
    const DUR: Duration = Duration::from_millis(50);

    let m = Mutex::boxed(()).unwrap();
    let c = Condvar::boxed().unwrap();

    loop {
        let start = Instant::now();
        let (_g, res) = c
            .as_ref()
            .wait_timeout(m.as_ref().lock().unwrap(), DUR)
            .unwrap();
        if !res.timed_out() {
            continue;
        }
        assert!(start.elapsed() >= DUR);
        break;
    }
}

#[test]
#[cfg_attr(target_os = "emscripten", ignore)]
fn wait_timeout_total_bound_and_ms() {
    let m = Mutex::boxed(()).unwrap();
    let c = Condvar::boxed().unwrap();

    let start = Instant::now();
    let (g, res) = c
        .as_ref()
        .wait_timeout_while(m.as_ref().lock().unwrap(), Duration::from_millis(20), |_| true)
        .unwrap();
    assert!(res.timed_out());
    assert!(start.elapsed() >= Duration::from_millis(20));
    drop(g);

    loop {
        let start = Instant::now();
        let (g, res) = c
            .as_ref()
            .wait_timeout_ms(m.as_ref().lock().unwrap(), 5)
            .unwrap();
        drop(g);
        // spurious wakeups mean this isn't necessarily true
        if !res.timed_out() {
            continue;
        }
        assert!(start.elapsed() >= Duration::from_millis(5));
        break;
    }

    let (g, res) = c
        .as_ref()
        .wait_timeout_ms(m.as_ref().lock().unwrap(), 0)
        .unwrap();
    drop(g);
    assert!(res.timed_out());
}

#[test]
#[cfg_attr(target_os = "emscripten", ignore)]
fn wait_timeout_while_wait() {
    let m = Mutex::arc(()).unwrap();
    let c = Condvar::arc().unwrap();

    let g = m.as_ref().lock().unwrap();
    let (_g, wait) = c
        .as_ref()
        .wait_timeout_while(g, Duration::from_millis(1), |_| true)
        .unwrap();
    // no spurious wakeups. ensure it timed-out
    assert!(wait.timed_out());
}

#[test]
#[cfg_attr(target_os = "emscripten", ignore)]
fn wait_timeout_while_instant_satisfy() {
    let m = Mutex::arc(()).unwrap();
    let c = Condvar::arc().unwrap();

    let g = m.as_ref().lock().unwrap();
    let (_g, wait) = c
        .as_ref()
        .wait_timeout_while(g, Duration::from_millis(0), |_| false)
        .unwrap();
    // ensure it didn't time-out even if we were not given any time.
    assert!(!wait.timed_out());
}

#[test]
#[cfg_attr(target_os = "emscripten", ignore)]
fn wait_timeout_while_wake() {
    let m = Mutex::arc(false).unwrap();
    let m2 = m.clone();
    let c = Condvar::arc().unwrap();
    let c2 = c.clone();

    let g = m.as_ref().lock().unwrap();
    let _t = thread::spawn(move || {
        let mut started = m2.as_ref().lock().unwrap();
        thread::sleep(Duration::from_millis(1));
        *started = true;
        c2.as_ref().notify_one().unwrap();
    });
    let (g2, wait) = c
        .as_ref()
        .wait_timeout_while(g, Duration::from_millis(u64::MAX), |&mut notified| {
            !notified
        })
        .unwrap();
    // ensure it didn't time-out even if we were not given any time.
    assert!(!wait.timed_out());
    assert!(*g2);
}

#[test]
#[cfg_attr(target_os = "emscripten", ignore)]
fn wait_timeout_wake() {
    let m = Mutex::arc(0).unwrap();
    let c = Condvar::arc().unwrap();

    loop {
        let g = m.as_ref().lock().unwrap();

        let c2 = c.clone();
        let m2 = m.clone();

        let notified = Arc::new(AtomicBool::new(false));
        let notified_copy = notified.clone();

        let t = Thread::spawn("signaler", move || {
            let mut g = m2.as_ref().lock().unwrap();
            thread::sleep(Duration::from_millis(1));
            *g = 42;
            notified_copy.store(true, Ordering::SeqCst);
            c2.as_ref().notify_one().unwrap();
            0
        })
        .unwrap();
        let (g, timeout_res) = c
            .as_ref()
            .wait_timeout(g, Duration::from_millis(u64::MAX))
            .unwrap();
        assert!(!timeout_res.timed_out());
        // spurious wakeups mean this isn't necessarily true
        // so execute test again, if not notified
        if !notified.load(Ordering::SeqCst) {
            drop(g);
            t.join().unwrap();
            continue;
        }
        // The write made under the lock before signaling is visible.
        assert_eq!(*g, 42);
        drop(g);

        t.join().unwrap();

        break;
    }
}

#[test]
#[cfg(debug_assertions)]
fn holder_restored_after_wait() {
    let m = Mutex::arc(false).unwrap();
    let m2 = m.clone();
    let c = Condvar::arc().unwrap();
    let c2 = c.clone();

    let t = Thread::spawn("setter", move || {
        let mut g = m2.as_ref().lock().unwrap();
        // The waiter released the mutex, so it is ours now.
        let held = m2.as_ref().is_held();
        *g = true;
        c2.as_ref().notify_one().unwrap();
        held as i32
    })
    .unwrap();

    let g = c
        .as_ref()
        .wait_while(m.as_ref().lock().unwrap(), |set| !*set)
        .unwrap();
    assert!(m.as_ref().is_held());
    drop(g);
    assert!(!m.as_ref().is_held());
    assert_eq!(t.join().unwrap(), 1);

    let (g, _) = c
        .as_ref()
        .wait_timeout(m.as_ref().lock().unwrap(), Duration::from_millis(1))
        .unwrap();
    assert!(m.as_ref().is_held());
    drop(g);
}

#[test]
fn two_mutexes() {
    let m = Mutex::arc(()).unwrap();
    let m2 = m.clone();
    let c = Condvar::arc().unwrap();
    let c2 = c.clone();

    let mut g = m.as_ref().lock().unwrap();
    let _t = thread::spawn(move || {
        let _g = m2.as_ref().lock().unwrap();
        c2.as_ref().notify_one().unwrap();
    });
    g = c.as_ref().wait(g).unwrap();
    drop(g);

    let m = Mutex::boxed(()).unwrap();
    match c.as_ref().wait(m.as_ref().lock().unwrap()) {
        Err(Error::MutexMismatch) => {}
        other => panic!("waiting with a second mutex returned {:?}", other.map(|_| ())),
    }
    // The rejected guard was released.
    assert!(m.as_ref().try_lock().unwrap().is_some());
}
