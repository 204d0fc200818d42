use super::cvt_nz;
use crate::sys::ThreadMain;
use crate::sys_common::panic_message;
use std::cmp;
use std::ffi::{CStr, CString};
use std::io;
use std::mem::{self, MaybeUninit};
use std::panic::{self, AssertUnwindSafe};
use std::ptr;
use std::sync::{Arc, OnceLock};

const MIN_STACK_SIZE: usize = 64 * 1024;

/// Exit status, or the panic message of a thread that unwound.
type Packet = Arc<OnceLock<Result<i32, String>>>;

struct Start {
    name: CString,
    packet: Packet,
    main: ThreadMain,
}

pub struct Thread {
    id: libc::pthread_t,
    packet: Packet,
}

// `pthread_t` is a raw pointer on some platforms.
unsafe impl Send for Thread {}
unsafe impl Sync for Thread {}

impl Thread {
    pub fn spawn(name: &str, stack_size: Option<usize>, main: ThreadMain) -> io::Result<Thread> {
        let name = CString::new(name)?;
        let packet: Packet = Arc::new(OnceLock::new());
        let start = Box::new(Start {
            name,
            packet: packet.clone(),
            main,
        });

        unsafe {
            let mut attr = MaybeUninit::<libc::pthread_attr_t>::uninit();
            cvt_nz(libc::pthread_attr_init(attr.as_mut_ptr()))?;
            let attr = PthreadAttr(&mut attr);
            if let Some(size) = stack_size {
                set_stack_size(attr.0.as_mut_ptr(), size)?;
            }

            let mut id = MaybeUninit::<libc::pthread_t>::uninit();
            let arg = Box::into_raw(start);
            match cvt_nz(libc::pthread_create(
                id.as_mut_ptr(),
                attr.0.as_ptr(),
                thread_start,
                arg as *mut libc::c_void,
            )) {
                Ok(()) => Ok(Thread {
                    id: id.assume_init(),
                    packet,
                }),
                Err(e) => {
                    // The thread never started, so the start data is still ours.
                    drop(Box::from_raw(arg));
                    Err(e)
                }
            }
        }
    }

    pub fn join(self) -> io::Result<Result<i32, String>> {
        let (id, packet) = unsafe {
            let id = self.id;
            let packet = ptr::read(&self.packet);
            mem::forget(self);
            (id, packet)
        };

        if let Err(e) = unsafe { cvt_nz(libc::pthread_join(id, ptr::null_mut())) } {
            // Not joined, so hand the thread back to the system.
            unsafe { libc::pthread_detach(id) };
            return Err(e);
        }
        packet.get().cloned().ok_or_else(|| {
            io::Error::new(io::ErrorKind::Other, "thread exited without a status")
        })
    }
}

impl Drop for Thread {
    fn drop(&mut self) {
        let result = unsafe { libc::pthread_detach(self.id) };
        debug_assert_eq!(result, 0);
    }
}

extern "C" fn thread_start(arg: *mut libc::c_void) -> *mut libc::c_void {
    let Start { name, packet, main } = *unsafe { Box::from_raw(arg as *mut Start) };
    set_name(&name);
    let result = panic::catch_unwind(AssertUnwindSafe(main)).map_err(|p| panic_message(&*p));
    let _ = packet.set(result);
    ptr::null_mut()
}

unsafe fn set_stack_size(attr: *mut libc::pthread_attr_t, size: usize) -> io::Result<()> {
    let size = cmp::max(size, MIN_STACK_SIZE);
    match libc::pthread_attr_setstacksize(attr, size) {
        0 => Ok(()),
        libc::EINVAL => {
            // Some platforms only accept multiples of the page size.
            let page = libc::sysconf(libc::_SC_PAGESIZE);
            if page <= 0 {
                return Err(io::Error::from_raw_os_error(libc::EINVAL));
            }
            let page = page as usize;
            let size = match size.checked_add(page - 1) {
                Some(size) => size & !(page - 1),
                None => return Err(io::Error::from_raw_os_error(libc::EINVAL)),
            };
            cvt_nz(libc::pthread_attr_setstacksize(attr, size))
        }
        error => Err(io::Error::from_raw_os_error(error)),
    }
}

cfg_if::cfg_if! {
    if #[cfg(any(target_os = "linux", target_os = "android"))] {
        fn set_name(name: &CStr) {
            // The kernel keeps 15 bytes plus the terminator.
            const TASK_COMM_LEN: usize = 16;
            let bytes = name.to_bytes();
            let len = cmp::min(bytes.len(), TASK_COMM_LEN - 1);
            let mut buf = [0u8; TASK_COMM_LEN];
            buf[..len].copy_from_slice(&bytes[..len]);
            unsafe {
                libc::pthread_setname_np(libc::pthread_self(), buf.as_ptr() as *const libc::c_char);
            }
        }
    } else if #[cfg(any(target_os = "macos", target_os = "ios"))] {
        fn set_name(name: &CStr) {
            unsafe {
                libc::pthread_setname_np(name.as_ptr());
            }
        }
    } else {
        fn set_name(_: &CStr) {}
    }
}

struct PthreadAttr<'a>(&'a mut MaybeUninit<libc::pthread_attr_t>);

impl Drop for PthreadAttr<'_> {
    fn drop(&mut self) {
        unsafe {
            let result = libc::pthread_attr_destroy(self.0.as_mut_ptr());
            debug_assert_eq!(result, 0);
        }
    }
}
