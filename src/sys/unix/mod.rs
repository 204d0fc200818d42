pub mod condvar;
pub mod mutex;
pub mod thread;

use std::io;

pub fn cvt_nz(error: libc::c_int) -> io::Result<()> {
    if error == 0 {
        Ok(())
    } else {
        Err(io::Error::from_raw_os_error(error))
    }
}
