use crate::sys::ThreadMain;
use crate::sys_common::panic_message;
use std::io;
use std::thread;

pub struct Thread(thread::JoinHandle<i32>);

impl Thread {
    pub fn spawn(name: &str, stack_size: Option<usize>, main: ThreadMain) -> io::Result<Thread> {
        let mut builder = thread::Builder::new().name(name.to_owned());
        if let Some(size) = stack_size {
            builder = builder.stack_size(size);
        }
        builder.spawn(main).map(Thread)
    }

    pub fn join(self) -> io::Result<Result<i32, String>> {
        Ok(self.0.join().map_err(|p| panic_message(&*p)))
    }
}
