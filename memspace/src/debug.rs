use core::fmt::{self, Write};

use lazy_static::lazy_static;
use spin::Mutex;

pub trait DebugOutput: Send + Sync {
    fn write_str(&self, s: &str);
}

lazy_static! {
    static ref DEBUG_OUTPUT: Mutex<Option<&'static dyn DebugOutput>> = Mutex::new(None);
}

pub fn init_debug(output: &'static dyn DebugOutput) {
    *DEBUG_OUTPUT.lock() = Some(output);
}

pub fn clear_debug() {
    *DEBUG_OUTPUT.lock() = None;
}

pub fn debug_enabled() -> bool {
    DEBUG_OUTPUT.lock().is_some()
}

struct DebugWriter(&'static dyn DebugOutput);

impl fmt::Write for DebugWriter {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.0.write_str(s);
        Ok(())
    }
}

#[doc(hidden)]
pub fn _print(args: fmt::Arguments) {
    // Copied out so the sink may itself print without deadlocking.
    let output = *DEBUG_OUTPUT.lock();
    if let Some(output) = output {
        let _ = DebugWriter(output).write_fmt(args);
    }
}

#[macro_export]
macro_rules! mprintln {
    () => ($crate::mprint!("\n"));
    ($($arg:tt)*) => ($crate::mprint!("{}\n", format_args!($($arg)*)));
}

#[macro_export]
macro_rules! mprint {
    ($($arg:tt)*) => ($crate::debug::_print(format_args!($($arg)*)));
}
