// This file is part of the ecgen package.
//
// For the full copyright and license information, please view the LICENSE
// file that was distributed with this source code.

//! Progress logging, to stderr or to a file.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Mutex, OnceLock};

static LEVEL: AtomicU8 = AtomicU8::new(0);
static SINK: OnceLock<Mutex<Box<dyn Write + Send>>> = OnceLock::new();

/// Set the verbosity level and an optional log file. Called once, before the
/// engine starts; later calls to a sink that was never set fall back to
/// stderr.
pub fn init(level: u8, log: Option<&Path>) -> io::Result<()> {
    LEVEL.store(level, Ordering::Relaxed);
    if let Some(path) = log {
        let file = File::create(path)?;
        let _ = SINK.set(Mutex::new(Box::new(file)));
    }
    Ok(())
}

pub fn enabled() -> bool {
    LEVEL.load(Ordering::Relaxed) > 0
}

pub fn log_line(args: std::fmt::Arguments) {
    match SINK.get() {
        Some(sink) => {
            let mut w = sink.lock().unwrap();
            let _ = writeln!(w, "{args}");
        }
        None => eprintln!("{args}"),
    }
}

/// Log a progress line when `--verbose` was given.
#[macro_export]
macro_rules! verbose {
    ($($arg:tt)+) => {
        if $crate::verbose::enabled() {
            $crate::verbose::log_line(format_args!($($arg)+));
        }
    };
}
