use std::sync::atomic::{AtomicBool, Ordering};

static DEBUG: AtomicBool = AtomicBool::new(false);
static QUIET: AtomicBool = AtomicBool::new(false);

pub(crate) fn set_debug(enabled: bool) {
    DEBUG.store(enabled, Ordering::Relaxed);
}

pub(crate) fn debug_enabled() -> bool {
    DEBUG.load(Ordering::Relaxed)
}

/// Suppress progress and warning lines (statusline / JSON output)
pub(crate) fn set_quiet(enabled: bool) {
    QUIET.store(enabled, Ordering::Relaxed);
}

pub(crate) fn debug_log(msg: &str) {
    if debug_enabled() {
        eprintln!("[debug] {msg}");
    }
}

pub(crate) fn warn(msg: &str) {
    if !QUIET.load(Ordering::Relaxed) {
        eprintln!("Warning: {msg}");
    }
}

pub(crate) fn info(msg: &str) {
    if !QUIET.load(Ordering::Relaxed) {
        eprintln!("{msg}");
    }
}
