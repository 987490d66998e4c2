pub(crate) mod debug;

pub(crate) use debug::{debug_log, info, set_debug, set_quiet, warn};
