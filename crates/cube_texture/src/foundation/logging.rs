//! Logging utilities and structured logging support

pub use log::{debug, info, warn, error, trace};

/// Initialize the logging system
pub fn init() {
    env_logger::init();
}

/// Initialize logging if no logger has been installed yet
///
/// Safe to call from every test; repeated calls are ignored.
pub fn try_init() {
    let _ = env_logger::builder().is_test(true).try_init();
}
