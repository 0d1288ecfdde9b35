//! `clinicops-observability`
//!
//! Process-wide structured logging: JSON lines filtered by `RUST_LOG`.

pub mod subscriber;

pub use subscriber::DEFAULT_FILTER;

/// Initialize process-wide logging.
///
/// Safe to call multiple times; later calls are no-ops.
pub fn init() {
    subscriber::init(DEFAULT_FILTER);
}
