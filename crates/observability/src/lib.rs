//! Process-wide tracing setup shared by the binaries.

/// Subscriber initialization (filters, output format).
pub mod tracing;

pub use crate::tracing::{LogFormat, LogFormatError};

/// Initialize process-wide tracing.
///
/// Safe to call multiple times; subsequent calls are no-ops.
pub fn init(format: LogFormat) {
    tracing::init(format);
}
