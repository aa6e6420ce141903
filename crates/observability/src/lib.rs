//! Process-wide logging setup shared by the binaries.

pub mod tracing;

/// Initialize structured logging.
///
/// Safe to call multiple times; later calls are no-ops.
pub fn init() {
    tracing::init(tracing::LogFormat::Json);
}
