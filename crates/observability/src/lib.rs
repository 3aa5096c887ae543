//! Process-wide tracing setup for the stockroom binaries.
//!
//! Library crates only emit events; installing a subscriber is left to the
//! executable through [`init`].

pub mod tracing;

pub use self::tracing::LogFormat;

/// Install the default subscriber (JSON lines, `RUST_LOG` filter, `info`
/// when unset).
///
/// Safe to call multiple times; subsequent calls are no-ops.
pub fn init() {
    self::tracing::init(LogFormat::Json);
}

/// Same as [`init`] with an explicit output format.
pub fn init_with(format: LogFormat) {
    self::tracing::init(format);
}
