//! # Decoder Diagnostics
//!
//! Decoders never log on their own; they report through a [`DiagnosticSink`]
//! passed into every decode call. The receiver wires in [`TracingSink`],
//! tests can substitute a mock, and batch tools can use [`SilentSink`].

use tracing::{debug, warn};

use super::protocol::SensorFamily;

/// Receiver of decoder diagnostics
#[cfg_attr(test, mockall::automock)]
pub trait DiagnosticSink: Send + Sync {
    /// Detail about a rejected frame or a corrected field
    fn debug(&self, family: SensorFamily, message: &str);

    /// Non-fatal anomaly in an otherwise valid frame
    fn warn(&self, family: SensorFamily, message: &str);
}

/// Forwards diagnostics to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink {
    /// Forward `debug` messages too (rejections are frequent on a busy channel)
    pub verbose: bool,
}

impl TracingSink {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl DiagnosticSink for TracingSink {
    fn debug(&self, family: SensorFamily, message: &str) {
        if self.verbose {
            debug!(decoder = %family, "{}", message);
        }
    }

    fn warn(&self, family: SensorFamily, message: &str) {
        warn!(decoder = %family, "{}", message);
    }
}

/// Drops all diagnostics
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentSink;

impl DiagnosticSink for SilentSink {
    fn debug(&self, _family: SensorFamily, _message: &str) {}

    fn warn(&self, _family: SensorFamily, _message: &str) {}
}
