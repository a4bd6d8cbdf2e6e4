//! Progress reporting for pipeline stages.
//!
//! The pipeline reports through [`ProgressCallback`] so that the CLI can
//! drive `indicatif` bars while the server and tests stay silent.

use std::sync::Arc;

/// Receives progress updates from a running stage.
///
/// Must be `Send + Sync` because fetches within a batch run concurrently.
pub trait ProgressCallback: Send + Sync {
    /// Sets the total number of units the current stage will process.
    fn set_total(&self, total: u64);

    /// Advances by `delta` completed units.
    fn inc(&self, delta: u64);

    /// Replaces the message shown next to the indicator.
    fn set_message(&self, msg: String);

    /// Marks the current stage finished.
    fn finish(&self, msg: String);
}

/// Discards every update.
pub struct NullProgress;

impl ProgressCallback for NullProgress {
    fn set_total(&self, _total: u64) {}
    fn inc(&self, _delta: u64) {}
    fn set_message(&self, _msg: String) {}
    fn finish(&self, _msg: String) {}
}

/// Returns a shared [`NullProgress`].
#[must_use]
pub fn null_progress() -> Arc<dyn ProgressCallback> {
    Arc::new(NullProgress)
}
