//! Region progress reporting.
//!
//! The driver reports one unit of work per region of the current year.
//! [`run`](crate::run) calls [`set_message`](ProgressCallback::set_message)
//! and [`set_total`](ProgressCallback::set_total) when a year starts,
//! [`inc`](ProgressCallback::inc) per region, and
//! [`finish`](ProgressCallback::finish) once the year's outputs are
//! written. The same reporter is reused for every year, so `set_total`
//! restarts it.

use std::sync::Arc;

/// Receives per-year region progress from the driver.
pub trait ProgressCallback: Send + Sync {
    /// Starts a year: `total` regions to aggregate, position reset to 0.
    fn set_total(&self, total: u64);

    /// Advances by `delta` regions.
    fn inc(&self, delta: u64);

    /// Labels the current year.
    fn set_message(&self, msg: String);

    /// Ends a year with a one-line outcome. More years may follow.
    fn finish(&self, msg: String);

    /// Ends the whole run and removes any indicator.
    fn finish_and_clear(&self);
}

/// Discards all progress.
pub struct NullProgress;

impl ProgressCallback for NullProgress {
    fn set_total(&self, _total: u64) {}
    fn inc(&self, _delta: u64) {}
    fn set_message(&self, _msg: String) {}
    fn finish(&self, _msg: String) {}
    fn finish_and_clear(&self) {}
}

/// A shared [`NullProgress`], for runs without a terminal.
#[must_use]
pub fn null_progress() -> Arc<dyn ProgressCallback> {
    Arc::new(NullProgress)
}
