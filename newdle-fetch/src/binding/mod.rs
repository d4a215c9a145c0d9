//! Observable async bindings over API calls.
//!
//! - [`OnDemand`] - runs a [`Pipeline`] when invoked
//! - [`OnChange`] - re-runs an operation whenever its trigger values change
//!
//! Both publish a [`SubmissionState`] through a `watch` channel and are the
//! point where failures stop propagating: they become state plus an entry in
//! the process-wide error list (see [`ErrorReporter`]).

mod on_change;
mod on_demand;
mod pipeline;

pub use on_change::OnChange;
pub use on_demand::OnDemand;
pub use pipeline::{Pipeline, StepFuture};

use async_trait::async_trait;

// ============================================================================
// Submission State
// ============================================================================

/// Pending / error / result triple of one binding.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionState<T> {
    /// An invocation is in flight.
    pub submitting: bool,
    /// Message of the last failure; empty if none.
    pub error: String,
    /// Result of the last successful invocation.
    pub result: Option<T>,
}

impl<T> SubmissionState<T> {
    /// Nothing has run yet.
    pub fn idle() -> Self {
        Self {
            submitting: false,
            error: String::new(),
            result: None,
        }
    }

    /// State at the start of every invocation.
    pub fn pending() -> Self {
        Self {
            submitting: true,
            ..Self::idle()
        }
    }

    /// Successful completion.
    pub fn done(result: T) -> Self {
        Self {
            result: Some(result),
            ..Self::idle()
        }
    }

    /// Failed completion.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            ..Self::idle()
        }
    }

    /// Returns true if the last invocation failed.
    pub fn has_error(&self) -> bool {
        !self.error.is_empty()
    }
}

impl<T> Default for SubmissionState<T> {
    fn default() -> Self {
        Self::idle()
    }
}

// ============================================================================
// Error Reporting
// ============================================================================

/// Receives human-readable failure messages from bindings.
#[async_trait]
pub trait ErrorReporter: Send + Sync {
    /// Records one failure.
    async fn report(&self, message: String);
}
