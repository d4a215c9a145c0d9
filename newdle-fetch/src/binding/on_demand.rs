//! Manually invoked binding.

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::watch;
use tracing::{debug, instrument};

use super::{ErrorReporter, Pipeline, SubmissionState};
use crate::error::ClientError;

/// Runs a pipeline on request and publishes its submission state.
pub struct OnDemand<I, T> {
    pipeline: Pipeline<I, T>,
    state: watch::Sender<SubmissionState<T>>,
    last_error: Mutex<Option<ClientError>>,
    reporter: Arc<dyn ErrorReporter>,
}

impl<I, T> OnDemand<I, T>
where
    I: Send + 'static,
    T: Clone + Send + Sync + 'static,
{
    /// Creates an idle binding.
    pub fn new(pipeline: Pipeline<I, T>, reporter: Arc<dyn ErrorReporter>) -> Self {
        let (state, _) = watch::channel(SubmissionState::idle());
        Self {
            pipeline,
            state,
            last_error: Mutex::new(None),
            reporter,
        }
    }

    /// Runs the pipeline.
    ///
    /// Returns the final value, or `None` if a step failed. Failures are
    /// recorded in the state and reported, never returned.
    #[instrument(skip_all)]
    pub async fn invoke(&self, input: I) -> Option<T> {
        self.state.send_replace(SubmissionState::pending());
        *self.last_error_slot() = None;

        match self.pipeline.run(input).await {
            Ok(result) => {
                debug!("Invocation succeeded");
                self.state.send_replace(SubmissionState::done(result.clone()));
                Some(result)
            }
            Err(err) => {
                let message = err.to_string();
                self.state
                    .send_replace(SubmissionState::failed(message.clone()));
                *self.last_error_slot() = Some(err);
                self.reporter.report(message).await;
                None
            }
        }
    }

    /// Returns a snapshot of the current state.
    pub fn state(&self) -> SubmissionState<T> {
        self.state.borrow().clone()
    }

    /// Returns the error of the last invocation, if it failed.
    ///
    /// Same failure as [`SubmissionState::error`], with its variant intact.
    pub fn last_error(&self) -> Option<ClientError> {
        self.last_error_slot().clone()
    }

    /// Subscribes to state changes.
    pub fn subscribe(&self) -> watch::Receiver<SubmissionState<T>> {
        self.state.subscribe()
    }

    fn last_error_slot(&self) -> std::sync::MutexGuard<'_, Option<ClientError>> {
        self.last_error.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<I, T> std::fmt::Debug for OnDemand<I, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnDemand").finish_non_exhaustive()
    }
}
