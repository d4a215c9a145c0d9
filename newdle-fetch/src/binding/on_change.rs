//! Binding that re-runs when its trigger values change.
//!
//! Every run is tagged with a sequence number taken together with recording
//! its triggers.
//! A result is applied only if its tag is still the latest one, so the last
//! *requested* run wins no matter which run completes last.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{debug, instrument};

use super::{ErrorReporter, Pipeline, SubmissionState};

struct Shared<T> {
    state: watch::Sender<SubmissionState<T>>,
    latest: AtomicU64,
    reporter: Arc<dyn ErrorReporter>,
}

/// Re-invokes an operation whenever its triggers change by value.
///
/// Dropping the binding aborts in-flight runs; their results are discarded.
pub struct OnChange<K, T> {
    operation: Pipeline<K, T>,
    shared: Arc<Shared<T>>,
    triggers: Mutex<Option<K>>,
    tasks: Mutex<JoinSet<()>>,
}

impl<K, T> OnChange<K, T>
where
    K: Clone + PartialEq + Send + 'static,
    T: Send + Sync + 'static,
{
    /// Creates a binding that has not run yet.
    pub fn new(operation: Pipeline<K, T>, reporter: Arc<dyn ErrorReporter>) -> Self {
        let (state, _) = watch::channel(SubmissionState::idle());
        Self {
            operation,
            shared: Arc::new(Shared {
                state,
                latest: AtomicU64::new(0),
                reporter,
            }),
            triggers: Mutex::new(None),
            tasks: Mutex::new(JoinSet::new()),
        }
    }

    /// Starts a run if `triggers` differ from the previous ones (always on
    /// the first call). Returns true if a run was started.
    ///
    /// Must be called from within a tokio runtime.
    #[instrument(skip_all)]
    pub fn update(&self, triggers: K) -> bool {
        let mut ticket = 0;
        {
            // Stored triggers and the latest ticket change under one lock
            let mut last = lock(&self.triggers);
            if last.as_ref() == Some(&triggers) {
                return false;
            }
            *last = Some(triggers.clone());

            self.shared.state.send_modify(|state| {
                ticket = self.shared.latest.fetch_add(1, Ordering::SeqCst) + 1;
                *state = SubmissionState::pending();
            });
        }
        debug!(ticket, "Triggers changed, running");

        let shared = Arc::clone(&self.shared);
        let operation = self.operation.clone();

        let mut tasks = lock(&self.tasks);
        while tasks.try_join_next().is_some() {}
        tasks.spawn(async move {
            let outcome = operation.run(triggers).await;
            let message = outcome.as_ref().err().map(ToString::to_string);

            let applied = shared.state.send_if_modified(|state| {
                if shared.latest.load(Ordering::SeqCst) != ticket {
                    return false;
                }
                *state = match outcome {
                    Ok(result) => SubmissionState::done(result),
                    Err(err) => SubmissionState::failed(err.to_string()),
                };
                true
            });

            if !applied {
                debug!(ticket, "Dropped result of superseded run");
            } else if let Some(message) = message {
                shared.reporter.report(message).await;
            }
        });

        true
    }

    /// Waits for all in-flight runs to finish.
    pub async fn settle(&self) {
        let mut tasks = std::mem::take(&mut *lock(&self.tasks));
        while tasks.join_next().await.is_some() {}
    }

    /// Subscribes to state changes.
    pub fn subscribe(&self) -> watch::Receiver<SubmissionState<T>> {
        self.shared.state.subscribe()
    }
}

impl<K, T: Clone> OnChange<K, T> {
    /// Returns a snapshot of the current state.
    pub fn state(&self) -> SubmissionState<T> {
        self.shared.state.borrow().clone()
    }
}

impl<K, T> std::fmt::Debug for OnChange<K, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnChange")
            .field("latest", &self.shared.latest.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

fn lock<V>(mutex: &Mutex<V>) -> MutexGuard<'_, V> {
    mutex.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;
    use crate::test_support::RecordingReporter;
    use std::collections::HashMap;
    use std::sync::atomic::AtomicUsize;
    use tokio::sync::oneshot;

    type Gates = Arc<Mutex<HashMap<u32, oneshot::Receiver<Result<String, ClientError>>>>>;

    /// Operation whose runs complete only when the test releases them.
    fn gated() -> (Pipeline<u32, String>, Gates) {
        let gates: Gates = Arc::default();
        let registry = Arc::clone(&gates);
        let operation = Pipeline::new(move |key: u32| {
            let gate = registry.lock().unwrap().remove(&key);
            async move {
                match gate {
                    Some(gate) => gate
                        .await
                        .unwrap_or_else(|_| Err(ClientError::InvalidRequest("gone".into()))),
                    None => Ok(format!("instant-{key}")),
                }
            }
        });
        (operation, gates)
    }

    fn gate(gates: &Gates, key: u32) -> oneshot::Sender<Result<String, ClientError>> {
        let (tx, rx) = oneshot::channel();
        gates.lock().unwrap().insert(key, rx);
        tx
    }

    #[tokio::test]
    async fn test_runs_on_first_update() {
        let (operation, _) = gated();
        let binding = OnChange::new(operation, RecordingReporter::new());

        assert!(binding.update(1));
        binding.settle().await;

        assert_eq!(binding.state(), SubmissionState::done("instant-1".to_string()));
    }

    #[tokio::test]
    async fn test_unchanged_triggers_do_not_rerun() {
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&runs);
        let binding = OnChange::new(
            Pipeline::new(move |(a, b): (u32, String)| {
                counter.fetch_add(1, Ordering::SeqCst);
                async move { Ok(format!("{a}{b}")) }
            }),
            RecordingReporter::new(),
        );

        assert!(binding.update((1, "x".to_string())));
        assert!(!binding.update((1, "x".to_string())));
        assert!(binding.update((1, "y".to_string())));
        binding.settle().await;

        assert_eq!(runs.load(Ordering::SeqCst), 2);
        assert_eq!(binding.state().result.as_deref(), Some("1y"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_updates_latest_triggers_win() {
        for _ in 0..50 {
            let binding = Arc::new(OnChange::new(
                Pipeline::new(|key: u32| async move { Ok(key) }),
                RecordingReporter::new(),
            ));

            let barrier = Arc::new(std::sync::Barrier::new(2));
            let callers: Vec<_> = [1u32, 2]
                .into_iter()
                .map(|key| {
                    let binding = Arc::clone(&binding);
                    let barrier = Arc::clone(&barrier);
                    tokio::task::spawn_blocking(move || {
                        barrier.wait();
                        binding.update(key);
                    })
                })
                .collect();
            for caller in callers {
                caller.await.unwrap();
            }
            binding.settle().await;

            let recorded = lock(&binding.triggers).clone();
            assert_eq!(binding.state().result, recorded);
        }
    }

    #[tokio::test]
    async fn test_stale_result_completing_last_is_dropped() {
        let (operation, gates) = gated();
        let old = gate(&gates, 1);
        let new = gate(&gates, 2);
        let binding = OnChange::new(operation, RecordingReporter::new());

        binding.update(1);
        binding.update(2);

        new.send(Ok("new".to_string())).unwrap();
        old.send(Ok("old".to_string())).unwrap();
        binding.settle().await;

        assert_eq!(binding.state(), SubmissionState::done("new".to_string()));
    }

    #[tokio::test]
    async fn test_stale_result_completing_first_is_dropped() {
        let (operation, gates) = gated();
        let old = gate(&gates, 1);
        let new = gate(&gates, 2);
        let binding = OnChange::new(operation, RecordingReporter::new());
        let mut changes = binding.subscribe();

        binding.update(1);
        binding.update(2);

        old.send(Ok("old".to_string())).unwrap();
        tokio::task::yield_now().await;
        // The superseded run finished but the latest one is still pending
        assert!(changes.borrow_and_update().submitting);

        new.send(Ok("new".to_string())).unwrap();
        binding.settle().await;
        assert_eq!(binding.state(), SubmissionState::done("new".to_string()));
    }

    #[tokio::test]
    async fn test_stale_failure_is_not_reported() {
        let (operation, gates) = gated();
        let old = gate(&gates, 1);
        let reporter = RecordingReporter::new();
        let binding = OnChange::new(operation, reporter.clone());

        binding.update(1);
        binding.update(2);
        old.send(Err(ClientError::InvalidRequest("late".into())))
            .unwrap();
        binding.settle().await;

        assert!(reporter.messages().is_empty());
        assert_eq!(binding.state().result.as_deref(), Some("instant-2"));
    }

    #[tokio::test]
    async fn test_failure_is_state_and_report() {
        let (operation, gates) = gated();
        let tx = gate(&gates, 7);
        let reporter = RecordingReporter::new();
        let binding = OnChange::new(operation, reporter.clone());

        binding.update(7);
        tx.send(Err(ClientError::InvalidRequest("bad".into())))
            .unwrap();
        binding.settle().await;

        let state = binding.state();
        assert_eq!(state.error, "Invalid request: bad");
        assert!(!state.submitting);
        assert_eq!(reporter.messages(), vec!["Invalid request: bad".to_string()]);
    }

    #[tokio::test]
    async fn test_teardown_discards_pending_result() {
        let (operation, gates) = gated();
        let mut tx = gate(&gates, 1);
        let reporter = RecordingReporter::new();
        let binding = OnChange::new(operation, reporter.clone());
        let changes = binding.subscribe();

        binding.update(1);
        tokio::task::yield_now().await;
        drop(binding);

        // The run was aborted, which drops its gate receiver
        tokio::time::timeout(std::time::Duration::from_secs(1), tx.closed())
            .await
            .unwrap();
        assert!(tx.send(Ok("late".to_string())).is_err());
        assert!(reporter.messages().is_empty());
        assert!(changes.borrow().submitting);
    }
}
