//! The optimistic apply/commit/rollback protocol.
//!
//! Every slice mutation runs through [`run`] so the protocol exists exactly
//! once: capture a snapshot and apply the intended change synchronously
//! (the UI observes the optimistic value before any await), then commit
//! through the gateway; on failure restore the snapshot and re-signal the
//! error so feature code can surface it.
//!
//! Overlapping mutations on the same state are not queued against each
//! other: a snapshot captured here may already be stale relative to a
//! concurrent mutation's commit, and the later rollback wins. Gateway
//! pushes overwrite whatever optimistic state is in place once they arrive.

use std::future::Future;

use gangway_gateway::GatewayError;

use crate::error::StoreError;

/// Capture-and-apply, commit, roll back on failure.
///
/// `capture_and_apply` must complete the whole optimistic mutation before
/// returning its snapshot; `commit` is only polled afterwards. `restore` is
/// invoked with the snapshot exactly when the commit fails.
pub(crate) async fn run<T, S, Fut>(
    capture_and_apply: impl FnOnce() -> S,
    commit: Fut,
    restore: impl FnOnce(S),
) -> Result<T, StoreError>
where
    Fut: Future<Output = Result<T, GatewayError>>,
{
    let snapshot = capture_and_apply();
    match commit.await {
        Ok(value) => Ok(value),
        Err(error) => {
            tracing::warn!(error = %error, "optimistic mutation failed; rolling back");
            restore(snapshot);
            Err(error.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use super::*;

    #[tokio::test]
    async fn applies_before_commit_and_keeps_value_on_success() {
        let state = Arc::new(Mutex::new(vec![1, 2, 3]));
        let applied = Arc::clone(&state);
        let observed = Arc::clone(&state);

        let result = run(
            move || {
                let mut data = applied.lock().unwrap();
                let snapshot = data.clone();
                data.push(4);
                snapshot
            },
            async move {
                // The optimistic value is already visible at the await point.
                assert_eq!(*observed.lock().unwrap(), vec![1, 2, 3, 4]);
                Ok::<_, GatewayError>(())
            },
            |_| panic!("restore must not run on success"),
        )
        .await;

        assert!(result.is_ok());
        assert_eq!(*state.lock().unwrap(), vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn restores_snapshot_and_resignals_on_failure() {
        let state = Arc::new(Mutex::new(vec![1, 2, 3]));
        let applied = Arc::clone(&state);
        let restored = Arc::clone(&state);
        let restores = Arc::new(AtomicUsize::new(0));
        let restore_count = Arc::clone(&restores);

        let result: Result<(), StoreError> = run(
            move || {
                let mut data = applied.lock().unwrap();
                let snapshot = data.clone();
                data.clear();
                snapshot
            },
            async { Err(GatewayError::Rejected("backend said no".to_string())) },
            move |snapshot| {
                restore_count.fetch_add(1, Ordering::SeqCst);
                *restored.lock().unwrap() = snapshot;
            },
        )
        .await;

        assert!(result.is_err());
        assert_eq!(restores.load(Ordering::SeqCst), 1);
        assert_eq!(*state.lock().unwrap(), vec![1, 2, 3]);
    }
}
