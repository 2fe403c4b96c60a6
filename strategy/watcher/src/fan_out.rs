//! Fail-fast concurrent fan-out.
//!
//! Every task is spawned on its own tokio task and raced against a shared
//! cancellation token. The first failure observed cancels the token, so the
//! remaining tasks stop at their next await point, and that failure is the
//! one returned.

use std::future::Future;

use anyhow::Result;
use thiserror::Error;
use tokio::task::{JoinError, JoinSet};
use tokio_util::sync::CancellationToken;

/// Failures produced by the group itself rather than by a task.
#[derive(Debug, Error)]
pub enum FanOutError {
    #[error("task cancelled after a sibling failed")]
    Cancelled,
    #[error("task did not complete: {0}")]
    Join(#[from] JoinError),
}

/// Group of tasks where the first error wins and cancels the rest.
pub struct FailFastGroup<T> {
    tasks: JoinSet<Result<T>>,
    cancel: CancellationToken,
}

impl<T: Send + 'static> FailFastGroup<T> {
    pub fn new() -> Self {
        Self {
            tasks: JoinSet::new(),
            cancel: CancellationToken::new(),
        }
    }

    /// Starts `task` concurrently with the tasks already in the group.
    pub fn spawn<F>(&mut self, task: F)
    where
        F: Future<Output = Result<T>> + Send + 'static,
    {
        let cancel = self.cancel.clone();
        self.tasks.spawn(async move {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => Err(FanOutError::Cancelled.into()),
                result = task => result,
            }
        });
    }

    /// Number of tasks not yet collected.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Waits for every task and returns their outputs in completion order,
    /// or the first error observed.
    pub async fn wait(mut self) -> Result<Vec<T>> {
        let mut outputs = Vec::with_capacity(self.tasks.len());
        let mut first_error = None;

        while let Some(joined) = self.tasks.join_next().await {
            let result = joined.map_err(FanOutError::from).map_err(anyhow::Error::from);
            match result.and_then(|output| output) {
                Ok(output) if first_error.is_none() => outputs.push(output),
                Ok(_) => {}
                Err(err) => {
                    if first_error.is_none() {
                        self.cancel.cancel();
                        first_error = Some(err);
                    }
                }
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(outputs),
        }
    }
}

impl<T: Send + 'static> Default for FailFastGroup<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_collects_all_outputs() {
        let mut group = FailFastGroup::new();
        for value in 0..5 {
            group.spawn(async move { Ok(value) });
        }
        assert_eq!(group.len(), 5);

        let mut outputs = group.wait().await.unwrap();
        outputs.sort();
        assert_eq!(outputs, vec![0, 1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_empty_group() {
        let group = FailFastGroup::<u8>::new();
        assert!(group.is_empty());
        assert!(group.wait().await.unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_error_cancels_siblings() {
        let finished = Arc::new(AtomicBool::new(false));
        let mut group = FailFastGroup::new();

        let slow_finished = Arc::clone(&finished);
        group.spawn(async move {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            slow_finished.store(true, Ordering::SeqCst);
            Ok(1)
        });
        group.spawn(async { Err(anyhow!("boom")) });

        let err = group.wait().await.unwrap_err();
        assert_eq!(err.to_string(), "boom");
        assert!(!finished.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn test_returns_first_observed_error() {
        let mut group = FailFastGroup::<()>::new();
        group.spawn(async {
            tokio::time::sleep(Duration::from_secs(1)).await;
            Err(anyhow!("late"))
        });
        group.spawn(async { Err(anyhow!("early")) });

        let err = group.wait().await.unwrap_err();
        assert_eq!(err.to_string(), "early");
    }

    #[tokio::test]
    async fn test_panicking_task_is_an_error() {
        let mut group = FailFastGroup::<()>::new();
        let explode = true;
        group.spawn(async move {
            if explode {
                panic!("task exploded");
            }
            Ok(())
        });

        let err = group.wait().await.unwrap_err();
        assert!(err.downcast_ref::<FanOutError>().is_some());
    }
}
