//! Fail-fast fan-in over spawned tasks
//!
//! Sub-operations are spawned onto the runtime and their join handles awaited
//! together. The first error observed is returned immediately. The remaining
//! handles are dropped, which detaches their tasks rather than aborting them,
//! so requests already sent to the provider run to completion.

use crate::error::{Error, Result};
use futures::future::try_join_all;
use tokio::task::JoinHandle;

/// Await every handle, returning results in handle order or the first error
pub(crate) async fn join_fail_fast<T>(handles: Vec<JoinHandle<Result<T>>>) -> Result<Vec<T>>
where
    T: Send + 'static,
{
    try_join_all(handles.into_iter().map(|handle| async move {
        match handle.await {
            Ok(result) => result,
            Err(e) => Err(Error::other(format!("Update task failed: {}", e))),
        }
    }))
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn preserves_order_on_success() {
        let handles = (0..5u32)
            .map(|i| {
                tokio::spawn(async move {
                    tokio::time::sleep(Duration::from_millis(u64::from(5 - i))).await;
                    Ok(i)
                })
            })
            .collect();

        assert_eq!(join_fail_fast(handles).await.unwrap(), vec![0, 1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn first_error_wins_and_siblings_keep_running() {
        let finished = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&finished);

        let handles: Vec<JoinHandle<Result<()>>> = vec![
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(50)).await;
                flag.store(true, Ordering::SeqCst);
                Ok(())
            }),
            tokio::spawn(async { Err(Error::no_record()) }),
        ];

        let err = join_fail_fast(handles).await.unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert!(!finished.load(Ordering::SeqCst));

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(finished.load(Ordering::SeqCst), "sibling task must not be cancelled");
    }

    #[tokio::test]
    async fn panicking_task_is_an_internal_error() {
        let handles: Vec<JoinHandle<Result<()>>> =
            vec![tokio::spawn(async { panic!("boom") })];

        let err = join_fail_fast(handles).await.unwrap_err();
        assert!(!err.is_client_facing());
    }
}
