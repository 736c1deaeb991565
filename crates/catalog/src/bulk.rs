//! Bounded-parallel per-key sub-fetches.
//!
//! [`fetch_bulk`] runs one fetch per key with at most `max_concurrency` in
//! flight, waits for every key, and returns whatever succeeded. Failed keys are
//! simply absent from the result. Nothing is retried and the batch is never
//! aborted by a single failure.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;

use tokio::sync::{Mutex, Semaphore};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::ResultEnvelope;

/// Fetches `fetch(key)` for every key with at most `max_concurrency` running.
///
/// Every key is spawned immediately and queues on a counting gate; the queue
/// depth is unbounded. Each task holds an owned permit for the duration of its
/// fetch, so the slot is released on success, failure, panic and cancellation
/// alike. The call returns only after every task has finished.
///
/// A key is present in the result iff its envelope was successful and carried
/// data. A `max_concurrency` of zero is treated as one. Keys that are still
/// queued when `cancel` fires are skipped.
pub async fn fetch_bulk<K, T, F, Fut>(
    keys: Vec<K>,
    max_concurrency: usize,
    cancel: &CancellationToken,
    fetch: F,
) -> HashMap<K, T>
where
    K: Eq + Hash + Clone + std::fmt::Display + Send + Sync + 'static,
    T: Send + 'static,
    F: Fn(K, CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ResultEnvelope<T>> + Send + 'static,
{
    let gate = Arc::new(Semaphore::new(max_concurrency.max(1)));
    let results = Arc::new(Mutex::new(HashMap::with_capacity(keys.len())));
    let fetch = Arc::new(fetch);
    let mut tasks = JoinSet::new();

    for key in keys {
        let gate = Arc::clone(&gate);
        let results = Arc::clone(&results);
        let fetch = Arc::clone(&fetch);
        let cancel = cancel.clone();

        tasks.spawn(async move {
            let _permit = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!(%key, "bulk fetch cancelled before admission");
                    return;
                }
                permit = gate.acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => return,
                },
            };

            let envelope = fetch(key.clone(), cancel).await;
            match envelope.into_data() {
                Some(data) => {
                    results.lock().await.insert(key, data);
                }
                None => debug!(%key, "bulk fetch failed; omitting key"),
            }
        });
    }

    while let Some(joined) = tasks.join_next().await {
        if let Err(err) = joined {
            debug!(error = %err, "bulk fetch task aborted");
        }
    }

    match Arc::try_unwrap(results) {
        Ok(map) => map.into_inner(),
        // Not reached: every task, and with it every clone, has been joined.
        Err(shared) => std::mem::take(&mut *shared.lock().await),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;

    /// Tracks current and peak concurrency of the fake fetches.
    #[derive(Default)]
    struct Gauge {
        current: AtomicUsize,
        peak: AtomicUsize,
        started: AtomicUsize,
    }

    impl Gauge {
        fn enter(&self) {
            self.started.fetch_add(1, Ordering::SeqCst);
            let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
        }

        fn leave(&self) {
            self.current.fetch_sub(1, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn test_concurrency_cap_and_partial_failure() {
        let gauge = Arc::new(Gauge::default());
        let keys: Vec<u32> = (0..10).collect();

        let meter = Arc::clone(&gauge);
        let result = fetch_bulk(keys, 3, &CancellationToken::new(), move |key, _| {
            let meter = Arc::clone(&meter);
            async move {
                meter.enter();
                tokio::time::sleep(Duration::from_millis(15)).await;
                meter.leave();
                if key == 4 {
                    ResultEnvelope::failure(vec!["boom".to_string()])
                } else {
                    ResultEnvelope::success(key * 10)
                }
            }
        })
        .await;

        assert!(gauge.peak.load(Ordering::SeqCst) <= 3);
        assert_eq!(gauge.started.load(Ordering::SeqCst), 10);
        assert_eq!(result.len(), 9);
        assert!(!result.contains_key(&4));
        assert_eq!(result[&7], 70);
    }

    #[tokio::test]
    async fn test_panicking_fetch_releases_its_slot() {
        let result = fetch_bulk(vec![1u32, 2, 3], 1, &CancellationToken::new(), |key, _| async move {
            if key == 1 {
                panic!("fetch exploded");
            }
            ResultEnvelope::success(key)
        })
        .await;

        assert_eq!(result.len(), 2);
        assert!(result.contains_key(&2) && result.contains_key(&3));
    }

    #[tokio::test]
    async fn test_zero_cap_still_progresses() {
        let result = fetch_bulk(vec!["a".to_string()], 0, &CancellationToken::new(), |key, _| async move {
            ResultEnvelope::success(key.len())
        })
        .await;
        assert_eq!(result["a"], 1);
    }

    #[tokio::test]
    async fn test_cancelled_batch_completes_empty() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let result = fetch_bulk(vec![1u8, 2, 3], 2, &cancel, move |key, _| {
            counter.fetch_add(1, Ordering::SeqCst);
            async move { ResultEnvelope::success(key) }
        })
        .await;

        assert!(result.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_success_without_data_is_omitted() {
        let result = fetch_bulk(vec![1u8], 1, &CancellationToken::new(), |_, _| async move {
            ResultEnvelope::<u8>::success_with(None, Vec::new())
        })
        .await;
        assert!(result.is_empty());
    }
}
