//! Bounded parallel execution in sequential batches
//!
//! Work is split into batches of `worker_count * batch_multiplier` items. Each
//! batch runs with at most `worker_count` items in flight and must finish
//! completely before the next one starts. Results keep input order.

use std::future::Future;
use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::Semaphore;
use tracing::debug;

use crate::infrastructure::errors::{ScrapeError, ScrapeResult};

/// Run `worker` over every item and collect results in input order.
///
/// The first failing item (in input order) of a batch fails the whole call
/// once that batch has finished. Later batches are not started.
pub async fn run_batched<I, T, F, Fut>(
    items: Vec<I>,
    worker_count: usize,
    batch_multiplier: usize,
    worker: F,
) -> ScrapeResult<Vec<T>>
where
    I: Send + 'static,
    T: Send + 'static,
    F: Fn(I) -> Fut,
    Fut: Future<Output = ScrapeResult<T>> + Send + 'static,
{
    let worker_count = worker_count.max(1);
    let batch_size = worker_count.saturating_mul(batch_multiplier.max(1));
    let total = items.len();
    let mut results = Vec::with_capacity(total);
    let mut remaining = items.into_iter().peekable();
    let mut batch_number = 0usize;

    while remaining.peek().is_some() {
        batch_number += 1;
        let batch: Vec<I> = remaining.by_ref().take(batch_size).collect();
        debug!(
            "Batch {}: {} items ({} of {} done), {} workers",
            batch_number,
            batch.len(),
            results.len(),
            total,
            worker_count
        );

        let semaphore = Arc::new(Semaphore::new(worker_count));
        let handles = batch
            .into_iter()
            .map(|item| {
                let semaphore = Arc::clone(&semaphore);
                let task = worker(item);
                tokio::spawn(async move {
                    let _permit = semaphore.acquire_owned().await.map_err(|e| {
                        ScrapeError::Worker {
                            message: format!("worker pool closed: {e}"),
                        }
                    })?;
                    task.await
                })
            })
            .collect::<Vec<_>>();

        for joined in join_all(handles).await {
            results.push(joined??);
        }
    }

    Ok(results)
}
