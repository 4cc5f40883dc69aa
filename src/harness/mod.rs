//! Offline evaluation: build a Q/A dataset from the document, run it through
//! the query engine, score the answers, and turn failures into prompt advice.

pub mod dataset;
pub mod judge;
pub mod optimize;
pub mod runner;

use std::future::Future;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use futures::future::join_all;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::info;

/// Outer-loop pacing for calls that hit a rate-limited model.
#[derive(Debug, Clone, Copy)]
pub struct BatchOptions {
    pub size: usize,
    pub delay: Duration,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            size: 5,
            delay: Duration::ZERO,
        }
    }
}

/// Run `f` over `items` in consecutive batches. Items inside a batch run
/// concurrently; the next batch starts after the whole batch finished and
/// `delay` elapsed. Results keep input order. `f` receives the item's index.
pub async fn run_batched<T, R, F, Fut>(items: Vec<T>, opts: BatchOptions, mut f: F) -> Vec<R>
where
    F: FnMut(usize, T) -> Fut,
    Fut: Future<Output = R>,
{
    let total = items.len();
    let size = opts.size.max(1);
    let mut out = Vec::with_capacity(total);
    let mut pending = items.into_iter().enumerate().peekable();
    let mut batch_no = 0;

    while pending.peek().is_some() {
        batch_no += 1;
        let batch: Vec<(usize, T)> = pending.by_ref().take(size).collect();
        let first = batch[0].0 + 1;
        let last = first + batch.len() - 1;
        info!(batch = batch_no, first, last, total, "Starting batch");

        let tasks = batch.into_iter().map(|(i, item)| f(i, item));
        out.extend(join_all(tasks).await);

        if pending.peek().is_some() && !opts.delay.is_zero() {
            info!(batch = batch_no, delay_secs = opts.delay.as_secs_f32(), "Pausing between batches");
            tokio::time::sleep(opts.delay).await;
        }
    }

    out
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Failed to parse {}", path.display()))
}

pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("serialize JSON")?;
    std::fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))
}
