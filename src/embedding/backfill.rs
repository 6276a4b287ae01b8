//! Batch pipeline that fills in missing embeddings.
//!
//! A run walks every record whose embedding is empty:
//! 1. Probe the provider once to learn its output dimension
//! 2. Embed candidates in fixed-size batches, concurrently within a batch
//! 3. Pause between batches to stay under provider rate limits
//! 4. Persist each vector as soon as its item succeeds
//!
//! Item failures are logged and skipped; the record stays a candidate
//! for the next run, so re-running is always safe.

use std::time::Duration;

use futures::future;

use crate::content::ContentRecord;
use crate::embedding::preprocess::embedding_text;
use crate::embedding::provider::{EmbeddingClient, ProviderError};
use crate::store::{ContentStore, StoreError};

pub const DEFAULT_BATCH_SIZE: usize = 5;
pub const DEFAULT_BATCH_DELAY: Duration = Duration::from_millis(500);

/// Embedded when the first candidate has no text of its own.
const PROBE_TEXT: &str = "dimension probe";

#[derive(Debug, Clone)]
pub struct BackfillConfig {
    pub batch_size: usize,
    pub batch_delay: Duration,
    /// Expected output dimension, used only when the probe call fails.
    pub dimension_hint: usize,
}

impl BackfillConfig {
    pub fn new(dimension_hint: usize) -> Self {
        BackfillConfig {
            batch_size: DEFAULT_BATCH_SIZE,
            batch_delay: DEFAULT_BATCH_DELAY,
            dimension_hint,
        }
    }
}

/// Counts from one backfill run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackfillReport {
    pub processed: usize,
    pub total: usize,
}

#[derive(Debug, thiserror::Error)]
enum ItemError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("dimension mismatch: expected {expected}, got {got}")]
    Dimension { expected: usize, got: usize },
}

enum ItemOutcome {
    Embedded,
    Skipped,
    Failed,
}

pub async fn run_backfill<S>(
    store: &S,
    client: &EmbeddingClient,
    config: &BackfillConfig,
) -> Result<BackfillReport, StoreError>
where
    S: ContentStore + ?Sized,
{
    let candidates = store.find_missing_embedding()?;
    let total = candidates.len();
    log::info!("found {total} records to backfill");

    let expected_dim = probe_dimension(client, &candidates, config.dimension_hint).await;
    let batch_size = config.batch_size.max(1); // chunks() panics on zero

    let mut processed = 0;
    let mut done = 0;
    for chunk in candidates.chunks(batch_size) {
        let outcomes = future::join_all(
            chunk
                .iter()
                .map(|record| embed_record(store, client, record, expected_dim)),
        )
        .await;

        processed += outcomes
            .iter()
            .filter(|outcome| matches!(outcome, ItemOutcome::Embedded))
            .count();

        done += chunk.len();
        log::info!("progress: {done}/{total}");

        if done < total {
            tokio::time::sleep(config.batch_delay).await;
        }
    }

    Ok(BackfillReport { processed, total })
}

/// Asks the provider for one vector and trusts its length over the
/// configured hint. Falls back to the hint when the probe fails.
async fn probe_dimension(
    client: &EmbeddingClient,
    candidates: &[ContentRecord],
    hint: usize,
) -> usize {
    let derived = candidates.first().map(embedding_text).unwrap_or_default();
    let text = if derived.is_empty() {
        PROBE_TEXT
    } else {
        derived.as_str()
    };

    match client.embed(text).await {
        Ok(vector) => {
            if vector.len() != hint {
                log::warn!(
                    "configured dimension {hint} but provider returned {}, using that",
                    vector.len()
                );
            }
            vector.len()
        }
        Err(err) => {
            log::warn!("dimension probe failed ({err}), falling back to {hint}");
            hint
        }
    }
}

async fn embed_record<S>(
    store: &S,
    client: &EmbeddingClient,
    record: &ContentRecord,
    expected_dim: usize,
) -> ItemOutcome
where
    S: ContentStore + ?Sized,
{
    let text = embedding_text(record);
    if text.is_empty() {
        log::debug!("skipping {}: nothing to embed", record.id);
        return ItemOutcome::Skipped;
    }

    match try_embed(store, client, record, &text, expected_dim).await {
        Ok(()) => ItemOutcome::Embedded,
        Err(err) => {
            log::error!("failed to embed {}: {err}", record.id);
            ItemOutcome::Failed
        }
    }
}

async fn try_embed<S>(
    store: &S,
    client: &EmbeddingClient,
    record: &ContentRecord,
    text: &str,
    expected_dim: usize,
) -> Result<(), ItemError>
where
    S: ContentStore + ?Sized,
{
    let vector = client.embed(text).await?;
    if vector.len() != expected_dim {
        return Err(ItemError::Dimension {
            expected: expected_dim,
            got: vector.len(),
        });
    }

    store.set_embedding(&record.id, vector)?;
    Ok(())
}

/// Resets every vector whose length is exactly `target_len` back to
/// empty so the next backfill recomputes it. Returns how many were
/// cleared.
pub fn clear_stale<S>(store: &S, target_len: usize) -> Result<usize, StoreError>
where
    S: ContentStore + ?Sized,
{
    log::info!("clearing embeddings with length exactly {target_len}");
    store.clear_embeddings(target_len)
}
