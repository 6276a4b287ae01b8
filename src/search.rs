//! Similarity search over stored records.
//!
//! The query is embedded through the same adapter the backfill uses,
//! then scored against every stored vector of matching length. Records
//! without an embedding, or with a vector of a different length, never
//! enter the ranking.

use serde::Serialize;

use crate::content::ContentKind;
use crate::embedding::provider::{EmbeddingClient, ProviderError};
use crate::embedding::similarity::cosine_similarity;
use crate::ids::ContentId;
use crate::store::{ContentStore, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("search unavailable: {0}")]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// One ranked result. Scores are cosine similarities in [-1, 1].
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub id: ContentId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(rename = "type")]
    pub kind: ContentKind,
    pub score: f32,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub results: Vec<SearchHit>,
    pub count: usize,
}

pub async fn search<S>(
    store: &S,
    client: &EmbeddingClient,
    query: &str,
    limit: usize,
) -> Result<SearchResponse, SearchError>
where
    S: ContentStore + ?Sized,
{
    let query_vector = client.embed(query).await?;

    let mut results: Vec<SearchHit> = store
        .list_all()?
        .into_iter()
        .filter(|record| {
            !record.embedding.is_empty() && record.embedding.len() == query_vector.len()
        })
        .map(|record| SearchHit {
            score: cosine_similarity(&query_vector, &record.embedding),
            id: record.id,
            title: record.title,
            description: record.description,
            link: record.link,
            kind: record.kind,
        })
        .collect();

    // Sort by score descending; the sort is stable, so equal scores
    // keep their stored order.
    results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    results.truncate(limit);

    let count = results.len();
    Ok(SearchResponse { results, count })
}
