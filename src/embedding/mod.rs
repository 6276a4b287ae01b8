//! Embedding infrastructure for content records.
//!
//! - `provider`: HTTP adapter over the two embedding wire protocols
//! - `preprocess`: derives the text a record is embedded from
//! - `similarity`: cosine scoring between stored and query vectors
//! - `backfill`: batch pipeline that fills in missing embeddings

pub mod backfill;
pub mod preprocess;
pub mod provider;
pub mod similarity;

pub use backfill::{clear_stale, run_backfill, BackfillConfig};
pub use provider::EmbeddingClient;
