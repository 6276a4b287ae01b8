//! Derives the text a record embeds as.
//!
//! The embedding input is the record's title, description, and
//! comma-joined tags, one per line, skipping whichever are empty. A
//! record with none of the three derives an empty string, which the
//! backfill pipeline skips instead of embedding.

use crate::content::ContentRecord;

pub fn embedding_text(record: &ContentRecord) -> String {
    let tags = record
        .tags
        .iter()
        .map(|tag| tag.as_str())
        .collect::<Vec<_>>()
        .join(",");

    [
        record.title.as_deref(),
        record.description.as_deref(),
        Some(tags.as_str()),
    ]
    .into_iter()
    .flatten()
    .filter(|part| !part.is_empty())
    .collect::<Vec<_>>()
    .join("\n")
}
