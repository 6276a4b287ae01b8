//! Public share links. An owner has at most one active link; its hash
//! resolves to their full collection.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::content::ContentRecord;
use crate::ids::UserId;
use crate::store::{ContentStore, ShareStore, StoreError};

const HASH_LEN: usize = 10;
const HASH_ALPHABET: &[u8] = b"1234567890qwertyuiopasdfghjklzxcvbnm";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareLink {
    pub hash: String,
    pub owner: UserId,
}

/// What a hash resolves to: the owner and everything they have saved.
#[derive(Debug, Serialize)]
pub struct SharedCollection {
    pub user: UserId,
    pub content: Vec<ContentRecord>,
}

fn random_hash() -> String {
    let mut rng = rand::rng();
    (0..HASH_LEN)
        .map(|_| HASH_ALPHABET[rng.random_range(0..HASH_ALPHABET.len())] as char)
        .collect()
}

/// Returns the owner's existing link untouched, or mints a new one.
pub fn enable_share<S: ShareStore>(store: &S, owner: &UserId) -> Result<ShareLink, StoreError> {
    if let Some(existing) = store.share_for_owner(owner)? {
        return Ok(existing);
    }

    let link = ShareLink {
        hash: random_hash(),
        owner: owner.clone(),
    };
    store.insert_share(link.clone())?;

    Ok(link)
}

/// Deletes the owner's link. Succeeds even when none exists.
pub fn disable_share<S: ShareStore>(store: &S, owner: &UserId) -> Result<(), StoreError> {
    store.delete_share(owner)
}

pub fn resolve_share<S>(store: &S, hash: &str) -> Result<SharedCollection, StoreError>
where
    S: ShareStore + ContentStore,
{
    let link = store.share_by_hash(hash)?.ok_or(StoreError::ShareNotFound)?;
    let content = store.list_owned(&link.owner)?;

    Ok(SharedCollection {
        user: link.owner,
        content,
    })
}
