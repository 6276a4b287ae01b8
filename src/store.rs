//! Document store for content records and share links.
//!
//! `JsonStore` keeps both collections in memory and rewrites them whole
//! on every mutation: content records as one JSON document per line,
//! share links as a single JSON array. Writes go through a temp file
//! and an atomic rename.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use crate::content::{ContentCreate, ContentRecord};
use crate::ids::{ContentId, UserId};
use crate::share::ShareLink;

const CONTENTS_FILE: &str = "contents.jsonl";
const SHARES_FILE: &str = "shares.json";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("content not found")]
    NotFound,

    #[error("share link not found")]
    ShareNotFound,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("malformed document: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("embedding contains non-finite components")]
    NonFinite,
}

pub trait ContentStore: Send + Sync {
    fn create(&self, create: ContentCreate) -> Result<ContentRecord, StoreError>;
    fn list_all(&self) -> Result<Vec<ContentRecord>, StoreError>;
    fn list_owned(&self, owner: &UserId) -> Result<Vec<ContentRecord>, StoreError>;
    fn delete(&self, id: &ContentId, owner: &UserId) -> Result<(), StoreError>;
    fn find_missing_embedding(&self) -> Result<Vec<ContentRecord>, StoreError>;
    fn set_embedding(&self, id: &ContentId, embedding: Vec<f32>) -> Result<(), StoreError>;
    fn clear_embeddings(&self, length: usize) -> Result<usize, StoreError>;
}

pub trait ShareStore: Send + Sync {
    fn share_for_owner(&self, owner: &UserId) -> Result<Option<ShareLink>, StoreError>;
    fn share_by_hash(&self, hash: &str) -> Result<Option<ShareLink>, StoreError>;
    fn insert_share(&self, link: ShareLink) -> Result<(), StoreError>;
    fn delete_share(&self, owner: &UserId) -> Result<(), StoreError>;
}

#[derive(Debug, Clone)]
pub struct JsonStore {
    contents: Arc<RwLock<Vec<ContentRecord>>>,
    shares: Arc<RwLock<Vec<ShareLink>>>,
    dir: PathBuf,
}

impl JsonStore {
    pub fn open(dir: &Path) -> Result<Self, StoreError> {
        std::fs::create_dir_all(dir)?;

        let contents_path = dir.join(CONTENTS_FILE);
        let contents = match std::fs::read_to_string(&contents_path) {
            Ok(raw) => raw
                .lines()
                .filter(|line| !line.trim().is_empty())
                .map(serde_json::from_str)
                .collect::<Result<Vec<ContentRecord>, _>>()?,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                log::info!("creating new database at {}", contents_path.display());
                std::fs::write(&contents_path, "")?;
                Vec::new()
            }
            Err(err) => return Err(err.into()),
        };

        let shares = match std::fs::read_to_string(dir.join(SHARES_FILE)) {
            Ok(raw) => serde_json::from_str(&raw)?,
            Err(err) if err.kind() == ErrorKind::NotFound => Vec::new(),
            Err(err) => return Err(err.into()),
        };

        Ok(JsonStore {
            contents: Arc::new(RwLock::new(contents)),
            shares: Arc::new(RwLock::new(shares)),
            dir: dir.to_path_buf(),
        })
    }

    // Callers hold the collection lock while persisting, so concurrent
    // mutators cannot interleave temp-file writes.
    fn save_contents(&self, records: &[ContentRecord]) -> Result<(), StoreError> {
        let mut out = String::new();
        for record in records {
            out.push_str(&serde_json::to_string(record)?);
            out.push('\n');
        }
        self.write_atomic(CONTENTS_FILE, out.as_bytes())
    }

    fn save_shares(&self, shares: &[ShareLink]) -> Result<(), StoreError> {
        let out = serde_json::to_string_pretty(shares)?;
        self.write_atomic(SHARES_FILE, out.as_bytes())
    }

    fn write_atomic(&self, name: &str, bytes: &[u8]) -> Result<(), StoreError> {
        let temp_path = self.dir.join(format!("{name}-tmp"));
        std::fs::write(&temp_path, bytes)?;
        std::fs::rename(&temp_path, self.dir.join(name))?;
        Ok(())
    }
}

impl ContentStore for JsonStore {
    fn create(&self, create: ContentCreate) -> Result<ContentRecord, StoreError> {
        let record = ContentRecord {
            id: ContentId::new(),
            title: create.title,
            link: create.link,
            description: create.description,
            kind: create.kind,
            tags: create.tags,
            owner: create.owner,
            embedding: Vec::new(),
        };

        let mut records = self.contents.write().unwrap();
        records.push(record.clone());
        self.save_contents(&records)?;

        Ok(record)
    }

    fn list_all(&self) -> Result<Vec<ContentRecord>, StoreError> {
        Ok(self.contents.read().unwrap().clone())
    }

    fn list_owned(&self, owner: &UserId) -> Result<Vec<ContentRecord>, StoreError> {
        Ok(self
            .contents
            .read()
            .unwrap()
            .iter()
            .filter(|record| &record.owner == owner)
            .cloned()
            .collect())
    }

    fn delete(&self, id: &ContentId, owner: &UserId) -> Result<(), StoreError> {
        let mut records = self.contents.write().unwrap();
        let idx = records
            .iter()
            .position(|record| &record.id == id && &record.owner == owner)
            .ok_or(StoreError::NotFound)?;

        records.remove(idx);
        self.save_contents(&records)
    }

    fn find_missing_embedding(&self) -> Result<Vec<ContentRecord>, StoreError> {
        Ok(self
            .contents
            .read()
            .unwrap()
            .iter()
            .filter(|record| record.embedding.is_empty())
            .cloned()
            .collect())
    }

    fn set_embedding(&self, id: &ContentId, embedding: Vec<f32>) -> Result<(), StoreError> {
        // Non-finite components serialize as null and the line never
        // parses back.
        if embedding.iter().any(|value| !value.is_finite()) {
            return Err(StoreError::NonFinite);
        }

        let mut records = self.contents.write().unwrap();
        let record = records
            .iter_mut()
            .find(|record| &record.id == id)
            .ok_or(StoreError::NotFound)?;

        record.embedding = embedding;
        self.save_contents(&records)
    }

    fn clear_embeddings(&self, length: usize) -> Result<usize, StoreError> {
        let mut records = self.contents.write().unwrap();

        let mut cleared = 0;
        for record in records.iter_mut() {
            if record.embedding.len() == length {
                record.embedding = Vec::new();
                cleared += 1;
            }
        }

        if cleared > 0 {
            self.save_contents(&records)?;
        }

        Ok(cleared)
    }
}

impl ShareStore for JsonStore {
    fn share_for_owner(&self, owner: &UserId) -> Result<Option<ShareLink>, StoreError> {
        Ok(self
            .shares
            .read()
            .unwrap()
            .iter()
            .find(|link| &link.owner == owner)
            .cloned())
    }

    fn share_by_hash(&self, hash: &str) -> Result<Option<ShareLink>, StoreError> {
        Ok(self
            .shares
            .read()
            .unwrap()
            .iter()
            .find(|link| link.hash == hash)
            .cloned())
    }

    fn insert_share(&self, link: ShareLink) -> Result<(), StoreError> {
        let mut shares = self.shares.write().unwrap();
        shares.push(link);
        self.save_shares(&shares)
    }

    fn delete_share(&self, owner: &UserId) -> Result<(), StoreError> {
        let mut shares = self.shares.write().unwrap();
        let before = shares.len();
        shares.retain(|link| &link.owner != owner);

        if shares.len() == before {
            return Ok(());
        }
        self.save_shares(&shares)
    }
}
