use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::hash::Hash;
use std::str::FromStr;

use crate::ids::{ContentId, TagId, UserId};

/// What a content record points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Youtube,
    Twitter,
    Document,
    Website,
    Image,
    Music,
}

impl ContentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Youtube => "youtube",
            ContentKind::Twitter => "twitter",
            ContentKind::Document => "document",
            ContentKind::Website => "website",
            ContentKind::Image => "image",
            ContentKind::Music => "music",
        }
    }
}

impl Display for ContentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ContentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "youtube" => Ok(ContentKind::Youtube),
            "twitter" => Ok(ContentKind::Twitter),
            "document" => Ok(ContentKind::Document),
            "website" => Ok(ContentKind::Website),
            "image" => Ok(ContentKind::Image),
            "music" => Ok(ContentKind::Music),
            other => Err(format!("unknown content kind: {other}")),
        }
    }
}

/// One saved piece of content.
///
/// An empty `embedding` means none has been computed yet; the backfill
/// job picks those records up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentRecord {
    pub id: ContentId,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(rename = "type")]
    pub kind: ContentKind,

    #[serde(default)]
    pub tags: Vec<TagId>,

    pub owner: UserId,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub embedding: Vec<f32>,
}

impl Hash for ContentRecord {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ContentCreate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(rename = "type")]
    pub kind: ContentKind,

    #[serde(default)]
    pub tags: Vec<TagId>,

    pub owner: UserId,
}
