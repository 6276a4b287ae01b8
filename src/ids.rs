use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::str::FromStr;
use std::{fmt::Display, ops::Deref};

/// Identifier of a stored content record. ULIDs, so ids sort by creation time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct ContentId(String);

impl Display for ContentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ContentId {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(ContentId(s.to_string()))
    }
}

impl Deref for ContentId {
    type Target = String;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<&str> for ContentId {
    fn from(fr: &str) -> Self {
        ContentId(fr.to_string())
    }
}

impl From<String> for ContentId {
    fn from(fr: String) -> Self {
        ContentId(fr)
    }
}

impl From<ContentId> for String {
    fn from(fr: ContentId) -> Self {
        fr.0
    }
}

impl ContentId {
    #[inline]
    pub fn new() -> ContentId {
        ContentId(rusty_ulid::generate_ulid_string())
    }
}

impl Default for ContentId {
    fn default() -> Self {
        Self::new()
    }
}

/// Owner of content records and share links. Opaque, supplied by the caller.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct UserId(String);

impl Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for UserId {
    fn from(fr: &str) -> Self {
        UserId(fr.to_string())
    }
}

impl From<String> for UserId {
    fn from(fr: String) -> Self {
        UserId(fr)
    }
}

/// Tag reference attached to a content record. Opaque like [`UserId`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct TagId(String);

impl TagId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for TagId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TagId {
    fn from(fr: &str) -> Self {
        TagId(fr.to_string())
    }
}

impl From<String> for TagId {
    fn from(fr: String) -> Self {
        TagId(fr)
    }
}
