//! Typed ids for every stored entity, plus the key used to attach engagement to a
//! resource.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub use super::id::Id;

/// Marker type for signed-in members.
pub struct Member;

/// Marker type for comments on a resource.
pub struct ResourceComment;

/// Marker type for resources stored in our own database.
pub struct StoredResource;

pub type MemberId = Id<Member>;
pub type CommentId = Id<ResourceComment>;
pub type ResourceId = Id<StoredResource>;

const MAX_RESOURCE_KEY_LEN: usize = 256;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResourceKeyError {
    #[error("resource key is empty")]
    Empty,
    #[error("resource key is longer than {MAX_RESOURCE_KEY_LEN} characters")]
    TooLong,
    #[error("resource key contains characters other than letters, digits, '-' and '_'")]
    InvalidCharacter,
}

/// Stable identifier likes and comments hang off.
///
/// For map-sourced resources this is the places provider's place id; for resources we
/// store ourselves it is the database UUID. Display names are never used as keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ResourceKey(String);

impl ResourceKey {
    pub fn parse(raw: &str) -> Result<Self, ResourceKeyError> {
        if raw.is_empty() {
            return Err(ResourceKeyError::Empty);
        }
        if raw.len() > MAX_RESOURCE_KEY_LEN {
            return Err(ResourceKeyError::TooLong);
        }
        if !raw
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(ResourceKeyError::InvalidCharacter);
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<ResourceId> for ResourceKey {
    fn from(id: ResourceId) -> Self {
        Self(id.to_string())
    }
}

impl TryFrom<String> for ResourceKey {
    type Error = ResourceKeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ResourceKey> for String {
    fn from(key: ResourceKey) -> Self {
        key.0
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_place_ids_are_valid_keys() {
        let key = ResourceKey::parse("ChIJN1t_tDeuEmsRUsoyG83frY4").unwrap();
        assert_eq!(key.as_str(), "ChIJN1t_tDeuEmsRUsoyG83frY4");
    }

    #[test]
    fn test_stored_ids_are_valid_keys() {
        let id = ResourceId::new();
        let key = ResourceKey::from(id);
        assert_eq!(ResourceKey::parse(key.as_str()).unwrap(), key);
    }

    #[test]
    fn test_rejects_names_and_paths() {
        assert_eq!(
            ResourceKey::parse("City Hospital"),
            Err(ResourceKeyError::InvalidCharacter)
        );
        assert_eq!(
            ResourceKey::parse("a/b"),
            Err(ResourceKeyError::InvalidCharacter)
        );
        assert_eq!(ResourceKey::parse(""), Err(ResourceKeyError::Empty));
        assert_eq!(
            ResourceKey::parse(&"x".repeat(257)),
            Err(ResourceKeyError::TooLong)
        );
    }

    #[test]
    fn test_deserialize_validates() {
        assert!(serde_json::from_str::<ResourceKey>("\"ok_key-1\"").is_ok());
        assert!(serde_json::from_str::<ResourceKey>("\"bad key\"").is_err());
    }
}
