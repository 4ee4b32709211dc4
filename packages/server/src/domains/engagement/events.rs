use serde::{Deserialize, Serialize};

use crate::common::{CommentId, ResourceKey};
use crate::domains::engagement::models::{Comment, LikeRecord};

/// Changes to a resource's engagement, echoed to every subscriber after the
/// store accepted the write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngagementEvent {
    LikesChanged {
        resource_key: ResourceKey,
        likes: LikeRecord,
    },
    CommentAdded {
        resource_key: ResourceKey,
        comment: Comment,
    },
    CommentUpdated {
        resource_key: ResourceKey,
        comment: Comment,
    },
    CommentDeleted {
        resource_key: ResourceKey,
        comment_id: CommentId,
    },
}

impl EngagementEvent {
    pub fn resource_key(&self) -> &ResourceKey {
        match self {
            EngagementEvent::LikesChanged { resource_key, .. }
            | EngagementEvent::CommentAdded { resource_key, .. }
            | EngagementEvent::CommentUpdated { resource_key, .. }
            | EngagementEvent::CommentDeleted { resource_key, .. } => resource_key,
        }
    }
}

/// StreamHub topic for one resource.
pub fn topic(resource: &ResourceKey) -> String {
    format!("engagement:{}", resource)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::MemberId;

    #[test]
    fn test_tagged_with_type() {
        let key = ResourceKey::parse("place_1").unwrap();
        let mut likes = LikeRecord::default();
        likes.toggle(MemberId::new());

        let value = serde_json::to_value(EngagementEvent::LikesChanged {
            resource_key: key.clone(),
            likes,
        })
        .unwrap();

        assert_eq!(value["type"], "likes_changed");
        assert_eq!(value["resource_key"], "place_1");
        assert_eq!(value["likes"]["count"], 1);
        assert_eq!(topic(&key), "engagement:place_1");
    }
}
