//! Per-resource view of likes and comments bound to the engagement store.
//!
//! Update policy: local state changes optimistically before each write, is
//! replaced with what the store returned once the write succeeds, and is rolled
//! back if it fails. New comments are the exception: they appear locally only
//! after the store has assigned an id. Every successful write is echoed on the
//! resource's stream topic, and `apply` folds echoed events back in.

use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

use crate::common::{CommentId, ResourceKey};
use crate::domains::auth::SessionUser;
use crate::domains::engagement::events::{topic, EngagementEvent};
use crate::domains::engagement::models::{
    Comment, LikeRecord, LikeToggle, NewComment, MAX_COMMENT_CHARS,
};
use crate::kernel::{BaseEngagementStore, StreamHub};

#[derive(Debug, Error)]
pub enum EngagementError {
    #[error("Please sign in to {0}")]
    SignInRequired(&'static str),

    #[error("Comment cannot be empty")]
    EmptyComment,

    #[error("Comment is longer than {MAX_COMMENT_CHARS} characters")]
    CommentTooLong,

    #[error("Comment not found")]
    CommentNotFound,

    #[error("Only the author can change this comment")]
    NotAuthor,

    #[error("Engagement store error: {0}")]
    Store(#[from] anyhow::Error),
}

pub struct EngagementBinding {
    resource: ResourceKey,
    viewer: Option<SessionUser>,
    store: Arc<dyn BaseEngagementStore>,
    hub: StreamHub,
    likes: LikeRecord,
    comments: Vec<Comment>,
}

impl EngagementBinding {
    /// Load current likes and comments for a resource.
    pub async fn attach(
        resource: ResourceKey,
        viewer: Option<SessionUser>,
        store: Arc<dyn BaseEngagementStore>,
        hub: StreamHub,
    ) -> Result<Self, EngagementError> {
        let likes = store.likes(&resource).await?;
        let comments = store.comments(&resource).await?;

        Ok(Self {
            resource,
            viewer,
            store,
            hub,
            likes,
            comments,
        })
    }

    pub fn resource(&self) -> &ResourceKey {
        &self.resource
    }

    pub fn likes(&self) -> &LikeRecord {
        &self.likes
    }

    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    pub fn liked_by_viewer(&self) -> bool {
        self.viewer
            .as_ref()
            .is_some_and(|v| self.likes.liked_by(v.member_id))
    }

    /// Whether the viewer may edit or delete this comment.
    pub fn can_modify(&self, comment: &Comment) -> bool {
        self.viewer
            .as_ref()
            .is_some_and(|v| comment.is_authored_by(v.member_id))
    }

    fn viewer(&self, action: &'static str) -> Result<&SessionUser, EngagementError> {
        self.viewer
            .as_ref()
            .ok_or(EngagementError::SignInRequired(action))
    }

    /// Toggle the viewer's like.
    ///
    /// Reads the stored record, flips membership and writes the whole record
    /// back. Not atomic: two members toggling at once can lose one update.
    pub async fn toggle_like(&mut self) -> Result<LikeToggle, EngagementError> {
        let member = self.viewer("like a resource")?.member_id;
        let previous = self.likes.clone();
        self.likes.toggle(member);

        let store = Arc::clone(&self.store);
        let written = async {
            let mut record = store.likes(&self.resource).await?;
            let outcome = record.toggle(member);
            store.put_likes(&self.resource, &record).await?;
            Ok::<_, anyhow::Error>((outcome, record))
        }
        .await;

        match written {
            Ok((outcome, record)) => {
                debug!(resource = %self.resource, ?outcome, count = record.count(), "Like toggled");
                self.likes = record.clone();
                self.publish(EngagementEvent::LikesChanged {
                    resource_key: self.resource.clone(),
                    likes: record,
                })
                .await;
                Ok(outcome)
            }
            Err(e) => {
                warn!(resource = %self.resource, error = %e, "Like toggle failed, rolling back");
                self.likes = previous;
                Err(EngagementError::Store(e))
            }
        }
    }

    pub async fn add_comment(&mut self, text: &str) -> Result<Comment, EngagementError> {
        let viewer = self.viewer("comment")?;
        let text = validate_text(text)?;
        let draft = NewComment {
            author_id: viewer.member_id,
            author_name: viewer.display_name.clone(),
            text,
        };

        let comment = self.store.append_comment(&self.resource, draft).await?;
        self.upsert_local(comment.clone());
        self.publish(EngagementEvent::CommentAdded {
            resource_key: self.resource.clone(),
            comment: comment.clone(),
        })
        .await;
        Ok(comment)
    }

    /// Replace the text of the viewer's own comment. The id is preserved.
    pub async fn edit_comment(
        &mut self,
        id: CommentId,
        text: &str,
    ) -> Result<Comment, EngagementError> {
        let member = self.viewer("edit a comment")?.member_id;
        let text = validate_text(text)?;
        let existing = self.authored_comment(id, member).await?;

        let previous = self.local_index(id).map(|i| self.comments[i].clone());
        let mut optimistic = existing;
        optimistic.text = text.clone();
        self.upsert_local(optimistic);

        match self.store.overwrite_comment(&self.resource, id, &text).await {
            Ok(comment) => {
                self.upsert_local(comment.clone());
                self.publish(EngagementEvent::CommentUpdated {
                    resource_key: self.resource.clone(),
                    comment: comment.clone(),
                })
                .await;
                Ok(comment)
            }
            Err(e) => {
                warn!(resource = %self.resource, comment_id = %id, error = %e, "Comment edit failed, rolling back");
                match previous {
                    Some(comment) => self.upsert_local(comment),
                    None => self.remove_local(id),
                }
                Err(EngagementError::Store(e))
            }
        }
    }

    /// Delete the viewer's own comment. Irreversible.
    pub async fn delete_comment(&mut self, id: CommentId) -> Result<(), EngagementError> {
        let member = self.viewer("delete a comment")?.member_id;
        self.authored_comment(id, member).await?;

        let removed = self
            .local_index(id)
            .map(|i| (i, self.comments.remove(i)));

        match self.store.delete_comment(&self.resource, id).await {
            Ok(()) => {
                self.publish(EngagementEvent::CommentDeleted {
                    resource_key: self.resource.clone(),
                    comment_id: id,
                })
                .await;
                Ok(())
            }
            Err(e) => {
                warn!(resource = %self.resource, comment_id = %id, error = %e, "Comment delete failed, rolling back");
                if let Some((index, comment)) = removed {
                    self.comments.insert(index.min(self.comments.len()), comment);
                }
                Err(EngagementError::Store(e))
            }
        }
    }

    /// Fold an echoed event into local state. Events for other resources are ignored.
    pub fn apply(&mut self, event: &EngagementEvent) {
        if event.resource_key() != &self.resource {
            return;
        }
        match event {
            EngagementEvent::LikesChanged { likes, .. } => self.likes = likes.clone(),
            EngagementEvent::CommentAdded { comment, .. }
            | EngagementEvent::CommentUpdated { comment, .. } => {
                self.upsert_local(comment.clone())
            }
            EngagementEvent::CommentDeleted { comment_id, .. } => self.remove_local(*comment_id),
        }
    }

    /// Authorship is checked against the stored comment, not local state.
    async fn authored_comment(
        &self,
        id: CommentId,
        member: crate::common::MemberId,
    ) -> Result<Comment, EngagementError> {
        let comment = self
            .store
            .find_comment(&self.resource, id)
            .await?
            .ok_or(EngagementError::CommentNotFound)?;
        if !comment.is_authored_by(member) {
            return Err(EngagementError::NotAuthor);
        }
        Ok(comment)
    }

    fn local_index(&self, id: CommentId) -> Option<usize> {
        self.comments.iter().position(|c| c.id == id)
    }

    fn upsert_local(&mut self, comment: Comment) {
        match self.local_index(comment.id) {
            Some(i) => self.comments[i] = comment,
            None => {
                self.comments.push(comment);
                self.comments.sort_by_key(|c| c.id);
            }
        }
    }

    fn remove_local(&mut self, id: CommentId) {
        self.comments.retain(|c| c.id != id);
    }

    async fn publish(&self, event: EngagementEvent) {
        self.hub.publish(&topic(&self.resource), &event).await;
    }
}

fn validate_text(text: &str) -> Result<String, EngagementError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(EngagementError::EmptyComment);
    }
    if text.chars().count() > MAX_COMMENT_CHARS {
        return Err(EngagementError::CommentTooLong);
    }
    Ok(text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::MemberId;
    use crate::kernel::test_dependencies::InMemoryEngagementStore;
    use uuid::Uuid;

    fn viewer(name: &str) -> SessionUser {
        SessionUser {
            session_id: Uuid::new_v4(),
            member_id: MemberId::new(),
            display_name: name.to_string(),
            email: None,
            photo_url: None,
        }
    }

    fn key() -> ResourceKey {
        ResourceKey::parse("ChIJ_shelter_1").unwrap()
    }

    async fn bind(
        store: &Arc<InMemoryEngagementStore>,
        hub: &StreamHub,
        viewer: Option<SessionUser>,
    ) -> EngagementBinding {
        EngagementBinding::attach(key(), viewer, store.clone(), hub.clone())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_toggle_twice_restores_record() {
        let store = Arc::new(InMemoryEngagementStore::new());
        let hub = StreamHub::new();
        let other = MemberId::new();
        let mut seeded = LikeRecord::default();
        seeded.toggle(other);
        store.seed_likes(&key(), seeded.clone());

        let mut binding = bind(&store, &hub, Some(viewer("Asha"))).await;
        assert_eq!(binding.toggle_like().await.unwrap(), LikeToggle::Liked);
        assert_eq!(binding.likes().count(), 2);
        assert!(binding.liked_by_viewer());

        assert_eq!(binding.toggle_like().await.unwrap(), LikeToggle::Unliked);
        assert_eq!(binding.likes(), &seeded);
        assert_eq!(store.likes(&key()).await.unwrap(), seeded);
    }

    #[tokio::test]
    async fn test_toggle_like_requires_sign_in() {
        let store = Arc::new(InMemoryEngagementStore::new());
        let mut binding = bind(&store, &StreamHub::new(), None).await;

        let err = binding.toggle_like().await.unwrap_err();
        assert!(matches!(err, EngagementError::SignInRequired(_)));
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_failed_like_rolls_back() {
        let store = Arc::new(InMemoryEngagementStore::new());
        let mut binding = bind(&store, &StreamHub::new(), Some(viewer("Asha"))).await;
        store.fail_writes(true);

        assert!(matches!(
            binding.toggle_like().await,
            Err(EngagementError::Store(_))
        ));
        assert_eq!(binding.likes(), &LikeRecord::default());
    }

    #[tokio::test]
    async fn test_toggle_reads_fresh_remote_state() {
        let store = Arc::new(InMemoryEngagementStore::new());
        let hub = StreamHub::new();
        let asha = viewer("Asha");
        let mut stale = bind(&store, &hub, Some(asha.clone())).await;

        // Someone else likes it after we attached
        let mut other = bind(&store, &hub, Some(viewer("Ravi"))).await;
        other.toggle_like().await.unwrap();

        stale.toggle_like().await.unwrap();
        assert_eq!(stale.likes().count(), 2);
    }

    #[tokio::test]
    async fn test_add_comment_stamps_author() {
        let store = Arc::new(InMemoryEngagementStore::new());
        let asha = viewer("Asha");
        let mut binding = bind(&store, &StreamHub::new(), Some(asha.clone())).await;

        let comment = binding.add_comment("  Very helpful staff ").await.unwrap();
        assert_eq!(comment.text, "Very helpful staff");
        assert_eq!(comment.author_id, asha.member_id);
        assert_eq!(comment.author_name, "Asha");
        assert_eq!(binding.comments(), &[comment]);
    }

    #[tokio::test]
    async fn test_add_comment_validates_text() {
        let store = Arc::new(InMemoryEngagementStore::new());
        let mut binding = bind(&store, &StreamHub::new(), Some(viewer("Asha"))).await;

        assert!(matches!(
            binding.add_comment("   ").await,
            Err(EngagementError::EmptyComment)
        ));
        assert!(matches!(
            binding.add_comment(&"a".repeat(MAX_COMMENT_CHARS + 1)).await,
            Err(EngagementError::CommentTooLong)
        ));
        assert!(binding.comments().is_empty());
    }

    #[tokio::test]
    async fn test_edit_by_non_author_rejected() {
        let store = Arc::new(InMemoryEngagementStore::new());
        let hub = StreamHub::new();
        let mut author = bind(&store, &hub, Some(viewer("Asha"))).await;
        let comment = author.add_comment("Open late on Fridays").await.unwrap();

        // Same display name, different member
        let mut impostor = bind(&store, &hub, Some(viewer("Asha"))).await;
        let writes_before = store.write_count();

        assert!(matches!(
            impostor.edit_comment(comment.id, "Closed").await,
            Err(EngagementError::NotAuthor)
        ));
        assert!(matches!(
            impostor.delete_comment(comment.id).await,
            Err(EngagementError::NotAuthor)
        ));
        assert_eq!(store.write_count(), writes_before);
        assert_eq!(
            store.find_comment(&key(), comment.id).await.unwrap(),
            Some(comment)
        );
    }

    #[tokio::test]
    async fn test_edit_by_author_keeps_id() {
        let store = Arc::new(InMemoryEngagementStore::new());
        let mut binding = bind(&store, &StreamHub::new(), Some(viewer("Asha"))).await;
        let original = binding.add_comment("Open late").await.unwrap();

        let edited = binding
            .edit_comment(original.id, "Open until 10pm")
            .await
            .unwrap();
        assert_eq!(edited.id, original.id);
        assert_eq!(edited.text, "Open until 10pm");
        assert!(edited.updated_at >= original.updated_at);
        assert_eq!(binding.comments(), &[edited]);
    }

    #[tokio::test]
    async fn test_failed_edit_rolls_back() {
        let store = Arc::new(InMemoryEngagementStore::new());
        let mut binding = bind(&store, &StreamHub::new(), Some(viewer("Asha"))).await;
        let original = binding.add_comment("Open late").await.unwrap();
        store.fail_writes(true);

        assert!(binding.edit_comment(original.id, "changed").await.is_err());
        assert_eq!(binding.comments(), &[original]);
    }

    #[tokio::test]
    async fn test_delete_comment() {
        let store = Arc::new(InMemoryEngagementStore::new());
        let mut binding = bind(&store, &StreamHub::new(), Some(viewer("Asha"))).await;
        let comment = binding.add_comment("Duplicate").await.unwrap();

        binding.delete_comment(comment.id).await.unwrap();
        assert!(binding.comments().is_empty());
        assert!(matches!(
            binding.delete_comment(comment.id).await,
            Err(EngagementError::CommentNotFound)
        ));
    }

    #[tokio::test]
    async fn test_failed_delete_rolls_back() {
        let store = Arc::new(InMemoryEngagementStore::new());
        let mut binding = bind(&store, &StreamHub::new(), Some(viewer("Asha"))).await;
        let comment = binding.add_comment("Keep me").await.unwrap();
        store.fail_writes(true);

        assert!(binding.delete_comment(comment.id).await.is_err());
        assert_eq!(binding.comments(), &[comment]);
    }

    #[tokio::test]
    async fn test_mutations_are_echoed_to_other_bindings() {
        let store = Arc::new(InMemoryEngagementStore::new());
        let hub = StreamHub::new();
        let mut rx = hub.subscribe(&topic(&key())).await;

        let mut watcher = bind(&store, &hub, None).await;
        let mut actor = bind(&store, &hub, Some(viewer("Asha"))).await;

        actor.toggle_like().await.unwrap();
        let comment = actor.add_comment("Clean and safe").await.unwrap();

        for _ in 0..2 {
            let event: EngagementEvent = serde_json::from_value(rx.recv().await.unwrap()).unwrap();
            watcher.apply(&event);
        }

        assert_eq!(watcher.likes().count(), 1);
        assert_eq!(watcher.comments(), &[comment]);
    }

    #[tokio::test]
    async fn test_apply_ignores_other_resources() {
        let store = Arc::new(InMemoryEngagementStore::new());
        let mut binding = bind(&store, &StreamHub::new(), None).await;
        let mut likes = LikeRecord::default();
        likes.toggle(MemberId::new());

        binding.apply(&EngagementEvent::LikesChanged {
            resource_key: ResourceKey::parse("somewhere_else").unwrap(),
            likes,
        });
        assert_eq!(binding.likes().count(), 0);
    }
}
