//! SSE streaming endpoint.
//!
//! GET /api/resources/:key/stream?token=JWT
//!
//! Forwards the resource's engagement events as SSE, rendered for the
//! subscribed member the same way the REST views are. EventSource can't send
//! custom headers, so the session middleware also accepts the token as a query
//! param. The stream ends as soon as the session is signed out.

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    response::sse::{Event, KeepAlive, Sse},
};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use tokio_stream::wrappers::{errors::BroadcastStreamRecvError, BroadcastStream};
use tracing::{debug, warn};

use crate::common::{CommentId, MemberId, ResourceKey};
use crate::domains::auth::{SessionGuard, SessionState, SessionUser};
use crate::domains::engagement::{topic, EngagementEvent};
use crate::kernel::ServerDeps;
use crate::server::error::ApiError;
use crate::server::routes::engagement::{CommentView, LikesView};

/// An engagement event as one member sees it.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    LikesChanged {
        resource_key: ResourceKey,
        likes: LikesView,
    },
    CommentAdded {
        resource_key: ResourceKey,
        comment: CommentView,
    },
    CommentUpdated {
        resource_key: ResourceKey,
        comment: CommentView,
    },
    CommentDeleted {
        resource_key: ResourceKey,
        comment_id: CommentId,
    },
}

impl StreamEvent {
    pub fn for_viewer(event: EngagementEvent, viewer: MemberId) -> Self {
        match event {
            EngagementEvent::LikesChanged {
                resource_key,
                likes,
            } => StreamEvent::LikesChanged {
                resource_key,
                likes: LikesView::for_viewer(&likes, viewer),
            },
            EngagementEvent::CommentAdded {
                resource_key,
                comment,
            } => StreamEvent::CommentAdded {
                resource_key,
                comment: CommentView::for_viewer(&comment, viewer),
            },
            EngagementEvent::CommentUpdated {
                resource_key,
                comment,
            } => StreamEvent::CommentUpdated {
                resource_key,
                comment: CommentView::for_viewer(&comment, viewer),
            },
            EngagementEvent::CommentDeleted {
                resource_key,
                comment_id,
            } => StreamEvent::CommentDeleted {
                resource_key,
                comment_id,
            },
        }
    }

    /// SSE event name.
    pub fn name(&self) -> &'static str {
        match self {
            StreamEvent::LikesChanged { .. } => "likes_changed",
            StreamEvent::CommentAdded { .. } => "comment_added",
            StreamEvent::CommentUpdated { .. } => "comment_updated",
            StreamEvent::CommentDeleted { .. } => "comment_deleted",
        }
    }
}

/// Decode a hub payload and render it for `viewer`.
fn render(value: serde_json::Value, viewer: MemberId) -> Option<StreamEvent> {
    match serde_json::from_value::<EngagementEvent>(value) {
        Ok(event) => Some(StreamEvent::for_viewer(event, viewer)),
        Err(e) => {
            warn!(error = %e, "Dropping malformed engagement event");
            None
        }
    }
}

pub async fn stream_handler(
    Extension(deps): Extension<Arc<ServerDeps>>,
    Extension(user): Extension<SessionUser>,
    Path(key): Path<String>,
) -> Result<Sse<impl futures::Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let key = ResourceKey::parse(&key)?;
    let rx = deps.stream_hub.subscribe(&topic(&key)).await;

    // Resolves once the session is gone
    let mut guard = SessionGuard::new(deps.sessions.subscribe(user.session_id).await);
    let session_id = user.session_id;
    let signed_out = async move {
        while !matches!(guard.next().await, SessionState::Unauthenticated) {}
        debug!(session_id = %session_id, "Closing stream after sign-out");
    };

    let connected =
        stream::once(async { Ok::<_, Infallible>(Event::default().event("connected").data("ok")) });

    let viewer = user.member_id;
    let events = BroadcastStream::new(rx).filter_map(move |result| async move {
        match result {
            Ok(value) => {
                let event = render(value, viewer)?;
                Event::default()
                    .event(event.name())
                    .json_data(&event)
                    .ok()
                    .map(Ok)
            }
            Err(BroadcastStreamRecvError::Lagged(n)) => Event::default()
                .event("lagged")
                .json_data(serde_json::json!({"missed": n}))
                .ok()
                .map(Ok),
        }
    });

    let stream = connected.chain(events).take_until(Box::pin(signed_out));
    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::engagement::{Comment, LikeRecord};
    use chrono::Utc;

    fn key() -> ResourceKey {
        ResourceKey::parse("place_1").unwrap()
    }

    fn comment(author: MemberId) -> Comment {
        Comment {
            id: CommentId::new(),
            author_id: author,
            author_name: "Asha".to_string(),
            text: "Helpful staff".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_likes_hide_other_members() {
        let (viewer, other) = (MemberId::new(), MemberId::new());
        let likes = LikeRecord::from_parts(2, [viewer, other]).unwrap();
        let payload = serde_json::to_value(EngagementEvent::LikesChanged {
            resource_key: key(),
            likes,
        })
        .unwrap();

        let event = render(payload, viewer).unwrap();
        assert_eq!(event.name(), "likes_changed");

        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "likes_changed");
        assert_eq!(value["likes"]["count"], 2);
        assert_eq!(value["likes"]["liked_by_me"], true);
        assert!(value["likes"].get("users").is_none());
        assert!(!value.to_string().contains(&other.to_string()));
    }

    #[test]
    fn test_comment_hides_author_id() {
        let (author, viewer) = (MemberId::new(), MemberId::new());
        let payload = serde_json::to_value(EngagementEvent::CommentAdded {
            resource_key: key(),
            comment: comment(author),
        })
        .unwrap();

        let value = serde_json::to_value(render(payload, viewer).unwrap()).unwrap();
        assert_eq!(value["comment"]["author_name"], "Asha");
        assert_eq!(value["comment"]["can_modify"], false);
        assert!(value["comment"].get("author_id").is_none());
        assert!(!value.to_string().contains(&author.to_string()));
    }

    #[test]
    fn test_author_may_modify_own_comment() {
        let author = MemberId::new();
        let event = StreamEvent::for_viewer(
            EngagementEvent::CommentUpdated {
                resource_key: key(),
                comment: comment(author),
            },
            author,
        );

        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(event.name(), "comment_updated");
        assert_eq!(value["comment"]["can_modify"], true);
    }

    #[test]
    fn test_malformed_payload_is_dropped() {
        assert!(render(serde_json::json!({"type": "bogus"}), MemberId::new()).is_none());
    }
}
