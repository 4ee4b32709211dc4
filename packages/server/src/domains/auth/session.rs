//! Sessions and the guard that gates protected routes on them.
//!
//! Every open session owns a `watch` channel carrying "current user or none".
//! Signing out sends `None` on it, so anything holding a subscription (a guard
//! evaluating a request, an open SSE stream) loses access on the next check
//! instead of at token expiry.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{watch, RwLock};
use tracing::debug;
use uuid::Uuid;

use crate::common::MemberId;

/// Where unauthenticated requests are sent.
pub const SIGN_IN_ROUTE: &str = "/sign-in";

/// Lifetime of a session and of the token issued for it.
pub const SESSION_TTL_HOURS: i64 = 24;

/// The signed-in member as seen by handlers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionUser {
    pub session_id: Uuid,
    pub member_id: MemberId,
    pub display_name: String,
    pub email: Option<String>,
    pub photo_url: Option<String>,
}

// =============================================================================
// Session Guard
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Checking,
    Authenticated(SessionUser),
    Unauthenticated,
}

/// What a protected view should do right now.
#[derive(Debug, Clone, PartialEq)]
pub enum GuardOutcome {
    /// Still waiting for the first notification.
    Pending,
    Render(SessionUser),
    Redirect(&'static str),
}

/// Three-state guard over a live session subscription.
///
/// Starts in `Checking`. Every notification re-evaluates the state, so a later
/// sign-out revokes access to a view that was already rendered.
pub struct SessionGuard {
    rx: Option<watch::Receiver<Option<SessionUser>>>,
    state: SessionState,
    primed: bool,
}

impl SessionGuard {
    pub fn new(rx: watch::Receiver<Option<SessionUser>>) -> Self {
        Self {
            rx: Some(rx),
            state: SessionState::Checking,
            primed: false,
        }
    }

    /// A guard for a request that has no session at all.
    pub fn unsubscribed() -> Self {
        Self {
            rx: None,
            state: SessionState::Checking,
            primed: false,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn outcome(&self) -> GuardOutcome {
        match &self.state {
            SessionState::Checking => GuardOutcome::Pending,
            SessionState::Authenticated(user) => GuardOutcome::Render(user.clone()),
            SessionState::Unauthenticated => GuardOutcome::Redirect(SIGN_IN_ROUTE),
        }
    }

    /// Apply one notification from the session source.
    pub fn on_notification(&mut self, user: Option<SessionUser>) -> &SessionState {
        self.state = match user {
            Some(user) => SessionState::Authenticated(user),
            None => SessionState::Unauthenticated,
        };
        &self.state
    }

    /// Wait for the next notification and apply it.
    ///
    /// The first call reads the channel's current value; later calls wait for a
    /// change. A closed channel (session dropped) counts as signed out.
    pub async fn next(&mut self) -> &SessionState {
        let user = match self.rx.as_mut() {
            None => None,
            Some(rx) if !self.primed => {
                self.primed = true;
                rx.borrow_and_update().clone()
            }
            Some(rx) => match rx.changed().await {
                Ok(()) => rx.borrow_and_update().clone(),
                Err(_) => None,
            },
        };
        self.on_notification(user)
    }

    /// Evaluate once and return the outcome.
    pub async fn resolve(&mut self) -> GuardOutcome {
        self.next().await;
        self.outcome()
    }
}

// =============================================================================
// Session Registry
// =============================================================================

struct OpenSession {
    tx: watch::Sender<Option<SessionUser>>,
    expires_at: DateTime<Utc>,
}

/// Open sessions by id. Entries leave on sign-out or, once their token has
/// expired, on the next `reap_expired`.
#[derive(Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<Uuid, OpenSession>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a session for a member and return its user record.
    pub async fn open(
        &self,
        member_id: MemberId,
        display_name: String,
        email: Option<String>,
        photo_url: Option<String>,
    ) -> SessionUser {
        let user = SessionUser {
            session_id: Uuid::new_v4(),
            member_id,
            display_name,
            email,
            photo_url,
        };
        let (tx, _rx) = watch::channel(Some(user.clone()));
        let session = OpenSession {
            tx,
            expires_at: Utc::now() + Duration::hours(SESSION_TTL_HOURS),
        };
        self.sessions.write().await.insert(user.session_id, session);
        debug!(session_id = %user.session_id, member_id = %member_id, "Session opened");
        user
    }

    /// Subscribe to a session. Unknown sessions get a channel that already says
    /// "none", so the guard resolves to a redirect.
    pub async fn subscribe(&self, session_id: Uuid) -> watch::Receiver<Option<SessionUser>> {
        match self.sessions.read().await.get(&session_id) {
            Some(session) => session.tx.subscribe(),
            None => watch::channel(None).1,
        }
    }

    /// Close a session and notify every subscriber. Returns false if it was not open.
    pub async fn close(&self, session_id: Uuid) -> bool {
        match self.sessions.write().await.remove(&session_id) {
            Some(session) => {
                session.tx.send_replace(None);
                debug!(session_id = %session_id, "Session closed");
                true
            }
            None => false,
        }
    }

    pub async fn is_open(&self, session_id: Uuid) -> bool {
        self.sessions.read().await.contains_key(&session_id)
    }

    pub async fn open_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Close every session whose token has expired. Returns how many were closed.
    pub async fn reap_expired(&self) -> usize {
        self.reap_expired_at(Utc::now()).await
    }

    async fn reap_expired_at(&self, now: DateTime<Utc>) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|session_id, session| {
            if session.expires_at > now {
                return true;
            }
            session.tx.send_replace(None);
            debug!(session_id = %session_id, "Session expired");
            false
        });
        before - sessions.len()
    }
}
