use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::{CommentId, MemberId};

/// Longest comment accepted, in characters.
pub const MAX_COMMENT_CHARS: usize = 2000;

/// A comment on a resource. Authorship is the member id; the display name is
/// only shown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub id: CommentId,
    pub author_id: MemberId,
    pub author_name: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Comment {
    pub fn is_authored_by(&self, member: MemberId) -> bool {
        self.author_id == member
    }

    /// Human-readable last-change time, e.g. `3/14/2025, 9:05:07 AM`.
    pub fn display_time(&self) -> String {
        self.updated_at.format("%-m/%-d/%Y, %-I:%M:%S %p").to_string()
    }
}

/// A comment before the store has assigned an id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewComment {
    pub author_id: MemberId,
    pub author_name: String,
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_display_time() {
        let at = Utc.with_ymd_and_hms(2025, 3, 14, 21, 5, 7).unwrap();
        let comment = Comment {
            id: CommentId::new(),
            author_id: MemberId::new(),
            author_name: "Asha".to_string(),
            text: "Helpful staff".to_string(),
            created_at: at,
            updated_at: at,
        };
        assert_eq!(comment.display_time(), "3/14/2025, 9:05:07 PM");
    }
}
