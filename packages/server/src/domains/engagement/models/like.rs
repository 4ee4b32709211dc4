use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

use crate::common::MemberId;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("like count {count} does not match {users} liking members")]
pub struct LikeRecordMismatch {
    pub count: u32,
    pub users: usize,
}

/// What a toggle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LikeToggle {
    Liked,
    Unliked,
}

/// Aggregate likes for one resource. `count` always equals `users.len()`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawLikeRecord")]
pub struct LikeRecord {
    count: u32,
    users: BTreeSet<MemberId>,
}

#[derive(Deserialize)]
struct RawLikeRecord {
    count: u32,
    users: BTreeSet<MemberId>,
}

impl TryFrom<RawLikeRecord> for LikeRecord {
    type Error = LikeRecordMismatch;

    fn try_from(raw: RawLikeRecord) -> Result<Self, Self::Error> {
        Self::from_parts(raw.count, raw.users)
    }
}

impl LikeRecord {
    /// Rebuild a record read from storage, rejecting a count that disagrees with
    /// the member set.
    pub fn from_parts(
        count: u32,
        users: impl IntoIterator<Item = MemberId>,
    ) -> Result<Self, LikeRecordMismatch> {
        let users: BTreeSet<MemberId> = users.into_iter().collect();
        if count as usize != users.len() {
            return Err(LikeRecordMismatch {
                count,
                users: users.len(),
            });
        }
        Ok(Self { count, users })
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn users(&self) -> impl Iterator<Item = &MemberId> {
        self.users.iter()
    }

    pub fn liked_by(&self, member: MemberId) -> bool {
        self.users.contains(&member)
    }

    /// Flip the member's membership and adjust the count.
    pub fn toggle(&mut self, member: MemberId) -> LikeToggle {
        if self.users.remove(&member) {
            self.count -= 1;
            LikeToggle::Unliked
        } else {
            self.users.insert(member);
            self.count += 1;
            LikeToggle::Liked
        }
    }
}
