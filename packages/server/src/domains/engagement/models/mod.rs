pub mod comment;
pub mod like;

pub use comment::{Comment, NewComment, MAX_COMMENT_CHARS};
pub use like::{LikeRecord, LikeRecordMismatch, LikeToggle};
