pub mod member;

pub use member::{Member, ANONYMOUS_NAME};
