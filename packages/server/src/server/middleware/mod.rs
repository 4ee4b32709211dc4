// HTTP middleware
pub mod session_guard;

pub use session_guard::*;
