use thiserror::Error;

/// Authentication and session errors
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Session has ended")]
    SessionEnded,

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}
