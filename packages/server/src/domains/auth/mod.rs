pub mod actions;
pub mod jwt;
pub mod models;
pub mod session;

pub use actions::{sign_in, sign_out, SignedIn};
pub use jwt::{Claims, IdentityClaims, JwtService};
pub use models::Member;
pub use session::{
    GuardOutcome, SessionGuard, SessionRegistry, SessionState, SessionUser, SIGN_IN_ROUTE,
};
