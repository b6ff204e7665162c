//! Session authentication for the Aluro gateway
//!
//! The gateway never issues credentials; it validates access tokens minted
//! by the external auth service and refreshes them when they expire.

pub mod client;
pub mod jwt;
pub mod session;

pub use client::{AuthClient, AuthClientError, TokenPair};
pub use jwt::{SessionClaims, SessionJwt, SessionJwtError};
pub use session::{SessionContext, SessionUser, ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE};
