//! Middleware layers
//!
//! - Session management (cookie-based sessions backed by an in-memory store)
//!
//! Per-request token storage for the current user is installed by
//! [`install_token_storage`](crate::auth::install_token_storage).

pub mod session;

pub use session::{SessionLayer, SessionMiddleware};
