//! Repositories: one per API resource
//!
//! Each operation builds a request, sends it through the shared
//! [`ApiClient`](crate::api::ApiClient) and returns a typed result. Every
//! failure (missing token, transport, decode, non-success code) comes back
//! as an [`ApiError`]; nothing panics and nothing is retried. Mutations do
//! not touch any cached list, callers re-fetch to observe them.

mod auth;
mod posts;
mod users;

pub use auth::AuthRepository;
pub use posts::PostRepository;
pub use users::UserRepository;

use crate::api::ApiError;
use crate::auth::TokenStore;

/// Token precondition for authenticated calls
///
/// Checked before any request is built, so a missing session never reaches
/// the network.
fn require_token(session: &TokenStore) -> Result<String, ApiError> {
    session
        .token()
        .filter(|t| !t.trim().is_empty())
        .ok_or(ApiError::NotLoggedIn)
}
