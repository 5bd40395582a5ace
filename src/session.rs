//! In-memory auth session for the running client.

use zeroize::Zeroizing;

use crate::models::User;

/// Authenticated session: the signed-in user plus their bearer token.
///
/// The token lives in a [`Zeroizing`] wrapper so it is wiped from memory
/// when the session is dropped.
pub struct AuthSession {
    token: Zeroizing<String>,
    user: User,
}

impl AuthSession {
    #[must_use]
    pub fn new(token: String, user: User) -> Self {
        Self {
            token: Zeroizing::new(token),
            user,
        }
    }

    /// Bearer token for API requests.
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    /// The signed-in user.
    #[must_use]
    pub fn user(&self) -> &User {
        &self.user
    }

    /// Whether the signed-in user can reach the admin screen.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        matches!(self.user.role, crate::models::UserRole::Admin)
    }
}
