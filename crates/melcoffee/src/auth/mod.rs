//! Operator authentication for the catalog admin endpoints.
//!
//! Two credentials are accepted: a shared admin token (header or query
//! parameter) for scripts, and a password login that issues a session cookie
//! for the browser admin page.

mod router;
mod session;

pub use router::{auth_router, require_admin, ADMIN_TOKEN_HEADER, SESSION_COOKIE};
pub use session::SessionStore;

use std::time::Duration;
use subtle::ConstantTimeEq;

pub const DEFAULT_ADMIN_SECRET: &str = "changeme";

/// Credentials and session policy for the admin surface.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    pub password: String,
    pub token: String,
    pub session_ttl: Duration,
}

impl AdminConfig {
    pub fn uses_default_credentials(&self) -> bool {
        self.password == DEFAULT_ADMIN_SECRET || self.token == DEFAULT_ADMIN_SECRET
    }
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            password: DEFAULT_ADMIN_SECRET.to_string(),
            token: DEFAULT_ADMIN_SECRET.to_string(),
            session_ttl: Duration::from_secs(24 * 60 * 60),
        }
    }
}

/// Verifies admin credentials and tracks logged-in sessions.
#[derive(Debug)]
pub struct AdminAuth {
    password: String,
    token: String,
    sessions: SessionStore,
}

impl AdminAuth {
    pub fn new(config: &AdminConfig) -> Self {
        Self {
            password: config.password.clone(),
            token: config.token.clone(),
            sessions: SessionStore::new(config.session_ttl),
        }
    }

    pub fn session_ttl(&self) -> Duration {
        self.sessions.ttl()
    }

    /// Exchange a password for a new session id.
    pub fn login(&self, password: Option<&str>) -> Result<String, AuthError> {
        let password = password
            .filter(|value| !value.is_empty())
            .ok_or(AuthError::MissingPassword)?;
        if !constant_time_eq(password, &self.password) {
            return Err(AuthError::InvalidCredentials);
        }
        Ok(self.sessions.create())
    }

    pub fn logout(&self, session_id: &str) {
        self.sessions.revoke(session_id);
    }

    pub fn verify_token(&self, candidate: &str) -> bool {
        !candidate.is_empty() && !self.token.is_empty() && constant_time_eq(candidate, &self.token)
    }

    pub fn has_session(&self, session_id: &str) -> bool {
        self.sessions.is_live(session_id)
    }
}

fn constant_time_eq(left: &str, right: &str) -> bool {
    left.as_bytes().ct_eq(right.as_bytes()).into()
}

/// Login failures surfaced to the client.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("password required")]
    MissingPassword,
    #[error("invalid")]
    InvalidCredentials,
}
