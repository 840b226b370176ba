use crate::types::{Role, Session};
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid email or password.")]
    InvalidCredentials,
    #[error("Authentication service unreachable: {0}")]
    Unreachable(String),
}

/// The credential exchange. Any implementation works as long as it settles
/// with a full [`Session`] or an [`AuthError`].
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(&self, email: &str, password: &str) -> Result<Session, AuthError>;
}

/// Stand-in for the identity provider: waits, then accepts any credentials
/// as the demo administrator.
#[derive(Debug, Clone)]
pub struct SimulatedAuthenticator {
    delay: Duration,
}

impl SimulatedAuthenticator {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Default for SimulatedAuthenticator {
    fn default() -> Self {
        Self::new(Duration::from_millis(1000))
    }
}

#[async_trait]
impl Authenticator for SimulatedAuthenticator {
    async fn authenticate(&self, email: &str, _password: &str) -> Result<Session, AuthError> {
        tokio::time::sleep(self.delay).await;
        Ok(Session {
            user_id: "1".to_string(),
            email: email.to_string(),
            display_name: "John Doe".to_string(),
            role: Role::Admin,
        })
    }
}
