//! Authenticated-user state.
//!
//! [`SessionManager`] moves through `Loading -> SignedOut | SignedIn` and
//! keeps the persisted record under the session key in step with that state.
//! Every mutating call holds one operation lock, so `initialize`, `sign_in`
//! and `sign_out` never interleave. A mutation that finds the manager still
//! `Loading` (nobody has started `initialize`) is refused with
//! [`SessionError::NotReady`] instead of racing a later rehydration.

mod auth;
mod record;

pub use auth::{AuthError, Authenticator, SimulatedAuthenticator};
pub use record::{RehydrationError, SessionRecord, RECORD_VERSION};

use crate::redact::{redact_email, redact_secrets};
use crate::store::{KeyValueStore, StoreError, StoreOp};
use crate::types::Session;
use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{watch, Mutex};
use tokio_util::sync::CancellationToken;

pub const DEFAULT_SESSION_KEY: &str = "user";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Loading,
    SignedOut,
    SignedIn(Session),
}

impl SessionState {
    pub fn user(&self) -> Option<&Session> {
        match self {
            Self::SignedIn(session) => Some(session),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Please enter both email and password")]
    Validation,
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("Session is still loading.")]
    NotReady,
    #[error("Sign-in was cancelled.")]
    Cancelled,
}

pub struct SessionManager {
    store: Arc<dyn KeyValueStore>,
    auth: Arc<dyn Authenticator>,
    session_key: String,
    ttl: Option<chrono::Duration>,
    state: watch::Sender<SessionState>,
    op_lock: Mutex<()>,
}

impl SessionManager {
    pub fn new(store: Arc<dyn KeyValueStore>, auth: Arc<dyn Authenticator>) -> Self {
        let (state, _) = watch::channel(SessionState::Loading);
        Self {
            store,
            auth,
            session_key: DEFAULT_SESSION_KEY.to_string(),
            ttl: None,
            state,
            op_lock: Mutex::new(()),
        }
    }

    pub fn with_session_key(mut self, key: impl Into<String>) -> Self {
        self.session_key = key.into();
        self
    }

    pub fn with_ttl(mut self, ttl: Option<chrono::Duration>) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn session_key(&self) -> &str {
        &self.session_key
    }

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn user(&self) -> Option<Session> {
        self.state.borrow().user().cloned()
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(*self.state.borrow(), SessionState::SignedIn(_))
    }

    pub fn is_loading(&self) -> bool {
        matches!(*self.state.borrow(), SessionState::Loading)
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Rehydrates from the store. Runs once; later calls return the settled
    /// state without touching the store. Never fails: anything unreadable is
    /// signed-out.
    pub async fn initialize(&self) -> SessionState {
        let _guard = self.op_lock.lock().await;
        if !self.is_loading() {
            return self.state();
        }

        let next = match self.store.get(&self.session_key).await {
            Ok(None) => SessionState::SignedOut,
            Ok(Some(raw)) => match SessionRecord::decode(&raw, Utc::now()) {
                Ok(Some(session)) => SessionState::SignedIn(session),
                Ok(None) => SessionState::SignedOut,
                Err(err) => {
                    tracing::warn!(key = %self.session_key, error = %err, "discarding unreadable session record");
                    if let Err(err) = self.store.delete(&self.session_key).await {
                        tracing::debug!(error = %err, "could not clear unreadable session record");
                    }
                    SessionState::SignedOut
                }
            },
            Err(err) => {
                tracing::warn!(error = %err, "session store unavailable during rehydration");
                SessionState::SignedOut
            }
        };

        match &next {
            SessionState::SignedIn(session) => tracing::info!(
                user = %redact_email(&session.email),
                role = ?session.role,
                "session restored"
            ),
            _ => tracing::info!("no stored session"),
        }
        self.state.send_replace(next.clone());
        next
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, SessionError> {
        self.sign_in_cancellable(email, password, &CancellationToken::new())
            .await
    }

    /// Signs in unless `cancel` fires first. Only a fully built record is
    /// ever written, and state changes only after the write lands.
    pub async fn sign_in_cancellable(
        &self,
        email: &str,
        password: &str,
        cancel: &CancellationToken,
    ) -> Result<Session, SessionError> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(SessionError::Validation);
        }

        let _guard = self.op_lock.lock().await;
        self.ensure_ready()?;

        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            result = self.auth.authenticate(email, password) => Some(result),
        };
        let session = match outcome {
            None => {
                tracing::info!(user = %redact_email(email), "sign-in cancelled");
                return Err(SessionError::Cancelled);
            }
            Some(Err(err)) => {
                tracing::warn!(
                    user = %redact_email(email),
                    error = %redact_secrets(&err.to_string()),
                    "authentication rejected"
                );
                return Err(err.into());
            }
            Some(Ok(session)) => session,
        };
        if cancel.is_cancelled() {
            return Err(SessionError::Cancelled);
        }

        let record = SessionRecord::new(session.clone(), Utc::now(), self.ttl);
        let encoded = record
            .encode()
            .map_err(|err| StoreError::new(StoreOp::Set, self.session_key.as_str(), err))?;
        if let Err(err) = self.store.set(&self.session_key, &encoded).await {
            tracing::warn!(error = %err, "failed to persist session, keeping previous state");
            return Err(err.into());
        }

        self.state.send_replace(SessionState::SignedIn(session.clone()));
        tracing::info!(user = %redact_email(&session.email), role = ?session.role, "signed in");
        Ok(session)
    }

    /// Local sign-out always happens. A failed delete is logged and returned
    /// after the state is already signed-out.
    pub async fn sign_out(&self) -> Result<(), SessionError> {
        let _guard = self.op_lock.lock().await;
        self.ensure_ready()?;

        let result = self.store.delete(&self.session_key).await;
        self.state.send_replace(SessionState::SignedOut);

        match result {
            Ok(()) => {
                tracing::info!("signed out");
                Ok(())
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to delete session record, writing tombstone");
                // An empty value rehydrates as signed-out.
                if let Err(tomb_err) = self.store.set(&self.session_key, "").await {
                    tracing::warn!(error = %tomb_err, "failed to write session tombstone");
                }
                Err(err.into())
            }
        }
    }

    fn ensure_ready(&self) -> Result<(), SessionError> {
        if self.is_loading() {
            Err(SessionError::NotReady)
        } else {
            Ok(())
        }
    }
}
