//! Session store: the single source of truth for "who is signed in".
//!
//! Reconciles three inputs: the persisted cache, the profile the server returns
//! when the cached token is re-validated, and explicit user actions (login,
//! logout). Verification failures are split by cause:
//!
//! - 401/403 from the identity endpoint invalidate the session;
//! - anything else (offline, timeout, 5xx, bad body) keeps the cached session
//!   and marks it `Stale`.
//!
//! Sign-in exchanges are serialized with an async mutex and flagged on the
//! shared core for their whole duration, so a background verification that
//! lands mid-exchange never clears the session being established.

use std::sync::Arc;

use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::errors::{AuthError, ClientError};
use crate::models::user::{GoogleAuthRequest, LoginRequest, RegisterRequest};
use crate::models::{User, UserUpdate};

pub mod federated;
mod identity;
pub mod state;

pub use state::{SessionCore, SessionPhase, SessionSnapshot, Verification};
pub use identity::IdentityApi;

pub struct SessionService {
    core: Arc<SessionCore>,
    identity: Arc<dyn IdentityApi>,
    exchange_lock: Mutex<()>,
}

impl SessionService {
    pub fn new(core: Arc<SessionCore>, identity: Arc<dyn IdentityApi>) -> Self {
        Self {
            core,
            identity,
            exchange_lock: Mutex::new(()),
        }
    }

    pub fn core(&self) -> &Arc<SessionCore> {
        &self.core
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.core.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.core.subscribe()
    }

    /// Exposes the cached token and profile immediately, before any network call.
    pub fn restore_cached(&self) -> SessionSnapshot {
        self.core.load_cached()
    }

    /// Re-validates the current token against `GET /api/auth/me`.
    /// Always leaves `loading` false when it returns.
    pub async fn verify(&self) -> SessionSnapshot {
        let Some((token, generation)) = self.core.begin_verification() else {
            debug!("No cached token; nothing to verify");
            return self.core.snapshot();
        };

        match self.identity.current_user(&token).await {
            Ok(user) => {
                if self.core.commit_verified(generation, &token, user) {
                    info!("Session verified");
                } else {
                    debug!("Session changed during verification; discarding refreshed profile");
                }
            }
            Err(e) if e.is_authoritative_rejection() => {
                if self.core.invalidate_background(generation, &token) {
                    warn!("Cached session rejected by server: {e}");
                }
            }
            Err(e) => {
                if self.core.mark_stale(generation, &token) {
                    warn!("Could not verify session, keeping cached profile: {e}");
                }
            }
        }

        self.core.settle_loading();
        self.core.snapshot()
    }

    /// Cached restore followed by verification, awaited inline.
    pub async fn restore(&self) -> SessionSnapshot {
        self.restore_cached();
        self.verify().await
    }

    /// Cached restore now, verification in the background.
    /// The returned snapshot is the tentative session views can render from.
    pub fn spawn_restore(self: &Arc<Self>) -> (SessionSnapshot, JoinHandle<SessionSnapshot>) {
        let tentative = self.restore_cached();
        let service = Arc::clone(self);
        let handle = tokio::spawn(async move { service.verify().await });
        (tentative, handle)
    }

    /// Exchanges email and password for a session and returns the fresh profile.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, ClientError> {
        let _exchange = self.core.begin_exchange();
        let _serial = self.exchange_lock.lock().await;

        info!("Signing in {email}");
        let token = self
            .identity
            .login(&LoginRequest {
                email: email.to_string(),
                password: password.to_string(),
            })
            .await?;
        self.establish(token.access_token).await
    }

    /// Exchanges a third-party identity assertion for a session.
    pub async fn federated_login(&self, credential: &str) -> Result<User, ClientError> {
        let _exchange = self.core.begin_exchange();
        let _serial = self.exchange_lock.lock().await;

        info!("Signing in with federated credential");
        let token = self
            .identity
            .google_auth(&GoogleAuthRequest {
                credential: credential.to_string(),
            })
            .await?;
        self.establish(token.access_token).await
    }

    /// Creates an account. Does not sign in.
    pub async fn register(&self, req: &RegisterRequest) -> Result<User, ClientError> {
        let _exchange = self.core.begin_exchange();
        info!("Registering {}", req.email);
        self.identity.register(req).await
    }

    /// Creates an account and signs in with the same credentials.
    pub async fn register_and_login(&self, req: &RegisterRequest) -> Result<User, ClientError> {
        let _exchange = self.core.begin_exchange();
        let _serial = self.exchange_lock.lock().await;

        info!("Registering {} and signing in", req.email);
        self.identity.register(req).await?;
        let token = self
            .identity
            .login(&LoginRequest {
                email: req.email.clone(),
                password: req.password.clone(),
            })
            .await?;
        self.establish(token.access_token).await
    }

    /// Fetches the profile for a new token and commits both together.
    async fn establish(&self, token: String) -> Result<User, ClientError> {
        let user = self.identity.current_user(&token).await?;
        self.core.commit_login(token, user.clone())?;
        info!("Signed in as {} ({:?})", user.email, user.role);
        Ok(user)
    }

    /// Clears the session unconditionally.
    pub fn logout(&self) {
        if let Err(e) = self.core.clear() {
            warn!("Session cleared in memory but not in storage: {e}");
        }
        info!("Signed out");
    }

    /// Merges a partial profile into the cached one and persists it.
    pub fn update_profile(&self, update: &UserUpdate) -> Result<User, ClientError> {
        self.core.merge_profile(update)
    }

    /// Sends a profile update to the server and caches the server's copy.
    pub async fn save_profile(&self, update: &UserUpdate) -> Result<User, ClientError> {
        let token = self.core.token().ok_or(AuthError::SignedOut)?;
        let user = self.identity.update_current_user(&token, update).await?;
        self.core.replace_profile(&token, user)
    }
}
