//! Shared session state: the persisted token/profile pair plus the bookkeeping
//! that stops a slow background verification from overwriting a newer login
//! or logout.
//!
//! Every mutation happens under one mutex together with its storage write, and
//! bumps `generation` when it changes who is signed in. Background work records
//! the generation it started under and only commits if nothing moved since.
//! A result that lands while a sign-in exchange is running is held back and
//! applied when the exchange ends without committing a new session.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::errors::{AuthError, ClientError};
use crate::models::{User, UserUpdate};
use crate::storage::{KeyValueStore, StorageError};

pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "user";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verification {
    /// Loaded from cache (or nothing loaded yet); the server has not been asked.
    Unverified,
    Verifying,
    Verified,
    /// Verification failed for a non-authoritative reason; the cached profile is kept.
    Stale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Anonymous,
    Authenticating,
    Authenticated,
}

/// Point-in-time view of the session handed to views and subscribers.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub token: Option<String>,
    pub user: Option<User>,
    pub verification: Verification,
    pub loading: bool,
    pub phase: SessionPhase,
}

impl SessionSnapshot {
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some() && self.user.is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.user.as_ref().is_some_and(User::is_admin)
    }
}

/// What a finished background verification wants to do to the session.
enum Outcome {
    Verified(User),
    Stale,
    Rejected,
}

struct Deferred {
    generation: u64,
    token: String,
    outcome: Outcome,
}

struct Inner {
    token: Option<String>,
    user: Option<User>,
    verification: Verification,
    loading: bool,
    generation: u64,
    exchanges: usize,
    deferred: Option<Deferred>,
}

impl Inner {
    fn snapshot(&self) -> SessionSnapshot {
        // A profile without a token is never exposed.
        let user = self.token.as_ref().and(self.user.clone());
        let phase = if self.exchanges > 0 {
            SessionPhase::Authenticating
        } else if user.is_some() {
            SessionPhase::Authenticated
        } else {
            SessionPhase::Anonymous
        };
        SessionSnapshot {
            token: self.token.clone(),
            user,
            verification: self.verification,
            loading: self.loading,
            phase,
        }
    }

    fn is_current(&self, generation: u64, token: &str) -> bool {
        self.generation == generation && self.token.as_deref() == Some(token)
    }
}

/// The single owner of session state. Shared by the session service and the
/// API gateway, which needs the token for every request and may invalidate it.
pub struct SessionCore {
    store: Arc<dyn KeyValueStore>,
    inner: Mutex<Inner>,
    changes: watch::Sender<SessionSnapshot>,
}

impl SessionCore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Arc<Self> {
        let inner = Inner {
            token: None,
            user: None,
            verification: Verification::Unverified,
            loading: true,
            generation: 0,
            exchanges: 0,
            deferred: None,
        };
        let (changes, _) = watch::channel(inner.snapshot());
        Arc::new(Self {
            store,
            inner: Mutex::new(inner),
            changes,
        })
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, inner: &Inner) {
        self.changes.send_replace(inner.snapshot());
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.lock().snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.changes.subscribe()
    }

    pub fn token(&self) -> Option<String> {
        self.lock().token.clone()
    }

    pub fn is_exchanging(&self) -> bool {
        self.lock().exchanges > 0
    }

    /// Reads the cached token and profile and exposes them as the tentative session.
    pub fn load_cached(&self) -> SessionSnapshot {
        let mut inner = self.lock();

        let token = match self.store.get(TOKEN_KEY) {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                warn!("Could not read cached token: {e}");
                None
            }
        };

        let user = if token.is_some() {
            self.read_cached_user()
        } else {
            if let Err(e) = self.store.remove(USER_KEY) {
                warn!("Could not drop orphaned cached profile: {e}");
            }
            None
        };

        debug!(
            "Restored cached session (token: {}, profile: {})",
            token.is_some(),
            user.is_some()
        );

        inner.loading = token.is_some();
        inner.token = token;
        inner.user = user;
        inner.verification = Verification::Unverified;
        self.publish(&inner);
        inner.snapshot()
    }

    fn read_cached_user(&self) -> Option<User> {
        let raw = match self.store.get(USER_KEY) {
            Ok(raw) => raw?,
            Err(e) => {
                warn!("Could not read cached profile: {e}");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                warn!("Discarding unreadable cached profile: {e}");
                None
            }
        }
    }

    /// Marks a verification as started. Returns the token to check and the
    /// generation the result must still match, or `None` when there is nothing
    /// to verify (in which case loading is settled immediately).
    pub(crate) fn begin_verification(&self) -> Option<(String, u64)> {
        let mut inner = self.lock();
        match inner.token.clone() {
            Some(token) => {
                inner.verification = Verification::Verifying;
                self.publish(&inner);
                Some((token, inner.generation))
            }
            None => {
                inner.loading = false;
                self.publish(&inner);
                None
            }
        }
    }

    pub(crate) fn commit_verified(&self, generation: u64, token: &str, user: User) -> bool {
        self.settle_background(generation, token, Outcome::Verified(user))
    }

    pub(crate) fn mark_stale(&self, generation: u64, token: &str) -> bool {
        self.settle_background(generation, token, Outcome::Stale)
    }

    pub(crate) fn invalidate_background(&self, generation: u64, token: &str) -> bool {
        self.settle_background(generation, token, Outcome::Rejected)
    }

    /// Applies a verification result if the session it checked is still the
    /// active one. Returns whether it was applied now; a result that arrives
    /// mid-exchange is deferred to the end of the exchange.
    fn settle_background(&self, generation: u64, token: &str, outcome: Outcome) -> bool {
        let mut inner = self.lock();
        if !inner.is_current(generation, token) {
            return false;
        }
        if inner.exchanges > 0 {
            debug!("Sign-in in flight; holding verification result until it ends");
            inner.deferred = Some(Deferred {
                generation,
                token: token.to_string(),
                outcome,
            });
            return false;
        }
        self.apply_outcome(&mut inner, outcome);
        true
    }

    fn apply_outcome(&self, inner: &mut Inner, outcome: Outcome) {
        match outcome {
            Outcome::Verified(user) => {
                match serde_json::to_string(&user) {
                    Ok(raw) => {
                        if let Err(e) = self.store.set(USER_KEY, &raw) {
                            warn!("Could not persist refreshed profile: {e}");
                        }
                    }
                    Err(e) => warn!("Could not serialize refreshed profile: {e}"),
                }
                inner.user = Some(user);
                inner.verification = Verification::Verified;
                inner.loading = false;
                self.publish(inner);
            }
            Outcome::Stale => {
                inner.verification = Verification::Stale;
                inner.loading = false;
                self.publish(inner);
            }
            Outcome::Rejected => {
                if let Err(e) = self.clear_locked(inner) {
                    warn!("Could not clear persisted session: {e}");
                }
            }
        }
    }

    /// Ensures `loading` is false once a verification attempt has settled,
    /// whichever branch it took.
    pub(crate) fn settle_loading(&self) {
        let mut inner = self.lock();
        if inner.loading {
            inner.loading = false;
            self.publish(&inner);
        }
    }

    /// Persists a freshly exchanged token together with its profile.
    /// Either both land in storage or neither does.
    pub(crate) fn commit_login(&self, token: String, user: User) -> Result<SessionSnapshot, ClientError> {
        let raw = serde_json::to_string(&user)?;
        let mut inner = self.lock();

        self.store.set(TOKEN_KEY, &token)?;
        if let Err(e) = self.store.set(USER_KEY, &raw) {
            if let Err(rollback) = self.store.remove(TOKEN_KEY) {
                warn!("Could not roll back token after failed profile write: {rollback}");
            }
            return Err(e.into());
        }

        inner.token = Some(token);
        inner.user = Some(user);
        inner.verification = Verification::Verified;
        inner.loading = false;
        inner.generation += 1;
        self.publish(&inner);
        Ok(inner.snapshot())
    }

    /// Drops the session in memory first, then in storage.
    /// The in-memory state is cleared even when storage fails.
    pub fn clear(&self) -> Result<(), StorageError> {
        let mut inner = self.lock();
        self.clear_locked(&mut inner)
    }

    fn clear_locked(&self, inner: &mut Inner) -> Result<(), StorageError> {
        inner.token = None;
        inner.user = None;
        inner.verification = Verification::Unverified;
        inner.loading = false;
        inner.generation += 1;
        self.publish(inner);

        let token_removed = self.store.remove(TOKEN_KEY);
        let user_removed = self.store.remove(USER_KEY);
        token_removed.and(user_removed)
    }

    /// Clears the session if `token` is still the one in use and no sign-in
    /// exchange is running. Returns whether anything was cleared.
    pub(crate) fn invalidate_if_current(&self, token: &str) -> bool {
        let mut inner = self.lock();
        if inner.exchanges > 0 || inner.token.as_deref() != Some(token) {
            return false;
        }
        if let Err(e) = self.clear_locked(&mut inner) {
            warn!("Could not clear persisted session: {e}");
        }
        true
    }

    pub(crate) fn merge_profile(&self, update: &UserUpdate) -> Result<User, ClientError> {
        let mut inner = self.lock();
        if inner.token.is_none() {
            return Err(AuthError::SignedOut.into());
        }
        let mut user = inner.user.clone().ok_or(AuthError::SignedOut)?;
        user.apply(update);
        self.store.set(USER_KEY, &serde_json::to_string(&user)?)?;
        inner.user = Some(user.clone());
        self.publish(&inner);
        Ok(user)
    }

    /// Replaces the cached profile with the server's copy, provided the session
    /// that issued the request is still the active one.
    pub(crate) fn replace_profile(&self, token: &str, user: User) -> Result<User, ClientError> {
        let mut inner = self.lock();
        if inner.token.as_deref() != Some(token) {
            return Err(AuthError::SignedOut.into());
        }
        self.store.set(USER_KEY, &serde_json::to_string(&user)?)?;
        inner.user = Some(user.clone());
        self.publish(&inner);
        Ok(user)
    }

    pub(crate) fn begin_exchange(&self) -> ExchangeGuard<'_> {
        let mut inner = self.lock();
        inner.exchanges += 1;
        self.publish(&inner);
        ExchangeGuard { core: self }
    }
}

/// Marks a sign-in exchange as in flight for as long as it lives.
pub(crate) struct ExchangeGuard<'a> {
    core: &'a SessionCore,
}

impl Drop for ExchangeGuard<'_> {
    fn drop(&mut self) {
        let mut inner = self.core.lock();
        inner.exchanges = inner.exchanges.saturating_sub(1);
        if inner.exchanges == 0 {
            // A successful exchange bumps the generation, which retires the held result.
            if let Some(held) = inner.deferred.take() {
                if inner.is_current(held.generation, &held.token) {
                    debug!("Applying verification result held during sign-in");
                    self.core.apply_outcome(&mut inner, held.outcome);
                    return;
                }
            }
        }
        self.core.publish(&inner);
    }
}
