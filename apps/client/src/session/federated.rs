//! Federated sign-in adapter.
//!
//! A provider (Google Identity Services in the browser build, a manual feed on
//! the CLI and in tests) is initialized with a [`CredentialSink`]. Every
//! assertion it delivers travels over that one channel to a binder task, which
//! hands it to [`SessionService::federated_login`] and reports the outcome.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::errors::ClientError;
use crate::models::User;
use crate::session::SessionService;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FederatedConfig {
    pub client_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonText {
    SignInWith,
    SignUpWith,
}

/// Where the provider should draw its sign-in button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonTarget {
    pub element_id: String,
    pub text: ButtonText,
}

/// Stable delivery point for identity assertions.
#[derive(Debug, Clone)]
pub struct CredentialSink {
    tx: mpsc::UnboundedSender<String>,
}

impl CredentialSink {
    /// Returns false once the binder has been dropped.
    pub fn deliver(&self, credential: impl Into<String>) -> bool {
        self.tx.send(credential.into()).is_ok()
    }
}

#[async_trait]
pub trait FederatedIdentityProvider: Send + Sync {
    async fn initialize(
        &self,
        config: &FederatedConfig,
        sink: CredentialSink,
    ) -> Result<(), ClientError>;

    fn render_button(&self, target: &ButtonTarget) -> Result<(), ClientError>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum FederatedOutcome {
    SignedIn(User),
    Failed(String),
}

/// Live binding between a provider and the session.
pub struct FederatedBinding {
    pub outcomes: mpsc::UnboundedReceiver<FederatedOutcome>,
    task: JoinHandle<()>,
}

impl FederatedBinding {
    /// Initializes the provider, draws its button and starts forwarding assertions.
    pub async fn attach(
        session: Arc<SessionService>,
        provider: &dyn FederatedIdentityProvider,
        config: &FederatedConfig,
        target: &ButtonTarget,
    ) -> Result<Self, ClientError> {
        if config.client_id.trim().is_empty() {
            return Err(ClientError::Validation(
                "Google sign-in is not configured".to_string(),
            ));
        }

        let (tx, mut rx) = mpsc::unbounded_channel::<String>();
        let (outcome_tx, outcomes) = mpsc::unbounded_channel();

        provider.initialize(config, CredentialSink { tx }).await?;
        provider.render_button(target)?;

        let task = tokio::spawn(async move {
            while let Some(credential) = rx.recv().await {
                let outcome = match session.federated_login(&credential).await {
                    Ok(user) => FederatedOutcome::SignedIn(user),
                    Err(e) => {
                        warn!("Federated sign-in failed: {e}");
                        FederatedOutcome::Failed(e.user_message("Google sign-in failed"))
                    }
                };
                if outcome_tx.send(outcome).is_err() {
                    debug!("Federated outcome receiver dropped; stopping binder");
                    break;
                }
            }
        });

        Ok(Self { outcomes, task })
    }

    pub fn detach(self) {
        self.task.abort();
    }
}

/// Provider fed by hand: the CLI passes an assertion it obtained elsewhere,
/// tests push fixtures.
#[derive(Debug, Default)]
pub struct ManualProvider {
    sink: Mutex<Option<CredentialSink>>,
    button: Mutex<Option<ButtonTarget>>,
}

impl ManualProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes an assertion as if the user had completed the provider's flow.
    pub fn submit(&self, credential: impl Into<String>) -> bool {
        let sink = self.sink.lock().unwrap_or_else(PoisonError::into_inner);
        sink.as_ref().is_some_and(|s| s.deliver(credential))
    }

    pub fn rendered_button(&self) -> Option<ButtonTarget> {
        self.button
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl FederatedIdentityProvider for ManualProvider {
    async fn initialize(
        &self,
        _config: &FederatedConfig,
        sink: CredentialSink,
    ) -> Result<(), ClientError> {
        *self.sink.lock().unwrap_or_else(PoisonError::into_inner) = Some(sink);
        Ok(())
    }

    fn render_button(&self, target: &ButtonTarget) -> Result<(), ClientError> {
        *self.button.lock().unwrap_or_else(PoisonError::into_inner) = Some(target.clone());
        Ok(())
    }
}
