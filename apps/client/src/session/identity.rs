use async_trait::async_trait;

use crate::errors::ClientError;
use crate::models::user::{
    GoogleAuthRequest, LoginRequest, RegisterRequest, TokenResponse, User, UserUpdate,
};

/// The identity endpoints the session store depends on.
///
/// Implemented by `ApiClient` against the real backend; tests substitute an
/// in-memory fake. Profile calls take the token explicitly so a freshly
/// exchanged token can be checked before it is committed to the session.
#[async_trait]
pub trait IdentityApi: Send + Sync {
    async fn register(&self, req: &RegisterRequest) -> Result<User, ClientError>;

    async fn login(&self, req: &LoginRequest) -> Result<TokenResponse, ClientError>;

    async fn google_auth(&self, req: &GoogleAuthRequest) -> Result<TokenResponse, ClientError>;

    async fn current_user(&self, token: &str) -> Result<User, ClientError>;

    async fn update_current_user(
        &self,
        token: &str,
        update: &UserUpdate,
    ) -> Result<User, ClientError>;
}
