use async_trait::async_trait;
use reqwest::Method;

use crate::api::{decode, ApiClient, Credential};
use crate::errors::ClientError;
use crate::models::user::{
    GoogleAuthRequest, LoginRequest, PasswordChange, RegisterRequest, TokenResponse,
};
use crate::models::{MessageResponse, User, UserUpdate};
use crate::session::IdentityApi;

#[async_trait]
impl IdentityApi for ApiClient {
    async fn register(&self, req: &RegisterRequest) -> Result<User, ClientError> {
        let request = self.request(Method::POST, "/api/auth/register").json(req);
        decode(self.execute(request, Credential::Exchange).await?).await
    }

    async fn login(&self, req: &LoginRequest) -> Result<TokenResponse, ClientError> {
        let request = self.request(Method::POST, "/api/auth/login").json(req);
        decode(self.execute(request, Credential::Exchange).await?).await
    }

    async fn google_auth(&self, req: &GoogleAuthRequest) -> Result<TokenResponse, ClientError> {
        let request = self.request(Method::POST, "/api/auth/google").json(req);
        decode(self.execute(request, Credential::Exchange).await?).await
    }

    async fn current_user(&self, token: &str) -> Result<User, ClientError> {
        let request = self.request(Method::GET, "/api/auth/me");
        decode(self.execute(request, Credential::Bearer(token)).await?).await
    }

    async fn update_current_user(
        &self,
        token: &str,
        update: &UserUpdate,
    ) -> Result<User, ClientError> {
        let request = self.request(Method::PUT, "/api/auth/me").json(update);
        decode(self.execute(request, Credential::Bearer(token)).await?).await
    }
}

impl ApiClient {
    pub async fn change_password(&self, change: &PasswordChange) -> Result<MessageResponse, ClientError> {
        self.send_json(Method::POST, "/api/auth/change-password", change)
            .await
    }
}
