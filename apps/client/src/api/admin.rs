use reqwest::Method;

use crate::api::ApiClient;
use crate::errors::ClientError;
use crate::models::admin::AdminDashboard;
use crate::models::{MessageResponse, User};

impl ApiClient {
    pub async fn admin_dashboard(&self) -> Result<AdminDashboard, ClientError> {
        self.get_json("/api/admin/dashboard").await
    }

    pub async fn admin_users(&self) -> Result<Vec<User>, ClientError> {
        self.get_json("/api/admin/users").await
    }

    pub async fn toggle_user_active(&self, user_id: i64) -> Result<MessageResponse, ClientError> {
        self.send_empty(Method::PUT, &format!("/api/admin/users/{user_id}/toggle-active"))
            .await
    }
}
