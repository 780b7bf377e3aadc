use std::sync::Arc;

use tracing::info;

use crate::api::ApiClient;
use crate::errors::ClientError;
use crate::models::admin::AdminDashboard;
use crate::models::User;

/// Platform totals and the user table. Only reachable for admins; the
/// backend answers 403 for everyone else.
pub struct AdminPanel {
    api: Arc<ApiClient>,
    dashboard: Option<AdminDashboard>,
    users: Vec<User>,
}

impl AdminPanel {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self {
            api,
            dashboard: None,
            users: Vec::new(),
        }
    }

    pub async fn load(&mut self) -> Result<(), ClientError> {
        let (dashboard, users) =
            tokio::try_join!(self.api.admin_dashboard(), self.api.admin_users())?;
        self.dashboard = Some(dashboard);
        self.users = users;
        Ok(())
    }

    pub fn dashboard(&self) -> Option<&AdminDashboard> {
        self.dashboard.as_ref()
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    /// Activates or deactivates a user. The local row flips only once the
    /// server has accepted the change.
    pub async fn toggle(&mut self, user_id: i64) -> Result<String, ClientError> {
        let response = self.api.toggle_user_active(user_id).await?;
        if let Some(user) = self.users.iter_mut().find(|u| u.id == user_id) {
            user.is_active = !user.is_active;
        }
        info!("Toggled user {user_id}: {}", response.message);
        Ok(response.message)
    }
}
