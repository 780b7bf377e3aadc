use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::User;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminDashboard {
    pub total_users: u64,
    pub total_resumes: u64,
    pub total_cover_letters: u64,
    pub total_portfolios: u64,
    pub total_scores: u64,
    #[serde(default)]
    pub most_requested_roles: Option<Vec<Value>>,
    #[serde(default)]
    pub recent_users: Option<Vec<User>>,
}
