use std::sync::Arc;

use crate::api::ApiClient;
use crate::errors::ClientError;
use crate::models::ai::{SkillAnalysis, SkillAnalysisRequest};

use super::normalize::comma_list;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SkillQuery {
    pub job_role: String,
    pub job_description: String,
    /// Comma-separated, as typed.
    pub user_skills: String,
}

impl SkillQuery {
    pub fn to_request(&self) -> Result<SkillAnalysisRequest, ClientError> {
        let user_skills = comma_list(&self.user_skills);
        if self.job_description.trim().is_empty() || user_skills.is_empty() {
            return Err(ClientError::Validation(
                "Enter job description and your skills".to_string(),
            ));
        }
        Ok(SkillAnalysisRequest {
            job_role: self.job_role.trim().to_string(),
            job_description: self.job_description.clone(),
            user_skills,
        })
    }
}

pub struct SkillQueryForm {
    api: Arc<ApiClient>,
    pub query: SkillQuery,
    result: Option<SkillAnalysis>,
}

impl SkillQueryForm {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self {
            api,
            query: SkillQuery::default(),
            result: None,
        }
    }

    pub fn result(&self) -> Option<&SkillAnalysis> {
        self.result.as_ref()
    }

    pub async fn analyze(&mut self) -> Result<&SkillAnalysis, ClientError> {
        let request = self.query.to_request()?;
        let analysis = self.api.skill_analysis(&request).await?;
        Ok(&*self.result.insert(analysis))
    }
}

/// Whether the user already lists a required skill (case-insensitive).
pub fn has_skill(analysis: &SkillAnalysis, skill: &str) -> bool {
    analysis
        .user_skills
        .iter()
        .flatten()
        .any(|s| s.eq_ignore_ascii_case(skill))
}
