use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::documents::PortfolioTemplate;

#[derive(Debug, Clone, Serialize)]
pub struct GenerateResumeRequest {
    pub resume_id: i64,
    pub job_description: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerateCoverLetterRequest {
    pub cover_letter_id: i64,
    pub resume_id: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct GeneratePortfolioRequest {
    pub resume_id: i64,
    pub template: PortfolioTemplate,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoreResumeRequest {
    pub resume_id: i64,
    pub job_description: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SkillAnalysisRequest {
    pub job_role: String,
    pub job_description: String,
    pub user_skills: Vec<String>,
}

/// Envelope returned by the generate-* endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerationResponse {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub data: Option<Value>,
}

impl GenerationResponse {
    /// Reads a string field from `data`, e.g. `generated_content` or `generated_html`.
    pub fn data_str(&self, key: &str) -> Option<&str> {
        self.data.as_ref()?.get(key)?.as_str()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeScore {
    pub id: i64,
    pub resume_id: i64,
    pub overall_score: f64,
    #[serde(default)]
    pub keyword_match_score: Option<f64>,
    #[serde(default)]
    pub format_score: Option<f64>,
    #[serde(default)]
    pub content_score: Option<f64>,
    #[serde(default)]
    pub missing_keywords: Option<Vec<String>>,
    #[serde(default)]
    pub suggestions: Option<Vec<String>>,
    #[serde(default)]
    pub detailed_analysis: Option<String>,
    #[serde(default, deserialize_with = "crate::models::timestamp::deserialize")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillAnalysis {
    pub id: i64,
    pub job_role: String,
    #[serde(default)]
    pub required_skills: Option<Vec<String>>,
    #[serde(default)]
    pub user_skills: Option<Vec<String>>,
    #[serde(default)]
    pub missing_skills: Option<Vec<String>>,
    #[serde(default)]
    pub match_percentage: Option<f64>,
    #[serde(default)]
    pub recommendations: Option<Vec<String>>,
    #[serde(default, deserialize_with = "crate::models::timestamp::deserialize")]
    pub created_at: Option<DateTime<Utc>>,
}
