use std::sync::Arc;

use crate::api::ApiClient;
use crate::errors::ClientError;
use crate::models::ai::{ResumeScore, ScoreResumeRequest};
use crate::models::resume::Resume;
use crate::presentation::ScoreBand;

pub struct ScoreForm {
    api: Arc<ApiClient>,
    pub selected_resume: Option<i64>,
    pub job_description: String,
    resumes: Vec<Resume>,
    result: Option<ResumeScore>,
}

impl ScoreForm {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self {
            api,
            selected_resume: None,
            job_description: String::new(),
            resumes: Vec::new(),
            result: None,
        }
    }

    pub async fn load(&mut self) -> Result<(), ClientError> {
        self.resumes = self.api.list_resumes().await?;
        Ok(())
    }

    pub fn resumes(&self) -> &[Resume] {
        &self.resumes
    }

    pub fn result(&self) -> Option<&ResumeScore> {
        self.result.as_ref()
    }

    pub fn band(&self) -> Option<ScoreBand> {
        self.result.as_ref().map(|s| ScoreBand::of(s.overall_score))
    }

    /// Scores the selected resume against the job description.
    pub async fn analyze(&mut self) -> Result<&ResumeScore, ClientError> {
        let (Some(resume_id), false) = (self.selected_resume, self.job_description.trim().is_empty())
        else {
            return Err(ClientError::Validation(
                "Select a resume and enter a job description".to_string(),
            ));
        };

        let score = self
            .api
            .score_resume(&ScoreResumeRequest {
                resume_id,
                job_description: self.job_description.clone(),
            })
            .await?;
        Ok(&*self.result.insert(score))
    }
}
