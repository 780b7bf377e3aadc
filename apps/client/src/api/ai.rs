use bytes::Bytes;
use reqwest::Method;
use tracing::info;

use crate::api::{ApiClient, Credential};
use crate::errors::ClientError;
use crate::models::ai::{
    GenerateCoverLetterRequest, GeneratePortfolioRequest, GenerateResumeRequest,
    GenerationResponse, ResumeScore, ScoreResumeRequest, SkillAnalysis, SkillAnalysisRequest,
};

impl ApiClient {
    pub async fn generate_resume(&self, req: &GenerateResumeRequest) -> Result<GenerationResponse, ClientError> {
        info!("Requesting ATS resume for resume {}", req.resume_id);
        self.send_json(Method::POST, "/api/ai/generate-resume", req)
            .await
    }

    pub async fn generate_cover_letter(
        &self,
        req: &GenerateCoverLetterRequest,
    ) -> Result<GenerationResponse, ClientError> {
        info!("Requesting cover letter {} from resume {}", req.cover_letter_id, req.resume_id);
        self.send_json(Method::POST, "/api/ai/generate-cover-letter", req)
            .await
    }

    pub async fn generate_portfolio(
        &self,
        req: &GeneratePortfolioRequest,
    ) -> Result<GenerationResponse, ClientError> {
        info!("Requesting {} portfolio from resume {}", req.template, req.resume_id);
        self.send_json(Method::POST, "/api/ai/generate-portfolio", req)
            .await
    }

    pub async fn score_resume(&self, req: &ScoreResumeRequest) -> Result<ResumeScore, ClientError> {
        self.send_json(Method::POST, "/api/ai/score-resume", req).await
    }

    pub async fn skill_analysis(&self, req: &SkillAnalysisRequest) -> Result<SkillAnalysis, ClientError> {
        self.send_json(Method::POST, "/api/ai/skill-analysis", req).await
    }

    /// Raw PDF bytes for a generated resume.
    pub async fn download_pdf(&self, resume_id: i64) -> Result<Bytes, ClientError> {
        let request = self.request(Method::GET, &format!("/api/ai/download-pdf/{resume_id}"));
        let response = self.execute(request, Credential::Session).await?;
        Ok(response.bytes().await?)
    }
}
