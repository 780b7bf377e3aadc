//! CRUD for the user's saved documents. Collection paths keep the trailing
//! slash the backend routes are registered with.

use reqwest::Method;

use crate::api::ApiClient;
use crate::errors::ClientError;
use crate::models::documents::{CoverLetter, CoverLetterCreate, Portfolio};
use crate::models::resume::{Resume, ResumePayload};

impl ApiClient {
    // ── Resumes ─────────────────────────────────────────────────────────────

    pub async fn list_resumes(&self) -> Result<Vec<Resume>, ClientError> {
        self.get_json("/api/resumes/").await
    }

    pub async fn get_resume(&self, id: i64) -> Result<Resume, ClientError> {
        self.get_json(&format!("/api/resumes/{id}")).await
    }

    pub async fn create_resume(&self, payload: &ResumePayload) -> Result<Resume, ClientError> {
        self.send_json(Method::POST, "/api/resumes/", payload).await
    }

    pub async fn update_resume(&self, id: i64, payload: &ResumePayload) -> Result<Resume, ClientError> {
        self.send_json(Method::PUT, &format!("/api/resumes/{id}"), payload)
            .await
    }

    pub async fn delete_resume(&self, id: i64) -> Result<(), ClientError> {
        self.delete(&format!("/api/resumes/{id}")).await
    }

    // ── Cover letters ───────────────────────────────────────────────────────

    pub async fn list_cover_letters(&self) -> Result<Vec<CoverLetter>, ClientError> {
        self.get_json("/api/cover-letters/").await
    }

    pub async fn get_cover_letter(&self, id: i64) -> Result<CoverLetter, ClientError> {
        self.get_json(&format!("/api/cover-letters/{id}")).await
    }

    pub async fn create_cover_letter(&self, letter: &CoverLetterCreate) -> Result<CoverLetter, ClientError> {
        self.send_json(Method::POST, "/api/cover-letters/", letter)
            .await
    }

    pub async fn delete_cover_letter(&self, id: i64) -> Result<(), ClientError> {
        self.delete(&format!("/api/cover-letters/{id}")).await
    }

    // ── Portfolios ──────────────────────────────────────────────────────────
    // Portfolios are created by the generate endpoint, see `api::ai`.

    pub async fn list_portfolios(&self) -> Result<Vec<Portfolio>, ClientError> {
        self.get_json("/api/portfolios/").await
    }

    pub async fn get_portfolio(&self, id: i64) -> Result<Portfolio, ClientError> {
        self.get_json(&format!("/api/portfolios/{id}")).await
    }

    pub async fn delete_portfolio(&self, id: i64) -> Result<(), ClientError> {
        self.delete(&format!("/api/portfolios/{id}")).await
    }
}
