use std::sync::Arc;

use tracing::{info, warn};

use crate::api::ApiClient;
use crate::errors::ClientError;
use crate::models::ai::GeneratePortfolioRequest;
use crate::models::documents::{Portfolio, PortfolioTemplate};
use crate::models::resume::Resume;

/// File name offered when saving generated portfolio HTML.
pub const EXPORT_FILE_NAME: &str = "portfolio.html";

pub struct PortfolioForm {
    api: Arc<ApiClient>,
    pub selected_resume: Option<i64>,
    pub template: PortfolioTemplate,
    resumes: Vec<Resume>,
    portfolios: Vec<Portfolio>,
    generated_html: Option<String>,
}

impl PortfolioForm {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self {
            api,
            selected_resume: None,
            template: PortfolioTemplate::default(),
            resumes: Vec::new(),
            portfolios: Vec::new(),
            generated_html: None,
        }
    }

    pub async fn load(&mut self) -> Result<(), ClientError> {
        let (resumes, portfolios) =
            tokio::try_join!(self.api.list_resumes(), self.api.list_portfolios())?;
        self.resumes = resumes;
        self.portfolios = portfolios;
        Ok(())
    }

    pub fn resumes(&self) -> &[Resume] {
        &self.resumes
    }

    pub fn portfolios(&self) -> &[Portfolio] {
        &self.portfolios
    }

    pub fn generated_html(&self) -> Option<&str> {
        self.generated_html.as_deref()
    }

    pub async fn generate(&mut self) -> Result<String, ClientError> {
        let resume_id = self
            .selected_resume
            .ok_or_else(|| ClientError::Validation("Select a resume first".to_string()))?;

        let response = self
            .api
            .generate_portfolio(&GeneratePortfolioRequest {
                resume_id,
                template: self.template,
            })
            .await?;
        let html = response
            .data_str("generated_html")
            .unwrap_or_default()
            .to_string();
        self.generated_html = Some(html.clone()).filter(|h| !h.is_empty());
        info!("Generated {} portfolio from resume {resume_id}", self.template);

        // Already stored server-side; a failed refresh only leaves the list stale.
        match self.api.list_portfolios().await {
            Ok(portfolios) => self.portfolios = portfolios,
            Err(e) => warn!("Could not refresh portfolios: {e}"),
        }
        Ok(html)
    }

    /// The generated HTML and the file name to save it under.
    pub fn export(&self) -> Option<(&'static str, &str)> {
        self.generated_html().map(|html| (EXPORT_FILE_NAME, html))
    }

    pub async fn delete(&mut self, portfolio_id: i64) -> Result<(), ClientError> {
        self.api.delete_portfolio(portfolio_id).await?;
        self.portfolios.retain(|p| p.id != portfolio_id);
        Ok(())
    }
}
