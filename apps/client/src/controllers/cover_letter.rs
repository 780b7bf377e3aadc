use std::sync::Arc;

use tracing::info;

use crate::api::ApiClient;
use crate::errors::ClientError;
use crate::models::ai::GenerateCoverLetterRequest;
use crate::models::documents::{CoverLetter, CoverLetterCreate, Tone};
use crate::models::resume::Resume;

use super::normalize::optional;

/// Cover letters shown in the history panel.
pub const HISTORY_LIMIT: usize = 5;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoverLetterDraft {
    pub title: String,
    pub company_name: String,
    pub job_title: String,
    pub job_description: String,
    pub tone: Tone,
}

impl CoverLetterDraft {
    fn validate(&self) -> Result<CoverLetterCreate, ClientError> {
        let company_name = self.company_name.trim();
        let job_title = self.job_title.trim();
        if company_name.is_empty() || job_title.is_empty() {
            return Err(ClientError::Validation(
                "Enter company name and job title".to_string(),
            ));
        }
        Ok(CoverLetterCreate {
            title: self.title.trim().to_string(),
            company_name: company_name.to_string(),
            job_title: job_title.to_string(),
            job_description: optional(&self.job_description),
            tone: self.tone,
        })
    }
}

pub struct CoverLetterForm {
    api: Arc<ApiClient>,
    pub draft: CoverLetterDraft,
    pub selected_resume: Option<i64>,
    resumes: Vec<Resume>,
    letters: Vec<CoverLetter>,
    generated: Option<String>,
}

impl CoverLetterForm {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self {
            api,
            draft: CoverLetterDraft::default(),
            selected_resume: None,
            resumes: Vec::new(),
            letters: Vec::new(),
            generated: None,
        }
    }

    /// Loads the resume picker and letter history concurrently.
    pub async fn load(&mut self) -> Result<(), ClientError> {
        let (resumes, letters) =
            tokio::try_join!(self.api.list_resumes(), self.api.list_cover_letters())?;
        self.resumes = resumes;
        self.letters = letters;
        Ok(())
    }

    pub fn resumes(&self) -> &[Resume] {
        &self.resumes
    }

    /// Most recent letters first, capped for display.
    pub fn history(&self) -> &[CoverLetter] {
        &self.letters[..self.letters.len().min(HISTORY_LIMIT)]
    }

    pub fn generated(&self) -> Option<&str> {
        self.generated.as_deref()
    }

    /// Shows a previously generated letter.
    pub fn show(&mut self, letter_id: i64) -> Option<&str> {
        let letter = self.letters.iter().find(|l| l.id == letter_id)?;
        self.generated = letter.generated_content.clone();
        self.generated.as_deref()
    }

    /// Saves the letter details, then generates its text from the selected resume.
    pub async fn generate(&mut self) -> Result<String, ClientError> {
        let resume_id = self
            .selected_resume
            .ok_or_else(|| ClientError::Validation("Select a resume first".to_string()))?;
        let create = self.draft.validate()?;

        let mut letter = self.api.create_cover_letter(&create).await?;
        let response = self
            .api
            .generate_cover_letter(&GenerateCoverLetterRequest {
                cover_letter_id: letter.id,
                resume_id,
            })
            .await?;

        let content = response
            .data_str("generated_content")
            .unwrap_or_default()
            .to_string();
        info!("Generated cover letter {} for {}", letter.id, create.company_name);

        letter.generated_content = Some(content.clone());
        self.letters.insert(0, letter);
        self.generated = Some(content.clone());
        Ok(content)
    }

    pub async fn delete(&mut self, letter_id: i64) -> Result<(), ClientError> {
        self.api.delete_cover_letter(letter_id).await?;
        self.letters.retain(|l| l.id != letter_id);
        Ok(())
    }
}
