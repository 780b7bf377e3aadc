//! Resume builder: a stepped wizard over one `ResumeDraft`, with save,
//! AI generation and PDF download once the resume exists on the server.

use std::sync::Arc;

use bytes::Bytes;
use tracing::{info, warn};

use crate::api::ApiClient;
use crate::controllers::normalize::optional;
use crate::controllers::rows::FormRow;
use crate::errors::ClientError;
use crate::models::ai::GenerateResumeRequest;
use crate::models::resume::Resume;

mod draft;

pub use draft::{
    AchievementRow, CertificationRow, EducationRow, PersonalDraft, PositionRow, ProjectRow,
    ResumeDraft, Section, SkillRow, DEFAULT_TITLE,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Step {
    Personal,
    Education,
    Skills,
    Experience,
    Projects,
    Extras,
    Generate,
}

impl Step {
    pub const ALL: [Step; 7] = [
        Step::Personal,
        Step::Education,
        Step::Skills,
        Step::Experience,
        Step::Projects,
        Step::Extras,
        Step::Generate,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Step::Personal => "Personal",
            Step::Education => "Education",
            Step::Skills => "Skills",
            Step::Experience => "Experience",
            Step::Projects => "Projects",
            Step::Extras => "More",
            Step::Generate => "Generate",
        }
    }

    fn index(&self) -> usize {
        Step::ALL.iter().position(|s| s == self).unwrap_or(0)
    }

    pub fn next(&self) -> Step {
        Step::ALL[(self.index() + 1).min(Step::ALL.len() - 1)]
    }

    pub fn prev(&self) -> Step {
        Step::ALL[self.index().saturating_sub(1)]
    }

    /// Sections edited on this step.
    pub fn sections(&self) -> &'static [Section] {
        match self {
            Step::Education => &[Section::Education],
            Step::Skills => &[Section::Skills],
            Step::Experience => &[Section::Experience, Section::Internships],
            Step::Projects => &[Section::Projects],
            Step::Extras => &[Section::Certifications, Section::Achievements],
            Step::Personal | Step::Generate => &[],
        }
    }
}

/// A downloaded resume PDF and the file name to save it under.
#[derive(Debug, Clone, PartialEq)]
pub struct PdfDownload {
    pub file_name: String,
    pub bytes: Bytes,
}

pub struct ResumeBuilder {
    api: Arc<ApiClient>,
    draft: ResumeDraft,
    step: Step,
    active_id: Option<i64>,
    resumes: Vec<Resume>,
    generated_content: Option<String>,
}

impl ResumeBuilder {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self {
            api,
            draft: ResumeDraft::default(),
            step: Step::Personal,
            active_id: None,
            resumes: Vec::new(),
            generated_content: None,
        }
    }

    pub fn draft(&self) -> &ResumeDraft {
        &self.draft
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn next_step(&mut self) -> Step {
        self.step = self.step.next();
        self.step
    }

    pub fn prev_step(&mut self) -> Step {
        self.step = self.step.prev();
        self.step
    }

    pub fn go_to(&mut self, step: Step) {
        self.step = step;
    }

    pub fn active_id(&self) -> Option<i64> {
        self.active_id
    }

    pub fn resumes(&self) -> &[Resume] {
        &self.resumes
    }

    pub fn generated_content(&self) -> Option<&str> {
        self.generated_content.as_deref()
    }

    pub fn set_header(&mut self, field: &str, value: &str) -> Result<(), ClientError> {
        self.draft.set_header(field, value)
    }

    pub fn set_personal(&mut self, field: &str, value: &str) -> Result<(), ClientError> {
        self.draft.personal.set_field(field, value)
    }

    /// Appends a blank row to `section`.
    pub fn add_row(&mut self, section: Section) {
        self.draft.section_mut(section).add_blank();
    }

    pub fn update_row(
        &mut self,
        section: Section,
        index: usize,
        field: &str,
        value: &str,
    ) -> Result<(), ClientError> {
        self.draft.section_mut(section).update_row(index, field, value)
    }

    pub fn remove_row(&mut self, section: Section, index: usize) -> bool {
        self.draft.section_mut(section).remove_row(index)
    }

    /// Starts a new, unsaved resume.
    pub fn reset(&mut self) {
        self.draft = ResumeDraft::default();
        self.active_id = None;
        self.generated_content = None;
        self.step = Step::Personal;
    }

    /// Refreshes the list of saved resumes for the picker.
    pub async fn refresh(&mut self) -> Result<&[Resume], ClientError> {
        self.resumes = self.api.list_resumes().await?;
        Ok(&self.resumes)
    }

    pub async fn load(&mut self, id: i64) -> Result<(), ClientError> {
        let resume = self.api.get_resume(id).await?;
        self.draft = ResumeDraft::from_resume(&resume);
        self.active_id = Some(resume.id);
        self.generated_content = resume.generated_content.filter(|c| !c.is_empty());
        info!("Loaded resume {} into the builder", resume.id);
        Ok(())
    }

    /// Creates the resume on first save, updates it afterwards.
    pub async fn save(&mut self) -> Result<Resume, ClientError> {
        let payload = self.draft.to_payload();
        if payload.title.is_empty() {
            return Err(ClientError::Validation("Resume title is required".to_string()));
        }

        match self.active_id {
            Some(id) => {
                let saved = self.api.update_resume(id, &payload).await?;
                if let Some(entry) = self.resumes.iter_mut().find(|r| r.id == id) {
                    *entry = saved.clone();
                }
                info!("Updated resume {id}");
                Ok(saved)
            }
            None => {
                let saved = self.api.create_resume(&payload).await?;
                self.active_id = Some(saved.id);
                self.resumes.insert(0, saved.clone());
                info!("Created resume {}", saved.id);
                Ok(saved)
            }
        }
    }

    /// Asks the backend for an ATS-optimized version of the saved resume.
    pub async fn generate(&mut self, job_description: Option<&str>) -> Result<String, ClientError> {
        let resume_id = self
            .active_id
            .ok_or_else(|| ClientError::Validation("Save your resume first".to_string()))?;

        let response = self
            .api
            .generate_resume(&GenerateResumeRequest {
                resume_id,
                job_description: job_description.and_then(optional),
            })
            .await?;

        let content = response
            .data_str("generated_content")
            .unwrap_or_default()
            .to_string();
        if content.is_empty() {
            warn!("Generation for resume {resume_id} returned no content");
        }
        self.generated_content = Some(content.clone()).filter(|c| !c.is_empty());
        Ok(content)
    }

    pub async fn download_pdf(&self) -> Result<PdfDownload, ClientError> {
        let resume_id = self
            .active_id
            .ok_or_else(|| ClientError::Validation("Save your resume first".to_string()))?;
        let bytes = self.api.download_pdf(resume_id).await?;
        Ok(PdfDownload {
            file_name: pdf_file_name(&self.draft.personal.name),
            bytes,
        })
    }
}

/// `<name>_resume.pdf`, or `resume_resume.pdf` when no name is filled in.
pub fn pdf_file_name(name: &str) -> String {
    let name = name.trim();
    let stem = if name.is_empty() { "resume" } else { name };
    format!("{stem}_resume.pdf")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{signed_in_api, MockBackend};

    async fn builder() -> (MockBackend, ResumeBuilder) {
        let (backend, api, _) = signed_in_api("/resume-builder").await;
        (backend, ResumeBuilder::new(api))
    }

    #[test]
    fn test_step_navigation_is_clamped() {
        assert_eq!(Step::Personal.prev(), Step::Personal);
        assert_eq!(Step::Personal.next(), Step::Education);
        assert_eq!(Step::Generate.next(), Step::Generate);
        assert_eq!(Step::Experience.sections(), &[Section::Experience, Section::Internships]);
    }

    #[test]
    fn test_pdf_file_name() {
        assert_eq!(pdf_file_name("Ada Lovelace"), "Ada Lovelace_resume.pdf");
        assert_eq!(pdf_file_name("  "), "resume_resume.pdf");
    }

    #[tokio::test]
    async fn test_save_creates_then_updates() {
        let (backend, mut builder) = builder().await;
        builder.set_personal("name", "Ada Lovelace").unwrap();
        builder.update_row(Section::Skills, 0, "items", "Python, Go").unwrap();

        let created = builder.save().await.unwrap();
        assert_eq!(builder.active_id(), Some(created.id));
        let sent = backend.last_request("POST", "/api/resumes/").unwrap();
        assert_eq!(sent.body["skills"][0]["items"], serde_json::json!(["Python", "Go"]));
        assert_eq!(sent.body["education"], serde_json::json!([]));

        builder.set_header("title", "Backend CV").unwrap();
        let updated = builder.save().await.unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.title, "Backend CV");
        assert!(backend
            .last_request("PUT", &format!("/api/resumes/{}", created.id))
            .is_some());
        assert_eq!(builder.resumes()[0].title, "Backend CV");
    }

    #[tokio::test]
    async fn test_save_requires_title() {
        let (_backend, mut builder) = builder().await;
        builder.set_header("title", "   ").unwrap();
        assert!(matches!(builder.save().await, Err(ClientError::Validation(_))));
    }

    #[tokio::test]
    async fn test_load_falls_back_to_blank_rows() {
        let (backend, mut builder) = builder().await;
        backend.seed(
            "resumes",
            serde_json::json!({
                "id": 41, "user_id": 7, "title": "Data CV",
                "skills": [{ "category": "ML", "items": ["PyTorch", "JAX"] }],
                "experience": [],
                "generated_content": "ATS text"
            }),
        );

        builder.load(41).await.unwrap();

        let draft = builder.draft();
        assert_eq!(draft.title, "Data CV");
        assert_eq!(draft.skills.rows()[0].items, "PyTorch, JAX");
        assert_eq!(draft.experience.len(), 1);
        assert_eq!(draft.education.len(), 1);
        assert_eq!(builder.generated_content(), Some("ATS text"));
        assert_eq!(builder.active_id(), Some(41));
    }

    #[tokio::test]
    async fn test_generate_requires_saved_resume() {
        let (backend, mut builder) = builder().await;
        let err = builder.generate(None).await.unwrap_err();
        assert_eq!(err.user_message("Generation failed"), "Save your resume first");
        assert!(backend.last_request("POST", "/api/ai/generate-resume").is_none());
    }

    #[tokio::test]
    async fn test_generate_and_download() {
        let (backend, mut builder) = builder().await;
        builder.set_personal("name", "Ada").unwrap();
        let saved = builder.save().await.unwrap();

        let content = builder.generate(Some("  ")).await.unwrap();
        assert_eq!(content, format!("ATS resume #{}", saved.id));
        let sent = backend.last_request("POST", "/api/ai/generate-resume").unwrap();
        assert!(sent.body["job_description"].is_null());

        let pdf = builder.download_pdf().await.unwrap();
        assert_eq!(pdf.file_name, "Ada_resume.pdf");
        assert!(pdf.bytes.starts_with(b"%PDF"));
    }

    #[tokio::test]
    async fn test_reset_starts_fresh() {
        let (_backend, mut builder) = builder().await;
        builder.save().await.unwrap();
        builder.next_step();
        builder.reset();
        assert_eq!(builder.active_id(), None);
        assert_eq!(builder.step(), Step::Personal);
        assert_eq!(builder.draft(), &ResumeDraft::default());
    }
}
