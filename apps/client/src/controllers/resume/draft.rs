//! Editable resume draft. Fields hold raw text as typed; list-valued fields
//! (skill items, technologies, bullets) stay as text until the draft is
//! turned into a payload.

use crate::controllers::normalize::{
    comma_list, optional, optional_comma_list, optional_line_list, text_of,
};
use crate::controllers::rows::{unknown_field, FormRow, RowEditor, RowList};
use crate::errors::ClientError;
use crate::models::resume::{
    Achievement, Certification, Education, PersonalInfo, Position, Project, Resume, ResumePayload,
    Skill,
};

pub const DEFAULT_TITLE: &str = "My Resume";

fn blank(parts: &[&String]) -> bool {
    parts.iter().all(|s| s.trim().is_empty())
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersonalDraft {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub linkedin: String,
    pub github: String,
    pub location: String,
    pub website: String,
}

impl FormRow for PersonalDraft {
    const FIELDS: &'static [&'static str] =
        &["name", "email", "phone", "location", "linkedin", "github", "website"];

    fn set_field(&mut self, field: &str, value: &str) -> Result<(), ClientError> {
        let slot = match field {
            "name" => &mut self.name,
            "email" => &mut self.email,
            "phone" => &mut self.phone,
            "linkedin" => &mut self.linkedin,
            "github" => &mut self.github,
            "location" => &mut self.location,
            "website" => &mut self.website,
            other => return Err(unknown_field(other)),
        };
        *slot = value.to_string();
        Ok(())
    }

    fn is_blank(&self) -> bool {
        blank(&[
            &self.name,
            &self.email,
            &self.phone,
            &self.linkedin,
            &self.github,
            &self.location,
            &self.website,
        ])
    }
}

impl PersonalDraft {
    fn to_wire(&self) -> Option<PersonalInfo> {
        (!self.is_blank()).then(|| PersonalInfo {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: optional(&self.phone),
            linkedin: optional(&self.linkedin),
            github: optional(&self.github),
            location: optional(&self.location),
            website: optional(&self.website),
        })
    }

    fn from_wire(info: &PersonalInfo) -> Self {
        Self {
            name: info.name.clone(),
            email: info.email.clone(),
            phone: text_of(&info.phone),
            linkedin: text_of(&info.linkedin),
            github: text_of(&info.github),
            location: text_of(&info.location),
            website: text_of(&info.website),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EducationRow {
    pub degree: String,
    pub institution: String,
    pub year: String,
    pub gpa: String,
    pub description: String,
}

impl FormRow for EducationRow {
    const FIELDS: &'static [&'static str] = &["degree", "institution", "year", "gpa", "description"];

    fn set_field(&mut self, field: &str, value: &str) -> Result<(), ClientError> {
        let slot = match field {
            "degree" => &mut self.degree,
            "institution" => &mut self.institution,
            "year" => &mut self.year,
            "gpa" => &mut self.gpa,
            "description" => &mut self.description,
            other => return Err(unknown_field(other)),
        };
        *slot = value.to_string();
        Ok(())
    }

    fn is_blank(&self) -> bool {
        blank(&[&self.degree, &self.institution, &self.year, &self.gpa, &self.description])
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SkillRow {
    pub category: String,
    /// Comma-separated.
    pub items: String,
}

impl FormRow for SkillRow {
    const FIELDS: &'static [&'static str] = &["category", "items"];

    fn set_field(&mut self, field: &str, value: &str) -> Result<(), ClientError> {
        match field {
            "category" => self.category = value.to_string(),
            "items" => self.items = value.to_string(),
            other => return Err(unknown_field(other)),
        }
        Ok(())
    }

    fn is_blank(&self) -> bool {
        blank(&[&self.category]) && comma_list(&self.items).is_empty()
    }
}

/// Used for both work experience and internships.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PositionRow {
    pub company: String,
    pub role: String,
    pub duration: String,
    pub description: String,
    /// One bullet per line.
    pub bullets: String,
}

impl FormRow for PositionRow {
    const FIELDS: &'static [&'static str] = &["company", "role", "duration", "description", "bullets"];

    fn set_field(&mut self, field: &str, value: &str) -> Result<(), ClientError> {
        let slot = match field {
            "company" => &mut self.company,
            "role" => &mut self.role,
            "duration" => &mut self.duration,
            "description" => &mut self.description,
            "bullets" => &mut self.bullets,
            other => return Err(unknown_field(other)),
        };
        *slot = value.to_string();
        Ok(())
    }

    fn is_blank(&self) -> bool {
        blank(&[
            &self.company,
            &self.role,
            &self.duration,
            &self.description,
            &self.bullets,
        ])
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectRow {
    pub name: String,
    pub description: String,
    /// Comma-separated.
    pub technologies: String,
    pub link: String,
}

impl FormRow for ProjectRow {
    const FIELDS: &'static [&'static str] = &["name", "technologies", "link", "description"];

    fn set_field(&mut self, field: &str, value: &str) -> Result<(), ClientError> {
        let slot = match field {
            "name" => &mut self.name,
            "description" => &mut self.description,
            "technologies" => &mut self.technologies,
            "link" => &mut self.link,
            other => return Err(unknown_field(other)),
        };
        *slot = value.to_string();
        Ok(())
    }

    fn is_blank(&self) -> bool {
        blank(&[&self.name, &self.description, &self.link]) && comma_list(&self.technologies).is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CertificationRow {
    pub name: String,
    pub issuer: String,
    pub date: String,
    pub link: String,
}

impl FormRow for CertificationRow {
    const FIELDS: &'static [&'static str] = &["name", "issuer", "date", "link"];

    fn set_field(&mut self, field: &str, value: &str) -> Result<(), ClientError> {
        let slot = match field {
            "name" => &mut self.name,
            "issuer" => &mut self.issuer,
            "date" => &mut self.date,
            "link" => &mut self.link,
            other => return Err(unknown_field(other)),
        };
        *slot = value.to_string();
        Ok(())
    }

    fn is_blank(&self) -> bool {
        blank(&[&self.name, &self.issuer, &self.date, &self.link])
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AchievementRow {
    pub title: String,
    pub description: String,
    pub date: String,
}

impl FormRow for AchievementRow {
    const FIELDS: &'static [&'static str] = &["title", "description", "date"];

    fn set_field(&mut self, field: &str, value: &str) -> Result<(), ClientError> {
        let slot = match field {
            "title" => &mut self.title,
            "description" => &mut self.description,
            "date" => &mut self.date,
            other => return Err(unknown_field(other)),
        };
        *slot = value.to_string();
        Ok(())
    }

    fn is_blank(&self) -> bool {
        blank(&[&self.title, &self.description, &self.date])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Education,
    Skills,
    Experience,
    Internships,
    Projects,
    Certifications,
    Achievements,
}

impl Section {
    pub const ALL: [Section; 7] = [
        Section::Education,
        Section::Skills,
        Section::Experience,
        Section::Internships,
        Section::Projects,
        Section::Certifications,
        Section::Achievements,
    ];
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResumeDraft {
    pub title: String,
    pub target_job_role: String,
    pub preferred_company: String,
    pub personal: PersonalDraft,
    pub education: RowList<EducationRow>,
    pub skills: RowList<SkillRow>,
    pub experience: RowList<PositionRow>,
    pub internships: RowList<PositionRow>,
    pub projects: RowList<ProjectRow>,
    pub certifications: RowList<CertificationRow>,
    pub achievements: RowList<AchievementRow>,
}

impl Default for ResumeDraft {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            target_job_role: String::new(),
            preferred_company: String::new(),
            personal: PersonalDraft::default(),
            education: RowList::new(),
            skills: RowList::new(),
            experience: RowList::new(),
            internships: RowList::new(),
            projects: RowList::new(),
            certifications: RowList::new(),
            achievements: RowList::new(),
        }
    }
}

impl ResumeDraft {
    pub fn section(&self, section: Section) -> &dyn RowEditor {
        match section {
            Section::Education => &self.education,
            Section::Skills => &self.skills,
            Section::Experience => &self.experience,
            Section::Internships => &self.internships,
            Section::Projects => &self.projects,
            Section::Certifications => &self.certifications,
            Section::Achievements => &self.achievements,
        }
    }

    pub fn section_mut(&mut self, section: Section) -> &mut dyn RowEditor {
        match section {
            Section::Education => &mut self.education,
            Section::Skills => &mut self.skills,
            Section::Experience => &mut self.experience,
            Section::Internships => &mut self.internships,
            Section::Projects => &mut self.projects,
            Section::Certifications => &mut self.certifications,
            Section::Achievements => &mut self.achievements,
        }
    }

    /// Top-level text fields: `title`, `target_job_role`, `preferred_company`.
    pub fn set_header(&mut self, field: &str, value: &str) -> Result<(), ClientError> {
        let slot = match field {
            "title" => &mut self.title,
            "target_job_role" => &mut self.target_job_role,
            "preferred_company" => &mut self.preferred_company,
            other => return Err(unknown_field(other)),
        };
        *slot = value.to_string();
        Ok(())
    }

    /// Normalized payload: list text split, optional text trimmed, blank rows dropped.
    pub fn to_payload(&self) -> ResumePayload {
        ResumePayload {
            title: self.title.trim().to_string(),
            personal_info: self.personal.to_wire(),
            education: self
                .education
                .filled()
                .map(|e| Education {
                    degree: e.degree.trim().to_string(),
                    institution: e.institution.trim().to_string(),
                    year: optional(&e.year),
                    gpa: optional(&e.gpa),
                    description: optional(&e.description),
                })
                .collect(),
            skills: self
                .skills
                .filled()
                .map(|s| Skill {
                    category: s.category.trim().to_string(),
                    items: comma_list(&s.items),
                })
                .collect(),
            experience: self.experience.filled().map(position_to_wire).collect(),
            internships: self.internships.filled().map(position_to_wire).collect(),
            projects: self
                .projects
                .filled()
                .map(|p| Project {
                    name: p.name.trim().to_string(),
                    description: p.description.trim().to_string(),
                    technologies: optional_comma_list(&p.technologies),
                    link: optional(&p.link),
                })
                .collect(),
            certifications: self
                .certifications
                .filled()
                .map(|c| Certification {
                    name: c.name.trim().to_string(),
                    issuer: optional(&c.issuer),
                    date: optional(&c.date),
                    link: optional(&c.link),
                })
                .collect(),
            achievements: self
                .achievements
                .filled()
                .map(|a| Achievement {
                    title: a.title.trim().to_string(),
                    description: optional(&a.description),
                    date: optional(&a.date),
                })
                .collect(),
            target_job_role: optional(&self.target_job_role),
            preferred_company: optional(&self.preferred_company),
        }
    }

    /// Loads a saved resume. Sections the server left empty get one blank row.
    pub fn from_resume(resume: &Resume) -> Self {
        fn rows<W, R: FormRow>(items: &Option<Vec<W>>, f: impl Fn(&W) -> R) -> RowList<R> {
            RowList::from_rows(items.iter().flatten().map(f).collect())
        }

        Self {
            title: resume.title.clone(),
            target_job_role: text_of(&resume.target_job_role),
            preferred_company: text_of(&resume.preferred_company),
            personal: resume
                .personal_info
                .as_ref()
                .map(PersonalDraft::from_wire)
                .unwrap_or_default(),
            education: rows(&resume.education, |e| EducationRow {
                degree: e.degree.clone(),
                institution: e.institution.clone(),
                year: text_of(&e.year),
                gpa: text_of(&e.gpa),
                description: text_of(&e.description),
            }),
            skills: rows(&resume.skills, |s| SkillRow {
                category: s.category.clone(),
                items: s.items.join(", "),
            }),
            experience: rows(&resume.experience, position_from_wire),
            internships: rows(&resume.internships, position_from_wire),
            projects: rows(&resume.projects, |p| ProjectRow {
                name: p.name.clone(),
                description: p.description.clone(),
                technologies: p.technologies.as_deref().unwrap_or_default().join(", "),
                link: text_of(&p.link),
            }),
            certifications: rows(&resume.certifications, |c| CertificationRow {
                name: c.name.clone(),
                issuer: text_of(&c.issuer),
                date: text_of(&c.date),
                link: text_of(&c.link),
            }),
            achievements: rows(&resume.achievements, |a| AchievementRow {
                title: a.title.clone(),
                description: text_of(&a.description),
                date: text_of(&a.date),
            }),
        }
    }
}

fn position_to_wire(p: &PositionRow) -> Position {
    Position {
        company: p.company.trim().to_string(),
        role: p.role.trim().to_string(),
        duration: optional(&p.duration),
        description: optional(&p.description),
        bullets: optional_line_list(&p.bullets),
    }
}

fn position_from_wire(p: &Position) -> PositionRow {
    PositionRow {
        company: p.company.clone(),
        role: p.role.clone(),
        duration: text_of(&p.duration),
        description: text_of(&p.description),
        bullets: p.bullets.as_deref().unwrap_or_default().join("\n"),
    }
}
