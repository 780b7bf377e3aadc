use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Formal,
    Confident,
    #[default]
    Professional,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortfolioTemplate {
    #[default]
    Modern,
    Minimal,
    Creative,
}

impl PortfolioTemplate {
    pub const ALL: [PortfolioTemplate; 3] = [Self::Modern, Self::Minimal, Self::Creative];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Modern => "modern",
            Self::Minimal => "minimal",
            Self::Creative => "creative",
        }
    }
}

impl fmt::Display for PortfolioTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PortfolioTemplate {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown portfolio template '{s}'"))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CoverLetterCreate {
    pub title: String,
    pub company_name: String,
    pub job_title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_description: Option<String>,
    pub tone: Tone,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverLetter {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub company_name: String,
    pub job_title: String,
    #[serde(default)]
    pub job_description: Option<String>,
    pub tone: Tone,
    #[serde(default)]
    pub generated_content: Option<String>,
    #[serde(default, deserialize_with = "crate::models::timestamp::deserialize")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Portfolio {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub template: PortfolioTemplate,
    #[serde(default)]
    pub generated_html: Option<String>,
    #[serde(default)]
    pub generated_css: Option<String>,
    #[serde(default)]
    pub is_published: bool,
    #[serde(default, deserialize_with = "crate::models::timestamp::deserialize")]
    pub created_at: Option<DateTime<Utc>>,
}
