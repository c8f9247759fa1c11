use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// One stored resume version. Rows are never updated after insert.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ResumeRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub version: i32,
    pub resume_data: Option<Value>,
    pub resume_url: String,
    pub filename: Option<String>,
    pub format: String,
    pub ats_score: Option<f64>,
    pub created_at: DateTime<Utc>,
}

/// History listing entry; omits the full resume data.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ResumeSummary {
    pub id: Uuid,
    pub version: i32,
    pub resume_url: String,
    pub filename: Option<String>,
    pub format: String,
    pub ats_score: Option<f64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResumeFormat {
    #[default]
    Docx,
    Tex,
    Pdf,
    Url,
}

impl ResumeFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            ResumeFormat::Docx => "docx",
            ResumeFormat::Tex => "tex",
            ResumeFormat::Pdf => "pdf",
            ResumeFormat::Url => "url",
        }
    }
}
