use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::bridge::truncate_chars;
use crate::llm_client::prompts::{JSON_ONLY_SYSTEM, NO_INVENTION_INSTRUCTION};
use crate::llm_client::{LlmClient, LlmError};
use crate::portfolio::data::{
    PortfolioData, PortfolioEducation, PortfolioExperience, PortfolioProject,
};

/// Upper bound on resume text sent to the model.
const MAX_PROMPT_CHARS: usize = 12_000;

const RESUME_SCHEMA: &str = r#"{
  "personal_info": {"full_name": "", "email": "", "phone": "", "location": "", "linkedin": "", "github": "", "portfolio": ""},
  "summary": "",
  "education": [{"degree": "", "institution": "", "year": "", "cgpa": ""}],
  "skills": {"technical": [], "soft": [], "tools": []},
  "projects": [{"title": "", "description": "", "technologies": [], "github_link": ""}],
  "experience": [{"role": "", "company": "", "duration": "", "description": ""}],
  "certifications": [],
  "achievements": []
}"#;

// Shape the model is asked to return. Fields tolerate omission, `null`,
// and scalars of the wrong type; list items that do not fit are skipped.

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ParsedResume {
    #[serde(deserialize_with = "null_default")]
    pub personal_info: ParsedPersonalInfo,
    #[serde(deserialize_with = "lenient_string")]
    pub summary: String,
    #[serde(deserialize_with = "lenient_list")]
    pub education: Vec<ParsedEducation>,
    #[serde(deserialize_with = "null_default")]
    pub skills: ParsedSkills,
    #[serde(deserialize_with = "lenient_list")]
    pub projects: Vec<ParsedProject>,
    #[serde(deserialize_with = "lenient_list")]
    pub experience: Vec<ParsedExperience>,
    #[serde(deserialize_with = "lenient_strings")]
    pub certifications: Vec<String>,
    #[serde(deserialize_with = "lenient_strings")]
    pub achievements: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ParsedPersonalInfo {
    #[serde(deserialize_with = "lenient_string")]
    pub full_name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub email: String,
    #[serde(deserialize_with = "lenient_string")]
    pub phone: String,
    #[serde(deserialize_with = "lenient_string")]
    pub location: String,
    #[serde(deserialize_with = "lenient_string")]
    pub linkedin: String,
    #[serde(deserialize_with = "lenient_string")]
    pub github: String,
    #[serde(deserialize_with = "lenient_string")]
    pub portfolio: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ParsedEducation {
    #[serde(deserialize_with = "lenient_string")]
    pub degree: String,
    #[serde(deserialize_with = "lenient_string")]
    pub institution: String,
    #[serde(deserialize_with = "lenient_string")]
    pub year: String,
    #[serde(deserialize_with = "lenient_string")]
    pub cgpa: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ParsedSkills {
    #[serde(deserialize_with = "lenient_strings")]
    pub technical: Vec<String>,
    #[serde(deserialize_with = "lenient_strings")]
    pub soft: Vec<String>,
    #[serde(deserialize_with = "lenient_strings")]
    pub tools: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ParsedProject {
    #[serde(deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(deserialize_with = "lenient_string")]
    pub description: String,
    #[serde(deserialize_with = "lenient_strings")]
    pub technologies: Vec<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub github_link: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ParsedExperience {
    #[serde(deserialize_with = "lenient_string")]
    pub role: String,
    #[serde(deserialize_with = "lenient_string")]
    pub company: String,
    #[serde(deserialize_with = "lenient_string")]
    pub duration: String,
    #[serde(deserialize_with = "lenient_string")]
    pub description: String,
}

fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// `null` becomes the type's default.
fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Strings as given, numbers and booleans in their JSON form, anything else empty.
fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(scalar_text(Value::deserialize(deserializer)?).unwrap_or_default())
}

/// A list of scalars; a lone string counts as a one-item list.
fn lenient_strings<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    let items = match Value::deserialize(deserializer)? {
        Value::Array(items) => items,
        Value::Null => Vec::new(),
        other => vec![other],
    };
    Ok(items
        .into_iter()
        .filter_map(scalar_text)
        .filter(|s| !s.trim().is_empty())
        .collect())
}

/// A list of objects; items that fail to deserialize are dropped.
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let items = match Value::deserialize(deserializer)? {
        Value::Array(items) => items,
        _ => Vec::new(),
    };
    Ok(items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect())
}

fn build_prompt(resume_text: &str) -> String {
    let text = truncate_chars(resume_text, MAX_PROMPT_CHARS);
    format!(
        "You are a professional resume parser.\n\
         Extract all information from the resume text below.\n\
         {NO_INVENTION_INSTRUCTION}\n\n\
         Return strictly this JSON structure:\n{RESUME_SCHEMA}\n\n\
         Rules:\n\
         - skills.technical: programming languages, frameworks, libraries\n\
         - skills.tools: software tools, IDEs, platforms (Git, Docker, etc.)\n\
         - skills.soft: communication, leadership, teamwork etc.\n\
         - For experience/projects, put the full description in the description field\n\
         - certifications: array of strings (certification names)\n\
         - achievements: array of strings\n\n\
         Resume Text:\n{text}"
    )
}

/// Asks the model for a structured parse. One attempt; the caller falls back on error.
pub async fn parse_with_llm(llm: &LlmClient, resume_text: &str) -> Result<PortfolioData, LlmError> {
    let parsed: ParsedResume = llm
        .call_json(&build_prompt(resume_text), JSON_ONLY_SYSTEM)
        .await?;
    Ok(parsed.into())
}

impl From<ParsedResume> for PortfolioData {
    fn from(parsed: ParsedResume) -> Self {
        let pi = parsed.personal_info;
        let title = parsed
            .experience
            .first()
            .map(|e| e.role.clone())
            .unwrap_or_default();

        let ParsedSkills {
            technical,
            soft,
            tools,
        } = parsed.skills;
        let skills = technical.into_iter().chain(tools).chain(soft).collect();

        PortfolioData {
            name: pi.full_name,
            title,
            email: pi.email,
            phone: pi.phone,
            location: pi.location,
            about: parsed.summary,
            github: pi.github,
            linkedin: pi.linkedin,
            portfolio: pi.portfolio,
            profile_photo: String::new(),
            experience: parsed
                .experience
                .into_iter()
                .map(|e| PortfolioExperience {
                    company: e.company,
                    position: e.role,
                    duration: e.duration,
                    description: e.description,
                    responsibilities: Vec::new(),
                })
                .collect(),
            education: parsed
                .education
                .into_iter()
                .map(|e| PortfolioEducation {
                    degree: e.degree,
                    institution: e.institution,
                    year: e.year,
                    cgpa: e.cgpa,
                })
                .collect(),
            projects: parsed
                .projects
                .into_iter()
                .map(|p| PortfolioProject {
                    name: p.title,
                    description: p.description,
                    technologies: p.technologies,
                    link: p.github_link,
                    image: String::new(),
                })
                .collect(),
            skills,
            certifications: parsed.certifications,
            achievements: parsed.achievements,
            languages: Vec::new(),
        }
    }
}
