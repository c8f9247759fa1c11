use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::portfolio::data::{
    PersonalInfo, PortfolioData, PortfolioEducation, PortfolioExperience, PortfolioProject,
};

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub portfolio_id: String,
    pub template: String,
    pub personal_info: Json<PersonalInfo>,
    pub experience: Json<Vec<PortfolioExperience>>,
    pub education: Json<Vec<PortfolioEducation>>,
    pub projects: Json<Vec<PortfolioProject>>,
    pub skills: Vec<String>,
    pub certifications: Vec<String>,
    pub achievements: Vec<String>,
    pub languages: Vec<String>,
    pub is_published: bool,
    pub views: i32,
    pub site_url: Option<String>,
    pub deployed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PortfolioRow {
    /// Flattens the stored columns back into editable portfolio data.
    pub fn to_data(&self) -> PortfolioData {
        let info = &self.personal_info.0;
        PortfolioData {
            name: info.name.clone(),
            title: info.title.clone(),
            email: info.email.clone(),
            phone: info.phone.clone(),
            location: info.location.clone(),
            about: info.about.clone(),
            github: info.github.clone(),
            linkedin: info.linkedin.clone(),
            portfolio: info.portfolio.clone(),
            profile_photo: info.profile_photo.clone(),
            experience: self.experience.0.clone(),
            education: self.education.0.clone(),
            projects: self.projects.0.clone(),
            skills: self.skills.clone(),
            certifications: self.certifications.clone(),
            achievements: self.achievements.clone(),
            languages: self.languages.clone(),
        }
    }
}
