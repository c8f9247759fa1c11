use serde::{Deserialize, Serialize};

/// Portfolio content as edited by the client and stored per deployment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PortfolioData {
    pub name: String,
    pub title: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub about: String,
    pub github: String,
    pub linkedin: String,
    pub portfolio: String,
    pub profile_photo: String,
    pub experience: Vec<PortfolioExperience>,
    pub education: Vec<PortfolioEducation>,
    pub projects: Vec<PortfolioProject>,
    pub skills: Vec<String>,
    pub certifications: Vec<String>,
    pub achievements: Vec<String>,
    pub languages: Vec<String>,
}

/// The identity block persisted in the `personal_info` JSONB column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonalInfo {
    pub name: String,
    pub title: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub about: String,
    pub github: String,
    pub linkedin: String,
    pub portfolio: String,
    pub profile_photo: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PortfolioExperience {
    pub company: String,
    pub position: String,
    pub duration: String,
    pub description: String,
    pub responsibilities: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PortfolioEducation {
    pub degree: String,
    pub institution: String,
    pub year: String,
    pub cgpa: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PortfolioProject {
    pub name: String,
    pub description: String,
    pub technologies: Vec<String>,
    pub link: String,
    pub image: String,
}

/// Partial update: every present field replaces the stored one.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioPatch {
    pub name: Option<String>,
    pub title: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub about: Option<String>,
    pub github: Option<String>,
    pub linkedin: Option<String>,
    pub portfolio: Option<String>,
    pub profile_photo: Option<String>,
    pub experience: Option<Vec<PortfolioExperience>>,
    pub education: Option<Vec<PortfolioEducation>>,
    pub projects: Option<Vec<PortfolioProject>>,
    pub skills: Option<Vec<String>>,
    pub certifications: Option<Vec<String>>,
    pub achievements: Option<Vec<String>>,
    pub languages: Option<Vec<String>>,
}

impl PortfolioData {
    pub fn personal_info(&self) -> PersonalInfo {
        PersonalInfo {
            name: self.name.clone(),
            title: self.title.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            location: self.location.clone(),
            about: self.about.clone(),
            github: self.github.clone(),
            linkedin: self.linkedin.clone(),
            portfolio: self.portfolio.clone(),
            profile_photo: self.profile_photo.clone(),
        }
    }

    /// Name and title are the minimum for a publishable page.
    pub fn check_publishable(&self) -> Result<(), &'static str> {
        if self.name.trim().is_empty() || self.title.trim().is_empty() {
            return Err("Portfolio name and title are required");
        }
        Ok(())
    }

    pub fn apply(&mut self, patch: PortfolioPatch) {
        macro_rules! replace {
            ($($field:ident),* $(,)?) => {
                $(if let Some(value) = patch.$field {
                    self.$field = value;
                })*
            };
        }
        replace!(
            name,
            title,
            email,
            phone,
            location,
            about,
            github,
            linkedin,
            portfolio,
            profile_photo,
            experience,
            education,
            projects,
            skills,
            certifications,
            achievements,
            languages,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_patch_replaces_only_present_fields() {
        let mut data = PortfolioData {
            name: "Asha".to_string(),
            title: "Backend Engineer".to_string(),
            skills: vec!["Rust".to_string()],
            ..Default::default()
        };
        let patch: PortfolioPatch =
            serde_json::from_value(json!({"title": "Platform Engineer", "languages": ["Hindi"]}))
                .unwrap();
        data.apply(patch);

        assert_eq!(data.name, "Asha");
        assert_eq!(data.title, "Platform Engineer");
        assert_eq!(data.skills, ["Rust"]);
        assert_eq!(data.languages, ["Hindi"]);
    }

    #[test]
    fn test_patch_can_clear_a_list() {
        let mut data = PortfolioData {
            skills: vec!["Rust".to_string()],
            ..Default::default()
        };
        data.apply(serde_json::from_value(json!({"skills": []})).unwrap());
        assert!(data.skills.is_empty());
    }

    #[test]
    fn test_publishable_requires_name_and_title() {
        let mut data = PortfolioData {
            name: "Asha".to_string(),
            ..Default::default()
        };
        assert_eq!(
            data.check_publishable(),
            Err("Portfolio name and title are required")
        );
        data.title = "Engineer".to_string();
        assert!(data.check_publishable().is_ok());
    }
}
