use crate::resume::data::{ResumeData, SkillGroup, Skills};

/// Validates and normalizes resume data.
///
/// Every string is trimmed; entries missing their key field (degree,
/// position, title, certification name) and blank list items are dropped.
/// Returns the error list in a fixed order when the result is unusable.
pub fn validate_resume(data: ResumeData) -> Result<ResumeData, Vec<String>> {
    let data = normalize(data);
    let mut errors = Vec::new();

    if data.personal_info.name.is_empty() {
        errors.push("Personal information: Name is required".to_string());
    }
    if data.personal_info.email.is_empty() {
        errors.push("Personal information: Email is required".to_string());
    }
    if data.education.is_empty() {
        errors.push("At least one education entry is required".to_string());
    }

    if errors.is_empty() {
        Ok(data)
    } else {
        Err(errors)
    }
}

fn normalize(mut data: ResumeData) -> ResumeData {
    let info = &mut data.personal_info;
    for field in [
        &mut info.name,
        &mut info.email,
        &mut info.phone,
        &mut info.location,
        &mut info.linkedin,
        &mut info.github,
    ] {
        trim_in_place(field);
    }

    data.education.retain_mut(|e| {
        for field in [
            &mut e.degree,
            &mut e.institution,
            &mut e.start_date,
            &mut e.end_date,
            &mut e.cgpa,
        ] {
            trim_in_place(field);
        }
        !e.degree.is_empty()
    });

    data.experience.retain_mut(|e| {
        for field in [
            &mut e.position,
            &mut e.company,
            &mut e.location,
            &mut e.start_date,
            &mut e.end_date,
        ] {
            trim_in_place(field);
        }
        e.responsibilities = clean_list(std::mem::take(&mut e.responsibilities));
        !e.position.is_empty()
    });

    data.projects.retain_mut(|p| {
        for field in [&mut p.title, &mut p.description, &mut p.link] {
            trim_in_place(field);
        }
        p.technologies = clean_list(std::mem::take(&mut p.technologies));
        !p.title.is_empty()
    });

    data.skills = Skills(
        std::mem::take(&mut data.skills.0)
            .into_iter()
            .map(|g| SkillGroup {
                category: g.category.trim().to_string(),
                items: clean_list(g.items),
            })
            .filter(|g| !g.category.is_empty() && !g.items.is_empty())
            .collect(),
    );

    data.certifications.retain_mut(|c| {
        for field in [&mut c.name, &mut c.issuer, &mut c.date] {
            trim_in_place(field);
        }
        !c.name.is_empty()
    });

    data.achievements = clean_list(std::mem::take(&mut data.achievements));
    data
}

fn trim_in_place(s: &mut String) {
    let trimmed = s.trim();
    if trimmed.len() != s.len() {
        *s = trimmed.to_string();
    }
}

fn clean_list(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resume::data::{Education, Experience, PersonalInfo, Project};

    fn minimal() -> ResumeData {
        ResumeData {
            personal_info: PersonalInfo {
                name: "  Asha Rao ".to_string(),
                email: "asha@example.com".to_string(),
                ..Default::default()
            },
            education: vec![Education {
                degree: "B.Tech".to_string(),
                institution: "NIT".to_string(),
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_data_is_trimmed() {
        let data = validate_resume(minimal()).unwrap();
        assert_eq!(data.personal_info.name, "Asha Rao");
    }

    #[test]
    fn test_all_errors_reported_in_order() {
        let errors = validate_resume(ResumeData::default()).unwrap_err();
        assert_eq!(
            errors,
            [
                "Personal information: Name is required",
                "Personal information: Email is required",
                "At least one education entry is required",
            ]
        );
    }

    #[test]
    fn test_education_without_degree_does_not_count() {
        let mut data = minimal();
        data.education[0].degree = "   ".to_string();
        let errors = validate_resume(data).unwrap_err();
        assert_eq!(errors, ["At least one education entry is required"]);
    }

    #[test]
    fn test_empty_entries_and_items_dropped() {
        let mut data = minimal();
        data.experience = vec![
            Experience {
                position: "Intern".to_string(),
                responsibilities: vec!["Built APIs".to_string(), "  ".to_string()],
                ..Default::default()
            },
            Experience::default(),
        ];
        data.projects = vec![Project::default()];
        data.skills = Skills(vec![
            SkillGroup {
                category: "Languages".to_string(),
                items: vec!["Rust".to_string(), String::new()],
            },
            SkillGroup {
                category: "Empty".to_string(),
                items: vec![" ".to_string()],
            },
        ]);
        data.achievements = vec![String::new()];

        let data = validate_resume(data).unwrap();
        assert_eq!(data.experience.len(), 1);
        assert_eq!(data.experience[0].responsibilities, ["Built APIs"]);
        assert!(data.projects.is_empty());
        assert_eq!(data.skills.groups().len(), 1);
        assert_eq!(data.skills.groups()[0].items, ["Rust"]);
        assert!(data.achievements.is_empty());
    }

    #[test]
    fn test_markup_is_not_entity_encoded() {
        let mut data = minimal();
        data.personal_info.name = "R&D <Lead>".to_string();
        let data = validate_resume(data).unwrap();
        assert_eq!(data.personal_info.name, "R&D <Lead>");
    }
}
