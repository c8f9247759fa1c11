use std::fmt;

use serde::de::{MapAccess, SeqAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Resume form payload as submitted by the client.
/// Every missing field resolves to its empty default here, once.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResumeData {
    pub personal_info: PersonalInfo,
    pub education: Vec<Education>,
    pub experience: Vec<Experience>,
    pub projects: Vec<Project>,
    pub skills: Skills,
    pub certifications: Vec<Certification>,
    pub achievements: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonalInfo {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub linkedin: String,
    pub github: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Education {
    pub degree: String,
    pub institution: String,
    pub start_date: String,
    pub end_date: String,
    pub cgpa: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Experience {
    pub position: String,
    pub company: String,
    pub location: String,
    pub start_date: String,
    pub end_date: String,
    pub responsibilities: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Project {
    pub title: String,
    pub description: String,
    pub technologies: Vec<String>,
    pub link: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Certification {
    pub name: String,
    pub issuer: String,
    pub date: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkillGroup {
    pub category: String,
    pub items: Vec<String>,
}

/// Ordered skill categories.
///
/// Accepts `{"Languages": ["Rust"], "Tools": "git, docker"}` (order preserved)
/// or a flat `["Rust", "SQL"]`, which becomes a single `Skills` category.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Skills(pub Vec<SkillGroup>);

impl Skills {
    pub fn groups(&self) -> &[SkillGroup] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|g| g.items.is_empty())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SkillList {
    List(Vec<String>),
    Text(String),
}

impl SkillList {
    fn into_items(self) -> Vec<String> {
        match self {
            SkillList::List(items) => items,
            SkillList::Text(text) => text.split(',').map(|s| s.trim().to_string()).collect(),
        }
    }
}

impl<'de> Deserialize<'de> for Skills {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SkillsVisitor;

        impl<'de> Visitor<'de> for SkillsVisitor {
            type Value = Skills;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of skill categories or a list of skills")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Skills, A::Error> {
                let mut groups = Vec::new();
                while let Some((category, list)) = map.next_entry::<String, Option<SkillList>>()? {
                    groups.push(SkillGroup {
                        category,
                        items: list.map(SkillList::into_items).unwrap_or_default(),
                    });
                }
                Ok(Skills(groups))
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Skills, A::Error> {
                let mut items = Vec::new();
                while let Some(item) = seq.next_element::<String>()? {
                    items.push(item);
                }
                Ok(Skills(vec![SkillGroup {
                    category: "Skills".to_string(),
                    items,
                }]))
            }

            fn visit_unit<E>(self) -> Result<Skills, E> {
                Ok(Skills::default())
            }

            fn visit_none<E>(self) -> Result<Skills, E> {
                Ok(Skills::default())
            }
        }

        deserializer.deserialize_any(SkillsVisitor)
    }
}

impl Serialize for Skills {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for group in &self.0 {
            map.serialize_entry(&group.category, &group.items)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_fields_default_to_empty() {
        let data: ResumeData =
            serde_json::from_value(json!({"personalInfo": {"name": "Asha"}})).unwrap();
        assert_eq!(data.personal_info.name, "Asha");
        assert!(data.personal_info.email.is_empty());
        assert!(data.education.is_empty());
        assert!(data.skills.is_empty());
    }

    #[test]
    fn test_skills_map_preserves_source_order() {
        let skills: Skills = serde_json::from_str(
            r#"{"Languages": ["Rust", "Go"], "Frameworks": "Axum, Tokio", "Databases": null}"#,
        )
        .unwrap();
        let categories: Vec<_> = skills.groups().iter().map(|g| g.category.as_str()).collect();
        assert_eq!(categories, ["Languages", "Frameworks", "Databases"]);
        assert_eq!(skills.groups()[1].items, ["Axum", "Tokio"]);
        assert!(skills.groups()[2].items.is_empty());
    }

    #[test]
    fn test_skills_flat_list_becomes_single_category() {
        let skills: Skills = serde_json::from_str(r#"["Rust", "SQL"]"#).unwrap();
        assert_eq!(skills.groups().len(), 1);
        assert_eq!(skills.groups()[0].category, "Skills");
        assert_eq!(skills.groups()[0].items, ["Rust", "SQL"]);
    }

    #[test]
    fn test_skills_serialize_as_map() {
        let skills = Skills(vec![SkillGroup {
            category: "Languages".to_string(),
            items: vec!["Rust".to_string()],
        }]);
        assert_eq!(serde_json::to_value(&skills).unwrap(), json!({"Languages": ["Rust"]}));
    }
}
