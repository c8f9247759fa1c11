//! Query parameters for job search and the local filters applied to results.
//!
//! Jobs stay as raw SearchAPI JSON; filters only read the few fields they need.

use serde::Deserialize;
use serde_json::{Map, Value};

const DEFAULT_QUERY: &str = "python developer";
const DEFAULT_LOCATION: &str = "India";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSearchQuery {
    pub query: Option<String>,
    pub location: Option<String>,
    pub work_mode: Option<String>,
    pub experience_level: Option<String>,
    pub job_type: Option<String>,
    pub salary_range: Option<String>,
    pub tech_stack: Option<String>,
    pub posted_date: Option<String>,
    pub company: Option<String>,
    pub degree_required: Option<String>,
    pub apply_platform: Option<String>,
    pub role_category: Option<String>,
}

/// A present, non-blank parameter.
fn given(param: &Option<String>) -> Option<&str> {
    param.as_deref().map(str::trim).filter(|p| !p.is_empty())
}

impl JobSearchQuery {
    /// Search text: the query plus tech stack and role category when given.
    pub fn search_terms(&self) -> String {
        let mut terms = given(&self.query).unwrap_or(DEFAULT_QUERY).to_string();
        for extra in [given(&self.tech_stack), given(&self.role_category)]
            .into_iter()
            .flatten()
        {
            terms.push(' ');
            terms.push_str(extra);
        }
        terms
    }

    pub fn location(&self) -> &str {
        given(&self.location).unwrap_or(DEFAULT_LOCATION)
    }

    pub fn job_type(&self) -> Option<&str> {
        given(&self.job_type)
    }

    /// Google Jobs `date_posted` value; unknown codes are dropped.
    pub fn date_posted(&self) -> Option<&'static str> {
        match given(&self.posted_date)? {
            "24h" => Some("today"),
            "3d" => Some("3days"),
            "7d" => Some("week"),
            "14d" => Some("2weeks"),
            "30d" => Some("month"),
            _ => None,
        }
    }

    /// Echo of the filter parameters the client sent.
    pub fn filters_applied(&self) -> Value {
        let fields = [
            ("workMode", &self.work_mode),
            ("experienceLevel", &self.experience_level),
            ("jobType", &self.job_type),
            ("salaryRange", &self.salary_range),
            ("techStack", &self.tech_stack),
            ("postedDate", &self.posted_date),
            ("company", &self.company),
            ("degreeRequired", &self.degree_required),
            ("applyPlatform", &self.apply_platform),
            ("roleCategory", &self.role_category),
        ];
        let map: Map<String, Value> = fields
            .into_iter()
            .filter_map(|(key, value)| Some((key.to_string(), Value::from(value.as_deref()?))))
            .collect();
        Value::Object(map)
    }

    /// Keeps the jobs that pass every given filter. Salary range is echoed
    /// but never filtered on.
    pub fn apply(&self, jobs: Vec<Value>) -> Vec<Value> {
        let work_mode = given(&self.work_mode).map(str::to_lowercase);
        let experience = given(&self.experience_level);
        let company = given(&self.company).map(str::to_lowercase);
        let degree = given(&self.degree_required);
        let platform = given(&self.apply_platform).map(str::to_lowercase);

        jobs.into_iter()
            .filter(|job| work_mode.as_deref().map_or(true, |m| matches_work_mode(job, m)))
            .filter(|job| experience.map_or(true, |l| matches_experience(job, l)))
            .filter(|job| {
                company
                    .as_deref()
                    .map_or(true, |c| field(job, "company_name").contains(c))
            })
            .filter(|job| degree.map_or(true, |d| matches_degree(job, d)))
            .filter(|job| platform.as_deref().map_or(true, |p| matches_platform(job, p)))
            .collect()
    }
}

/// Lowercased string field, empty when absent.
fn field(job: &Value, key: &str) -> String {
    job.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_lowercase()
}

fn detected_flag(job: &Value, key: &str) -> bool {
    job.pointer(&format!("/detected_extensions/{key}"))
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

fn matches_work_mode(job: &Value, mode: &str) -> bool {
    let extensions = job
        .get("extensions")
        .and_then(Value::as_array)
        .map(|exts| {
            exts.iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join(" ")
        })
        .unwrap_or_default();
    let text = format!(
        "{} {} {}",
        field(job, "description"),
        field(job, "title"),
        extensions.to_lowercase()
    );

    match mode {
        "remote" => {
            contains_any(&text, &["remote", "work from home"])
                || detected_flag(job, "work_from_home")
        }
        "onsite" => !contains_any(&text, &["remote", "work from home", "hybrid"]),
        "hybrid" => text.contains("hybrid"),
        _ => true,
    }
}

fn matches_experience(job: &Value, level: &str) -> bool {
    let text = format!("{} {}", field(job, "description"), field(job, "title"));
    match level {
        "Fresher" => contains_any(&text, &["fresher", "0 year", "0-1 year", "entry level"]),
        "Entry Level" => contains_any(&text, &["entry", "0-2 year", "junior"]),
        "Mid Level" => contains_any(&text, &["mid", "3-5 year", "intermediate"]),
        "Senior" => contains_any(&text, &["senior", "5+ year", "lead"]),
        _ => true,
    }
}

fn matches_degree(job: &Value, degree: &str) -> bool {
    let desc = field(job, "description");
    match degree {
        "No Degree" => {
            detected_flag(job, "no_degree_mentioned") || desc.contains("no degree required")
        }
        "Bachelor" => contains_any(&desc, &["bachelor", "b.e", "b.tech", "b.sc"]),
        "Master" => contains_any(&desc, &["master", "m.e", "m.tech", "m.sc"]),
        "PhD" => contains_any(&desc, &["phd", "doctorate"]),
        _ => true,
    }
}

fn matches_platform(job: &Value, platform: &str) -> bool {
    let sources = job
        .get("apply_links")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|link| link.get("source").and_then(Value::as_str))
        .any(|source| source.to_lowercase().contains(platform));
    sources || field(job, "via").contains(platform)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn jobs() -> Vec<Value> {
        vec![
            json!({
                "title": "Senior Rust Engineer",
                "company_name": "Acme Labs",
                "description": "Remote role. Bachelor's degree in CS.",
                "via": "LinkedIn",
                "extensions": ["Full-time"],
            }),
            json!({
                "title": "Python Developer (Fresher)",
                "company_name": "Initech",
                "description": "Hybrid work from our Pune office. No degree required.",
                "apply_links": [{"source": "Naukri.com", "link": "https://naukri.com/x"}],
            }),
            json!({
                "title": "Backend Developer",
                "company_name": "Globex",
                "description": "On-site in Bengaluru, 3-5 years experience.",
                "detected_extensions": {"work_from_home": false},
            }),
        ]
    }

    fn titles(jobs: &[Value]) -> Vec<&str> {
        jobs.iter().filter_map(|j| j["title"].as_str()).collect()
    }

    #[test]
    fn test_search_terms_and_defaults() {
        let q = JobSearchQuery::default();
        assert_eq!(q.search_terms(), "python developer");
        assert_eq!(q.location(), "India");

        let q = JobSearchQuery {
            query: Some("backend".into()),
            tech_stack: Some("Rust".into()),
            role_category: Some("SDE".into()),
            ..Default::default()
        };
        assert_eq!(q.search_terms(), "backend Rust SDE");
    }

    #[test]
    fn test_posted_date_mapping() {
        let q = |code: &str| JobSearchQuery {
            posted_date: Some(code.to_string()),
            ..Default::default()
        };
        assert_eq!(q("24h").date_posted(), Some("today"));
        assert_eq!(q("14d").date_posted(), Some("2weeks"));
        assert_eq!(q("1y").date_posted(), None);
    }

    #[test]
    fn test_work_mode_filters() {
        let by_mode = |mode: &str| {
            JobSearchQuery {
                work_mode: Some(mode.to_string()),
                ..Default::default()
            }
            .apply(jobs())
        };
        assert_eq!(titles(&by_mode("Remote")), ["Senior Rust Engineer"]);
        assert_eq!(titles(&by_mode("hybrid")), ["Python Developer (Fresher)"]);
        assert_eq!(titles(&by_mode("onsite")), ["Backend Developer"]);
    }

    #[test]
    fn test_field_filters() {
        let q = JobSearchQuery {
            experience_level: Some("Mid Level".into()),
            ..Default::default()
        };
        assert_eq!(titles(&q.apply(jobs())), ["Backend Developer"]);

        let q = JobSearchQuery {
            company: Some("acme".into()),
            degree_required: Some("Bachelor".into()),
            ..Default::default()
        };
        assert_eq!(titles(&q.apply(jobs())), ["Senior Rust Engineer"]);

        let q = JobSearchQuery {
            apply_platform: Some("naukri".into()),
            ..Default::default()
        };
        assert_eq!(titles(&q.apply(jobs())), ["Python Developer (Fresher)"]);
    }

    #[test]
    fn test_salary_range_is_not_filtered() {
        let q = JobSearchQuery {
            salary_range: Some("10-20 LPA".into()),
            ..Default::default()
        };
        assert_eq!(q.apply(jobs()).len(), 3);
        assert_eq!(q.filters_applied(), json!({"salaryRange": "10-20 LPA"}));
    }
}
