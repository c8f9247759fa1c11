/// Intermediate document model.
///
/// Built once from validated resume or portfolio data; the LaTeX, DOCX and
/// HTML renderers only walk this tree. Sections are present only when they
/// have content, in the order they should be rendered.
use crate::portfolio::data::PortfolioData;
use crate::resume::data::{ResumeData, SkillGroup};

#[derive(Debug, Clone, PartialEq)]
pub struct ResumeDocument {
    pub header: Header,
    pub sections: Vec<Section>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Header {
    pub name: String,
    /// Portfolio headline; resumes have none.
    pub headline: Option<String>,
    /// Email, phone, location; non-empty values only.
    pub contact: Vec<String>,
    pub links: Vec<Link>,
    pub photo: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    pub label: &'static str,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Period {
    pub start: String,
    pub end: String,
}

impl Period {
    pub fn new(start: &str, end: &str) -> Self {
        Self {
            start: start.to_string(),
            end: end.to_string(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start.is_empty() && self.end.is_empty()
    }

    /// Joins the non-empty ends with `sep`.
    pub fn join(&self, sep: &str) -> String {
        match (self.start.is_empty(), self.end.is_empty()) {
            (false, false) => format!("{}{sep}{}", self.start, self.end),
            (false, true) => self.start.clone(),
            (true, false) => self.end.clone(),
            (true, true) => String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EducationItem {
    pub degree: String,
    pub institution: String,
    pub period: Period,
    pub grade: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExperienceItem {
    pub position: String,
    pub company: String,
    pub location: String,
    pub period: Period,
    pub summary: Option<String>,
    pub highlights: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectItem {
    pub title: String,
    pub description: String,
    pub technologies: Vec<String>,
    pub link: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CertificationItem {
    pub name: String,
    pub issuer: String,
    pub date: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Section {
    About(String),
    Education(Vec<EducationItem>),
    Experience(Vec<ExperienceItem>),
    Projects(Vec<ProjectItem>),
    Skills(Vec<SkillGroup>),
    Certifications(Vec<CertificationItem>),
    Achievements(Vec<String>),
    Languages(Vec<String>),
}

impl Section {
    pub fn title(&self) -> &'static str {
        match self {
            Section::About(_) => "ABOUT ME",
            Section::Education(_) => "EDUCATION",
            Section::Experience(_) => "EXPERIENCE",
            Section::Projects(_) => "PROJECTS",
            Section::Skills(_) => "TECHNICAL SKILLS",
            Section::Certifications(_) => "CERTIFICATIONS",
            Section::Achievements(_) => "ACHIEVEMENTS",
            Section::Languages(_) => "LANGUAGES",
        }
    }

    /// Stable anchor id used by the HTML renderer.
    pub fn slug(&self) -> &'static str {
        match self {
            Section::About(_) => "about",
            Section::Education(_) => "education",
            Section::Experience(_) => "experience",
            Section::Projects(_) => "projects",
            Section::Skills(_) => "skills",
            Section::Certifications(_) => "certifications",
            Section::Achievements(_) => "achievements",
            Section::Languages(_) => "languages",
        }
    }
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

fn push_if<T>(sections: &mut Vec<Section>, items: Vec<T>, make: fn(Vec<T>) -> Section) {
    if !items.is_empty() {
        sections.push(make(items));
    }
}

fn social_links(linkedin: &str, github: &str, website: &str) -> Vec<Link> {
    [("LinkedIn", linkedin), ("GitHub", github), ("Website", website)]
        .into_iter()
        .filter_map(|(label, url)| non_empty(url).map(|url| Link { label, url }))
        .collect()
}

impl ResumeDocument {
    /// Resume layout: Education, Experience, Projects, Technical Skills,
    /// Certifications, Achievements.
    pub fn from_resume(data: &ResumeData) -> Self {
        let info = &data.personal_info;
        let header = Header {
            name: info.name.clone(),
            headline: None,
            contact: [&info.email, &info.phone, &info.location]
                .into_iter()
                .filter_map(|s| non_empty(s))
                .collect(),
            links: social_links(&info.linkedin, &info.github, ""),
            photo: None,
        };

        let mut sections = Vec::new();
        push_if(
            &mut sections,
            data.education
                .iter()
                .map(|e| EducationItem {
                    degree: e.degree.clone(),
                    institution: e.institution.clone(),
                    period: Period::new(&e.start_date, &e.end_date),
                    grade: non_empty(&e.cgpa),
                })
                .collect(),
            Section::Education,
        );
        push_if(
            &mut sections,
            data.experience
                .iter()
                .map(|e| ExperienceItem {
                    position: e.position.clone(),
                    company: e.company.clone(),
                    location: e.location.clone(),
                    period: Period::new(&e.start_date, &e.end_date),
                    summary: None,
                    highlights: e.responsibilities.clone(),
                })
                .collect(),
            Section::Experience,
        );
        push_if(
            &mut sections,
            data.projects
                .iter()
                .map(|p| ProjectItem {
                    title: p.title.clone(),
                    description: p.description.clone(),
                    technologies: p.technologies.clone(),
                    link: non_empty(&p.link),
                })
                .collect(),
            Section::Projects,
        );
        push_if(
            &mut sections,
            data.skills
                .groups()
                .iter()
                .filter(|g| !g.items.is_empty())
                .cloned()
                .collect(),
            Section::Skills,
        );
        push_if(
            &mut sections,
            data.certifications
                .iter()
                .map(|c| CertificationItem {
                    name: c.name.clone(),
                    issuer: c.issuer.clone(),
                    date: c.date.clone(),
                })
                .collect(),
            Section::Certifications,
        );
        push_if(&mut sections, data.achievements.clone(), Section::Achievements);

        Self { header, sections }
    }

    /// Portfolio layout: About, Skills, Experience, Projects, Education,
    /// Certifications, Achievements, Languages.
    pub fn from_portfolio(data: &PortfolioData) -> Self {
        let header = Header {
            name: data.name.trim().to_string(),
            headline: non_empty(&data.title),
            contact: [&data.email, &data.phone, &data.location]
                .into_iter()
                .filter_map(|s| non_empty(s))
                .collect(),
            links: social_links(&data.linkedin, &data.github, &data.portfolio),
            photo: non_empty(&data.profile_photo),
        };

        let clean = |items: &[String]| -> Vec<String> {
            items.iter().filter_map(|s| non_empty(s)).collect()
        };

        let mut sections = Vec::new();
        if let Some(about) = non_empty(&data.about) {
            sections.push(Section::About(about));
        }
        let skills = clean(&data.skills);
        if !skills.is_empty() {
            sections.push(Section::Skills(vec![SkillGroup {
                category: "Skills".to_string(),
                items: skills,
            }]));
        }
        push_if(
            &mut sections,
            data.experience
                .iter()
                .filter(|e| !e.position.trim().is_empty() || !e.company.trim().is_empty())
                .map(|e| ExperienceItem {
                    position: e.position.trim().to_string(),
                    company: e.company.trim().to_string(),
                    location: String::new(),
                    period: Period::new(e.duration.trim(), ""),
                    summary: non_empty(&e.description),
                    highlights: clean(&e.responsibilities),
                })
                .collect(),
            Section::Experience,
        );
        push_if(
            &mut sections,
            data.projects
                .iter()
                .filter(|p| !p.name.trim().is_empty())
                .map(|p| ProjectItem {
                    title: p.name.trim().to_string(),
                    description: p.description.trim().to_string(),
                    technologies: clean(&p.technologies),
                    link: non_empty(&p.link),
                })
                .collect(),
            Section::Projects,
        );
        push_if(
            &mut sections,
            data.education
                .iter()
                .filter(|e| !e.degree.trim().is_empty())
                .map(|e| EducationItem {
                    degree: e.degree.trim().to_string(),
                    institution: e.institution.trim().to_string(),
                    period: Period::new(e.year.trim(), ""),
                    grade: non_empty(&e.cgpa),
                })
                .collect(),
            Section::Education,
        );
        push_if(
            &mut sections,
            clean(&data.certifications)
                .into_iter()
                .map(|name| CertificationItem {
                    name,
                    issuer: String::new(),
                    date: String::new(),
                })
                .collect(),
            Section::Certifications,
        );
        push_if(&mut sections, clean(&data.achievements), Section::Achievements);
        push_if(&mut sections, clean(&data.languages), Section::Languages);

        Self { header, sections }
    }

    pub fn section_titles(&self) -> Vec<&'static str> {
        self.sections.iter().map(Section::title).collect()
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::resume::data::*;

    pub fn sample_resume() -> ResumeData {
        ResumeData {
            personal_info: PersonalInfo {
                name: "Asha Rao".to_string(),
                email: "asha@example.com".to_string(),
                phone: "+91 98765 43210".to_string(),
                location: "Pune".to_string(),
                linkedin: "https://linkedin.com/in/asha".to_string(),
                github: "https://github.com/asha".to_string(),
            },
            education: vec![Education {
                degree: "B.Tech Computer Science".to_string(),
                institution: "NIT Trichy".to_string(),
                start_date: "2019".to_string(),
                end_date: "2023".to_string(),
                cgpa: "8.9".to_string(),
            }],
            experience: vec![Experience {
                position: "Backend Intern".to_string(),
                company: "Acme & Co".to_string(),
                location: "Remote".to_string(),
                start_date: "May 2022".to_string(),
                end_date: "Jul 2022".to_string(),
                responsibilities: vec!["Cut p99 latency by 40%".to_string()],
            }],
            projects: vec![Project {
                title: "Placement Tracker".to_string(),
                description: "Tracks #offers per_branch".to_string(),
                technologies: vec!["Rust".to_string(), "Postgres".to_string()],
                link: "https://example.com/tracker".to_string(),
            }],
            skills: Skills(vec![SkillGroup {
                category: "Languages".to_string(),
                items: vec!["Rust".to_string(), "C++".to_string()],
            }]),
            certifications: vec![Certification {
                name: "AWS Cloud Practitioner".to_string(),
                issuer: "Amazon".to_string(),
                date: "2023".to_string(),
            }],
            achievements: vec!["Winner, Smart India Hackathon".to_string()],
        }
    }
}
