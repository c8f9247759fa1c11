//! Heuristic resume parser used when no LLM is configured or the LLM call fails.
//!
//! Works on normalized plain text: contact details are matched anywhere, the
//! rest is read section by section, where a section starts at a known heading
//! line and runs until the next heading.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;

use crate::bridge::truncate_chars;
use crate::portfolio::data::{
    PortfolioData, PortfolioEducation, PortfolioExperience, PortfolioProject,
};

macro_rules! regex {
    ($re:expr) => {{
        static RE: OnceLock<Regex> = OnceLock::new();
        RE.get_or_init(|| Regex::new($re).expect("valid regex"))
    }};
}

const MAX_ABOUT_CHARS: usize = 500;
const MAX_SKILLS: usize = 30;
const MAX_EXPERIENCE: usize = 8;
const MAX_EDUCATION: usize = 5;
const MAX_PROJECTS: usize = 10;
const MAX_LIST_ITEMS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Heading {
    Summary,
    Skills,
    Experience,
    Education,
    Projects,
    Certifications,
    Achievements,
    Languages,
    Other,
}

type Sections<'a> = Vec<(Heading, Vec<&'a str>)>;

pub fn extract_portfolio(text: &str) -> PortfolioData {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    let sections = split_sections(&lines);
    let body = |heading| section(&sections, heading).unwrap_or_default();

    PortfolioData {
        name: guess_name(&lines),
        title: guess_title(text),
        email: find(text, regex!(r"[\w.-]+@[\w.-]+\.\w{2,}"))
            .map(|e| e.to_lowercase())
            .unwrap_or_default(),
        phone: guess_phone(text),
        location: guess_location(text),
        about: summarize(body(Heading::Summary)),
        github: find(text, regex!(r"(?i)(?:https?://)?(?:www\.)?github\.com/[\w-]+"))
            .map(with_scheme)
            .unwrap_or_default(),
        linkedin: find(
            text,
            regex!(r"(?i)(?:https?://)?(?:www\.)?linkedin\.com/in/[\w-]+"),
        )
        .map(with_scheme)
        .unwrap_or_default(),
        experience: parse_experience(body(Heading::Experience)),
        education: parse_education(body(Heading::Education)),
        projects: parse_projects(body(Heading::Projects)),
        skills: parse_skills(body(Heading::Skills)),
        certifications: parse_list(body(Heading::Certifications), 150),
        achievements: parse_list(body(Heading::Achievements), 200),
        languages: parse_languages(body(Heading::Languages)),
        ..Default::default()
    }
}

fn heading_of(line: &str) -> Option<Heading> {
    let label = line.trim_end_matches(':').trim().to_lowercase();
    let heading = match label.as_str() {
        "summary" | "professional summary" | "objective" | "career objective" | "profile"
        | "about" | "about me" => Heading::Summary,
        "skills" | "technical skills" | "core competencies" | "technologies" => Heading::Skills,
        "experience" | "work experience" | "employment" | "professional experience"
        | "career history" => Heading::Experience,
        "education" | "academic" | "academics" | "qualification" | "qualifications" => {
            Heading::Education
        }
        "project" | "projects" | "personal projects" | "key projects" | "academic projects"
        | "work projects" => Heading::Projects,
        "certification" | "certifications" | "certificate" | "certificates" => {
            Heading::Certifications
        }
        "achievement" | "achievements" | "accomplishments" | "awards" => Heading::Achievements,
        "language" | "languages" => Heading::Languages,
        _ if is_shouted(line) => Heading::Other,
        _ => return None,
    };
    Some(heading)
}

/// An all-caps line such as an unrecognized section heading.
fn is_shouted(line: &str) -> bool {
    let line = line.trim_end_matches(':');
    let letters = line.chars().filter(|c| c.is_alphabetic()).count();
    letters >= 4
        && line.chars().count() <= 40
        && line
            .chars()
            .all(|c| c.is_ascii_uppercase() || matches!(c, ' ' | '&' | '/'))
}

fn split_sections<'a>(lines: &[&'a str]) -> Sections<'a> {
    let mut sections = Vec::new();
    let mut current: Option<(Heading, Vec<&str>)> = None;
    for &line in lines {
        if let Some(heading) = heading_of(line) {
            sections.extend(current.take());
            current = Some((heading, Vec::new()));
        } else if let Some((_, body)) = current.as_mut() {
            body.push(line);
        }
    }
    sections.extend(current);
    sections
}

fn section<'s, 'a>(sections: &'s Sections<'a>, heading: Heading) -> Option<&'s [&'a str]> {
    sections
        .iter()
        .find(|(h, body)| *h == heading && !body.is_empty())
        .map(|(_, body)| body.as_slice())
}

fn find<'t>(text: &'t str, re: &Regex) -> Option<&'t str> {
    re.find(text).map(|m| m.as_str())
}

fn with_scheme(url: &str) -> String {
    if url.starts_with("http") {
        url.to_string()
    } else {
        format!("https://{url}")
    }
}

fn collapse_spaces(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn strip_bullet(line: &str) -> &str {
    line.trim_start_matches(|c: char| matches!(c, '-' | '•' | '·' | '●' | '∙' | '*' | '▪'))
        .trim()
}

/// Strips bullets and list numbering.
fn strip_marker(line: &str) -> &str {
    line.trim_start_matches(|c: char| {
        matches!(c, '-' | '•' | '·' | '●' | '∙' | '*' | '▪' | '.' | ')')
            || c.is_ascii_digit()
            || c.is_whitespace()
    })
    .trim()
}

fn guess_name(lines: &[&str]) -> String {
    lines
        .iter()
        .take(5)
        .find(|line| {
            let words = line.split_whitespace().count();
            (3..=50).contains(&line.len())
                && (2..=5).contains(&words)
                && regex!(r"^[A-Z][a-zA-Z\s.]+$").is_match(line)
        })
        .map(|line| line.to_string())
        .unwrap_or_default()
}

fn guess_phone(text: &str) -> String {
    [
        regex!(r"(?:\+91[-.\s]?)?[6-9]\d{9}"),
        regex!(r"(?:\+\d{1,3}[-.\s]?)?\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}"),
        regex!(r"\d{5}[-.\s]?\d{5}"),
    ]
    .into_iter()
    .find_map(|re| find(text, re))
    .map(str::to_string)
    .unwrap_or_default()
}

fn guess_title(text: &str) -> String {
    [
        regex!(
            r"(?i)(?:Senior|Junior|Lead|Principal|Staff|Sr\.?|Jr\.?)\s+(?:Software|Full[\s-]?Stack|Front[\s-]?End|Back[\s-]?End|Web|Mobile|DevOps|Data|AI|ML|Cloud)\s+(?:Developer|Engineer|Architect)"
        ),
        regex!(
            r"(?i)(?:Full[\s-]?Stack|Front[\s-]?End|Back[\s-]?End|Software|Web|Mobile|DevOps|Data|AI|ML|Cloud)\s+(?:Developer|Engineer|Architect|Scientist)"
        ),
        regex!(r"(?i)(?:Product|Project|Program|Engineering|Technical)\s+(?:Manager|Lead|Head|Director)"),
        regex!(r"(?i)(?:UI/UX|UX/UI)\s+(?:Designer|Developer)"),
    ]
    .into_iter()
    .find_map(|re| find(text, re))
    .map(collapse_spaces)
    .unwrap_or_default()
}

fn guess_location(text: &str) -> String {
    [
        regex!(
            r"(?i)(?:Mumbai|Delhi|Bangalore|Bengaluru|Hyderabad|Chennai|Pune|Kolkata|Ahmedabad|Jaipur|Surat|Lucknow|Nagpur|Gurgaon|Gurugram|Noida)[,\s]+(?:India|Maharashtra|Karnataka|Tamil Nadu|Telangana|Gujarat|Delhi|Haryana|UP)"
        ),
        regex!(
            r"(?i)(?:San Francisco|New York|Los Angeles|Seattle|Austin|Boston)[,\s]+(?:USA|US|California|CA|NY|Texas|TX|Washington|WA|MA)"
        ),
        regex!(r"(?i)(?:London|Manchester|Birmingham|Edinburgh)[,\s]+(?:UK|United Kingdom|England|Scotland)"),
    ]
    .into_iter()
    .find_map(|re| find(text, re))
    .map(str::to_string)
    .unwrap_or_default()
}

fn summarize(body: &[&str]) -> String {
    truncate_chars(&collapse_spaces(&body.join(" ")), MAX_ABOUT_CHARS)
}

fn parse_skills(body: &[&str]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut skills = Vec::new();
    for line in body {
        // "Languages: Rust, Go" lists only what follows the category label
        let items = line.split_once(':').map_or(*line, |(_, rest)| rest);
        for part in items.split(|c| matches!(c, ',' | '|' | ';' | '•' | '·' | '●' | '∙')) {
            let cleaned: String = part
                .chars()
                .filter(|c| {
                    c.is_alphanumeric() || c.is_whitespace() || matches!(c, '+' | '#' | '.' | '-')
                })
                .collect();
            let cleaned = strip_bullet(&cleaned).to_string();
            let len = cleaned.chars().count();
            let lower = cleaned.to_lowercase();
            if (2..=30).contains(&len)
                && !matches!(lower.as_str(), "and" | "or" | "the")
                && seen.insert(lower)
            {
                skills.push(cleaned);
            }
        }
    }
    skills.truncate(MAX_SKILLS);
    skills
}

fn is_date_range(line: &str) -> bool {
    line.chars().count() <= 60
        && regex!(
            r"(?i)(?:(?:jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?\s+)?(?:19|20)\d{2}\s*(?:-|–|—|to)\s*(?:(?:(?:jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?\s+)?(?:19|20)\d{2}|present|current|now)"
        )
        .is_match(line)
}

/// Splits "Position - Company", "Position at Company" and "Position @ Company".
fn split_role(line: &str) -> Option<(String, String)> {
    let caps = regex!(
        r"(?i)^([A-Za-z][A-Za-z\s&,.-]{2,}?)\s+(?:[-–—|@]|at)\s+([A-Za-z][A-Za-z\s&,.-]{2,})$"
    )
    .captures(line)?;
    Some((caps[1].trim().to_string(), caps[2].trim().to_string()))
}

fn parse_experience(body: &[&str]) -> Vec<PortfolioExperience> {
    let mut entries = Vec::new();
    let mut current: Option<PortfolioExperience> = None;

    for raw in body {
        let line = strip_bullet(raw);
        if is_date_range(line) {
            if let Some(exp) = current.as_mut().filter(|e| e.duration.is_empty()) {
                exp.duration = line.to_string();
            }
            continue;
        }
        if let Some((position, company)) = split_role(line) {
            entries.extend(current.take().filter(|e| !e.position.is_empty()));
            current = Some(PortfolioExperience {
                position,
                company,
                ..Default::default()
            });
            continue;
        }
        match current.as_mut() {
            None => {
                if regex!(r"^[A-Z][A-Za-z\s&,.-]{5,}$").is_match(line) {
                    current = Some(PortfolioExperience {
                        company: line.to_string(),
                        ..Default::default()
                    });
                }
            }
            Some(exp)
                if !exp.company.is_empty()
                    && exp.position.is_empty()
                    && regex!(r"^[A-Z][A-Za-z\s]+$").is_match(line) =>
            {
                exp.position = line.to_string();
            }
            Some(exp)
                if !exp.position.is_empty() && line.chars().count() > 20 && !is_shouted(line) =>
            {
                if !exp.description.is_empty() {
                    exp.description.push(' ');
                }
                exp.description.push_str(line);
            }
            Some(_) => {}
        }
    }
    entries.extend(current);

    entries.retain(|e| e.position.chars().count() > 2 || e.company.chars().count() > 2);
    entries.truncate(MAX_EXPERIENCE);
    entries
}

fn note_year_and_grade(edu: &mut PortfolioEducation, line: &str) {
    if edu.year.is_empty() {
        if let Some(year) = find(
            line,
            regex!(r"(?i)(?:19|20)\d{2}(?:\s*(?:-|–|—|to)\s*(?:(?:19|20)\d{2}|present))?"),
        ) {
            edu.year = year.to_string();
        }
    }
    if edu.cgpa.is_empty() {
        if let Some(caps) =
            regex!(r"(?i)\b(?:c?gpa|cpi)\s*[:\-]?\s*(\d{1,2}(?:\.\d{1,2})?)").captures(line)
        {
            edu.cgpa = caps[1].to_string();
        }
    }
}

fn parse_education(body: &[&str]) -> Vec<PortfolioEducation> {
    let degree = regex!(
        r"(?i)(?:^|[^a-z])(?:b\.?\s?tech|m\.?\s?tech|b\.?sc|m\.?sc|mba|mca|bca|bachelors?|masters?|diploma|ph\.?d|b\.e\.?|m\.e\.?|b\.a\.?|m\.a\.?)(?:[^a-z]|$)"
    );
    let institution = regex!(r"(?i)university|college|institute|school");

    let mut entries = Vec::new();
    let mut current: Option<PortfolioEducation> = None;
    for raw in body {
        let line = strip_bullet(raw);
        if degree.is_match(line) {
            entries.extend(current.take());
            let mut edu = PortfolioEducation {
                degree: line.to_string(),
                ..Default::default()
            };
            note_year_and_grade(&mut edu, line);
            current = Some(edu);
        } else if let Some(edu) = current.as_mut() {
            if edu.institution.is_empty() && institution.is_match(line) {
                edu.institution = line.to_string();
            }
            note_year_and_grade(edu, line);
        }
    }
    entries.extend(current);
    entries.truncate(MAX_EDUCATION);
    entries
}

fn is_field_label(line: &str) -> bool {
    regex!(
        r"(?i)^(?:tech|technologies|stack|description|features|link|url|github|demo|duration|responsibilities)\s*:"
    )
    .is_match(line)
}

fn project_title(line: &str) -> Option<String> {
    let caps = regex!(r"^(?:([\d.)]+)\s*|[-•·●∙*]\s*)([A-Za-z][A-Za-z0-9\s\-:()&]{4,80})$")
        .captures(line)?;
    let title = caps[2].trim();
    // Short bullet lines read as titles; longer ones are descriptions.
    if caps.get(1).is_none() && title.split_whitespace().count() > 6 {
        return None;
    }
    Some(title.to_string())
}

fn looks_like_title(line: &str) -> bool {
    let len = line.chars().count();
    len > 5
        && len < 100
        && line.starts_with(|c: char| c.is_ascii_uppercase())
        && !is_field_label(line)
        && !(len >= 15 && is_shouted(line))
        && line.split_whitespace().count() <= 12
}

fn split_list(text: &str) -> Vec<String> {
    text.split(|c| matches!(c, ',' | '|' | ';'))
        .map(strip_bullet)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_projects(body: &[&str]) -> Vec<PortfolioProject> {
    let mut entries = Vec::new();
    let mut current: Option<PortfolioProject> = None;

    for &line in body {
        if let Some(name) = project_title(line) {
            entries.extend(current.take());
            current = Some(PortfolioProject {
                name,
                ..Default::default()
            });
            continue;
        }
        if current.is_none() {
            if looks_like_title(line) {
                current = Some(PortfolioProject {
                    name: line.to_string(),
                    ..Default::default()
                });
            }
            continue;
        }
        let Some(project) = current.as_mut() else {
            continue;
        };
        if let Some(caps) =
            regex!(r"(?i)^(?:tech\s+stack|tech(?:nologies)?|stack|tools|built with)[\s:]+(.+)$")
                .captures(line)
        {
            project.technologies = split_list(&caps[1]);
            continue;
        }
        if let Some(link) = find(line, regex!(r"https?://\S+")) {
            if project.link.is_empty() {
                project.link = link.to_string();
                continue;
            }
        }
        if line.chars().count() > 15
            && !is_field_label(line)
            && !is_shouted(line)
            && !regex!(r"^[\d.)]+\s*[A-Z]").is_match(line)
        {
            if !project.description.is_empty() {
                project.description.push(' ');
            }
            project.description.push_str(strip_bullet(line));
        }
    }
    entries.extend(current);

    entries.retain(|p| p.name.chars().count() > 3);
    entries.truncate(MAX_PROJECTS);
    entries
}

fn parse_list(body: &[&str], max_chars: usize) -> Vec<String> {
    body.iter()
        .map(|line| strip_marker(line))
        .filter(|item| {
            let len = item.chars().count();
            len > 5 && len < max_chars
        })
        .take(MAX_LIST_ITEMS)
        .map(str::to_string)
        .collect()
}

fn parse_languages(body: &[&str]) -> Vec<String> {
    body.iter()
        .flat_map(|line| line.split(|c| matches!(c, ',' | '|')))
        .map(strip_bullet)
        .filter(|lang| {
            let len = lang.chars().count();
            len > 2 && len < 30
        })
        .take(MAX_LIST_ITEMS)
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESUME: &str = "\
Asha Rao
Backend Software Engineer
asha.rao@Example.com | +91 9876543210 | Bengaluru, Karnataka
github.com/asharao | https://linkedin.com/in/asha-rao

SUMMARY
Backend engineer who builds reliable data pipelines and APIs for hiring platforms.

TECHNICAL SKILLS
Languages: Rust, Python, C++
Tools: Docker | Git | Rust

EXPERIENCE
Software Engineer at Acme Technologies
Jan 2022 - Present
- Built a resume ranking service that cut screening time by half.
- Owned the Postgres migration for 2M applicant records.

EDUCATION
B.Tech in Computer Science
National Institute of Technology
2018 - 2022, CGPA: 8.9

PROJECTS
1. Placement Tracker
Tech Stack: React, Node.js, MongoDB
https://github.com/asharao/tracker
Tracks offers, interviews and deadlines for each branch.

CERTIFICATIONS
- AWS Certified Developer Associate

LANGUAGES
English, Hindi, Kannada
";

    #[test]
    fn test_contact_details() {
        let data = extract_portfolio(RESUME);
        assert_eq!(data.name, "Asha Rao");
        assert_eq!(data.title, "Software Engineer");
        assert_eq!(data.email, "asha.rao@example.com");
        assert_eq!(data.phone, "+91 9876543210");
        assert_eq!(data.location, "Bengaluru, Karnataka");
        assert_eq!(data.github, "https://github.com/asharao");
        assert_eq!(data.linkedin, "https://linkedin.com/in/asha-rao");
    }

    #[test]
    fn test_summary_and_skills() {
        let data = extract_portfolio(RESUME);
        assert!(data.about.starts_with("Backend engineer who builds"));
        assert_eq!(data.skills, ["Rust", "Python", "C++", "Docker", "Git"]);
    }

    #[test]
    fn test_experience_entries() {
        let data = extract_portfolio(RESUME);
        assert_eq!(data.experience.len(), 1);
        let exp = &data.experience[0];
        assert_eq!(exp.position, "Software Engineer");
        assert_eq!(exp.company, "Acme Technologies");
        assert_eq!(exp.duration, "Jan 2022 - Present");
        assert!(exp.description.starts_with("Built a resume ranking service"));
        assert!(exp.description.contains("Postgres migration"));
    }

    #[test]
    fn test_education_entries() {
        let data = extract_portfolio(RESUME);
        assert_eq!(data.education.len(), 1);
        let edu = &data.education[0];
        assert_eq!(edu.degree, "B.Tech in Computer Science");
        assert_eq!(edu.institution, "National Institute of Technology");
        assert_eq!(edu.year, "2018 - 2022");
        assert_eq!(edu.cgpa, "8.9");
    }

    #[test]
    fn test_projects_and_lists() {
        let data = extract_portfolio(RESUME);
        assert_eq!(data.projects.len(), 1);
        let project = &data.projects[0];
        assert_eq!(project.name, "Placement Tracker");
        assert_eq!(project.technologies, ["React", "Node.js", "MongoDB"]);
        assert_eq!(project.link, "https://github.com/asharao/tracker");
        assert!(project.description.starts_with("Tracks offers"));

        assert_eq!(data.certifications, ["AWS Certified Developer Associate"]);
        assert_eq!(data.languages, ["English", "Hindi", "Kannada"]);
    }

    #[test]
    fn test_empty_text_yields_empty_portfolio() {
        assert_eq!(extract_portfolio(""), PortfolioData::default());
    }

    #[test]
    fn test_unknown_heading_ends_section() {
        let data = extract_portfolio("SKILLS\nRust, Go\nHOBBIES\nChess, Trekking\n");
        assert_eq!(data.skills, ["Rust", "Go"]);
    }
}
