use crate::document::escape::{escape_html, safe_image_url, safe_link_url};
use crate::document::model::{ResumeDocument, Section};
use crate::document::themes::{theme_for, Theme};
use crate::portfolio::data::PortfolioData;

const BASE_CSS: &str = r#"* { margin: 0; padding: 0; box-sizing: border-box; }
body { font-family: 'Segoe UI', system-ui, -apple-system, sans-serif; line-height: 1.6; color: var(--text); background: var(--bg); }
.container { max-width: 1100px; margin: 0 auto; padding: 0 24px; }
a { color: inherit; text-decoration: none; }
a:hover { opacity: 0.85; }
.header { background: var(--primary-gradient); color: #fff; padding: 80px 24px 60px; text-align: center; }
.avatar { width: 120px; height: 120px; border-radius: 50%; background: rgba(255,255,255,0.2); display: flex; align-items: center; justify-content: center; font-size: 48px; font-weight: 700; margin: 0 auto 20px; border: 4px solid rgba(255,255,255,0.3); overflow: hidden; }
.avatar img { width: 100%; height: 100%; object-fit: cover; }
.header h1 { font-size: 2.8em; font-weight: 800; margin-bottom: 8px; }
.header .subtitle { font-size: 1.3em; opacity: 0.9; margin-bottom: 16px; }
.contact-row { display: flex; flex-wrap: wrap; justify-content: center; gap: 20px; font-size: 0.95em; opacity: 0.9; }
.social-links { display: flex; justify-content: center; gap: 12px; margin-top: 20px; }
.social-link { display: inline-block; padding: 8px 20px; border: 2px solid rgba(255,255,255,0.4); border-radius: 25px; font-weight: 600; font-size: 0.9em; }
.social-link:hover { background: rgba(255,255,255,0.2); border-color: #fff; }
.section { padding: 60px 0; }
.section:nth-child(even) { background: var(--section-alt); }
.section-title { font-size: 2em; font-weight: 700; color: var(--accent); margin-bottom: 30px; position: relative; padding-bottom: 12px; }
.section-title::after { content: ''; position: absolute; bottom: 0; left: 0; width: 60px; height: 4px; background: var(--accent); border-radius: 2px; }
.about-text { font-size: 1.15em; line-height: 1.9; color: var(--text-secondary); max-width: 800px; }
.skill-group { margin-bottom: 16px; }
.skill-group h3 { font-size: 1em; color: var(--text-muted); margin-bottom: 8px; }
.skills-grid { display: flex; flex-wrap: wrap; gap: 10px; }
.skill { padding: 8px 20px; border-radius: 25px; font-weight: 600; font-size: 0.9em; background: var(--skill-bg); color: var(--skill-text); }
.exp-card { border-left: 4px solid var(--accent); padding: 20px 24px; margin-bottom: 24px; background: var(--card-bg); border-radius: 0 12px 12px 0; }
.exp-card h3 { font-size: 1.3em; color: var(--text); margin-bottom: 4px; }
.exp-card .company { color: var(--accent); font-weight: 600; font-size: 1.05em; }
.exp-card .duration { color: var(--text-muted); font-size: 0.9em; margin-bottom: 8px; }
.exp-card .desc, .exp-card li { color: var(--text-secondary); }
.exp-card ul { margin-left: 20px; }
.projects-grid { display: grid; grid-template-columns: repeat(auto-fill, minmax(320px, 1fr)); gap: 24px; }
.project-card { background: var(--card-bg); border-radius: 16px; padding: 28px; box-shadow: 0 4px 20px rgba(0,0,0,0.06); }
.project-card h3 { font-size: 1.2em; margin-bottom: 10px; color: var(--text); }
.project-card p { color: var(--text-secondary); margin-bottom: 14px; font-size: 0.95em; }
.project-card .tech-tags { display: flex; flex-wrap: wrap; gap: 6px; margin-bottom: 12px; }
.project-card .tech-tag { padding: 4px 12px; border-radius: 6px; font-size: 0.8em; font-weight: 600; background: var(--tag-bg); color: var(--tag-text); }
.project-card .project-link { color: var(--accent); font-weight: 600; font-size: 0.9em; }
.edu-card { border-left: 4px solid var(--accent-secondary); padding: 16px 24px; margin-bottom: 20px; background: var(--card-bg); border-radius: 0 12px 12px 0; }
.edu-card h3 { font-size: 1.15em; color: var(--text); }
.edu-card .institution { color: var(--accent); font-weight: 600; }
.edu-card .year { color: var(--text-muted); font-size: 0.9em; }
.plain-list { list-style: none; }
.plain-list li { padding: 12px 0; border-bottom: 1px solid var(--border); font-size: 1.05em; color: var(--text-secondary); }
.footer { text-align: center; padding: 40px 24px; color: var(--text-muted); font-size: 0.9em; border-top: 1px solid var(--border); }
@media (max-width: 768px) {
  .header { padding: 50px 16px 40px; }
  .header h1 { font-size: 2em; }
  .section { padding: 40px 0; }
  .projects-grid { grid-template-columns: 1fr; }
  .contact-row { flex-direction: column; align-items: center; gap: 8px; }
}"#;

/// Renders a portfolio as a standalone themed page.
pub fn render_portfolio_html(data: &PortfolioData, theme_key: &str, year: i32) -> String {
    render_html(&ResumeDocument::from_portfolio(data), theme_for(theme_key), year)
}

/// Renders any document as a self-contained HTML page with inlined CSS.
pub fn render_html(doc: &ResumeDocument, theme: &Theme, year: i32) -> String {
    let name = if doc.header.name.is_empty() {
        "Portfolio"
    } else {
        doc.header.name.as_str()
    };
    let name = escape_html(name);

    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"UTF-8\">\n");
    html.push_str(
        "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n",
    );
    html.push_str(&format!("<title>{name} - Portfolio</title>\n"));
    html.push_str(&format!(
        "<style>\n:root {{\n  {}\n}}\n{BASE_CSS}\n</style>\n</head>\n<body>\n",
        theme.css_vars
    ));

    render_header(&mut html, doc, &name);
    for section in &doc.sections {
        html.push_str(&format!(
            "<section class=\"section\" id=\"{}\"><div class=\"container\">\n  <h2 class=\"section-title\">{}</h2>\n",
            section.slug(),
            display_title(section)
        ));
        render_section(&mut html, section);
        html.push_str("</div></section>\n");
    }

    html.push_str(&format!(
        "<footer class=\"footer\">\n  <p>&copy; {year} {name}. All rights reserved.</p>\n  <p style=\"margin-top:8px;opacity:0.7;\">Built with Placify Portfolio Generator</p>\n</footer>\n"
    ));
    html.push_str("</body>\n</html>\n");
    html
}

fn display_title(section: &Section) -> &'static str {
    match section {
        Section::About(_) => "About Me",
        Section::Education(_) => "Education",
        Section::Experience(_) => "Experience",
        Section::Projects(_) => "Projects",
        Section::Skills(_) => "Skills",
        Section::Certifications(_) => "Certifications",
        Section::Achievements(_) => "Achievements",
        Section::Languages(_) => "Languages",
    }
}

fn render_header(html: &mut String, doc: &ResumeDocument, escaped_name: &str) {
    let header = &doc.header;
    let initial = header
        .name
        .chars()
        .next()
        .map(|c| c.to_uppercase().to_string())
        .unwrap_or_else(|| "P".to_string());

    html.push_str("<header class=\"header\">\n  <div class=\"container\">\n");
    match header.photo.as_deref().and_then(safe_image_url) {
        Some(photo) => html.push_str(&format!(
            "    <div class=\"avatar\"><img src=\"{}\" alt=\"{escaped_name}\"></div>\n",
            escape_html(photo)
        )),
        None => html.push_str(&format!(
            "    <div class=\"avatar\">{}</div>\n",
            escape_html(&initial)
        )),
    }
    html.push_str(&format!("    <h1>{escaped_name}</h1>\n"));
    if let Some(headline) = &header.headline {
        html.push_str(&format!(
            "    <p class=\"subtitle\">{}</p>\n",
            escape_html(headline)
        ));
    }

    html.push_str("    <div class=\"contact-row\">");
    for item in &header.contact {
        html.push_str(&format!("<span>{}</span>", escape_html(item)));
    }
    html.push_str("</div>\n");

    html.push_str("    <div class=\"social-links\">");
    for link in &header.links {
        let Some(url) = safe_link_url(&link.url) else {
            continue;
        };
        html.push_str(&format!(
            "<a href=\"{}\" target=\"_blank\" rel=\"noopener\" class=\"social-link\">{}</a>",
            escape_html(url),
            link.label
        ));
    }
    html.push_str("</div>\n  </div>\n</header>\n");
}

fn skill_chips(items: &[String]) -> String {
    items
        .iter()
        .map(|s| format!("<span class=\"skill\">{}</span>", escape_html(s)))
        .collect()
}

fn plain_list(html: &mut String, items: impl IntoIterator<Item = String>) {
    html.push_str("  <ul class=\"plain-list\">");
    for item in items {
        html.push_str(&format!("<li>{item}</li>"));
    }
    html.push_str("</ul>\n");
}

fn render_section(html: &mut String, section: &Section) {
    match section {
        Section::About(text) => {
            html.push_str(&format!(
                "  <p class=\"about-text\">{}</p>\n",
                escape_html(text)
            ));
        }
        Section::Skills(groups) => {
            // A single anonymous group renders as a flat chip list.
            if let [only] = groups.as_slice() {
                if only.category == "Skills" {
                    html.push_str(&format!(
                        "  <div class=\"skills-grid\">{}</div>\n",
                        skill_chips(&only.items)
                    ));
                    return;
                }
            }
            for group in groups {
                html.push_str(&format!(
                    "  <div class=\"skill-group\"><h3>{}</h3><div class=\"skills-grid\">{}</div></div>\n",
                    escape_html(&group.category),
                    skill_chips(&group.items)
                ));
            }
        }
        Section::Experience(items) => {
            for exp in items {
                html.push_str("  <div class=\"exp-card\">\n");
                html.push_str(&format!("    <h3>{}</h3>\n", escape_html(&exp.position)));
                let mut company = exp.company.clone();
                if !exp.location.is_empty() {
                    company = format!("{company}, {}", exp.location);
                }
                html.push_str(&format!(
                    "    <p class=\"company\">{}</p>\n",
                    escape_html(&company)
                ));
                if !exp.period.is_empty() {
                    html.push_str(&format!(
                        "    <p class=\"duration\">{}</p>\n",
                        escape_html(&exp.period.join(" – "))
                    ));
                }
                if let Some(summary) = &exp.summary {
                    html.push_str(&format!("    <p class=\"desc\">{}</p>\n", escape_html(summary)));
                }
                if !exp.highlights.is_empty() {
                    html.push_str("    <ul>");
                    for h in &exp.highlights {
                        html.push_str(&format!("<li>{}</li>", escape_html(h)));
                    }
                    html.push_str("</ul>\n");
                }
                html.push_str("  </div>\n");
            }
        }
        Section::Projects(items) => {
            html.push_str("  <div class=\"projects-grid\">\n");
            for proj in items {
                html.push_str("  <div class=\"project-card\">\n");
                html.push_str(&format!("    <h3>{}</h3>\n", escape_html(&proj.title)));
                if !proj.description.is_empty() {
                    html.push_str(&format!("    <p>{}</p>\n", escape_html(&proj.description)));
                }
                if !proj.technologies.is_empty() {
                    let tags: String = proj
                        .technologies
                        .iter()
                        .map(|t| format!("<span class=\"tech-tag\">{}</span>", escape_html(t)))
                        .collect();
                    html.push_str(&format!("    <div class=\"tech-tags\">{tags}</div>\n"));
                }
                if let Some(link) = proj.link.as_deref().and_then(safe_link_url) {
                    html.push_str(&format!(
                        "    <a href=\"{}\" target=\"_blank\" rel=\"noopener\" class=\"project-link\">View Project &rarr;</a>\n",
                        escape_html(link)
                    ));
                }
                html.push_str("  </div>\n");
            }
            html.push_str("  </div>\n");
        }
        Section::Education(items) => {
            for edu in items {
                html.push_str("  <div class=\"edu-card\">\n");
                html.push_str(&format!("    <h3>{}</h3>\n", escape_html(&edu.degree)));
                if !edu.institution.is_empty() {
                    html.push_str(&format!(
                        "    <p class=\"institution\">{}</p>\n",
                        escape_html(&edu.institution)
                    ));
                }
                if !edu.period.is_empty() {
                    html.push_str(&format!(
                        "    <p class=\"year\">{}</p>\n",
                        escape_html(&edu.period.join(" – "))
                    ));
                }
                if let Some(grade) = &edu.grade {
                    html.push_str(&format!(
                        "    <p class=\"year\">CGPA: {}</p>\n",
                        escape_html(grade)
                    ));
                }
                html.push_str("  </div>\n");
            }
        }
        Section::Certifications(items) => plain_list(
            html,
            items.iter().map(|c| {
                let mut line = escape_html(&c.name);
                for extra in [&c.issuer, &c.date] {
                    if !extra.is_empty() {
                        line.push_str(&format!(" &middot; {}", escape_html(extra)));
                    }
                }
                line
            }),
        ),
        Section::Achievements(items) | Section::Languages(items) => {
            plain_list(html, items.iter().map(|s| escape_html(s)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::model::fixtures::sample_resume;
    use crate::document::themes::THEMES;
    use crate::portfolio::data::PortfolioProject;

    fn portfolio() -> PortfolioData {
        PortfolioData {
            name: "asha <Rao>".to_string(),
            title: "Backend Engineer".to_string(),
            email: "asha@example.com".to_string(),
            github: "https://github.com/asha".to_string(),
            about: "Likes \"fast\" & safe code".to_string(),
            skills: vec!["Rust".to_string(), "SQL".to_string()],
            projects: vec![PortfolioProject {
                name: "Tracker".to_string(),
                technologies: vec!["Axum".to_string()],
                link: "https://example.com/?a=1&b=2".to_string(),
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_portfolio_html_escapes_user_text() {
        let html = render_portfolio_html(&portfolio(), "template1", 2026);
        assert!(html.contains("<h1>asha &lt;Rao&gt;</h1>"));
        assert!(html.contains("Likes &quot;fast&quot; &amp; safe code"));
        assert!(html.contains("href=\"https://example.com/?a=1&amp;b=2\""));
        assert!(!html.contains("<Rao>"));
    }

    #[test]
    fn test_portfolio_html_drops_script_urls() {
        let mut data = portfolio();
        data.github = "javascript:alert(document.domain)".to_string();
        data.linkedin = "JaVaScRiPt:alert(1)".to_string();
        data.profile_photo = "javascript:alert(2)".to_string();
        data.projects[0].link = " javascript:alert(3)".to_string();
        let html = render_portfolio_html(&data, "template1", 2026);

        assert!(!html.to_ascii_lowercase().contains("javascript:"));
        assert!(!html.contains("class=\"social-link\""));
        assert!(!html.contains("class=\"project-link\""));
        assert!(html.contains("<div class=\"avatar\">A</div>"));
    }

    #[test]
    fn test_portfolio_html_header_and_footer() {
        let html = render_portfolio_html(&portfolio(), "template1", 2026);
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<div class=\"avatar\">A</div>"));
        assert!(html.contains("<p class=\"subtitle\">Backend Engineer</p>"));
        assert!(html.contains("&copy; 2026 asha &lt;Rao&gt;. All rights reserved."));
        assert!(html.contains("Built with Placify Portfolio Generator"));
    }

    #[test]
    fn test_portfolio_html_only_non_empty_sections() {
        let html = render_portfolio_html(&portfolio(), "template1", 2026);
        assert!(html.contains("id=\"about\""));
        assert!(html.contains("id=\"skills\""));
        assert!(html.contains("id=\"projects\""));
        assert!(!html.contains("id=\"experience\""));
        assert!(!html.contains("id=\"education\""));
        assert!(html.contains("<span class=\"skill\">Rust</span>"));
    }

    #[test]
    fn test_unknown_theme_uses_default_css() {
        let html = render_portfolio_html(&portfolio(), "no-such-theme", 2026);
        assert!(html.contains(THEMES[0].css_vars));
    }

    #[test]
    fn test_dark_theme_css_inlined() {
        let html = render_portfolio_html(&portfolio(), "template5", 2026);
        assert!(html.contains("--bg: #0f172a"));
    }

    #[test]
    fn test_resume_preview_groups_skills() {
        let doc = ResumeDocument::from_resume(&sample_resume());
        let html = render_html(&doc, theme_for("template1"), 2026);
        assert!(html.contains("<h3>Languages</h3>"));
        assert!(html.contains("<p class=\"year\">2019 – 2023</p>"));
        assert!(html.contains("Acme &amp; Co, Remote"));
    }
}
