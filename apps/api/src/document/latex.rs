use crate::document::escape::{escape_latex, escape_latex_url};
use crate::document::model::{ResumeDocument, Section};

const PREAMBLE: &str = r"\documentclass[a4paper,11pt]{article}
\usepackage[utf8]{inputenc}
\usepackage{geometry}
\usepackage{enumitem}
\usepackage{hyperref}
\usepackage{titlesec}
\usepackage{xcolor}

\geometry{left=0.75in,right=0.75in,top=0.75in,bottom=0.75in}
\setlist{nosep, leftmargin=*}
\pagestyle{empty}

\hypersetup{
    colorlinks=true,
    linkcolor=blue,
    urlcolor=blue,
    pdfborder={0 0 0}
}

\titleformat{\section}{\large\bfseries\scshape}{}{0em}{}[\titlerule]
\titlespacing{\section}{0pt}{12pt}{6pt}
";

/// Renders a complete, compilable LaTeX source for the document.
/// Every user string passes through `escape_latex` exactly once.
pub fn render_latex(doc: &ResumeDocument) -> String {
    let mut tex = String::from(PREAMBLE);
    tex.push_str("\n\\begin{document}\n\n");

    render_header(&mut tex, doc);

    for section in &doc.sections {
        tex.push_str(&format!("\n\\section*{{{}}}\n", section.title()));
        render_section(&mut tex, section);
    }

    tex.push_str("\n\\end{document}\n");
    tex
}

fn render_header(tex: &mut String, doc: &ResumeDocument) {
    let header = &doc.header;
    tex.push_str("\\begin{center}\n");
    tex.push_str(&format!(
        "{{\\LARGE\\bfseries {}}}\\\\[3pt]\n",
        escape_latex(&header.name)
    ));
    if let Some(headline) = &header.headline {
        tex.push_str(&format!("{}\\\\[2pt]\n", escape_latex(headline)));
    }

    let contact = header
        .contact
        .iter()
        .map(|c| escape_latex(c))
        .collect::<Vec<_>>()
        .join(" $|$ ");
    let links = header
        .links
        .iter()
        .map(|l| format!("\\href{{{}}}{{{}}}", escape_latex_url(&l.url), l.label))
        .collect::<Vec<_>>()
        .join(" $|$ ");

    match (contact.is_empty(), links.is_empty()) {
        (false, false) => tex.push_str(&format!("{contact}\\\\[2pt]\n{links}\n")),
        (false, true) => tex.push_str(&format!("{contact}\n")),
        (true, false) => tex.push_str(&format!("{links}\n")),
        (true, true) => {}
    }
    tex.push_str("\\end{center}\n\n\\vspace{8pt}\n");
}

fn itemize(tex: &mut String, items: impl IntoIterator<Item = String>) {
    tex.push_str("\\begin{itemize}[topsep=2pt]\n");
    for item in items {
        tex.push_str(&format!("  \\item {item}\n"));
    }
    tex.push_str("\\end{itemize}\n");
}

fn render_section(tex: &mut String, section: &Section) {
    match section {
        Section::About(text) => {
            tex.push_str(&format!("{}\n", escape_latex(text)));
        }
        Section::Education(items) => {
            for edu in items {
                tex.push_str(&format!("\\textbf{{{}}}", escape_latex(&edu.degree)));
                if !edu.period.is_empty() {
                    tex.push_str(&format!(
                        " \\hfill {}",
                        escape_latex(&edu.period.join(" -- "))
                    ));
                }
                tex.push_str("\\\\\n");
                tex.push_str(&escape_latex(&edu.institution));
                if let Some(grade) = &edu.grade {
                    tex.push_str(&format!(" \\hfill \\textit{{CGPA: {}}}", escape_latex(grade)));
                }
                tex.push_str("\\\\[4pt]\n");
            }
        }
        Section::Experience(items) => {
            for exp in items {
                tex.push_str(&format!("\\textbf{{{}}}", escape_latex(&exp.position)));
                if !exp.period.is_empty() {
                    tex.push_str(&format!(
                        " \\hfill {}",
                        escape_latex(&exp.period.join(" -- "))
                    ));
                }
                tex.push_str("\\\\\n");

                let mut org = format!("\\textit{{{}}}", escape_latex(&exp.company));
                if !exp.location.is_empty() {
                    org.push_str(&format!(" \\hfill {}", escape_latex(&exp.location)));
                }
                tex.push_str(&format!("{org}\\\\[2pt]\n"));

                if let Some(summary) = &exp.summary {
                    tex.push_str(&format!("{}\\\\[2pt]\n", escape_latex(summary)));
                }
                if !exp.highlights.is_empty() {
                    itemize(tex, exp.highlights.iter().map(|h| escape_latex(h)));
                }
                tex.push_str("\\vspace{4pt}\n");
            }
        }
        Section::Projects(items) => {
            for proj in items {
                tex.push_str(&format!("\\textbf{{{}}}", escape_latex(&proj.title)));
                if let Some(link) = &proj.link {
                    tex.push_str(&format!(" -- \\href{{{}}}{{[Link]}}", escape_latex_url(link)));
                }
                tex.push_str("\\\\\n");
                if !proj.description.is_empty() {
                    tex.push_str(&format!("{}\\\\\n", escape_latex(&proj.description)));
                }
                if !proj.technologies.is_empty() {
                    tex.push_str(&format!(
                        "\\textit{{Technologies: {}}}\\\\\n",
                        escape_latex(&proj.technologies.join(", "))
                    ));
                }
                tex.push_str("\\vspace{4pt}\n");
            }
        }
        Section::Skills(groups) => itemize(
            tex,
            groups.iter().map(|g| {
                format!(
                    "\\textbf{{{}:}} {}",
                    escape_latex(&g.category),
                    escape_latex(&g.items.join(", "))
                )
            }),
        ),
        Section::Certifications(items) => itemize(
            tex,
            items.iter().map(|c| {
                let mut line = format!("\\textbf{{{}}}", escape_latex(&c.name));
                if !c.issuer.is_empty() {
                    line.push_str(&format!(" -- {}", escape_latex(&c.issuer)));
                }
                if !c.date.is_empty() {
                    line.push_str(&format!(" \\hfill {}", escape_latex(&c.date)));
                }
                line
            }),
        ),
        Section::Achievements(items) | Section::Languages(items) => {
            itemize(tex, items.iter().map(|a| escape_latex(a)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::model::fixtures::sample_resume;

    fn render(data: &crate::resume::data::ResumeData) -> String {
        render_latex(&ResumeDocument::from_resume(data))
    }

    #[test]
    fn test_latex_contains_name_and_sections() {
        let tex = render(&sample_resume());
        assert!(tex.starts_with("\\documentclass[a4paper,11pt]{article}"));
        assert!(tex.contains("{\\LARGE\\bfseries Asha Rao}"));
        for title in [
            "EDUCATION",
            "EXPERIENCE",
            "PROJECTS",
            "TECHNICAL SKILLS",
            "CERTIFICATIONS",
            "ACHIEVEMENTS",
        ] {
            assert!(tex.contains(&format!("\\section*{{{title}}}")), "missing {title}");
        }
        assert!(tex.trim_end().ends_with("\\end{document}"));
    }

    #[test]
    fn test_latex_omits_empty_experience() {
        let mut data = sample_resume();
        data.experience.clear();
        let tex = render(&data);
        assert!(tex.contains("\\section*{EDUCATION}"));
        assert!(!tex.contains("EXPERIENCE"));
    }

    #[test]
    fn test_latex_escapes_user_text() {
        let tex = render(&sample_resume());
        assert!(tex.contains("\\textit{Acme \\& Co}"));
        assert!(tex.contains("Cut p99 latency by 40\\%"));
        assert!(tex.contains("Tracks \\#offers per\\_branch"));
        assert!(tex.contains("\\textbf{Languages:} Rust, C++"));
    }

    #[test]
    fn test_latex_header_contact_and_links() {
        let tex = render(&sample_resume());
        assert!(tex.contains("asha@example.com $|$ +91 98765 43210 $|$ Pune\\\\[2pt]"));
        assert!(tex.contains(
            "\\href{https://linkedin.com/in/asha}{LinkedIn} $|$ \\href{https://github.com/asha}{GitHub}"
        ));
    }

    #[test]
    fn test_latex_education_line() {
        let tex = render(&sample_resume());
        assert!(tex.contains("\\textbf{B.Tech Computer Science} \\hfill 2019 -- 2023\\\\"));
        assert!(tex.contains("NIT Trichy \\hfill \\textit{CGPA: 8.9}\\\\[4pt]"));
    }
}
