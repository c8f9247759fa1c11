use std::io::Cursor;

use anyhow::{anyhow, Result};
use docx_rs::{
    AbstractNumbering, AlignmentType, Docx, IndentLevel, Level, LevelJc, LevelText, LineSpacing,
    NumberFormat, Numbering, NumberingId, Paragraph, Run, Start,
};

use crate::document::model::{ResumeDocument, Section};

const BULLET_NUMBERING_ID: usize = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParagraphStyle {
    Title,
    Heading,
    Body,
    Bullet,
}

impl ParagraphStyle {
    /// Font size in half-points.
    fn size(self) -> usize {
        match self {
            ParagraphStyle::Title => 36,
            ParagraphStyle::Heading => 26,
            ParagraphStyle::Body | ParagraphStyle::Bullet => 22,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DocxRun {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
}

impl DocxRun {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: false,
            italic: false,
        }
    }

    pub fn bold(text: impl Into<String>) -> Self {
        Self {
            bold: true,
            ..Self::plain(text)
        }
    }

    pub fn italic(text: impl Into<String>) -> Self {
        Self {
            italic: true,
            ..Self::plain(text)
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DocxParagraph {
    pub style: ParagraphStyle,
    pub align: Align,
    pub runs: Vec<DocxRun>,
    /// Twentieths of a point.
    pub spacing_before: u32,
    pub spacing_after: u32,
}

impl DocxParagraph {
    fn new(style: ParagraphStyle, runs: Vec<DocxRun>, spacing_after: u32) -> Self {
        Self {
            style,
            align: Align::Left,
            runs,
            spacing_before: 0,
            spacing_after,
        }
    }

    fn centered(mut self) -> Self {
        self.align = Align::Center;
        self
    }

    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }
}

/// Word document as an ordered paragraph list, independent of the
/// packaging library.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DocxTree {
    pub paragraphs: Vec<DocxParagraph>,
}

impl DocxTree {
    fn push(&mut self, paragraph: DocxParagraph) {
        self.paragraphs.push(paragraph);
    }

    fn bullet(&mut self, runs: Vec<DocxRun>) {
        self.push(DocxParagraph::new(ParagraphStyle::Bullet, runs, 50));
    }

    fn body(&mut self, runs: Vec<DocxRun>, spacing_after: u32) {
        self.push(DocxParagraph::new(ParagraphStyle::Body, runs, spacing_after));
    }
}

pub fn build_docx_tree(doc: &ResumeDocument) -> DocxTree {
    let mut tree = DocxTree::default();
    let header = &doc.header;

    tree.push(
        DocxParagraph::new(
            ParagraphStyle::Title,
            vec![DocxRun::bold(header.name.clone())],
            100,
        )
        .centered(),
    );
    if let Some(headline) = &header.headline {
        tree.push(
            DocxParagraph::new(ParagraphStyle::Body, vec![DocxRun::italic(headline.clone())], 100)
                .centered(),
        );
    }
    if !header.contact.is_empty() {
        tree.push(
            DocxParagraph::new(
                ParagraphStyle::Body,
                vec![DocxRun::plain(header.contact.join(" | "))],
                100,
            )
            .centered(),
        );
    }
    if !header.links.is_empty() {
        let social = header
            .links
            .iter()
            .map(|l| format!("{}: {}", l.label, l.url))
            .collect::<Vec<_>>()
            .join(" | ");
        tree.push(
            DocxParagraph::new(ParagraphStyle::Body, vec![DocxRun::plain(social)], 200).centered(),
        );
    }

    for section in &doc.sections {
        let mut heading = DocxParagraph::new(
            ParagraphStyle::Heading,
            vec![DocxRun::bold(section.title())],
            100,
        );
        heading.spacing_before = 200;
        tree.push(heading);
        push_section(&mut tree, section);
    }

    tree
}

fn push_section(tree: &mut DocxTree, section: &Section) {
    match section {
        Section::About(text) => tree.body(vec![DocxRun::plain(text.clone())], 150),
        Section::Education(items) => {
            for edu in items {
                let mut first = vec![DocxRun::bold(edu.degree.clone())];
                if !edu.institution.is_empty() {
                    first.push(DocxRun::plain(format!(" | {}", edu.institution)));
                }
                tree.body(first, 50);

                let mut second = vec![DocxRun::plain(edu.period.join(" - "))];
                if let Some(grade) = &edu.grade {
                    second.push(DocxRun::bold(format!(" | CGPA: {grade}")));
                }
                tree.body(second, 150);
            }
        }
        Section::Experience(items) => {
            for exp in items {
                let mut first = vec![DocxRun::bold(exp.position.clone())];
                if !exp.company.is_empty() {
                    first.push(DocxRun::plain(format!(" | {}", exp.company)));
                }
                if !exp.location.is_empty() {
                    first.push(DocxRun::plain(format!(" | {}", exp.location)));
                }
                tree.body(first, 50);
                if !exp.period.is_empty() {
                    tree.body(vec![DocxRun::plain(exp.period.join(" - "))], 100);
                }
                if let Some(summary) = &exp.summary {
                    tree.body(vec![DocxRun::plain(summary.clone())], 100);
                }
                for highlight in &exp.highlights {
                    tree.bullet(vec![DocxRun::plain(highlight.clone())]);
                }
            }
        }
        Section::Projects(items) => {
            for proj in items {
                let mut first = vec![DocxRun::bold(proj.title.clone())];
                if let Some(link) = &proj.link {
                    first.push(DocxRun::italic(format!(" | {link}")));
                }
                tree.body(first, 50);
                if !proj.description.is_empty() {
                    tree.body(vec![DocxRun::plain(proj.description.clone())], 50);
                }
                if !proj.technologies.is_empty() {
                    tree.body(
                        vec![
                            DocxRun::italic("Technologies: "),
                            DocxRun::plain(proj.technologies.join(", ")),
                        ],
                        150,
                    );
                }
            }
        }
        Section::Skills(groups) => {
            for group in groups {
                tree.bullet(vec![
                    DocxRun::bold(format!("{}: ", group.category)),
                    DocxRun::plain(group.items.join(", ")),
                ]);
            }
        }
        Section::Certifications(items) => {
            for cert in items {
                let rest: Vec<&str> = [cert.issuer.as_str(), cert.date.as_str()]
                    .into_iter()
                    .filter(|s| !s.is_empty())
                    .collect();
                let mut runs = vec![DocxRun::bold(cert.name.clone())];
                if !rest.is_empty() {
                    runs.push(DocxRun::plain(format!(" | {}", rest.join(" | "))));
                }
                tree.bullet(runs);
            }
        }
        Section::Achievements(items) | Section::Languages(items) => {
            for item in items {
                tree.bullet(vec![DocxRun::plain(item.clone())]);
            }
        }
    }
}

/// Packs the tree into `.docx` bytes.
pub fn pack_docx(tree: &DocxTree) -> Result<Vec<u8>> {
    let mut docx = Docx::new()
        .add_abstract_numbering(AbstractNumbering::new(BULLET_NUMBERING_ID).add_level(Level::new(
            0,
            Start::new(1),
            NumberFormat::new("bullet"),
            LevelText::new("•"),
            LevelJc::new("left"),
        )))
        .add_numbering(Numbering::new(BULLET_NUMBERING_ID, BULLET_NUMBERING_ID));

    for para in &tree.paragraphs {
        docx = docx.add_paragraph(to_paragraph(para));
    }

    let mut cursor = Cursor::new(Vec::new());
    docx.build()
        .pack(&mut cursor)
        .map_err(|e| anyhow!("Failed to pack DOCX: {e}"))?;
    Ok(cursor.into_inner())
}

fn to_paragraph(para: &DocxParagraph) -> Paragraph {
    let mut paragraph = Paragraph::new().line_spacing(
        LineSpacing::new()
            .before(para.spacing_before)
            .after(para.spacing_after),
    );

    for run in &para.runs {
        let mut r = Run::new().add_text(&run.text).size(para.style.size());
        if run.bold {
            r = r.bold();
        }
        if run.italic {
            r = r.italic();
        }
        paragraph = paragraph.add_run(r);
    }

    if para.align == Align::Center {
        paragraph = paragraph.align(AlignmentType::Center);
    }
    if para.style == ParagraphStyle::Bullet {
        paragraph = paragraph.numbering(NumberingId::new(BULLET_NUMBERING_ID), IndentLevel::new(0));
    }
    paragraph
}
