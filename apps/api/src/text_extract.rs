use anyhow::{anyhow, Context, Result};
use axum::extract::Multipart;
use bytes::Bytes;
use docx_rs::{DocumentChild, ParagraphChild, RunChild};

use crate::errors::AppError;

pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Pdf,
    Docx,
    Image,
}

impl UploadKind {
    /// Classifies by MIME type, falling back to the file extension.
    pub fn detect(content_type: Option<&str>, filename: Option<&str>) -> Option<Self> {
        let by_mime = content_type.and_then(|ct| match ct {
            "application/pdf" => Some(UploadKind::Pdf),
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            | "application/msword" => Some(UploadKind::Docx),
            "image/png" | "image/jpeg" | "image/jpg" | "image/webp" => Some(UploadKind::Image),
            _ => None,
        });
        by_mime.or_else(|| {
            let ext = filename?.rsplit_once('.')?.1.to_ascii_lowercase();
            match ext.as_str() {
                "pdf" => Some(UploadKind::Pdf),
                "docx" | "doc" => Some(UploadKind::Docx),
                "png" | "jpg" | "jpeg" | "webp" => Some(UploadKind::Image),
                _ => None,
            }
        })
    }

    pub fn extension(self) -> &'static str {
        match self {
            UploadKind::Pdf => "pdf",
            UploadKind::Docx => "docx",
            UploadKind::Image => "png",
        }
    }
}

#[derive(Debug)]
pub struct UploadedFile {
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl UploadedFile {
    pub fn kind(&self) -> Option<UploadKind> {
        UploadKind::detect(self.content_type.as_deref(), self.filename.as_deref())
    }
}

/// Reads a multipart body: the file in `file_field` plus any text fields.
pub async fn read_multipart(
    mut multipart: Multipart,
    file_field: &str,
) -> Result<(Option<UploadedFile>, Vec<(String, String)>), AppError> {
    let mut file = None;
    let mut fields = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == file_field {
            let filename = field.file_name().map(str::to_string);
            let content_type = field.content_type().map(str::to_string);
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(format!("Failed to read upload: {e}")))?;
            if bytes.len() > MAX_UPLOAD_BYTES {
                return Err(AppError::Validation(
                    "File too large. Maximum size is 10MB".to_string(),
                ));
            }
            file = Some(UploadedFile {
                filename,
                content_type,
                bytes,
            });
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| AppError::Validation(format!("Invalid field '{name}': {e}")))?;
            fields.push((name, value));
        }
    }

    Ok((file, fields))
}

/// Extracts plain text from a PDF or DOCX on the blocking pool.
/// Images have no text layer and yield an empty string.
pub async fn extract_text(kind: UploadKind, bytes: Bytes) -> Result<String> {
    tokio::task::spawn_blocking(move || match kind {
        UploadKind::Pdf => pdf_extract::extract_text_from_mem(&bytes)
            .map_err(|e| anyhow!("Failed to read PDF: {e}")),
        UploadKind::Docx => docx_text(&bytes),
        UploadKind::Image => Ok(String::new()),
    })
    .await
    .context("Text extraction task panicked")?
    .map(|text| normalize_whitespace(&text))
}

fn docx_text(bytes: &[u8]) -> Result<String> {
    let docx = docx_rs::read_docx(bytes).map_err(|e| anyhow!("Failed to read DOCX: {e}"))?;

    let mut lines = Vec::new();
    for child in &docx.document.children {
        if let DocumentChild::Paragraph(paragraph) = child {
            let mut line = String::new();
            for pchild in &paragraph.children {
                if let ParagraphChild::Run(run) = pchild {
                    for rchild in &run.children {
                        match rchild {
                            RunChild::Text(t) => line.push_str(&t.text),
                            RunChild::Tab(_) => line.push('\t'),
                            _ => {}
                        }
                    }
                }
            }
            lines.push(line);
        }
    }
    Ok(lines.join("\n"))
}

/// Trims each line and collapses runs of blank lines.
pub fn normalize_whitespace(text: &str) -> String {
    let mut out = Vec::new();
    let mut blank = false;
    for line in text.lines().map(str::trim_end) {
        if line.trim().is_empty() {
            if !blank && !out.is_empty() {
                out.push("");
            }
            blank = true;
        } else {
            out.push(line);
            blank = false;
        }
    }
    while out.last() == Some(&"") {
        out.pop();
    }
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::docx::{build_docx_tree, pack_docx};
    use crate::document::model::fixtures::sample_resume;
    use crate::document::ResumeDocument;

    #[test]
    fn test_detect_by_mime_then_extension() {
        assert_eq!(
            UploadKind::detect(Some("application/pdf"), None),
            Some(UploadKind::Pdf)
        );
        assert_eq!(
            UploadKind::detect(Some("application/octet-stream"), Some("CV.DOCX")),
            Some(UploadKind::Docx)
        );
        assert_eq!(
            UploadKind::detect(Some("image/jpeg"), Some("scan.jpg")),
            Some(UploadKind::Image)
        );
        assert_eq!(UploadKind::detect(Some("text/plain"), Some("cv.txt")), None);
    }

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(
            normalize_whitespace("Asha  \n\n\n\nSkills\n  \nRust\n\n"),
            "Asha\n\nSkills\n\nRust"
        );
    }

    #[tokio::test]
    async fn test_docx_text_round_trips_generated_resume() {
        let doc = ResumeDocument::from_resume(&sample_resume());
        let bytes = pack_docx(&build_docx_tree(&doc)).unwrap();
        let text = extract_text(UploadKind::Docx, Bytes::from(bytes)).await.unwrap();
        assert!(text.contains("Asha Rao"));
        assert!(text.contains("EDUCATION"));
    }

    #[tokio::test]
    async fn test_invalid_pdf_is_an_error() {
        let result = extract_text(UploadKind::Pdf, Bytes::from_static(b"not a pdf")).await;
        assert!(result.is_err());
    }
}
