use std::io::ErrorKind;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;
use uuid::Uuid;

/// Generated resume files on local disk, addressed by bare filename.
#[derive(Debug, Clone)]
pub struct GeneratedFiles {
    dir: PathBuf,
}

impl GeneratedFiles {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub async fn ensure_dir(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("Failed to create {}", self.dir.display()))?;
        info!("Generated files directory: {}", self.dir.display());
        Ok(())
    }

    pub async fn write(&self, filename: &str, bytes: &[u8]) -> Result<()> {
        let path = self.path_for(filename)?;
        tokio::fs::write(&path, bytes)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))
    }

    /// `Ok(None)` when the file does not exist.
    pub async fn read(&self, filename: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path_for(filename)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("Failed to read {}", path.display())),
        }
    }

    /// Returns whether a file was actually removed.
    pub async fn remove(&self, filename: &str) -> Result<bool> {
        let path = self.path_for(filename)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e).with_context(|| format!("Failed to remove {}", path.display())),
        }
    }

    fn path_for(&self, filename: &str) -> Result<PathBuf> {
        anyhow::ensure!(is_safe_filename(filename), "Unsafe filename '{filename}'");
        Ok(self.dir.join(filename))
    }
}

/// Rejects anything that could leave the generated directory.
pub fn is_safe_filename(name: &str) -> bool {
    !name.is_empty()
        && !name.contains("..")
        && !name.contains('/')
        && !name.contains('\\')
        && name != "."
}

/// Restricts a filename to `[A-Za-z0-9._-]`.
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

pub fn resume_filename(user_id: Uuid, millis: i64, extension: &str) -> String {
    sanitize_filename(&format!("resume_{user_id}_{millis}.{extension}"))
}

pub fn content_type_for(filename: &str) -> &'static str {
    match filename.rsplit('.').next() {
        Some("pdf") => "application/pdf",
        Some("docx") => {
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        }
        Some("tex") => "application/x-tex",
        _ => "application/octet-stream",
    }
}
