use anyhow::Context;

use crate::bridge::{run_process, ScriptCall, LATEX_TIMEOUT};
use crate::errors::AppError;

const JOB_NAME: &str = "resume";

/// Compiles LaTeX source to PDF bytes in a scratch directory.
pub async fn compile_pdf(latex_path: &str, source: &str) -> Result<Vec<u8>, AppError> {
    let workdir = tempfile::tempdir().context("Failed to create LaTeX work directory")?;
    let tex_path = workdir.path().join(format!("{JOB_NAME}.tex"));
    tokio::fs::write(&tex_path, source)
        .await
        .context("Failed to write LaTeX source")?;

    let call = ScriptCall::new("LaTeX compilation", latex_path, LATEX_TIMEOUT)
        .arg("-interaction=nonstopmode")
        .arg("-halt-on-error")
        .arg(format!("{JOB_NAME}.tex"))
        .current_dir(workdir.path().to_path_buf());

    run_process(&call).await?;

    let pdf = tokio::fs::read(workdir.path().join(format!("{JOB_NAME}.pdf")))
        .await
        .context("LaTeX compilation produced no PDF")?;
    Ok(pdf)
}
