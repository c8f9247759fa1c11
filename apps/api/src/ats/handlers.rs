use std::time::Duration;

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde_json::{json, Value};
use tracing::info;

use crate::auth::AuthUser;
use crate::bridge::{run_json_script, run_process, truncate_bytes, ScriptCall, ATS_TIMEOUT};
use crate::errors::AppError;
use crate::state::AppState;
use crate::text_extract::{extract_text, read_multipart, UploadKind};

const SCORER_SCRIPT: &str = "ats_scorer.py";
/// Bytes per argument; Linux rejects a single argv string over 128 KiB.
const MAX_ARG_BYTES: usize = 100_000;
const VERSION_CHECK_TIMEOUT: Duration = Duration::from_secs(10);

/// Pulls the job description out of the form fields; absent means empty.
fn job_description(fields: &[(String, String)]) -> &str {
    fields
        .iter()
        .find(|(name, _)| name == "jobDescription")
        .map(|(_, value)| value.trim())
        .unwrap_or_default()
}

/// POST /api/ats/analyze
pub async fn handle_analyze(
    State(state): State<AppState>,
    _user: AuthUser,
    multipart: Multipart,
) -> Result<Json<Value>, AppError> {
    let (file, fields) = read_multipart(multipart, "resume").await?;
    let file = file.ok_or_else(|| {
        AppError::Validation("Please upload a resume file (PDF or DOCX)".to_string())
    })?;
    let kind = file
        .kind()
        .filter(|k| matches!(k, UploadKind::Pdf | UploadKind::Docx))
        .ok_or_else(|| {
            AppError::Validation("Unsupported file type. Please upload PDF or DOCX files.".to_string())
        })?;

    let resume_text = extract_text(kind, file.bytes)
        .await
        .map_err(|e| AppError::Validation(format!("Could not read the uploaded file: {e}")))?;
    if resume_text.trim().is_empty() {
        return Err(AppError::Validation(
            "Could not extract text from the uploaded file".to_string(),
        ));
    }
    let jd = job_description(&fields);
    info!(
        "Running ATS analysis: resume {} chars, job description {} chars",
        resume_text.len(),
        jd.len()
    );

    let call = ScriptCall::python(
        "ATS analysis",
        &state.config.python_path,
        state.config.script(SCORER_SCRIPT),
        ATS_TIMEOUT,
    )
    .arg(truncate_bytes(&resume_text, MAX_ARG_BYTES))
    .arg(truncate_bytes(jd, MAX_ARG_BYTES));
    let result = run_json_script(&call).await?;

    if let Some(score) = result.get("overallScore") {
        info!("ATS analysis completed. Score: {score}");
    }

    Ok(Json(json!({
        "success": true,
        "message": "Resume analyzed successfully",
        "data": result,
    })))
}

/// GET /api/ats/health
pub async fn handle_health(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let script = state.config.script(SCORER_SCRIPT);
    if !tokio::fs::try_exists(&script).await.unwrap_or(false) {
        return Err(AppError::ServiceUnavailable(
            "ATS service is not available: scorer script not found".to_string(),
        ));
    }

    let call = ScriptCall::new("Python version check", &state.config.python_path, VERSION_CHECK_TIMEOUT)
        .arg("--version");
    let output = run_process(&call)
        .await
        .map_err(|e| AppError::ServiceUnavailable(format!("ATS service is not available: {e}")))?;
    // Older interpreters print the version on stderr
    let version = if output.stdout.trim().is_empty() {
        output.stderr.trim()
    } else {
        output.stdout.trim()
    };

    Ok(Json(json!({
        "success": true,
        "message": "ATS service is available",
        "pythonVersion": version,
        "scriptPath": script.display().to_string(),
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_description_is_optional() {
        assert_eq!(job_description(&[]), "");
        let fields = vec![
            ("other".to_string(), "x".to_string()),
            ("jobDescription".to_string(), "  Rust backend role \n".to_string()),
        ];
        assert_eq!(job_description(&fields), "Rust backend role");
    }
}
