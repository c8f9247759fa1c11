use anyhow::Context;
use axum::{
    extract::{Multipart, Path, State},
    response::Html,
    Json,
};
use chrono::{Datelike, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::bridge::{run_json_script, ScriptCall, OCR_TIMEOUT};
use crate::document::html::render_portfolio_html;
use crate::document::themes::{is_known_theme, DEFAULT_THEME, THEMES};
use crate::errors::AppError;
use crate::models::portfolio::PortfolioRow;
use crate::portfolio::data::{PortfolioData, PortfolioPatch};
use crate::portfolio::extract::extract_portfolio;
use crate::portfolio::llm_parse::parse_with_llm;
use crate::portfolio::store;
use crate::state::AppState;
use crate::text_extract::{extract_text, read_multipart, UploadKind, UploadedFile};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployRequest {
    #[serde(default)]
    pub portfolio_data: PortfolioData,
    pub template: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRequest {
    #[serde(default)]
    pub portfolio_data: PortfolioPatch,
    pub template: Option<String>,
}

fn not_found() -> AppError {
    AppError::NotFound("Portfolio not found".to_string())
}

/// Short public id: the first block of a v4 UUID.
fn new_portfolio_id() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_string()
}

/// Keeps a requested template only if it names a known theme.
fn resolve_template(requested: Option<&str>) -> &str {
    requested
        .map(str::trim)
        .filter(|t| is_known_theme(t))
        .unwrap_or(DEFAULT_THEME)
}

/// Pushes the rendered page to object storage when publishing is configured.
/// Failures are logged; the portfolio itself is already saved.
async fn publish_site(state: &AppState, row: PortfolioRow) -> PortfolioRow {
    let Some(publisher) = &state.publisher else {
        return row;
    };
    let html = render_portfolio_html(&row.to_data(), &row.template, Utc::now().year());
    match publisher.publish(&row.portfolio_id, html).await {
        Ok(url) => match store::set_site_url(&state.db, row.id, &url).await {
            Ok(updated) => updated,
            Err(e) => {
                warn!("Failed to record site URL for {}: {e}", row.portfolio_id);
                row
            }
        },
        Err(e) => {
            warn!("Failed to publish portfolio {}: {e:#}", row.portfolio_id);
            row
        }
    }
}

/// Runs the OCR script over the upload and returns the recognized text.
async fn ocr_text(state: &AppState, file: &UploadedFile, kind: UploadKind) -> Result<String, AppError> {
    let extension = file
        .filename
        .as_deref()
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_else(|| kind.extension().to_string());

    let scratch = tempfile::Builder::new()
        .prefix("placify-ocr-")
        .suffix(&format!(".{extension}"))
        .tempfile()
        .context("Failed to create OCR scratch file")?;
    tokio::fs::write(scratch.path(), &file.bytes)
        .await
        .context("Failed to write OCR scratch file")?;

    let call = ScriptCall::python(
        "Resume OCR",
        &state.config.python_path,
        state.config.script("resume_ocr.py"),
        OCR_TIMEOUT,
    )
    .arg(scratch.path());
    let payload = run_json_script(&call).await?;

    Ok(payload
        .get("raw_text")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string())
}

/// LLM parse when configured, heuristic parse otherwise or on any LLM failure.
async fn parse_text(state: &AppState, text: &str) -> PortfolioData {
    if let Some(llm) = &state.llm {
        match parse_with_llm(llm, text).await {
            Ok(data) => return data,
            Err(e) => warn!("LLM resume parse failed, using heuristic parser: {e}"),
        }
    }
    extract_portfolio(text)
}

/// POST /api/portfolio/parse-resume
pub async fn handle_parse_resume(
    State(state): State<AppState>,
    _user: AuthUser,
    multipart: Multipart,
) -> Result<Json<Value>, AppError> {
    let (file, _) = read_multipart(multipart, "resume").await?;
    let file = file.ok_or_else(|| {
        AppError::Validation("Please upload a resume file (PDF, DOCX or image)".to_string())
    })?;
    let kind = file.kind().ok_or_else(|| {
        AppError::Validation(
            "Unsupported file type. Please upload a PDF, DOCX or image file".to_string(),
        )
    })?;

    let mut text = match extract_text(kind, file.bytes.clone()).await {
        Ok(text) => text,
        Err(e) if kind == UploadKind::Pdf => {
            warn!("PDF text extraction failed, trying OCR: {e:#}");
            String::new()
        }
        Err(e) => {
            return Err(AppError::Validation(format!(
                "Could not read the uploaded file: {e}"
            )))
        }
    };
    if text.trim().is_empty() && kind != UploadKind::Docx {
        text = ocr_text(&state, &file, kind).await?;
    }
    if text.trim().is_empty() {
        return Err(AppError::Validation(
            "Could not extract text from the uploaded file".to_string(),
        ));
    }
    info!("Extracted {} characters of resume text", text.chars().count());

    let data = parse_text(&state, &text).await;
    Ok(Json(json!({
        "success": true,
        "message": "Resume parsed successfully",
        "data": data,
    })))
}

/// POST /api/portfolio/deploy
pub async fn handle_deploy(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<DeployRequest>,
) -> Result<Json<Value>, AppError> {
    let data = req.portfolio_data;
    data.check_publishable()
        .map_err(|msg| AppError::Validation(msg.to_string()))?;

    let template = resolve_template(req.template.as_deref());
    let row =
        store::insert_with_fresh_id(&state.db, user.id, template, &data, new_portfolio_id).await?;
    let portfolio_id = row.portfolio_id.clone();
    info!("Deployed portfolio {portfolio_id} for user {}", user.id);

    let row = publish_site(&state, row).await;
    let portfolio_url = format!("{}/p/{}", state.config.frontend_url, portfolio_id);

    Ok(Json(json!({
        "success": true,
        "message": "Portfolio deployed successfully",
        "portfolioUrl": portfolio_url,
        "portfolioId": portfolio_id,
        "portfolio": row,
    })))
}

/// GET /api/portfolio/my-portfolios
pub async fn handle_my_portfolios(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Value>, AppError> {
    let portfolios = store::list_by_user(&state.db, user.id).await?;
    Ok(Json(json!({ "success": true, "portfolios": portfolios })))
}

/// PUT /api/portfolio/:portfolioId
pub async fn handle_update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(portfolio_id): Path<String>,
    Json(req): Json<UpdateRequest>,
) -> Result<Json<Value>, AppError> {
    let existing = store::find_owned(&state.db, &portfolio_id, user.id)
        .await?
        .ok_or_else(not_found)?;

    let mut data = existing.to_data();
    data.apply(req.portfolio_data);
    data.check_publishable()
        .map_err(|msg| AppError::Validation(msg.to_string()))?;
    let template = match req.template.as_deref() {
        Some(requested) => resolve_template(Some(requested)),
        None => existing.template.as_str(),
    };

    let row = store::update_owned(&state.db, &portfolio_id, user.id, template, &data)
        .await?
        .ok_or_else(not_found)?;
    let row = if row.site_url.is_some() {
        publish_site(&state, row).await
    } else {
        row
    };
    info!("Updated portfolio {portfolio_id} for user {}", user.id);

    Ok(Json(json!({
        "success": true,
        "message": "Portfolio updated successfully",
        "portfolio": row,
    })))
}

/// DELETE /api/portfolio/:portfolioId
pub async fn handle_delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(portfolio_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let row = store::delete_owned(&state.db, &portfolio_id, user.id)
        .await?
        .ok_or_else(not_found)?;

    if let (Some(publisher), Some(_)) = (&state.publisher, &row.site_url) {
        if let Err(e) = publisher.unpublish(&portfolio_id).await {
            warn!("Failed to remove published site for {portfolio_id}: {e:#}");
        }
    }
    info!("Deleted portfolio {portfolio_id} for user {}", user.id);

    Ok(Json(json!({
        "success": true,
        "message": "Portfolio deleted successfully",
    })))
}

/// GET /api/portfolio/:portfolioId
pub async fn handle_public_get(
    State(state): State<AppState>,
    Path(portfolio_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let row = store::record_view(&state.db, &portfolio_id)
        .await?
        .ok_or_else(not_found)?;
    Ok(Json(json!({ "success": true, "portfolio": row })))
}

/// GET /api/portfolio/:portfolioId/site
pub async fn handle_site(
    State(state): State<AppState>,
    Path(portfolio_id): Path<String>,
) -> Result<Html<String>, AppError> {
    let row = store::find_published(&state.db, &portfolio_id)
        .await?
        .ok_or_else(not_found)?;
    Ok(Html(render_portfolio_html(
        &row.to_data(),
        &row.template,
        Utc::now().year(),
    )))
}

/// GET /api/portfolio/templates
pub async fn handle_templates() -> Json<Value> {
    Json(json!({ "success": true, "templates": THEMES }))
}
