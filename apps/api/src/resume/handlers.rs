use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::Response,
    Json,
};
use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::document::docx::{build_docx_tree, pack_docx};
use crate::document::html::render_html;
use crate::document::latex::render_latex;
use crate::document::themes::theme_for;
use crate::document::ResumeDocument;
use crate::errors::AppError;
use crate::files::{content_type_for, is_safe_filename, resume_filename};
use crate::models::resume::{ResumeFormat, ResumeRow, ResumeSummary};
use crate::resume::data::ResumeData;
use crate::resume::pdf::compile_pdf;
use crate::resume::store::{self, NewResume};
use crate::resume::validation::validate_resume;
use crate::state::AppState;

const DEFAULT_PAGE_SIZE: i64 = 10;
const MAX_PAGE_SIZE: i64 = 50;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    #[serde(default)]
    pub resume_data: ResumeData,
    #[serde(default)]
    pub format: ResumeFormat,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedResume {
    pub version: i32,
    pub download_url: String,
    pub filename: String,
    pub format: ResumeFormat,
    pub created_at: DateTime<Utc>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewRequest {
    #[serde(default)]
    pub resume_data: ResumeData,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadRequest {
    #[serde(default)]
    pub resume_url: String,
}

#[derive(Deserialize)]
pub struct HistoryQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
}

impl Pagination {
    /// Normalizes the requested page window; out-of-range values are clamped.
    pub fn resolve(page: Option<i64>, limit: Option<i64>) -> (i64, i64) {
        let page = page.unwrap_or(1).max(1);
        let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
        (page, limit)
    }

    pub fn new(total: i64, page: i64, limit: i64) -> Self {
        Self {
            total,
            page,
            limit,
            total_pages: (total + limit - 1) / limit,
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }
}

#[derive(Serialize)]
pub struct HistoryResponse {
    pub success: bool,
    pub data: HistoryPage,
}

#[derive(Serialize)]
pub struct HistoryPage {
    pub resumes: Vec<ResumeSummary>,
    pub pagination: Pagination,
}

fn validated(data: ResumeData) -> Result<ResumeData, AppError> {
    validate_resume(data).map_err(AppError::InvalidResume)
}

/// POST /api/resume/generate
pub async fn handle_generate(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<GenerateRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let data = validated(req.resume_data)?;
    let format = req.format;

    let doc = ResumeDocument::from_resume(&data);
    let bytes = match format {
        ResumeFormat::Docx => pack_docx(&build_docx_tree(&doc))?,
        ResumeFormat::Tex => render_latex(&doc).into_bytes(),
        ResumeFormat::Pdf => compile_pdf(&state.config.latex_path, &render_latex(&doc)).await?,
        ResumeFormat::Url => {
            return Err(AppError::Validation(
                "Format must be one of docx, tex, pdf".to_string(),
            ))
        }
    };

    let filename = resume_filename(user.id, Utc::now().timestamp_millis(), format.as_str());
    state.files.write(&filename, &bytes).await?;

    let download_url = format!("/api/resume/download/{filename}");
    let resume_data = serde_json::to_value(&data).map_err(anyhow::Error::from)?;
    let row = match store::insert_next_version(
        &state.db,
        NewResume {
            user_id: user.id,
            resume_data: Some(&resume_data),
            resume_url: &download_url,
            filename: Some(&filename),
            format,
        },
    )
    .await
    {
        Ok(row) => row,
        Err(e) => {
            if let Err(cleanup) = state.files.remove(&filename).await {
                warn!("Failed to remove orphaned {filename}: {cleanup}");
            }
            return Err(e.into());
        }
    };

    info!(
        "Generated resume v{} ({}) for user {}",
        row.version,
        format.as_str(),
        user.id
    );

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Resume generated successfully",
            "data": GeneratedResume {
                version: row.version,
                download_url,
                filename,
                format,
                created_at: row.created_at,
            },
        })),
    ))
}

/// POST /api/resume/preview
pub async fn handle_preview(
    _user: AuthUser,
    Json(req): Json<PreviewRequest>,
) -> Result<Json<Value>, AppError> {
    let data = validated(req.resume_data)?;
    let doc = ResumeDocument::from_resume(&data);
    Ok(Json(json!({
        "success": true,
        "data": {
            "latex": render_latex(&doc),
            "html": render_html(&doc, theme_for("template1"), Utc::now().year()),
        },
    })))
}

/// POST /api/resume/upload
pub async fn handle_upload(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<UploadRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let url = req.resume_url.trim();
    if url.is_empty() {
        return Err(AppError::Validation("Resume URL is required".to_string()));
    }

    let row = store::insert_next_version(
        &state.db,
        NewResume {
            user_id: user.id,
            resume_data: None,
            resume_url: url,
            filename: None,
            format: ResumeFormat::Url,
        },
    )
    .await?;
    info!("Recorded uploaded resume v{} for user {}", row.version, user.id);

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Resume uploaded successfully",
            "data": row,
        })),
    ))
}

/// GET /api/resume/history
pub async fn handle_history(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<HistoryResponse>, AppError> {
    let (page, limit) = Pagination::resolve(query.page, query.limit);
    let total = store::count_for_user(&state.db, user.id).await?;
    let pagination = Pagination::new(total, page, limit);
    let resumes = store::list_history(&state.db, user.id, limit, pagination.offset()).await?;

    Ok(Json(HistoryResponse {
        success: true,
        data: HistoryPage {
            resumes,
            pagination,
        },
    }))
}

/// GET /api/resume/version/:version
pub async fn handle_get_version(
    State(state): State<AppState>,
    user: AuthUser,
    Path(version): Path<i32>,
) -> Result<Json<Value>, AppError> {
    let row: ResumeRow = store::find_version(&state.db, user.id, version)
        .await?
        .ok_or_else(|| AppError::NotFound("Resume version not found".to_string()))?;
    Ok(Json(json!({ "success": true, "data": row })))
}

/// GET /api/resume/download/:filename
pub async fn handle_download(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response, AppError> {
    if !is_safe_filename(&filename) {
        return Err(AppError::Validation("Invalid filename".to_string()));
    }

    let bytes = state
        .files
        .read(&filename)
        .await?
        .ok_or_else(|| AppError::NotFound("File not found".to_string()))?;

    Response::builder()
        .header(header::CONTENT_TYPE, content_type_for(&filename))
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        )
        .body(Body::from(bytes))
        .map_err(|e| AppError::Internal(e.into()))
}

/// DELETE /api/resume/:id
pub async fn handle_delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let not_found = || AppError::NotFound("Resume not found or unauthorized".to_string());
    let row = store::find_owned(&state.db, id, user.id)
        .await?
        .ok_or_else(not_found)?;

    if !store::delete_owned(&state.db, id, user.id).await? {
        return Err(not_found());
    }
    if let Some(filename) = &row.filename {
        match state.files.remove(filename).await {
            Ok(true) => {}
            Ok(false) => warn!("Generated file {filename} was already missing"),
            Err(e) => warn!("Failed to remove generated file {filename}: {e:#}"),
        }
    }
    info!("Deleted resume v{} for user {}", row.version, user.id);

    Ok(Json(json!({
        "success": true,
        "message": "Resume deleted successfully",
    })))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use sqlx::PgPool;

    use super::*;
    use crate::auth::mailer::LogMailer;
    use crate::auth::store::insert_test_user;
    use crate::config::Config;
    use crate::files::GeneratedFiles;

    fn state_with(pool: PgPool, dir: &std::path::Path) -> AppState {
        AppState {
            db: pool,
            config: Config::for_tests(dir.to_path_buf()),
            files: GeneratedFiles::new(dir.to_path_buf()),
            mailer: Arc::new(LogMailer::new(None)),
            llm: None,
            job_search: None,
            publisher: None,
        }
    }

    async fn stored_resume(pool: &PgPool, user_id: Uuid, filename: &str) -> ResumeRow {
        let new = NewResume {
            user_id,
            resume_data: None,
            resume_url: "/api/resume/download/test",
            filename: Some(filename),
            format: ResumeFormat::Docx,
        };
        store::insert_next_version(pool, new).await.unwrap()
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_delete_removes_row_and_file(pool: PgPool) {
        let dir = tempfile::tempdir().unwrap();
        let state = state_with(pool.clone(), dir.path());
        let user = insert_test_user(&pool, "asha").await;
        state.files.write("resume_a.docx", b"docx").await.unwrap();
        let row = stored_resume(&pool, user, "resume_a.docx").await;

        handle_delete(State(state), AuthUser { id: user }, Path(row.id))
            .await
            .unwrap();

        assert!(store::find_owned(&pool, row.id, user).await.unwrap().is_none());
        assert!(!dir.path().join("resume_a.docx").exists());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_delete_succeeds_when_file_is_missing(pool: PgPool) {
        let dir = tempfile::tempdir().unwrap();
        let state = state_with(pool.clone(), dir.path());
        let user = insert_test_user(&pool, "asha").await;
        let row = stored_resume(&pool, user, "resume_gone.docx").await;

        let Json(body) = handle_delete(State(state), AuthUser { id: user }, Path(row.id))
            .await
            .unwrap();

        assert_eq!(body["success"], true);
        assert_eq!(store::count_for_user(&pool, user).await.unwrap(), 0);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_delete_of_foreign_resume_keeps_file(pool: PgPool) {
        let dir = tempfile::tempdir().unwrap();
        let state = state_with(pool.clone(), dir.path());
        let owner = insert_test_user(&pool, "asha").await;
        let stranger = insert_test_user(&pool, "ravi").await;
        state.files.write("resume_b.docx", b"docx").await.unwrap();
        let row = stored_resume(&pool, owner, "resume_b.docx").await;

        let err = handle_delete(State(state), AuthUser { id: stranger }, Path(row.id))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
        assert!(dir.path().join("resume_b.docx").exists());
        assert_eq!(store::count_for_user(&pool, owner).await.unwrap(), 1);
    }

    #[test]
    fn test_history_nests_resumes_and_pagination() {
        let body = serde_json::to_value(HistoryResponse {
            success: true,
            data: HistoryPage {
                resumes: Vec::new(),
                pagination: Pagination::new(0, 1, 10),
            },
        })
        .unwrap();
        assert_eq!(
            body,
            json!({
                "success": true,
                "data": {
                    "resumes": [],
                    "pagination": {"total": 0, "page": 1, "limit": 10, "totalPages": 0}
                }
            })
        );
    }

    #[test]
    fn test_pagination_defaults() {
        assert_eq!(Pagination::resolve(None, None), (1, 10));
    }

    #[test]
    fn test_pagination_clamps_input() {
        assert_eq!(Pagination::resolve(Some(0), Some(500)), (1, 50));
        assert_eq!(Pagination::resolve(Some(-3), Some(0)), (1, 1));
    }

    #[test]
    fn test_pagination_total_pages_and_offset() {
        let p = Pagination::new(21, 3, 10);
        assert_eq!(p.total_pages, 3);
        assert_eq!(p.offset(), 20);
        assert_eq!(Pagination::new(0, 1, 10).total_pages, 0);
    }

    #[test]
    fn test_generate_request_defaults_to_docx() {
        let req: GenerateRequest = serde_json::from_value(json!({
            "resumeData": {"personalInfo": {"name": "Asha"}}
        }))
        .unwrap();
        assert_eq!(req.format, ResumeFormat::Docx);
        assert_eq!(req.resume_data.personal_info.name, "Asha");
    }

    #[test]
    fn test_generate_request_rejects_unknown_format() {
        let parsed: Result<GenerateRequest, _> =
            serde_json::from_value(json!({"resumeData": {}, "format": "odt"}));
        assert!(parsed.is_err());
    }
}
