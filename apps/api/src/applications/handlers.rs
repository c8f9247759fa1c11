use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use crate::applications::store;
use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::application::{ApplicationRow, ApplicationStatus};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateApplicationRequest {
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub role: String,
    pub resume_version: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: ApplicationStatus,
}

fn not_found() -> AppError {
    AppError::NotFound("Application not found".to_string())
}

/// POST /api/application
pub async fn handle_create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<CreateApplicationRequest>,
) -> Result<(StatusCode, Json<ApplicationRow>), AppError> {
    let company = req.company.trim();
    let role = req.role.trim();
    if company.is_empty() || role.is_empty() {
        return Err(AppError::Validation(
            "Company and role are required".to_string(),
        ));
    }

    let row = store::insert(&state.db, user.id, company, role, req.resume_version).await?;
    info!("Tracked application to {company} for user {}", user.id);
    Ok((StatusCode::CREATED, Json(row)))
}

/// GET /api/application
pub async fn handle_list(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<ApplicationRow>>, AppError> {
    Ok(Json(store::list_by_user(&state.db, user.id).await?))
}

/// PATCH /api/application/:id
pub async fn handle_update_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<ApplicationRow>, AppError> {
    let row = store::update_status(&state.db, id, user.id, req.status)
        .await?
        .ok_or_else(not_found)?;
    Ok(Json(row))
}

/// DELETE /api/application/:id
pub async fn handle_delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    if !store::delete_owned(&state.db, id, user.id).await? {
        return Err(not_found());
    }
    Ok(Json(json!({
        "success": true,
        "message": "Application deleted successfully",
    })))
}
