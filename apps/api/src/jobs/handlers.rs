use axum::{
    extract::{Query, State},
    Json,
};
use serde_json::{json, Value};
use tracing::info;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::jobs::filters::JobSearchQuery;
use crate::state::AppState;

/// Merges the applied filters into the upstream search parameters.
fn search_parameters(upstream: &Value, query: &JobSearchQuery) -> Value {
    let mut params = upstream
        .get("search_parameters")
        .filter(|p| p.is_object())
        .cloned()
        .unwrap_or_else(|| json!({}));
    params["filters_applied"] = query.filters_applied();
    params
}

/// GET /api/jobs/search
pub async fn handle_search(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<JobSearchQuery>,
) -> Result<Json<Value>, AppError> {
    let client = state.job_search.as_ref().ok_or_else(|| {
        AppError::ServiceUnavailable("Job search is not configured".to_string())
    })?;

    let data = client.search(&query).await?;
    let jobs = data
        .get("jobs")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
    let fetched = jobs.len();
    let jobs = query.apply(jobs);
    info!("Job search returned {fetched} jobs, {} after filters", jobs.len());

    Ok(Json(json!({
        "success": true,
        "total_results": jobs.len(),
        "search_parameters": search_parameters(&data, &query),
        "jobs": jobs,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_parameters_keep_upstream_fields() {
        let upstream = json!({"search_parameters": {"engine": "google_jobs", "q": "rust"}});
        let query = JobSearchQuery {
            work_mode: Some("remote".to_string()),
            ..Default::default()
        };
        let params = search_parameters(&upstream, &query);
        assert_eq!(params["engine"], "google_jobs");
        assert_eq!(params["filters_applied"], json!({"workMode": "remote"}));
    }

    #[test]
    fn test_search_parameters_without_upstream_block() {
        let params = search_parameters(&json!({}), &JobSearchQuery::default());
        assert_eq!(params, json!({"filters_applied": {}}));
    }
}
