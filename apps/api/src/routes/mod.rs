pub mod health;

use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{get, patch, post},
    Router,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::state::AppState;
use crate::text_extract::MAX_UPLOAD_BYTES;
use crate::{applications, aptitude, ats, auth, jobs, portfolio, resume};

/// Multipart framing on top of the largest accepted upload.
const BODY_LIMIT: usize = MAX_UPLOAD_BYTES + 2 * 1024 * 1024;

/// CORS for the configured origins, or any origin when none are set.
pub fn cors_layer(origins: &[String]) -> Result<CorsLayer> {
    if origins.is_empty() {
        return Ok(CorsLayer::permissive());
    }
    let origins = origins
        .iter()
        .map(|o| {
            o.parse::<HeaderValue>()
                .with_context(|| format!("Invalid CORS origin '{o}'"))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Auth
        .route("/api/auth/register", post(auth::handlers::handle_register))
        .route("/api/auth/login", post(auth::handlers::handle_login))
        .route("/api/auth/me", get(auth::handlers::handle_me))
        .route(
            "/api/auth/check-username/:username",
            get(auth::handlers::handle_check_username),
        )
        .route(
            "/api/auth/forgot-password",
            post(auth::handlers::handle_forgot_password),
        )
        .route("/api/auth/verify-otp", post(auth::handlers::handle_verify_otp))
        .route(
            "/api/auth/reset-password",
            post(auth::handlers::handle_reset_password),
        )
        // Resume builder
        .route("/api/resume/generate", post(resume::handlers::handle_generate))
        .route("/api/resume/preview", post(resume::handlers::handle_preview))
        .route("/api/resume/upload", post(resume::handlers::handle_upload))
        .route("/api/resume/history", get(resume::handlers::handle_history))
        .route(
            "/api/resume/version/:version",
            get(resume::handlers::handle_get_version),
        )
        .route(
            "/api/resume/download/:filename",
            get(resume::handlers::handle_download),
        )
        .route(
            "/api/resume/:id",
            axum::routing::delete(resume::handlers::handle_delete),
        )
        // Application tracker
        .route(
            "/api/application",
            get(applications::handlers::handle_list).post(applications::handlers::handle_create),
        )
        .route(
            "/api/application/:id",
            patch(applications::handlers::handle_update_status)
                .delete(applications::handlers::handle_delete),
        )
        // Jobs, ATS, aptitude
        .route("/api/jobs/search", get(jobs::handlers::handle_search))
        .route("/api/ats/analyze", post(ats::handlers::handle_analyze))
        .route("/api/ats/health", get(ats::handlers::handle_health))
        .route(
            "/api/aptitude/generate",
            post(aptitude::handlers::handle_generate),
        )
        // Portfolio
        .route(
            "/api/portfolio/parse-resume",
            post(portfolio::handlers::handle_parse_resume),
        )
        .route("/api/portfolio/deploy", post(portfolio::handlers::handle_deploy))
        .route(
            "/api/portfolio/my-portfolios",
            get(portfolio::handlers::handle_my_portfolios),
        )
        .route(
            "/api/portfolio/templates",
            get(portfolio::handlers::handle_templates),
        )
        .route(
            "/api/portfolio/:portfolioId",
            get(portfolio::handlers::handle_public_get)
                .put(portfolio::handlers::handle_update)
                .delete(portfolio::handlers::handle_delete),
        )
        .route(
            "/api/portfolio/:portfolioId/site",
            get(portfolio::handlers::handle_site),
        )
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;
    use uuid::Uuid;

    use super::*;
    use crate::auth::mailer::LogMailer;
    use crate::auth::token::issue_token;
    use crate::config::Config;
    use crate::files::GeneratedFiles;

    /// State whose pool never connects; only routes that stay off the
    /// database are exercised here.
    fn test_state(dir: &std::path::Path) -> AppState {
        let config = Config::for_tests(dir.to_path_buf());
        AppState {
            db: PgPoolOptions::new()
                .connect_lazy(&config.database_url)
                .unwrap(),
            files: GeneratedFiles::new(dir.to_path_buf()),
            config,
            mailer: Arc::new(LogMailer::new(None)),
            llm: None,
            job_search: None,
            publisher: None,
        }
    }

    fn bearer() -> String {
        let token = issue_token(Uuid::new_v4(), "test-secret", Duration::from_secs(600)).unwrap();
        format!("Bearer {token}")
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn json_post(uri: &str, auth: Option<&str>, body: Value) -> Request<Body> {
        let mut builder = Request::post(uri).header(header::CONTENT_TYPE, "application/json");
        if let Some(auth) = auth {
            builder = builder.header(header::AUTHORIZATION, auth);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(test_state(dir.path()));
        let (status, body) = send(app, Request::get("/health").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["service"], "placify-api");
    }

    #[tokio::test]
    async fn test_cors_allows_only_configured_origins() {
        let dir = tempfile::tempdir().unwrap();
        let cors = cors_layer(&["https://placify.example".to_string()]).unwrap();
        let app = build_router(test_state(dir.path())).layer(cors);

        let allowed = Request::get("/health")
            .header(header::ORIGIN, "https://placify.example")
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(allowed).await.unwrap();
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "https://placify.example"
        );

        let other = Request::get("/health")
            .header(header::ORIGIN, "https://evil.example")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(other).await.unwrap();
        assert!(response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none());
    }

    #[test]
    fn test_cors_rejects_malformed_origin() {
        assert!(cors_layer(&["https://bad\norigin".to_string()]).is_err());
    }

    #[tokio::test]
    async fn test_protected_route_requires_token() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(test_state(dir.path()));
        let (status, body) =
            send(app, Request::get("/api/auth/me").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Not authorized, no token");
    }

    #[tokio::test]
    async fn test_bad_token_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(test_state(dir.path()));
        let request = Request::get("/api/resume/history")
            .header(header::AUTHORIZATION, "Bearer not-a-jwt")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(app, request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Not authorized, token failed");
    }

    #[tokio::test]
    async fn test_download_rejects_unsafe_filename() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(test_state(dir.path()));
        let request = Request::get("/api/resume/download/a..b")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Invalid filename");
    }

    #[tokio::test]
    async fn test_download_serves_generated_file() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());
        state.files.write("resume_x_1.tex", b"\\documentclass{article}").await.unwrap();
        let app = build_router(state);

        let response = app
            .clone()
            .oneshot(
                Request::get("/api/resume/download/resume_x_1.tex")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"resume_x_1.tex\""
        );

        let missing = Request::get("/api/resume/download/resume_x_2.tex")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(app, missing).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_preview_validates_and_renders() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(test_state(dir.path()));
        let auth = bearer();

        let (status, body) = send(
            app.clone(),
            json_post("/api/resume/preview", Some(&auth), json!({"resumeData": {}})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Resume data validation failed");
        assert_eq!(body["errors"].as_array().unwrap().len(), 3);

        let resume = json!({
            "resumeData": {
                "personalInfo": {"name": "Asha Rao", "email": "asha@example.com"},
                "education": [{"degree": "B.Tech", "institution": "NIT"}]
            }
        });
        let (status, body) =
            send(app, json_post("/api/resume/preview", Some(&auth), resume)).await;
        assert_eq!(status, StatusCode::OK);
        let latex = body["data"]["latex"].as_str().unwrap();
        assert!(latex.contains("Asha Rao"));
        assert!(latex.contains("EDUCATION"));
        assert!(!latex.contains("EXPERIENCE"));
        assert!(body["data"]["html"].as_str().unwrap().contains("Asha Rao"));
    }

    #[tokio::test]
    async fn test_job_search_unconfigured() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(test_state(dir.path()));
        let request = Request::get("/api/jobs/search?query=rust")
            .header(header::AUTHORIZATION, bearer())
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(app, request).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["message"], "Job search is not configured");
    }

    #[tokio::test]
    async fn test_portfolio_templates_are_public() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(test_state(dir.path()));
        let (status, body) = send(
            app,
            Request::get("/api/portfolio/templates")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["templates"].as_array().unwrap().len(), 10);
    }

    #[tokio::test]
    async fn test_deploy_requires_name_and_title() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(test_state(dir.path()));
        let (status, body) = send(
            app,
            json_post(
                "/api/portfolio/deploy",
                Some(&bearer()),
                json!({"portfolioData": {"name": "Asha"}}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Portfolio name and title are required");
    }
}
