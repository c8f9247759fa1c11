use std::sync::Arc;

use sqlx::PgPool;

use crate::auth::mailer::Mailer;
use crate::config::Config;
use crate::files::GeneratedFiles;
use crate::jobs::search::SearchApiClient;
use crate::llm_client::LlmClient;
use crate::portfolio::publish::SitePublisher;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
    pub files: GeneratedFiles,
    pub mailer: Arc<dyn Mailer>,
    /// Present when GROQ_API_KEY is set; resume parsing falls back to heuristics otherwise.
    pub llm: Option<LlmClient>,
    /// Present when SEARCHAPI_KEY is set.
    pub job_search: Option<SearchApiClient>,
    /// Present when S3 storage is configured.
    pub publisher: Option<SitePublisher>,
}
