mod applications;
mod aptitude;
mod ats;
mod auth;
mod bridge;
mod config;
mod db;
mod document;
mod errors;
mod files;
mod jobs;
mod llm_client;
mod models;
mod portfolio;
mod resume;
mod routes;
mod state;
mod text_extract;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::auth::mailer::{LogMailer, Mailer, SmtpMailer};
use crate::config::Config;
use crate::db::create_pool;
use crate::files::GeneratedFiles;
use crate::jobs::search::SearchApiClient;
use crate::llm_client::LlmClient;
use crate::portfolio::publish::SitePublisher;
use crate::routes::{build_router, cors_layer};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Placify API v{}", env!("CARGO_PKG_VERSION"));

    let db = create_pool(&config.database_url).await?;

    let files = GeneratedFiles::new(config.generated_dir.clone());
    files.ensure_dir().await?;
    info!("Generated files stored in {}", config.generated_dir.display());

    let llm = match &config.groq_api_key {
        Some(key) => {
            info!("LLM client initialized (model: {})", llm_client::MODEL);
            Some(LlmClient::new(key.clone())?)
        }
        None => {
            warn!("GROQ_API_KEY not set; resume parsing uses the heuristic parser only");
            None
        }
    };

    let job_search = match &config.searchapi_key {
        Some(key) => Some(SearchApiClient::new(key.clone())?),
        None => {
            warn!("SEARCHAPI_KEY not set; job search is disabled");
            None
        }
    };

    let publisher = match &config.storage {
        Some(storage) => {
            let publisher = SitePublisher::connect(storage).await;
            info!("Portfolio sites publish to bucket '{}'", storage.bucket);
            Some(publisher)
        }
        None => {
            warn!("S3 storage not configured; portfolio sites are served by the API only");
            None
        }
    };

    let mailer: Arc<dyn Mailer> = match (&config.email_user, &config.email_password) {
        (Some(user), Some(password)) => {
            info!("Sending mail via {} as {user}", config.smtp_host);
            Arc::new(SmtpMailer::new(&config.smtp_host, user, password)?)
        }
        _ => {
            warn!("EMAIL_USER/EMAIL_PASSWORD not set; emails are logged, not sent");
            Arc::new(LogMailer::new(config.email_user.clone()))
        }
    };

    let state = AppState {
        db,
        config: config.clone(),
        files,
        mailer,
        llm,
        job_search,
        publisher,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config.cors_origins)?);

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
