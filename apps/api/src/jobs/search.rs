use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::errors::AppError;
use crate::jobs::filters::JobSearchQuery;

const SEARCH_URL: &str = "https://www.searchapi.io/api/v1/search";

/// SearchAPI client for the Google Jobs engine.
#[derive(Clone)]
pub struct SearchApiClient {
    client: Client,
    api_key: String,
}

impl SearchApiClient {
    pub fn new(api_key: String) -> Result<Self> {
        Ok(Self {
            client: Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .context("Failed to build job search HTTP client")?,
            api_key,
        })
    }

    /// Runs one search and returns the raw response body.
    /// A non-2xx answer keeps its status and body.
    pub async fn search(&self, query: &JobSearchQuery) -> Result<Value, AppError> {
        let terms = query.search_terms();
        let mut params = vec![
            ("engine", "google_jobs"),
            ("q", terms.as_str()),
            ("location", query.location()),
            ("api_key", self.api_key.as_str()),
        ];
        if let Some(job_type) = query.job_type() {
            params.push(("job_type", job_type));
        }
        if let Some(date_posted) = query.date_posted() {
            params.push(("date_posted", date_posted));
        }

        debug!("Searching jobs: q='{}' location='{}'", terms, query.location());
        let response = self
            .client
            .get(SEARCH_URL)
            .query(&params)
            .send()
            .await
            .context("Job search request failed")?;

        let status = response.status();
        let body = response.text().await.context("Failed to read job search response")?;
        let body: Value = serde_json::from_str(&body).unwrap_or(Value::String(body));

        if !status.is_success() {
            return Err(AppError::Upstream {
                status: status.as_u16(),
                message: "Failed to fetch jobs".to_string(),
                body,
            });
        }
        Ok(body)
    }
}
