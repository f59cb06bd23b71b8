//! Backend access for the movement search, VIN trace and center list endpoints.
//!
//! Bodies are returned as raw JSON; every shape decision happens in
//! [`crate::services::envelope`]. Requests are never retried.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::common::{LedgerFilter, VinQuery};
use crate::config::AppConfig;
use crate::errors::ServiceError;

#[async_trait]
pub trait MovementApi: Send + Sync {
    async fn search_movements(&self, filter: &LedgerFilter) -> Result<Value, ServiceError>;

    async fn trace_vin(&self, vin: &str) -> Result<Value, ServiceError>;

    async fn list_centers(&self) -> Result<Value, ServiceError>;
}

/// [`MovementApi`] over HTTP.
#[derive(Clone, Debug)]
pub struct HttpMovementApi {
    client: Client,
    base_url: Url,
    token: Option<String>,
    movement_search_path: String,
    vin_trace_path: String,
    center_list_path: String,
}

impl HttpMovementApi {
    /// Build a client from configuration using a default reqwest client.
    pub fn new(config: &AppConfig) -> Result<Self, ServiceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .context("failed to construct reqwest client for movement API")?;
        Self::with_client(config, client)
    }

    /// Build a client with a caller-supplied reqwest client (useful for tests).
    pub fn with_client(config: &AppConfig, client: Client) -> Result<Self, ServiceError> {
        Ok(Self {
            client,
            base_url: parse_base_url(&config.api_base_url)?,
            token: config.api_token.clone().filter(|t| !t.trim().is_empty()),
            movement_search_path: config.movement_search_path.clone(),
            vin_trace_path: config.vin_trace_path.clone(),
            center_list_path: config.center_list_path.clone(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ServiceError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ServiceError::ConfigError(format!("Invalid endpoint path '{}': {}", path, e)))
    }

    async fn get_json(&self, url: Url, query: &[(String, String)]) -> Result<Value, ServiceError> {
        let mut request = self.client.get(url.clone()).query(query);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            let text = String::from_utf8_lossy(&body);
            warn!("Backend returned {} for {}", status, url);
            return Err(ServiceError::ExternalApiError(format!(
                "status {}: {}",
                status,
                text.trim()
            )));
        }

        if body.iter().all(u8::is_ascii_whitespace) {
            debug!("Empty body from {}", url);
            return Ok(Value::Null);
        }

        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl MovementApi for HttpMovementApi {
    #[instrument(skip(self))]
    async fn search_movements(&self, filter: &LedgerFilter) -> Result<Value, ServiceError> {
        filter.active()?;
        let url = self.endpoint(&self.movement_search_path)?;
        self.get_json(url, &filter.query_params()).await
    }

    #[instrument(skip(self))]
    async fn trace_vin(&self, vin: &str) -> Result<Value, ServiceError> {
        let query = VinQuery::new(vin);
        let vin = query.canonical()?;
        let url = self.endpoint(&self.vin_trace_path.replace("{vin}", vin))?;
        self.get_json(url, &[]).await
    }

    #[instrument(skip(self))]
    async fn list_centers(&self) -> Result<Value, ServiceError> {
        let url = self.endpoint(&self.center_list_path)?;
        self.get_json(url, &[]).await
    }
}

/// Parses the base URL and makes sure relative joins keep its last segment.
fn parse_base_url(raw: &str) -> Result<Url, ServiceError> {
    let mut url = Url::parse(raw.trim())
        .map_err(|e| ServiceError::ConfigError(format!("Invalid api_base_url '{}': {}", raw, e)))?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
