//! Google Books volumes search client.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

use super::{BookCatalog, VolumeInfo, VolumesResponse};
use crate::config::CatalogConfig;
use crate::error::{PersonaError, Result};

#[derive(Clone, Debug)]
pub struct GoogleBooksClient {
    endpoint: String,
    api_key: Option<String>,
    timeout_ms: u64,
    client: Client,
}

impl GoogleBooksClient {
    pub fn new(config: &CatalogConfig, api_key: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(concat!("persona-books/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| PersonaError::Config {
                message: format!("Failed to build catalog HTTP client: {}", e),
            })?;

        Ok(Self {
            endpoint: format!("{}/volumes", config.base_url.trim_end_matches('/')),
            api_key,
            timeout_ms: config.timeout_ms,
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn map_transport(&self, err: reqwest::Error) -> PersonaError {
        if err.is_timeout() {
            PersonaError::Timeout {
                operation: "book catalog request".to_string(),
                timeout_ms: self.timeout_ms,
            }
        } else {
            err.into()
        }
    }
}

#[async_trait]
impl BookCatalog for GoogleBooksClient {
    async fn search_volumes(&self, query: &str, max_results: u32) -> Result<Vec<VolumeInfo>> {
        debug!("Searching catalog (q={:?}, max_results={})", query, max_results);

        let max_results = max_results.to_string();
        let mut params: Vec<(&str, &str)> = vec![("q", query), ("maxResults", max_results.as_str())];
        if let Some(key) = self.api_key.as_deref() {
            params.push(("key", key));
        }

        let res = self
            .client
            .get(&self.endpoint)
            .query(&params)
            .send()
            .await
            .map_err(|e| {
                warn!("Catalog request failed: {}", e);
                self.map_transport(e)
            })?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            warn!("Catalog returned error {}", status);
            return Err(PersonaError::Catalog {
                message: format!("Catalog returned error {}: {}", status, text),
            });
        }

        let body: VolumesResponse = res.json().await.map_err(|e| {
            warn!("Catalog response could not be parsed: {}", e);
            PersonaError::Catalog {
                message: format!("Failed to parse catalog response: {}", e),
            }
        })?;

        let volumes: Vec<VolumeInfo> = body.items.into_iter().map(|i| i.volume_info).collect();
        debug!("Catalog returned {} volumes", volumes.len());
        Ok(volumes)
    }
}
