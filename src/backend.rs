//! Client for the backend-as-a-service that serves the NCM table.
//!
//! The backend exposes a PostgREST-style API: rows of a table are read with
//! `GET {url}/rest/v1/{table}?select=*`, authenticated by the anonymous key
//! sent both as the `apikey` header and as a bearer token.
//!
//! A [`BackendClient`] is built explicitly from a [`BackendConfig`] and
//! handed to whoever needs it; construction validates the configuration
//! so missing credentials surface immediately instead of as a client that
//! cannot authenticate.

use anyhow::{bail, Context, Result};
use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use std::time::Duration;

use ncm_lookup_core::models::NcmItem;

use crate::config::BackendConfig;

const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Handle to the backend REST API.
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
    table: String,
    page_size: usize,
}

impl BackendClient {
    /// Validate `config` and build a client for it.
    pub fn new(config: &BackendConfig) -> Result<Self> {
        config.validate()?;

        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(&config.anon_key)
            .context("backend.anon_key contains characters not allowed in a header")?;
        headers.insert("apikey", key);
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", config.anon_key))
                .context("backend.anon_key contains characters not allowed in a header")?,
        );

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: config.url.trim_end_matches('/').to_string(),
            table: config.table.clone(),
            page_size: config.page_size,
        })
    }

    /// REST endpoint of the configured table.
    pub fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, self.table)
    }

    /// Fetch every row of the table, ordered by code, one page at a time.
    pub async fn fetch_items(&self) -> Result<Vec<NcmItem>> {
        let url = self.table_url();
        let mut items = Vec::new();
        let mut offset = 0usize;

        loop {
            let limit = self.page_size.to_string();
            let start = offset.to_string();
            let resp = self
                .http
                .get(&url)
                .query(&[
                    ("select", "*"),
                    ("order", "codigo.asc"),
                    ("limit", limit.as_str()),
                    ("offset", start.as_str()),
                ])
                .send()
                .await
                .with_context(|| format!("Request to {} failed", url))?;

            let status = resp.status();
            if !status.is_success() {
                let body_text = resp.text().await.unwrap_or_default();
                bail!("Backend API error {}: {}", status, body_text);
            }

            let page: Vec<NcmItem> = resp
                .json()
                .await
                .with_context(|| format!("Unexpected response body from {}", url))?;
            let fetched = page.len();
            debug!("Fetched {} rows from {} at offset {}", fetched, self.table, offset);
            items.extend(page);

            if fetched < self.page_size {
                break;
            }
            offset += fetched;
        }

        Ok(items)
    }
}
