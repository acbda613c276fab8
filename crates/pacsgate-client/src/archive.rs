//! DICOMweb archive client with exhaustive pagination.
//!
//! The archive exposes `limit`/`offset` windows over its collections with
//! no total-count contract, so the only way to see a whole collection is
//! to walk it page by page. [`ArchiveClient::fetch_all`] does that with a
//! partial-result-over-total-failure policy: downstream consumers (the
//! directory and the dashboard) are best-effort, so whatever has been
//! accumulated when a page fails is worth more than no data at all.

use std::sync::Arc;

use pacsgate_core::{DicomRecord, GatewayError, Result};
use url::Url;

use crate::config::ArchiveSettings;
use crate::token::TokenService;

const DICOM_JSON: &str = "application/dicom+json";

/// Client for the DICOMweb RS interface of the archive.
pub struct ArchiveClient {
    http_client: reqwest::Client,
    base_url: Url,
    rs_path: String,
    page_size: usize,
    tokens: Arc<TokenService>,
}

impl ArchiveClient {
    /// Creates a new archive client.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the archive base URL does not
    /// parse.
    pub fn new(settings: &ArchiveSettings, tokens: Arc<TokenService>) -> Result<Self> {
        let base_url = Url::parse(&settings.base_url)
            .map_err(|e| GatewayError::configuration(format!("archive.base_url: {e}")))?;

        let http_client = reqwest::Client::builder()
            .timeout(settings.request_timeout)
            .build()
            .map_err(|e| GatewayError::configuration(format!("http client: {e}")))?;

        Ok(Self {
            http_client,
            base_url,
            rs_path: settings.rs_path(),
            page_size: settings.page_size,
            tokens,
        })
    }

    fn resource_url(&self, resource: &str) -> Result<Url> {
        self.base_url
            .join(&format!("{}/{}", self.rs_path, resource))
            .map_err(|e| GatewayError::configuration(format!("resource url: {e}")))
    }

    /// Runs a single query against a collection endpoint.
    ///
    /// A 204 is a clean empty result. Any other non-success status maps to
    /// [`GatewayError::RemoteUnavailable`]; transport failures map to
    /// [`GatewayError::Network`].
    pub async fn query(
        &self,
        resource: &str,
        params: &[(&str, String)],
    ) -> Result<Vec<DicomRecord>> {
        let token = self.tokens.get_token().await?;
        let url = self.resource_url(resource)?;

        let response = self
            .http_client
            .get(url)
            .query(params)
            .bearer_auth(token)
            .header("Accept", DICOM_JSON)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("Archive request for {resource} failed: {e}");
                GatewayError::network(e.to_string())
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::NO_CONTENT {
            return Ok(Vec::new());
        }
        if !status.is_success() {
            return Err(GatewayError::remote_unavailable(status.as_u16()));
        }

        // dcm4chee occasionally answers 200 with a null body.
        let records: Option<Vec<DicomRecord>> = response
            .json()
            .await
            .map_err(|e| GatewayError::invalid_response(format!("{resource} page: {e}")))?;
        Ok(records.unwrap_or_default())
    }

    /// Exhaustively retrieves a collection page by page.
    ///
    /// Requests successive offset windows of the configured page size,
    /// advancing the offset by exactly one window per successful page,
    /// until a page comes back shorter than the window (exhaustion), the
    /// archive answers 204 (clean empty terminal), or any other failure is
    /// observed — in which case whatever has been accumulated so far is
    /// returned rather than an error.
    ///
    /// Records are not deduplicated across page boundaries; stable remote
    /// ordering for the duration of the fetch is assumed. Concurrent
    /// writes on the archive side can skip or duplicate records within a
    /// fetch window; that is an accepted limitation.
    ///
    /// # Errors
    ///
    /// Only an authentication failure propagates; every other failure
    /// terminates the walk with partial data.
    pub async fn fetch_all(
        &self,
        resource: &str,
        base_params: &[(&str, String)],
    ) -> Result<Vec<DicomRecord>> {
        let mut all = Vec::new();
        let mut offset: usize = 0;

        loop {
            let mut params: Vec<(&str, String)> = base_params.to_vec();
            params.push(("limit", self.page_size.to_string()));
            params.push(("offset", offset.to_string()));

            match self.query(resource, &params).await {
                Ok(page) => {
                    let page_len = page.len();
                    all.extend(page);
                    if page_len < self.page_size {
                        break;
                    }
                    offset += self.page_size;
                }
                Err(e) if e.is_auth_error() => return Err(e),
                Err(e) => {
                    tracing::warn!(
                        "Aborting {resource} fetch at offset {offset} with {} records: {e}",
                        all.len()
                    );
                    break;
                }
            }
        }

        tracing::debug!("Fetched {} {resource} records", all.len());
        Ok(all)
    }

    /// Returns the archive-declared total for a collection.
    ///
    /// Issues a `limit=1` query and reads the `X-Total-Count` header,
    /// falling back to the body length when the header is missing or not
    /// numeric. Degrades to 0 on any remote failure; only an
    /// authentication failure propagates.
    pub async fn total_count(&self, resource: &str, params: &[(&str, String)]) -> Result<u64> {
        let token = self.tokens.get_token().await?;
        let url = self.resource_url(resource)?;

        let mut query: Vec<(&str, String)> = params.to_vec();
        query.push(("limit", "1".to_string()));

        let response = match self
            .http_client
            .get(url)
            .query(&query)
            .bearer_auth(token)
            .header("Accept", DICOM_JSON)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Count request for {resource} failed: {e}");
                return Ok(0);
            }
        };

        if response.status() != reqwest::StatusCode::OK {
            return Ok(0);
        }

        let header_count = response
            .headers()
            .get("X-Total-Count")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());

        match header_count {
            Some(count) => Ok(count),
            None => {
                let body: Option<Vec<serde_json::Value>> =
                    response.json().await.unwrap_or_default();
                Ok(body.map(|b| b.len() as u64).unwrap_or(0))
            }
        }
    }
}
