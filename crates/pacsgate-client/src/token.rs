//! Bearer credential cache against the identity provider.
//!
//! The archive only accepts requests carrying a bearer token issued by the
//! identity provider (password grant). Tokens are cached until shortly
//! before their declared expiry; the margin guarantees renewal happens
//! before the provider would start rejecting the token.
//!
//! The check-then-refresh sequence is intentionally not serialized:
//! concurrent callers racing past an expired entry may each perform a
//! redundant exchange. Each exchange yields an equally valid token, so the
//! race is a documented trade-off rather than a correctness bug.

use std::time::Duration;

use pacsgate_core::{GatewayError, Result, TtlCell};
use serde::Deserialize;

use crate::config::AuthSettings;

/// Token endpoint response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    /// Declared token lifetime in seconds.
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    300
}

/// Obtains and time-caches a bearer credential from the identity provider.
pub struct TokenService {
    http_client: reqwest::Client,
    settings: AuthSettings,
    cache: TtlCell<String>,
}

impl TokenService {
    /// Creates a new token service.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be created (should not happen in
    /// practice).
    #[must_use]
    pub fn new(settings: AuthSettings) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(settings.request_timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http_client,
            settings,
            cache: TtlCell::new(),
        }
    }

    /// Returns a valid bearer token, exchanging credentials with the
    /// identity provider only when the cached one is missing or expired.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::AuthenticationFailed`] when the provider
    /// rejects the configured principal. That failure propagates to the
    /// caller and is never retried here.
    pub async fn get_token(&self) -> Result<String> {
        if let Some(token) = self.cache.get().await {
            tracing::trace!("Token cache hit");
            return Ok(token);
        }

        tracing::debug!("Token cache miss, exchanging credentials");
        let response = self.exchange().await?;

        let ttl = cached_lifetime(
            Duration::from_secs(response.expires_in),
            self.settings.token_margin,
        );
        self.cache.put(response.access_token.clone(), ttl).await;

        Ok(response.access_token)
    }

    /// Performs one credential exchange against the token endpoint.
    async fn exchange(&self) -> Result<TokenResponse> {
        let params = [
            ("grant_type", "password"),
            ("client_id", self.settings.client_id.as_str()),
            ("username", self.settings.username.as_str()),
            ("password", self.settings.password.as_str()),
        ];

        let response = self
            .http_client
            .post(&self.settings.token_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("Token endpoint unreachable: {e}");
                GatewayError::network(e.to_string())
            })?;

        if !response.status().is_success() {
            let status = response.status();
            tracing::warn!("Identity provider rejected credentials: status {status}");
            return Err(GatewayError::authentication_failed(format!(
                "identity provider returned status {status}"
            )));
        }

        response
            .json::<TokenResponse>()
            .await
            .map_err(|e| GatewayError::invalid_response(format!("token response: {e}")))
    }
}

/// How long an issued token is cached: the declared lifetime minus the
/// safety margin, floored at zero.
fn cached_lifetime(declared: Duration, margin: Duration) -> Duration {
    declared.saturating_sub(margin)
}
