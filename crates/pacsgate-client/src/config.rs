//! Gateway configuration.
//!
//! Settings are loaded from an optional TOML file plus environment
//! overrides with the `PACSGATE__` prefix (double underscore as the
//! nesting separator, e.g. `PACSGATE__ARCHIVE__BASE_URL`). Every field
//! has a default so an empty environment still yields a usable local
//! development configuration.

use std::time::Duration;

use pacsgate_core::{GatewayError, Result};
use serde::{Deserialize, Serialize};
use url::Url;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GatewayConfig {
    /// Identity provider settings (token endpoint, principal).
    #[serde(default)]
    pub auth: AuthSettings,
    /// DICOMweb archive settings.
    #[serde(default)]
    pub archive: ArchiveSettings,
    /// Institution directory cache settings.
    #[serde(default)]
    pub directory: DirectorySettings,
}

impl GatewayConfig {
    /// Loads configuration from `pacsgate.toml` (when present) and
    /// `PACSGATE__*` environment variables, environment winning.
    ///
    /// A `.env` file in the working directory is honored first.
    pub fn load() -> Result<Self> {
        Self::load_from("pacsgate")
    }

    pub fn load_from(file_stem: &str) -> Result<Self> {
        dotenvy::dotenv().ok();

        let settings = ::config::Config::builder()
            .add_source(::config::File::with_name(file_stem).required(false))
            .add_source(::config::Environment::with_prefix("PACSGATE").separator("__"))
            .build()
            .map_err(|e| GatewayError::configuration(e.to_string()))?;

        let config: Self = settings
            .try_deserialize()
            .map_err(|e| GatewayError::configuration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.auth.token_url)
            .map_err(|e| GatewayError::configuration(format!("auth.token_url: {e}")))?;
        Url::parse(&self.archive.base_url)
            .map_err(|e| GatewayError::configuration(format!("archive.base_url: {e}")))?;
        if self.auth.client_id.is_empty() {
            return Err(GatewayError::configuration("auth.client_id must not be empty"));
        }
        if self.archive.aet.is_empty() {
            return Err(GatewayError::configuration("archive.aet must not be empty"));
        }
        if self.archive.page_size == 0 {
            return Err(GatewayError::configuration("archive.page_size must be > 0"));
        }
        if self.archive.request_timeout.is_zero() {
            return Err(GatewayError::configuration(
                "archive.request_timeout must be > 0",
            ));
        }
        Ok(())
    }
}

/// Identity provider (password grant) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSettings {
    /// Full URL of the token endpoint.
    #[serde(default = "default_token_url")]
    pub token_url: String,
    #[serde(default = "default_client_id")]
    pub client_id: String,
    #[serde(default = "default_username")]
    pub username: String,
    #[serde(default = "default_password")]
    pub password: String,
    /// Safety margin subtracted from the provider-declared token lifetime
    /// so renewal always happens before the provider would reject the
    /// token.
    #[serde(default = "default_token_margin", with = "humantime_serde")]
    pub token_margin: Duration,
    /// Timeout for token endpoint requests.
    #[serde(default = "default_request_timeout", with = "humantime_serde")]
    pub request_timeout: Duration,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            token_url: default_token_url(),
            client_id: default_client_id(),
            username: default_username(),
            password: default_password(),
            token_margin: default_token_margin(),
            request_timeout: default_request_timeout(),
        }
    }
}

/// DICOMweb archive (dcm4chee-arc style) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveSettings {
    /// Base URL of the archive, without the AE-title path.
    #[serde(default = "default_archive_url")]
    pub base_url: String,
    /// Application entity title the RS path is built from.
    #[serde(default = "default_aet")]
    pub aet: String,
    /// Window size for paginated full-collection fetches.
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// Timeout applied to every archive request.
    #[serde(default = "default_request_timeout", with = "humantime_serde")]
    pub request_timeout: Duration,
}

impl ArchiveSettings {
    /// The DICOMweb RS root for the configured AE title, e.g.
    /// `/dcm4chee-arc/aets/DCM4CHEE/rs`.
    pub fn rs_path(&self) -> String {
        format!("/dcm4chee-arc/aets/{}/rs", self.aet)
    }
}

impl Default for ArchiveSettings {
    fn default() -> Self {
        Self {
            base_url: default_archive_url(),
            aet: default_aet(),
            page_size: default_page_size(),
            request_timeout: default_request_timeout(),
        }
    }
}

/// Institution directory cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectorySettings {
    /// How long a built directory stays valid.
    #[serde(default = "default_directory_ttl", with = "humantime_serde")]
    pub ttl: Duration,
}

impl Default for DirectorySettings {
    fn default() -> Self {
        Self {
            ttl: default_directory_ttl(),
        }
    }
}

fn default_token_url() -> String {
    "https://localhost:8843/realms/dcm4che/protocol/openid-connect/token".to_string()
}

fn default_client_id() -> String {
    "dcm4chee-arc-ui".to_string()
}

fn default_username() -> String {
    "root".to_string()
}

fn default_password() -> String {
    "changeit".to_string()
}

fn default_token_margin() -> Duration {
    Duration::from_secs(30)
}

fn default_archive_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_aet() -> String {
    "DCM4CHEE".to_string()
}

fn default_page_size() -> usize {
    1000
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_directory_ttl() -> Duration {
    Duration::from_secs(300)
}
