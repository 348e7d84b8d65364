//! Store configuration loaded via OrthoConfig.
//!
//! Values come from `RECIPE_STORE_*` environment variables, configuration
//! files and command-line flags in OrthoConfig's usual precedence order.

use std::path::PathBuf;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
const DEFAULT_STORAGE_DIR: &str = ".recipe-store";

/// Errors raised while interpreting loaded settings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    /// The backend base URL did not parse.
    #[error("invalid backend base URL {value:?}: {message}")]
    InvalidBaseUrl {
        /// Raw configured value.
        value: String,
        /// Parser diagnostic.
        message: String,
    },
    /// The backend base URL used a scheme other than HTTP(S).
    #[error("backend base URL must use http or https, got {scheme:?}")]
    UnsupportedScheme {
        /// Offending scheme.
        scheme: String,
    },
}

/// Settings that select the synchronisation mode and its adapters.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "RECIPE_STORE")]
pub struct StoreSettings {
    /// Base URL of the recipe backend. When absent the store runs local-only.
    pub backend_base_url: Option<String>,
    /// Per-request timeout for backend calls, in seconds.
    pub request_timeout_secs: Option<u64>,
    /// Directory holding the session and local recipe snapshots.
    pub storage_dir: Option<PathBuf>,
}

impl StoreSettings {
    /// Parsed backend base URL, or `None` for local-only mode.
    ///
    /// Blank values count as unset.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] when the value is not an HTTP(S) URL.
    pub fn backend_base_url(&self) -> Result<Option<Url>, SettingsError> {
        let Some(raw) = self
            .backend_base_url
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
        else {
            return Ok(None);
        };

        let url = Url::parse(raw).map_err(|error| SettingsError::InvalidBaseUrl {
            value: raw.to_owned(),
            message: error.to_string(),
        })?;
        match url.scheme() {
            "http" | "https" => Ok(Some(url)),
            other => Err(SettingsError::UnsupportedScheme {
                scheme: other.to_owned(),
            }),
        }
    }

    /// Configured request timeout, falling back to ten seconds.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(
            self.request_timeout_secs
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        )
    }

    /// Configured snapshot directory, falling back to `./.recipe-store`.
    #[must_use]
    pub fn storage_dir(&self) -> PathBuf {
        self.storage_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORAGE_DIR))
    }
}
