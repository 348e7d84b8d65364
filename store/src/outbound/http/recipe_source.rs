//! Reqwest-backed recipe collection adapter.
//!
//! This adapter owns transport details only: URL construction, timeout and
//! HTTP status mapping, and JSON encoding and decoding.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::dto::{CreateRecipeDto, FavoriteDto};
use crate::domain::ports::{NewRecipe, RecipeSource, RecipeSourceError};
use crate::domain::{Recipe, RecipeId};

const COLLECTION_PATH: [&str; 2] = ["api", "recipes"];

/// Recipe source that talks to `{base_url}/api/recipes`.
pub struct HttpRecipeSource {
    client: Client,
    base_url: Url,
}

impl HttpRecipeSource {
    /// Build an adapter using a reqwest client with an explicit request timeout.
    /// ```rust,ignore
    /// let source = HttpRecipeSource::new(Url::parse("http://localhost:3000")?, timeout)?;
    /// ```
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(base_url, client))
    }

    /// Build an adapter around a preconfigured client.
    #[must_use]
    pub const fn with_client(base_url: Url, client: Client) -> Self {
        Self { client, base_url }
    }

    fn endpoint(&self, tail: &[&str]) -> Result<Url, RecipeSourceError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                RecipeSourceError::transport(format!("{} cannot be used as a base URL", self.base_url))
            })?
            .pop_if_empty()
            .extend(COLLECTION_PATH)
            .extend(tail);
        Ok(url)
    }

    fn request(&self, method: Method, tail: &[&str]) -> Result<RequestBuilder, RecipeSourceError> {
        let url = self.endpoint(tail)?;
        debug!(%method, %url, "recipe source request");
        Ok(self
            .client
            .request(method, url)
            .header(reqwest::header::ACCEPT, "application/json"))
    }
}

#[async_trait]
impl RecipeSource for HttpRecipeSource {
    async fn list(&self) -> Result<Vec<Recipe>, RecipeSourceError> {
        let request = self.request(Method::GET, &[])?;
        decode(send(request).await?.as_ref())
    }

    async fn create(&self, recipe: &NewRecipe) -> Result<Recipe, RecipeSourceError> {
        let request = self
            .request(Method::POST, &[])?
            .json(&CreateRecipeDto::from(recipe));
        decode(send(request).await?.as_ref())
    }

    async fn update(&self, id: &RecipeId, recipe: &Recipe) -> Result<Recipe, RecipeSourceError> {
        let request = self.request(Method::PUT, &[id.as_ref()])?.json(recipe);
        decode(send(request).await?.as_ref())
    }

    async fn set_favorite(
        &self,
        id: &RecipeId,
        is_favorite: bool,
    ) -> Result<Recipe, RecipeSourceError> {
        let request = self
            .request(Method::PATCH, &[id.as_ref(), "favorite"])?
            .json(&FavoriteDto { is_favorite });
        decode(send(request).await?.as_ref())
    }

    async fn delete(&self, id: &RecipeId) -> Result<(), RecipeSourceError> {
        let request = self.request(Method::DELETE, &[id.as_ref()])?;
        send(request).await?;
        Ok(())
    }
}

async fn send(request: RequestBuilder) -> Result<Vec<u8>, RecipeSourceError> {
    let response = request.send().await.map_err(|error| map_transport_error(&error))?;
    let status = response.status();
    let body = response.bytes().await.map_err(|error| map_transport_error(&error))?;
    if !status.is_success() {
        return Err(map_status_error(status, body.as_ref()));
    }
    Ok(body.to_vec())
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, RecipeSourceError> {
    serde_json::from_slice(body).map_err(|error| {
        RecipeSourceError::decode(format!(
            "invalid recipe JSON payload: {error} (body: {})",
            body_preview(body)
        ))
    })
}

fn map_transport_error(error: &reqwest::Error) -> RecipeSourceError {
    if error.is_timeout() {
        RecipeSourceError::timeout(error.to_string())
    } else if error.is_decode() {
        RecipeSourceError::decode(error.to_string())
    } else {
        RecipeSourceError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> RecipeSourceError {
    let preview = body_preview(body);
    let message = if preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {preview}", status.as_u16())
    };

    match status {
        StatusCode::NOT_FOUND => RecipeSourceError::not_found(message),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            RecipeSourceError::timeout(message)
        }
        _ if status.is_client_error() => RecipeSourceError::rejected(message),
        _ => RecipeSourceError::transport(message),
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
