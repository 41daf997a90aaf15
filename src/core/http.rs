//! HTTP implementation of [`CatalogApi`] on top of reqwest

use async_trait::async_trait;
use reqwest::{Client, Method, Response, Url};
use tracing::debug;

use crate::core::api::{ApiError, CatalogApi};
use crate::core::record::{Record, RecordId};
use crate::core::session::Draft;

/// Longest response body quoted in an error
const MAX_ERROR_BODY: usize = 300;

/// Catalog API client rooted at a base URL
#[derive(Debug, Clone)]
pub struct HttpCatalogApi {
    client: Client,
    base: Url,
}

impl HttpCatalogApi {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let invalid = |reason: String| ApiError::InvalidUrl {
            url: base_url.to_string(),
            reason,
        };

        let base = Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
        if base.cannot_be_a_base() || !matches!(base.scheme(), "http" | "https") {
            return Err(invalid("expected an http(s) URL".to_string()));
        }

        let client = Client::builder()
            .build()
            .map_err(|e| ApiError::Transport {
                url: base_url.to_string(),
                message: e.to_string(),
            })?;

        Ok(Self { client, base })
    }

    /// `{base}/{collection}` with an optional `/{id}`; segments are percent-encoded
    fn url(&self, collection: &str, id: Option<&RecordId>) -> Result<Url, ApiError> {
        let mut url = self.base.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|()| ApiError::InvalidUrl {
                url: self.base.to_string(),
                reason: "cannot be a base".to_string(),
            })?;
            segments.pop_if_empty().push(collection);
            if let Some(id) = id {
                segments.push(&id.to_string());
            }
        }
        Ok(url)
    }

    async fn send(
        &self,
        method: Method,
        url: Url,
        body: Option<&Draft>,
    ) -> Result<(Url, String), ApiError> {
        debug!(%method, %url, "request");
        let mut request = self.client.request(method, url.clone());
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| ApiError::Transport {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        let text = Self::handle_response(response, &url).await?;
        Ok((url, text))
    }

    /// Read the body and turn non-success statuses into errors
    async fn handle_response(response: Response, url: &Url) -> Result<String, ApiError> {
        let status = response.status();
        let text = response.text().await.map_err(|e| ApiError::Transport {
            url: url.to_string(),
            message: format!("failed to read response body: {}", e),
        })?;
        debug!(status = status.as_u16(), %url, "response");

        if !status.is_success() {
            let body = if text.len() > MAX_ERROR_BODY {
                let cut = (0..=MAX_ERROR_BODY)
                    .rev()
                    .find(|i| text.is_char_boundary(*i))
                    .unwrap_or(0);
                format!("{}... (truncated)", &text[..cut])
            } else {
                text
            };
            return Err(ApiError::Status {
                url: url.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        Ok(text)
    }

    fn decode<T: serde::de::DeserializeOwned>(url: &Url, text: &str) -> Result<T, ApiError> {
        serde_json::from_str(text).map_err(|e| ApiError::Decode {
            url: url.to_string(),
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl CatalogApi for HttpCatalogApi {
    async fn list(&self, collection: &str) -> Result<Vec<Record>, ApiError> {
        let url = self.url(collection, None)?;
        let (url, text) = self.send(Method::GET, url, None).await?;
        Self::decode(&url, &text)
    }

    async fn create(&self, collection: &str, body: &Draft) -> Result<Record, ApiError> {
        let url = self.url(collection, None)?;
        let (url, text) = self.send(Method::POST, url, Some(body)).await?;
        Self::decode(&url, &text)
    }

    async fn update(
        &self,
        collection: &str,
        id: &RecordId,
        patch: &Draft,
    ) -> Result<(), ApiError> {
        let url = self.url(collection, Some(id))?;
        self.send(Method::PATCH, url, Some(patch)).await?;
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &RecordId) -> Result<(), ApiError> {
        let url = self.url(collection, Some(id))?;
        self.send(Method::DELETE, url, None).await?;
        Ok(())
    }
}
