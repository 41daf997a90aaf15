//! The remote catalog API seen from the client
//!
//! Every entity lives under its own collection path and supports the same four
//! verbs. The [`CatalogApi`] trait is the seam between the list component and
//! the network; [`crate::core::http::HttpCatalogApi`] is the real
//! implementation.

use async_trait::async_trait;
use thiserror::Error;

use crate::core::record::{Record, RecordId};
use crate::core::session::Draft;

/// Failures talking to the catalog API
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    #[error("invalid API URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("HTTP {status} from {url}{}", body_suffix(.body))]
    Status {
        url: String,
        status: u16,
        body: String,
    },

    #[error("unexpected response from {url}: {message}")]
    Decode { url: String, message: String },
}

fn body_suffix(body: &str) -> String {
    if body.trim().is_empty() {
        String::new()
    } else {
        format!(": {}", body.trim())
    }
}

/// REST verbs on a catalog collection
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// `GET /{collection}`: the full collection in server order
    async fn list(&self, collection: &str) -> Result<Vec<Record>, ApiError>;

    /// `POST /{collection}`: returns the created record with its identity
    async fn create(&self, collection: &str, body: &Draft) -> Result<Record, ApiError>;

    /// `PATCH /{collection}/{id}`: only the status is consumed
    async fn update(&self, collection: &str, id: &RecordId, patch: &Draft)
        -> Result<(), ApiError>;

    /// `DELETE /{collection}/{id}`
    async fn delete(&self, collection: &str, id: &RecordId) -> Result<(), ApiError>;
}
