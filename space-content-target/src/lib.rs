//! Client for the personalization platform's admin api.
//!
//! [`TargetApi`] is the seam the aggregation depends on, [`TargetClient`] talks to the real api.

pub mod error;
pub mod http;
pub mod resource;
pub mod token;
pub mod types;

use core::future::Future;

use bytes::Bytes;
use hyper::header::{ACCEPT, AUTHORIZATION};
use hyper::{Method, Request};
pub use oauth2::AccessToken;
use serde_json::Value;
use space_content_config::TargetConfig;
use tracing::debug;

use crate::error::{HttpError, TargetError};
pub use crate::resource::{ApiVersion, Resource};
use crate::token::request_access_token;

pub trait TargetApi: Send + Sync {
    fn access_token(&self) -> impl Future<Output = Result<AccessToken, TargetError>> + Send;

    /// Returns the json document of `resource` as is, also for non-success statuses so the
    /// caller can inspect the error indicator.
    fn fetch(
        &self,
        resource: &Resource,
        token: &AccessToken,
    ) -> impl Future<Output = Result<Value, TargetError>> + Send;
}

#[derive(Clone)]
pub struct TargetClient {
    config: TargetConfig,
}

impl TargetClient {
    #[must_use]
    pub const fn new(config: TargetConfig) -> Self {
        Self { config }
    }

    fn url(&self, resource: &Resource) -> String {
        format!(
            "{}/{}{}",
            self.config.api_url.trim_end_matches('/'),
            self.config.tenant_id,
            resource.path()
        )
    }
}

impl TargetApi for TargetClient {
    async fn access_token(&self) -> Result<AccessToken, TargetError> {
        request_access_token(&self.config).await
    }

    async fn fetch(&self, resource: &Resource, token: &AccessToken) -> Result<Value, TargetError> {
        let url = self.url(resource);
        let request = Request::builder()
            .method(Method::GET)
            .uri(&url)
            .header(AUTHORIZATION, format!("Bearer {}", token.secret()))
            .header("x-api-key", &self.config.api_key)
            .header(ACCEPT, resource.version().accept_header())
            .body(Bytes::new())
            .map_err(HttpError::from)?;

        let response = http::send(request).await?;
        if !response.status().is_success() {
            debug!("{url} responded with {}", response.status());
        }

        serde_json::from_slice(response.body()).map_err(|source| TargetError::Json {
            path: resource.path(),
            source,
        })
    }
}
