use std::time::Duration;

use anyhow::{bail, Context};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use shared::{
    domain::{NewProduct, Product, ProductId},
    error::ApiError,
    protocol::{FieldEdit, PRODUCTS_ROUTE},
};
use tracing::{debug, warn};
use url::Url;

use crate::{config::ClientSettings, error::SyncError};

/// The product CRUD service the catalog synchronizes against.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    async fn list(&self) -> Result<Vec<Product>, SyncError>;
    /// Success is decided by status alone; the created entity is returned
    /// when the response body carries one.
    async fn create(&self, product: &NewProduct) -> Result<Option<Product>, SyncError>;
    async fn update(
        &self,
        id: &ProductId,
        edit: &FieldEdit,
    ) -> Result<Option<Product>, SyncError>;
    async fn delete(&self, id: &ProductId) -> Result<(), SyncError>;
}

pub struct HttpRemoteStore {
    http: Client,
    base_url: Url,
    max_retries: u32,
    retry_delay: Duration,
}

impl HttpRemoteStore {
    pub fn new(settings: &ClientSettings) -> anyhow::Result<Self> {
        let base_url = Url::parse(&settings.server_url)
            .with_context(|| format!("invalid server url '{}'", settings.server_url))?;
        if base_url.cannot_be_a_base() {
            bail!("server url '{}' cannot carry a path", settings.server_url);
        }
        let http = Client::builder()
            .timeout(settings.request_timeout)
            .build()
            .context("failed to build http client")?;
        Ok(Self {
            http,
            base_url,
            max_retries: settings.max_retries,
            retry_delay: settings.retry_delay,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn products_url(&self) -> Url {
        let mut url = self.base_url.clone();
        url.set_path(PRODUCTS_ROUTE);
        url
    }

    fn product_url(&self, id: &ProductId) -> Url {
        let mut url = self.products_url();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.push(id.as_str());
        }
        url
    }

    /// Sends an idempotent request, retrying transport failures only.
    async fn send_with_retry(
        &self,
        build: impl Fn() -> RequestBuilder,
    ) -> Result<Response, SyncError> {
        let mut attempt = 0;
        loop {
            match build().send().await {
                Ok(response) => return Ok(response),
                Err(err) if attempt < self.max_retries => {
                    attempt += 1;
                    warn!(%err, attempt, max_retries = self.max_retries, "retrying request");
                    tokio::time::sleep(self.retry_delay).await;
                }
                Err(err) => return Err(SyncError::Network(err.to_string())),
            }
        }
    }
}

#[async_trait]
impl RemoteStore for HttpRemoteStore {
    async fn list(&self) -> Result<Vec<Product>, SyncError> {
        let url = self.products_url();
        let response = self.send_with_retry(|| self.http.get(url.clone())).await?;
        decode(ensure_success(response).await?).await
    }

    async fn create(&self, product: &NewProduct) -> Result<Option<Product>, SyncError> {
        let response = self
            .http
            .post(self.products_url())
            .json(product)
            .send()
            .await?;
        decode_entity(ensure_success(response).await?).await
    }

    async fn update(
        &self,
        id: &ProductId,
        edit: &FieldEdit,
    ) -> Result<Option<Product>, SyncError> {
        let url = self.product_url(id);
        let response = self
            .send_with_retry(|| self.http.patch(url.clone()).json(edit))
            .await?;
        decode_entity(ensure_success(response).await?).await
    }

    async fn delete(&self, id: &ProductId) -> Result<(), SyncError> {
        let url = self.product_url(id);
        let response = self.send_with_retry(|| self.http.delete(url.clone())).await?;
        ensure_success(response).await?;
        Ok(())
    }
}

async fn ensure_success(response: Response) -> Result<Response, SyncError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiError>(&body)
        .map(|err| err.message)
        .unwrap_or_else(|_| {
            if body.is_empty() {
                status.canonical_reason().unwrap_or_default().to_string()
            } else {
                body
            }
        });
    debug!(status = status.as_u16(), %message, "non-success response");
    Err(SyncError::Server {
        status: status.as_u16(),
        message,
    })
}

/// Reads a success body as `T` when it is one. Bare acknowledgements yield
/// `None` rather than an error.
async fn decode_entity<T: DeserializeOwned>(response: Response) -> Result<Option<T>, SyncError> {
    let body = response.text().await?;
    match serde_json::from_str::<T>(&body) {
        Ok(entity) => Ok(Some(entity)),
        Err(err) => {
            debug!(%err, "success response carried no entity");
            Ok(None)
        }
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, SyncError> {
    response
        .json::<T>()
        .await
        .map_err(|err| SyncError::Decode(err.to_string()))
}

#[cfg(test)]
#[path = "tests/remote_tests.rs"]
mod tests;
