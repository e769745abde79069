use async_trait::async_trait;
use reqwest::{Client, Response};
use serde_json::Value;
use shared::{domain::ResourceId, error::ErrorBody, protocol::StatusUpdateRequest};
use tracing::debug;
use url::Url;

use crate::{config::ApiConfig, error::TransportError};

/// REST surface of a paginated collection.
#[async_trait]
pub trait CollectionApi: Send + Sync {
    /// `GET /{collection}?page={page}`; the body is returned unvalidated.
    async fn fetch_page(&self, collection: &str, page: u32) -> Result<Value, TransportError>;

    /// `GET /{collection}` for collections served whole, such as categories.
    async fn list(&self, collection: &str) -> Result<Value, TransportError>;

    /// `PATCH /{collection}/{id}` with `{ "status": ... }`.
    async fn update_status(
        &self,
        collection: &str,
        id: &ResourceId,
        request: &StatusUpdateRequest,
    ) -> Result<(), TransportError>;

    /// `DELETE /{collection}/{id}`.
    async fn delete(&self, collection: &str, id: &ResourceId) -> Result<(), TransportError>;
}

pub struct HttpCollectionApi {
    http: Client,
    base_url: Url,
}

impl HttpCollectionApi {
    pub fn new(config: &ApiConfig) -> Result<Self, TransportError> {
        let http = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self {
            http,
            base_url: config.base_url.clone(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, TransportError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| TransportError::CannotBeABase(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

#[async_trait]
impl CollectionApi for HttpCollectionApi {
    async fn fetch_page(&self, collection: &str, page: u32) -> Result<Value, TransportError> {
        let url = self.endpoint(&[collection])?;
        debug!(%url, page, "GET collection page");
        let res = self
            .http
            .get(url)
            .query(&[("page", page)])
            .send()
            .await?;
        read_json(res).await
    }

    async fn list(&self, collection: &str) -> Result<Value, TransportError> {
        let url = self.endpoint(&[collection])?;
        debug!(%url, "GET collection");
        let res = self.http.get(url).send().await?;
        read_json(res).await
    }

    async fn update_status(
        &self,
        collection: &str,
        id: &ResourceId,
        request: &StatusUpdateRequest,
    ) -> Result<(), TransportError> {
        let url = self.endpoint(&[collection, id.as_str()])?;
        debug!(%url, status = %request.status, "PATCH item status");
        let res = self.http.patch(url).json(request).send().await?;
        ensure_success(res).await?;
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &ResourceId) -> Result<(), TransportError> {
        let url = self.endpoint(&[collection, id.as_str()])?;
        debug!(%url, "DELETE item");
        let res = self.http.delete(url).send().await?;
        ensure_success(res).await?;
        Ok(())
    }
}

async fn read_json(res: Response) -> Result<Value, TransportError> {
    let res = ensure_success(res).await?;
    let body = res.text().await?;
    Ok(serde_json::from_str(&body)?)
}

async fn ensure_success(res: Response) -> Result<Response, TransportError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }

    let body = res.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(ErrorBody::into_message)
        .or_else(|| status.canonical_reason().map(str::to_string))
        .unwrap_or_else(|| "request rejected".to_string());
    Err(TransportError::Status {
        status: status.as_u16(),
        message,
    })
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
