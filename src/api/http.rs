//! Implements the `Transport` trait over HTTP using `reqwest`.

use crate::api::{Res, Transport};
use crate::error::TransportErrorKind;
use crate::Result;
use anyhow::Context;
use reqwest::{Client, RequestBuilder, Response};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, trace};
use url::Url;

/// Sends each call as exactly one HTTP request. There are no retries; a per-request timeout is the
/// only limit applied.
pub struct HttpTransport {
    base_url: Url,
    client: Client,
}

impl HttpTransport {
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            base_url: with_trailing_slash(base_url),
            client,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, path: &str) -> Res<Url> {
        self.base_url
            .join(path)
            .map_err(|e| TransportErrorKind::Network(format!("invalid request path '{path}': {e}")))
    }

    async fn send(&self, request: RequestBuilder) -> Res<Response> {
        let response = request
            .send()
            .await
            .map_err(|e| TransportErrorKind::Network(e.to_string()))?;
        let status = response.status();
        trace!("Response status {status}");
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read response body".to_string());
            return Err(TransportErrorKind::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn send_json(&self, request: RequestBuilder) -> Res<Value> {
        let response = self.send(request).await?;
        let value: Value = response
            .json()
            .await
            .map_err(|e| TransportErrorKind::Decode(e.to_string()))?;
        trace!("Response body {value}");
        Ok(value)
    }
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
    async fn get(&self, path: &str) -> Res<Value> {
        let url = self.url(path)?;
        debug!("GET {url}");
        self.send_json(self.client.get(url)).await
    }

    async fn post(&self, path: &str, body: Value) -> Res<Value> {
        let url = self.url(path)?;
        debug!("POST {url}");
        trace!("Request body {body}");
        self.send_json(self.client.post(url).json(&body)).await
    }

    async fn put(&self, path: &str, body: Value) -> Res<Value> {
        let url = self.url(path)?;
        debug!("PUT {url}");
        trace!("Request body {body}");
        self.send_json(self.client.put(url).json(&body)).await
    }

    async fn delete(&self, path: &str) -> Res<()> {
        let url = self.url(path)?;
        debug!("DELETE {url}");
        // The body, if any, is ignored.
        let _ = self.send(self.client.delete(url)).await?;
        Ok(())
    }
}

/// `Url::join` replaces the last path segment unless the base ends in `/`.
fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}
