//! Shared HTTP client binding for the clinic API.
//!
//! # Design
//! `ApiClient` holds the `ClientConfig` and a `Transport`, and carries no
//! mutable state between calls. Every call is split in three steps:
//! `build_request` produces an `HttpRequest`, the transport executes it, and
//! `parse_response` consumes the `HttpResponse`. There is no retry and no
//! timeout; the only way to stop a call early is its `CancelToken`.
//!
//! The client is constructed explicitly and shared through `Arc` by every
//! resource that needs it, so headers and base URL stay in one place.

use serde::de::DeserializeOwned;
use serde::Serialize;
use url::form_urlencoded;

use crate::cancel::CancelToken;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::transport::Transport;

#[derive(Debug, Clone)]
pub struct ApiClient<X> {
    config: ClientConfig,
    transport: X,
}

impl<X: Transport> ApiClient<X> {
    pub fn new(config: ClientConfig, transport: X) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &X {
        &self.transport
    }

    /// Build a request for `path` relative to the base URL.
    ///
    /// Absolute `http://` / `https://` paths are used as is. Query pairs are
    /// form-urlencoded and appended to whatever query `path` already has.
    pub fn build_request<B: Serialize + ?Sized>(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<&B>,
        query: &[(String, String)],
    ) -> Result<HttpRequest, ApiError> {
        let mut url = if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else if path.starts_with('/') {
            format!("{}{path}", self.config.base_url())
        } else {
            format!("{}/{path}", self.config.base_url())
        };

        if !query.is_empty() {
            let encoded = form_urlencoded::Serializer::new(String::new())
                .extend_pairs(query.iter().map(|(k, v)| (k.as_str(), v.as_str())))
                .finish();
            url.push(if url.contains('?') { '&' } else { '?' });
            url.push_str(&encoded);
        }

        let body = body
            .map(|b| serde_json::to_string(b).map_err(|e| ApiError::Serialization(e.to_string())))
            .transpose()?;

        Ok(HttpRequest {
            method,
            url,
            headers: self.config.default_headers().to_vec(),
            body,
        })
    }

    /// Execute a request, racing the transport against `cancel`.
    pub async fn send(
        &self,
        request: HttpRequest,
        cancel: Option<&CancelToken>,
    ) -> Result<HttpResponse, ApiError> {
        let Some(cancel) = cancel else {
            return self.transport.execute(request).await;
        };
        if cancel.is_cancelled() {
            return Err(ApiError::Cancelled);
        }
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ApiError::Cancelled),
            response = self.transport.execute(request) => response,
        }
    }

    /// Build, execute and parse one request.
    pub async fn request<T, B>(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<&B>,
        query: &[(String, String)],
        cancel: Option<&CancelToken>,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let request = self.build_request(method, path, body, query)?;
        tracing::debug!(method = %request.method, url = %request.url, "sending request");
        let response = self.send(request, cancel).await?;
        tracing::debug!(status = response.status, "received response");
        parse_response(response)
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> Result<T, ApiError> {
        self.request::<T, ()>(HttpMethod::Get, path, None, query, None)
            .await
    }

    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(HttpMethod::Post, path, Some(body), &[], None)
            .await
    }

    pub async fn put<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(HttpMethod::Put, path, Some(body), &[], None)
            .await
    }

    /// DELETE `path`, discarding whatever body the server returns.
    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.request::<serde_json::Value, ()>(HttpMethod::Delete, path, None, &[], None)
            .await
            .map(|_| ())
    }
}

/// Map a response to `T`, or to the matching `ApiError` for non-2xx statuses.
///
/// An empty 2xx body decodes as JSON `null`, so `()` and `Option<_>` targets
/// accept 204 responses.
pub fn parse_response<T: DeserializeOwned>(response: HttpResponse) -> Result<T, ApiError> {
    check_status(&response)?;
    let body = if response.body.trim().is_empty() {
        "null"
    } else {
        response.body.as_str()
    };
    serde_json::from_str(body).map_err(|e| ApiError::Deserialization(e.to_string()))
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    if response.status == 404 {
        return Err(ApiError::NotFound);
    }
    Err(ApiError::Http {
        status: response.status,
        body: error_detail(&response.body),
    })
}

/// Prefer the `detail` message of a FastAPI-style error body.
fn error_detail(body: &str) -> String {
    #[derive(serde::Deserialize)]
    struct ErrorBody {
        detail: String,
    }

    serde_json::from_str::<ErrorBody>(body)
        .map(|e| e.detail)
        .unwrap_or_else(|_| body.to_string())
}
