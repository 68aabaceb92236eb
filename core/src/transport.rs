//! The I/O seam between `ApiClient` and the network.
//!
//! # Design
//! A `Transport` executes one `HttpRequest` and returns the `HttpResponse` as
//! data, whatever its status. Only failures that prevent a response from
//! existing (connection refused, DNS, broken pipe) become `ApiError::Transport`.
//! This mirrors a host-does-IO split: the client decides what a status means,
//! the transport only moves bytes.

use std::future::Future;
use std::time::Duration;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

pub trait Transport: Send + Sync {
    fn execute(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, ApiError>> + Send;
}

/// Blocking `ureq` agent driven from tokio's blocking pool.
///
/// Disables ureq's status-code-as-error behavior so 4xx/5xx responses come
/// back as data rather than `Err`.
///
/// Cancelling a request only stops the caller from waiting: the blocking call
/// keeps its pool thread until the server answers. Use `with_timeout` to bound
/// how long that can take; `new` sets no timeout.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        Self::build(None)
    }

    /// Fail any request, connect through body read, that runs past `timeout`.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::build(Some(timeout))
    }

    fn build(timeout: Option<Duration>) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(timeout)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn execute(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, ApiError>> + Send {
        let agent = self.agent.clone();
        async move {
            tokio::task::spawn_blocking(move || execute_blocking(&agent, request))
                .await
                .map_err(|e| ApiError::Transport(e.to_string()))?
        }
    }
}

fn execute_blocking(agent: &ureq::Agent, req: HttpRequest) -> Result<HttpResponse, ApiError> {
    let result = match req.method {
        HttpMethod::Get => with_headers(agent.get(&req.url), &req.headers).call(),
        HttpMethod::Delete => with_headers(agent.delete(&req.url), &req.headers).call(),
        HttpMethod::Post => {
            let builder = with_headers(agent.post(&req.url), &req.headers);
            match req.body {
                Some(body) => builder.send(body.as_bytes()),
                None => builder.send_empty(),
            }
        }
        HttpMethod::Put => {
            let builder = with_headers(agent.put(&req.url), &req.headers);
            match req.body {
                Some(body) => builder.send(body.as_bytes()),
                None => builder.send_empty(),
            }
        }
    };

    let mut response = result.map_err(|e| ApiError::Transport(e.to_string()))?;
    let status = response.status().as_u16();
    let headers = response
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect();
    let body = response
        .body_mut()
        .read_to_string()
        .map_err(|e| ApiError::Transport(e.to_string()))?;

    Ok(HttpResponse {
        status,
        headers,
        body,
    })
}

fn with_headers<B>(
    mut builder: ureq::RequestBuilder<B>,
    headers: &[(String, String)],
) -> ureq::RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}
