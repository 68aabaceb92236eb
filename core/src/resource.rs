//! Generic resource handle: one logical backend resource and its request state.
//!
//! # Design
//! A `Resource<T, X>` wraps the CRUD lifecycle of one resource behind four
//! operations sharing one `ResourceState<T>`. Failures are soft: an operation
//! never returns `Err`, it records the error in the state and resolves to
//! `None` (or `false` for deletes). Callers that want a discriminated result
//! read `ResourceState::outcome` after the call.
//!
//! State lives in a `tokio::sync::watch` channel so views can `subscribe` and
//! re-render on every transition. Each operation publishes `loading` (clearing
//! data and error) before it starts and its own outcome when it settles. There
//! is no queuing: overlapping calls race and the last one to settle wins.
//!
//! A resource is mounted with a lifetime token. `unmount` cancels it, which
//! aborts every in-flight request; settlements after that point are dropped
//! and new operations resolve without network I/O.

use std::sync::Arc;

use serde::de::{DeserializeOwned, IgnoredAny};
use serde::Serialize;
use tokio::sync::watch;

use crate::cancel::CancelToken;
use crate::client::ApiClient;
use crate::endpoints::QueryParams;
use crate::error::ApiError;
use crate::http::HttpMethod;
use crate::transport::Transport;

/// The `{data, is_loading, error}` record tracked per resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceState<T> {
    pub data: Option<T>,
    pub is_loading: bool,
    pub error: Option<ApiError>,
}

impl<T> ResourceState<T> {
    pub fn idle() -> Self {
        Self {
            data: None,
            is_loading: false,
            error: None,
        }
    }

    pub fn loading() -> Self {
        Self {
            is_loading: true,
            ..Self::idle()
        }
    }

    pub fn succeeded(data: Option<T>) -> Self {
        Self {
            data,
            ..Self::idle()
        }
    }

    pub fn failed(error: ApiError) -> Self {
        Self {
            error: Some(error),
            ..Self::idle()
        }
    }

    /// Outcome of the most recent settled operation.
    ///
    /// `None` while idle or loading, and after a successful delete.
    pub fn outcome(&self) -> Option<Result<&T, &ApiError>> {
        if self.is_loading {
            return None;
        }
        match (&self.data, &self.error) {
            (_, Some(err)) => Some(Err(err)),
            (Some(data), None) => Some(Ok(data)),
            (None, None) => None,
        }
    }
}

impl<T> Default for ResourceState<T> {
    fn default() -> Self {
        Self::idle()
    }
}

/// Per-call options.
///
/// `path` only applies to `fetch_data`, where it overrides the mounted path.
/// Write operations take their path explicitly.
#[derive(Debug, Clone, Default)]
pub struct RequestConfig {
    pub path: Option<String>,
    pub query: Vec<(String, String)>,
    pub cancel: Option<CancelToken>,
}

impl RequestConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn param(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    /// Append every pair of a typed filter.
    pub fn query(mut self, params: &impl QueryParams) -> Self {
        self.query.extend(params.to_query());
        self
    }

    pub fn cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }
}

struct Shared<T, X> {
    client: Arc<ApiClient<X>>,
    path: Option<String>,
    state: watch::Sender<ResourceState<T>>,
    lifetime: CancelToken,
}

/// Handle to one resource. Clones share state and lifetime.
pub struct Resource<T, X> {
    shared: Arc<Shared<T, X>>,
}

impl<T, X> Clone for Resource<T, X> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T, X> Resource<T, X>
where
    T: DeserializeOwned + Clone + Send + Sync,
    X: Transport,
{
    /// Mount a resource, optionally bound to a default `fetch_data` path.
    pub fn mount(client: Arc<ApiClient<X>>, initial_path: Option<&str>) -> Self {
        Self::with_lifetime(client, initial_path, CancelToken::new())
    }

    /// Mount a resource whose lifetime ends when `scope` is cancelled.
    ///
    /// Lets a view unmount every resource it owns with one call.
    pub fn mount_in(
        scope: &CancelToken,
        client: Arc<ApiClient<X>>,
        initial_path: Option<&str>,
    ) -> Self {
        Self::with_lifetime(client, initial_path, scope.child())
    }

    fn with_lifetime(
        client: Arc<ApiClient<X>>,
        initial_path: Option<&str>,
        lifetime: CancelToken,
    ) -> Self {
        let (state, _) = watch::channel(ResourceState::idle());
        Self {
            shared: Arc::new(Shared {
                client,
                path: initial_path.map(str::to_string),
                state,
                lifetime,
            }),
        }
    }

    pub fn path(&self) -> Option<&str> {
        self.shared.path.as_deref()
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> ResourceState<T> {
        self.shared.state.borrow().clone()
    }

    /// Receiver notified on every state transition.
    pub fn subscribe(&self) -> watch::Receiver<ResourceState<T>> {
        self.shared.state.subscribe()
    }

    pub fn is_mounted(&self) -> bool {
        !self.shared.lifetime.is_cancelled()
    }

    /// Abort in-flight requests and stop publishing state.
    pub fn unmount(&self) {
        self.shared.lifetime.cancel();
    }

    /// GET the bound path, or `config.path` when given.
    ///
    /// Without either path the call fails as `MissingPath` and performs no I/O.
    #[must_use = "failures are only visible through the returned None and the state"]
    pub async fn fetch_data(&self, config: RequestConfig) -> Option<T> {
        let Some(path) = config.path.clone().or_else(|| self.shared.path.clone()) else {
            tracing::error!("no path provided for API request");
            self.settle(ResourceState::failed(ApiError::MissingPath));
            return None;
        };
        let result = self
            .execute::<T, ()>(HttpMethod::Get, &path, None, &config)
            .await?;
        self.settle_data(result)
    }

    #[must_use = "failures are only visible through the returned None and the state"]
    pub async fn post_data<B: Serialize + Sync + ?Sized>(
        &self,
        path: &str,
        body: &B,
        config: RequestConfig,
    ) -> Option<T> {
        let result = self
            .execute::<T, B>(HttpMethod::Post, path, Some(body), &config)
            .await?;
        self.settle_data(result)
    }

    #[must_use = "failures are only visible through the returned None and the state"]
    pub async fn put_data<B: Serialize + Sync + ?Sized>(
        &self,
        path: &str,
        body: &B,
        config: RequestConfig,
    ) -> Option<T> {
        let result = self
            .execute::<T, B>(HttpMethod::Put, path, Some(body), &config)
            .await?;
        self.settle_data(result)
    }

    /// DELETE `path`; `true` iff the server answered 2xx. Success clears `data`.
    #[must_use = "failures are only visible through the returned false and the state"]
    pub async fn delete_data(&self, path: &str, config: RequestConfig) -> bool {
        let Some(result) = self
            .execute::<IgnoredAny, ()>(HttpMethod::Delete, path, None, &config)
            .await
        else {
            return false;
        };
        match result {
            Ok(_) => {
                self.settle(ResourceState::succeeded(None));
                true
            }
            Err(err) => {
                self.settle(ResourceState::failed(err));
                false
            }
        }
    }

    /// Run one request. `None` means the resource is (or became) unmounted
    /// and the caller must leave the state alone.
    async fn execute<R, B>(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<&B>,
        config: &RequestConfig,
    ) -> Option<Result<R, ApiError>>
    where
        R: DeserializeOwned,
        B: Serialize + Sync + ?Sized,
    {
        let lifetime = &self.shared.lifetime;
        if lifetime.is_cancelled() {
            tracing::debug!(%method, path, "skipping request on unmounted resource");
            return None;
        }
        self.shared.state.send_replace(ResourceState::loading());

        let request = self
            .shared
            .client
            .request::<R, B>(method, path, body, &config.query, Some(lifetime));
        let result = match &config.cancel {
            None => request.await,
            Some(token) => {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => Err(ApiError::Cancelled),
                    result = request => result,
                }
            }
        };

        if lifetime.is_cancelled() {
            tracing::debug!(%method, path, "dropping result of unmounted resource");
            return None;
        }
        if let Err(err) = &result {
            tracing::warn!(%method, path, error = %err, "resource request failed");
        }
        Some(result)
    }

    fn settle_data(&self, result: Result<T, ApiError>) -> Option<T> {
        match result {
            Ok(data) => {
                self.settle(ResourceState::succeeded(Some(data.clone())));
                Some(data)
            }
            Err(err) => {
                self.settle(ResourceState::failed(err));
                None
            }
        }
    }

    fn settle(&self, state: ResourceState<T>) {
        if self.is_mounted() {
            self.shared.state.send_replace(state);
        }
    }
}
