//! Request/response hooks for [`ServiceClient`](crate::ServiceClient).

use reqwest::{Method, StatusCode};
use std::time::Duration;
use url::Url;

/// Receives one callback before each request and one after its status
/// line arrives. Transport failures produce no `on_response`.
pub trait RequestObserver: Send + Sync {
    fn on_request(&self, method: &Method, url: &Url);
    fn on_response(&self, method: &Method, url: &Url, status: StatusCode, elapsed: Duration);
}

/// Emits structured `tracing` events at debug level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl RequestObserver for TracingObserver {
    fn on_request(&self, method: &Method, url: &Url) {
        tracing::debug!(%method, %url, "request");
    }

    fn on_response(&self, method: &Method, url: &Url, status: StatusCode, elapsed: Duration) {
        tracing::debug!(
            %method,
            %url,
            status = status.as_u16(),
            elapsed_ms = elapsed.as_millis() as u64,
            "response"
        );
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl RequestObserver for NoopObserver {
    fn on_request(&self, _method: &Method, _url: &Url) {}

    fn on_response(&self, _method: &Method, _url: &Url, _status: StatusCode, _elapsed: Duration) {}
}
