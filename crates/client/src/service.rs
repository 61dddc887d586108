//! Authenticated REST client scoped to one service endpoint.

use crate::observer::{RequestObserver, TracingObserver};
use cloudlb_core::{CloudLbError, CloudLbResult};
use reqwest::header::ACCEPT;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;

/// Request timeout applied unless overridden with [`ServiceClient::with_timeout`].
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const AUTH_TOKEN_HEADER: &str = "X-Auth-Token";

/// Raw body of a successful response. Decoding is deferred to the caller,
/// so a malformed payload surfaces as [`CloudLbError::Decode`] on extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseBody {
    bytes: Vec<u8>,
}

impl ResponseBody {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Decodes the body as JSON into `T`.
    pub fn extract_into<T: DeserializeOwned>(&self) -> CloudLbResult<T> {
        serde_json::from_slice(&self.bytes).map_err(|e| CloudLbError::Decode(e.to_string()))
    }
}

/// HTTP client bound to a resource base URL and an auth token.
///
/// ```ignore
/// let client = ServiceClient::new("https://dfw.loadbalancers.example.com/v1.0/1234", token)?;
/// let url = client.service_url(&["loadbalancers", "42"]);
/// let body = client.get(url).await?;
/// ```
#[derive(Clone)]
pub struct ServiceClient {
    http: reqwest::Client,
    endpoint: Url,
    token: String,
    observer: Arc<dyn RequestObserver>,
}

impl ServiceClient {
    pub fn new(endpoint: &str, token: impl Into<String>) -> CloudLbResult<Self> {
        Self::with_timeout(endpoint, token, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(
        endpoint: &str,
        token: impl Into<String>,
        timeout: Duration,
    ) -> CloudLbResult<Self> {
        let endpoint = normalize_base_url(endpoint)?;
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CloudLbError::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            endpoint,
            token: token.into(),
            observer: Arc::new(TracingObserver),
        })
    }

    /// Replaces the request observer (default: [`TracingObserver`]).
    pub fn with_observer(mut self, observer: Arc<dyn RequestObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Resource base URL, always ending in `/`.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Appends percent-encoded path segments to the base URL.
    pub fn service_url(&self, parts: &[&str]) -> Url {
        let mut url = self.endpoint.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(parts);
        }
        url
    }

    pub async fn get(&self, url: Url) -> CloudLbResult<ResponseBody> {
        self.send(Method::GET, url, None::<&()>).await
    }

    pub async fn post<B: Serialize + ?Sized>(
        &self,
        url: Url,
        body: &B,
    ) -> CloudLbResult<ResponseBody> {
        self.send(Method::POST, url, Some(body)).await
    }

    pub async fn delete(&self, url: Url) -> CloudLbResult<ResponseBody> {
        self.send(Method::DELETE, url, None::<&()>).await
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> CloudLbResult<ResponseBody> {
        self.observer.on_request(&method, &url);
        let started = Instant::now();

        let mut request = self
            .http
            .request(method.clone(), url.clone())
            .header(AUTH_TOKEN_HEADER, &self.token)
            .header(ACCEPT, "application/json");
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| CloudLbError::Transport(format!("{method} {url}: {e}")))?;

        let status = response.status();
        self.observer
            .on_response(&method, &url, status, started.elapsed());

        let bytes = response.bytes().await.map_err(|e| {
            CloudLbError::Transport(format!("failed to read response from {url}: {e}"))
        })?;

        if !status.is_success() {
            return Err(api_error(status, &bytes));
        }

        Ok(ResponseBody::new(bytes.to_vec()))
    }
}

impl std::fmt::Debug for ServiceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceClient")
            .field("endpoint", &self.endpoint.as_str())
            .finish_non_exhaustive()
    }
}

/// Parses `raw` as an http(s) base URL and guarantees a trailing slash.
pub(crate) fn normalize_base_url(raw: &str) -> CloudLbResult<Url> {
    let mut url = Url::parse(raw)
        .map_err(|e| CloudLbError::InvalidInput(format!("invalid endpoint '{raw}': {e}")))?;

    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
        return Err(CloudLbError::InvalidInput(format!(
            "endpoint '{raw}' must be an http(s) URL"
        )));
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Builds an [`CloudLbError::Api`] from a non-2xx response.
pub(crate) fn api_error(status: StatusCode, body: &[u8]) -> CloudLbError {
    CloudLbError::Api {
        status: status.as_u16(),
        message: error_message(status, body),
    }
}

/// The service reports faults either flat (`{"message": ..}`) or wrapped
/// in a fault name (`{"itemNotFound": {"message": ..}}`).
pub(crate) fn error_message(status: StatusCode, body: &[u8]) -> String {
    if let Ok(value) = serde_json::from_slice::<Value>(body) {
        if let Some(message) = value.get("message").and_then(Value::as_str) {
            return message.to_string();
        }
        if let Some(fault) = value.as_object() {
            let nested = fault
                .values()
                .find_map(|inner| inner.get("message").and_then(Value::as_str));
            if let Some(message) = nested {
                return message.to_string();
            }
        }
    }

    let text = String::from_utf8_lossy(body).trim().to_string();
    if text.is_empty() {
        format!("request failed with status {status}")
    } else {
        text
    }
}
