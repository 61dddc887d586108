//! Identity v2.0 token authentication and service-catalog lookup.
//!
//! ```ignore
//! let identity = IdentityClient::new(AuthOptions::from_env()?)?;
//! let session = identity.authenticate().await?;
//! let client = session.load_balancer_client(Some("DFW"))?;
//! ```

use crate::service::{api_error, error_message, normalize_base_url, ResponseBody, ServiceClient};
use crate::Authenticator;
use async_trait::async_trait;
use cloudlb_core::{CloudLbError, CloudLbResult};
use reqwest::header::ACCEPT;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::fmt;
use std::time::Duration;
use url::Url;

/// Catalog service type of the load-balancer API.
pub const LOAD_BALANCER_SERVICE_TYPE: &str = "rax:load-balancer";

const IDENTITY_TIMEOUT: Duration = Duration::from_secs(30);

/// Secret half of the credentials.
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    Password(String),
    /// Provider API key (`RAX-KSKEY:apiKeyCredentials`).
    ApiKey(String),
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Password(_) => f.write_str("Password(<redacted>)"),
            Self::ApiKey(_) => f.write_str("ApiKey(<redacted>)"),
        }
    }
}

/// Everything needed to request a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthOptions {
    /// Identity v2.0 root, e.g. `https://identity.example.com/v2.0/`.
    pub auth_url: String,
    pub username: String,
    pub credential: Credential,
    pub tenant_id: Option<String>,
    pub tenant_name: Option<String>,
}

impl AuthOptions {
    /// Reads `OS_AUTH_URL`, `OS_USERNAME`, `OS_PASSWORD` or `OS_API_KEY`,
    /// and optionally `OS_TENANT_ID` / `OS_TENANT_NAME`.
    pub fn from_env() -> CloudLbResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) over an arbitrary variable source.
    /// Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> CloudLbResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.is_empty());

        let auth_url = var("OS_AUTH_URL").ok_or_else(|| missing("OS_AUTH_URL"))?;
        let username = var("OS_USERNAME").ok_or_else(|| missing("OS_USERNAME"))?;
        let credential = match (var("OS_PASSWORD"), var("OS_API_KEY")) {
            (Some(password), _) => Credential::Password(password),
            (None, Some(key)) => Credential::ApiKey(key),
            (None, None) => return Err(missing("OS_PASSWORD")),
        };

        Ok(Self {
            auth_url,
            username,
            credential,
            tenant_id: var("OS_TENANT_ID"),
            tenant_name: var("OS_TENANT_NAME"),
        })
    }

    /// v2.0 token request body.
    pub fn request_body(&self) -> Value {
        let mut auth = Map::new();
        match &self.credential {
            Credential::Password(password) => {
                auth.insert(
                    "passwordCredentials".into(),
                    json!({"username": self.username, "password": password}),
                );
            }
            Credential::ApiKey(key) => {
                auth.insert(
                    "RAX-KSKEY:apiKeyCredentials".into(),
                    json!({"username": self.username, "apiKey": key}),
                );
            }
        }
        if let Some(id) = &self.tenant_id {
            auth.insert("tenantId".into(), json!(id));
        }
        if let Some(name) = &self.tenant_name {
            auth.insert("tenantName".into(), json!(name));
        }
        json!({ "auth": auth })
    }

    fn tokens_url(&self) -> CloudLbResult<Url> {
        normalize_base_url(&self.auth_url)?
            .join("tokens")
            .map_err(|e| CloudLbError::Auth(format!("invalid OS_AUTH_URL: {e}")))
    }
}

fn missing(name: &str) -> CloudLbError {
    CloudLbError::Auth(format!("missing environment variable [{name}]"))
}

// ---------------------------------------------------------------------------
// Service catalog
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CatalogEntry {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub service_type: String,
    #[serde(default)]
    pub endpoints: Vec<Endpoint>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Endpoint {
    #[serde(default)]
    pub region: Option<String>,
    #[serde(rename = "publicURL")]
    pub public_url: String,
}

#[derive(Deserialize)]
struct TokenResponse {
    access: Access,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Access {
    token: Token,
    #[serde(default)]
    service_catalog: Vec<CatalogEntry>,
}

#[derive(Deserialize)]
struct Token {
    id: String,
}

/// An issued token plus the catalog that came with it.
#[derive(Clone)]
pub struct Session {
    token: String,
    catalog: Vec<CatalogEntry>,
}

impl Session {
    pub fn new(token: impl Into<String>, catalog: Vec<CatalogEntry>) -> Self {
        Self {
            token: token.into(),
            catalog,
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn catalog(&self) -> &[CatalogEntry] {
        &self.catalog
    }

    /// Finds the single endpoint of `service_type`, narrowed by `region`
    /// (case-insensitive) when given. None or several matches is an error.
    pub fn locate(&self, service_type: &str, region: Option<&str>) -> CloudLbResult<&Endpoint> {
        let matches: Vec<&Endpoint> = self
            .catalog
            .iter()
            .filter(|entry| entry.service_type == service_type)
            .flat_map(|entry| entry.endpoints.iter())
            .filter(|endpoint| match (region, endpoint.region.as_deref()) {
                (None, _) => true,
                (Some(wanted), Some(actual)) => wanted.eq_ignore_ascii_case(actual),
                (Some(_), None) => false,
            })
            .collect();

        let region_label = region.unwrap_or("any region");
        match matches.as_slice() {
            [endpoint] => Ok(*endpoint),
            [] => Err(CloudLbError::Auth(format!(
                "no {service_type} endpoint found in {region_label}"
            ))),
            many => Err(CloudLbError::Auth(format!(
                "discovered {} {service_type} endpoints in {region_label}; specify a region",
                many.len()
            ))),
        }
    }

    /// Builds a client for the load-balancer service.
    pub fn load_balancer_client(&self, region: Option<&str>) -> CloudLbResult<ServiceClient> {
        let endpoint = self.locate(LOAD_BALANCER_SERVICE_TYPE, region)?;
        tracing::info!(url = %endpoint.public_url, region = ?endpoint.region, "using load balancer endpoint");
        ServiceClient::new(&endpoint.public_url, self.token.clone())
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &"<redacted>")
            .field("catalog", &self.catalog)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Identity client
// ---------------------------------------------------------------------------

/// Requests tokens from an identity v2.0 service.
pub struct IdentityClient {
    http: reqwest::Client,
    options: AuthOptions,
}

impl IdentityClient {
    pub fn new(options: AuthOptions) -> CloudLbResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(IDENTITY_TIMEOUT)
            .build()
            .map_err(|e| CloudLbError::Transport(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { http, options })
    }
}

#[async_trait]
impl Authenticator for IdentityClient {
    async fn authenticate(&self) -> CloudLbResult<Session> {
        let url = self.options.tokens_url()?;
        tracing::debug!(%url, username = %self.options.username, "requesting token");

        let response = self
            .http
            .post(url.clone())
            .header(ACCEPT, "application/json")
            .json(&self.options.request_body())
            .send()
            .await
            .map_err(|e| CloudLbError::Transport(format!("POST {url}: {e}")))?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(|e| {
            CloudLbError::Transport(format!("failed to read response from {url}: {e}"))
        })?;

        if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            return Err(CloudLbError::Auth(format!(
                "identity service rejected credentials: {}",
                error_message(status, &bytes)
            )));
        }
        if !status.is_success() {
            return Err(api_error(status, &bytes));
        }

        let parsed: TokenResponse = ResponseBody::new(bytes.to_vec()).extract_into()?;
        tracing::info!(
            username = %self.options.username,
            services = parsed.access.service_catalog.len(),
            "authenticated"
        );
        Ok(Session::new(
            parsed.access.token.id,
            parsed.access.service_catalog,
        ))
    }
}
