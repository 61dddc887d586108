//! HTTP client adapter for the cloud load-balancer API.
//!
//! Identity authentication, service-catalog lookup, authenticated requests,
//! and linked-page iteration. Resource families live in `cloudlb-resources`.

pub mod identity;
pub mod observer;
pub mod pagination;
pub mod service;

use async_trait::async_trait;
use cloudlb_core::CloudLbResult;

pub use identity::{AuthOptions, Credential, IdentityClient, Session};
pub use observer::{NoopObserver, RequestObserver, TracingObserver};
pub use pagination::{Page, Pager};
pub use service::{ResponseBody, ServiceClient};

/// Abstraction for obtaining a token and service catalog from any source.
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(&self) -> CloudLbResult<Session>;
}
