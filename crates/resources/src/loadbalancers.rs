//! Load balancer lifecycle: create, show, list, delete.

use crate::lb_url;
use cloudlb_client::{Page, Pager, ResponseBody, ServiceClient};
use cloudlb_core::{CloudLbError, CloudLbResult, ListOpts, LoadBalancer, LoadBalancerCreateOpts};
use serde::{Deserialize, Serialize};
use url::Url;

/// Undecoded single-load-balancer response of [`create`] or [`get`].
#[derive(Debug, Clone)]
pub struct LoadBalancerResult {
    body: ResponseBody,
}

#[derive(Deserialize)]
struct Single {
    #[serde(rename = "loadBalancer")]
    load_balancer: LoadBalancer,
}

#[derive(Deserialize)]
struct Listing {
    #[serde(rename = "loadBalancers")]
    load_balancers: Vec<LoadBalancer>,
}

#[derive(Serialize)]
struct CreateBody<'a> {
    #[serde(rename = "loadBalancer")]
    load_balancer: &'a LoadBalancerCreateOpts,
}

impl LoadBalancerResult {
    pub fn new(body: ResponseBody) -> Self {
        Self { body }
    }

    pub fn extract(&self) -> CloudLbResult<LoadBalancer> {
        Ok(self.body.extract_into::<Single>()?.load_balancer)
    }
}

fn collection_url(client: &ServiceClient) -> Url {
    client.service_url(&["loadbalancers"])
}

fn validate(opts: &LoadBalancerCreateOpts) -> CloudLbResult<()> {
    if opts.name.trim().is_empty() {
        return Err(CloudLbError::InvalidInput(
            "load balancer name must not be empty".into(),
        ));
    }
    if opts.protocol.trim().is_empty() {
        return Err(CloudLbError::InvalidInput(
            "load balancer protocol must not be empty".into(),
        ));
    }
    if opts.port == 0 {
        return Err(CloudLbError::InvalidInput(
            "load balancer port must be between 1 and 65535".into(),
        ));
    }
    Ok(())
}

/// Provisions a load balancer. The service answers before the build
/// finishes, so the returned status is usually `BUILD`.
pub async fn create(
    client: &ServiceClient,
    opts: &LoadBalancerCreateOpts,
) -> CloudLbResult<LoadBalancerResult> {
    validate(opts)?;
    let body = client
        .post(
            collection_url(client),
            &CreateBody {
                load_balancer: opts,
            },
        )
        .await?;
    Ok(LoadBalancerResult::new(body))
}

pub async fn get(client: &ServiceClient, lb_id: u64) -> CloudLbResult<LoadBalancerResult> {
    let body = client.get(lb_url(client, lb_id, &[])).await?;
    Ok(LoadBalancerResult::new(body))
}

/// First-page URL for [`list`]; unset filters are left out.
pub fn list_url(client: &ServiceClient, opts: &ListOpts) -> Url {
    let mut url = collection_url(client);
    let pairs = opts.query_pairs();
    if !pairs.is_empty() {
        url.query_pairs_mut().extend_pairs(pairs);
    }
    url
}

/// Pager over all load balancers matching `opts`. Nothing is fetched
/// until the pager is driven.
pub fn list<'a>(client: &'a ServiceClient, opts: &ListOpts) -> Pager<'a> {
    Pager::new(client, list_url(client, opts))
}

/// Decodes one page produced by [`list`].
pub fn extract_load_balancers(page: &Page) -> CloudLbResult<Vec<LoadBalancer>> {
    Ok(page.body().extract_into::<Listing>()?.load_balancers)
}

pub async fn delete(client: &ServiceClient, lb_id: u64) -> CloudLbResult<()> {
    client.delete(lb_url(client, lb_id, &[])).await?;
    Ok(())
}
