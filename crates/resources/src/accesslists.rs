//! Allow/deny rules attached to a load balancer.
//!
//! All operations target `/loadbalancers/{lb_id}/accesslist`.

use crate::{lb_url, with_id_params};
use cloudlb_client::{ResponseBody, ServiceClient};
use cloudlb_core::{AccessListCreateOpts, AccessListEntry, CloudLbError, CloudLbResult};
use serde::{Deserialize, Serialize};
use url::Url;

/// Undecoded response of [`get`]. Call [`extract`](Self::extract) for entries.
#[derive(Debug, Clone)]
pub struct GetResult {
    body: ResponseBody,
}

#[derive(Deserialize)]
struct AccessListEnvelope {
    #[serde(rename = "accessList")]
    access_list: Vec<AccessListEntry>,
}

#[derive(Serialize)]
struct CreateBody<'a> {
    #[serde(rename = "accessList")]
    access_list: &'a [AccessListCreateOpts],
}

impl GetResult {
    pub fn new(body: ResponseBody) -> Self {
        Self { body }
    }

    pub fn body(&self) -> &ResponseBody {
        &self.body
    }

    /// Entries in the order the service returned them.
    pub fn extract(&self) -> CloudLbResult<Vec<AccessListEntry>> {
        Ok(self.body.extract_into::<AccessListEnvelope>()?.access_list)
    }
}

pub fn access_list_url(client: &ServiceClient, lb_id: u64) -> Url {
    lb_url(client, lb_id, &["accesslist"])
}

/// URL removing the given entries, e.g. `.../accesslist?id=1&id=2`.
pub fn bulk_delete_url(client: &ServiceClient, lb_id: u64, ids: &[u64]) -> CloudLbResult<Url> {
    with_id_params(access_list_url(client, lb_id), ids)
}

/// Fetches the full access list of a load balancer.
pub async fn get(client: &ServiceClient, lb_id: u64) -> CloudLbResult<GetResult> {
    let body = client.get(access_list_url(client, lb_id)).await?;
    Ok(GetResult::new(body))
}

/// Appends `entries` to the access list. The service assigns ids.
pub async fn create(
    client: &ServiceClient,
    lb_id: u64,
    entries: &[AccessListCreateOpts],
) -> CloudLbResult<()> {
    if entries.is_empty() {
        return Err(CloudLbError::InvalidInput(
            "access list create requires at least one entry".into(),
        ));
    }
    if let Some(blank) = entries.iter().find(|e| e.address.trim().is_empty()) {
        return Err(CloudLbError::InvalidInput(format!(
            "access list entry of type {} has an empty address",
            blank.access_type
        )));
    }

    let body = CreateBody {
        access_list: entries,
    };
    client.post(access_list_url(client, lb_id), &body).await?;
    tracing::debug!(lb_id, entries = entries.len(), "access list entries submitted");
    Ok(())
}

/// Removes every entry. Irreversible.
pub async fn delete_all(client: &ServiceClient, lb_id: u64) -> CloudLbResult<()> {
    client.delete(access_list_url(client, lb_id)).await?;
    Ok(())
}

/// Removes the listed entries in one request.
pub async fn bulk_delete(client: &ServiceClient, lb_id: u64, ids: &[u64]) -> CloudLbResult<()> {
    let url = bulk_delete_url(client, lb_id, ids)?;
    client.delete(url).await?;
    Ok(())
}

/// Removes a single entry.
pub async fn delete(client: &ServiceClient, lb_id: u64, entry_id: u64) -> CloudLbResult<()> {
    let entry_id = entry_id.to_string();
    let url = lb_url(client, lb_id, &["accesslist", entry_id.as_str()]);
    client.delete(url).await?;
    Ok(())
}
