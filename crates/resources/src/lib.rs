//! Resource families of the load-balancer API.
//!
//! Each module maps one REST collection to async functions taking a
//! [`ServiceClient`](cloudlb_client::ServiceClient).

pub mod accesslists;
pub mod loadbalancers;
pub mod nodes;
pub mod virtualips;

use cloudlb_core::{CloudLbError, CloudLbResult};
use url::Url;

/// Appends `id=<n>` for every distinct id, in first-seen order.
///
/// An empty set is rejected: without ids the same URL means "delete all".
pub(crate) fn with_id_params(mut url: Url, ids: &[u64]) -> CloudLbResult<Url> {
    if ids.is_empty() {
        return Err(CloudLbError::InvalidInput(
            "bulk delete requires at least one id".into(),
        ));
    }

    let mut seen = Vec::with_capacity(ids.len());
    {
        let mut query = url.query_pairs_mut();
        for id in ids {
            if seen.contains(id) {
                continue;
            }
            seen.push(*id);
            query.append_pair("id", &id.to_string());
        }
    }
    Ok(url)
}

/// `/loadbalancers/{lb_id}/<parts..>`
pub(crate) fn lb_url(client: &cloudlb_client::ServiceClient, lb_id: u64, parts: &[&str]) -> Url {
    let id = lb_id.to_string();
    let mut segments = vec!["loadbalancers", id.as_str()];
    segments.extend_from_slice(parts);
    client.service_url(&segments)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://lb.example.com/v1.0/1/loadbalancers/7/nodes").unwrap()
    }

    #[test]
    fn id_params_repeat_the_key() {
        let url = with_id_params(base(), &[1, 2]).unwrap();
        assert_eq!(url.query(), Some("id=1&id=2"));
    }

    #[test]
    fn id_params_drop_duplicates() {
        let url = with_id_params(base(), &[5, 3, 5]).unwrap();
        assert_eq!(url.query(), Some("id=5&id=3"));
    }

    #[test]
    fn empty_id_set_is_rejected() {
        let err = with_id_params(base(), &[]).unwrap_err();
        assert!(matches!(err, CloudLbError::InvalidInput(_)));
    }

    #[test]
    fn lb_url_scopes_to_load_balancer() {
        let client = cloudlb_client::ServiceClient::new("https://lb.example.com/v1.0/1", "t").unwrap();
        assert_eq!(
            lb_url(&client, 7, &["virtualips", "3"]).path(),
            "/v1.0/1/loadbalancers/7/virtualips/3"
        );
    }
}
