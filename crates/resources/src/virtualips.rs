//! Virtual IPs through which a load balancer is reached.

use crate::{lb_url, with_id_params};
use cloudlb_client::ServiceClient;
use cloudlb_core::{CloudLbError, CloudLbResult, VirtualIp, VirtualIpCreateOpts};
use serde::Deserialize;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct VirtualIpList {
    virtual_ips: Vec<VirtualIp>,
}

pub async fn list(client: &ServiceClient, lb_id: u64) -> CloudLbResult<Vec<VirtualIp>> {
    let body = client.get(lb_url(client, lb_id, &["virtualips"])).await?;
    Ok(body.extract_into::<VirtualIpList>()?.virtual_ips)
}

/// Adds a VIP. Request and response are bare objects, not wrapped.
pub async fn create(
    client: &ServiceClient,
    lb_id: u64,
    opts: &VirtualIpCreateOpts,
) -> CloudLbResult<VirtualIp> {
    if opts.vip_type.is_none() && opts.id.is_none() {
        return Err(CloudLbError::InvalidInput(
            "virtual IP needs a type or the id of a shared virtual IP".into(),
        ));
    }

    let body = client
        .post(lb_url(client, lb_id, &["virtualips"]), opts)
        .await?;
    body.extract_into()
}

pub async fn delete(client: &ServiceClient, lb_id: u64, vip_id: u64) -> CloudLbResult<()> {
    let vip_id = vip_id.to_string();
    client
        .delete(lb_url(client, lb_id, &["virtualips", vip_id.as_str()]))
        .await?;
    Ok(())
}

pub async fn bulk_delete(client: &ServiceClient, lb_id: u64, ids: &[u64]) -> CloudLbResult<()> {
    let url = with_id_params(lb_url(client, lb_id, &["virtualips"]), ids)?;
    client.delete(url).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cloudlb_core::{IpVersion, VirtualIpType};
    use httpmock::Method::{DELETE, GET, POST};
    use httpmock::MockServer;
    use serde_json::json;

    #[tokio::test]
    async fn list_decodes_virtual_ips() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/loadbalancers/12/virtualips");
            then.status(200).json_body(json!({
                "virtualIps": [
                    {"id": 1000, "address": "206.10.10.210", "type": "PUBLIC", "ipVersion": "IPV4"},
                    {"id": 1001, "address": "2001:4801:79f1:1::1/64", "type": "PUBLIC", "ipVersion": "IPV6"}
                ]
            }));
        });

        let client = ServiceClient::new(&server.base_url(), "tok").unwrap();
        let vips = list(&client, 12).await.unwrap();
        assert_eq!(vips.len(), 2);
        assert_eq!(vips[1].ip_version, Some(IpVersion::Ipv6));
    }

    #[tokio::test]
    async fn create_sends_bare_object() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/loadbalancers/12/virtualips")
                .json_body(json!({"type": "PUBLIC", "ipVersion": "IPV6"}));
            then.status(202).json_body(json!({
                "id": 9000, "address": "2001:4801:79f1:1:1c1d:1::1", "type": "PUBLIC", "ipVersion": "IPV6"
            }));
        });

        let client = ServiceClient::new(&server.base_url(), "tok").unwrap();
        let vip = create(
            &client,
            12,
            &VirtualIpCreateOpts {
                vip_type: Some(VirtualIpType::Public),
                ip_version: Some(IpVersion::Ipv6),
                id: None,
            },
        )
        .await
        .unwrap();

        mock.assert();
        assert_eq!(vip.id, 9000);
    }

    #[tokio::test]
    async fn create_requires_type_or_shared_id() {
        let client = ServiceClient::new("http://127.0.0.1:9/", "tok").unwrap();
        let err = create(&client, 12, &VirtualIpCreateOpts::default())
            .await
            .unwrap_err();
        assert!(matches!(err, CloudLbError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn bulk_delete_sends_ids_in_query() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(DELETE)
                .path("/loadbalancers/12/virtualips")
                .query_param("id", "1000")
                .query_param("id", "1001");
            then.status(202);
        });

        let client = ServiceClient::new(&server.base_url(), "tok").unwrap();
        bulk_delete(&client, 12, &[1000, 1001]).await.unwrap();

        mock.assert();
    }
}
