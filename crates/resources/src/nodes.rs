//! Back-end nodes of a load balancer.

use crate::{lb_url, with_id_params};
use cloudlb_client::ServiceClient;
use cloudlb_core::{CloudLbError, CloudLbResult, Node, NodeCreateOpts};
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
struct NodeList {
    nodes: Vec<Node>,
}

#[derive(Deserialize)]
struct SingleNode {
    node: Node,
}

#[derive(Serialize)]
struct CreateBody<'a> {
    nodes: &'a [NodeCreateOpts],
}

pub async fn list(client: &ServiceClient, lb_id: u64) -> CloudLbResult<Vec<Node>> {
    let body = client.get(lb_url(client, lb_id, &["nodes"])).await?;
    Ok(body.extract_into::<NodeList>()?.nodes)
}

pub async fn get(client: &ServiceClient, lb_id: u64, node_id: u64) -> CloudLbResult<Node> {
    let node_id = node_id.to_string();
    let body = client
        .get(lb_url(client, lb_id, &["nodes", node_id.as_str()]))
        .await?;
    Ok(body.extract_into::<SingleNode>()?.node)
}

/// Adds nodes and returns them as created, ids included.
pub async fn create(
    client: &ServiceClient,
    lb_id: u64,
    opts: &[NodeCreateOpts],
) -> CloudLbResult<Vec<Node>> {
    if opts.is_empty() {
        return Err(CloudLbError::InvalidInput(
            "node create requires at least one node".into(),
        ));
    }
    for node in opts {
        if node.address.trim().is_empty() || node.port == 0 {
            return Err(CloudLbError::InvalidInput(format!(
                "node '{}:{}' needs an address and a non-zero port",
                node.address, node.port
            )));
        }
    }

    let body = client
        .post(lb_url(client, lb_id, &["nodes"]), &CreateBody { nodes: opts })
        .await?;
    Ok(body.extract_into::<NodeList>()?.nodes)
}

pub async fn delete(client: &ServiceClient, lb_id: u64, node_id: u64) -> CloudLbResult<()> {
    let node_id = node_id.to_string();
    client
        .delete(lb_url(client, lb_id, &["nodes", node_id.as_str()]))
        .await?;
    Ok(())
}

pub async fn bulk_delete(client: &ServiceClient, lb_id: u64, ids: &[u64]) -> CloudLbResult<()> {
    let url = with_id_params(lb_url(client, lb_id, &["nodes"]), ids)?;
    client.delete(url).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cloudlb_core::{NodeCondition, NodeType};
    use httpmock::Method::{DELETE, GET, POST};
    use httpmock::MockServer;
    use serde_json::json;

    fn node_opts(address: &str, port: u16) -> NodeCreateOpts {
        NodeCreateOpts {
            address: address.into(),
            port,
            condition: NodeCondition::Enabled,
            node_type: None,
            weight: None,
        }
    }

    #[tokio::test]
    async fn create_posts_node_batch() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST).path("/loadbalancers/5/nodes").json_body(json!({
                "nodes": [{"address": "10.2.2.3", "port": 80, "condition": "ENABLED"}]
            }));
            then.status(202).json_body(json!({
                "nodes": [{
                    "id": 185, "address": "10.2.2.3", "port": 80,
                    "condition": "ENABLED", "status": "ONLINE", "weight": 1, "type": "PRIMARY"
                }]
            }));
        });

        let client = ServiceClient::new(&server.base_url(), "tok").unwrap();
        let nodes = create(&client, 5, &[node_opts("10.2.2.3", 80)])
            .await
            .unwrap();

        mock.assert();
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].id, 185);
        assert_eq!(nodes[0].node_type, Some(NodeType::Primary));
    }

    #[tokio::test]
    async fn create_rejects_zero_port_without_request() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.any_request();
            then.status(500);
        });

        let client = ServiceClient::new(&server.base_url(), "tok").unwrap();
        let err = create(&client, 5, &[node_opts("10.2.2.3", 0)])
            .await
            .unwrap_err();

        assert!(matches!(err, CloudLbError::InvalidInput(_)));
        mock.assert_calls(0);
    }

    #[tokio::test]
    async fn get_and_delete_address_single_node() {
        let server = MockServer::start_async().await;
        let show = server.mock(|when, then| {
            when.method(GET).path("/loadbalancers/5/nodes/410");
            then.status(200).json_body(json!({
                "node": {"id": 410, "address": "10.1.1.2", "port": 443, "condition": "DRAINING"}
            }));
        });
        let remove = server.mock(|when, then| {
            when.method(DELETE).path("/loadbalancers/5/nodes/410");
            then.status(202);
        });

        let client = ServiceClient::new(&server.base_url(), "tok").unwrap();
        let node = get(&client, 5, 410).await.unwrap();
        assert_eq!(node.condition, NodeCondition::Draining);
        delete(&client, 5, 410).await.unwrap();

        show.assert();
        remove.assert();
    }

    #[tokio::test]
    async fn list_missing_nodes_key_is_decode_error() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/loadbalancers/5/nodes");
            then.status(200).json_body(json!({"node": []}));
        });

        let client = ServiceClient::new(&server.base_url(), "tok").unwrap();
        let err = list(&client, 5).await.unwrap_err();
        assert!(matches!(err, CloudLbError::Decode(_)));
    }

    #[tokio::test]
    async fn bulk_delete_without_ids_sends_nothing() {
        let client = ServiceClient::new("http://127.0.0.1:9/", "tok").unwrap();
        let err = bulk_delete(&client, 5, &[]).await.unwrap_err();
        assert!(matches!(err, CloudLbError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn bulk_delete_sends_ids_in_query() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(DELETE)
                .path("/loadbalancers/5/nodes")
                .query_param("id", "410")
                .query_param("id", "411");
            then.status(202);
        });

        let client = ServiceClient::new(&server.base_url(), "tok").unwrap();
        bulk_delete(&client, 5, &[410, 411]).await.unwrap();

        mock.assert();
    }
}
