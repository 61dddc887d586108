//! Subcommand handlers. Each writes its JSON result to `out`.

use cloudlb_client::ServiceClient;
use cloudlb_core::{
    AccessListCreateOpts, ListOpts, LoadBalancerCreateOpts, VirtualIpCreateOpts, VirtualIpType,
};
use cloudlb_resources::{accesslists, loadbalancers};
use serde::Serialize;
use std::io::{self, Write};

pub(crate) type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Writes `value` as indented JSON followed by a newline.
pub(crate) fn write_json<W: Write, T: Serialize>(out: &mut W, value: &T) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)
}

pub(crate) async fn create<W: Write>(
    client: &ServiceClient,
    name: String,
    protocol: String,
    port: u16,
    vip_type: VirtualIpType,
    out: &mut W,
) -> CommandResult {
    let opts = LoadBalancerCreateOpts {
        name,
        protocol,
        port,
        virtual_ips: vec![VirtualIpCreateOpts {
            vip_type: Some(vip_type),
            ..Default::default()
        }],
        nodes: Vec::new(),
        algorithm: None,
        timeout: None,
        half_closed: None,
    };

    let lb = loadbalancers::create(client, &opts).await?.extract()?;
    tracing::info!(id = lb.id, name = %lb.name, "load balancer created");
    write_json(out, &lb)?;
    Ok(())
}

/// One JSON document per load balancer, page by page.
pub(crate) async fn list<W: Write>(client: &ServiceClient, out: &mut W) -> CommandResult {
    let mut output_error = None;
    let mut count = 0usize;

    loadbalancers::list(client, &ListOpts::default())
        .each_page(|page| {
            for lb in loadbalancers::extract_load_balancers(&page)? {
                if let Err(err) = write_json(out, &lb) {
                    output_error = Some(err);
                    return Ok(false);
                }
                count += 1;
            }
            Ok(true)
        })
        .await?;

    if let Some(err) = output_error {
        return Err(err.into());
    }
    tracing::debug!(count, "listed load balancers");
    Ok(())
}

pub(crate) async fn show<W: Write>(client: &ServiceClient, id: u64, out: &mut W) -> CommandResult {
    let lb = loadbalancers::get(client, id).await?.extract()?;
    write_json(out, &lb)?;
    Ok(())
}

pub(crate) async fn delete(client: &ServiceClient, id: u64) -> CommandResult {
    loadbalancers::delete(client, id).await?;
    tracing::info!(id, "successfully deleted");
    Ok(())
}

pub(crate) async fn access_list_show<W: Write>(
    client: &ServiceClient,
    lb_id: u64,
    out: &mut W,
) -> CommandResult {
    let entries = accesslists::get(client, lb_id).await?.extract()?;
    write_json(out, &entries)?;
    Ok(())
}

pub(crate) async fn access_list_add(
    client: &ServiceClient,
    lb_id: u64,
    allow: Vec<String>,
    deny: Vec<String>,
) -> CommandResult {
    let entries: Vec<AccessListCreateOpts> = allow
        .into_iter()
        .map(AccessListCreateOpts::allow)
        .chain(deny.into_iter().map(AccessListCreateOpts::deny))
        .collect();

    accesslists::create(client, lb_id, &entries).await?;
    tracing::info!(lb_id, entries = entries.len(), "access list updated");
    Ok(())
}

/// Without ids, clears the whole list.
pub(crate) async fn access_list_delete(
    client: &ServiceClient,
    lb_id: u64,
    ids: &[u64],
) -> CommandResult {
    if ids.is_empty() {
        accesslists::delete_all(client, lb_id).await?;
        tracing::info!(lb_id, "access list cleared");
    } else {
        accesslists::bulk_delete(client, lb_id, ids).await?;
        tracing::info!(lb_id, ids = ?ids, "access list entries deleted");
    }
    Ok(())
}
