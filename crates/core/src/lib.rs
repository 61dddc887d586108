//! Domain models, shared types, and error definitions.
//!
//! Foundation crate -- no async or I/O dependencies.

pub mod error;
pub mod types;

pub use error::{CloudLbError, CloudLbResult};
pub use types::{
    AccessListCreateOpts, AccessListEntry, AccessType, Cluster, ConnectionLogging, IpVersion,
    ListOpts, LoadBalancer, LoadBalancerCreateOpts, Node, NodeCondition, NodeCreateOpts, NodeType,
    SourceAddresses, Timestamp, VirtualIp, VirtualIpCreateOpts, VirtualIpType,
};
