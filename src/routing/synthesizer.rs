//! Static route synthesis.
//!
//! This file derives, for every router, spine, and host of the built
//! fabric, the destination-prefix/next-hop entries needed for full
//! any-to-any reachability. All subnet numbers are recomputed from
//! structural indices; nothing is read back from stored state.
//!
//! Redundancy policy: each router replica egresses through its own
//! uplink only, never through its sibling's, so losing one
//! spine-facing link isolates a single replica instead of the pair.
//! There is no ECMP anywhere; every node carries exactly one entry per
//! destination.

use crate::addr::{self, AddrError, Replica};
use crate::topology::{Pod, Router, Topology};
use ipnet::Ipv4Net;
use log::info;
use serde::Serialize;
use std::net::Ipv4Addr;

/// One static route on one node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteEntry {
    pub node: String,
    pub destination: Ipv4Net,
    pub next_hop: Ipv4Addr,
}

/// The complete route set of the fabric, in deterministic order:
/// per pod all routers (ascending leaf index, replica 1 first), then
/// the spine; host routes follow in attachment order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RouteSet {
    pub entries: Vec<RouteEntry>,
}

impl RouteSet {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries installed on one node, in synthesis order.
    pub fn for_node<'a>(&'a self, node: &'a str) -> impl Iterator<Item = &'a RouteEntry> {
        self.entries.iter().filter(move |e| e.node == node)
    }
}

/// Errors raised during route synthesis.
#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    #[error(transparent)]
    Addr(#[from] AddrError),
}

/// Compute the full static-route set for the given topology.
///
/// Pods are processed independently; a pod with no leaf pairs simply
/// contributes no entries. Re-running on the same topology produces an
/// identical route set.
pub fn synthesize_routes(topo: &Topology) -> Result<RouteSet, RouteError> {
    let mut set = RouteSet::default();

    for pod in &topo.pods {
        for pair in &pod.pairs {
            for router in pair.routers() {
                router_routes(pod, pair.index, router, &mut set)?;
            }
        }
        spine_routes(pod, &mut set)?;
    }

    for host in &topo.hosts {
        let leaf_count = topo
            .pod(host.pod)
            .map(|p| p.leaf_count())
            .unwrap_or_default();
        host_routes(&host.name, host.pod, host.leaf, leaf_count, host.gateway, &mut set)?;
    }

    info!("Synthesized {} static routes", set.len());
    Ok(set)
}

/// Routes of one router replica. Everything egresses via the spine
/// address on this replica's own uplink subnet.
///
/// The router's own leaf index is skipped for peer and access
/// destinations: those subnets are directly connected, and the skip is
/// part of the contract, not an optimization.
fn router_routes(
    pod: &Pod,
    leaf: u8,
    router: &Router,
    set: &mut RouteSet,
) -> Result<(), RouteError> {
    let p = pod.index;
    let gateway = addr::spine_uplink_addr(p, leaf, router.replica)?;
    let n = pod.leaf_count();

    // Peer subnets of the other leaf pairs.
    for j in 0..n {
        if j == leaf {
            continue;
        }
        push(set, &router.name, addr::peer_subnet(p, j)?, gateway);
    }

    // Every uplink subnet of the pod, except the one this replica is
    // directly connected to. Spine-addressed management traffic
    // resolves through these.
    for j in 0..n {
        for replica in Replica::BOTH {
            if j == leaf && replica == router.replica {
                continue;
            }
            push(set, &router.name, addr::uplink_subnet(p, j, replica)?, gateway);
        }
    }

    // Access subnets of the other leaf pairs.
    for j in 0..n {
        if j == leaf {
            continue;
        }
        push(set, &router.name, addr::access_subnet(p, j)?, gateway);
    }

    Ok(())
}

/// Routes of the pod spine. For every leaf the next hop is replica 1's
/// uplink address; no path via replica 2 is installed, so replica-1
/// failure cuts spine-to-leaf reachability for that leaf. This
/// asymmetry is part of the scheme and downstream tooling relies on it.
fn spine_routes(pod: &Pod, set: &mut RouteSet) -> Result<(), RouteError> {
    let p = pod.index;
    for pair in &pod.pairs {
        let via = addr::router_uplink_addr(p, pair.index, Replica::R1)?;
        push(set, &pod.spine.name, addr::peer_subnet(p, pair.index)?, via);
        push(set, &pod.spine.name, addr::access_subnet(p, pair.index)?, via);
    }
    Ok(())
}

/// Routes of a leaf-attached host: every access, uplink, and peer
/// range of its own pod via the local leaf router's access address.
/// The host's own access subnet is directly connected and skipped.
fn host_routes(
    node: &str,
    pod: u8,
    leaf: u8,
    leaf_count: u8,
    gateway: Ipv4Addr,
    set: &mut RouteSet,
) -> Result<(), RouteError> {
    for j in 0..leaf_count {
        if j != leaf {
            push(set, node, addr::access_subnet(pod, j)?, gateway);
        }
        for replica in Replica::BOTH {
            push(set, node, addr::uplink_subnet(pod, j, replica)?, gateway);
        }
        push(set, node, addr::peer_subnet(pod, j)?, gateway);
    }
    Ok(())
}

fn push(set: &mut RouteSet, node: &str, destination: Ipv4Net, next_hop: Ipv4Addr) {
    set.entries.push(RouteEntry {
        node: node.to_string(),
        destination,
        next_hop,
    });
}
