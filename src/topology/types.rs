//! Topology type definitions.
//!
//! This file contains the structural types of the built fabric: pods,
//! leaf pairs with their two router replicas, spines, switches, hosts,
//! and the link list handed to the emulation runtime.

use crate::addr::Replica;
use ipnet::Ipv4Net;
use serde::Serialize;
use std::net::Ipv4Addr;

/// One endpoint of an emulated link.
#[derive(Debug, Clone, Serialize)]
pub struct Endpoint {
    pub node: String,
    pub interface: String,
}

/// An emulated link with its traffic-shaping parameters.
#[derive(Debug, Clone, Serialize)]
pub struct Link {
    pub a: Endpoint,
    pub b: Endpoint,
    /// Link bandwidth in Mbit/s.
    pub bandwidth_mbit: u32,
    /// One-way propagation delay, e.g. "2ms".
    pub delay: String,
    /// Maximum queue size in packets. Host attachment links are not
    /// queue-limited.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_queue_size: Option<u32>,
}

/// One addressed interface of a router.
#[derive(Debug, Clone, Serialize)]
pub struct RouterIface {
    pub interface: String,
    pub subnet: Ipv4Net,
    pub address: Ipv4Addr,
}

/// One router replica of a leaf pair.
///
/// Every router carries exactly three interfaces: eth1 faces the leaf
/// switch (access), eth2 the sibling replica (peer), eth3 the pod
/// spine (uplink).
#[derive(Debug, Clone, Serialize)]
pub struct Router {
    pub name: String,
    pub replica: Replica,
    pub access: RouterIface,
    pub peer: RouterIface,
    pub uplink: RouterIface,
}

/// A leaf pair: two replicas created together plus the leaf switch.
/// Replica 2 is not attached to the switch; its traffic toward local
/// hosts crosses the peer link.
#[derive(Debug, Clone, Serialize)]
pub struct LeafPair {
    pub index: u8,
    pub r1: Router,
    pub r2: Router,
    pub switch: String,
}

impl LeafPair {
    pub fn router(&self, replica: Replica) -> &Router {
        match replica {
            Replica::R1 => &self.r1,
            Replica::R2 => &self.r2,
        }
    }

    pub fn routers(&self) -> [&Router; 2] {
        [&self.r1, &self.r2]
    }
}

/// One spine interface, facing exactly one replica uplink.
#[derive(Debug, Clone, Serialize)]
pub struct SpineIface {
    pub interface: String,
    pub subnet: Ipv4Net,
    pub address: Ipv4Addr,
}

/// The pod-local aggregation node. Owns one interface per
/// (leaf pair x replica) uplink.
#[derive(Debug, Clone, Serialize)]
pub struct Spine {
    pub name: String,
    pub interfaces: Vec<SpineIface>,
}

/// One pod of the fabric.
#[derive(Debug, Clone, Serialize)]
pub struct Pod {
    pub name: String,
    pub index: u8,
    pub leaf_prefix: String,
    pub pairs: Vec<LeafPair>,
    pub spine: Spine,
}

impl Pod {
    pub fn leaf_count(&self) -> u8 {
        self.pairs.len() as u8
    }
}

/// Kind of a leaf-attached endpoint host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HostKind {
    /// Statically addressed service host.
    Service,
    /// Dynamically numbered client host.
    Client,
}

/// A leaf-attached endpoint with its access-subnet address and the
/// local gateway it routes through.
#[derive(Debug, Clone, Serialize)]
pub struct Host {
    pub name: String,
    pub kind: HostKind,
    pub pod: u8,
    pub leaf: u8,
    pub switch: String,
    pub subnet: Ipv4Net,
    pub address: Ipv4Addr,
    /// Access address of replica 1 of the local leaf pair.
    pub gateway: Ipv4Addr,
}

/// The fully built fabric. Owned by the caller; nothing here is global
/// state.
#[derive(Debug, Clone, Serialize)]
pub struct Topology {
    pub pods: Vec<Pod>,
    pub links: Vec<Link>,
    pub hosts: Vec<Host>,
}

impl Topology {
    pub fn pod(&self, index: u8) -> Option<&Pod> {
        self.pods.iter().find(|p| p.index == index)
    }

    pub fn host(&self, name: &str) -> Option<&Host> {
        self.hosts.iter().find(|h| h.name == name)
    }

    /// All node names in deterministic order: per pod the spine, then
    /// routers and switches by ascending leaf index, then hosts in
    /// attachment order.
    pub fn node_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        for pod in &self.pods {
            names.push(pod.spine.name.clone());
            for pair in &pod.pairs {
                names.push(pair.r1.name.clone());
                names.push(pair.r2.name.clone());
                names.push(pair.switch.clone());
            }
        }
        for host in &self.hosts {
            names.push(host.name.clone());
        }
        names
    }
}
