//! Address allocation module.
//!
//! This module maps structural fabric positions (pod, leaf index, router
//! replica, interface role) to unique IPv4 subnets and host addresses.

pub mod scheme;

// Re-export commonly used types
pub use scheme::{
    access_subnet, client_addr, peer_subnet, router_access_addr, router_peer_addr,
    router_uplink_addr, service_addr, spine_interface_index, spine_uplink_addr, uplink_subnet,
    AddrError, Replica, SubnetRole, CLIENT_HOST_BASE, MAX_LEAF_PAIRS, SPINE_HOST_OCTET,
};
