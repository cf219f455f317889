//! Fabric topology module.
//!
//! This module builds the node/link graph of the dual-pod leaf-spine
//! fabric, with addressing metadata attached to every link endpoint.

pub mod builder;
pub mod types;

// Re-export key types and functions for easier access
pub use builder::{build_topology, BuildError};
pub use types::{
    Endpoint, Host, HostKind, LeafPair, Link, Pod, Router, RouterIface, Spine, SpineIface,
    Topology,
};
