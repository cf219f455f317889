//! Deterministic address scheme.
//!
//! This file contains the pure allocation functions that place every
//! fabric position into the 10.<pod>.x.0/24 address plan. All three
//! interface roles of a leaf router draw from disjoint third-octet
//! ranges, so subnets never overlap by construction:
//!
//! - peer subnets:   `10.<pod>.<leaf>.0/24`
//! - access subnets: `10.<pod>.<100 + leaf>.0/24`
//! - uplink subnets: `10.<pod>.<200 + 2*leaf + replica>.0/24`
//!
//! The pod index occupies the second octet, which keeps the two pods
//! disjoint as well. Nothing here holds state; the same inputs always
//! produce the same subnet and address.

use ipnet::Ipv4Net;
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;

/// First octet of every fabric subnet.
const NET_BASE: u8 = 10;

/// Third-octet offset of the access (client/server) range.
const ACCESS_NET_BASE: u16 = 100;

/// Third-octet offset of the uplink (spine-facing) range.
const UPLINK_NET_BASE: u16 = 200;

/// Leaf indices must stay below this bound so that the peer range
/// (`0..100`) and the access range (`100..200`) cannot collide.
const LEAF_INDEX_LIMIT: u16 = 100;

/// Host octet reserved for the spine on every uplink subnet. Never
/// assigned to a router.
pub const SPINE_HOST_OCTET: u8 = 254;

/// Largest leaf-pair count a pod can hold: the uplink octet
/// `200 + 2*leaf + replica` must stay within the third octet, which
/// caps the leaf index at 26.
pub const MAX_LEAF_PAIRS: u8 = 27;

/// Dynamically numbered clients start right above this host octet, so
/// the first client of a switch is `.11`.
pub const CLIENT_HOST_BASE: u8 = 10;

/// Replica slot of a router within its leaf pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Replica {
    R1,
    R2,
}

impl Replica {
    /// Both replica slots, in creation order.
    pub const BOTH: [Replica; 2] = [Replica::R1, Replica::R2];

    /// 1-based replica number used in octet arithmetic and node names.
    pub fn number(self) -> u8 {
        match self {
            Replica::R1 => 1,
            Replica::R2 => 2,
        }
    }
}

/// Role of an allocated subnet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubnetRole {
    /// Inter-replica subnet of a leaf pair.
    Peer,
    /// Client/server subnet behind the leaf switch.
    Access,
    /// Point-to-point subnet between one replica and the spine.
    Uplink,
}

impl SubnetRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubnetRole::Peer => "peer",
            SubnetRole::Access => "access",
            SubnetRole::Uplink => "uplink",
        }
    }
}

impl std::fmt::Display for SubnetRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised by the address scheme.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddrError {
    /// A structural index does not fit the single-octet encoding of its
    /// subnet role. Raised before anything wraps.
    #[error("address space exhausted: leaf index {leaf} overflows the {role} octet range of pod {pod}")]
    AddressSpaceExhausted { pod: u8, leaf: u8, role: SubnetRole },

    /// A host ordinal collides with a reserved host octet.
    #[error("host octet {octet} is out of range for the access subnet of pod {pod} leaf {leaf}")]
    HostRangeExhausted { pod: u8, leaf: u8, octet: u16 },
}

fn net(pod: u8, third: u8) -> Ipv4Net {
    Ipv4Net::new(Ipv4Addr::new(NET_BASE, pod, third, 0), 24).unwrap()
}

fn host(subnet: Ipv4Net, octet: u8) -> Ipv4Addr {
    let base = subnet.network().octets();
    Ipv4Addr::new(base[0], base[1], base[2], octet)
}

/// Third octet of the access subnet for a leaf, checked against the
/// encoding bound.
fn access_octet(pod: u8, leaf: u8) -> Result<u8, AddrError> {
    if u16::from(leaf) >= LEAF_INDEX_LIMIT {
        return Err(AddrError::AddressSpaceExhausted {
            pod,
            leaf,
            role: SubnetRole::Access,
        });
    }
    Ok((ACCESS_NET_BASE + u16::from(leaf)) as u8)
}

/// Third octet of the uplink subnet for a leaf replica. The uplink range
/// runs out of third-octet space well before the 100-leaf encoding bound
/// (at leaf index 27), so this is the binding constraint on pod size.
fn uplink_octet(pod: u8, leaf: u8, replica: Replica) -> Result<u8, AddrError> {
    let octet = UPLINK_NET_BASE + 2 * u16::from(leaf) + u16::from(replica.number());
    if octet > u16::from(u8::MAX) {
        return Err(AddrError::AddressSpaceExhausted {
            pod,
            leaf,
            role: SubnetRole::Uplink,
        });
    }
    Ok(octet as u8)
}

/// Inter-replica subnet of leaf pair `leaf`: `10.<pod>.<leaf>.0/24`.
pub fn peer_subnet(pod: u8, leaf: u8) -> Result<Ipv4Net, AddrError> {
    if u16::from(leaf) >= LEAF_INDEX_LIMIT {
        return Err(AddrError::AddressSpaceExhausted {
            pod,
            leaf,
            role: SubnetRole::Peer,
        });
    }
    Ok(net(pod, leaf))
}

/// Client/server subnet of leaf pair `leaf`: `10.<pod>.<100+leaf>.0/24`.
pub fn access_subnet(pod: u8, leaf: u8) -> Result<Ipv4Net, AddrError> {
    Ok(net(pod, access_octet(pod, leaf)?))
}

/// Spine-facing subnet of one replica: `10.<pod>.<200+2*leaf+replica>.0/24`.
/// Each leaf pair consumes two consecutive uplink subnets, one per replica.
pub fn uplink_subnet(pod: u8, leaf: u8, replica: Replica) -> Result<Ipv4Net, AddrError> {
    Ok(net(pod, uplink_octet(pod, leaf, replica)?))
}

/// Address of a replica on the peer subnet (`.1` for R1, `.2` for R2).
pub fn router_peer_addr(pod: u8, leaf: u8, replica: Replica) -> Result<Ipv4Addr, AddrError> {
    Ok(host(peer_subnet(pod, leaf)?, replica.number()))
}

/// Address of a replica on the access subnet (`.1` for R1, `.2` for R2).
pub fn router_access_addr(pod: u8, leaf: u8, replica: Replica) -> Result<Ipv4Addr, AddrError> {
    Ok(host(access_subnet(pod, leaf)?, replica.number()))
}

/// Address of a replica on its own uplink subnet, always `.1`.
pub fn router_uplink_addr(pod: u8, leaf: u8, replica: Replica) -> Result<Ipv4Addr, AddrError> {
    Ok(host(uplink_subnet(pod, leaf, replica)?, 1))
}

/// Address of the spine on a replica's uplink subnet, always `.254`.
pub fn spine_uplink_addr(pod: u8, leaf: u8, replica: Replica) -> Result<Ipv4Addr, AddrError> {
    Ok(host(uplink_subnet(pod, leaf, replica)?, SPINE_HOST_OCTET))
}

/// 1-based spine interface index for the uplink of leaf `leaf`,
/// replica `replica`. Collision-free because every (leaf, replica)
/// pair maps to a distinct `2*leaf + replica`.
pub fn spine_interface_index(leaf: u8, replica: Replica) -> u16 {
    2 * u16::from(leaf) + u16::from(replica.number())
}

/// Address of the `ordinal`-th dynamically attached client (1-based) on
/// the access subnet: `.11`, `.12`, and so on in attachment order.
pub fn client_addr(pod: u8, leaf: u8, ordinal: u8) -> Result<Ipv4Addr, AddrError> {
    let octet = u16::from(CLIENT_HOST_BASE) + u16::from(ordinal);
    // Stay clear of the statically addressed service range at .200.
    if ordinal == 0 || octet >= 200 {
        return Err(AddrError::HostRangeExhausted { pod, leaf, octet });
    }
    Ok(host(access_subnet(pod, leaf)?, octet as u8))
}

/// Address of a statically numbered service host on the access subnet.
/// The host octet is a per-deployment constant (the reference plan uses
/// `.200`), not derived from structure.
pub fn service_addr(pod: u8, leaf: u8, host_octet: u8) -> Result<Ipv4Addr, AddrError> {
    if host_octet <= 2 || host_octet >= SPINE_HOST_OCTET {
        return Err(AddrError::HostRangeExhausted {
            pod,
            leaf,
            octet: u16::from(host_octet),
        });
    }
    Ok(host(access_subnet(pod, leaf)?, host_octet))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn reference_uplink_addresses() {
        // North pod, leaf 0: replica 1 on 10.0.201.0/24, replica 2 on
        // the next consecutive subnet.
        let up1 = uplink_subnet(0, 0, Replica::R1).unwrap();
        assert_eq!(up1.to_string(), "10.0.201.0/24");
        assert_eq!(
            router_uplink_addr(0, 0, Replica::R1).unwrap(),
            "10.0.201.1".parse::<Ipv4Addr>().unwrap()
        );
        assert_eq!(
            spine_uplink_addr(0, 0, Replica::R1).unwrap(),
            "10.0.201.254".parse::<Ipv4Addr>().unwrap()
        );

        let up2 = uplink_subnet(0, 0, Replica::R2).unwrap();
        assert_eq!(up2.to_string(), "10.0.202.0/24");
        assert_eq!(
            router_uplink_addr(0, 0, Replica::R2).unwrap(),
            "10.0.202.1".parse::<Ipv4Addr>().unwrap()
        );
    }

    #[test]
    fn peer_and_access_addresses() {
        assert_eq!(peer_subnet(1, 4).unwrap().to_string(), "10.1.4.0/24");
        assert_eq!(access_subnet(1, 4).unwrap().to_string(), "10.1.104.0/24");
        assert_eq!(
            router_peer_addr(1, 4, Replica::R2).unwrap(),
            "10.1.4.2".parse::<Ipv4Addr>().unwrap()
        );
        assert_eq!(
            router_access_addr(1, 4, Replica::R1).unwrap(),
            "10.1.104.1".parse::<Ipv4Addr>().unwrap()
        );
    }

    #[test]
    fn subnets_are_pairwise_disjoint() {
        // Every (pod, leaf, role, replica) tuple must map to a distinct
        // subnet across both pods.
        let mut seen = HashSet::new();
        for pod in [0u8, 1] {
            for leaf in 0..16u8 {
                assert!(seen.insert(peer_subnet(pod, leaf).unwrap()));
                assert!(seen.insert(access_subnet(pod, leaf).unwrap()));
                for replica in Replica::BOTH {
                    assert!(seen.insert(uplink_subnet(pod, leaf, replica).unwrap()));
                }
            }
        }
        assert_eq!(seen.len(), 2 * 16 * 4);
    }

    #[test]
    fn spine_interface_indices_are_collision_free() {
        let mut seen = HashSet::new();
        for leaf in 0..16u8 {
            for replica in Replica::BOTH {
                assert!(seen.insert(spine_interface_index(leaf, replica)));
            }
        }
        assert_eq!(seen.len(), 32);
        assert_eq!(spine_interface_index(0, Replica::R1), 1);
        assert_eq!(spine_interface_index(15, Replica::R2), 32);
    }

    #[test]
    fn exhaustion_fails_fast() {
        // The uplink octet overflows first.
        assert_eq!(
            uplink_subnet(0, 27, Replica::R2).unwrap_err(),
            AddrError::AddressSpaceExhausted {
                pod: 0,
                leaf: 27,
                role: SubnetRole::Uplink,
            }
        );
        // Leaf 26 still fits: 200 + 52 + 2 = 254.
        assert_eq!(
            uplink_subnet(0, 26, Replica::R2).unwrap().to_string(),
            "10.0.254.0/24"
        );
        // The peer/access encoding has its own bound at 100 leaves.
        assert!(matches!(
            peer_subnet(0, 100).unwrap_err(),
            AddrError::AddressSpaceExhausted {
                role: SubnetRole::Peer,
                ..
            }
        ));
        assert!(matches!(
            access_subnet(0, 200).unwrap_err(),
            AddrError::AddressSpaceExhausted {
                role: SubnetRole::Access,
                ..
            }
        ));
    }

    #[test]
    fn client_numbering_starts_at_eleven() {
        assert_eq!(
            client_addr(0, 1, 1).unwrap(),
            "10.0.101.11".parse::<Ipv4Addr>().unwrap()
        );
        assert_eq!(
            client_addr(0, 1, 3).unwrap(),
            "10.0.101.13".parse::<Ipv4Addr>().unwrap()
        );
        assert!(client_addr(0, 1, 0).is_err());
        // .200 belongs to statically addressed services.
        assert!(client_addr(0, 1, 190).is_err());
    }

    #[test]
    fn service_octet_respects_reservations() {
        assert_eq!(
            service_addr(0, 5, 200).unwrap(),
            "10.0.105.200".parse::<Ipv4Addr>().unwrap()
        );
        // Router addresses and the spine octet are reserved.
        assert!(service_addr(0, 5, 1).is_err());
        assert!(service_addr(0, 5, 2).is_err());
        assert!(service_addr(0, 5, SPINE_HOST_OCTET).is_err());
    }

    #[test]
    fn allocation_is_deterministic() {
        for _ in 0..3 {
            assert_eq!(
                uplink_subnet(1, 7, Replica::R1).unwrap().to_string(),
                "10.1.215.0/24"
            );
        }
    }
}
