//! Topology construction.
//!
//! This file turns validated pod parameters into the full node/link
//! graph. Leaf indices are assigned in ascending creation order and
//! never reused; the route synthesizer recomputes subnet numbers from
//! these indices alone, so the ordering is load-bearing.

use crate::addr::{self, AddrError, Replica};
use crate::config::{Config, LinkConfig, PodConfig};
use crate::topology::types::{
    Endpoint, Host, HostKind, LeafPair, Link, Pod, Router, RouterIface, Spine, SpineIface,
    Topology,
};
use log::{debug, info};

/// Errors raised during topology construction.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error(transparent)]
    Addr(#[from] AddrError),

    /// An attachment names a pod that was not configured.
    #[error("'{host}' references pod index {pod}, which is not part of the fabric")]
    UnknownPod { host: String, pod: u8 },

    /// An attachment names a leaf index outside its pod's range.
    #[error("'{host}' references leaf {leaf} of pod {pod}, which has only {leaf_count} leaf pairs")]
    UnknownLeaf {
        host: String,
        pod: u8,
        leaf: u8,
        leaf_count: u8,
    },
}

/// Build the full fabric graph for all configured pods.
///
/// The returned topology owns every created node, link, and host; the
/// caller decides what to do with them.
pub fn build_topology(config: &Config) -> Result<Topology, BuildError> {
    let mut links = Vec::new();
    let mut pods = Vec::new();

    for pod_cfg in &config.fabric.pods {
        pods.push(build_pod(pod_cfg, &config.fabric.link, &mut links)?);
    }

    let mut hosts = Vec::new();
    for svc in &config.services {
        let pod_cfg = config
            .pod(svc.pod)
            .ok_or_else(|| BuildError::UnknownPod {
                host: svc.name.clone(),
                pod: svc.pod,
            })?;
        check_leaf(&svc.name, pod_cfg, svc.leaf)?;
        hosts.push(attach_host(
            svc.name.clone(),
            HostKind::Service,
            pod_cfg,
            svc.leaf,
            addr::service_addr(svc.pod, svc.leaf, svc.host_octet)?,
            &config.fabric.link,
            &mut links,
        )?);
    }

    for group in &config.clients {
        let pod_cfg = config
            .pod(group.pod)
            .ok_or_else(|| BuildError::UnknownPod {
                host: format!("client group for leaf {}", group.leaf),
                pod: group.pod,
            })?;
        check_leaf("client group", pod_cfg, group.leaf)?;
        for ordinal in 1..=config.fabric.clients_per_leaf {
            let name = format!("{}{}C{}", pod_cfg.leaf_prefix, group.leaf + 1, ordinal);
            hosts.push(attach_host(
                name,
                HostKind::Client,
                pod_cfg,
                group.leaf,
                addr::client_addr(group.pod, group.leaf, ordinal)?,
                &config.fabric.link,
                &mut links,
            )?);
        }
    }

    info!(
        "Built fabric: {} pods, {} links, {} hosts",
        pods.len(),
        links.len(),
        hosts.len()
    );

    Ok(Topology { pods, links, hosts })
}

/// Build one pod: leaf pairs in ascending index order, each wired to
/// its sibling (peer), the spine (uplink, both replicas), and the leaf
/// switch (replica 1 only).
fn build_pod(
    pod_cfg: &PodConfig,
    link_cfg: &LinkConfig,
    links: &mut Vec<Link>,
) -> Result<Pod, BuildError> {
    let pod = pod_cfg.index;
    let mut pairs = Vec::with_capacity(usize::from(pod_cfg.leaf_count));
    let mut spine_ifaces = Vec::with_capacity(2 * usize::from(pod_cfg.leaf_count));

    for leaf in 0..pod_cfg.leaf_count {
        let leaf_name = format!("{}{}", pod_cfg.leaf_prefix, leaf + 1);
        let r1 = build_router(&leaf_name, pod, leaf, Replica::R1)?;
        let r2 = build_router(&leaf_name, pod, leaf, Replica::R2)?;
        let switch = format!("{}SW", leaf_name);

        // Peer link between the two replicas.
        links.push(fabric_link(
            Endpoint {
                node: r1.name.clone(),
                interface: r1.peer.interface.clone(),
            },
            Endpoint {
                node: r2.name.clone(),
                interface: r2.peer.interface.clone(),
            },
            link_cfg,
        ));

        // Uplinks to the spine, one per replica, consuming spine
        // interface indices in 2*leaf + replica order.
        for router in [&r1, &r2] {
            let index = addr::spine_interface_index(leaf, router.replica);
            let spine_iface = SpineIface {
                interface: format!("{}-eth{}", pod_cfg.spine_name, index),
                subnet: router.uplink.subnet,
                address: addr::spine_uplink_addr(pod, leaf, router.replica)?,
            };
            links.push(fabric_link(
                Endpoint {
                    node: router.name.clone(),
                    interface: router.uplink.interface.clone(),
                },
                Endpoint {
                    node: pod_cfg.spine_name.clone(),
                    interface: spine_iface.interface.clone(),
                },
                link_cfg,
            ));
            spine_ifaces.push(spine_iface);
        }

        // Access backbone: the switch hangs off replica 1 only.
        links.push(fabric_link(
            Endpoint {
                node: switch.clone(),
                interface: format!("{}-eth1", switch),
            },
            Endpoint {
                node: r1.name.clone(),
                interface: r1.access.interface.clone(),
            },
            link_cfg,
        ));

        debug!(
            "Pod {} leaf {}: {} / {} behind {}",
            pod_cfg.name, leaf, r1.name, r2.name, switch
        );

        pairs.push(LeafPair {
            index: leaf,
            r1,
            r2,
            switch,
        });
    }

    Ok(Pod {
        name: pod_cfg.name.clone(),
        index: pod,
        leaf_prefix: pod_cfg.leaf_prefix.clone(),
        pairs,
        spine: Spine {
            name: pod_cfg.spine_name.clone(),
            interfaces: spine_ifaces,
        },
    })
}

fn build_router(leaf_name: &str, pod: u8, leaf: u8, replica: Replica) -> Result<Router, BuildError> {
    let name = format!("{}R{}", leaf_name, replica.number());
    Ok(Router {
        access: RouterIface {
            interface: format!("{}-eth1", name),
            subnet: addr::access_subnet(pod, leaf)?,
            address: addr::router_access_addr(pod, leaf, replica)?,
        },
        peer: RouterIface {
            interface: format!("{}-eth2", name),
            subnet: addr::peer_subnet(pod, leaf)?,
            address: addr::router_peer_addr(pod, leaf, replica)?,
        },
        uplink: RouterIface {
            interface: format!("{}-eth3", name),
            subnet: addr::uplink_subnet(pod, leaf, replica)?,
            address: addr::router_uplink_addr(pod, leaf, replica)?,
        },
        name,
        replica,
    })
}

fn attach_host(
    name: String,
    kind: HostKind,
    pod_cfg: &PodConfig,
    leaf: u8,
    address: std::net::Ipv4Addr,
    link_cfg: &LinkConfig,
    links: &mut Vec<Link>,
) -> Result<Host, BuildError> {
    let switch = format!("{}{}SW", pod_cfg.leaf_prefix, leaf + 1);
    // Switch port 1 faces replica 1; hosts take the next free port.
    let port = 1 + links_on_switch(links, &switch);
    // Host attachment links carry bandwidth and delay but no queue cap.
    links.push(Link {
        a: Endpoint {
            node: name.clone(),
            interface: format!("{}-eth0", name),
        },
        b: Endpoint {
            node: switch.clone(),
            interface: format!("{}-eth{}", switch, port),
        },
        bandwidth_mbit: link_cfg.bandwidth_mbit,
        delay: link_cfg.delay.clone(),
        max_queue_size: None,
    });
    Ok(Host {
        name,
        kind,
        pod: pod_cfg.index,
        leaf,
        switch,
        subnet: addr::access_subnet(pod_cfg.index, leaf)?,
        address,
        gateway: addr::router_access_addr(pod_cfg.index, leaf, Replica::R1)?,
    })
}

fn check_leaf(host: &str, pod_cfg: &PodConfig, leaf: u8) -> Result<(), BuildError> {
    if leaf >= pod_cfg.leaf_count {
        return Err(BuildError::UnknownLeaf {
            host: host.to_string(),
            pod: pod_cfg.index,
            leaf,
            leaf_count: pod_cfg.leaf_count,
        });
    }
    Ok(())
}

fn links_on_switch(links: &[Link], switch: &str) -> usize {
    links
        .iter()
        .filter(|l| l.a.node == switch || l.b.node == switch)
        .count()
}

fn fabric_link(a: Endpoint, b: Endpoint, link_cfg: &LinkConfig) -> Link {
    Link {
        a,
        b,
        bandwidth_mbit: link_cfg.bandwidth_mbit,
        delay: link_cfg.delay.clone(),
        max_queue_size: Some(link_cfg.max_queue_size),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn builds_reference_fabric() {
        let config = Config::reference();
        let topo = build_topology(&config).unwrap();

        assert_eq!(topo.pods.len(), 2);
        let north = topo.pod(0).unwrap();
        let south = topo.pod(1).unwrap();
        assert_eq!(north.pairs.len(), 16);
        assert_eq!(south.pairs.len(), 13);

        // One spine interface per replica uplink.
        assert_eq!(north.spine.interfaces.len(), 32);
        assert_eq!(south.spine.interfaces.len(), 26);

        // 10 services + 7 client groups x 3 clients.
        assert_eq!(topo.hosts.len(), 10 + 7 * 3);
    }

    #[test]
    fn leaf_zero_addresses_match_plan() {
        let config = Config::reference();
        let topo = build_topology(&config).unwrap();
        let pair = &topo.pod(0).unwrap().pairs[0];

        assert_eq!(pair.r1.name, "LN1R1");
        assert_eq!(pair.r1.uplink.subnet.to_string(), "10.0.201.0/24");
        assert_eq!(pair.r1.uplink.address.to_string(), "10.0.201.1");
        assert_eq!(pair.r2.uplink.subnet.to_string(), "10.0.202.0/24");
        assert_eq!(pair.r2.uplink.address.to_string(), "10.0.202.1");
        assert_eq!(pair.r1.peer.address.to_string(), "10.0.0.1");
        assert_eq!(pair.r2.peer.address.to_string(), "10.0.0.2");
        assert_eq!(pair.r1.access.address.to_string(), "10.0.100.1");
        assert_eq!(pair.switch, "LN1SW");
    }

    #[test]
    fn spine_owns_last_usable_address() {
        let config = Config::reference();
        let topo = build_topology(&config).unwrap();
        for pod in &topo.pods {
            for iface in &pod.spine.interfaces {
                assert_eq!(iface.address.octets()[3], 254);
            }
        }
    }

    #[test]
    fn replica_two_is_not_attached_to_the_switch() {
        let config = Config::reference();
        let topo = build_topology(&config).unwrap();
        for pod in &topo.pods {
            for pair in &pod.pairs {
                let attached = topo.links.iter().any(|l| {
                    (l.a.node == pair.switch && l.b.node == pair.r2.name)
                        || (l.b.node == pair.switch && l.a.node == pair.r2.name)
                });
                assert!(!attached, "{} must reach {} via the peer link", pair.r2.name, pair.switch);
            }
        }
    }

    #[test]
    fn client_hosts_are_numbered_in_attachment_order() {
        let config = Config::reference();
        let topo = build_topology(&config).unwrap();
        let c1 = topo.host("LN2C1").unwrap();
        let c3 = topo.host("LN2C3").unwrap();
        assert_eq!(c1.address.to_string(), "10.0.101.11");
        assert_eq!(c3.address.to_string(), "10.0.101.13");
        assert_eq!(c1.gateway.to_string(), "10.0.101.1");
    }

    #[test]
    fn service_hosts_use_the_fixed_octet() {
        let config = Config::reference();
        let topo = build_topology(&config).unwrap();
        let file = topo.host("FILE").unwrap();
        assert_eq!(file.address.to_string(), "10.0.105.200");
        assert_eq!(file.switch, "LN6SW");
        let vm = topo.host("VM").unwrap();
        assert_eq!(vm.address.to_string(), "10.1.105.200");
    }

    #[test]
    fn unknown_leaf_attachment_is_surfaced() {
        let mut config = Config::reference();
        config.services[0].leaf = 40;
        let err = build_topology(&config).unwrap_err();
        assert!(matches!(err, BuildError::UnknownLeaf { leaf: 40, .. }));
    }

    #[test]
    fn empty_pod_builds_without_nodes() {
        let mut config = Config::reference();
        config.fabric.pods[1].leaf_count = 0;
        config.services.retain(|s| s.pod != 1);
        config.clients.retain(|c| c.pod != 1);
        let topo = build_topology(&config).unwrap();
        let south = topo.pod(1).unwrap();
        assert!(south.pairs.is_empty());
        assert!(south.spine.interfaces.is_empty());
    }

    #[test]
    fn node_names_are_unique() {
        use crate::addr::Replica;
        use std::collections::HashSet;

        let config = Config::reference();
        let topo = build_topology(&config).unwrap();
        let names = topo.node_names();
        let unique: HashSet<&String> = names.iter().collect();
        assert_eq!(unique.len(), names.len());
        // Spines + 3 nodes per leaf pair + hosts.
        assert_eq!(names.len(), 2 + 3 * (16 + 13) + 31);

        let pair = &topo.pod(0).unwrap().pairs[3];
        assert_eq!(pair.router(Replica::R1).name, pair.r1.name);
        assert_eq!(pair.router(Replica::R2).name, pair.r2.name);
    }

    #[test]
    fn rebuild_is_deterministic() {
        let config = Config::reference();
        let a = build_topology(&config).unwrap();
        let b = build_topology(&config).unwrap();
        assert_eq!(
            serde_yaml::to_string(&a).unwrap(),
            serde_yaml::to_string(&b).unwrap()
        );
    }
}
