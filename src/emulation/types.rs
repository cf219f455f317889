//! Fabric plan type definitions.
//!
//! This module contains the types serialized into `fabric_plan.yaml`:
//! the node inventory, the link list, and the two ordered lists the
//! configurator consumes — interface assignments and route entries.

use crate::config::Config;
use crate::routing::{RouteEntry, RouteSet};
use crate::topology::{Link, Topology};
use ipnet::Ipv4Net;
use serde::Serialize;

/// Role of a node in the emulated fabric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Router,
    Spine,
    Switch,
    Host,
}

/// One node of the emulated fabric.
#[derive(Debug, Clone, Serialize)]
pub struct PlanNode {
    pub name: String,
    pub kind: NodeKind,
}

/// One CIDR address bound to one interface of one node. The address
/// keeps its host bits, so it serializes as e.g. `10.0.201.1/24`.
#[derive(Debug, Clone, Serialize)]
pub struct InterfaceAssignment {
    pub node: String,
    pub interface: String,
    pub address: Ipv4Net,
}

/// General plan parameters forwarded to downstream tooling.
#[derive(Debug, Clone, Serialize)]
pub struct PlanGeneral {
    pub scenario_time_secs: u64,
    pub multistream: bool,
}

/// The complete configuration artifact for one emulation run.
///
/// Assignments and routes are ordered: nodes appear pod by pod, leaf
/// pairs in ascending index order, replica 1 before replica 2, and the
/// spine after its leaf pairs. Rebuilding from the same configuration
/// yields a byte-identical serialization.
#[derive(Debug, Clone, Serialize)]
pub struct FabricPlan {
    pub general: PlanGeneral,
    pub nodes: Vec<PlanNode>,
    pub links: Vec<Link>,
    pub assignments: Vec<InterfaceAssignment>,
    pub routes: Vec<RouteEntry>,
}

impl FabricPlan {
    /// Assemble the plan from the built topology and its route set.
    pub fn assemble(config: &Config, topo: &Topology, routes: &RouteSet) -> FabricPlan {
        let mut nodes = Vec::new();
        let mut assignments = Vec::new();

        for pod in &topo.pods {
            for pair in &pod.pairs {
                for router in pair.routers() {
                    nodes.push(PlanNode {
                        name: router.name.clone(),
                        kind: NodeKind::Router,
                    });
                    // Same order the reference runtime configures:
                    // uplink, peer, access.
                    for iface in [&router.uplink, &router.peer, &router.access] {
                        assignments.push(InterfaceAssignment {
                            node: router.name.clone(),
                            interface: iface.interface.clone(),
                            address: cidr(iface.address, iface.subnet),
                        });
                    }
                }
                nodes.push(PlanNode {
                    name: pair.switch.clone(),
                    kind: NodeKind::Switch,
                });
            }
            nodes.push(PlanNode {
                name: pod.spine.name.clone(),
                kind: NodeKind::Spine,
            });
            for iface in &pod.spine.interfaces {
                assignments.push(InterfaceAssignment {
                    node: pod.spine.name.clone(),
                    interface: iface.interface.clone(),
                    address: cidr(iface.address, iface.subnet),
                });
            }
        }

        for host in &topo.hosts {
            nodes.push(PlanNode {
                name: host.name.clone(),
                kind: NodeKind::Host,
            });
            assignments.push(InterfaceAssignment {
                node: host.name.clone(),
                interface: format!("{}-eth0", host.name),
                address: cidr(host.address, host.subnet),
            });
        }

        FabricPlan {
            general: PlanGeneral {
                scenario_time_secs: config.scenario_secs(),
                multistream: config.general.multistream,
            },
            nodes,
            links: topo.links.clone(),
            assignments,
            routes: routes.entries.clone(),
        }
    }

    pub fn node(&self, name: &str) -> Option<&PlanNode> {
        self.nodes.iter().find(|n| n.name == name)
    }
}

fn cidr(address: std::net::Ipv4Addr, subnet: Ipv4Net) -> Ipv4Net {
    Ipv4Net::new(address, subnet.prefix_len()).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::routing::synthesize_routes;
    use crate::topology::build_topology;

    fn reference_plan() -> FabricPlan {
        let config = Config::reference();
        let topo = build_topology(&config).unwrap();
        let routes = synthesize_routes(&topo).unwrap();
        FabricPlan::assemble(&config, &topo, &routes)
    }

    #[test]
    fn assignments_keep_host_bits() {
        let plan = reference_plan();
        let first = &plan.assignments[0];
        assert_eq!(first.node, "LN1R1");
        assert_eq!(first.interface, "LN1R1-eth3");
        assert_eq!(first.address.to_string(), "10.0.201.1/24");
    }

    #[test]
    fn every_route_node_is_in_the_inventory() {
        let plan = reference_plan();
        for route in &plan.routes {
            assert!(plan.node(&route.node).is_some(), "missing {}", route.node);
        }
        for assignment in &plan.assignments {
            assert!(plan.node(&assignment.node).is_some());
        }
    }

    #[test]
    fn node_counts_match_reference_fabric() {
        let plan = reference_plan();
        let routers = plan.nodes.iter().filter(|n| n.kind == NodeKind::Router).count();
        let spines = plan.nodes.iter().filter(|n| n.kind == NodeKind::Spine).count();
        let switches = plan.nodes.iter().filter(|n| n.kind == NodeKind::Switch).count();
        let hosts = plan.nodes.iter().filter(|n| n.kind == NodeKind::Host).count();
        assert_eq!(routers, 2 * (16 + 13));
        assert_eq!(spines, 2);
        assert_eq!(switches, 16 + 13);
        assert_eq!(hosts, 10 + 7 * 3);
    }

    #[test]
    fn plan_serialization_is_deterministic() {
        let a = serde_yaml::to_string(&reference_plan()).unwrap();
        let b = serde_yaml::to_string(&reference_plan()).unwrap();
        assert_eq!(a, b);
    }
}
