//! Fabric configuration application.
//!
//! This file applies a fabric plan to the running emulated nodes
//! through an external command-execution handle. Command failures are
//! collected per node and never abort configuration of the remaining
//! nodes; a plan entry naming an unknown node is an inconsistency and
//! aborts immediately.

use crate::emulation::types::{FabricPlan, NodeKind};
use log::{debug, warn};
use std::collections::HashSet;
use std::fmt::Write as _;

/// A failed command on one emulated node.
#[derive(Debug, Clone, thiserror::Error)]
#[error("command failed on {node}: {message}")]
pub struct CommandError {
    pub node: String,
    pub message: String,
}

/// External command-execution handle, one call per emulated node
/// command. Provided by the emulation runtime.
pub trait CommandRunner {
    fn run(&mut self, node: &str, command: &str) -> Result<(), CommandError>;
}

/// Errors that abort plan application.
#[derive(Debug, thiserror::Error)]
pub enum ApplyError {
    /// An assignment or route references a node the plan never
    /// declared. Surfaced, never skipped.
    #[error("unknown node '{node}' referenced by a {referenced_by} entry")]
    UnknownNode {
        node: String,
        referenced_by: &'static str,
    },
}

/// Outcome of one application pass.
#[derive(Debug, Default)]
pub struct ApplyReport {
    pub commands_run: usize,
    pub failures: Vec<CommandError>,
}

impl ApplyReport {
    pub fn all_ok(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Applies interface assignments and route entries to emulated nodes.
pub struct FabricConfigurator<'a> {
    plan: &'a FabricPlan,
}

impl<'a> FabricConfigurator<'a> {
    pub fn new(plan: &'a FabricPlan) -> Self {
        FabricConfigurator { plan }
    }

    /// Apply the full plan: enable forwarding on routers and spines,
    /// bind every interface address, then install every route.
    pub fn apply(&self, runner: &mut dyn CommandRunner) -> Result<ApplyReport, ApplyError> {
        let known: HashSet<&str> = self.plan.nodes.iter().map(|n| n.name.as_str()).collect();
        let mut report = ApplyReport::default();

        for node in &self.plan.nodes {
            if matches!(node.kind, NodeKind::Router | NodeKind::Spine) {
                run(runner, &mut report, &node.name, "sysctl -w net.ipv4.ip_forward=1");
            }
        }

        for assignment in &self.plan.assignments {
            if !known.contains(assignment.node.as_str()) {
                return Err(ApplyError::UnknownNode {
                    node: assignment.node.clone(),
                    referenced_by: "assignment",
                });
            }
            run(
                runner,
                &mut report,
                &assignment.node,
                &format!("ifconfig {} {}", assignment.interface, assignment.address),
            );
        }

        for route in &self.plan.routes {
            if !known.contains(route.node.as_str()) {
                return Err(ApplyError::UnknownNode {
                    node: route.node.clone(),
                    referenced_by: "route",
                });
            }
            run(
                runner,
                &mut report,
                &route.node,
                &format!("ip route add {} via {}", route.destination, route.next_hop),
            );
        }

        debug!(
            "Applied plan: {} commands, {} failures",
            report.commands_run,
            report.failures.len()
        );
        Ok(report)
    }

    /// Render the plan as a node-prefixed command script for offline
    /// application, one `<node> <command>` line each.
    pub fn render_script(&self) -> String {
        let mut script = String::new();
        script.push_str("# Fabric configuration commands, one per line: <node> <command>\n");
        script.push_str("# Apply in order: forwarding, addresses, routes.\n");
        for node in &self.plan.nodes {
            if matches!(node.kind, NodeKind::Router | NodeKind::Spine) {
                let _ = writeln!(script, "{} sysctl -w net.ipv4.ip_forward=1", node.name);
            }
        }
        for a in &self.plan.assignments {
            let _ = writeln!(script, "{} ifconfig {} {}", a.node, a.interface, a.address);
        }
        for r in &self.plan.routes {
            let _ = writeln!(script, "{} ip route add {} via {}", r.node, r.destination, r.next_hop);
        }
        script
    }
}

fn run(runner: &mut dyn CommandRunner, report: &mut ApplyReport, node: &str, command: &str) {
    report.commands_run += 1;
    if let Err(e) = runner.run(node, command) {
        warn!("{}", e);
        report.failures.push(e);
    }
}
