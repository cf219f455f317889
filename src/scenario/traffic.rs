//! Traffic task planning.
//!
//! This file turns a scenario selection into concrete throughput-test
//! tasks: one timed, port-unique client command per participating
//! client host, plus the listener commands each service host needs.
//! Tasks run in the background and self-terminate after the configured
//! duration; the unique ports keep concurrent tests from colliding.

use crate::config::Config;
use crate::topology::{Host, HostKind, Topology};
use log::{debug, warn};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use std::net::Ipv4Addr;

/// Default throughput-test port; tasks count upward from here.
pub const BASE_PORT: u16 = 5201;

/// Bandwidth caps drawn per task, scaled-down campus rates.
const BANDWIDTH_CHOICES: [&str; 5] = ["0.625MB", "3.25MB", "9.875MB", "19.75MB", "33MB"];

/// The selectable traffic scenarios.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioKind {
    /// Every client of the backup target's pod uploads to it at once.
    BulkTransferWave,
    /// Every client talks to a random service host of its own pod.
    MixedWorkload,
    /// Link/node failure injection. Pending; plans nothing.
    FailureDrill,
}

impl ScenarioKind {
    /// Short name used in artifact paths.
    pub fn slug(&self) -> &'static str {
        match self {
            ScenarioKind::BulkTransferWave => "backup",
            ScenarioKind::MixedWorkload => "workday",
            ScenarioKind::FailureDrill => "failure",
        }
    }

    /// Scenario selection by the control surface's 1-based number.
    pub fn from_number(n: u8) -> Option<ScenarioKind> {
        match n {
            1 => Some(ScenarioKind::BulkTransferWave),
            2 => Some(ScenarioKind::MixedWorkload),
            3 => Some(ScenarioKind::FailureDrill),
            _ => None,
        }
    }
}

/// Runtime-adjustable scenario knobs, seeded from the configuration
/// and mutated by the control surface.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ScenarioSettings {
    pub duration_secs: u64,
    pub multistream: bool,
    pub debug: bool,
}

impl ScenarioSettings {
    pub fn from_config(config: &Config) -> ScenarioSettings {
        ScenarioSettings {
            duration_secs: config.scenario_secs(),
            multistream: config.general.multistream,
            debug: false,
        }
    }
}

/// One planned throughput test.
#[derive(Debug, Clone, Serialize)]
pub struct TrafficTask {
    pub client: String,
    pub server: String,
    pub server_addr: Ipv4Addr,
    pub port: u16,
    pub parallel_streams: u8,
    pub bandwidth: String,
    pub duration_secs: u64,
    pub output_file: String,
}

impl TrafficTask {
    /// The backgrounded client command.
    pub fn client_command(&self) -> String {
        format!(
            "iperf3 -c {} -p {} -P {} -b {} -t {} --json > {} &",
            self.server_addr,
            self.port,
            self.parallel_streams,
            self.bandwidth,
            self.duration_secs,
            self.output_file
        )
    }

    /// Companion round-trip-time probe for the same pair.
    pub fn ping_command(&self) -> String {
        format!(
            "ping -c {} {} > {} &",
            self.duration_secs,
            self.server_addr,
            self.output_file.replace(".json", "_ping.txt")
        )
    }
}

/// One listener a service host must run before the tasks start.
#[derive(Debug, Clone, Serialize)]
pub struct ListenerTask {
    pub node: String,
    pub port: u16,
}

impl ListenerTask {
    pub fn command(&self) -> String {
        format!("iperf3 -s -p {} &", self.port)
    }
}

/// A fully planned scenario.
#[derive(Debug, Clone, Serialize)]
pub struct TrafficPlan {
    pub scenario: ScenarioKind,
    pub output_dir: String,
    pub listeners: Vec<ListenerTask>,
    pub tasks: Vec<TrafficTask>,
}

/// Errors raised during scenario planning.
#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    #[error("backup target '{0}' is not a service host of the fabric")]
    UnknownTarget(String),
}

/// Plan the selected scenario over the built fabric.
///
/// Randomized per-task parameters (stream count, bandwidth cap, server
/// selection) come from the caller-supplied generator; everything else
/// is deterministic.
pub fn plan_scenario<R: Rng>(
    kind: ScenarioKind,
    topo: &Topology,
    config: &Config,
    settings: &ScenarioSettings,
    rng: &mut R,
) -> Result<TrafficPlan, ScenarioError> {
    let output_dir = format!("{}_scenario_{}", config.fabric.clients_per_leaf, kind.slug());
    let mut plan = TrafficPlan {
        scenario: kind,
        output_dir: output_dir.clone(),
        listeners: Vec::new(),
        tasks: Vec::new(),
    };

    match kind {
        ScenarioKind::BulkTransferWave => {
            let target = topo
                .host(&config.general.backup_target)
                .filter(|h| h.kind == HostKind::Service)
                .ok_or_else(|| {
                    ScenarioError::UnknownTarget(config.general.backup_target.clone())
                })?;
            // The wave covers the target's own pod.
            let clients: Vec<&Host> = topo
                .hosts
                .iter()
                .filter(|h| h.kind == HostKind::Client && h.pod == target.pod)
                .collect();
            for client in clients {
                add_task(&mut plan, client, target, settings, rng);
            }
        }
        ScenarioKind::MixedWorkload => {
            for client in topo.hosts.iter().filter(|h| h.kind == HostKind::Client) {
                let candidates: Vec<&Host> = topo
                    .hosts
                    .iter()
                    .filter(|h| h.kind == HostKind::Service && h.pod == client.pod)
                    .collect();
                match candidates.choose(rng) {
                    Some(server) => add_task(&mut plan, client, server, settings, rng),
                    None => warn!("No service host in pod {} for {}", client.pod, client.name),
                }
            }
        }
        ScenarioKind::FailureDrill => {
            warn!("Failure drill is pending; planning no traffic");
        }
    }

    debug!(
        "Planned scenario '{}': {} tasks, {} listeners",
        kind.slug(),
        plan.tasks.len(),
        plan.listeners.len()
    );
    Ok(plan)
}

fn add_task<R: Rng>(
    plan: &mut TrafficPlan,
    client: &Host,
    server: &Host,
    settings: &ScenarioSettings,
    rng: &mut R,
) {
    let port = BASE_PORT + plan.tasks.len() as u16;
    let parallel_streams = if settings.multistream {
        rng.gen_range(1..=5)
    } else {
        1
    };
    let bandwidth = BANDWIDTH_CHOICES
        .choose(rng)
        .copied()
        .unwrap_or("33MB")
        .to_string();
    let marker = if settings.multistream { "ms_" } else { "" };
    let output_file = format!(
        "{}/{}sec_{}{}_{}.json",
        plan.output_dir,
        settings.duration_secs,
        marker,
        plan.scenario.slug(),
        client.name
    );

    plan.listeners.push(ListenerTask {
        node: server.name.clone(),
        port,
    });
    plan.tasks.push(TrafficTask {
        client: client.name.clone(),
        server: server.name.clone(),
        server_addr: server.address,
        port,
        parallel_streams,
        bandwidth,
        duration_secs: settings.duration_secs,
        output_file,
    });
}
