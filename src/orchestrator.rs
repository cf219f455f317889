//! Configuration orchestrator.
//!
//! This module coordinates the generation pipeline: validate the
//! configuration, build the topology, synthesize the route set,
//! assemble the fabric plan, and write the output artifacts.

use crate::config::Config;
use crate::emulation::{FabricConfigurator, FabricPlan};
use crate::routing::synthesize_routes;
use crate::scenario::{plan_scenario, ScenarioKind, ScenarioSettings, TrafficPlan};
use crate::topology::{build_topology, Topology};
use color_eyre::eyre::Result;
use log::info;
use rand::Rng;
use std::fs;
use std::path::Path;

/// Generate the full fabric plan and write its artifacts.
///
/// The output directory receives `fabric_plan.yaml` (the complete
/// plan), `host_registry.json` (every attached host with its address
/// and gateway), and `configure_fabric.sh` (the plan as node-prefixed
/// commands).
pub fn generate_fabric_plan(config: &Config, output_dir: &Path) -> Result<(FabricPlan, Topology)> {
    config.validate()?;

    let topology = build_topology(config)?;
    let routes = synthesize_routes(&topology)?;
    let plan = FabricPlan::assemble(config, &topology, &routes);

    fs::create_dir_all(output_dir)?;

    let plan_path = output_dir.join("fabric_plan.yaml");
    fs::write(&plan_path, serde_yaml::to_string(&plan)?)?;

    let registry_path = output_dir.join("host_registry.json");
    fs::write(&registry_path, serde_json::to_string_pretty(&topology.hosts)?)?;

    let script_path = output_dir.join("configure_fabric.sh");
    fs::write(&script_path, FabricConfigurator::new(&plan).render_script())?;

    info!("Generated fabric plan at {:?}", plan_path);
    info!("  - Pods: {}", topology.pods.len());
    for pod in &topology.pods {
        info!(
            "  - Pod '{}': {} leaf pairs, spine {}",
            pod.name,
            pod.pairs.len(),
            pod.spine.name
        );
    }
    info!("  - Nodes: {}", plan.nodes.len());
    info!("  - Interface assignments: {}", plan.assignments.len());
    info!("  - Route entries: {}", plan.routes.len());
    info!("  - Host registry created at {:?}", registry_path);

    Ok((plan, topology))
}

/// Plan one traffic scenario over a built topology and write its
/// artifacts: the plan as JSON plus a runnable command script
/// (listeners first, then the client tasks).
pub fn generate_traffic_plan<R: Rng>(
    kind: ScenarioKind,
    topology: &Topology,
    config: &Config,
    settings: &ScenarioSettings,
    output_dir: &Path,
    rng: &mut R,
) -> Result<TrafficPlan> {
    let plan = plan_scenario(kind, topology, config, settings, rng)?;

    fs::create_dir_all(output_dir)?;
    let json_path = output_dir.join(format!("traffic_{}.json", kind.slug()));
    fs::write(&json_path, serde_json::to_string_pretty(&plan)?)?;

    let mut script = String::new();
    script.push_str("# Traffic commands, one per line: <node> <command>\n");
    for listener in &plan.listeners {
        script.push_str(&format!("{} {}\n", listener.node, listener.command()));
    }
    for task in &plan.tasks {
        script.push_str(&format!("{} {}\n", task.client, task.client_command()));
        script.push_str(&format!("{} {}\n", task.client, task.ping_command()));
    }
    let script_path = output_dir.join(format!("run_{}.sh", kind.slug()));
    fs::write(&script_path, script)?;

    info!(
        "Planned scenario '{}': {} tasks, artifacts at {:?}",
        kind.slug(),
        plan.tasks.len(),
        script_path
    );

    Ok(plan)
}
