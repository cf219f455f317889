use clap::Parser;
use color_eyre::eyre::{eyre, Result};
use env_logger::Env;
use log::{info, warn};
use rand::thread_rng;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use fabricsim::config::Config;
use fabricsim::control::{apply_command, parse_command, ControlCommand};
use fabricsim::orchestrator::{generate_fabric_plan, generate_traffic_plan};
use fabricsim::scenario::{ScenarioKind, ScenarioSettings};
use fabricsim::topology::Topology;

/// Configuration utility for dual-pod leaf-spine network emulations
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the fabric configuration YAML file (built-in reference
    /// deployment when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output directory for the fabric plan and scenario artifacts
    #[arg(short, long, default_value = "fabric_output")]
    output: PathBuf,

    /// Override the number of clients attached per designated leaf
    #[arg(long)]
    clients: Option<u8>,

    /// Plan a traffic scenario after generating the fabric plan
    /// (backup, workday, or failure)
    #[arg(long)]
    scenario: Option<String>,

    /// Start the interactive control shell after generation
    #[arg(long)]
    interactive: bool,
}

fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Parse command-line arguments
    let args = Args::parse();

    // Initialize logging with default filter level of "info"
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    info!("Starting fabricsim plan generator");
    info!("Output directory: {:?}", args.output);

    let mut config = match &args.config {
        Some(path) => {
            info!("Configuration file: {:?}", path);
            Config::load(path)?
        }
        None => {
            info!("No configuration file given, using the reference deployment");
            Config::reference()
        }
    };

    if let Some(clients) = args.clients {
        config.fabric.clients_per_leaf = clients;
    }

    let (_plan, topology) = generate_fabric_plan(&config, &args.output)?;
    info!(
        "Clients per designated leaf: {} ({} client hosts total)",
        config.fabric.clients_per_leaf,
        topology
            .hosts
            .iter()
            .filter(|h| h.kind == fabricsim::topology::HostKind::Client)
            .count()
    );

    let mut settings = ScenarioSettings::from_config(&config);

    if let Some(name) = &args.scenario {
        let kind = scenario_by_name(name)?;
        generate_traffic_plan(
            kind,
            &topology,
            &config,
            &settings,
            &args.output,
            &mut thread_rng(),
        )?;
    }

    if args.interactive {
        run_shell(&mut settings, &topology, &config, &args.output)?;
    }

    info!("Plan generation completed successfully");
    Ok(())
}

fn scenario_by_name(name: &str) -> Result<ScenarioKind> {
    match name {
        "backup" => Ok(ScenarioKind::BulkTransferWave),
        "workday" => Ok(ScenarioKind::MixedWorkload),
        "failure" => Ok(ScenarioKind::FailureDrill),
        other => Err(eyre!(
            "unknown scenario '{}', expected backup, workday, or failure",
            other
        )),
    }
}

/// Interactive control shell over stdin. Commands: debug [0|1],
/// multistream [0|1], scenario_time [sec], scenario [1|2|3], quit.
fn run_shell(
    settings: &mut ScenarioSettings,
    topology: &Topology,
    config: &Config,
    output_dir: &std::path::Path,
) -> Result<()> {
    let stdin = io::stdin();
    println!("fabricsim> commands: debug, multistream, scenario_time, scenario, quit");
    print!("fabricsim> ");
    io::stdout().flush()?;

    for line in stdin.lock().lines() {
        let line = line?;
        if !line.trim().is_empty() {
            match parse_command(&line) {
                Ok(ControlCommand::Quit) => break,
                Ok(command) => {
                    if let Some(kind) = apply_command(settings, command) {
                        generate_traffic_plan(
                            kind,
                            topology,
                            config,
                            settings,
                            output_dir,
                            &mut thread_rng(),
                        )?;
                        info!(
                            "Don't terminate until the scenario is over (~{} sec)",
                            settings.duration_secs
                        );
                    }
                }
                Err(e) => warn!("{}", e),
            }
        }
        print!("fabricsim> ");
        io::stdout().flush()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let args = Args::parse_from(["fabricsim", "--config", "fabric.yaml"]);
        assert_eq!(args.config, Some(PathBuf::from("fabric.yaml")));
        assert_eq!(args.output, PathBuf::from("fabric_output"));
        assert!(!args.interactive);
    }

    #[test]
    fn test_scenario_args() {
        let args = Args::parse_from([
            "fabricsim",
            "--scenario",
            "backup",
            "--clients",
            "5",
        ]);
        assert_eq!(args.scenario.as_deref(), Some("backup"));
        assert_eq!(args.clients, Some(5));
    }

    #[test]
    fn test_scenario_names() {
        assert!(matches!(
            scenario_by_name("backup"),
            Ok(ScenarioKind::BulkTransferWave)
        ));
        assert!(matches!(
            scenario_by_name("workday"),
            Ok(ScenarioKind::MixedWorkload)
        ));
        assert!(scenario_by_name("chaos").is_err());
    }
}
