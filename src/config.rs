//! Configuration structures and validation.
//!
//! This file contains the YAML-facing configuration model for a fabric
//! emulation run. Parameter errors are rejected here, before any
//! allocation or topology construction begins.

use crate::addr::MAX_LEAF_PAIRS;
use crate::utils::parse_duration_to_seconds;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Clients attached per designated leaf switch must stay in this range.
pub const MIN_CLIENTS_PER_LEAF: u8 = 1;
pub const MAX_CLIENTS_PER_LEAF: u8 = 10;

/// Shortest scenario duration that still produces usable throughput
/// records.
pub const MIN_SCENARIO_SECS: u64 = 5;

/// Top-level configuration for one emulation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub general: GeneralConfig,
    pub fabric: FabricConfig,
    #[serde(default)]
    pub services: Vec<ServiceConfig>,
    #[serde(default)]
    pub clients: Vec<ClientGroupConfig>,
}

/// Shared general configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Scenario duration as a human-readable string ("60s", "5m").
    #[serde(default = "default_scenario_time")]
    pub scenario_time: String,
    /// Whether traffic tasks may open multiple parallel streams.
    #[serde(default = "default_true")]
    pub multistream: bool,
    /// Service host targeted by the bulk-transfer wave scenario.
    #[serde(default = "default_backup_target")]
    pub backup_target: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
}

/// Fabric-wide structural parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FabricConfig {
    pub pods: Vec<PodConfig>,
    /// Clients attached to every designated leaf switch.
    #[serde(default = "default_clients_per_leaf")]
    pub clients_per_leaf: u8,
    #[serde(default)]
    pub link: LinkConfig,
}

/// One pod of the fabric. The index doubles as the second octet of
/// every subnet in the pod, so it must be 0 or 1 and unique.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PodConfig {
    pub name: String,
    pub index: u8,
    pub leaf_count: u8,
    /// Name prefix for leaf-pair nodes ("LN" gives LN1R1, LN1R2, LN1SW).
    pub leaf_prefix: String,
    pub spine_name: String,
}

/// Emulated link parameters applied to every fabric link.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkConfig {
    /// Link bandwidth in Mbit/s.
    pub bandwidth_mbit: u32,
    /// One-way propagation delay, e.g. "2ms".
    pub delay: String,
    /// Maximum queue size in packets.
    pub max_queue_size: u32,
}

impl Default for LinkConfig {
    fn default() -> Self {
        // Reference deployment scaling: 100 Gbit/s campus links scaled
        // down by a factor of 3000, 20 GB of queue at 1500-byte MTU.
        LinkConfig {
            bandwidth_mbit: 33,
            delay: "2ms".to_string(),
            max_queue_size: 4444,
        }
    }
}

/// A statically addressed service host attached to a leaf switch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub pod: u8,
    pub leaf: u8,
    /// Fixed host octet on the access subnet, documented per deployment.
    #[serde(default = "default_service_octet")]
    pub host_octet: u8,
}

/// A group of dynamically numbered client hosts on one leaf switch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientGroupConfig {
    pub pod: u8,
    pub leaf: u8,
}

fn default_scenario_time() -> String {
    "60s".to_string()
}

fn default_true() -> bool {
    true
}

fn default_backup_target() -> String {
    "FILE".to_string()
}

fn default_clients_per_leaf() -> u8 {
    3
}

fn default_service_octet() -> u8 {
    200
}

/// Validation errors for fabric configurations.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid general configuration: {0}")]
    InvalidGeneral(String),
    #[error("Invalid fabric configuration: {0}")]
    InvalidFabric(String),
    #[error("Invalid service configuration: {0}")]
    InvalidService(String),
    #[error("Invalid client configuration: {0}")]
    InvalidClients(String),
}

impl Config {
    /// Load a configuration from a YAML file and validate it.
    pub fn load(path: &Path) -> color_eyre::eyre::Result<Config> {
        let content = fs::read_to_string(path).map_err(|e| {
            color_eyre::eyre::eyre!("Failed to read config file '{}': {}", path.display(), e)
        })?;
        let config: Config = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// The built-in campus deployment: a 16-leaf North pod and a
    /// 13-leaf South pod with the standard service and client layout.
    pub fn reference() -> Config {
        Config {
            general: GeneralConfig {
                scenario_time: default_scenario_time(),
                multistream: true,
                backup_target: default_backup_target(),
                log_level: None,
            },
            fabric: FabricConfig {
                pods: vec![
                    PodConfig {
                        name: "North".to_string(),
                        index: 0,
                        leaf_count: 16,
                        leaf_prefix: "LN".to_string(),
                        spine_name: "SN".to_string(),
                    },
                    PodConfig {
                        name: "South".to_string(),
                        index: 1,
                        leaf_count: 13,
                        leaf_prefix: "LS".to_string(),
                        spine_name: "SS".to_string(),
                    },
                ],
                clients_per_leaf: default_clients_per_leaf(),
                link: LinkConfig::default(),
            },
            services: vec![
                service("SCC_N1", 0, 0),
                service("CAMPUS_N", 0, 1),
                service("LSDF", 0, 2),
                service("FILE", 0, 5),
                service("SCC_N2", 0, 9),
                service("BWCLOUD", 0, 13),
                service("SCC_S1", 1, 0),
                service("CAMPUS_S", 1, 1),
                service("VM", 1, 5),
                service("SCC_S2", 1, 9),
            ],
            clients: vec![
                ClientGroupConfig { pod: 0, leaf: 1 },
                ClientGroupConfig { pod: 0, leaf: 8 },
                ClientGroupConfig { pod: 0, leaf: 11 },
                ClientGroupConfig { pod: 1, leaf: 1 },
                ClientGroupConfig { pod: 1, leaf: 7 },
                ClientGroupConfig { pod: 1, leaf: 8 },
                ClientGroupConfig { pod: 1, leaf: 11 },
            ],
        }
    }

    /// Scenario duration in seconds. Only valid after `validate()`.
    pub fn scenario_secs(&self) -> u64 {
        parse_duration_to_seconds(&self.general.scenario_time).unwrap_or(MIN_SCENARIO_SECS)
    }

    /// Look up a pod by its index.
    pub fn pod(&self, index: u8) -> Option<&PodConfig> {
        self.fabric.pods.iter().find(|p| p.index == index)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        // General settings
        let secs = parse_duration_to_seconds(&self.general.scenario_time)
            .map_err(ValidationError::InvalidGeneral)?;
        if secs < MIN_SCENARIO_SECS {
            return Err(ValidationError::InvalidGeneral(format!(
                "scenario_time must be at least {} seconds, got {}",
                MIN_SCENARIO_SECS, secs
            )));
        }

        // Pods
        if self.fabric.pods.is_empty() || self.fabric.pods.len() > 2 {
            return Err(ValidationError::InvalidFabric(format!(
                "expected one or two pods, got {}",
                self.fabric.pods.len()
            )));
        }
        let mut indices = HashSet::new();
        let mut names = HashSet::new();
        for pod in &self.fabric.pods {
            if pod.index > 1 {
                return Err(ValidationError::InvalidFabric(format!(
                    "pod '{}' has index {}, only 0 and 1 fit the address plan",
                    pod.name, pod.index
                )));
            }
            if !indices.insert(pod.index) {
                return Err(ValidationError::InvalidFabric(format!(
                    "pod index {} is used twice",
                    pod.index
                )));
            }
            if !names.insert(pod.name.clone())
                || !names.insert(pod.leaf_prefix.clone())
                || !names.insert(pod.spine_name.clone())
            {
                return Err(ValidationError::InvalidFabric(format!(
                    "pod '{}' reuses a name, prefix, or spine name",
                    pod.name
                )));
            }
            if pod.leaf_count > MAX_LEAF_PAIRS {
                return Err(ValidationError::InvalidFabric(format!(
                    "pod '{}' requests {} leaf pairs, the uplink range holds at most {}",
                    pod.name, pod.leaf_count, MAX_LEAF_PAIRS
                )));
            }
        }

        // Link parameters
        if self.fabric.link.bandwidth_mbit == 0 {
            return Err(ValidationError::InvalidFabric(
                "link bandwidth must be positive".to_string(),
            ));
        }
        if self.fabric.link.delay.is_empty() {
            return Err(ValidationError::InvalidFabric(
                "link delay cannot be empty".to_string(),
            ));
        }

        // Client counts
        if self.fabric.clients_per_leaf < MIN_CLIENTS_PER_LEAF
            || self.fabric.clients_per_leaf > MAX_CLIENTS_PER_LEAF
        {
            return Err(ValidationError::InvalidClients(format!(
                "clients_per_leaf must be between {} and {}, got {}",
                MIN_CLIENTS_PER_LEAF, MAX_CLIENTS_PER_LEAF, self.fabric.clients_per_leaf
            )));
        }
        let mut client_leaves = HashSet::new();
        for group in &self.clients {
            if self.pod(group.pod).is_none() {
                return Err(ValidationError::InvalidClients(format!(
                    "client group references unknown pod index {}",
                    group.pod
                )));
            }
            if !client_leaves.insert((group.pod, group.leaf)) {
                return Err(ValidationError::InvalidClients(format!(
                    "client group for pod {} leaf {} appears twice",
                    group.pod, group.leaf
                )));
            }
        }

        // Services
        let mut service_names = HashSet::new();
        for svc in &self.services {
            if !service_names.insert(svc.name.clone()) {
                return Err(ValidationError::InvalidService(format!(
                    "service name '{}' appears twice",
                    svc.name
                )));
            }
            if self.pod(svc.pod).is_none() {
                return Err(ValidationError::InvalidService(format!(
                    "service '{}' references unknown pod index {}",
                    svc.name, svc.pod
                )));
            }
            // Host octets .1/.2 belong to the routers, .11+ to clients,
            // .254 to the spine.
            let client_top = 10 + self.fabric.clients_per_leaf;
            if svc.host_octet <= client_top || svc.host_octet >= 254 {
                return Err(ValidationError::InvalidService(format!(
                    "service '{}' host octet {} collides with a reserved range",
                    svc.name, svc.host_octet
                )));
            }
        }

        if !self.general.backup_target.is_empty()
            && !self.services.is_empty()
            && !service_names.contains(&self.general.backup_target)
        {
            return Err(ValidationError::InvalidGeneral(format!(
                "backup_target '{}' is not a configured service",
                self.general.backup_target
            )));
        }

        Ok(())
    }
}

fn service(name: &str, pod: u8, leaf: u8) -> ServiceConfig {
    ServiceConfig {
        name: name.to_string(),
        pod,
        leaf,
        host_octet: default_service_octet(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_config_is_valid() {
        let config = Config::reference();
        assert!(config.validate().is_ok());
        assert_eq!(config.fabric.pods.len(), 2);
        assert_eq!(config.pod(0).unwrap().leaf_count, 16);
        assert_eq!(config.pod(1).unwrap().leaf_count, 13);
        assert_eq!(config.scenario_secs(), 60);
    }

    #[test]
    fn rejects_short_scenario_time() {
        let mut config = Config::reference();
        config.general.scenario_time = "3s".to_string();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ValidationError::InvalidGeneral(_)));
    }

    #[test]
    fn rejects_client_count_out_of_range() {
        let mut config = Config::reference();
        config.fabric.clients_per_leaf = 0;
        assert!(matches!(
            config.validate().unwrap_err(),
            ValidationError::InvalidClients(_)
        ));
        config.fabric.clients_per_leaf = 11;
        assert!(matches!(
            config.validate().unwrap_err(),
            ValidationError::InvalidClients(_)
        ));
    }

    #[test]
    fn rejects_duplicate_pod_index() {
        let mut config = Config::reference();
        config.fabric.pods[1].index = 0;
        assert!(matches!(
            config.validate().unwrap_err(),
            ValidationError::InvalidFabric(_)
        ));
    }

    #[test]
    fn rejects_pod_index_out_of_plan() {
        let mut config = Config::reference();
        config.fabric.pods[1].index = 2;
        assert!(matches!(
            config.validate().unwrap_err(),
            ValidationError::InvalidFabric(_)
        ));
    }

    #[test]
    fn rejects_oversized_pod() {
        let mut config = Config::reference();
        config.fabric.pods[0].leaf_count = MAX_LEAF_PAIRS + 1;
        assert!(matches!(
            config.validate().unwrap_err(),
            ValidationError::InvalidFabric(_)
        ));
    }

    #[test]
    fn rejects_reserved_service_octet() {
        let mut config = Config::reference();
        config.services[0].host_octet = 254;
        assert!(matches!(
            config.validate().unwrap_err(),
            ValidationError::InvalidService(_)
        ));
        config.services[0].host_octet = 2;
        assert!(matches!(
            config.validate().unwrap_err(),
            ValidationError::InvalidService(_)
        ));
    }

    #[test]
    fn rejects_unknown_backup_target() {
        let mut config = Config::reference();
        config.general.backup_target = "NOSUCH".to_string();
        assert!(matches!(
            config.validate().unwrap_err(),
            ValidationError::InvalidGeneral(_)
        ));
    }

    #[test]
    fn zero_leaf_pod_is_allowed() {
        let mut config = Config::reference();
        config.fabric.pods[1].leaf_count = 0;
        // Drop attachments that referenced the now-empty pod.
        config.services.retain(|s| s.pod != 1);
        config.clients.retain(|c| c.pod != 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn roundtrips_through_yaml() {
        let config = Config::reference();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let parsed: Config = serde_yaml::from_str(&yaml).unwrap();
        assert!(parsed.validate().is_ok());
        assert_eq!(parsed.services.len(), config.services.len());
    }
}
