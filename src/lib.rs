//! # Fabricsim - Configuration utility for leaf-spine network emulations
//!
//! This library generates deterministic address plans and static-route
//! sets for a two-tier, dual-pod leaf-spine fabric emulated on a
//! virtual-network runtime.
//!
//! ## Overview
//!
//! A fabric consists of two pods (North and South in the reference
//! deployment), each built from redundant leaf-router pairs uplinked
//! to a pod-local spine, with client and server hosts behind leaf
//! switches. Fabricsim computes, for every router and spine, the
//! complete set of destination-prefix/next-hop entries needed for full
//! any-to-any reachability — without a dynamic routing protocol,
//! without overlapping address ranges, and without per-router manual
//! configuration.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - `config`: Type-safe configuration structures and YAML parsing
//! - `addr`: Deterministic position-to-subnet address allocation
//! - `topology`: Node/link graph construction with addressing metadata
//! - `routing`: Static-route synthesis for routers, spines, and hosts
//! - `emulation`: Fabric plan types and configuration application
//! - `scenario`: Traffic-scenario planning (throughput-test commands)
//! - `control`: Interactive control-surface command parsing
//! - `results`: JSON-to-CSV throughput-record conversion
//! - `orchestrator`: High-level orchestration of plan generation
//! - `utils`: Utility functions and helpers
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use fabricsim::{config::Config, orchestrator};
//! use std::path::Path;
//!
//! // The built-in reference deployment: 16-leaf North pod, 13-leaf
//! // South pod.
//! let config = Config::reference();
//!
//! // Generate the plan and its artifacts.
//! let (plan, topology) = orchestrator::generate_fabric_plan(&config, Path::new("fabric_output"))?;
//!
//! // fabric_output now contains:
//! // - fabric_plan.yaml: nodes, links, assignments, routes
//! // - host_registry.json: every attached host with its address
//! // - configure_fabric.sh: the plan as node-prefixed commands
//! # Ok::<(), color_eyre::eyre::Report>(())
//! ```
//!
//! ## Error Handling
//!
//! Library modules return `thiserror` error enums; the orchestration
//! layer and binary use `color_eyre` for error reports with context.
//! Parameter errors are rejected before any allocation begins, and a
//! partial topology is never returned.

pub mod addr;
pub mod config;
pub mod control;
pub mod emulation;
pub mod orchestrator;
pub mod results;
pub mod routing;
pub mod scenario;
pub mod topology;
pub mod utils;
