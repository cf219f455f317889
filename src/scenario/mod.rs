//! Traffic scenario module.
//!
//! This module plans throughput-test workloads over the built fabric.
//! Planning only produces command lists; launching and supervising the
//! test processes is the emulation runtime's job.

pub mod traffic;

// Re-export commonly used types
pub use traffic::{
    plan_scenario, ListenerTask, ScenarioError, ScenarioKind, ScenarioSettings, TrafficPlan,
    TrafficTask, BASE_PORT,
};
