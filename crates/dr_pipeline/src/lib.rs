//! dr_pipeline — wires `dr_catalog` + `dr_algo` into the engine entry point.
//!
//! `resolver::resolve` turns a raw `DeploymentInput` into a `ResolvedWorkload`;
//! `orchestrator::validate` drives the fixed evaluation order (§4.8) and,
//! once everything passes, hands the workload to `dr_algo::planner`. Neither
//! module installs a `tracing` subscriber — only the CLI owns that.

#![forbid(unsafe_code)]

pub mod orchestrator;
pub mod resolver;

pub mod prelude {
    pub use crate::orchestrator::validate;
    pub use crate::resolver::resolve;
}
