//! dr_core — Core domain types, ids, ratio arithmetic, and deterministic
//! ordering helpers for the vDU placement engine.
//!
//! This crate is **I/O-free**. It defines the stable types used across the
//! engine (`dr_catalog`, `dr_algo`, `dr_pipeline`, `dr_report`, `dr_cli`):
//!
//! - Domain model: `Operator`, `PodKind`, `PodRequirement`,
//!   `ServerConfiguration`, `FeatureFlags`, `DeploymentInput`,
//!   `ResolvedWorkload`, `SocketSlot`, `PlacementPlan`, `ValidationResult`.
//! - Ids: `RuleId`, `PodInstanceId`.
//! - Deterministic ordering helpers (`StableOrd`).
//! - Integer-first rational arithmetic (`Ratio`, `Vcores`).
//!
//! Serialization derives are gated behind the `serde` feature.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod errors;
pub mod ids;
pub mod determinism;
pub mod ratio;
pub mod domain;

pub mod prelude {
    pub use crate::determinism::StableOrd;
    pub use crate::domain::*;
    pub use crate::errors::CoreError;
    pub use crate::ids::{PodInstanceId, RuleId};
    pub use crate::ratio::{Ratio, Vcores};
}
