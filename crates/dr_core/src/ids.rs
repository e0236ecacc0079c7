//! Stable identifiers used across the engine: rule codes and pod-instance
//! identity. Both are closed, tagged sets rather than open strings so that
//! downstream matches stay exhaustive.

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The closed set of Deterministic Rule codes this engine evaluates.
#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RuleId {
    C1,
    C2,
    C3,
    C4,
    M1,
    M2,
    M3,
    M4,
    O1,
    O2,
    O3,
    O4,
    V1,
    V2,
    V3,
    /// All rules passed but the planner could not seat every pod.
    PlacementInfeasible,
}

impl RuleId {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleId::C1 => "C1",
            RuleId::C2 => "C2",
            RuleId::C3 => "C3",
            RuleId::C4 => "C4",
            RuleId::M1 => "M1",
            RuleId::M2 => "M2",
            RuleId::M3 => "M3",
            RuleId::M4 => "M4",
            RuleId::O1 => "O1",
            RuleId::O2 => "O2",
            RuleId::O3 => "O3",
            RuleId::O4 => "O4",
            RuleId::V1 => "V1",
            RuleId::V2 => "V2",
            RuleId::V3 => "V3",
            RuleId::PlacementInfeasible => "PLACEMENT_INFEASIBLE",
        }
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of one concrete pod instance within a resolved workload.
///
/// A `PodRequirement` with `quantity > 1` expands into several instances;
/// `instance_index` distinguishes them (0-based). `requirement_index` is the
/// position of the originating requirement within the resolved workload's
/// pod list, which is itself stable (insertion order, see
/// `ResolvedWorkload`).
#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PodInstanceId {
    pub requirement_index: u32,
    pub instance_index: u32,
}

impl PodInstanceId {
    pub fn new(requirement_index: u32, instance_index: u32) -> Self {
        Self { requirement_index, instance_index }
    }
}

impl fmt::Display for PodInstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "req{}#{}", self.requirement_index, self.instance_index)
    }
}
