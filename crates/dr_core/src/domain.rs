//! Domain model: the tagged variants and plain structs shared by every
//! stage of the engine. Operator, PodKind, and violation category are
//! closed sets modeled as enums with exhaustive matches elsewhere — there
//! is no open class hierarchy to extend at runtime; adding an operator is a
//! catalog change plus a new variant here.

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use core::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::ids::{PodInstanceId, RuleId};
use crate::ratio::Vcores;

/// Telecom operator identity. Determines which operator-specific rules
/// apply and the CaaS/shared-core deductions per socket (§4.1).
#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Operator {
    Vos,
    Verizon,
    Boost,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Vos => "VOS",
            Operator::Verizon => "Verizon",
            Operator::Boost => "Boost",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operator {
    type Err = UnknownOperator;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "VOS" => Ok(Operator::Vos),
            "Verizon" => Ok(Operator::Verizon),
            "Boost" => Ok(Operator::Boost),
            other => Err(UnknownOperator(String::from(other))),
        }
    }
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct UnknownOperator(pub String);

impl fmt::Display for UnknownOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown operator: {}", self.0)
    }
}

/// Pod kind. The catalog's default mandatory set is
/// `{DPP, DIP, RMP, CMP, DMP, PMP}`; `{IPP, IIP, UPP, CSP, vCU}` are
/// conditionally present depending on operator, flavor, and flags.
/// Co-location/anti-affinity membership is attached by the catalog, not by
/// the kind itself (§9 "catalog as data").
#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PodKind {
    Dpp,
    Dip,
    Rmp,
    Cmp,
    Dmp,
    Pmp,
    Ipp,
    Iip,
    Upp,
    Csp,
    Vcu,
}

impl PodKind {
    pub const ALL: [PodKind; 11] = [
        PodKind::Dpp,
        PodKind::Dip,
        PodKind::Rmp,
        PodKind::Cmp,
        PodKind::Dmp,
        PodKind::Pmp,
        PodKind::Ipp,
        PodKind::Iip,
        PodKind::Upp,
        PodKind::Csp,
        PodKind::Vcu,
    ];

    /// The default mandatory-pod set every operator shares (§4.1); VOS adds
    /// `IPP` on top of this via `RuleCatalog::mandatory_pods`.
    pub const BASE_MANDATORY: [PodKind; 6] = [
        PodKind::Dpp,
        PodKind::Dip,
        PodKind::Rmp,
        PodKind::Cmp,
        PodKind::Dmp,
        PodKind::Pmp,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PodKind::Dpp => "DPP",
            PodKind::Dip => "DIP",
            PodKind::Rmp => "RMP",
            PodKind::Cmp => "CMP",
            PodKind::Dmp => "DMP",
            PodKind::Pmp => "PMP",
            PodKind::Ipp => "IPP",
            PodKind::Iip => "IIP",
            PodKind::Upp => "UPP",
            PodKind::Csp => "CSP",
            PodKind::Vcu => "vCU",
        }
    }
}

impl fmt::Display for PodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PodKind {
    type Err = UnknownPodKind;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DPP" => Ok(PodKind::Dpp),
            "DIP" => Ok(PodKind::Dip),
            "RMP" => Ok(PodKind::Rmp),
            "CMP" => Ok(PodKind::Cmp),
            "DMP" => Ok(PodKind::Dmp),
            "PMP" => Ok(PodKind::Pmp),
            "IPP" => Ok(PodKind::Ipp),
            "IIP" => Ok(PodKind::Iip),
            "UPP" => Ok(PodKind::Upp),
            "CSP" => Ok(PodKind::Csp),
            "vCU" | "VCU" => Ok(PodKind::Vcu),
            other => Err(UnknownPodKind(String::from(other))),
        }
    }
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct UnknownPodKind(pub String);

impl fmt::Display for UnknownPodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown pod kind: {}", self.0)
    }
}

/// Where a pod in a `ResolvedWorkload` came from. Retained purely for
/// diagnostics (§4.2) — it does not change how the pod is evaluated or
/// placed, and resolver monotonicity (invariant 6) only concerns which
/// pods are present, not how they are tagged.
#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PodOrigin {
    Explicit,
    OperatorMandatory,
    FlavorImplicit,
    FlagConditional,
}

/// One requested pod in a `DeploymentInput`.
///
/// Invariant: `vcores > 0`; if `socket_affinity` is set, `quantity == 1`
/// (a pinned pod cannot fan out to multiple instances without also pinning
/// each one individually, which this model does not support).
#[derive(Clone, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PodRequirement {
    pub kind: PodKind,
    pub vcores: Vcores,
    pub quantity: u32,
    pub socket_affinity: Option<u32>,
    pub anti_affinity_group: Option<String>,
    pub co_location_group: Option<String>,
}

impl PodRequirement {
    pub fn is_well_formed(&self) -> bool {
        self.vcores.is_positive()
            && self.quantity >= 1
            && !(self.socket_affinity.is_some() && self.quantity != 1)
    }
}

/// A candidate server. `vcores` is the value as declared by the caller;
/// rule C2 checks it against `2 * pcores` rather than the type deriving it,
/// so a mismatched declaration is reportable instead of silently coerced.
#[derive(Clone, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ServerConfiguration {
    pub pcores: u32,
    pub vcores: Vcores,
    pub sockets: u8,
    pub pcores_per_socket: Option<u32>,
}

impl ServerConfiguration {
    pub fn declared_vcores_match_pcores(&self) -> bool {
        self.vcores == Vcores::from_whole(2 * self.pcores as i64)
    }

    pub fn has_valid_socket_count(&self) -> bool {
        matches!(self.sockets, 1 | 2)
    }

    /// `pcores_per_socket`, if present, must divide `pcores` by `sockets`
    /// exactly (V2).
    pub fn pcores_per_socket_consistent(&self) -> bool {
        match self.pcores_per_socket {
            None => true,
            Some(pps) => {
                self.sockets as u32 * pps == self.pcores
            }
        }
    }
}

/// Orthogonal feature toggles; any combination is permitted (§3).
#[derive(Clone, Copy, Eq, PartialEq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FeatureFlags {
    pub ha_enabled: bool,
    pub in_service_upgrade: bool,
    pub vdu_ru_switch_connection: bool,
    pub directx2_required: bool,
    pub vcu_deployment_required: bool,
}

/// The raw request the engine validates and (optionally) plans.
///
/// Invariant: at least one server; total server vcores > 0.
#[derive(Clone, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DeploymentInput {
    pub operator: Operator,
    pub vdu_flavor_name: String,
    pub pod_requirements: Vec<PodRequirement>,
    pub server_configs: Vec<ServerConfiguration>,
    pub feature_flags: FeatureFlags,
}

impl DeploymentInput {
    pub fn total_server_vcores(&self) -> Vcores {
        self.server_configs
            .iter()
            .fold(Vcores::ZERO, |acc, s| acc + s.vcores)
    }
}

/// One pod in a `ResolvedWorkload`, tagged with where it came from.
#[derive(Clone, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ResolvedPod {
    pub kind: PodKind,
    pub vcores: Vcores,
    pub quantity: u32,
    pub socket_affinity: Option<u32>,
    pub anti_affinity_group: Option<String>,
    pub co_location_group: Option<String>,
    pub origin: PodOrigin,
}

impl ResolvedPod {
    /// Expand `quantity` into stable per-instance ids, given this pod's
    /// position in the resolved workload's pod list.
    pub fn instance_ids(&self, requirement_index: u32) -> Vec<PodInstanceId> {
        (0..self.quantity)
            .map(|i| PodInstanceId::new(requirement_index, i))
            .collect()
    }
}

/// `DeploymentInput` plus every pod the resolver injected, in the fixed
/// resolution order (§4.2): explicit, then operator-mandatory, then
/// flavor-implicit, then flag-conditional. Iteration order over `pods` is
/// the authoritative "resolved order" the planner consumes.
#[derive(Clone, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ResolvedWorkload {
    pub input: DeploymentInput,
    pub pods: Vec<ResolvedPod>,
}

impl ResolvedWorkload {
    pub fn kinds_present(&self) -> alloc::collections::BTreeSet<PodKind> {
        self.pods.iter().map(|p| p.kind).collect()
    }
}

/// One CPU socket's available capacity after CaaS/shared-core deductions
/// (§4.3, rules C3/C4).
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SocketSlot {
    pub server_index: u32,
    pub socket_index: u32,
    pub vcores_total: Vcores,
    pub vcores_caas: Vcores,
    pub vcores_shared: Vcores,
}

impl SocketSlot {
    /// `vcores_total - vcores_caas - vcores_shared`. Invariant: never
    /// negative for a catalog that has not been load-time rejected.
    pub fn vcores_available(&self) -> Vcores {
        self.vcores_total
            .checked_sub(self.vcores_caas)
            .and_then(|v| v.checked_sub(self.vcores_shared))
            .unwrap_or(Vcores::ZERO)
    }

    pub fn key(&self) -> (u32, u32) {
        (self.server_index, self.socket_index)
    }
}

/// Placement strategy for `PlacementPlanner` (§4.7). A closed set, not an
/// open trait object — there are exactly four and no host is expected to
/// add a fifth without a code change.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PlacementStrategy {
    FirstFit,
    BestFit,
    WorstFit,
    Balanced,
}

impl Default for PlacementStrategy {
    fn default() -> Self {
        PlacementStrategy::Balanced
    }
}

impl fmt::Display for PlacementStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PlacementStrategy::FirstFit => "first-fit",
            PlacementStrategy::BestFit => "best-fit",
            PlacementStrategy::WorstFit => "worst-fit",
            PlacementStrategy::Balanced => "balanced",
        };
        f.write_str(s)
    }
}

impl FromStr for PlacementStrategy {
    type Err = UnknownStrategy;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "first-fit" => Ok(PlacementStrategy::FirstFit),
            "best-fit" => Ok(PlacementStrategy::BestFit),
            "worst-fit" => Ok(PlacementStrategy::WorstFit),
            "balanced" => Ok(PlacementStrategy::Balanced),
            other => Err(UnknownStrategy(String::from(other))),
        }
    }
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct UnknownStrategy(pub String);

impl fmt::Display for UnknownStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown placement strategy: {}", self.0)
    }
}

/// Options the caller passes to the engine entry point (§6).
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub struct ValidateOptions {
    pub generate_plan: bool,
    pub strategy: PlacementStrategy,
}

impl Default for ValidateOptions {
    fn default() -> Self {
        Self { generate_plan: false, strategy: PlacementStrategy::default() }
    }
}

/// A completed placement: pod instance → slot, plus remaining capacity per
/// slot after every assignment.
///
/// Invariant: for every slot, the sum of assigned pod vcores does not
/// exceed `slot.vcores_available()`.
#[derive(Clone, Eq, PartialEq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PlacementPlan {
    #[cfg_attr(feature = "serde", serde(with = "assignment_pairs"))]
    pub assignments: BTreeMap<PodInstanceId, (u32, u32)>,
    #[cfg_attr(feature = "serde", serde(with = "remaining_pairs"))]
    pub remaining: BTreeMap<(u32, u32), Vcores>,
}

// `PodInstanceId` and `(u32, u32)` aren't strings, and `serde_json` only
// accepts string-like keys for JSON objects — a plain derive on either map
// would fail to serialize. Both fields round-trip as arrays of pairs
// instead.
#[cfg(feature = "serde")]
mod assignment_pairs {
    use super::PodInstanceId;
    use alloc::collections::BTreeMap;
    use alloc::vec::Vec;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(map: &BTreeMap<PodInstanceId, (u32, u32)>, s: S) -> Result<S::Ok, S::Error> {
        map.iter().collect::<Vec<_>>().serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<BTreeMap<PodInstanceId, (u32, u32)>, D::Error> {
        let pairs = Vec::<(PodInstanceId, (u32, u32))>::deserialize(d)?;
        Ok(pairs.into_iter().collect())
    }
}

#[cfg(feature = "serde")]
mod remaining_pairs {
    use super::Vcores;
    use alloc::collections::BTreeMap;
    use alloc::vec::Vec;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(map: &BTreeMap<(u32, u32), Vcores>, s: S) -> Result<S::Ok, S::Error> {
        map.iter().collect::<Vec<_>>().serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<BTreeMap<(u32, u32), Vcores>, D::Error> {
        let pairs = Vec::<((u32, u32), Vcores)>::deserialize(d)?;
        Ok(pairs.into_iter().collect())
    }
}

impl PlacementPlan {
    pub fn assigned_slot(&self, id: &PodInstanceId) -> Option<(u32, u32)> {
        self.assignments.get(id).copied()
    }
}

/// The category a `Violation` belongs to (§9 "tagged variants").
#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ViolationCategory {
    Capacity,
    Placement,
    Operator,
    Validation,
}

impl fmt::Display for ViolationCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ViolationCategory::Capacity => "Capacity",
            ViolationCategory::Placement => "Placement",
            ViolationCategory::Operator => "Operator",
            ViolationCategory::Validation => "Validation",
        };
        f.write_str(s)
    }
}

/// One rule failure, as reported by an evaluator.
#[derive(Clone, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Violation {
    pub rule_id: RuleId,
    pub category: ViolationCategory,
    pub detail: String,
    pub offending: Vec<PodInstanceId>,
}

impl Violation {
    pub fn new(rule_id: RuleId, category: ViolationCategory, detail: impl Into<String>) -> Self {
        Self { rule_id, category, detail: detail.into(), offending: Vec::new() }
    }

    pub fn with_offending(mut self, offending: Vec<PodInstanceId>) -> Self {
        self.offending = offending;
        self
    }
}

/// Per-socket utilization, for `ResponseFormatter`'s utilization table.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SlotUtilization {
    pub server_index: u32,
    pub socket_index: u32,
    pub vcores_total: Vcores,
    pub vcores_used: Vcores,
    pub vcores_available: Vcores,
}

/// The outcome of `validate()` (§3, §6). Never an `Err` for rule
/// failures — only catalog-load or programming errors cross the public
/// boundary as `Result::Err` (§7); this is always a value.
#[derive(Clone, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ValidationResult {
    pub success: bool,
    pub message: String,
    pub violations: Vec<Violation>,
    pub plan: Option<PlacementPlan>,
    pub metrics: Vec<SlotUtilization>,
}
