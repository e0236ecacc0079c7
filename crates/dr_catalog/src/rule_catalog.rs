//! The immutable, in-memory `RuleCatalog` (§4.1): per-operator CaaS/shared
//! core allocations, mandatory pod lists, co-location/anti-affinity groups,
//! per-flavor implicit pods, and the server-configuration section.
//!
//! Loaded once from a JSON document with top-level sections
//! `capacity_rules`, `placement_rules`, `operator_rules`, `validation_rules`,
//! `server_configurations` (§6). Unknown keys are ignored; missing required
//! keys raise a load-time error. Once built, `RuleCatalog` is cheap to
//! `Clone` (backed by `Arc`-wrapped maps) and safe to share across threads —
//! there is no interior mutability.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde_json::Value;

use dr_core::domain::{FeatureFlags, Operator, PodKind};
use dr_core::ratio::Vcores;

use crate::{CatalogError, CatalogResult};

const KNOWN_FLAGS: &[&str] = &[
    "ha_enabled",
    "in_service_upgrade",
    "vdu_ru_switch_connection",
    "directx2_required",
    "vcu_deployment_required",
];

fn flag_value(flags: &FeatureFlags, name: &str) -> bool {
    match name {
        "ha_enabled" => flags.ha_enabled,
        "in_service_upgrade" => flags.in_service_upgrade,
        "vdu_ru_switch_connection" => flags.vdu_ru_switch_connection,
        "directx2_required" => flags.directx2_required,
        "vcu_deployment_required" => flags.vcu_deployment_required,
        _ => false,
    }
}

/// A co-location or anti-affinity group as loaded from the catalog: a set
/// of pod kinds, gated behind an optional feature flag.
#[derive(Clone, Debug)]
pub struct PodGroup {
    pub requires_flag: Option<String>,
    pub pod_kinds: BTreeSet<PodKind>,
}

impl PodGroup {
    fn is_active(&self, flags: &FeatureFlags) -> bool {
        match &self.requires_flag {
            None => true,
            Some(f) => flag_value(flags, f),
        }
    }
}

#[derive(Debug)]
struct CatalogData {
    caas_cores_per_socket: BTreeMap<Operator, u32>,
    shared_cores_per_socket: BTreeMap<Operator, u32>,
    extra_mandatory_pods: BTreeMap<Operator, BTreeSet<PodKind>>,
    implicit_pods_by_flavor: BTreeMap<String, BTreeSet<PodKind>>,
    vcu_vcores_by_flavor: BTreeMap<String, Vcores>,
    anti_affinity_groups: BTreeMap<String, PodGroup>,
    co_location_groups: BTreeMap<String, PodGroup>,
    known_flavors: BTreeSet<String>,
    server_configurations_raw: Value,
}

/// Immutable rule catalog. Constructed once at startup via [`RuleCatalog::load`]
/// and thereafter read-only (§3 "Lifecycles"); `Clone` is O(1) (`Arc`-backed).
#[derive(Clone, Debug)]
pub struct RuleCatalog {
    data: Arc<CatalogData>,
    fingerprint: String,
}

impl RuleCatalog {
    pub fn load(path: &Path) -> CatalogResult<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_str(&text)
    }

    pub fn from_str(text: &str) -> CatalogResult<Self> {
        let doc: Value = serde_json::from_str(text)?;
        Self::from_value(doc)
    }

    pub fn from_value(doc: Value) -> CatalogResult<Self> {
        let fingerprint = crate::hasher::sha256_canonical_value(&doc).unwrap_or_default();

        let capacity_rules = require_object(&doc, "capacity_rules")?;
        let operator_rules = require_object(&doc, "operator_rules")?;
        let placement_rules = require_object(&doc, "placement_rules")?;
        let validation_rules = require_object(&doc, "validation_rules")?;
        let server_configurations = doc
            .get("server_configurations")
            .cloned()
            .ok_or(CatalogError::MissingKey("server_configurations"))?;

        let caas_cores_per_socket = parse_operator_u32_map(capacity_rules, "caas_cores_per_socket")?;
        let shared_cores_per_socket = parse_operator_u32_map(capacity_rules, "shared_cores_per_socket")?;

        let extra_mandatory_pods = parse_operator_podkind_set_map(operator_rules, "extra_mandatory_pods")?;
        let implicit_pods_by_flavor =
            parse_flavor_podkind_set_map(operator_rules, "implicit_pods_by_flavor")?;
        let vcu_vcores_by_flavor = parse_flavor_vcores_map(operator_rules, "vcu_vcores_by_flavor")?;

        let anti_affinity_groups = parse_group_map(placement_rules, "anti_affinity_groups")?;
        let co_location_groups = parse_group_map(placement_rules, "co_location_groups")?;

        let known_flavors = validation_rules
            .get("known_flavors")
            .and_then(Value::as_array)
            .map(|arr| {
                arr.iter()
                    .filter_map(Value::as_str)
                    .map(String::from)
                    .collect::<BTreeSet<_>>()
            })
            .unwrap_or_default();

        Ok(RuleCatalog {
            data: Arc::new(CatalogData {
                caas_cores_per_socket,
                shared_cores_per_socket,
                extra_mandatory_pods,
                implicit_pods_by_flavor,
                vcu_vcores_by_flavor,
                anti_affinity_groups,
                co_location_groups,
                known_flavors,
                server_configurations_raw: server_configurations,
            }),
            fingerprint,
        })
    }

    /// SHA-256 of the loaded document's canonical JSON, for logging.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn caas_cores_per_socket(&self, operator: Operator) -> u32 {
        self.data.caas_cores_per_socket.get(&operator).copied().unwrap_or(0)
    }

    pub fn shared_cores_per_socket(&self, operator: Operator) -> u32 {
        self.data.shared_cores_per_socket.get(&operator).copied().unwrap_or(0)
    }

    /// Always includes the base mandatory set; VOS (and any operator with a
    /// catalog entry) adds its own extras on top.
    pub fn mandatory_pods(&self, operator: Operator) -> BTreeSet<PodKind> {
        let mut set: BTreeSet<PodKind> = PodKind::BASE_MANDATORY.into_iter().collect();
        if let Some(extra) = self.data.extra_mandatory_pods.get(&operator) {
            set.extend(extra.iter().copied());
        }
        set
    }

    pub fn implicit_pods_for_flavor(&self, vdu_flavor_name: &str) -> BTreeSet<PodKind> {
        self.data
            .implicit_pods_by_flavor
            .get(vdu_flavor_name)
            .cloned()
            .unwrap_or_default()
    }

    pub fn vcu_vcores(&self, vdu_flavor_name: &str) -> Option<Vcores> {
        self.data.vcu_vcores_by_flavor.get(vdu_flavor_name).copied()
    }

    /// Co-location groups active under the given flags (operator accepted
    /// for interface parity with §4.1; no group in this catalog shape is
    /// currently operator-keyed).
    pub fn co_location_groups(
        &self,
        feature_flags: &FeatureFlags,
        _operator: Operator,
    ) -> BTreeMap<String, BTreeSet<PodKind>> {
        self.data
            .co_location_groups
            .iter()
            .filter(|(_, g)| g.is_active(feature_flags))
            .map(|(name, g)| (name.clone(), g.pod_kinds.clone()))
            .collect()
    }

    pub fn anti_affinity_groups(&self, feature_flags: &FeatureFlags) -> BTreeMap<String, BTreeSet<PodKind>> {
        self.data
            .anti_affinity_groups
            .iter()
            .filter(|(_, g)| g.is_active(feature_flags))
            .map(|(name, g)| (name.clone(), g.pod_kinds.clone()))
            .collect()
    }

    pub fn is_known_flavor(&self, vdu_flavor_name: &str) -> bool {
        self.data.known_flavors.contains(vdu_flavor_name)
    }

    pub fn server_configurations_raw(&self) -> &Value {
        &self.data.server_configurations_raw
    }
}

fn require_object<'a>(doc: &'a Value, key: &'static str) -> CatalogResult<&'a serde_json::Map<String, Value>> {
    doc.get(key)
        .ok_or(CatalogError::MissingKey(key))?
        .as_object()
        .ok_or(CatalogError::InvalidValue { key, reason: "expected an object".into() })
}

fn parse_operator_u32_map(
    obj: &serde_json::Map<String, Value>,
    key: &'static str,
) -> CatalogResult<BTreeMap<Operator, u32>> {
    let Some(v) = obj.get(key) else { return Ok(BTreeMap::new()) };
    let map = v
        .as_object()
        .ok_or(CatalogError::InvalidValue { key, reason: "expected an object keyed by operator".into() })?;
    let mut out = BTreeMap::new();
    for (k, v) in map {
        let op: Operator = k.parse().map_err(|_| CatalogError::InvalidValue {
            key,
            reason: format!("unknown operator '{k}'"),
        })?;
        let n = v.as_u64().ok_or(CatalogError::InvalidValue { key, reason: format!("'{k}' is not a non-negative integer") })?;
        out.insert(op, n as u32);
    }
    Ok(out)
}

fn parse_operator_podkind_set_map(
    obj: &serde_json::Map<String, Value>,
    key: &'static str,
) -> CatalogResult<BTreeMap<Operator, BTreeSet<PodKind>>> {
    let Some(v) = obj.get(key) else { return Ok(BTreeMap::new()) };
    let map = v
        .as_object()
        .ok_or(CatalogError::InvalidValue { key, reason: "expected an object keyed by operator".into() })?;
    let mut out = BTreeMap::new();
    for (k, v) in map {
        let op: Operator = k.parse().map_err(|_| CatalogError::InvalidValue {
            key,
            reason: format!("unknown operator '{k}'"),
        })?;
        out.insert(op, parse_podkind_array(v, key)?);
    }
    Ok(out)
}

fn parse_flavor_podkind_set_map(
    obj: &serde_json::Map<String, Value>,
    key: &'static str,
) -> CatalogResult<BTreeMap<String, BTreeSet<PodKind>>> {
    let Some(v) = obj.get(key) else { return Ok(BTreeMap::new()) };
    let map = v
        .as_object()
        .ok_or(CatalogError::InvalidValue { key, reason: "expected an object keyed by flavor name".into() })?;
    let mut out = BTreeMap::new();
    for (flavor, v) in map {
        out.insert(flavor.clone(), parse_podkind_array(v, key)?);
    }
    Ok(out)
}

fn parse_flavor_vcores_map(
    obj: &serde_json::Map<String, Value>,
    key: &'static str,
) -> CatalogResult<BTreeMap<String, Vcores>> {
    let Some(v) = obj.get(key) else { return Ok(BTreeMap::new()) };
    let map = v
        .as_object()
        .ok_or(CatalogError::InvalidValue { key, reason: "expected an object keyed by flavor name".into() })?;
    let mut out = BTreeMap::new();
    for (flavor, v) in map {
        let s = v.as_str().ok_or(CatalogError::InvalidValue { key, reason: format!("'{flavor}' is not a string") })?;
        let vcores = Vcores::parse(s).map_err(|_| CatalogError::InvalidValue {
            key,
            reason: format!("'{flavor}' has an invalid vcore quantity: {s}"),
        })?;
        out.insert(flavor.clone(), vcores);
    }
    Ok(out)
}

fn parse_podkind_array(v: &Value, key: &'static str) -> CatalogResult<BTreeSet<PodKind>> {
    let arr = v.as_array().ok_or(CatalogError::InvalidValue { key, reason: "expected an array of pod kinds".into() })?;
    arr.iter()
        .map(|e| {
            let s = e.as_str().ok_or(CatalogError::InvalidValue { key, reason: "pod kind must be a string".into() })?;
            s.parse::<PodKind>().map_err(|_| CatalogError::InvalidValue { key, reason: format!("unknown pod kind '{s}'") })
        })
        .collect()
}

fn parse_group_map(
    obj: &serde_json::Map<String, Value>,
    key: &'static str,
) -> CatalogResult<BTreeMap<String, PodGroup>> {
    let Some(v) = obj.get(key) else { return Ok(BTreeMap::new()) };
    let map = v
        .as_object()
        .ok_or(CatalogError::InvalidValue { key, reason: "expected an object keyed by group tag".into() })?;
    let mut out = BTreeMap::new();
    for (tag, entry) in map {
        let entry_obj = entry
            .as_object()
            .ok_or(CatalogError::InvalidValue { key, reason: format!("group '{tag}' must be an object") })?;
        let requires_flag = match entry_obj.get("requires_flag") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => {
                if !KNOWN_FLAGS.contains(&s.as_str()) {
                    return Err(CatalogError::InvalidValue {
                        key,
                        reason: format!("group '{tag}' references unknown flag '{s}'"),
                    });
                }
                Some(s.clone())
            }
            Some(_) => {
                return Err(CatalogError::InvalidValue { key, reason: format!("group '{tag}'.requires_flag must be a string or null") })
            }
        };
        let pod_kinds = parse_podkind_array(
            entry_obj.get("pod_kinds").ok_or(CatalogError::InvalidValue { key, reason: format!("group '{tag}' missing pod_kinds") })?,
            key,
        )?;
        out.insert(tag.clone(), PodGroup { requires_flag, pod_kinds });
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_doc() -> Value {
        serde_json::json!({
            "capacity_rules": {
                "caas_cores_per_socket": {"VOS": 1, "Verizon": 2, "Boost": 1},
                "shared_cores_per_socket": {"VOS": 1, "Verizon": 1, "Boost": 0}
            },
            "operator_rules": {
                "extra_mandatory_pods": {"VOS": ["IPP"]},
                "implicit_pods_by_flavor": {"special-flavor": ["IIP"]},
                "vcu_vcores_by_flavor": {"medium-regular-spr-t23": "8.0"}
            },
            "placement_rules": {
                "anti_affinity_groups": {
                    "dpp_upgrade": {"requires_flag": "in_service_upgrade", "pod_kinds": ["DPP"]},
                    "cmp_ha": {"requires_flag": "ha_enabled", "pod_kinds": ["CMP"]}
                },
                "co_location_groups": {
                    "directx2": {"requires_flag": "directx2_required", "pod_kinds": ["DIP", "DMP"]}
                }
            },
            "validation_rules": {
                "known_flavors": ["medium-regular-spr-t23", "special-flavor"]
            },
            "server_configurations": {}
        })
    }

    #[test]
    fn mandatory_pods_add_vos_ipp() {
        let cat = RuleCatalog::from_value(sample_doc()).unwrap();
        let base = cat.mandatory_pods(Operator::Boost);
        assert!(!base.contains(&PodKind::Ipp));
        let vos = cat.mandatory_pods(Operator::Vos);
        assert!(vos.contains(&PodKind::Ipp));
        assert!(vos.contains(&PodKind::Dpp));
    }

    #[test]
    fn anti_affinity_group_gated_by_flag() {
        let cat = RuleCatalog::from_value(sample_doc()).unwrap();
        let off = FeatureFlags::default();
        assert!(cat.anti_affinity_groups(&off).is_empty());

        let on = FeatureFlags { ha_enabled: true, ..Default::default() };
        let groups = cat.anti_affinity_groups(&on);
        assert!(groups.contains_key("cmp_ha"));
        assert!(!groups.contains_key("dpp_upgrade"));
    }

    #[test]
    fn missing_section_is_load_error() {
        let mut doc = sample_doc();
        doc.as_object_mut().unwrap().remove("capacity_rules");
        let err = RuleCatalog::from_value(doc).unwrap_err();
        assert!(matches!(err, CatalogError::MissingKey("capacity_rules")));
    }

    #[test]
    fn unknown_flag_reference_is_load_error() {
        let mut doc = sample_doc();
        doc["placement_rules"]["anti_affinity_groups"]["cmp_ha"]["requires_flag"] = serde_json::json!("nonexistent_flag");
        assert!(RuleCatalog::from_value(doc).is_err());
    }

    #[test]
    fn known_flavor_lookup() {
        let cat = RuleCatalog::from_value(sample_doc()).unwrap();
        assert!(cat.is_known_flavor("special-flavor"));
        assert!(!cat.is_known_flavor("does-not-exist"));
    }
}
