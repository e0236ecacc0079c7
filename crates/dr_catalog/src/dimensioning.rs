//! `DimensioningLookup` (§6): the vDU-flavor -> pod-kind mapping consumed
//! by `WorkloadResolver`. The CSV-backed production loader for this table
//! is out of scope (§1); this module only provides the trait and a
//! JSON-backed reference implementation so the engine can be exercised
//! end-to-end without a host-supplied collaborator.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde_json::Value;

use dr_core::domain::{Operator, PodKind};
use dr_core::ratio::Vcores;

use crate::{CatalogError, CatalogResult};

/// Maps an operator + vDU flavor name to the pods a deployment of that
/// flavor should inject, with their vcore costs.
pub trait DimensioningLookup {
    fn pods_for(&self, operator: Operator, vdu_flavor_name: &str) -> Option<Vec<(PodKind, Vcores)>>;
}

/// JSON document shaped `{ "<flavor_name>": [{"pod_kind": "...", "vcores": "8.0"}, ...] }`.
///
/// A real deployment may key dimensioning by operator as well as flavor;
/// this reference loader keys by flavor name only (the `operator` parameter
/// on the trait exists so a richer implementation can discriminate without
/// changing the trait's callers).
#[derive(Clone, Debug)]
pub struct JsonDimensioningTable {
    by_flavor: Arc<BTreeMap<String, Vec<(PodKind, Vcores)>>>,
}

impl JsonDimensioningTable {
    pub fn load(path: &Path) -> CatalogResult<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_str(&text)
    }

    pub fn from_str(text: &str) -> CatalogResult<Self> {
        let doc: Value = serde_json::from_str(text)?;
        Self::from_value(doc)
    }

    pub fn from_value(doc: Value) -> CatalogResult<Self> {
        let obj = doc
            .as_object()
            .ok_or(CatalogError::InvalidValue { key: "dimensioning", reason: "expected a top-level object".into() })?;
        let mut by_flavor = BTreeMap::new();
        for (flavor, entries) in obj {
            let arr = entries.as_array().ok_or(CatalogError::InvalidValue {
                key: "dimensioning",
                reason: format!("'{flavor}' must map to an array"),
            })?;
            let mut pods = Vec::with_capacity(arr.len());
            for entry in arr {
                let kind_str = entry
                    .get("pod_kind")
                    .and_then(Value::as_str)
                    .ok_or(CatalogError::InvalidValue { key: "dimensioning", reason: format!("'{flavor}' entry missing pod_kind") })?;
                let kind = kind_str.parse::<PodKind>().map_err(|_| CatalogError::InvalidValue {
                    key: "dimensioning",
                    reason: format!("'{flavor}' has unknown pod kind '{kind_str}'"),
                })?;
                let vcores_str = entry
                    .get("vcores")
                    .and_then(Value::as_str)
                    .ok_or(CatalogError::InvalidValue { key: "dimensioning", reason: format!("'{flavor}' entry missing vcores") })?;
                let vcores = Vcores::parse(vcores_str).map_err(|_| CatalogError::InvalidValue {
                    key: "dimensioning",
                    reason: format!("'{flavor}' has invalid vcores '{vcores_str}'"),
                })?;
                pods.push((kind, vcores));
            }
            by_flavor.insert(flavor.clone(), pods);
        }
        Ok(Self { by_flavor: Arc::new(by_flavor) })
    }
}

impl DimensioningLookup for JsonDimensioningTable {
    fn pods_for(&self, _operator: Operator, vdu_flavor_name: &str) -> Option<Vec<(PodKind, Vcores)>> {
        self.by_flavor.get(vdu_flavor_name).cloned()
    }
}
