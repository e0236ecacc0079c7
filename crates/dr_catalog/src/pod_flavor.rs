//! `PodFlavorTable` (§6): per-pod resource specs, consumed only for
//! metrics enrichment — never for correctness. If absent, `ResponseFormatter`
//! simply omits the enrichment fields it would have filled in.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;

use dr_core::domain::PodKind;

use crate::{CatalogError, CatalogResult};

#[derive(Clone, Debug, Deserialize)]
pub struct PodFlavorSpec {
    pub display_name: String,
    #[serde(default)]
    pub description: String,
}

pub trait PodFlavorTable {
    fn spec_for(&self, kind: PodKind) -> Option<PodFlavorSpec>;
}

/// JSON document shaped `{ "<POD_KIND>": {"display_name": "...", "description": "..."} }`.
#[derive(Clone, Debug)]
pub struct JsonPodFlavorTable {
    specs: Arc<BTreeMap<PodKind, PodFlavorSpec>>,
}

impl JsonPodFlavorTable {
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
            .ok_or(CatalogError::InvalidValue { key: "pod_flavor", reason: "expected a top-level object".into() })?;
        let mut specs = BTreeMap::new();
        for (kind_str, v) in obj {
            let kind = kind_str.parse::<PodKind>().map_err(|_| CatalogError::InvalidValue {
                key: "pod_flavor",
                reason: format!("unknown pod kind '{kind_str}'"),
            })?;
            let spec: PodFlavorSpec = serde_json::from_value(v.clone())?;
            specs.insert(kind, spec);
        }
        Ok(Self { specs: Arc::new(specs) })
    }

    /// Empty table — used when the host has no pod-flavor collaborator.
    pub fn empty() -> Self {
        Self { specs: Arc::new(BTreeMap::new()) }
    }
}

impl PodFlavorTable for JsonPodFlavorTable {
    fn spec_for(&self, kind: PodKind) -> Option<PodFlavorSpec> {
        self.specs.get(&kind).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_specs_keyed_by_pod_kind() {
        let doc = serde_json::json!({
            "DPP": {"display_name": "Distributed Protocol Pod", "description": "L1 scheduler"},
            "IPP": {"display_name": "Ingress Processing Pod"}
        });
        let table = JsonPodFlavorTable::from_value(doc).unwrap();
        let dpp = table.spec_for(PodKind::Dpp).unwrap();
        assert_eq!(dpp.display_name, "Distributed Protocol Pod");
        assert_eq!(dpp.description, "L1 scheduler");
        let ipp = table.spec_for(PodKind::Ipp).unwrap();
        assert_eq!(ipp.description, "", "description defaults to empty when absent");
        assert!(table.spec_for(PodKind::Rmp).is_none());
    }

    #[test]
    fn empty_table_has_no_specs() {
        let table = JsonPodFlavorTable::empty();
        assert!(table.spec_for(PodKind::Dpp).is_none());
    }

    #[test]
    fn unknown_pod_kind_key_is_rejected() {
        let doc = serde_json::json!({"NOT_A_KIND": {"display_name": "x"}});
        assert!(JsonPodFlavorTable::from_value(doc).is_err());
    }
}
