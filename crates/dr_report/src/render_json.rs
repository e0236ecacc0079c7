//! Machine-readable rendering of a `ValidationResult` (§4.9), behind the
//! `report-json` feature. Same information as `render_text`, structured for
//! programmatic consumers rather than formatted for a terminal.

use serde_json::{json, Value};

use dr_catalog::pod_flavor::PodFlavorTable;
use dr_core::domain::{PodKind, ValidationResult};

use crate::hints::hints_for;

pub fn render_json(result: &ValidationResult, pod_flavor: &dyn PodFlavorTable) -> Value {
    let violations: Vec<Value> = result
        .violations
        .iter()
        .map(|v| {
            json!({
                "rule_id": v.rule_id.as_str(),
                "category": v.category.to_string(),
                "detail": v.detail,
                "offending": v.offending.iter().map(|id| id.to_string()).collect::<Vec<_>>(),
            })
        })
        .collect();

    let metrics: Vec<Value> = result
        .metrics
        .iter()
        .map(|m| {
            json!({
                "server_index": m.server_index,
                "socket_index": m.socket_index,
                "vcores_total": m.vcores_total.to_string(),
                "vcores_used": m.vcores_used.to_string(),
                "vcores_available": m.vcores_available.to_string(),
            })
        })
        .collect();

    let plan = result.plan.as_ref().map(|p| {
        let assignments: Vec<Value> = p
            .assignments
            .iter()
            .map(|(id, (server, socket))| {
                json!({
                    "pod_instance": id.to_string(),
                    "server_index": server,
                    "socket_index": socket,
                })
            })
            .collect();
        json!({ "assignments": assignments })
    });

    let pod_flavors: Vec<Value> = PodKind::ALL
        .iter()
        .filter_map(|&kind| {
            pod_flavor.spec_for(kind).map(|spec| {
                json!({
                    "pod_kind": kind.as_str(),
                    "display_name": spec.display_name,
                    "description": spec.description,
                })
            })
        })
        .collect();

    json!({
        "success": result.success,
        "message": result.message,
        "violations": violations,
        "metrics": metrics,
        "plan": plan,
        "hints": hints_for(&result.violations),
        "pod_flavors": pod_flavors,
    })
}
