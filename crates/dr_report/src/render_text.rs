//! Stable text rendering of a `ValidationResult` (§4.9). Used by the CLI's
//! `report.txt` output and exercised directly by the S1-S6 scenario tests.
//!
//! Section order is fixed: verdict, violations by category, per-socket
//! utilization, optimization hints, pod-flavor catalog. A section with
//! nothing to show is omitted rather than printed empty, so a passing
//! result with no plan renders as just a verdict line.

use std::fmt::Write as _;

use dr_catalog::pod_flavor::PodFlavorTable;
use dr_core::domain::{PodKind, ValidationResult, ViolationCategory};

use crate::hints::hints_for;

const CATEGORY_ORDER: [ViolationCategory; 4] = [
    ViolationCategory::Capacity,
    ViolationCategory::Placement,
    ViolationCategory::Operator,
    ViolationCategory::Validation,
];

pub fn render_text(result: &ValidationResult, pod_flavor: &dyn PodFlavorTable) -> String {
    let mut out = String::new();

    if result.success {
        let _ = writeln!(out, "VERDICT: PASS — {}", result.message);
    } else {
        let _ = writeln!(out, "VERDICT: FAIL — {}", result.message);
    }

    if !result.violations.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "VIOLATIONS:");
        for category in CATEGORY_ORDER {
            let in_category: Vec<_> = result.violations.iter().filter(|v| v.category == category).collect();
            if in_category.is_empty() {
                continue;
            }
            let _ = writeln!(out, "  {category}:");
            for v in in_category {
                let _ = write!(out, "    [{}] {}", v.rule_id, v.detail);
                if !v.offending.is_empty() {
                    let ids: Vec<String> = v.offending.iter().map(|id| id.to_string()).collect();
                    let _ = write!(out, " (pods: {})", ids.join(", "));
                }
                let _ = writeln!(out);
            }
        }
    }

    if !result.metrics.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "SOCKET UTILIZATION:");
        for m in &result.metrics {
            let _ = writeln!(
                out,
                "  server {} socket {}: {} used / {} available of {} total",
                m.server_index, m.socket_index, m.vcores_used, m.vcores_available, m.vcores_total
            );
        }
    }

    let hints = hints_for(&result.violations);
    if !hints.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "HINTS:");
        for hint in hints {
            let _ = writeln!(out, "  - {hint}");
        }
    }

    let flavors: Vec<_> = PodKind::ALL.iter().filter_map(|&kind| pod_flavor.spec_for(kind).map(|spec| (kind, spec))).collect();
    if !flavors.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "POD FLAVORS:");
        for (kind, spec) in flavors {
            if spec.description.is_empty() {
                let _ = writeln!(out, "  {kind}: {}", spec.display_name);
            } else {
                let _ = writeln!(out, "  {kind}: {} — {}", spec.display_name, spec.description);
            }
        }
    }

    out
}
