//! PlacementEvaluator: rules M1–M4.
//!
//! These are structural feasibility checks that run before any socket
//! assignment exists — they bound what the planner (§planner) could
//! possibly achieve, they do not themselves assign sockets. M2/M4 reduce to
//! "enough sockets exist for this many mutually-exclusive instances"; the
//! planner's anti-affinity mechanism (driven by the groups the resolver
//! attaches) does the actual seating later.

use alloc::collections::BTreeSet;
use alloc::format;
use alloc::vec::Vec;

use dr_core::domain::{PodKind, ResolvedWorkload, Violation, ViolationCategory};
use dr_core::ids::RuleId;

use crate::common;

#[derive(Clone, Debug, Default)]
pub struct PlacementInputs {
    pub mandatory_pods: BTreeSet<PodKind>,
}

pub fn evaluate(workload: &ResolvedWorkload, inputs: &PlacementInputs) -> Vec<Violation> {
    let mut violations = Vec::new();

    check_m1(workload, inputs, &mut violations);
    check_m2(workload, &mut violations);
    check_m3(workload, &mut violations);
    check_m4(workload, &mut violations);

    violations
}

fn check_m1(workload: &ResolvedWorkload, inputs: &PlacementInputs, violations: &mut Vec<Violation>) {
    let present = workload.kinds_present();
    let missing: Vec<PodKind> = inputs.mandatory_pods.iter().filter(|k| !present.contains(k)).copied().collect();
    if !missing.is_empty() {
        let names: Vec<&str> = missing.iter().map(PodKind::as_str).collect();
        violations.push(Violation::new(
            RuleId::M1,
            ViolationCategory::Placement,
            format!("mandatory pod kinds missing from resolved workload: {}", names.join(", ")),
        ));
    }
}

fn check_m2(workload: &ResolvedWorkload, violations: &mut Vec<Violation>) {
    if !workload.input.feature_flags.in_service_upgrade {
        return;
    }
    let dpp = common::instances_of_kind(workload, PodKind::Dpp);
    if dpp.len() < 2 {
        return;
    }
    let sockets = common::total_sockets(&workload.input.server_configs);
    if sockets < dpp.len() as u32 {
        violations.push(
            Violation::new(
                RuleId::M2,
                ViolationCategory::Placement,
                format!("in_service_upgrade requires {} distinct sockets for DPP anti-affinity, only {sockets} available", dpp.len()),
            )
            .with_offending(dpp),
        );
    }
}

fn check_m3(workload: &ResolvedWorkload, violations: &mut Vec<Violation>) {
    if !workload.input.feature_flags.vdu_ru_switch_connection {
        return;
    }
    let dpp = common::instances_of_kind(workload, PodKind::Dpp);
    let rmp = common::instances_of_kind(workload, PodKind::Rmp);
    if dpp.len() != 1 {
        let mut offending = dpp;
        offending.extend(rmp);
        violations.push(
            Violation::new(
                RuleId::M3,
                ViolationCategory::Placement,
                format!("vdu_ru_switch_connection requires exactly one DPP instance to pair RMP against, found {}", offending.len()),
            )
            .with_offending(offending),
        );
        return;
    }
    let dpp_group = workload.pods[dpp[0].requirement_index as usize].co_location_group.clone();
    let mismatched: Vec<_> = match &dpp_group {
        // No group at all means nothing pins the RMPs to the DPP's eventual
        // socket — every RMP instance is unmatched, not just the differing ones.
        None => rmp,
        Some(group) => {
            let matched: BTreeSet<_> = common::instances_in_group(workload, group).into_iter().collect();
            rmp.into_iter().filter(|id| !matched.contains(id)).collect()
        }
    };
    if !mismatched.is_empty() {
        violations.push(
            Violation::new(
                RuleId::M3,
                ViolationCategory::Placement,
                "RMP instance(s) not co-located with their paired DPP under vdu_ru_switch_connection",
            )
            .with_offending(mismatched),
        );
    }
}

fn check_m4(workload: &ResolvedWorkload, violations: &mut Vec<Violation>) {
    if !workload.input.feature_flags.ha_enabled {
        return;
    }
    let cmp = common::instances_of_kind(workload, PodKind::Cmp);
    if cmp.len() < 2 {
        return;
    }
    let sockets = common::total_sockets(&workload.input.server_configs);
    if sockets < cmp.len() as u32 {
        violations.push(
            Violation::new(
                RuleId::M4,
                ViolationCategory::Placement,
                format!("ha_enabled requires {} distinct sockets for CMP anti-affinity, only {sockets} available", cmp.len()),
            )
            .with_offending(cmp),
        );
    }
}
