//! OperatorEvaluator: rules O1–O4.
//!
//! O1 overlaps M1 (same mechanism, keyed on operator-specific mandatory
//! pods rather than the base set); O3/O4 confirm pods the resolver was
//! supposed to inject are actually present — these are presence checks, not
//! placement checks. Whether DirectX2-group members actually land on one
//! socket is a planner-output invariant, verified after a plan exists.

use alloc::collections::BTreeSet;
use alloc::format;
use alloc::vec::Vec;

use dr_core::domain::{PodKind, ResolvedWorkload, Violation, ViolationCategory};
use dr_core::ids::RuleId;
use dr_core::ratio::Vcores;

#[derive(Clone, Debug, Default)]
pub struct OperatorInputs {
    pub mandatory_pods: BTreeSet<PodKind>,
    pub implicit_pods_expected: BTreeSet<PodKind>,
    pub vcu_expected_vcores: Option<Vcores>,
    pub directx2_group: Option<BTreeSet<PodKind>>,
}

pub fn evaluate(workload: &ResolvedWorkload, inputs: &OperatorInputs) -> Vec<Violation> {
    let mut violations = Vec::new();

    check_o1(workload, inputs, &mut violations);
    check_o2(workload, inputs, &mut violations);
    check_o3(workload, inputs, &mut violations);
    check_o4(workload, inputs, &mut violations);

    violations
}

fn check_o1(workload: &ResolvedWorkload, inputs: &OperatorInputs, violations: &mut Vec<Violation>) {
    let present = workload.kinds_present();
    let missing: Vec<&str> = inputs.mandatory_pods.iter().filter(|k| !present.contains(k)).map(PodKind::as_str).collect();
    if !missing.is_empty() {
        violations.push(Violation::new(
            RuleId::O1,
            ViolationCategory::Operator,
            format!("operator-mandatory pod kinds missing: {}", missing.join(", ")),
        ));
    }
}

fn check_o2(workload: &ResolvedWorkload, inputs: &OperatorInputs, violations: &mut Vec<Violation>) {
    if !workload.input.feature_flags.vcu_deployment_required {
        return;
    }
    let Some(expected) = inputs.vcu_expected_vcores else { return };
    match workload.pods.iter().find(|p| p.kind == PodKind::Vcu) {
        None => violations.push(Violation::new(RuleId::O2, ViolationCategory::Operator, "vcu_deployment_required but no vCU pod present in resolved workload")),
        Some(pod) if pod.vcores != expected => violations.push(Violation::new(
            RuleId::O2,
            ViolationCategory::Operator,
            format!("vCU pod present with {} vcores, catalog specifies {expected} for this flavor", pod.vcores),
        )),
        Some(_) => {}
    }
}

fn check_o3(workload: &ResolvedWorkload, inputs: &OperatorInputs, violations: &mut Vec<Violation>) {
    if inputs.implicit_pods_expected.is_empty() {
        return;
    }
    let present = workload.kinds_present();
    let missing: Vec<&str> = inputs.implicit_pods_expected.iter().filter(|k| !present.contains(k)).map(PodKind::as_str).collect();
    if !missing.is_empty() {
        violations.push(Violation::new(
            RuleId::O3,
            ViolationCategory::Operator,
            format!("flavor-implicit pod kinds missing from resolved workload: {}", missing.join(", ")),
        ));
    }
}

fn check_o4(workload: &ResolvedWorkload, inputs: &OperatorInputs, violations: &mut Vec<Violation>) {
    if !workload.input.feature_flags.directx2_required {
        return;
    }
    let Some(group) = &inputs.directx2_group else { return };
    let present = workload.kinds_present();
    let missing: Vec<&str> = group.iter().filter(|k| !present.contains(k)).map(PodKind::as_str).collect();
    if !missing.is_empty() {
        violations.push(Violation::new(
            RuleId::O4,
            ViolationCategory::Operator,
            format!("directx2_required but DirectX2 co-location group is missing pod kinds: {}", missing.join(", ")),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::String;
    use alloc::vec;
    use dr_core::domain::{DeploymentInput, FeatureFlags, Operator, PodOrigin, ResolvedPod, ServerConfiguration};

    fn workload(flags: FeatureFlags, pods: Vec<ResolvedPod>) -> ResolvedWorkload {
        ResolvedWorkload {
            input: DeploymentInput {
                operator: Operator::Vos,
                vdu_flavor_name: String::from("medium-regular-spr-t23"),
                pod_requirements: Vec::new(),
                server_configs: vec![ServerConfiguration { pcores: 24, vcores: Vcores::from_whole(48), sockets: 1, pcores_per_socket: None }],
                feature_flags: flags,
            },
            pods,
        }
    }

    fn pod(kind: PodKind, vcores: i64) -> ResolvedPod {
        ResolvedPod { kind, vcores: Vcores::from_whole(vcores), quantity: 1, socket_affinity: None, anti_affinity_group: None, co_location_group: None, origin: PodOrigin::Explicit }
    }

    #[test]
    fn o2_requires_matching_vcu_vcores() {
        let flags = FeatureFlags { vcu_deployment_required: true, ..Default::default() };
        let inputs = OperatorInputs { vcu_expected_vcores: Some(Vcores::from_whole(8)), ..Default::default() };
        let violations = evaluate(&workload(flags, vec![pod(PodKind::Vcu, 4)]), &inputs);
        assert!(violations.iter().any(|v| v.rule_id == RuleId::O2));
    }

    #[test]
    fn o4_requires_directx2_members_present() {
        let flags = FeatureFlags { directx2_required: true, ..Default::default() };
        let mut group = BTreeSet::new();
        group.insert(PodKind::Dip);
        group.insert(PodKind::Ipp);
        let inputs = OperatorInputs { directx2_group: Some(group), ..Default::default() };
        let violations = evaluate(&workload(flags, vec![pod(PodKind::Dip, 4)]), &inputs);
        assert!(violations.iter().any(|v| v.rule_id == RuleId::O4));
    }
}
