//! ValidationOrchestrator (§4.8): the top-level `validate()` entry point.
//!
//! `OrchestratorStage` mirrors the seven named states verbatim. Each stage
//! collects every violation it finds before deciding whether to advance;
//! the first stage that records any violation short-circuits straight to
//! `Finalized`, per §9's propagation policy. Placement planning runs only
//! once `Finalized` is reached with `success = true` and the caller asked
//! for a plan — a plan can still turn a successful validation into a
//! failed one if the planner cannot seat every pod.

use dr_algo::prelude::*;
use dr_catalog::dimensioning::DimensioningLookup;
use dr_catalog::rule_catalog::RuleCatalog;
use dr_core::domain::{DeploymentInput, PlacementPlan, SlotUtilization, SocketSlot, ValidateOptions, ValidationResult, Violation};

use crate::resolver;

#[derive(Clone, Copy, Eq, PartialEq, Debug)]
enum OrchestratorStage {
    Received,
    InputValidated,
    WorkloadResolved,
    CapacityChecked,
    PlacementChecked,
    OperatorChecked,
    Finalized,
}

pub fn validate(input: &DeploymentInput, catalog: &RuleCatalog, dimensioning: &dyn DimensioningLookup, options: ValidateOptions) -> ValidationResult {
    let mut stage = OrchestratorStage::Received;
    let mut violations: Vec<Violation> = Vec::new();
    tracing::debug!(?stage, "orchestrator starting");

    let known_flavor = catalog.is_known_flavor(&input.vdu_flavor_name);
    let pre = validate_pre(input, known_flavor);
    if !pre.is_empty() {
        tracing::warn!(rule = "V3", count = pre.len(), "input validation failed");
        violations.extend(pre);
        return finalize(violations, None, Vec::new());
    }
    stage = OrchestratorStage::InputValidated;
    tracing::debug!(?stage, "input well-formed");

    let workload = resolver::resolve(input, catalog, dimensioning);
    stage = OrchestratorStage::WorkloadResolved;
    tracing::debug!(?stage, pods = workload.pods.len(), "workload resolved");

    let capacity_inputs = CapacityInputs {
        caas_cores_per_socket: catalog.caas_cores_per_socket(input.operator),
        shared_cores_per_socket: catalog.shared_cores_per_socket(input.operator),
    };
    let (slots, capacity_violations): (Vec<SocketSlot>, Vec<Violation>) = evaluate_capacity(&workload, &capacity_inputs);
    if !capacity_violations.is_empty() {
        tracing::warn!(rule = "C1-C4", count = capacity_violations.len(), "capacity check failed");
        violations.extend(capacity_violations);
        let metrics = build_metrics(&slots, None);
        return finalize(violations, None, metrics);
    }
    stage = OrchestratorStage::CapacityChecked;
    tracing::debug!(?stage, sockets = slots.len(), "capacity satisfied");

    let mandatory_pods = catalog.mandatory_pods(input.operator);
    let placement_inputs = PlacementInputs { mandatory_pods: mandatory_pods.clone() };
    let placement_violations = evaluate_placement(&workload, &placement_inputs);
    if !placement_violations.is_empty() {
        tracing::warn!(rule = "M1-M4", count = placement_violations.len(), "placement check failed");
        violations.extend(placement_violations);
        let metrics = build_metrics(&slots, None);
        return finalize(violations, None, metrics);
    }
    stage = OrchestratorStage::PlacementChecked;
    tracing::debug!(?stage, "structural placement satisfied");

    let directx2_group = catalog.co_location_groups(&input.feature_flags, input.operator).get("directx2").cloned();
    let operator_inputs = OperatorInputs {
        mandatory_pods,
        implicit_pods_expected: catalog.implicit_pods_for_flavor(&input.vdu_flavor_name),
        vcu_expected_vcores: catalog.vcu_vcores(&input.vdu_flavor_name),
        directx2_group,
    };
    let operator_violations = evaluate_operator(&workload, &operator_inputs);
    if !operator_violations.is_empty() {
        tracing::warn!(rule = "O1-O4", count = operator_violations.len(), "operator check failed");
        violations.extend(operator_violations);
        let metrics = build_metrics(&slots, None);
        return finalize(violations, None, metrics);
    }
    stage = OrchestratorStage::OperatorChecked;
    tracing::debug!(?stage, "operator rules satisfied");

    let final_violations = validate_final(input);
    if !final_violations.is_empty() {
        tracing::warn!(rule = "V2", count = final_violations.len(), "final validation failed");
        violations.extend(final_violations);
        let metrics = build_metrics(&slots, None);
        return finalize(violations, None, metrics);
    }

    stage = OrchestratorStage::Finalized;
    tracing::info!(?stage, "all evaluators passed");

    if !options.generate_plan {
        let metrics = build_metrics(&slots, None);
        return finalize(violations, None, metrics);
    }

    let (plan, plan_violations) = dr_algo::planner::plan(&workload, &slots, options.strategy);
    let metrics = build_metrics(&slots, Some(&plan));
    if !plan_violations.is_empty() {
        tracing::warn!(rule = "PLACEMENT_INFEASIBLE", count = plan_violations.len(), "planner could not seat every pod");
        violations.extend(plan_violations);
        return finalize(violations, Some(plan), metrics);
    }

    finalize(violations, Some(plan), metrics)
}

fn finalize(violations: Vec<Violation>, plan: Option<PlacementPlan>, metrics: Vec<SlotUtilization>) -> ValidationResult {
    let (success, message) = summarize(&violations);
    ValidationResult { success, message, violations, plan, metrics }
}

/// Per-socket utilization for `ResponseFormatter`. `plan` is `None` on any
/// early-failure path — there's nothing assigned yet, so "used" is zero and
/// "available" equals the slot's full post-deduction capacity.
fn build_metrics(slots: &[SocketSlot], plan: Option<&PlacementPlan>) -> Vec<SlotUtilization> {
    slots
        .iter()
        .map(|slot| {
            let available_capacity = slot.vcores_available();
            let remaining = plan.and_then(|p| p.remaining.get(&slot.key()).copied()).unwrap_or(available_capacity);
            let used = available_capacity.saturating_sub(remaining);
            SlotUtilization {
                server_index: slot.server_index,
                socket_index: slot.socket_index,
                vcores_total: slot.vcores_total,
                vcores_used: used,
                vcores_available: remaining,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use dr_catalog::dimensioning::JsonDimensioningTable;
    use dr_core::domain::{FeatureFlags, Operator, PodKind, PodRequirement, PlacementStrategy, ServerConfiguration};
    use dr_core::ratio::Vcores;
    use serde_json::json;

    fn catalog() -> RuleCatalog {
        RuleCatalog::from_value(json!({
            "capacity_rules": {
                "caas_cores_per_socket": {"VOS": 0},
                "shared_cores_per_socket": {"VOS": 0}
            },
            "operator_rules": {
                "extra_mandatory_pods": {"VOS": ["IPP"]},
                "implicit_pods_by_flavor": {},
                "vcu_vcores_by_flavor": {}
            },
            "placement_rules": {
                "anti_affinity_groups": {
                    "cmp_ha": {"requires_flag": "ha_enabled", "pod_kinds": ["CMP"]}
                },
                "co_location_groups": {}
            },
            "validation_rules": {"known_flavors": ["medium-regular-spr-t23"]},
            "server_configurations": {}
        }))
        .unwrap()
    }

    fn dimensioning() -> JsonDimensioningTable {
        JsonDimensioningTable::from_value(json!({
            "medium-regular-spr-t23": [
                {"pod_kind": "DPP", "vcores": "4.0"},
                {"pod_kind": "DIP", "vcores": "4.0"},
                {"pod_kind": "RMP", "vcores": "4.0"},
                {"pod_kind": "CMP", "vcores": "4.0"},
                {"pod_kind": "DMP", "vcores": "4.0"},
                {"pod_kind": "PMP", "vcores": "4.0"},
                {"pod_kind": "IPP", "vcores": "2.0"}
            ]
        }))
        .unwrap()
    }

    fn pod_req(kind: PodKind, quantity: u32) -> PodRequirement {
        PodRequirement { kind, vcores: Vcores::from_whole(4), quantity, socket_affinity: None, anti_affinity_group: None, co_location_group: None }
    }

    fn baseline_input() -> DeploymentInput {
        DeploymentInput {
            operator: Operator::Vos,
            vdu_flavor_name: String::from("medium-regular-spr-t23"),
            pod_requirements: vec![
                pod_req(PodKind::Dpp, 1),
                pod_req(PodKind::Dip, 1),
                pod_req(PodKind::Rmp, 1),
                pod_req(PodKind::Cmp, 1),
                pod_req(PodKind::Dmp, 1),
                pod_req(PodKind::Pmp, 1),
            ],
            server_configs: vec![ServerConfiguration { pcores: 24, vcores: Vcores::from_whole(48), sockets: 1, pcores_per_socket: None }],
            feature_flags: FeatureFlags::default(),
        }
    }

    #[test]
    fn s1_vos_baseline_passes_and_places_on_single_socket() {
        let result = validate(&baseline_input(), &catalog(), &dimensioning(), ValidateOptions { generate_plan: true, strategy: PlacementStrategy::Balanced });
        assert!(result.success, "{:?}", result.violations);
        let plan = result.plan.unwrap();
        assert!(plan.assignments.values().all(|&k| k == (0, 0)));
    }

    #[test]
    fn s2_ha_with_single_socket_fails_m4() {
        let mut input = baseline_input();
        input.feature_flags.ha_enabled = true;
        input.pod_requirements.push(pod_req(PodKind::Cmp, 1));
        let result = validate(&input, &catalog(), &dimensioning(), ValidateOptions { generate_plan: false, strategy: PlacementStrategy::Balanced });
        assert!(!result.success);
        assert!(result.violations.iter().any(|v| v.rule_id == dr_core::ids::RuleId::M4));
    }

    #[test]
    fn s3_ha_with_dual_socket_passes() {
        let mut input = baseline_input();
        input.feature_flags.ha_enabled = true;
        input.pod_requirements.push(pod_req(PodKind::Cmp, 1));
        input.server_configs = vec![ServerConfiguration { pcores: 48, vcores: Vcores::from_whole(96), sockets: 2, pcores_per_socket: Some(24) }];
        let result = validate(&input, &catalog(), &dimensioning(), ValidateOptions { generate_plan: true, strategy: PlacementStrategy::Balanced });
        assert!(result.success, "{:?}", result.violations);
        let plan = result.plan.unwrap();
        let sockets_used: std::collections::BTreeSet<_> = plan.assignments.values().copied().collect();
        assert!(sockets_used.len() >= 2);
    }

    #[test]
    fn s4_capacity_overflow_fails_c1() {
        let mut input = baseline_input();
        for req in input.pod_requirements.iter_mut() {
            req.vcores = Vcores::from_whole(30);
        }
        let result = validate(&input, &catalog(), &dimensioning(), ValidateOptions { generate_plan: false, strategy: PlacementStrategy::Balanced });
        assert!(!result.success);
        assert!(result.violations.iter().any(|v| v.rule_id == dr_core::ids::RuleId::C1));
        assert!(result.plan.is_none());
    }

    #[test]
    fn s5_directx2_group_lands_on_one_socket() {
        let catalog = RuleCatalog::from_value(json!({
            "capacity_rules": {
                "caas_cores_per_socket": {"VOS": 0},
                "shared_cores_per_socket": {"VOS": 0}
            },
            "operator_rules": {
                "extra_mandatory_pods": {"VOS": ["IPP"]},
                "implicit_pods_by_flavor": {},
                "vcu_vcores_by_flavor": {}
            },
            "placement_rules": {
                "anti_affinity_groups": {},
                "co_location_groups": {
                    "directx2": {"requires_flag": "directx2_required", "pod_kinds": ["DMP", "PMP"]}
                }
            },
            "validation_rules": {"known_flavors": ["medium-regular-spr-t23"]},
            "server_configurations": {}
        }))
        .unwrap();

        let mut input = baseline_input();
        input.feature_flags.directx2_required = true;
        input.server_configs = vec![ServerConfiguration { pcores: 48, vcores: Vcores::from_whole(96), sockets: 2, pcores_per_socket: Some(24) }];

        let result = validate(&input, &catalog, &dimensioning(), ValidateOptions { generate_plan: true, strategy: PlacementStrategy::Balanced });
        assert!(result.success, "{:?}", result.violations);
        let plan = result.plan.unwrap();

        let workload = resolver::resolve(&input, &catalog, &dimensioning());
        let req_index_of = |kind: PodKind| -> u32 {
            workload.pods.iter().position(|p| p.kind == kind).unwrap() as u32
        };
        let dmp_socket = plan.assignments.get(&dr_core::ids::PodInstanceId::new(req_index_of(PodKind::Dmp), 0)).copied().unwrap();
        let pmp_socket = plan.assignments.get(&dr_core::ids::PodInstanceId::new(req_index_of(PodKind::Pmp), 0)).copied().unwrap();
        assert_eq!(dmp_socket, pmp_socket, "DirectX2 co-location group must share one socket");
    }

    #[test]
    fn vdu_ru_switch_connection_pins_rmp_to_its_paired_dpp_socket() {
        let catalog = RuleCatalog::from_value(json!({
            "capacity_rules": {
                "caas_cores_per_socket": {"VOS": 0},
                "shared_cores_per_socket": {"VOS": 0}
            },
            "operator_rules": {
                "extra_mandatory_pods": {"VOS": ["IPP"]},
                "implicit_pods_by_flavor": {},
                "vcu_vcores_by_flavor": {}
            },
            "placement_rules": {
                "anti_affinity_groups": {},
                "co_location_groups": {
                    "dpp_rmp_pair": {"requires_flag": "vdu_ru_switch_connection", "pod_kinds": ["DPP", "RMP"]}
                }
            },
            "validation_rules": {"known_flavors": ["medium-regular-spr-t23"]},
            "server_configurations": {}
        }))
        .unwrap();

        let mut input = baseline_input();
        input.feature_flags.vdu_ru_switch_connection = true;
        input.server_configs = vec![ServerConfiguration { pcores: 48, vcores: Vcores::from_whole(96), sockets: 2, pcores_per_socket: Some(24) }];

        let result = validate(&input, &catalog, &dimensioning(), ValidateOptions { generate_plan: true, strategy: PlacementStrategy::Balanced });
        assert!(result.success, "{:?}", result.violations);
        assert!(!result.violations.iter().any(|v| v.rule_id == dr_core::ids::RuleId::M3));
        let plan = result.plan.unwrap();

        let workload = resolver::resolve(&input, &catalog, &dimensioning());
        let req_index_of = |kind: PodKind| -> u32 { workload.pods.iter().position(|p| p.kind == kind).unwrap() as u32 };
        let dpp_socket = plan.assignments.get(&dr_core::ids::PodInstanceId::new(req_index_of(PodKind::Dpp), 0)).copied().unwrap();
        let rmp_socket = plan.assignments.get(&dr_core::ids::PodInstanceId::new(req_index_of(PodKind::Rmp), 0)).copied().unwrap();
        assert_eq!(dpp_socket, rmp_socket, "RMP must be pinned to its paired DPP's socket under vdu_ru_switch_connection");
    }

    #[test]
    fn vdu_ru_switch_connection_without_a_catalog_group_fails_m3() {
        let mut input = baseline_input();
        input.feature_flags.vdu_ru_switch_connection = true;
        let result = validate(&input, &catalog(), &dimensioning(), ValidateOptions { generate_plan: false, strategy: PlacementStrategy::Balanced });
        assert!(!result.success);
        assert!(result.violations.iter().any(|v| v.rule_id == dr_core::ids::RuleId::M3));
    }

    #[test]
    fn s6_unknown_flavor_fails_v3_before_placement() {
        let mut input = baseline_input();
        input.vdu_flavor_name = String::from("does-not-exist");
        let result = validate(&input, &catalog(), &dimensioning(), ValidateOptions { generate_plan: true, strategy: PlacementStrategy::Balanced });
        assert!(!result.success);
        assert!(result.violations.iter().any(|v| v.rule_id == dr_core::ids::RuleId::V3));
        assert!(result.plan.is_none());
    }

    /// §8 invariant 5: validating the same input twice, against the same
    /// catalog and options, yields a bit-equal `ValidationResult`.
    #[test]
    fn idempotent_across_repeated_runs() {
        let input = baseline_input();
        let cat = catalog();
        let dims = dimensioning();
        let options = ValidateOptions { generate_plan: true, strategy: PlacementStrategy::Balanced };
        let first = validate(&input, &cat, &dims, options);
        let second = validate(&input, &cat, &dims, options);
        assert_eq!(first, second);
    }

    /// §8 invariant 6: enabling a flag that only tightens constraints never
    /// makes a previously-triggered rule disappear — the set of violated
    /// rule ids when the flag is on is a superset of the set when it's off.
    #[test]
    fn enabling_ha_flag_never_removes_a_violation() {
        let off = baseline_input();
        let mut on = off.clone();
        on.feature_flags.ha_enabled = true;
        on.pod_requirements.push(pod_req(PodKind::Cmp, 1));

        let options = ValidateOptions { generate_plan: false, strategy: PlacementStrategy::Balanced };
        let off_result = validate(&off, &catalog(), &dimensioning(), options);
        let on_result = validate(&on, &catalog(), &dimensioning(), options);

        let off_rules: std::collections::BTreeSet<_> = off_result.violations.iter().map(|v| v.rule_id).collect();
        let on_rules: std::collections::BTreeSet<_> = on_result.violations.iter().map(|v| v.rule_id).collect();
        assert!(off_rules.is_subset(&on_rules), "off={:?} on={:?}", off_rules, on_rules);
    }

    /// §8 invariant 7: shrinking every server down to exactly the vcores its
    /// plan actually used still validates successfully on re-run.
    #[test]
    fn rerun_with_produced_plan_sizes_still_succeeds() {
        let input = baseline_input();
        let options = ValidateOptions { generate_plan: true, strategy: PlacementStrategy::Balanced };
        let first = validate(&input, &catalog(), &dimensioning(), options);
        assert!(first.success, "{:?}", first.violations);
        let plan = first.plan.unwrap();

        let mut shrunk = input.clone();
        for (server_index, server) in shrunk.server_configs.iter_mut().enumerate() {
            let total_used = (0..server.sockets as u32)
                .map(|socket| {
                    let key = (server_index as u32, socket);
                    let available = server.vcores.divide_evenly(server.sockets as u32).unwrap();
                    let remaining = plan.remaining.get(&key).copied().unwrap_or(available);
                    available.saturating_sub(remaining)
                })
                .fold(Vcores::ZERO, |a, b| a + b);
            server.pcores = (total_used.tenths() / 20).max(1) as u32;
            server.vcores = Vcores::from_whole(2 * server.pcores as i64);
        }

        let second = validate(&shrunk, &catalog(), &dimensioning(), options);
        assert!(second.success, "{:?}", second.violations);
    }
}
