//! InputValidator: rules V3 (pre-pass), V2, V1 (final pass, §9 open-question
//! fix — V3 runs first, V1/V2 run last, in the orchestrator's fixed order).
//!
//! `PodKind` and `Operator` are closed Rust enums, so "every pod kind is
//! known" is enforced by parsing at the boundary, before a `DeploymentInput`
//! exists — this module only re-checks what the type system cannot: flavor
//! names are open strings, so `validate_pre` takes `known_flavor` from the
//! catalog lookup the caller already did.

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use dr_core::domain::{DeploymentInput, Violation, ViolationCategory};
use dr_core::ids::RuleId;

/// V3: inputs present and well-typed, quantities/vcores positive, flavor
/// known to the catalog, at least one server with positive total capacity.
pub fn validate_pre(input: &DeploymentInput, known_flavor: bool) -> Vec<Violation> {
    let mut violations = Vec::new();

    if !known_flavor {
        violations.push(Violation::new(
            RuleId::V3,
            ViolationCategory::Validation,
            format!("unknown vDU flavor '{}'", input.vdu_flavor_name),
        ));
    }

    if input.server_configs.is_empty() {
        violations.push(Violation::new(RuleId::V3, ViolationCategory::Validation, "at least one server is required"));
    } else if !input.total_server_vcores().is_positive() {
        violations.push(Violation::new(RuleId::V3, ViolationCategory::Validation, "total server vcores must be positive"));
    }

    for (idx, req) in input.pod_requirements.iter().enumerate() {
        if !req.is_well_formed() {
            violations.push(Violation::new(
                RuleId::V3,
                ViolationCategory::Validation,
                format!(
                    "pod requirement {idx} ({}) is malformed: vcores={}, quantity={}, socket_affinity={:?}",
                    req.kind, req.vcores, req.quantity, req.socket_affinity
                ),
            ));
        }
    }

    violations
}

/// One server's V2 outcome; kept structured rather than collapsed into a
/// string so `ResponseFormatter` can render per-server detail.
#[derive(Clone, Debug)]
pub struct ServerConfigIssue {
    pub server_index: u32,
    pub invalid_socket_count: bool,
    pub inconsistent_pcores_per_socket: bool,
}

/// V2: per-server constraints — sockets in {1,2}; `pcores_per_socket`, if
/// present, divides `pcores` evenly across `sockets`.
pub fn validate_final(input: &DeploymentInput) -> Vec<Violation> {
    let mut violations = Vec::new();
    for (idx, server) in input.server_configs.iter().enumerate() {
        let issue = ServerConfigIssue {
            server_index: idx as u32,
            invalid_socket_count: !server.has_valid_socket_count(),
            inconsistent_pcores_per_socket: !server.pcores_per_socket_consistent(),
        };
        if issue.invalid_socket_count {
            violations.push(Violation::new(
                RuleId::V2,
                ViolationCategory::Validation,
                format!("server {idx}: sockets must be 1 or 2, got {}", server.sockets),
            ));
        }
        if issue.inconsistent_pcores_per_socket {
            violations.push(Violation::new(
                RuleId::V2,
                ViolationCategory::Validation,
                format!(
                    "server {idx}: pcores_per_socket {:?} does not divide pcores {} across {} sockets",
                    server.pcores_per_socket, server.pcores, server.sockets
                ),
            ));
        }
    }
    violations
}

/// V1: the summary pass. Not a check in its own right — it synthesizes the
/// overall verdict from every violation collected across every prior stage.
pub fn summarize(all_violations: &[Violation]) -> (bool, String) {
    if all_violations.is_empty() {
        (true, String::from("SUCCESS"))
    } else {
        (false, format!("FAILED: {} violation(s) recorded", all_violations.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use dr_core::domain::{FeatureFlags, Operator, PodKind, PodRequirement, ServerConfiguration};
    use dr_core::ratio::Vcores;

    fn base() -> DeploymentInput {
        DeploymentInput {
            operator: Operator::Vos,
            vdu_flavor_name: String::from("medium-regular-spr-t23"),
            pod_requirements: vec![PodRequirement {
                kind: PodKind::Dpp,
                vcores: Vcores::from_whole(4),
                quantity: 1,
                socket_affinity: None,
                anti_affinity_group: None,
                co_location_group: None,
            }],
            server_configs: vec![ServerConfiguration { pcores: 24, vcores: Vcores::from_whole(48), sockets: 1, pcores_per_socket: None }],
            feature_flags: FeatureFlags::default(),
        }
    }

    #[test]
    fn v3_flags_unknown_flavor() {
        let violations = validate_pre(&base(), false);
        assert!(violations.iter().any(|v| v.rule_id == RuleId::V3));
    }

    #[test]
    fn v3_flags_malformed_requirement() {
        let mut input = base();
        input.pod_requirements[0].vcores = Vcores::ZERO;
        let violations = validate_pre(&input, true);
        assert!(violations.iter().any(|v| v.rule_id == RuleId::V3));
    }

    #[test]
    fn v2_flags_invalid_socket_count() {
        let mut input = base();
        input.server_configs[0].sockets = 3;
        let violations = validate_final(&input);
        assert!(violations.iter().any(|v| v.rule_id == RuleId::V2));
    }

    #[test]
    fn v2_flags_inconsistent_pcores_per_socket() {
        let mut input = base();
        input.server_configs[0].sockets = 2;
        input.server_configs[0].pcores_per_socket = Some(7);
        let violations = validate_final(&input);
        assert!(violations.iter().any(|v| v.rule_id == RuleId::V2));
    }

    #[test]
    fn v1_summarizes_success_and_failure() {
        assert_eq!(summarize(&[]).0, true);
        let failed = vec![Violation::new(RuleId::V2, ViolationCategory::Validation, "x")];
        assert_eq!(summarize(&failed).0, false);
    }
}
