//! Optimization hints (§4.9d): short, rule-id-keyed suggestions attached to
//! a failing `ValidationResult`. One hint per distinct rule id present in
//! `violations`, in rule-id order; a rule id with no canned hint is skipped
//! rather than producing a generic "fix this" placeholder.

use dr_core::domain::Violation;
use dr_core::ids::RuleId;

pub fn hints_for(violations: &[Violation]) -> Vec<String> {
    let mut seen: Vec<RuleId> = Vec::new();
    let mut hints = Vec::new();
    for v in violations {
        if seen.contains(&v.rule_id) {
            continue;
        }
        seen.push(v.rule_id);
        if let Some(hint) = hint_for_rule(v.rule_id) {
            hints.push(String::from(hint));
        }
    }
    hints
}

fn hint_for_rule(rule_id: RuleId) -> Option<&'static str> {
    match rule_id {
        RuleId::C1 | RuleId::C3 | RuleId::C4 => {
            Some("add a server or reduce requested vcores to satisfy socket capacity")
        }
        RuleId::C2 => Some("correct the declared vcores to match 2 x pcores for the affected server"),
        RuleId::M2 | RuleId::M4 => {
            Some("add one socket to satisfy the anti-affinity requirement across instances")
        }
        RuleId::M1 | RuleId::M3 => {
            Some("ensure every mandatory pod and co-location group member is present in the request")
        }
        RuleId::O1 | RuleId::O2 | RuleId::O3 => {
            Some("verify the dimensioning table covers every pod kind this operator and flavor require")
        }
        RuleId::O4 => Some("seat the directx2 co-location group on a single socket"),
        RuleId::V2 | RuleId::V3 => Some("correct the malformed or unknown field named in the violation detail"),
        RuleId::V1 => None,
        RuleId::PlacementInfeasible => {
            Some("add capacity or try a different placement strategy; no arrangement seated every pod")
        }
    }
}
