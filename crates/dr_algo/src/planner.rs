//! PlacementPlanner (§4.7) — the largest single piece of the core.
//!
//! Runs only once every evaluator above has passed. Co-location groups are
//! materialized first, as a pre-pass, atomically on one socket each; every
//! other pod is then placed instance-by-instance in resolved order. No
//! backtracking across pods: a pod instance that finds no eligible socket
//! under every strategy in the retry chain becomes a `PLACEMENT_INFEASIBLE`
//! violation and the planner moves on.

use alloc::collections::{BTreeMap, BTreeSet};
use alloc::format;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use dr_core::domain::{PlacementPlan, PlacementStrategy, ResolvedPod, ResolvedWorkload, SocketSlot, Violation, ViolationCategory};
use dr_core::ids::{PodInstanceId, RuleId};
use dr_core::ratio::Vcores;

fn cap(remaining: &BTreeMap<(u32, u32), Vcores>, key: &(u32, u32)) -> Vcores {
    *remaining.get(key).unwrap_or(&Vcores::ZERO)
}

/// Retry chain for a single pod instance: the configured strategy first,
/// then whichever of first-fit/best-fit/worst-fit it didn't already try, in
/// that fixed order (§9 — disallows cross-pod backtracking, not
/// cross-strategy retry for the pod currently being placed).
fn retry_order(primary: PlacementStrategy) -> Vec<PlacementStrategy> {
    let mut order = vec![primary];
    for s in [PlacementStrategy::FirstFit, PlacementStrategy::BestFit, PlacementStrategy::WorstFit] {
        if s != primary {
            order.push(s);
        }
    }
    order
}

fn eligible_for(
    pod: &ResolvedPod,
    canonical_keys: &[(u32, u32)],
    remaining: &BTreeMap<(u32, u32), Vcores>,
    anti_affinity_used: &BTreeMap<String, BTreeSet<(u32, u32)>>,
) -> Vec<(u32, u32)> {
    canonical_keys
        .iter()
        .copied()
        .filter(|key| {
            if cap(remaining, key) < pod.vcores {
                return false;
            }
            if let Some(affinity) = pod.socket_affinity {
                if key.1 != affinity {
                    return false;
                }
            }
            if let Some(group) = &pod.anti_affinity_group {
                if anti_affinity_used.get(group).is_some_and(|used| used.contains(key)) {
                    return false;
                }
            }
            true
        })
        .collect()
}

fn first_fit(eligible: &[(u32, u32)]) -> Option<(u32, u32)> {
    eligible.first().copied()
}

fn best_fit(eligible: &[(u32, u32)], remaining: &BTreeMap<(u32, u32), Vcores>) -> Option<(u32, u32)> {
    let mut best: Option<(u32, u32)> = None;
    for &key in eligible {
        best = match best {
            None => Some(key),
            Some(b) if cap(remaining, &key) < cap(remaining, &b) => Some(key),
            Some(b) => Some(b),
        };
    }
    best
}

fn worst_fit(eligible: &[(u32, u32)], remaining: &BTreeMap<(u32, u32), Vcores>) -> Option<(u32, u32)> {
    let mut best: Option<(u32, u32)> = None;
    for &key in eligible {
        best = match best {
            None => Some(key),
            Some(b) if cap(remaining, &key) > cap(remaining, &b) => Some(key),
            Some(b) => Some(b),
        };
    }
    best
}

/// Slot whose post-placement remaining capacity is closest to the mean
/// (pre-placement) remaining capacity across eligible slots. Integer tenths
/// throughout — no float drift in the tie-break.
fn balanced_fit(eligible: &[(u32, u32)], remaining: &BTreeMap<(u32, u32), Vcores>, pod_vcores: Vcores) -> Option<(u32, u32)> {
    if eligible.is_empty() {
        return None;
    }
    let sum: i64 = eligible.iter().map(|k| cap(remaining, k).tenths()).sum();
    let mean = sum / eligible.len() as i64;
    let mut best: Option<((u32, u32), i64)> = None;
    for &key in eligible {
        let post = cap(remaining, &key).tenths() - pod_vcores.tenths();
        let diff = (post - mean).abs();
        best = match best {
            None => Some((key, diff)),
            Some((_, bd)) if diff < bd => Some((key, diff)),
            Some(b) => Some(b),
        };
    }
    best.map(|(k, _)| k)
}

fn choose(strategy: PlacementStrategy, eligible: &[(u32, u32)], remaining: &BTreeMap<(u32, u32), Vcores>, pod_vcores: Vcores) -> Option<(u32, u32)> {
    match strategy {
        PlacementStrategy::FirstFit => first_fit(eligible),
        PlacementStrategy::BestFit => best_fit(eligible, remaining),
        PlacementStrategy::WorstFit => worst_fit(eligible, remaining),
        PlacementStrategy::Balanced => balanced_fit(eligible, remaining, pod_vcores),
    }
}

#[allow(clippy::too_many_arguments)]
fn colocation_pass(
    workload: &ResolvedWorkload,
    canonical_keys: &[(u32, u32)],
    remaining: &mut BTreeMap<(u32, u32), Vcores>,
    assignments: &mut BTreeMap<PodInstanceId, (u32, u32)>,
    anti_affinity_used: &mut BTreeMap<String, BTreeSet<(u32, u32)>>,
    placed_requirements: &mut BTreeSet<u32>,
    violations: &mut Vec<Violation>,
) {
    let mut order: Vec<String> = Vec::new();
    for pod in &workload.pods {
        if let Some(group) = &pod.co_location_group {
            if !order.contains(group) {
                order.push(group.clone());
            }
        }
    }

    for group in order {
        let mut demand = Vcores::ZERO;
        let mut members: Vec<PodInstanceId> = Vec::new();
        let mut required_socket: Option<u32> = None;
        let mut conflict = false;
        let mut anti_tag: Option<String> = None;

        for (idx, pod) in workload.pods.iter().enumerate() {
            if pod.co_location_group.as_deref() != Some(group.as_str()) {
                continue;
            }
            let idx = idx as u32;
            demand = demand + pod.vcores.mul_u32(pod.quantity);
            members.extend(pod.instance_ids(idx));
            placed_requirements.insert(idx);
            if let Some(affinity) = pod.socket_affinity {
                match required_socket {
                    None => required_socket = Some(affinity),
                    Some(existing) if existing != affinity => conflict = true,
                    _ => {}
                }
            }
            if let Some(group_tag) = &pod.anti_affinity_group {
                anti_tag = Some(group_tag.clone());
            }
        }

        if conflict {
            violations.push(
                Violation::new(
                    RuleId::PlacementInfeasible,
                    ViolationCategory::Placement,
                    format!("co-location group '{group}' has conflicting socket-affinity requirements among its members"),
                )
                .with_offending(members),
            );
            continue;
        }

        let candidate = canonical_keys
            .iter()
            .copied()
            .find(|key| cap(remaining, key) >= demand && required_socket.map_or(true, |s| key.1 == s));

        match candidate {
            Some(key) => {
                for id in &members {
                    assignments.insert(*id, key);
                }
                remaining.insert(key, cap(remaining, &key) - demand);
                if let Some(tag) = anti_tag {
                    anti_affinity_used.entry(tag).or_default().insert(key);
                }
            }
            None => {
                violations.push(
                    Violation::new(
                        RuleId::PlacementInfeasible,
                        ViolationCategory::Placement,
                        format!("co-location group '{group}' (combined demand {demand} vcores) has no socket with sufficient capacity"),
                    )
                    .with_offending(members),
                );
            }
        }
    }
}

/// Assigns every pod instance in `workload` to a `SocketSlot`, given the
/// slot table `CapacityEvaluator` already built. Returns the plan (possibly
/// partial) alongside any `PLACEMENT_INFEASIBLE` violations recorded along
/// the way; a non-empty violation list means the caller should treat the
/// overall result as a failure even though every earlier stage passed.
pub fn plan(workload: &ResolvedWorkload, slots: &[SocketSlot], strategy: PlacementStrategy) -> (PlacementPlan, Vec<Violation>) {
    let mut canonical_keys: Vec<(u32, u32)> = slots.iter().map(|s| s.key()).collect();
    canonical_keys.sort();

    let mut remaining: BTreeMap<(u32, u32), Vcores> = slots.iter().map(|s| (s.key(), s.vcores_available())).collect();
    let mut assignments: BTreeMap<PodInstanceId, (u32, u32)> = BTreeMap::new();
    let mut anti_affinity_used: BTreeMap<String, BTreeSet<(u32, u32)>> = BTreeMap::new();
    let mut placed_requirements: BTreeSet<u32> = BTreeSet::new();
    let mut violations = Vec::new();

    colocation_pass(
        workload,
        &canonical_keys,
        &mut remaining,
        &mut assignments,
        &mut anti_affinity_used,
        &mut placed_requirements,
        &mut violations,
    );

    for (idx, pod) in workload.pods.iter().enumerate() {
        let idx = idx as u32;
        if placed_requirements.contains(&idx) {
            continue;
        }
        for instance_id in pod.instance_ids(idx) {
            let eligible = eligible_for(pod, &canonical_keys, &remaining, &anti_affinity_used);
            let mut chosen = None;
            for candidate_strategy in retry_order(strategy) {
                if let Some(key) = choose(candidate_strategy, &eligible, &remaining, pod.vcores) {
                    chosen = Some(key);
                    break;
                }
            }
            match chosen {
                Some(key) => {
                    assignments.insert(instance_id, key);
                    remaining.insert(key, cap(&remaining, &key) - pod.vcores);
                    if let Some(tag) = &pod.anti_affinity_group {
                        anti_affinity_used.entry(tag.clone()).or_default().insert(key);
                    }
                }
                None => {
                    violations.push(
                        Violation::new(
                            RuleId::PlacementInfeasible,
                            ViolationCategory::Placement,
                            format!("pod {instance_id} ({}) has no eligible socket under any retry strategy", pod.kind),
                        )
                        .with_offending(vec![instance_id]),
                    );
                }
            }
        }
    }

    (PlacementPlan { assignments, remaining }, violations)
}
