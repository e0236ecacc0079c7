//! WorkloadResolver (§4.2): `DeploymentInput` + `RuleCatalog` -> `ResolvedWorkload`.
//!
//! Pure function, no fallible path. Resolution order is fixed: explicit pods
//! first, then operator-mandatory, then flavor-implicit, then vCU, then a
//! final group-tagging pass. An unknown operator or flavor simply yields no
//! catalog-driven injections for that stage — `V3` reports it later, this
//! function never rejects its input.
//!
//! Duplicates keep the explicit record (§9 "Resolver precedence"): a pod
//! kind already present, however it got there, is never displaced by a
//! later injection stage.

use std::collections::BTreeMap;

use dr_catalog::dimensioning::DimensioningLookup;
use dr_catalog::rule_catalog::RuleCatalog;
use dr_core::domain::{DeploymentInput, FeatureFlags, Operator, PodKind, PodOrigin, ResolvedPod, ResolvedWorkload};
use dr_core::ratio::Vcores;

pub fn resolve(input: &DeploymentInput, catalog: &RuleCatalog, dimensioning: &dyn DimensioningLookup) -> ResolvedWorkload {
    let mut pods: Vec<ResolvedPod> = input
        .pod_requirements
        .iter()
        .map(|r| ResolvedPod {
            kind: r.kind,
            vcores: r.vcores,
            quantity: r.quantity,
            socket_affinity: r.socket_affinity,
            anti_affinity_group: r.anti_affinity_group.clone(),
            co_location_group: r.co_location_group.clone(),
            origin: PodOrigin::Explicit,
        })
        .collect();

    for kind in catalog.mandatory_pods(input.operator) {
        inject_if_absent(&mut pods, kind, PodOrigin::OperatorMandatory, || {
            dimensioned_vcores(dimensioning, input.operator, &input.vdu_flavor_name, kind)
        });
    }

    for kind in catalog.implicit_pods_for_flavor(&input.vdu_flavor_name) {
        inject_if_absent(&mut pods, kind, PodOrigin::FlavorImplicit, || {
            dimensioned_vcores(dimensioning, input.operator, &input.vdu_flavor_name, kind)
        });
    }

    if input.feature_flags.vcu_deployment_required {
        inject_if_absent(&mut pods, PodKind::Vcu, PodOrigin::FlagConditional, || {
            catalog.vcu_vcores(&input.vdu_flavor_name)
        });
    }

    tag_groups(&mut pods, catalog, &input.feature_flags, input.operator);

    ResolvedWorkload { input: input.clone(), pods }
}

/// Pushes one instance of `kind` with the given origin if no pod of that
/// kind is already present. Does nothing if `vcores` can't be determined —
/// the catalog/dimensioning table not knowing the cost isn't this
/// function's problem to solve; downstream M1/O1/O2/O3 report the gap.
fn inject_if_absent(pods: &mut Vec<ResolvedPod>, kind: PodKind, origin: PodOrigin, vcores: impl FnOnce() -> Option<Vcores>) {
    if pods.iter().any(|p| p.kind == kind) {
        return;
    }
    if let Some(vcores) = vcores() {
        pods.push(ResolvedPod {
            kind,
            vcores,
            quantity: 1,
            socket_affinity: None,
            anti_affinity_group: None,
            co_location_group: None,
            origin,
        });
    }
}

fn dimensioned_vcores(dimensioning: &dyn DimensioningLookup, operator: Operator, flavor: &str, kind: PodKind) -> Option<Vcores> {
    dimensioning
        .pods_for(operator, flavor)?
        .into_iter()
        .find(|(k, _)| *k == kind)
        .map(|(_, v)| v)
}

/// Attaches co-location/anti-affinity group tags from the catalog to any
/// pod whose group field the explicit request (or an earlier injection)
/// didn't already set.
fn tag_groups(pods: &mut [ResolvedPod], catalog: &RuleCatalog, flags: &FeatureFlags, operator: Operator) {
    let co_location: BTreeMap<String, std::collections::BTreeSet<PodKind>> = catalog.co_location_groups(flags, operator);
    let anti_affinity: BTreeMap<String, std::collections::BTreeSet<PodKind>> = catalog.anti_affinity_groups(flags);

    for pod in pods.iter_mut() {
        if pod.co_location_group.is_none() {
            if let Some((tag, _)) = co_location.iter().find(|(_, kinds)| kinds.contains(&pod.kind)) {
                pod.co_location_group = Some(tag.clone());
            }
        }
        if pod.anti_affinity_group.is_none() {
            if let Some((tag, _)) = anti_affinity.iter().find(|(_, kinds)| kinds.contains(&pod.kind)) {
                pod.anti_affinity_group = Some(tag.clone());
            }
        }
    }
}
