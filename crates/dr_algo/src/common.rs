//! Shared helpers for turning a `ResolvedWorkload`'s pods into the
//! `PodInstanceId` lists evaluators attach to a `Violation`.

use alloc::vec::Vec;

use dr_core::domain::{PodKind, ResolvedPod, ResolvedWorkload};
use dr_core::ids::PodInstanceId;

/// Every instance of every pod matching `pred`, in resolved order.
pub fn instances_where<F>(workload: &ResolvedWorkload, mut pred: F) -> Vec<PodInstanceId>
where
    F: FnMut(&ResolvedPod) -> bool,
{
    let mut out = Vec::new();
    for (idx, pod) in workload.pods.iter().enumerate() {
        if pred(pod) {
            out.extend(pod.instance_ids(idx as u32));
        }
    }
    out
}

/// Every instance of a given `PodKind`, in resolved order.
pub fn instances_of_kind(workload: &ResolvedWorkload, kind: PodKind) -> Vec<PodInstanceId> {
    instances_where(workload, |p| p.kind == kind)
}

/// Every instance whose `anti_affinity_group` or `co_location_group` equals `group`.
pub fn instances_in_group(workload: &ResolvedWorkload, group: &str) -> Vec<PodInstanceId> {
    instances_where(workload, |p| {
        p.anti_affinity_group.as_deref() == Some(group) || p.co_location_group.as_deref() == Some(group)
    })
}

pub fn total_sockets(server_configs: &[dr_core::domain::ServerConfiguration]) -> u32 {
    server_configs.iter().map(|s| s.sockets as u32).sum()
}
