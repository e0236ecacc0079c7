//! CapacityEvaluator: rules C1–C4.
//!
//! Builds the `SocketSlot` table (C2/C3/C4) and checks aggregate demand
//! against aggregate supply (C1). Runs against a `ResolvedWorkload`, since
//! capacity is evaluated after the resolver has injected every implicit pod.

use alloc::format;
use alloc::vec::Vec;

use dr_core::determinism::sort_slots_canonical;
use dr_core::domain::{ResolvedWorkload, SocketSlot, Violation, ViolationCategory};
use dr_core::ids::RuleId;
use dr_core::ratio::Vcores;

use crate::common;

/// Per-operator per-socket deductions the catalog owns (§4.1); capacity
/// arithmetic itself is catalog-agnostic.
#[derive(Clone, Copy, Debug)]
pub struct CapacityInputs {
    pub caas_cores_per_socket: u32,
    pub shared_cores_per_socket: u32,
}

/// Builds the slot table and evaluates C1–C4, in that fixed order (C2/C3/C4
/// fold into slot construction; C1 is the aggregate check over the result).
pub fn evaluate(workload: &ResolvedWorkload, inputs: &CapacityInputs) -> (Vec<SocketSlot>, Vec<Violation>) {
    let mut violations = Vec::new();
    let mut slots = Vec::new();

    let caas_vcores = Vcores::from_whole(inputs.caas_cores_per_socket as i64 * 2);
    let shared_vcores = Vcores::from_whole(inputs.shared_cores_per_socket as i64 * 2);

    for (server_index, server) in workload.input.server_configs.iter().enumerate() {
        let server_index = server_index as u32;

        if !server.declared_vcores_match_pcores() {
            violations.push(Violation::new(
                RuleId::C2,
                ViolationCategory::Capacity,
                format!(
                    "server {server_index}: declared vcores {} do not equal 2 * pcores ({})",
                    server.vcores, server.pcores
                ),
            ));
            continue;
        }

        let per_socket_total = match server.vcores.divide_evenly(server.sockets as u32) {
            Some(v) => v,
            None => {
                violations.push(Violation::new(
                    RuleId::C2,
                    ViolationCategory::Capacity,
                    format!(
                        "server {server_index}: {} vcores do not split evenly across {} sockets",
                        server.vcores, server.sockets
                    ),
                ));
                continue;
            }
        };

        for socket_index in 0..server.sockets as u32 {
            slots.push(SocketSlot {
                server_index,
                socket_index,
                vcores_total: per_socket_total,
                vcores_caas: caas_vcores,
                vcores_shared: shared_vcores,
            });
        }
    }

    sort_slots_canonical(&mut slots);

    let supply = slots.iter().fold(Vcores::ZERO, |acc, s| acc + s.vcores_available());
    let demand = workload.pods.iter().fold(Vcores::ZERO, |acc, p| acc + p.vcores.mul_u32(p.quantity));

    if demand > supply {
        let offending = common::instances_where(workload, |_| true);
        violations.push(
            Violation::new(
                RuleId::C1,
                ViolationCategory::Capacity,
                format!("demand {demand} vcores exceeds supply {supply} vcores (deficit {})", demand - supply),
            )
            .with_offending(offending),
        );
    }

    (slots, violations)
}
