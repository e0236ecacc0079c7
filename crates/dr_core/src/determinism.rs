//! Stable ordering helpers.
//!
//! All iteration over pods or slots elsewhere in the engine must use
//! insertion order or one of the explicit sort keys below; unordered
//! containers (`HashMap`/`HashSet`) must never leak into a user-visible
//! output.

use core::cmp::Ordering;

use crate::domain::SocketSlot;
use crate::ids::PodInstanceId;

/// Types participating in stable selections expose a total order key.
pub trait StableOrd {
    fn stable_cmp(&self, other: &Self) -> Ordering;
}

impl StableOrd for PodInstanceId {
    #[inline]
    fn stable_cmp(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }
}

/// Compare slots by `(server_index, socket_index)`, the planner's fixed
/// tie-break order.
#[inline]
pub fn cmp_slots_by_index(a: &SocketSlot, b: &SocketSlot) -> Ordering {
    match a.server_index.cmp(&b.server_index) {
        Ordering::Equal => a.socket_index.cmp(&b.socket_index),
        o => o,
    }
}

/// Sort slots in place into canonical `(server_index, socket_index)` order.
#[inline]
pub fn sort_slots_canonical(slots: &mut [SocketSlot]) {
    slots.sort_by(cmp_slots_by_index);
}
