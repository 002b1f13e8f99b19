//! Count aggregation over join keys.
//!
//! Each record contributes one increment to **every** key in its key
//! set, so a settlement point can find its count under either its name
//! key or its code key. The maps are ephemeral: recomputed whenever the
//! complaint set or filter changes.

use std::collections::{BTreeMap, BTreeSet};

use grievance_map_models::{ComplaintRecord, SettlementKind, keys};

/// Counts items per join key.
///
/// `keys_for` yields the candidate key set for an item; every key in the
/// set is incremented. Items with an empty key set are unkeyed and
/// contribute nothing. Commutative over the input: any iteration order
/// yields the same map.
pub fn count_by_keys<T, I, F>(items: I, keys_for: F) -> BTreeMap<String, u64>
where
    I: IntoIterator<Item = T>,
    F: Fn(&T) -> BTreeSet<String>,
{
    let mut counts = BTreeMap::new();

    for item in items {
        for key in keys_for(&item) {
            *counts.entry(key).or_insert(0) += 1;
        }
    }

    counts
}

/// Counts complaints per subdistrict by direct text-field keying.
///
/// Boundary-level aggregation joins on the normalized subdistrict name
/// alone — subdistrict boundaries carry no code fallback.
#[must_use]
pub fn count_by_subdistrict(complaints: &[ComplaintRecord]) -> BTreeMap<String, u64> {
    count_by_keys(complaints, |complaint| {
        let key = keys::normalize_name(&complaint.subdistrict_name);
        if key.is_empty() {
            BTreeSet::new()
        } else {
            BTreeSet::from([key])
        }
    })
}

/// The join-key set a complaint carries for settlement level `kind`
/// (name and administrative code, when present).
#[must_use]
pub fn settlement_keys(complaint: &ComplaintRecord, kind: SettlementKind) -> BTreeSet<String> {
    keys::join_keys(
        complaint.settlement_name(kind),
        complaint.settlement_code(kind),
    )
}

/// Counts complaints per settlement join key for `kind`.
#[must_use]
pub fn count_by_settlement(
    complaints: &[ComplaintRecord],
    kind: SettlementKind,
) -> BTreeMap<String, u64> {
    count_by_keys(complaints, |complaint| settlement_keys(complaint, kind))
}
