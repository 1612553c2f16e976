// Modules for merging proximate non-reference splice variants
use log::debug;
use std::collections::HashMap;

use crate::audit::{AuditTrail, FilterReason};
use crate::config::FilterParams;
use crate::fusion::{by_score_desc, FusionRecord};

// Both breakpoints must lie within `max_dist` of the representative's
fn within_distance(rep: &FusionRecord, candidate: &FusionRecord, max_dist: u64) -> bool {
    rep.left_breakpoint.pos.abs_diff(candidate.left_breakpoint.pos) <= max_dist
        && rep.right_breakpoint.pos.abs_diff(candidate.right_breakpoint.pos) <= max_dist
}

/// Collapse non-reference splice calls of the same fusion whose breakpoints
/// differ by at most `aggregate_novel_junction_dist` on both sides.
///
/// Within each fusion name the highest-scoring remaining call becomes the
/// representative and absorbs every other remaining call in range. Calls out
/// of range are left for later rounds, so clustering is not transitive: if A
/// is near B and B near C but A is not near C, A claims B and C stands alone.
///
/// Reference splice calls are returned first in input order, followed by one
/// record per cluster, grouped by fusion name in order of first appearance.
pub fn merge_novel_splice_variants(
    records: Vec<FusionRecord>,
    params: &FilterParams,
    audit: &mut AuditTrail,
) -> Vec<FusionRecord> {
    let mut merged = Vec::with_capacity(records.len());
    let mut group_order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Vec<FusionRecord>> = HashMap::new();

    for record in records {
        if !record.is_novel_splice() {
            merged.push(record);
            continue;
        }
        if !groups.contains_key(&record.fusion_name) {
            group_order.push(record.fusion_name.clone());
        }
        groups
            .entry(record.fusion_name.clone())
            .or_insert_with(Vec::new)
            .push(record);
    }

    for name in group_order {
        let mut group = groups.remove(&name).unwrap_or_default();
        group.sort_by(by_score_desc);

        while !group.is_empty() {
            let mut rep = group.remove(0);
            let (matches, rest): (Vec<_>, Vec<_>) = group
                .into_iter()
                .partition(|candidate| {
                    within_distance(&rep, candidate, params.aggregate_novel_junction_dist)
                });

            for candidate in matches {
                debug!(
                    "Merging {} ({}, {}) into ({}, {})",
                    candidate.fusion_name,
                    candidate.left_breakpoint,
                    candidate.right_breakpoint,
                    rep.left_breakpoint,
                    rep.right_breakpoint
                );
                rep.absorb(&candidate);
                let reason = FilterReason::Merged {
                    into: rep.fusion_name.clone(),
                    left: rep.left_breakpoint.clone(),
                    right: rep.right_breakpoint.clone(),
                };
                audit.exclude(candidate, reason);
            }

            merged.push(rep);
            group = rest;
        }
    }

    merged
}
