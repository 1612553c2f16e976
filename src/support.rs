// Modules for evidence-threshold filtering
use crate::audit::{AuditTrail, FilterReason};
use crate::config::FilterParams;
use crate::fusion::FusionRecord;

// First failing check wins; later checks are not evaluated
pub fn check_support(record: &FusionRecord, params: &FilterParams) -> Option<FilterReason> {
    let j = record.junction_read_count;
    let s = record.spanning_frag_count;

    if record.total_support() < params.min_sum_frags as u64 {
        return Some(FilterReason::InsufficientTotalSupport {
            j,
            s,
            min: params.min_sum_frags,
        });
    }

    if record.is_novel_splice() && j < params.min_novel_junction_support {
        return Some(FilterReason::InsufficientNovelJunctionSupport {
            j,
            min: params.min_novel_junction_support,
        });
    }

    if j < params.min_junction_reads {
        return Some(FilterReason::InsufficientJunctionSupport {
            j,
            min: params.min_junction_reads,
        });
    }

    if s == 0 && params.require_long_double_anchor_support && !record.has_long_double_anchor() {
        return Some(FilterReason::NoSpanningNoAnchorSupport);
    }

    None
}

pub fn filter_by_support(
    records: Vec<FusionRecord>,
    params: &FilterParams,
    audit: &mut AuditTrail,
) -> Vec<FusionRecord> {
    let mut kept = Vec::with_capacity(records.len());
    for record in records {
        match check_support(&record, params) {
            Some(reason) => audit.exclude(record, reason),
            None => kept.push(record),
        }
    }
    kept
}
