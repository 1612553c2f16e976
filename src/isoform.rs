// Modules for suppressing minor isoforms of the same fusion
use std::collections::HashMap;

use itertools::Itertools;

use crate::audit::{AuditTrail, FilterReason};
use crate::config::FilterParams;
use crate::fusion::{by_support_desc, FusionRecord};

/// Keep, per fusion name, only isoforms whose junction support is at least
/// `min_alt_pct_junction` percent of the best-supported isoform's.
///
/// Records are visited in descending (junction reads, spanning frags) order,
/// so the first record seen for a name is its dominant isoform. A dominant
/// isoform without junction reads sets no reference and every later isoform
/// of that name is kept.
pub fn suppress_minor_isoforms(
    records: Vec<FusionRecord>,
    params: &FilterParams,
    audit: &mut AuditTrail,
) -> Vec<FusionRecord> {
    let mut dominant_support: HashMap<String, u32> = HashMap::new();
    let mut kept = Vec::with_capacity(records.len());

    for record in records.into_iter().sorted_by(by_support_desc) {
        let j = record.junction_read_count;
        match dominant_support.get(&record.fusion_name) {
            // Only non-zero dominant support is ever stored
            Some(&dominant) => {
                let pct = j as f64 / dominant as f64 * 100.0;
                if pct < params.min_alt_pct_junction {
                    audit.exclude(record, FilterReason::MinorIsoform { pct, dominant });
                    continue;
                }
            }
            None => {
                if j > 0 {
                    dominant_support.insert(record.fusion_name.clone(), j);
                }
            }
        }
        kept.push(record);
    }

    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fusion::test_support::fusion;

    #[test]
    fn test_minor_isoform_below_threshold() {
        let params = FilterParams::default();
        let records = vec![fusion(0, "G1--G2", 1, 0), fusion(1, "G1--G2", 20, 0)];
        let mut audit = AuditTrail::new();

        let kept = suppress_minor_isoforms(records, &params, &mut audit);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].row, 1);
        assert_eq!(
            audit.entries()[0].reason,
            Some(FilterReason::MinorIsoform { pct: 5.0, dominant: 20 })
        );
    }

    #[test]
    fn test_minor_isoform_above_threshold() {
        let params = FilterParams::default();
        let records = vec![fusion(0, "G1--G2", 3, 0), fusion(1, "G1--G2", 20, 0)];
        let mut audit = AuditTrail::new();

        let kept = suppress_minor_isoforms(records, &params, &mut audit);
        let rows: Vec<_> = kept.iter().map(|r| r.row).collect();
        assert_eq!(rows, vec![1, 0]);
        assert!(audit.is_empty());
    }

    #[test]
    fn test_pct_rounding_at_threshold() {
        // 29 / 100 * 100 evaluates just below 29
        let params = FilterParams {
            min_alt_pct_junction: 29.0,
            ..FilterParams::default()
        };
        let records = vec![fusion(0, "G1--G2", 100, 0), fusion(1, "G1--G2", 29, 0)];
        let mut audit = AuditTrail::new();

        let kept = suppress_minor_isoforms(records, &params, &mut audit);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].row, 0);
        assert_eq!(audit.minor_isoforms(), 1);
        assert_eq!(audit.entries()[0].record.row, 1);
    }

    #[test]
    fn test_names_are_independent() {
        let params = FilterParams::default();
        let records = vec![fusion(0, "G1--G2", 20, 0), fusion(1, "G3--G4", 1, 0)];
        let mut audit = AuditTrail::new();

        let kept = suppress_minor_isoforms(records, &params, &mut audit);
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn test_zero_dominant_support_keeps_all() {
        let params = FilterParams::default();
        let records = vec![fusion(0, "G1--G2", 0, 5), fusion(1, "G1--G2", 0, 2)];
        let mut audit = AuditTrail::new();

        let kept = suppress_minor_isoforms(records, &params, &mut audit);
        assert_eq!(kept.len(), 2);
        assert!(audit.is_empty());
    }

    #[test]
    fn test_spanning_frags_break_junction_ties() {
        let params = FilterParams::default();
        let records = vec![fusion(0, "G1--G2", 5, 1), fusion(1, "G1--G2", 5, 4)];
        let mut audit = AuditTrail::new();

        let kept = suppress_minor_isoforms(records, &params, &mut audit);
        let rows: Vec<_> = kept.iter().map(|r| r.row).collect();
        assert_eq!(rows, vec![1, 0]);
    }
}
