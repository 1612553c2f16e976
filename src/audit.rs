// Modules for the audit trail of excluded and retained fusions
use std::fmt;

use crate::fusion::{Breakpoint, FusionRecord};

/// Why a fusion call was dropped from the retained set.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterReason {
    Merged {
        into: String,
        left: Breakpoint,
        right: Breakpoint,
    },
    InsufficientTotalSupport { j: u32, s: u32, min: u32 },
    InsufficientNovelJunctionSupport { j: u32, min: u32 },
    InsufficientJunctionSupport { j: u32, min: u32 },
    NoSpanningNoAnchorSupport,
    MinorIsoform { pct: f64, dominant: u32 },
}

impl fmt::Display for FilterReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterReason::Merged { into, left, right } => {
                write!(f, "Merged into {} ({}, {})", into, left, right)
            }
            FilterReason::InsufficientTotalSupport { j, s, min } => write!(
                f,
                "FILTERED DUE TO insufficient total support: junction reads ({}) + spanning frags ({}) < min_sum_frags ({})",
                j, s, min
            ),
            FilterReason::InsufficientNovelJunctionSupport { j, min } => write!(
                f,
                "FILTERED DUE TO insufficient novel-junction support: {} junction reads for non-reference splice < min_novel_junction_support ({})",
                j, min
            ),
            FilterReason::InsufficientJunctionSupport { j, min } => write!(
                f,
                "FILTERED DUE TO insufficient junction-read support: {} junction reads < min_junction_reads ({})",
                j, min
            ),
            FilterReason::NoSpanningNoAnchorSupport => write!(
                f,
                "FILTERED DUE TO no spanning support and no anchor support at breakpoint"
            ),
            FilterReason::MinorIsoform { pct, dominant } => write!(
                f,
                "FILTERED DUE TO minor isoform: only {:.2}% of dominant isoform support ({})",
                pct, dominant
            ),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AuditEntry {
    pub record: FusionRecord,
    // None means the record made it to the end of the pipeline
    pub reason: Option<FilterReason>,
}

impl AuditEntry {
    pub fn is_excluded(&self) -> bool {
        self.reason.is_some()
    }

    pub fn note(&self) -> String {
        match &self.reason {
            Some(reason) => reason.to_string(),
            None => "Retained".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AuditTrail {
    entries: Vec<AuditEntry>,
}

impl AuditTrail {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn exclude(&mut self, record: FusionRecord, reason: FilterReason) {
        log::debug!("{} (row {}): {}", record.fusion_name, record.row, reason);
        self.entries.push(AuditEntry {
            record,
            reason: Some(reason),
        });
    }

    pub fn retain(&mut self, record: FusionRecord) {
        self.entries.push(AuditEntry {
            record,
            reason: None,
        });
    }

    pub fn entries(&self) -> &[AuditEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn count_matching<F: Fn(&FilterReason) -> bool>(&self, pred: F) -> usize {
        self.entries
            .iter()
            .filter(|e| e.reason.as_ref().map_or(false, &pred))
            .count()
    }

    pub fn merged(&self) -> usize {
        self.count_matching(|r| matches!(r, FilterReason::Merged { .. }))
    }

    pub fn minor_isoforms(&self) -> usize {
        self.count_matching(|r| matches!(r, FilterReason::MinorIsoform { .. }))
    }

    pub fn retained(&self) -> usize {
        self.entries.iter().filter(|e| !e.is_excluded()).count()
    }

    pub fn support_filtered(&self) -> usize {
        self.count_matching(|r| {
            !matches!(r, FilterReason::Merged { .. } | FilterReason::MinorIsoform { .. })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fusion::test_support::fusion;

    #[test]
    fn test_counts_by_outcome() {
        let mut audit = AuditTrail::new();
        let record = fusion(0, "A--B", 1, 1);
        audit.exclude(
            record.clone(),
            FilterReason::Merged {
                into: "A--B".to_string(),
                left: record.left_breakpoint.clone(),
                right: record.right_breakpoint.clone(),
            },
        );
        audit.exclude(record.clone(), FilterReason::NoSpanningNoAnchorSupport);
        audit.exclude(record.clone(), FilterReason::MinorIsoform { pct: 5.0, dominant: 20 });
        audit.retain(record);

        assert_eq!(audit.len(), 4);
        assert_eq!(audit.merged(), 1);
        assert_eq!(audit.support_filtered(), 1);
        assert_eq!(audit.minor_isoforms(), 1);
        assert_eq!(audit.retained(), 1);
        assert_eq!(audit.entries()[3].note(), "Retained");
    }

    #[test]
    fn test_reason_text() {
        let reason = FilterReason::MinorIsoform { pct: 5.0, dominant: 20 };
        assert_eq!(
            reason.to_string(),
            "FILTERED DUE TO minor isoform: only 5.00% of dominant isoform support (20)"
        );
        let reason = FilterReason::Merged {
            into: "G1--G2".to_string(),
            left: "chr1:100:+".parse().unwrap(),
            right: "chr1:500:+".parse().unwrap(),
        };
        assert_eq!(reason.to_string(), "Merged into G1--G2 (chr1:100:+, chr1:500:+)");
    }
}
