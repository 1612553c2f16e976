// Modules for running the full filtering pipeline
use log::info;
use std::fs;

use crate::audit::AuditTrail;
use crate::config::{FilterParams, RunConfig};
use crate::data_loader::load_fusions;
use crate::error::FilterError;
use crate::external::PostFilter;
use crate::fusion::FusionRecord;
use crate::isoform::suppress_minor_isoforms;
use crate::merge::merge_novel_splice_variants;
use crate::report::{
    exclude_columns, relocate, write_audit, write_fusions, OutputPaths, ABRIDGED_EXCLUDED,
};
use crate::support::filter_by_support;

#[derive(Debug, Clone)]
pub struct FilterOutcome {
    pub retained: Vec<FusionRecord>,
    // Excluded records in stage order, then every retained record
    pub audit: AuditTrail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSummary {
    pub loaded: usize,
    pub merged: usize,
    pub support_filtered: usize,
    pub minor_isoforms: usize,
    pub retained: usize,
}

impl RunSummary {
    pub fn from_audit(loaded: usize, audit: &AuditTrail) -> Self {
        RunSummary {
            loaded,
            merged: audit.merged(),
            support_filtered: audit.support_filtered(),
            minor_isoforms: audit.minor_isoforms(),
            retained: audit.retained(),
        }
    }
}

/// Merge, threshold and isoform-filter a loaded candidate set.
pub fn filter_fusions(records: Vec<FusionRecord>, params: &FilterParams) -> FilterOutcome {
    let mut audit = AuditTrail::new();

    let n = records.len();
    let merged = merge_novel_splice_variants(records, params, &mut audit);
    info!("Merged {} non-reference splice variants ({} -> {})", n - merged.len(), n, merged.len());

    let n = merged.len();
    let supported = filter_by_support(merged, params, &mut audit);
    info!("Support filter removed {} of {} fusions", n - supported.len(), n);

    let n = supported.len();
    let retained = suppress_minor_isoforms(supported, params, &mut audit);
    info!("Isoform filter removed {} of {} fusions", n - retained.len(), n);

    for record in &retained {
        audit.retain(record.clone());
    }

    FilterOutcome { retained, audit }
}

pub fn run(config: &RunConfig, post_filter: &dyn PostFilter) -> Result<RunSummary, FilterError> {
    info!("Loading fusion candidates from {:?}", config.fusion_preds);
    let (header, records) = load_fusions(&config.fusion_preds)?;
    let loaded = records.len();
    info!("Loaded {} fusion candidates", loaded);

    let outcome = filter_fusions(records, &config.filter);

    if let Some(parent) = config.out_prefix.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let paths = OutputPaths::new(&config.out_prefix);
    info!("Writing {:?}", paths.staging);
    write_fusions(&paths.staging, &header, &outcome.retained)?;
    info!("Writing {:?}", paths.filter_info);
    write_audit(&paths.filter_info, &header, &outcome.audit)?;

    let outputs = post_filter.run(&paths.staging, &config.out_prefix)?;
    if let Some(intermediate) = &outputs.intermediate {
        relocate(intermediate, &paths.post_blast)?;
    }
    relocate(&outputs.final_out, &paths.final_out)?;
    exclude_columns(&paths.final_out, &paths.final_abridged, &ABRIDGED_EXCLUDED)?;

    let summary = RunSummary::from_audit(loaded, &outcome.audit);
    info!(
        "Loaded {}, merged {}, support-filtered {}, minor isoforms {}, retained {}",
        summary.loaded,
        summary.merged,
        summary.support_filtered,
        summary.minor_isoforms,
        summary.retained
    );
    Ok(summary)
}
