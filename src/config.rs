// Modules for run configuration
use clap::ArgMatches;
use std::path::{Path, PathBuf};

use crate::error::FilterError;

/// Evidence thresholds applied by the in-memory filtering stages.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterParams {
    pub min_junction_reads: u32,
    pub min_sum_frags: u32,
    pub min_novel_junction_support: u32,
    pub min_alt_pct_junction: f64,
    pub aggregate_novel_junction_dist: u64,
    pub require_long_double_anchor_support: bool,
}

impl Default for FilterParams {
    fn default() -> Self {
        FilterParams {
            min_junction_reads: 1,
            min_sum_frags: 2,
            min_novel_junction_support: 3,
            min_alt_pct_junction: 10.0,
            aggregate_novel_junction_dist: 5,
            require_long_double_anchor_support: true,
        }
    }
}

// Only consumed by the external blast/promiscuity stage
#[derive(Debug, Clone, PartialEq)]
pub struct PostFilterParams {
    pub max_promiscuity: u32,
    pub min_pct_dom_promiscuity: u32,
    pub evalue: f64,
}

impl Default for PostFilterParams {
    fn default() -> Self {
        PostFilterParams {
            max_promiscuity: 10,
            min_pct_dom_promiscuity: 20,
            evalue: 1e-3,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub fusion_preds: PathBuf,
    pub out_prefix: PathBuf,
    pub genome_lib_dir: PathBuf,
    pub blast_filter_exe: PathBuf,
    pub skip_blast_filter: bool,
    pub filter: FilterParams,
    pub post_filter: PostFilterParams,
}

fn required<'a, T: Clone + Send + Sync + 'static>(
    matches: &'a ArgMatches,
    id: &str,
) -> Result<&'a T, FilterError> {
    matches
        .get_one::<T>(id)
        .ok_or_else(|| FilterError::InvalidInput(format!("missing required option --{}", id)))
}

impl RunConfig {
    pub fn from_matches(matches: &ArgMatches) -> Result<Self, FilterError> {
        let filter = FilterParams {
            min_junction_reads: *required::<u32>(matches, "min-junction-reads")?,
            min_sum_frags: *required::<u32>(matches, "min-sum-frags")?,
            min_novel_junction_support: *required::<u32>(matches, "min-novel-junction-support")?,
            min_alt_pct_junction: *required::<f64>(matches, "min-alt-pct-junction")?,
            aggregate_novel_junction_dist: *required::<u64>(matches, "aggregate-novel-junction-dist")?,
            require_long_double_anchor_support: *required::<bool>(matches, "require-LDAS")?,
        };
        let post_filter = PostFilterParams {
            max_promiscuity: *required::<u32>(matches, "max-promiscuity")?,
            min_pct_dom_promiscuity: *required::<u32>(matches, "min-pct-dom-promiscuity")?,
            evalue: *required::<f64>(matches, "evalue")?,
        };

        Ok(RunConfig {
            fusion_preds: required::<PathBuf>(matches, "fusion-preds")?.clone(),
            out_prefix: required::<PathBuf>(matches, "out-prefix")?.clone(),
            genome_lib_dir: required::<PathBuf>(matches, "genome-lib-dir")?.clone(),
            blast_filter_exe: required::<PathBuf>(matches, "blast-filter-exe")?.clone(),
            skip_blast_filter: matches.get_flag("skip-blast-filter"),
            filter,
            post_filter,
        })
    }

    // Checked before any output is written
    pub fn validate(&self) -> Result<(), FilterError> {
        validate_input_file(&self.fusion_preds)?;

        if !self.skip_blast_filter && !self.genome_lib_dir.is_dir() {
            return Err(FilterError::InvalidInput(format!(
                "genome library directory {:?} does not exist",
                self.genome_lib_dir
            )));
        }

        if self.out_prefix.as_os_str().is_empty() {
            return Err(FilterError::InvalidInput("output prefix is empty".to_string()));
        }

        let pct = self.filter.min_alt_pct_junction;
        if !pct.is_finite() || pct < 0.0 {
            return Err(FilterError::InvalidInput(format!(
                "min alt pct junction must be a non-negative number, got {}",
                pct
            )));
        }

        Ok(())
    }
}

fn validate_input_file(path: &Path) -> Result<(), FilterError> {
    if !path.exists() {
        return Err(FilterError::InvalidInput(format!("{:?} does not exist", path)));
    }
    if !path.is_file() {
        return Err(FilterError::InvalidInput(format!("{:?} is not a file", path)));
    }
    if std::fs::metadata(path)?.len() == 0 {
        return Err(FilterError::InvalidInput(format!("file {:?} is empty", path)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn config_for(input: PathBuf, lib: PathBuf) -> RunConfig {
        RunConfig {
            fusion_preds: input,
            out_prefix: PathBuf::from("out/sample"),
            genome_lib_dir: lib,
            blast_filter_exe: PathBuf::from("blast_and_promiscuity_filter.pl"),
            skip_blast_filter: false,
            filter: FilterParams::default(),
            post_filter: PostFilterParams::default(),
        }
    }

    #[test]
    fn test_validate_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_for(dir.path().join("nope.tsv"), dir.path().to_path_buf());
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_validate_empty_input_and_missing_lib() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("preds.tsv");
        std::fs::File::create(&input).unwrap();
        let config = config_for(input.clone(), dir.path().to_path_buf());
        assert!(config.validate().unwrap_err().to_string().contains("empty"));

        writeln!(std::fs::File::create(&input).unwrap(), "#FusionName").unwrap();
        let mut config = config_for(input, dir.path().join("missing_lib"));
        assert!(config.validate().unwrap_err().to_string().contains("genome library"));

        config.skip_blast_filter = true;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_bad_pct() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("preds.tsv");
        writeln!(std::fs::File::create(&input).unwrap(), "#FusionName").unwrap();
        let mut config = config_for(input, dir.path().to_path_buf());
        config.filter.min_alt_pct_junction = -1.0;
        assert!(config.validate().is_err());
    }
}
