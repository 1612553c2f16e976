// Modules for the external blast and promiscuity filter
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::config::PostFilterParams;
use crate::error::FilterError;
use crate::report::with_suffix;

/// Files left behind by a post-filter run.
#[derive(Debug, Clone, PartialEq)]
pub struct PostFilterOutputs {
    // Present only when the stage writes a post-blast intermediate
    pub intermediate: Option<PathBuf>,
    pub final_out: PathBuf,
}

/// A filtering stage run on the staging file after the in-memory pipeline.
///
/// Implementations read `staging` and must leave their outputs next to it;
/// the caller treats those files as opaque.
pub trait PostFilter {
    fn run(&self, staging: &Path, out_prefix: &Path) -> Result<PostFilterOutputs, FilterError>;
}

// Blast-based similarity and partner promiscuity filter run as a subprocess
#[derive(Debug, Clone)]
pub struct BlastPromiscuityFilter {
    pub exe: PathBuf,
    pub genome_lib_dir: PathBuf,
    pub params: PostFilterParams,
}

impl BlastPromiscuityFilter {
    pub fn expected_outputs(staging: &Path) -> PostFilterOutputs {
        PostFilterOutputs {
            intermediate: Some(with_suffix(staging, ".post_blast_filter")),
            final_out: with_suffix(staging, ".post_blast_and_promiscuity_filter"),
        }
    }

    fn command(&self, staging: &Path, out_prefix: &Path) -> Command {
        let mut cmd = Command::new(&self.exe);
        cmd.arg("--fusion_preds")
            .arg(staging)
            .arg("--out_prefix")
            .arg(out_prefix)
            .arg("--genome_lib_dir")
            .arg(&self.genome_lib_dir)
            .arg("--max_promiscuity")
            .arg(self.params.max_promiscuity.to_string())
            .arg("--min_pct_dom_promiscuity")
            .arg(self.params.min_pct_dom_promiscuity.to_string())
            .arg("--Evalue")
            .arg(self.params.evalue.to_string());
        cmd
    }
}

impl PostFilter for BlastPromiscuityFilter {
    fn run(&self, staging: &Path, out_prefix: &Path) -> Result<PostFilterOutputs, FilterError> {
        let mut cmd = self.command(staging, out_prefix);
        info!("Running external filter {:?}", self.exe);
        debug!("{:?}", cmd);

        let output = cmd.output()?;
        if !output.status.success() {
            return Err(FilterError::ExternalFailed {
                exe: self.exe.display().to_string(),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let outputs = Self::expected_outputs(staging);
        for path in outputs.intermediate.iter().chain(std::iter::once(&outputs.final_out)) {
            if !path.is_file() {
                return Err(FilterError::MissingOutput(path.clone()));
            }
        }
        Ok(outputs)
    }
}

// Stand-in used when the external stage is skipped: the staging file is
// passed on as the final result
#[derive(Debug, Clone, Default)]
pub struct NoPostFilter;

impl PostFilter for NoPostFilter {
    fn run(&self, staging: &Path, _out_prefix: &Path) -> Result<PostFilterOutputs, FilterError> {
        let final_out = with_suffix(staging, ".unfiltered");
        fs::copy(staging, &final_out)?;
        Ok(PostFilterOutputs {
            intermediate: None,
            final_out,
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    fn filter_with(exe: &Path) -> BlastPromiscuityFilter {
        BlastPromiscuityFilter {
            exe: exe.to_path_buf(),
            genome_lib_dir: PathBuf::from("/tmp"),
            params: PostFilterParams::default(),
        }
    }

    #[test]
    fn test_nonzero_exit_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let staging = dir.path().join("s.pre_blast_filter");
        fs::write(&staging, "#FusionName\n").unwrap();

        let err = filter_with(Path::new("false"))
            .run(&staging, &dir.path().join("s"))
            .unwrap_err();
        assert!(matches!(err, FilterError::ExternalFailed { code: Some(1), .. }));
    }

    #[test]
    fn test_missing_output_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let staging = dir.path().join("s.pre_blast_filter");
        fs::write(&staging, "#FusionName\n").unwrap();

        let err = filter_with(Path::new("true"))
            .run(&staging, &dir.path().join("s"))
            .unwrap_err();
        assert!(matches!(err, FilterError::MissingOutput(_)));
    }

    #[test]
    fn test_script_outputs_are_found() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("filter.sh");
        fs::write(
            &script,
            "#!/bin/sh\n\
             cp \"$2\" \"$2.post_blast_filter\"\n\
             cp \"$2\" \"$2.post_blast_and_promiscuity_filter\"\n",
        )
        .unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

        let staging = dir.path().join("s.pre_blast_filter");
        fs::write(&staging, "#FusionName\n").unwrap();

        let outputs = filter_with(&script).run(&staging, &dir.path().join("s")).unwrap();
        assert_eq!(outputs, BlastPromiscuityFilter::expected_outputs(&staging));
        assert!(outputs.final_out.is_file());
    }

    #[test]
    fn test_no_post_filter_copies_staging() {
        let dir = tempfile::tempdir().unwrap();
        let staging = dir.path().join("s.pre_blast_filter");
        fs::write(&staging, "#FusionName\nA--B\n").unwrap();

        let outputs = NoPostFilter.run(&staging, &dir.path().join("s")).unwrap();
        assert!(outputs.intermediate.is_none());
        assert_eq!(fs::read_to_string(&outputs.final_out).unwrap(), "#FusionName\nA--B\n");
        assert!(staging.is_file());
    }
}
