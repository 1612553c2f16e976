// Modules for writing filtered fusions and the audit trail
use itertools::Itertools;
use log::debug;
use std::fs::{self, File};
use std::io::{BufRead, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::audit::AuditTrail;
use crate::data_loader::{open_reader, Header};
use crate::error::FilterError;
use crate::fusion::{FusionRecord, JUNCTION_READS, SPANNING_FRAGS};

// Read-ID columns dropped from abridged reports
pub const ABRIDGED_EXCLUDED: [&str; 2] = [JUNCTION_READS, SPANNING_FRAGS];

/// File names derived from the output prefix.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputPaths {
    pub staging: PathBuf,
    pub filter_info: PathBuf,
    pub post_blast: PathBuf,
    pub final_out: PathBuf,
    pub final_abridged: PathBuf,
}

pub fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}

impl OutputPaths {
    pub fn new(prefix: &Path) -> Self {
        let staging = with_suffix(prefix, ".pre_blast_filter");
        let final_out = with_suffix(prefix, ".final");
        OutputPaths {
            filter_info: with_suffix(&staging, ".filt_info"),
            post_blast: with_suffix(prefix, ".post_blast_filter"),
            final_abridged: with_suffix(&final_out, ".abridged"),
            staging,
            final_out,
        }
    }
}

fn format_row(header: &Header, record: &FusionRecord, excluded: bool) -> String {
    header
        .columns()
        .iter()
        .enumerate()
        .map(|(i, column)| {
            let value = record.column_value(column).unwrap_or_default();
            // Excluded rows read back as comments
            if i == 0 && excluded {
                format!("#{}", value)
            } else {
                value.into_owned()
            }
        })
        .join("\t")
}

pub fn write_fusions(path: &Path, header: &Header, records: &[FusionRecord]) -> Result<(), FilterError> {
    debug!("Writing {} fusions to {:?}", records.len(), path);
    let mut out = BufWriter::new(File::create(path)?);
    writeln!(out, "{}", header.columns().iter().join("\t"))?;
    for record in records {
        writeln!(out, "{}", format_row(header, record, false))?;
    }
    out.flush()?;
    Ok(())
}

pub fn write_audit(path: &Path, header: &Header, audit: &AuditTrail) -> Result<(), FilterError> {
    debug!("Writing {} audit rows to {:?}", audit.len(), path);
    let mut out = BufWriter::new(File::create(path)?);
    writeln!(out, "{}\tNote", header.columns().iter().join("\t"))?;
    for entry in audit.entries() {
        writeln!(
            out,
            "{}\t{}",
            format_row(header, &entry.record, entry.is_excluded()),
            entry.note()
        )?;
    }
    out.flush()?;
    Ok(())
}

// Copy a tab-delimited table, dropping the named columns (matched against the
// first line of the file)
pub fn exclude_columns(src: &Path, dst: &Path, excluded: &[&str]) -> Result<(), FilterError> {
    let reader = open_reader(src)?;
    let mut out = BufWriter::new(File::create(dst)?);
    let mut keep: Option<Vec<bool>> = None;

    for line in reader.lines() {
        let line = line?;
        let fields: Vec<&str> = line.split('\t').collect();
        let mask = keep.get_or_insert_with(|| {
            fields
                .iter()
                .map(|name| !excluded.contains(name))
                .collect()
        });
        let kept = fields
            .iter()
            .zip(mask.iter().chain(std::iter::repeat(&true)))
            .filter(|pair| *pair.1)
            .map(|(value, _)| *value)
            .join("\t");
        writeln!(out, "{}", kept)?;
    }
    out.flush()?;
    Ok(())
}

// Move a file into place, falling back to copy across filesystems
pub fn relocate(src: &Path, dst: &Path) -> Result<(), FilterError> {
    debug!("Moving {:?} to {:?}", src, dst);
    if fs::rename(src, dst).is_err() {
        fs::copy(src, dst)?;
        fs::remove_file(src)?;
    }
    Ok(())
}
