// Modules for data loading
use flate2::read::MultiGzDecoder;
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::FilterError;
use crate::fusion::{self, Breakpoint, FusionRecord, SpliceType, REQUIRED_COLUMNS};
use crate::junction::ReadSupport;

/// Column layout of a fusion candidate table, in file order.
#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    columns: Vec<String>,
}

impl Header {
    pub fn new(columns: Vec<String>) -> Self {
        Header { columns }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    // Columns are written back by name, so names must be unique
    fn duplicate_column(&self) -> Option<&str> {
        let mut seen = HashSet::new();
        self.columns
            .iter()
            .find(|c| !seen.insert(c.as_str()))
            .map(String::as_str)
    }
}

// Indices of the interpreted columns within a row
struct ColumnIndex {
    by_name: HashMap<&'static str, usize>,
}

impl ColumnIndex {
    fn from_header(header: &Header) -> Result<Self, FilterError> {
        let mut by_name = HashMap::new();
        for name in REQUIRED_COLUMNS {
            let idx = header
                .columns()
                .iter()
                .position(|c| c == name)
                .ok_or_else(|| FilterError::MissingColumn(name.to_string()))?;
            by_name.insert(name, idx);
        }
        Ok(ColumnIndex { by_name })
    }

    fn get<'a>(&self, fields: &[&'a str], name: &'static str) -> &'a str {
        fields[self.by_name[name]]
    }

    fn is_interpreted(&self, idx: usize) -> bool {
        self.by_name.values().any(|&i| i == idx)
    }
}

// Open a plain or gzipped text file
pub fn open_reader(path: &Path) -> Result<Box<dyn BufRead>, FilterError> {
    let file = File::open(path)?;
    if path.extension().map_or(false, |ext| ext == "gz") {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

// Function to load the fusion candidates
pub fn load_fusions(path: &Path) -> Result<(Header, Vec<FusionRecord>), FilterError> {
    let reader = open_reader(path)?;
    read_fusions(reader)
}

pub fn read_fusions<R: BufRead>(reader: R) -> Result<(Header, Vec<FusionRecord>), FilterError> {
    let mut header: Option<(Header, ColumnIndex)> = None;
    let mut records = Vec::new();

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = i + 1;
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }

        if line.starts_with(fusion::FUSION_NAME) && header.is_none() {
            let parsed = Header::new(line.split('\t').map(str::to_string).collect());
            if let Some(column) = parsed.duplicate_column() {
                return Err(FilterError::Parse {
                    line: line_no,
                    msg: format!("duplicate column '{}' in header", column),
                });
            }
            let index = ColumnIndex::from_header(&parsed)?;
            header = Some((parsed, index));
            continue;
        }

        // Preamble and excluded (commented) rows
        if line.starts_with('#') {
            continue;
        }

        let (hdr, index) = header.as_ref().ok_or_else(|| FilterError::Parse {
            line: line_no,
            msg: format!("data row before {} header", fusion::FUSION_NAME),
        })?;
        records.push(parse_row(line, line_no, records.len(), hdr, index)?);
    }

    match header {
        Some((hdr, _)) => Ok((hdr, records)),
        None => Err(FilterError::MissingColumn(fusion::FUSION_NAME.to_string())),
    }
}

fn parse_count(value: &str, column: &str, line_no: usize) -> Result<u32, FilterError> {
    value.trim().parse::<u32>().map_err(|e| FilterError::Parse {
        line: line_no,
        msg: format!("{} '{}': {}", column, value, e),
    })
}

fn parse_row(
    line: &str,
    line_no: usize,
    row: usize,
    header: &Header,
    index: &ColumnIndex,
) -> Result<FusionRecord, FilterError> {
    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() != header.len() {
        return Err(FilterError::Parse {
            line: line_no,
            msg: format!("expected {} columns, found {}", header.len(), fields.len()),
        });
    }

    let breakpoint = |column: &'static str| {
        index
            .get(&fields, column)
            .parse::<Breakpoint>()
            .map_err(|msg| FilterError::Parse { line: line_no, msg })
    };

    let passthrough = header
        .columns()
        .iter()
        .zip(fields.iter())
        .enumerate()
        .filter(|(idx, _)| !index.is_interpreted(*idx))
        .map(|(_, (name, value))| (name.clone(), value.to_string()))
        .collect();

    Ok(FusionRecord {
        row,
        fusion_name: index.get(&fields, fusion::FUSION_NAME).to_string(),
        splice_type: index
            .get(&fields, fusion::SPLICE_TYPE)
            .parse::<SpliceType>()
            .unwrap_or_else(|never| match never {}),
        junction_read_count: parse_count(
            index.get(&fields, fusion::JUNCTION_READ_COUNT),
            fusion::JUNCTION_READ_COUNT,
            line_no,
        )?,
        spanning_frag_count: parse_count(
            index.get(&fields, fusion::SPANNING_FRAG_COUNT),
            fusion::SPANNING_FRAG_COUNT,
            line_no,
        )?,
        left_gene: index.get(&fields, fusion::LEFT_GENE).to_string(),
        left_breakpoint: breakpoint(fusion::LEFT_BREAKPOINT)?,
        right_gene: index.get(&fields, fusion::RIGHT_GENE).to_string(),
        right_breakpoint: breakpoint(fusion::RIGHT_BREAKPOINT)?,
        support: ReadSupport::parse(
            index.get(&fields, fusion::JUNCTION_READS),
            index.get(&fields, fusion::SPANNING_FRAGS),
        ),
        large_anchor_support: index.get(&fields, fusion::LARGE_ANCHOR_SUPPORT).to_string(),
        passthrough,
    })
}
