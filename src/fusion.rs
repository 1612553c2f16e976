// Modules for fusion candidate records
use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::junction::ReadSupport;

pub const FUSION_NAME: &str = "#FusionName";
pub const JUNCTION_READ_COUNT: &str = "JunctionReadCount";
pub const SPANNING_FRAG_COUNT: &str = "SpanningFragCount";
pub const SPLICE_TYPE: &str = "SpliceType";
pub const LEFT_GENE: &str = "LeftGene";
pub const LEFT_BREAKPOINT: &str = "LeftBreakpoint";
pub const RIGHT_GENE: &str = "RightGene";
pub const RIGHT_BREAKPOINT: &str = "RightBreakpoint";
pub const JUNCTION_READS: &str = "JunctionReads";
pub const SPANNING_FRAGS: &str = "SpanningFrags";
pub const LARGE_ANCHOR_SUPPORT: &str = "LargeAnchorSupport";

pub const REQUIRED_COLUMNS: [&str; 11] = [
    FUSION_NAME,
    JUNCTION_READ_COUNT,
    SPANNING_FRAG_COUNT,
    SPLICE_TYPE,
    LEFT_GENE,
    LEFT_BREAKPOINT,
    RIGHT_GENE,
    RIGHT_BREAKPOINT,
    JUNCTION_READS,
    SPANNING_FRAGS,
    LARGE_ANCHOR_SUPPORT,
];

// Relative weight of a junction read against a spanning fragment
const JUNCTION_WEIGHT: u64 = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpliceType {
    OnlyRefSplice,
    InclNonRefSplice,
    Other(String),
}

impl FromStr for SpliceType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "ONLY_REF_SPLICE" => SpliceType::OnlyRefSplice,
            "INCL_NON_REF_SPLICE" => SpliceType::InclNonRefSplice,
            other => SpliceType::Other(other.to_string()),
        })
    }
}

impl fmt::Display for SpliceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpliceType::OnlyRefSplice => write!(f, "ONLY_REF_SPLICE"),
            SpliceType::InclNonRefSplice => write!(f, "INCL_NON_REF_SPLICE"),
            SpliceType::Other(s) => write!(f, "{}", s),
        }
    }
}

/// A `chrom:pos:strand` breakpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Breakpoint {
    pub chrom: String,
    pub pos: u64,
    pub strand: String,
}

impl FromStr for Breakpoint {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Split from the right; contig names may themselves contain ':'
        let mut parts = s.rsplitn(3, ':');
        let strand = parts.next();
        let pos = parts.next();
        let chrom = parts.next();
        match (chrom, pos, strand) {
            (Some(chrom), Some(pos), Some(strand)) if !chrom.is_empty() => {
                let pos = pos
                    .parse::<u64>()
                    .map_err(|e| format!("invalid breakpoint position in '{}': {}", s, e))?;
                Ok(Breakpoint {
                    chrom: chrom.to_string(),
                    pos,
                    strand: strand.to_string(),
                })
            }
            _ => Err(format!("breakpoint '{}' is not chrom:pos:strand", s)),
        }
    }
}

impl fmt::Display for Breakpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.chrom, self.pos, self.strand)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FusionRecord {
    // Zero-based data row index in the input file
    pub row: usize,
    pub fusion_name: String,
    pub splice_type: SpliceType,
    pub junction_read_count: u32,
    pub spanning_frag_count: u32,
    pub left_gene: String,
    pub left_breakpoint: Breakpoint,
    pub right_gene: String,
    pub right_breakpoint: Breakpoint,
    pub support: ReadSupport,
    pub large_anchor_support: String,
    // Columns not interpreted by the filter, in input order
    pub passthrough: Vec<(String, String)>,
}

impl FusionRecord {
    pub fn score(&self) -> u64 {
        JUNCTION_WEIGHT * self.junction_read_count as u64 + self.spanning_frag_count as u64
    }

    pub fn total_support(&self) -> u64 {
        self.junction_read_count as u64 + self.spanning_frag_count as u64
    }

    pub fn is_novel_splice(&self) -> bool {
        self.splice_type == SpliceType::InclNonRefSplice
    }

    pub fn has_long_double_anchor(&self) -> bool {
        self.large_anchor_support.to_ascii_lowercase().contains("yes")
    }

    /// Fold another call's evidence into this one.
    ///
    /// Read-ID sets are unioned, the counts are recomputed from them, and long
    /// double anchor support is kept once either side has it. Every other
    /// field of `self` is left as is.
    pub fn absorb(&mut self, other: &FusionRecord) {
        self.support.absorb(&other.support);
        self.junction_read_count = self.support.junction_reads().len() as u32;
        self.spanning_frag_count = self.support.spanning_frags().len() as u32;
        if !self.has_long_double_anchor() && other.has_long_double_anchor() {
            self.large_anchor_support = other.large_anchor_support.clone();
        }
    }

    pub fn column_value(&self, column: &str) -> Option<Cow<'_, str>> {
        let value = match column {
            FUSION_NAME => Cow::Borrowed(self.fusion_name.as_str()),
            JUNCTION_READ_COUNT => Cow::Owned(self.junction_read_count.to_string()),
            SPANNING_FRAG_COUNT => Cow::Owned(self.spanning_frag_count.to_string()),
            SPLICE_TYPE => Cow::Owned(self.splice_type.to_string()),
            LEFT_GENE => Cow::Borrowed(self.left_gene.as_str()),
            LEFT_BREAKPOINT => Cow::Owned(self.left_breakpoint.to_string()),
            RIGHT_GENE => Cow::Borrowed(self.right_gene.as_str()),
            RIGHT_BREAKPOINT => Cow::Owned(self.right_breakpoint.to_string()),
            JUNCTION_READS => Cow::Owned(self.support.junction_reads_field()),
            SPANNING_FRAGS => Cow::Owned(self.support.spanning_frags_field()),
            LARGE_ANCHOR_SUPPORT => Cow::Borrowed(self.large_anchor_support.as_str()),
            other => {
                return self
                    .passthrough
                    .iter()
                    .find(|(name, _)| name == other)
                    .map(|(_, value)| Cow::Borrowed(value.as_str()))
            }
        };
        Some(value)
    }
}

// Score descending, then input order
pub fn by_score_desc(a: &FusionRecord, b: &FusionRecord) -> Ordering {
    b.score().cmp(&a.score()).then(a.row.cmp(&b.row))
}

// Junction reads descending, spanning fragments descending, then input order
pub fn by_support_desc(a: &FusionRecord, b: &FusionRecord) -> Ordering {
    b.junction_read_count
        .cmp(&a.junction_read_count)
        .then(b.spanning_frag_count.cmp(&a.spanning_frag_count))
        .then(a.row.cmp(&b.row))
}

#[cfg(test)]
pub mod test_support {
    use super::*;

    fn read_ids(prefix: &str, n: u32) -> String {
        if n == 0 {
            ".".to_string()
        } else {
            (0..n).map(|i| format!("{}{}", prefix, i)).collect::<Vec<_>>().join(",")
        }
    }

    /// Build a record whose read-ID lists agree with its counts.
    pub fn fusion(row: usize, name: &str, j: u32, s: u32) -> FusionRecord {
        let tag = format!("{}_{}_", name, row);
        FusionRecord {
            row,
            fusion_name: name.to_string(),
            splice_type: SpliceType::OnlyRefSplice,
            junction_read_count: j,
            spanning_frag_count: s,
            left_gene: "G1^ENSG01".to_string(),
            left_breakpoint: "chr1:100:+".parse().unwrap(),
            right_gene: "G2^ENSG02".to_string(),
            right_breakpoint: "chr1:500:+".parse().unwrap(),
            support: ReadSupport::parse(
                &read_ids(&format!("{}j", tag), j),
                &read_ids(&format!("{}s", tag), s),
            ),
            large_anchor_support: "YES_LDAS".to_string(),
            passthrough: Vec::new(),
        }
    }

    pub fn novel(row: usize, name: &str, j: u32, s: u32, left: u64, right: u64) -> FusionRecord {
        let mut record = fusion(row, name, j, s);
        record.splice_type = SpliceType::InclNonRefSplice;
        record.left_breakpoint.pos = left;
        record.right_breakpoint.pos = right;
        record
    }
}
