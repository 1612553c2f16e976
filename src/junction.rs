// Modules for handling junction read and spanning fragment evidence
use itertools::Itertools;
use std::collections::HashSet;

// Sentinel used in the read-ID columns when no reads are listed
pub const NO_READS: &str = ".";

/// Read identifiers backing a fusion call.
///
/// Identifiers keep their first-seen order so that serialized lists are
/// stable from run to run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadSupport {
    junction_reads: Vec<String>,
    spanning_frags: Vec<String>,
}

fn parse_read_list(field: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    field
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty() && *id != NO_READS)
        .filter(|id| seen.insert(*id))
        .map(str::to_string)
        .collect()
}

fn format_read_list(reads: &[String]) -> String {
    if reads.is_empty() {
        NO_READS.to_string()
    } else {
        reads.iter().join(",")
    }
}

impl ReadSupport {
    // A read listed as both kinds is kept only as a junction read
    pub fn parse(junction_reads: &str, spanning_frags: &str) -> Self {
        let junction_reads = parse_read_list(junction_reads);
        let junction_seen: HashSet<&str> = junction_reads.iter().map(String::as_str).collect();
        let spanning_frags = parse_read_list(spanning_frags)
            .into_iter()
            .filter(|read| !junction_seen.contains(read.as_str()))
            .collect();
        ReadSupport {
            junction_reads,
            spanning_frags,
        }
    }

    pub fn junction_reads(&self) -> &[String] {
        &self.junction_reads
    }

    pub fn spanning_frags(&self) -> &[String] {
        &self.spanning_frags
    }

    pub fn junction_reads_field(&self) -> String {
        format_read_list(&self.junction_reads)
    }

    pub fn spanning_frags_field(&self) -> String {
        format_read_list(&self.spanning_frags)
    }

    // Union both evidence sets; a read seen as a junction read anywhere is
    // never also counted as a spanning fragment
    pub fn absorb(&mut self, other: &ReadSupport) {
        let mut junction_seen: HashSet<String> = self.junction_reads.iter().cloned().collect();
        for read in &other.junction_reads {
            if junction_seen.insert(read.clone()) {
                self.junction_reads.push(read.clone());
            }
        }

        let mut spanning_seen = HashSet::new();
        let spanning: Vec<String> = self
            .spanning_frags
            .iter()
            .chain(other.spanning_frags.iter())
            .filter(|read| !junction_seen.contains(*read))
            .filter(|read| spanning_seen.insert((*read).clone()))
            .cloned()
            .collect();
        self.spanning_frags = spanning;
    }
}
