use std::fmt;

use crate::dedup::Classification;

/// Duplication metrics.
#[derive(Debug, Default)]
pub struct Metrics {
    header_lines: usize,
    reads_examined: usize,
    unique_reads: usize,
    duplicate_reads: usize,
    unknown_umi_reads: usize,
}

impl fmt::Display for Metrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "HEADER_LINES\tREADS_EXAMINED\tUNIQUE_READS\tDUPLICATE_READS\tUNKNOWN_UMI_READS\tPERCENT_DUPLICATION"
        )?;
        writeln!(
            f,
            "{}\t{}\t{}\t{}\t{}\t{}",
            self.header_lines,
            self.reads_examined,
            self.unique_reads,
            self.duplicate_reads,
            self.unknown_umi_reads,
            self.percent_duplication()
        )
    }
}

impl Metrics {
    pub fn count(&mut self, classification: Classification) {
        match classification {
            Classification::Header => self.header_lines += 1,
            Classification::Unique => {
                self.reads_examined += 1;
                self.unique_reads += 1;
            }
            Classification::Duplicate => {
                self.reads_examined += 1;
                self.duplicate_reads += 1;
            }
            Classification::BadUmi => {
                self.reads_examined += 1;
                self.unknown_umi_reads += 1;
            }
        }
    }

    /// Fraction of whitelisted reads flagged as duplicate.
    pub fn percent_duplication(&self) -> f32 {
        let classified = self.unique_reads + self.duplicate_reads;
        if classified == 0 {
            0.0
        } else {
            self.duplicate_reads as f32 / classified as f32
        }
    }

    pub fn reads_examined(&self) -> usize {
        self.reads_examined
    }

    pub fn duplicate_reads(&self) -> usize {
        self.duplicate_reads
    }
}
