use thiserror::Error;

use crate::cigar::{Cigar, CigarError};

/// Reverse strand bit of the SAM flag field.
const FLAG_REVERSE: u16 = 0x10;

/// The UMI occupies a fixed number of bytes at the end of the read name.
const UMI_LEN: usize = 8;

/// One alignment line split into its tab separated fields.
///
/// Only the read name, flag, reference name, position and cigar fields are
/// interpreted; the rest stay opaque. The record borrows the line it was
/// parsed from, and the corrected position never becomes a field.
#[derive(Debug)]
pub struct AlignmentRecord<'a> {
    fields: Vec<&'a str>,
    flag: u16,
    pos: i64,
    cigar: Cigar,
}

impl<'a> AlignmentRecord<'a> {
    pub fn parse(line: &'a str) -> Result<AlignmentRecord<'a>, RecordError> {
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 6 {
            return Err(RecordError::MissingFields(fields.len()));
        }

        let flag: u16 = lexical_core::parse(fields[1].as_bytes())
            .map_err(|_| RecordError::InvalidFlag(fields[1].to_owned()))?;
        let pos: i64 = lexical_core::parse(fields[3].as_bytes())
            .map_err(|_| RecordError::InvalidPosition(fields[3].to_owned()))?;
        let cigar = fields[5].parse()?;

        Ok(AlignmentRecord { fields, flag, pos, cigar })
    }

    pub fn read_name(&self) -> &'a str {
        self.fields[0]
    }

    /// The trailing [`UMI_LEN`] bytes of the read name.
    ///
    /// Fixed-width contract: a shorter or otherwise malformed name passes
    /// through whole and will simply miss the whitelist.
    pub fn umi(&self) -> &'a [u8] {
        let name = self.fields[0].as_bytes();
        &name[name.len().saturating_sub(UMI_LEN)..]
    }

    pub fn reference_name(&self) -> &'a str {
        self.fields[2]
    }

    pub fn is_reverse(&self) -> bool {
        self.flag & FLAG_REVERSE != 0
    }

    /// Raw leftmost position with the strand folded into the sign,
    /// negative for reverse strand alignments.
    pub fn signed_start(&self) -> i64 {
        if self.is_reverse() {
            -self.pos
        } else {
            self.pos
        }
    }

    pub fn cigar(&self) -> &Cigar {
        &self.cigar
    }
}

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("record has {0} fields, expected at least 6")]
    MissingFields(usize),
    #[error("invalid flag field: {0}")]
    InvalidFlag(String),
    #[error("invalid position field: {0}")]
    InvalidPosition(String),
    #[error("invalid cigar field")]
    Cigar(#[from] CigarError),
}

#[cfg(test)]
mod test {
    use super::*;

    const LINE: &str = "NS500451:154:HWKTMBGXX:1:11101:24138:1027:TCGAGCCT\t0\t2\t76814284\t36\t71M\t*\t0\t0\tGTTCA\tFFFFF\tMD:Z:71\tNH:i:1";

    #[test]
    fn parse_interpreted_fields() {
        let r = AlignmentRecord::parse(LINE).unwrap();
        assert_eq!(r.read_name(), "NS500451:154:HWKTMBGXX:1:11101:24138:1027:TCGAGCCT");
        assert_eq!(r.umi(), b"TCGAGCCT");
        assert_eq!(r.reference_name(), "2");
        assert!(!r.is_reverse());
        assert_eq!(r.signed_start(), 76814284);
    }

    #[test]
    fn reverse_flag_negates_start() {
        let line = LINE.replacen("\t0\t", "\t16\t", 1);
        let r = AlignmentRecord::parse(&line).unwrap();
        assert!(r.is_reverse());
        assert_eq!(r.signed_start(), -76814284);
    }

    #[test]
    fn short_read_name_passes_through_whole() {
        let r = AlignmentRecord::parse("ACGT\t0\t1\t100\t36\t4M\t*\t0\t0\tACGT\tFFFF").unwrap();
        assert_eq!(r.umi(), b"ACGT");
    }

    #[test]
    fn malformed_fields_are_fatal() {
        assert!(matches!(
            AlignmentRecord::parse("name\t0\t1"),
            Err(RecordError::MissingFields(3))
        ));
        assert!(matches!(
            AlignmentRecord::parse("name\tx\t1\t100\t36\t4M"),
            Err(RecordError::InvalidFlag(_))
        ));
        assert!(matches!(
            AlignmentRecord::parse("name\t0\t1\t1e5\t36\t4M"),
            Err(RecordError::InvalidPosition(_))
        ));
        assert!(matches!(
            AlignmentRecord::parse("name\t0\t1\t100\t36\t*"),
            Err(RecordError::Cigar(_))
        ));
    }
}
