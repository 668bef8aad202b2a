use std::str::FromStr;

use smallvec::SmallVec;
use thiserror::Error;

/// A CIGAR alignment operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CigarOp {
    Match,
    SoftClip,
    Deletion,
    Insertion,
    Skip,
}

impl CigarOp {
    fn from_byte(b: u8) -> Option<CigarOp> {
        match b {
            b'M' => Some(CigarOp::Match),
            b'S' => Some(CigarOp::SoftClip),
            b'D' => Some(CigarOp::Deletion),
            b'I' => Some(CigarOp::Insertion),
            b'N' => Some(CigarOp::Skip),
            _ => None,
        }
    }

    /// True for the operations that shift the recorded leftmost coordinate
    /// away from the fragment start (deletion, insertion, intron skip).
    fn is_indel(self) -> bool {
        matches!(self, CigarOp::Deletion | CigarOp::Insertion | CigarOp::Skip)
    }
}

/// One length-prefixed operation from a CIGAR string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CigarToken {
    pub len: u32,
    pub op: CigarOp,
}

/// A CIGAR string parsed into its ordered token sequence.
///
/// Most single-end alignments stay well under eight tokens, so the tokens
/// live inline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cigar(SmallVec<[CigarToken; 8]>);

impl FromStr for Cigar {
    type Err = CigarError;

    fn from_str(s: &str) -> Result<Cigar, CigarError> {
        if s.is_empty() {
            return Err(CigarError::Empty);
        }

        let mut tokens = SmallVec::new();
        let mut len: u32 = 0;
        let mut have_len = false;

        for &b in s.as_bytes() {
            if b.is_ascii_digit() {
                len = len
                    .checked_mul(10)
                    .and_then(|l| l.checked_add(u32::from(b - b'0')))
                    .ok_or_else(|| CigarError::LengthOverflow(s.to_owned()))?;
                have_len = true;
            } else {
                let op = CigarOp::from_byte(b).ok_or(CigarError::UnknownOp(b as char))?;
                if !have_len {
                    return Err(CigarError::MissingLength(s.to_owned()));
                }
                tokens.push(CigarToken { len, op });
                len = 0;
                have_len = false;
            }
        }

        if have_len {
            return Err(CigarError::TrailingLength(s.to_owned()));
        }

        Ok(Cigar(tokens))
    }
}

impl Cigar {
    /// Correct a raw leftmost position for soft clipping and for indels or
    /// intron skips. The sign of `pos` selects the strand (negative means
    /// reverse) and is carried through unchanged.
    ///
    /// Call once per record; the correction is not idempotent.
    pub fn adjust(&self, pos: i64) -> Result<i64, CigarError> {
        let forward = pos > 0;
        let tokens = &self.0;
        let mut shift = 0i64;

        if tokens.iter().any(|t| t.op.is_indel()) {
            let anchor = self.anchor().ok_or(CigarError::MissingAnchor)?;
            // An anchor at token index 0 or 1 means the longest aligned
            // stretch already leads the alignment: no indel correction then,
            // on either strand.
            if anchor > 1 {
                let moved = if forward {
                    &tokens[..anchor]
                } else {
                    // The anchor's distance from the end selects how many
                    // trailing tokens sit between it and the fragment start.
                    &tokens[anchor..]
                };
                shift += moved
                    .iter()
                    .filter(|t| t.op != CigarOp::SoftClip)
                    .map(|t| i64::from(t.len))
                    .sum::<i64>();
            }
        }

        // 5' soft clip: leading on the forward strand, trailing on the
        // reverse strand. Applies whether or not an indel correction ran.
        let clip = if forward { tokens.first() } else { tokens.last() };
        if let Some(&CigarToken { len, op: CigarOp::SoftClip }) = clip {
            shift += i64::from(len);
        }

        Ok(pos + shift)
    }

    /// Index of the longest aligned (M) token, earliest wins on ties.
    fn anchor(&self) -> Option<usize> {
        let mut best: Option<(usize, u32)> = None;
        for (i, t) in self.0.iter().enumerate() {
            if t.op == CigarOp::Match && best.map_or(true, |(_, len)| t.len > len) {
                best = Some((i, t.len));
            }
        }
        best.map(|(i, _)| i)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CigarError {
    #[error("empty cigar string")]
    Empty,
    #[error("unknown cigar operation: {0}")]
    UnknownOp(char),
    #[error("cigar operation without a length: {0}")]
    MissingLength(String),
    #[error("cigar ends in a length without an operation: {0}")]
    TrailingLength(String),
    #[error("cigar length overflows: {0}")]
    LengthOverflow(String),
    #[error("cigar has indels but no aligned segment")]
    MissingAnchor,
}

#[cfg(test)]
mod test {
    use super::*;

    fn cigar(s: &str) -> Cigar {
        s.parse().unwrap()
    }

    #[test]
    fn parse_tokens() {
        let c = cigar("10S65M");
        assert_eq!(
            c.0.as_slice(),
            &[
                CigarToken { len: 10, op: CigarOp::SoftClip },
                CigarToken { len: 65, op: CigarOp::Match },
            ]
        );
    }

    #[test]
    fn parse_rejects_malformed() {
        assert_eq!("".parse::<Cigar>(), Err(CigarError::Empty));
        assert_eq!("*".parse::<Cigar>(), Err(CigarError::UnknownOp('*')));
        assert_eq!("75H".parse::<Cigar>(), Err(CigarError::UnknownOp('H')));
        assert_eq!(
            "M".parse::<Cigar>(),
            Err(CigarError::MissingLength("M".to_owned()))
        );
        assert_eq!(
            "10S65".parse::<Cigar>(),
            Err(CigarError::TrailingLength("10S65".to_owned()))
        );
    }

    #[test]
    fn plain_match_is_unchanged() {
        assert_eq!(cigar("75M").adjust(100), Ok(100));
        assert_eq!(cigar("75M").adjust(-100), Ok(-100));
    }

    #[test]
    fn forward_leading_soft_clip() {
        assert_eq!(cigar("10S65M").adjust(100), Ok(110));
        // trailing clip is the 3' end on the forward strand
        assert_eq!(cigar("65M10S").adjust(100), Ok(100));
    }

    #[test]
    fn reverse_trailing_soft_clip() {
        assert_eq!(cigar("65M10S").adjust(-100), Ok(-90));
        assert_eq!(cigar("10S65M").adjust(-100), Ok(-100));
    }

    #[test]
    fn forward_indel_shifts_to_anchor() {
        // anchor is the second M (45 > 30), everything before it moves
        assert_eq!(cigar("30M5D45M").adjust(100), Ok(135));
    }

    #[test]
    fn forward_indel_skips_soft_clip_but_counts_clip_rule() {
        // 10S moves via the clip rule, 20M5D via the indel rule
        assert_eq!(cigar("10S20M5D45M").adjust(100), Ok(135));
    }

    #[test]
    fn anchor_at_front_skips_indel_adjustment() {
        // anchor at index 0 on the reverse strand: boundary rule, untouched
        assert_eq!(cigar("40M5N35M").adjust(-100), Ok(-100));
        // same boundary on the forward strand, tie resolved to the earliest M
        assert_eq!(cigar("40M5D40M").adjust(100), Ok(100));
        // anchor at index 1 behind a soft clip still skips, clip rule applies
        assert_eq!(cigar("5S40M5D30M").adjust(100), Ok(105));
    }

    #[test]
    fn reverse_indel_sums_trailing_tokens() {
        // anchor at index 2: the trailing 40M span moves the start
        assert_eq!(cigar("5M10D40M").adjust(-100), Ok(-60));
        // trailing soft clip is excluded from the indel sum but adds itself
        assert_eq!(cigar("5M10D40M3S").adjust(-100), Ok(-57));
    }

    #[test]
    fn indels_without_matches_fail() {
        assert_eq!(cigar("5I10D").adjust(100), Err(CigarError::MissingAnchor));
    }
}
