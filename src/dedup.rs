use ahash::{AHashMap, AHashSet};

/// Outcome for one input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Header,
    Unique,
    Duplicate,
    BadUmi,
}

/// The known UMI sequences, built once from the whitelist file.
#[derive(Debug)]
pub struct UmiWhitelist(AHashSet<Vec<u8>>);

impl UmiWhitelist {
    /// One UMI per line. Surrounding whitespace is trimmed; empty lines and
    /// repeated entries are ignored.
    pub fn from_lines(text: &str) -> UmiWhitelist {
        let umis = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(|l| l.as_bytes().to_vec())
            .collect();
        UmiWhitelist(umis)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &[u8]> + '_ {
        self.0.iter().map(Vec::as_slice)
    }
}

/// Seen (umi, position) pairs for the reference sequence currently in scope.
///
/// The position sets only ever hold observations from a single reference.
/// Records grouped by reference are a caller precondition; nothing here
/// verifies it.
#[derive(Debug)]
pub struct ChromDedupIndex {
    seen: AHashMap<Vec<u8>, AHashSet<i64>>,
    reference: Option<String>,
}

impl ChromDedupIndex {
    /// One key per whitelisted UMI with an empty position set.
    pub fn new(whitelist: &UmiWhitelist) -> ChromDedupIndex {
        let seen = whitelist
            .iter()
            .map(|umi| (umi.to_vec(), AHashSet::new()))
            .collect();
        ChromDedupIndex { seen, reference: None }
    }

    /// Open a new scope when `reference` differs from the tracked one: every
    /// position set is emptied, the UMI keys survive. No-op otherwise.
    pub fn enter_reference(&mut self, reference: &str) {
        if self.reference.as_deref() != Some(reference) {
            for positions in self.seen.values_mut() {
                positions.clear();
            }
            self.reference = Some(reference.to_owned());
        }
    }

    /// Classify a corrected signed position for `umi`.
    ///
    /// The first sighting of a (umi, position) pair within a scope is
    /// `Unique`, every repeat is `Duplicate`. An unknown UMI is `BadUmi` and
    /// never mutates the index.
    pub fn classify(&mut self, umi: &[u8], pos: i64) -> Classification {
        match self.seen.get_mut(umi) {
            None => Classification::BadUmi,
            Some(positions) => {
                if positions.insert(pos) {
                    Classification::Unique
                } else {
                    Classification::Duplicate
                }
            }
        }
    }
}
