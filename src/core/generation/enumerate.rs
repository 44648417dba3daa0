//! Exhaustive triad enumeration over a base code set

use crate::domain::{PhysiologyCode, Triad};

/// Number of 3-element combinations of `n` distinct codes
pub fn combination_count(n: usize) -> u64 {
    if n < 3 {
        return 0;
    }
    let n = n as u64;
    n * (n - 1) * (n - 2) / 6
}

/// Yields every `i < j < k` combination of the base set in lexicographic order
///
/// The base set is sorted and de-duplicated on construction.
#[derive(Debug, Clone)]
pub struct TriadEnumerator {
    codes: Vec<PhysiologyCode>,
    cursor: [usize; 3],
    exhausted: bool,
}

impl TriadEnumerator {
    /// Creates an enumerator over the given base codes
    pub fn new(codes: impl IntoIterator<Item = PhysiologyCode>) -> Self {
        let mut codes: Vec<PhysiologyCode> = codes.into_iter().collect();
        codes.sort_unstable();
        codes.dedup();

        let exhausted = codes.len() < 3;
        Self {
            codes,
            cursor: [0, 1, 2],
            exhausted,
        }
    }

    /// The normalized base set
    pub fn base_codes(&self) -> &[PhysiologyCode] {
        &self.codes
    }

    /// Work items this enumerator will produce once capped by `limit`
    pub fn total(&self, limit: Option<usize>) -> u64 {
        let all = combination_count(self.codes.len());
        match limit {
            Some(limit) => all.min(limit as u64),
            None => all,
        }
    }
}

impl Iterator for TriadEnumerator {
    type Item = Triad;

    fn next(&mut self) -> Option<Triad> {
        if self.exhausted {
            return None;
        }

        let n = self.codes.len();
        let [i, j, k] = self.cursor;
        let triad = Triad::new([self.codes[i], self.codes[j], self.codes[k]]);

        if k + 1 < n {
            self.cursor[2] = k + 1;
        } else if j + 2 < n {
            self.cursor = [i, j + 1, j + 2];
        } else if i + 3 < n {
            self.cursor = [i + 1, i + 2, i + 3];
        } else {
            self.exhausted = true;
        }

        Some(triad)
    }
}
