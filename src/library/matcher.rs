//! Ratcliff/Obershelp sequence matching over characters.
//!
//! The ratio is `2*M / T`, where `T` is the total length of both strings
//! and `M` is the number of characters in the matching blocks found by
//! taking the longest common block and recursing on both sides of it.
//! Unlike an LCS ratio this depends on argument order.

use std::collections::HashMap;

/// Sequences at least this long have their popular characters dropped
/// from the index.
const AUTOJUNK_MIN_LEN: usize = 200;

/// Matcher with a fixed second sequence, compared against many firsts
#[derive(Debug, Clone)]
pub struct SequenceMatcher {
    b: Vec<char>,
    /// Positions of each indexed character in `b`, ascending
    b2j: HashMap<char, Vec<usize>>,
}

impl SequenceMatcher {
    pub fn new(b: &str) -> Self {
        let b: Vec<char> = b.chars().collect();

        let mut b2j: HashMap<char, Vec<usize>> = HashMap::new();
        for (j, ch) in b.iter().enumerate() {
            b2j.entry(*ch).or_default().push(j);
        }

        if b.len() >= AUTOJUNK_MIN_LEN {
            let max_occurrences = b.len() / 100 + 1;
            b2j.retain(|_, positions| positions.len() <= max_occurrences);
        }

        Self { b, b2j }
    }

    /// Similarity of `a` to the matcher's sequence, in `[0, 1]`.
    ///
    /// Two empty sequences are identical (1.0).
    pub fn ratio(&self, a: &str) -> f64 {
        let a: Vec<char> = a.chars().collect();
        let total = a.len() + self.b.len();
        if total == 0 {
            return 1.0;
        }
        2.0 * self.matching_characters(&a) as f64 / total as f64
    }

    /// Total size of all matching blocks between `a` and `b`
    fn matching_characters(&self, a: &[char]) -> usize {
        let mut matched = 0;
        let mut pending = vec![(0, a.len(), 0, self.b.len())];

        while let Some((alo, ahi, blo, bhi)) = pending.pop() {
            let (i, j, size) = self.find_longest_match(a, alo, ahi, blo, bhi);
            if size == 0 {
                continue;
            }
            matched += size;
            if alo < i && blo < j {
                pending.push((alo, i, blo, j));
            }
            if i + size < ahi && j + size < bhi {
                pending.push((i + size, ahi, j + size, bhi));
            }
        }

        matched
    }

    /// Longest block `a[i..i+size] == b[j..j+size]` inside the given
    /// ranges. Ties go to the earliest `i`, then the earliest `j`.
    fn find_longest_match(
        &self,
        a: &[char],
        alo: usize,
        ahi: usize,
        blo: usize,
        bhi: usize,
    ) -> (usize, usize, usize) {
        let (mut best_i, mut best_j, mut best_size) = (alo, blo, 0);

        // Length of the block ending at (i - 1, j), keyed by j
        let mut j2len: HashMap<usize, usize> = HashMap::new();
        for i in alo..ahi {
            let mut next_j2len = HashMap::new();
            if let Some(positions) = self.b2j.get(&a[i]) {
                for &j in positions {
                    if j < blo {
                        continue;
                    }
                    if j >= bhi {
                        break;
                    }
                    let k = j
                        .checked_sub(1)
                        .and_then(|prev| j2len.get(&prev))
                        .copied()
                        .unwrap_or(0)
                        + 1;
                    next_j2len.insert(j, k);
                    if k > best_size {
                        best_i = i + 1 - k;
                        best_j = j + 1 - k;
                        best_size = k;
                    }
                }
            }
            j2len = next_j2len;
        }

        // Grow over characters left out of the index
        while best_i > alo && best_j > blo && a[best_i - 1] == self.b[best_j - 1] {
            best_i -= 1;
            best_j -= 1;
            best_size += 1;
        }
        while best_i + best_size < ahi
            && best_j + best_size < bhi
            && a[best_i + best_size] == self.b[best_j + best_size]
        {
            best_size += 1;
        }

        (best_i, best_j, best_size)
    }
}

/// Up to `n` of `possibilities` whose ratio against `word` is at least
/// `cutoff`, best first. Equal ratios are ordered by string, descending.
pub fn close_matches<'a>(
    word: &str,
    possibilities: impl IntoIterator<Item = &'a str>,
    n: usize,
    cutoff: f64,
) -> Vec<&'a str> {
    let matcher = SequenceMatcher::new(word);

    let mut scored: Vec<(f64, &str)> = possibilities
        .into_iter()
        .map(|candidate| (matcher.ratio(candidate), candidate))
        .filter(|(ratio, _)| *ratio >= cutoff)
        .collect();

    scored.sort_by(|x, y| y.0.total_cmp(&x.0).then_with(|| y.1.cmp(x.1)));
    scored.truncate(n);

    scored.into_iter().map(|(_, candidate)| candidate).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratio_bounds() {
        assert_eq!(SequenceMatcher::new("abc").ratio("abc"), 1.0);
        assert_eq!(SequenceMatcher::new("xyz").ratio("abc"), 0.0);
        assert_eq!(SequenceMatcher::new("").ratio(""), 1.0);
        assert_eq!(SequenceMatcher::new("abc").ratio(""), 0.0);
    }

    #[test]
    fn test_ratio_depends_on_argument_order() {
        // One matching character one way, two the other
        assert_eq!(SequenceMatcher::new("diet").ratio("tide"), 0.25);
        assert_eq!(SequenceMatcher::new("tide").ratio("diet"), 0.5);
    }

    #[test]
    fn test_ratio_recurses_around_longest_block() {
        // "bcd", then nothing is left on either side to pair "a" with
        assert_eq!(SequenceMatcher::new("bcda").ratio("abcd"), 0.75);
        // "emento " first, then "00" to its right
        let ratio = SequenceMatcher::new("myemento 00e").ratio("Memento 2000");
        assert!((ratio - 2.0 * 9.0 / 24.0).abs() < 1e-12);
    }

    #[test]
    fn test_long_sequences_drop_popular_characters() {
        let word = "a".repeat(AUTOJUNK_MIN_LEN);
        let matcher = SequenceMatcher::new(&word);

        assert!(matcher.b2j.is_empty());
        assert_eq!(matcher.ratio("b"), 0.0);
    }

    #[test]
    fn test_close_matches_orders_ties_by_descending_string() {
        assert_eq!(
            close_matches("abc", ["abd", "abe", "abf"], 3, 0.4),
            vec!["abf", "abe", "abd"]
        );
    }

    #[test]
    fn test_close_matches_cutoff_is_inclusive() {
        // 2*1 / 5 == 0.4 is kept, 2*1 / 6 is not
        assert_eq!(close_matches("ax", ["abc", "abcd"], 3, 0.4), vec!["abc"]);
    }

    #[test]
    fn test_close_matches_caps_results() {
        assert_eq!(close_matches("aaa", ["aaa", "aab", "aba", "baa"], 2, 0.0).len(), 2);
        assert!(close_matches("aaa", ["aab"], 0, 0.0).is_empty());
    }
}
