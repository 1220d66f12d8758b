//! Line diffing and similarity scoring for rendered pages
//!
//! This module provides:
//! - A Myers shortest-edit-script diff over line sequences
//! - A matching-blocks similarity ratio over the same sequences
//!
//! Both operate on already-normalized lines; see [`crate::normalize`].

use std::collections::HashMap;
use std::fmt;

/// How a diff line relates the reference page to the local page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffTag {
    /// Present only in the reference page. This is the content-loss signal.
    Removed,
    /// Present only in the local page.
    Added,
    /// Present in both pages.
    Unchanged,
}

/// One line of a computed page diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffLine {
    /// Relation of this line to the two pages.
    pub tag: DiffTag,
    /// Line content, without the marker prefix.
    pub text: String,
}

impl DiffLine {
    /// A line that exists only in the reference page.
    pub fn removed(text: impl Into<String>) -> Self {
        Self {
            tag: DiffTag::Removed,
            text: text.into(),
        }
    }

    /// A line that exists only in the local page.
    pub fn added(text: impl Into<String>) -> Self {
        Self {
            tag: DiffTag::Added,
            text: text.into(),
        }
    }

    /// A line common to both pages.
    pub fn unchanged(text: impl Into<String>) -> Self {
        Self {
            tag: DiffTag::Unchanged,
            text: text.into(),
        }
    }

    #[must_use]
    pub fn is_removed(&self) -> bool {
        self.tag == DiffTag::Removed
    }

    #[must_use]
    pub fn is_added(&self) -> bool {
        self.tag == DiffTag::Added
    }
}

impl fmt::Display for DiffLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = match self.tag {
            DiffTag::Removed => '-',
            DiffTag::Added => '+',
            DiffTag::Unchanged => ' ',
        };
        write!(f, "{marker} {}", self.text)
    }
}

/// Compute a line diff between the reference page and the local page.
///
/// `reference` is the first operand: lines present only there come out
/// tagged [`DiffTag::Removed`]. Output is in document order; within one
/// changed region, removed lines precede added lines.
#[must_use]
pub fn diff_lines(reference: &[String], local: &[String]) -> Vec<DiffLine> {
    if reference.is_empty() && local.is_empty() {
        return Vec::new();
    }
    let trace = edit_trace(reference, local);
    collect_edits(&trace, reference, local)
}

/// Forward pass of the Myers algorithm.
///
/// Returns one snapshot of the furthest-reaching x per diagonal for every
/// edit round, taken before the round runs. The backward pass in
/// [`collect_edits`] replays these snapshots from the corner back to the
/// origin.
fn edit_trace(a: &[String], b: &[String]) -> Vec<Vec<usize>> {
    let n = a.len();
    let m = b.len();
    let bound = (n + m) as isize;
    let index = |k: isize| (k + bound) as usize;

    let mut reach = vec![0usize; 2 * (n + m) + 1];
    let mut trace = Vec::new();

    for d in 0..=bound {
        trace.push(reach.clone());
        let mut k = -d;
        while k <= d {
            let mut x = if k == -d || (k != d && reach[index(k - 1)] < reach[index(k + 1)]) {
                reach[index(k + 1)]
            } else {
                reach[index(k - 1)] + 1
            };
            let mut y = (x as isize - k) as usize;
            while x < n && y < m && a[x] == b[y] {
                x += 1;
                y += 1;
            }
            reach[index(k)] = x;
            if x >= n && y >= m {
                return trace;
            }
            k += 2;
        }
    }
    trace
}

/// Backward pass: walk the recorded trace from (n, m) to (0, 0) and emit
/// the edit script in forward order.
fn collect_edits(trace: &[Vec<usize>], a: &[String], b: &[String]) -> Vec<DiffLine> {
    let bound = (a.len() + b.len()) as isize;
    let index = |k: isize| (k + bound) as usize;

    let mut x = a.len() as isize;
    let mut y = b.len() as isize;
    let mut edits = Vec::new();

    for (round, reach) in trace.iter().enumerate().rev() {
        let d = round as isize;
        let k = x - y;
        let prev_k = if k == -d || (k != d && reach[index(k - 1)] < reach[index(k + 1)]) {
            k + 1
        } else {
            k - 1
        };
        let prev_x = reach[index(prev_k)] as isize;
        let prev_y = prev_x - prev_k;

        while x > prev_x && y > prev_y {
            edits.push(DiffLine::unchanged(a[(x - 1) as usize].clone()));
            x -= 1;
            y -= 1;
        }
        if d > 0 {
            if x == prev_x {
                edits.push(DiffLine::added(b[prev_y as usize].clone()));
            } else {
                edits.push(DiffLine::removed(a[prev_x as usize].clone()));
            }
            x = prev_x;
            y = prev_y;
        }
    }

    edits.reverse();
    edits
}

/// Similarity of two line sequences, in `0.0..=1.0`.
///
/// Twice the total length of the recursively matched common blocks,
/// divided by the combined sequence length. Identical sequences score
/// exactly 1.0, as do two empty sequences. No junk or popularity
/// heuristics are applied, so long pages with many repeated lines still
/// compare exactly.
#[must_use]
pub fn similarity_ratio(a: &[String], b: &[String]) -> f64 {
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matched_lines(a, b) as f64 / total as f64
}

/// Total number of lines covered by common blocks.
///
/// Repeatedly finds the longest common contiguous block, then recurses
/// into the regions to its left and right.
fn matched_lines(a: &[String], b: &[String]) -> usize {
    let mut total = 0;
    let mut pending = vec![(0, a.len(), 0, b.len())];

    while let Some((alo, ahi, blo, bhi)) = pending.pop() {
        let (i, j, size) = longest_match(a, b, alo, ahi, blo, bhi);
        if size == 0 {
            continue;
        }
        total += size;
        pending.push((alo, i, blo, j));
        pending.push((i + size, ahi, j + size, bhi));
    }
    total
}

/// Longest contiguous block common to `a[alo..ahi]` and `b[blo..bhi]`.
///
/// Returns (start in a, start in b, length); ties resolve to the earliest
/// start in `a`, then the earliest start in `b`.
fn longest_match(
    a: &[String],
    b: &[String],
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let mut best = (alo, blo, 0usize);
    // run_lengths[j] is the length of the common run ending at (i, j)
    let mut run_lengths: HashMap<usize, usize> = HashMap::new();

    for i in alo..ahi {
        let mut next_runs = HashMap::new();
        for j in blo..bhi {
            if a[i] == b[j] {
                let run = j
                    .checked_sub(1)
                    .and_then(|prev| run_lengths.get(&prev))
                    .copied()
                    .unwrap_or(0)
                    + 1;
                next_runs.insert(j, run);
                if run > best.2 {
                    best = (i + 1 - run, j + 1 - run, run);
                }
            }
        }
        run_lengths = next_runs;
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_identical_sequences() {
        let a = lines(&["one", "two", "three"]);
        let diff = diff_lines(&a, &a);
        assert_eq!(diff.len(), 3);
        assert!(diff.iter().all(|l| l.tag == DiffTag::Unchanged));
    }

    #[test]
    fn test_both_empty() {
        assert!(diff_lines(&[], &[]).is_empty());
    }

    #[test]
    fn test_all_removed_when_local_empty() {
        let reference = lines(&["a", "b"]);
        let diff = diff_lines(&reference, &[]);
        assert_eq!(
            diff,
            vec![DiffLine::removed("a"), DiffLine::removed("b")]
        );
    }

    #[test]
    fn test_all_added_when_reference_empty() {
        let local = lines(&["a", "b"]);
        let diff = diff_lines(&[], &local);
        assert_eq!(diff, vec![DiffLine::added("a"), DiffLine::added("b")]);
    }

    #[test]
    fn test_single_replacement_orders_removed_first() {
        let reference = lines(&["keep", "old", "tail"]);
        let local = lines(&["keep", "new", "tail"]);
        let diff = diff_lines(&reference, &local);
        assert_eq!(
            diff,
            vec![
                DiffLine::unchanged("keep"),
                DiffLine::removed("old"),
                DiffLine::added("new"),
                DiffLine::unchanged("tail"),
            ]
        );
    }

    #[test]
    fn test_insertion_in_middle() {
        let reference = lines(&["a", "c"]);
        let local = lines(&["a", "b", "c"]);
        let diff = diff_lines(&reference, &local);
        assert_eq!(
            diff,
            vec![
                DiffLine::unchanged("a"),
                DiffLine::added("b"),
                DiffLine::unchanged("c"),
            ]
        );
    }

    #[test]
    fn test_deletion_in_middle() {
        let reference = lines(&["a", "b", "c"]);
        let local = lines(&["a", "c"]);
        let diff = diff_lines(&reference, &local);
        assert_eq!(
            diff,
            vec![
                DiffLine::unchanged("a"),
                DiffLine::removed("b"),
                DiffLine::unchanged("c"),
            ]
        );
    }

    #[test]
    fn test_reordering_yields_one_pair() {
        let reference = lines(&["a", "b", "c"]);
        let local = lines(&["b", "a", "c"]);
        let diff = diff_lines(&reference, &local);
        let removed: Vec<_> = diff.iter().filter(|l| l.is_removed()).collect();
        let added: Vec<_> = diff.iter().filter(|l| l.is_added()).collect();
        assert_eq!(removed.len(), 1);
        assert_eq!(added.len(), 1);
        assert_eq!(removed[0].text, added[0].text);
    }

    #[test]
    fn test_diff_reconstructs_both_sides() {
        let reference = lines(&["x", "shared", "y", "tail", "z"]);
        let local = lines(&["shared", "mid", "tail"]);
        let diff = diff_lines(&reference, &local);

        let rebuilt_reference: Vec<_> = diff
            .iter()
            .filter(|l| l.tag != DiffTag::Added)
            .map(|l| l.text.clone())
            .collect();
        let rebuilt_local: Vec<_> = diff
            .iter()
            .filter(|l| l.tag != DiffTag::Removed)
            .map(|l| l.text.clone())
            .collect();
        assert_eq!(rebuilt_reference, reference);
        assert_eq!(rebuilt_local, local);
    }

    #[test]
    fn test_display_markers() {
        assert_eq!(DiffLine::removed("gone").to_string(), "- gone");
        assert_eq!(DiffLine::added("new").to_string(), "+ new");
        assert_eq!(DiffLine::unchanged("same").to_string(), "  same");
    }

    #[test]
    fn test_ratio_identical_is_one() {
        let a = lines(&["x", "y", "z"]);
        assert!((similarity_ratio(&a, &a) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_ratio_identical_with_repeats_is_one() {
        let a: Vec<String> = std::iter::repeat("line".to_string()).take(300).collect();
        assert!((similarity_ratio(&a, &a) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_ratio_empty_sequences() {
        assert!((similarity_ratio(&[], &[]) - 1.0).abs() < f64::EPSILON);
        assert!(similarity_ratio(&lines(&["a"]), &[]).abs() < f64::EPSILON);
    }

    #[test]
    fn test_ratio_half_overlap() {
        let a = lines(&["a", "b"]);
        let b = lines(&["a", "c"]);
        // one matched line out of four total
        assert!((similarity_ratio(&a, &b) - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_longest_match_prefers_earliest() {
        let a = lines(&["m", "x", "m"]);
        let b = lines(&["m"]);
        let (i, j, size) = longest_match(&a, &b, 0, a.len(), 0, b.len());
        assert_eq!((i, j, size), (0, 0, 1));
    }
}
