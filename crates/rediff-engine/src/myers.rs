//! Shortest edit script search.
//!
//! Myers' O(N·D) algorithm: the middle snake is found by running the forward
//! and reverse searches over the edit graph simultaneously, then both halves
//! are diffed recursively. Common prefixes and suffixes are stripped first
//! and a few shapes (empty side, containment, single atom) are answered
//! directly.

use rediff_types::OpKind;
use tracing::trace;

use crate::atom::{common_prefix_len, common_suffix_len, find_from, Atom, Chunk};
use crate::cleanup::merge;
use crate::error::{EngineError, EngineResult};

/// Step allowance shared by every recursive call of one diff.
#[derive(Debug, Clone)]
pub(crate) struct Budget {
    limit: Option<usize>,
    spent: usize,
    exhausted: bool,
}

impl Budget {
    pub fn new(limit: Option<usize>) -> Self {
        Self {
            limit,
            spent: 0,
            exhausted: false,
        }
    }

    #[cfg(test)]
    pub fn unlimited() -> Self {
        Self::new(None)
    }

    pub fn is_limited(&self) -> bool {
        self.limit.is_some()
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Charge `steps` diagonal steps against the budget.
    pub fn spend(&mut self, steps: usize) -> EngineResult<()> {
        let Some(limit) = self.limit else {
            return Ok(());
        };
        self.spent = self.spent.saturating_add(steps);
        if self.exhausted || self.spent > limit {
            self.exhausted = true;
            return Err(EngineError::BudgetExceeded { budget: limit });
        }
        Ok(())
    }
}

/// Compute a merged edit script turning `old` into `new`.
pub(crate) fn diff_atoms<T: Atom>(old: &[T], new: &[T], budget: &mut Budget) -> Vec<Chunk<T>> {
    if old == new {
        return if old.is_empty() {
            Vec::new()
        } else {
            vec![Chunk::equal(old)]
        };
    }

    let prefix = common_prefix_len(old, new);
    let suffix = common_suffix_len(&old[prefix..], &new[prefix..]);
    let old_mid = &old[prefix..old.len() - suffix];
    let new_mid = &new[prefix..new.len() - suffix];

    let mut chunks = Vec::new();
    if prefix > 0 {
        chunks.push(Chunk::equal(&old[..prefix]));
    }
    chunks.extend(compute(old_mid, new_mid, budget));
    if suffix > 0 {
        chunks.push(Chunk::equal(&old[old.len() - suffix..]));
    }

    merge(&mut chunks);
    chunks
}

/// Diff two sequences that share no common prefix or suffix.
fn compute<T: Atom>(old: &[T], new: &[T], budget: &mut Budget) -> Vec<Chunk<T>> {
    if old.is_empty() {
        return vec![Chunk::insert(new)];
    }
    if new.is_empty() {
        return vec![Chunk::delete(old)];
    }

    let old_is_longer = old.len() > new.len();
    let (long, short) = if old_is_longer { (old, new) } else { (new, old) };

    if let Some(at) = find_from(long, short, 0) {
        // The shorter sequence sits inside the longer one.
        let kind = if old_is_longer {
            OpKind::Delete
        } else {
            OpKind::Insert
        };
        return vec![
            Chunk::new(kind, long[..at].to_vec()),
            Chunk::equal(short),
            Chunk::new(kind, long[at + short.len()..].to_vec()),
        ];
    }

    if short.len() == 1 {
        // A single atom that is not contained cannot be matched.
        return vec![Chunk::delete(old), Chunk::insert(new)];
    }

    if budget.is_limited() {
        if let Some(hm) = half_match(old, new) {
            let mut chunks = diff_atoms(&old[..hm.old_start], &new[..hm.new_start], budget);
            chunks.push(Chunk::equal(&old[hm.old_start..hm.old_end]));
            chunks.extend(diff_atoms(&old[hm.old_end..], &new[hm.new_end..], budget));
            return chunks;
        }
    }

    bisect(old, new, budget)
}

/// Find the middle snake of the edit graph and split the problem there.
fn bisect<T: Atom>(old: &[T], new: &[T], budget: &mut Budget) -> Vec<Chunk<T>> {
    let n = old.len() as isize;
    let m = new.len() as isize;
    let max_d = (n + m + 1) / 2;
    let v_offset = max_d;
    let v_len = 2 * max_d;
    let mut v1 = vec![-1isize; v_len as usize];
    let mut v2 = vec![-1isize; v_len as usize];
    v1[(v_offset + 1) as usize] = 0;
    v2[(v_offset + 1) as usize] = 0;

    let delta = n - m;
    // With an odd delta the forward path overlaps the reverse one first.
    let front = delta % 2 != 0;

    // Trims for diagonals that ran off the edge of the graph.
    let mut k1_start = 0;
    let mut k1_end = 0;
    let mut k2_start = 0;
    let mut k2_end = 0;

    for d in 0..max_d {
        if let Err(err) = budget.spend(2 * d as usize + 1) {
            trace!(error = %err, old_len = old.len(), new_len = new.len(), "falling back to coarse diff");
            break;
        }

        let mut k1 = -d + k1_start;
        while k1 <= d - k1_end {
            let k1_offset = (v_offset + k1) as usize;
            let mut x1 = if k1 == -d || (k1 != d && v1[k1_offset - 1] < v1[k1_offset + 1]) {
                v1[k1_offset + 1]
            } else {
                v1[k1_offset - 1] + 1
            };
            let mut y1 = x1 - k1;
            while x1 < n && y1 < m && old[x1 as usize] == new[y1 as usize] {
                x1 += 1;
                y1 += 1;
            }
            v1[k1_offset] = x1;
            if x1 > n {
                k1_end += 2;
            } else if y1 > m {
                k1_start += 2;
            } else if front {
                let k2_offset = v_offset + delta - k1;
                if (0..v_len).contains(&k2_offset) && v2[k2_offset as usize] != -1 {
                    let x2 = n - v2[k2_offset as usize];
                    if x1 >= x2 {
                        return split(old, new, x1 as usize, y1 as usize, budget);
                    }
                }
            }
            k1 += 2;
        }

        let mut k2 = -d + k2_start;
        while k2 <= d - k2_end {
            let k2_offset = (v_offset + k2) as usize;
            let mut x2 = if k2 == -d || (k2 != d && v2[k2_offset - 1] < v2[k2_offset + 1]) {
                v2[k2_offset + 1]
            } else {
                v2[k2_offset - 1] + 1
            };
            let mut y2 = x2 - k2;
            while x2 < n && y2 < m && old[(n - x2 - 1) as usize] == new[(m - y2 - 1) as usize] {
                x2 += 1;
                y2 += 1;
            }
            v2[k2_offset] = x2;
            if x2 > n {
                k2_end += 2;
            } else if y2 > m {
                k2_start += 2;
            } else if !front {
                let k1_offset = v_offset + delta - k2;
                if (0..v_len).contains(&k1_offset) && v1[k1_offset as usize] != -1 {
                    let x1 = v1[k1_offset as usize];
                    let y1 = v_offset + x1 - k1_offset;
                    if x1 >= n - x2 {
                        return split(old, new, x1 as usize, y1 as usize, budget);
                    }
                }
            }
            k2 += 2;
        }
    }

    // Budget ran out, or no commonality at all.
    vec![Chunk::delete(old), Chunk::insert(new)]
}

fn split<T: Atom>(old: &[T], new: &[T], x: usize, y: usize, budget: &mut Budget) -> Vec<Chunk<T>> {
    let mut chunks = diff_atoms(&old[..x], &new[..y], budget);
    chunks.extend(diff_atoms(&old[x..], &new[y..], budget));
    chunks
}

/// A common run shared by both sequences, as index ranges into each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct HalfMatch {
    old_start: usize,
    old_end: usize,
    new_start: usize,
    new_end: usize,
}

/// Look for a common run at least half as long as the longer sequence.
///
/// Splitting on such a run is fast but may give up minimality, so it is
/// only used when the caller asked for a bounded search.
fn half_match<T: Atom>(old: &[T], new: &[T]) -> Option<HalfMatch> {
    let old_is_longer = old.len() > new.len();
    let (long, short) = if old_is_longer { (old, new) } else { (new, old) };
    if long.len() < 4 || short.len() * 2 < long.len() {
        return None;
    }

    // Seed from the second and the third quarter of the longer sequence.
    let first = half_match_at(long, short, (long.len() + 3) / 4);
    let second = half_match_at(long, short, (long.len() + 1) / 2);
    let best = match (first, second) {
        (None, None) => return None,
        (Some(a), None) => a,
        (None, Some(b)) => b,
        (Some(a), Some(b)) => {
            if a.len() > b.len() {
                a
            } else {
                b
            }
        }
    };

    Some(if old_is_longer {
        HalfMatch {
            old_start: best.long_start,
            old_end: best.long_start + best.len(),
            new_start: best.short_start,
            new_end: best.short_start + best.len(),
        }
    } else {
        HalfMatch {
            old_start: best.short_start,
            old_end: best.short_start + best.len(),
            new_start: best.long_start,
            new_end: best.long_start + best.len(),
        }
    })
}

#[derive(Debug, Clone, Copy)]
struct CommonRun {
    long_start: usize,
    short_start: usize,
    prefix: usize,
    suffix: usize,
}

impl CommonRun {
    fn len(&self) -> usize {
        self.prefix + self.suffix
    }
}

/// Extend every occurrence of the quarter-length seed starting at `i` in
/// `long` and keep the longest, if it covers half of `long`.
fn half_match_at<T: Atom>(long: &[T], short: &[T], i: usize) -> Option<CommonRun> {
    let seed = &long[i..i + long.len() / 4];
    let mut best: Option<CommonRun> = None;
    let mut from = 0;
    while let Some(j) = find_from(short, seed, from) {
        let prefix = common_prefix_len(&long[i..], &short[j..]);
        let suffix = common_suffix_len(&long[..i], &short[..j]);
        if best.map_or(true, |b| b.len() < prefix + suffix) {
            best = Some(CommonRun {
                long_start: i - suffix,
                short_start: j - suffix,
                prefix,
                suffix,
            });
        }
        from = j + 1;
    }
    best.filter(|b| b.len() * 2 >= long.len())
}
