use serde::{Deserialize, Serialize};

use crate::line::LineRecord;
use crate::op::{EditScript, OpKind};

/// Summary counts for a diff.
///
/// Always derived from a script or a list of line records, never edited in
/// place.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DiffStats {
    /// Inserted units (characters for a script, lines for a line diff).
    pub additions: usize,
    /// Deleted units (characters for a script, lines for a line diff).
    pub deletions: usize,
    /// Number of non-equal entries.
    pub changes: usize,
    /// Number of entries.
    pub total: usize,
}

impl DiffStats {
    /// Character-granularity statistics for an edit script.
    pub fn from_script(script: &EditScript) -> Self {
        let mut stats = Self::default();
        for op in script {
            match op.kind {
                OpKind::Equal => {}
                OpKind::Insert => {
                    stats.additions += op.char_len();
                    stats.changes += 1;
                }
                OpKind::Delete => {
                    stats.deletions += op.char_len();
                    stats.changes += 1;
                }
            }
            stats.total += 1;
        }
        stats
    }

    /// Line-granularity statistics: one unit per record.
    pub fn from_lines(lines: &[LineRecord]) -> Self {
        let mut stats = Self {
            total: lines.len(),
            ..Self::default()
        };
        for line in lines {
            match line.kind {
                OpKind::Equal => {}
                OpKind::Insert => {
                    stats.additions += 1;
                    stats.changes += 1;
                }
                OpKind::Delete => {
                    stats.deletions += 1;
                    stats.changes += 1;
                }
            }
        }
        stats
    }

    /// Returns `true` if nothing was inserted or deleted.
    pub fn is_unchanged(&self) -> bool {
        self.changes == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::op::Operation;

    #[test]
    fn counts_characters_not_bytes() {
        let script = EditScript::new(vec![
            Operation::equal("caf"),
            Operation::delete("é"),
            Operation::insert("e\u{301}"),
        ]);
        let stats = script.stats();
        assert_eq!(stats.deletions, 1);
        assert_eq!(stats.additions, 2);
        assert_eq!(stats.changes, 2);
        assert_eq!(stats.total, 3);
    }

    #[test]
    fn empty_script_is_unchanged() {
        let stats = EditScript::empty().stats();
        assert_eq!(stats, DiffStats::default());
        assert!(stats.is_unchanged());
    }

    #[test]
    fn line_stats_count_records() {
        let lines = vec![
            LineRecord::equal(1, 1, "a"),
            LineRecord::delete(2, "b"),
            LineRecord::insert(2, "c"),
            LineRecord::insert(3, "d"),
        ];
        let stats = DiffStats::from_lines(&lines);
        assert_eq!(stats.additions, 2);
        assert_eq!(stats.deletions, 1);
        assert_eq!(stats.changes, 3);
        assert_eq!(stats.total, 4);
    }
}
