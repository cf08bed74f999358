//! Line-granularity diff output.

use serde::{Deserialize, Serialize};

use crate::op::{EditScript, OpKind};
use crate::stats::DiffStats;

/// One line of a line-mode diff.
///
/// Line numbers are 1-based. `old_line` is absent for inserted lines and
/// `new_line` is absent for deleted lines.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRecord {
    #[serde(rename = "type")]
    pub kind: OpKind,
    #[serde(rename = "oldNumber")]
    pub old_line: Option<usize>,
    #[serde(rename = "newNumber")]
    pub new_line: Option<usize>,
    /// Line content without its terminator.
    pub content: String,
    /// Character-level diff against the paired line on the other side.
    #[serde(rename = "changes", default, skip_serializing_if = "Option::is_none")]
    pub sub_diff: Option<EditScript>,
}

impl LineRecord {
    pub fn equal(old_line: usize, new_line: usize, content: impl Into<String>) -> Self {
        Self {
            kind: OpKind::Equal,
            old_line: Some(old_line),
            new_line: Some(new_line),
            content: content.into(),
            sub_diff: None,
        }
    }

    pub fn insert(new_line: usize, content: impl Into<String>) -> Self {
        Self {
            kind: OpKind::Insert,
            old_line: None,
            new_line: Some(new_line),
            content: content.into(),
            sub_diff: None,
        }
    }

    pub fn delete(old_line: usize, content: impl Into<String>) -> Self {
        Self {
            kind: OpKind::Delete,
            old_line: Some(old_line),
            new_line: None,
            content: content.into(),
            sub_diff: None,
        }
    }

    pub fn with_sub_diff(mut self, sub_diff: EditScript) -> Self {
        self.sub_diff = Some(sub_diff);
        self
    }
}

/// The result of a line-mode diff.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineDiff {
    pub lines: Vec<LineRecord>,
    pub stats: DiffStats,
}

impl LineDiff {
    /// Wrap records, computing line-granularity statistics.
    pub fn new(lines: Vec<LineRecord>) -> Self {
        let stats = DiffStats::from_lines(&lines);
        Self { lines, stats }
    }

    pub fn is_unchanged(&self) -> bool {
        self.stats.is_unchanged()
    }

    pub fn additions(&self) -> impl Iterator<Item = &LineRecord> {
        self.lines.iter().filter(|l| l.kind == OpKind::Insert)
    }

    pub fn deletions(&self) -> impl Iterator<Item = &LineRecord> {
        self.lines.iter().filter(|l| l.kind == OpKind::Delete)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::op::Operation;

    #[test]
    fn json_shape_uses_host_field_names() {
        let record = LineRecord::delete(2, "dog").with_sub_diff(EditScript::new(vec![
            Operation::delete("dog"),
            Operation::insert("fox"),
        ]));
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["type"], "delete");
        assert_eq!(value["oldNumber"], 2);
        assert!(value["newNumber"].is_null());
        assert_eq!(value["changes"][1]["text"], "fox");
    }

    #[test]
    fn sub_diff_omitted_when_absent() {
        let value = serde_json::to_value(LineRecord::equal(1, 1, "cat")).unwrap();
        assert!(value.get("changes").is_none());
    }

    #[test]
    fn line_diff_filters() {
        let diff = LineDiff::new(vec![
            LineRecord::equal(1, 1, "a"),
            LineRecord::insert(2, "b"),
        ]);
        assert_eq!(diff.additions().count(), 1);
        assert_eq!(diff.deletions().count(), 0);
        assert!(!diff.is_unchanged());
    }
}
