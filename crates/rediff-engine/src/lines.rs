//! Line-granularity diffs.
//!
//! Every distinct line is interned to a `u32` symbol so the Myers search
//! compares whole lines in O(1) and runs in time proportional to the number
//! of lines rather than characters. The symbol script is mapped back to line
//! slices before cleanup so boundary scoring can look at line content.

use std::collections::HashMap;

use rediff_types::{LineDiff, LineRecord, OpKind};
use tracing::debug;

use crate::atom::Chunk;
use crate::cleanup::cleanup_chunks;
use crate::config::DiffConfig;
use crate::myers::{diff_atoms, Budget};

/// Maps each distinct line to a symbol shared by both texts.
#[derive(Debug, Default)]
struct LineInterner<'a> {
    symbols: HashMap<&'a str, u32>,
    lines: Vec<&'a str>,
}

impl<'a> LineInterner<'a> {
    fn intern(&mut self, line: &'a str) -> u32 {
        if let Some(&symbol) = self.symbols.get(line) {
            return symbol;
        }
        let symbol = self.lines.len() as u32;
        self.lines.push(line);
        self.symbols.insert(line, symbol);
        symbol
    }

    fn intern_text(&mut self, text: &'a str) -> Vec<u32> {
        split_lines(text).map(|line| self.intern(line)).collect()
    }

    fn line(&self, symbol: u32) -> &'a str {
        self.lines[symbol as usize]
    }
}

/// Lines of `text`, each keeping its `\n`. A trailing fragment without a
/// terminator is a line of its own.
pub(crate) fn split_lines(text: &str) -> impl Iterator<Item = &str> {
    text.split_inclusive('\n')
}

/// The cleaned line-level script: every chunk item is one whole line.
pub(crate) fn line_chunks<'a>(old: &'a str, new: &'a str, config: &DiffConfig) -> Vec<Chunk<&'a str>> {
    let mut interner = LineInterner::default();
    let old_symbols = interner.intern_text(old);
    let new_symbols = interner.intern_text(new);

    let mut budget = Budget::new(config.budget);
    let symbol_chunks = diff_atoms(&old_symbols, &new_symbols, &mut budget);
    if budget.is_exhausted() {
        debug!(
            budget = ?config.budget,
            old_lines = old_symbols.len(),
            new_lines = new_symbols.len(),
            "line diff hit its budget"
        );
    }
    let chunks = symbol_chunks
        .into_iter()
        .map(|chunk| {
            let lines = chunk.items.iter().map(|&s| interner.line(s)).collect();
            Chunk::new(chunk.kind, lines)
        })
        .collect();

    cleanup_chunks(chunks, config.cleanup, config.edit_cost)
}

/// Diff two texts line by line.
///
/// Records are numbered from 1 on each side. Inside each run of changed
/// lines the n-th deleted line is paired with the n-th inserted line and
/// both records carry the character diff between the two.
pub fn line_diff(old: &str, new: &str, config: &DiffConfig) -> LineDiff {
    let mut records = Vec::new();
    let mut old_line = 1;
    let mut new_line = 1;

    for chunk in line_chunks(old, new, config) {
        for line in chunk.items {
            let content = line.strip_suffix('\n').unwrap_or(line);
            match chunk.kind {
                OpKind::Equal => {
                    records.push(LineRecord::equal(old_line, new_line, content));
                    old_line += 1;
                    new_line += 1;
                }
                OpKind::Delete => {
                    records.push(LineRecord::delete(old_line, content));
                    old_line += 1;
                }
                OpKind::Insert => {
                    records.push(LineRecord::insert(new_line, content));
                    new_line += 1;
                }
            }
        }
    }

    attach_sub_diffs(&mut records, config);
    LineDiff::new(records)
}

fn attach_sub_diffs(records: &mut [LineRecord], config: &DiffConfig) {
    let mut start = 0;
    while start < records.len() {
        if records[start].kind == OpKind::Equal {
            start += 1;
            continue;
        }
        let end = records[start..]
            .iter()
            .position(|r| r.kind == OpKind::Equal)
            .map_or(records.len(), |offset| start + offset);

        let of_kind = |kind: OpKind| -> Vec<usize> {
            (start..end).filter(|&i| records[i].kind == kind).collect()
        };
        let deleted = of_kind(OpKind::Delete);
        let inserted = of_kind(OpKind::Insert);

        for (&d, &i) in deleted.iter().zip(&inserted) {
            let sub_diff = crate::char_diff(&records[d].content, &records[i].content, config);
            records[d].sub_diff = Some(sub_diff.clone());
            records[i].sub_diff = Some(sub_diff);
        }
        start = end;
    }
}
