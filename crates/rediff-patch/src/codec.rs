//! Text form of a patch.
//!
//! ```text
//! @@ -1,3 +1,3 @@
//!  a
//! -b
//! +X
//!  c
//! ```
//!
//! Every hunk starts with a header giving the start and length on each side,
//! followed by one line per hunk line tagged ` `, `-` or `+`. A line that
//! ends its text without a terminator is followed by
//! `\ No newline at end of file`.

use std::fmt;
use std::iter::Peekable;
use std::str::FromStr;

use rediff_types::OpKind;
use tracing::debug;

use crate::error::{FormatError, PatchResult};
use crate::hunk::{Hunk, Patch};

/// Marker following a line that has no terminator.
pub const NO_NEWLINE_MARKER: &str = "\\ No newline at end of file";

/// Encode a patch to its text form.
pub fn encode(patch: &Patch) -> String {
    patch.to_string()
}

/// Decode the text form of a patch. Nothing is returned unless the whole
/// text is valid.
pub fn decode(text: &str) -> PatchResult<Patch> {
    let mut lines = text
        .split_inclusive('\n')
        .enumerate()
        .map(|(i, line)| (i + 1, line))
        .peekable();

    let mut hunks = Vec::new();
    while let Some((number, line)) = lines.next() {
        let header = trim_terminator(line);
        if !header.starts_with("@@") {
            return Err(FormatError::UnexpectedLine {
                line: number,
                text: header.to_string(),
            });
        }
        let ranges = parse_header(header).ok_or_else(|| FormatError::MalformedHeader {
            line: number,
            text: header.to_string(),
        })?;
        hunks.push(decode_body(number, ranges, &mut lines)?);
    }

    debug!(hunks = hunks.len(), "decoded patch");
    Ok(Patch::new(hunks))
}

impl fmt::Display for Hunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "@@ -{},{} +{},{} @@",
            self.old_start, self.old_len, self.new_start, self.new_len
        )?;
        for (kind, line) in self.lines() {
            write!(f, "{}{}", kind.tag(), line)?;
            if !line.ends_with('\n') {
                writeln!(f)?;
                writeln!(f, "{NO_NEWLINE_MARKER}")?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for Patch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for hunk in &self.hunks {
            write!(f, "{hunk}")?;
        }
        Ok(())
    }
}

impl FromStr for Patch {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode(s)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct HeaderRanges {
    old_start: usize,
    old_len: usize,
    new_start: usize,
    new_len: usize,
}

fn trim_terminator(line: &str) -> &str {
    line.trim_end_matches(['\n', '\r'])
}

/// Parse `@@ -os,ol +ns,nl @@`. A missing length means one line; text after
/// the closing `@@` is ignored.
fn parse_header(header: &str) -> Option<HeaderRanges> {
    let rest = header.strip_prefix("@@ -")?;
    let (ranges, _) = rest.split_once(" @@")?;
    let (old, new) = ranges.split_once(" +")?;
    let (old_start, old_len) = parse_range(old)?;
    let (new_start, new_len) = parse_range(new)?;
    Some(HeaderRanges {
        old_start,
        old_len,
        new_start,
        new_len,
    })
}

fn parse_range(range: &str) -> Option<(usize, usize)> {
    let (start, len) = match range.split_once(',') {
        Some((start, len)) => (start.parse().ok()?, len.parse().ok()?),
        None => (range.parse().ok()?, 1),
    };
    // Line numbers are 1-based; zero only names the position before a
    // zero-length range.
    if start == 0 && len > 0 {
        return None;
    }
    // Positions are offset and compared as signed line counts when applied.
    let bound = isize::MAX as usize;
    if start > bound || len > bound {
        return None;
    }
    Some((start, len))
}

fn decode_body<'a, I>(
    header_line: usize,
    ranges: HeaderRanges,
    lines: &mut Peekable<I>,
) -> PatchResult<Hunk>
where
    I: Iterator<Item = (usize, &'a str)>,
{
    let mut hunk = Hunk::new(ranges.old_start, ranges.new_start);
    let mismatch = |line: usize, hunk: &Hunk| FormatError::LengthMismatch {
        line,
        declared_old: ranges.old_len,
        declared_new: ranges.new_len,
        actual_old: hunk.old_len,
        actual_new: hunk.new_len,
    };

    // Sides whose last line has been marked unterminated.
    let mut old_closed = false;
    let mut new_closed = false;
    let mut last_kind: Option<OpKind> = None;

    loop {
        let complete = hunk.old_len == ranges.old_len && hunk.new_len == ranges.new_len;
        let Some(&(number, line)) = lines.peek() else {
            if complete {
                break;
            }
            return Err(mismatch(header_line, &hunk));
        };

        if line.starts_with('\\') {
            let Some(kind) = last_kind.take() else {
                return Err(FormatError::UnexpectedLine {
                    line: number,
                    text: trim_terminator(line).to_string(),
                });
            };
            if let Some(last) = hunk.operations.last_mut() {
                last.text.pop();
            }
            old_closed |= kind.in_old();
            new_closed |= kind.in_new();
            lines.next();
            continue;
        }
        if complete {
            break;
        }
        if line.starts_with("@@") {
            return Err(mismatch(number, &hunk));
        }

        // Tools that strip trailing whitespace turn an empty context line
        // into a bare line break.
        let (kind, content) = if trim_terminator(line).is_empty() {
            (OpKind::Equal, line)
        } else {
            let prefix = line.chars().next().unwrap_or(' ');
            let kind = OpKind::from_tag(prefix).ok_or(FormatError::UnknownPrefix {
                line: number,
                prefix,
            })?;
            (kind, &line[prefix.len_utf8()..])
        };

        if (kind.in_old() && old_closed) || (kind.in_new() && new_closed) {
            return Err(FormatError::UnexpectedLine {
                line: number,
                text: trim_terminator(line).to_string(),
            });
        }
        let old_len = hunk.old_len + usize::from(kind.in_old());
        let new_len = hunk.new_len + usize::from(kind.in_new());
        if old_len > ranges.old_len || new_len > ranges.new_len {
            return Err(mismatch(number, &hunk));
        }

        if content.ends_with('\n') {
            hunk.push_line(kind, content);
        } else {
            hunk.push_line(kind, &format!("{content}\n"));
        }
        last_kind = Some(kind);
        lines.next();
    }

    Ok(hunk)
}
