//! Source text helpers: shebang, directives, indentation, line endings.

use crate::edit::{commit_edits, Edit};
use crate::error::NodemodResult;
use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;

static DIRECTIVE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^\s*(['"])use [a-z ]+(['"])\s*;?\s*$"#).expect("valid regex"));

/// Indentation unit used by a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indent {
    Tabs,
    Spaces(usize),
}

impl Indent {
    /// The text of one indentation level
    pub fn unit(&self) -> String {
        match self {
            Indent::Tabs => "\t".to_string(),
            Indent::Spaces(width) => " ".repeat(*width),
        }
    }
}

impl Default for Indent {
    fn default() -> Self {
        Indent::Spaces(2)
    }
}

/// The shebang line (without its line break), if the file starts with one
pub fn shebang(source: &str) -> Option<&str> {
    if !source.starts_with("#!") {
        return None;
    }
    let end = source.find('\n').unwrap_or(source.len());
    Some(source[..end].trim_end_matches('\r'))
}

/// Offset at which new top-level statements should be inserted.
///
/// Skips a shebang and any leading directive prologue (`'use strict';`).
pub fn insertion_offset(source: &str) -> usize {
    let mut offset = 0;
    let mut lines = source.split_inclusive('\n').peekable();

    if source.starts_with("#!") {
        if let Some(line) = lines.next() {
            offset += line.len();
        }
    }

    while let Some(line) = lines.peek() {
        if !DIRECTIVE.is_match(line.trim_end_matches(['\r', '\n'])) {
            break;
        }
        offset += line.len();
        lines.next();
    }
    offset
}

/// Guess the indentation unit of `source`.
///
/// Tabs win when more lines are tab-indented than space-indented; otherwise
/// the narrowest space indentation is used. Continuation lines of block
/// comments (` * ...`) are ignored.
pub fn detect_indent(source: &str) -> Indent {
    let mut tab_lines = 0usize;
    let mut space_lines = 0usize;
    let mut narrowest: Option<usize> = None;

    for line in source.lines() {
        let trimmed = line.trim_start();
        if trimmed.is_empty() || trimmed.starts_with('*') {
            continue;
        }
        if line.starts_with('\t') {
            tab_lines += 1;
        } else if line.starts_with(' ') {
            space_lines += 1;
            let width = line.len() - line.trim_start_matches(' ').len();
            narrowest = Some(narrowest.map_or(width, |n| n.min(width)));
        }
    }

    if tab_lines > space_lines {
        return Indent::Tabs;
    }
    narrowest.map(Indent::Spaces).unwrap_or_default()
}

/// Leading whitespace of the line containing `offset`
pub fn line_indent(source: &str, offset: usize) -> &str {
    let offset = offset.min(source.len());
    let start = source[..offset].rfind('\n').map_or(0, |i| i + 1);
    let line = &source[start..];
    let width = line.len() - line.trim_start_matches([' ', '\t']).len();
    &line[..width]
}

/// Dominant line ending of `source`
pub fn detect_eol(source: &str) -> &'static str {
    let crlf = source.matches("\r\n").count();
    let lf = source.matches('\n').count() - crlf;
    if crlf > lf {
        "\r\n"
    } else {
        "\n"
    }
}

/// Range to delete when removing the code at `range`.
///
/// When the code is alone on its line(s) the whole line, including its line
/// break, is returned. Otherwise the range is widened over trailing spaces so
/// no double space is left behind.
pub fn removal_range(source: &str, range: Range<usize>) -> Range<usize> {
    let line_start = source[..range.start].rfind('\n').map_or(0, |i| i + 1);
    let line_end = source[range.end..]
        .find('\n')
        .map_or(source.len(), |i| range.end + i + 1);

    let before = &source[line_start..range.start];
    let after = &source[range.end..line_end];
    if before.trim().is_empty() && after.trim().is_empty() {
        return line_start..line_end;
    }

    let trailing = source[range.end..].len() - source[range.end..].trim_start_matches(' ').len();
    range.start..range.end + trailing
}

/// Range to delete when removing one element of a comma separated list
/// (import specifiers, destructured properties, declarators).
///
/// The separating comma is taken from after the element when there is one,
/// otherwise from before it. An element alone on its line takes the line.
pub fn list_item_removal_range(source: &str, range: Range<usize>) -> Range<usize> {
    let after = &source[range.end..];
    let gap = after.len() - after.trim_start().len();

    if after[gap..].starts_with(',') {
        let comma_end = range.end + gap + 1;
        let rest = &source[comma_end..];
        let line_start = source[..range.start].rfind('\n').map_or(0, |i| i + 1);
        let line_end = rest.find('\n').map(|i| comma_end + i + 1);

        if let Some(line_end) = line_end {
            if source[line_start..range.start].trim().is_empty()
                && source[comma_end..line_end].trim().is_empty()
            {
                return line_start..line_end;
            }
        }

        let spaces = rest.len() - rest.trim_start_matches([' ', '\t']).len();
        return range.start..comma_end + spaces;
    }

    let before = source[..range.start].trim_end();
    if before.ends_with(',') {
        return before.len() - 1..range.end;
    }
    range
}

/// Remove the lines covered by `ranges`
pub fn remove_lines(source: &str, ranges: &[Range<usize>]) -> NodemodResult<String> {
    let edits = ranges
        .iter()
        .map(|range| Edit::delete(removal_range(source, range.clone())))
        .collect();
    commit_edits(source, edits)
}
