//! Source-preserving text blocks
//!
//! A [`Verbatim`] holds a node's original text split into lines, with each
//! continuation line's indentation stored relative to the column the node
//! started at. Rendering at a new indentation shifts the whole block while
//! keeping its inner shape, so printing an already-printed block is a no-op.

use std::fmt;
use std::ops::Range;

const TAB_WIDTH: usize = 4;

/// Node kinds whose multi-line content must never be re-indented
pub(crate) const PINNED_KINDS: &[&str] = &[
    "verbatim_string_literal",
    "raw_string_literal",
    "interpolated_string_expression",
];

#[derive(Debug, Clone, PartialEq, Eq)]
struct Line {
    indent: usize,
    text: String,
    /// Starts inside a multi-line literal; written back exactly as captured
    pinned: bool,
}

/// A block of source text carried through the tree unchanged
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verbatim {
    lines: Vec<Line>,
}

impl Verbatim {
    /// Build a block from free-standing text whose first line sits at column 0
    pub fn from_text(text: &str) -> Self {
        Self::capture(text, 0..text.len(), &[])
    }

    /// Capture `source[range]`, measuring indentation against the column the
    /// range starts at. Line breaks ending the range are not part of the block.
    pub(crate) fn capture(source: &str, range: Range<usize>, pinned: &[Range<usize>]) -> Self {
        let trimmed = source[range.clone()].trim_end_matches(|c| c == '\r' || c == '\n').len();
        let range = range.start..range.start + trimmed;

        let line_start = source[..range.start].rfind('\n').map_or(0, |i| i + 1);
        let prefix = &source[line_start..range.start];
        let base = if prefix.chars().all(char::is_whitespace) {
            whitespace_width(prefix)
        } else {
            prefix.chars().count()
        };

        let inside = |pos: usize| pinned.iter().any(|r| r.start < pos && pos < r.end);

        let mut lines = Vec::new();
        let mut offset = range.start;
        for (index, raw) in source[range].split('\n').enumerate() {
            let line_end = offset + raw.len();
            // A carriage return inside a literal is part of its value
            let raw = if inside(line_end) {
                raw
            } else {
                raw.strip_suffix('\r').unwrap_or(raw)
            };

            if index > 0 && inside(offset) {
                lines.push(Line {
                    indent: 0,
                    text: raw.to_string(),
                    pinned: true,
                });
            } else {
                let content = raw.trim_start();
                let leading = &raw[..raw.len() - content.len()];
                let content = if inside(line_end) {
                    content
                } else {
                    content.trim_end()
                };
                let indent = if index == 0 || content.is_empty() {
                    0
                } else {
                    whitespace_width(leading).saturating_sub(base)
                };
                lines.push(Line {
                    indent,
                    text: content.to_string(),
                    pinned: false,
                });
            }

            offset = line_end + 1;
        }

        Self { lines }
    }

    /// Render the block for a position whose first line is already padded.
    ///
    /// Continuation lines get `pad` plus their relative indentation; pinned
    /// lines are written raw.
    pub fn render(&self, pad: &str) -> String {
        let mut out = String::new();
        for (index, line) in self.lines.iter().enumerate() {
            if index > 0 {
                out.push('\n');
            }
            if line.pinned {
                out.push_str(&line.text);
                continue;
            }
            if line.text.is_empty() {
                continue;
            }
            if index > 0 {
                out.push_str(pad);
                out.push_str(&" ".repeat(line.indent));
            }
            out.push_str(&line.text);
        }
        out
    }

    pub fn first_line(&self) -> &str {
        self.lines.first().map_or("", |l| l.text.as_str())
    }

}

impl fmt::Display for Verbatim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(""))
    }
}

fn whitespace_width(s: &str) -> usize {
    s.chars()
        .map(|c| if c == '\t' { TAB_WIDTH } else { 1 })
        .sum()
}

/// Comments and spacing attached to the node that follows them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Trivia {
    /// A blank line separated this node from its predecessor
    pub blank_line: bool,
    pub comments: Vec<Verbatim>,
}

impl Trivia {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn spaced() -> Self {
        Self {
            blank_line: true,
            comments: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        !self.blank_line && self.comments.is_empty()
    }
}
