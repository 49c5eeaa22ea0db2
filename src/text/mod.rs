//! Positions, ranges and documents.
//!
//! Candidates are found as byte offsets into the raw text, but reported the
//! way an editor addresses text: 0-based line plus 0-based column counted
//! in chars. [`Document`] keeps a rope-backed line index to convert between
//! the two.

use crate::error::{RenameError, Result};
use ropey::Rope;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// A line/column position (both 0-based, column in chars).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Position {
    /// Line number (0-based).
    pub line: usize,
    /// Column number (0-based, in chars).
    pub column: usize,
}

impl Position {
    /// Create a position.
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// Half-open span between two positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Range {
    /// Inclusive start.
    pub start: Position,
    /// Exclusive end.
    pub end: Position,
}

impl Range {
    /// Create a range.
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// True when both ends sit on the same line.
    pub fn is_single_line(&self) -> bool {
        self.start.line == self.end.line
    }

    /// True when the two ranges share at least one char.
    pub fn overlaps(&self, other: &Range) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// A range inside a specific file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Location {
    /// Absolute file path.
    pub file: PathBuf,
    /// Span inside the file.
    pub range: Range,
}

impl Location {
    /// Create a location.
    pub fn new(file: impl Into<PathBuf>, range: Range) -> Self {
        Self {
            file: file.into(),
            range,
        }
    }

    /// Deduplication key: file plus start line and column.
    pub fn key(&self) -> LocationKey {
        LocationKey {
            file: self.file.clone(),
            line: self.range.start.line,
            column: self.range.start.column,
        }
    }
}

/// `(file, line, column)` identity of a physical location.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LocationKey {
    /// Absolute file path.
    pub file: PathBuf,
    /// Start line (0-based).
    pub line: usize,
    /// Start column (0-based, in chars).
    pub column: usize,
}

/// An opened source file with a line index.
#[derive(Debug, Clone)]
pub struct Document {
    path: PathBuf,
    text: String,
    rope: Rope,
}

impl Document {
    /// Wrap raw text read from `path`.
    pub fn new(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        let text = text.into();
        let rope = Rope::from_str(&text);
        Self {
            path: path.into(),
            text,
            rope,
        }
    }

    /// File path of the document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Full text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Convert a byte offset to a position. Offsets past the end clamp to it.
    pub fn position_at(&self, offset: usize) -> Position {
        let offset = floor_char_boundary(&self.text, offset.min(self.text.len()));
        let line = self.rope.byte_to_line(offset);
        let column = self.rope.byte_to_char(offset) - self.rope.line_to_char(line);
        Position { line, column }
    }

    /// Convert a position to a byte offset.
    pub fn offset_at(&self, position: Position) -> Result<usize> {
        let invalid = || RenameError::InvalidPosition {
            file: self.path.clone(),
            line: position.line,
            column: position.column,
        };

        if position.line >= self.rope.len_lines() {
            return Err(invalid());
        }
        let line_len = self.line_text(position.line).map(|l| l.chars().count()).unwrap_or(0);
        if position.column > line_len {
            return Err(invalid());
        }

        let char_idx = self.rope.line_to_char(position.line) + position.column;
        Ok(self.rope.char_to_byte(char_idx))
    }

    /// Byte offsets of a range.
    pub fn byte_span(&self, range: &Range) -> Result<(usize, usize)> {
        let start = self.offset_at(range.start)?;
        let end = self.offset_at(range.end)?;
        if start > end {
            return Err(RenameError::InvalidRange {
                file: self.path.clone(),
                start,
                end,
            });
        }
        Ok((start, end))
    }

    /// Text covered by a range.
    pub fn text_in(&self, range: &Range) -> Result<&str> {
        let (start, end) = self.byte_span(range)?;
        Ok(&self.text[start..end])
    }

    /// Content of a line without its line terminator.
    pub fn line_text(&self, line: usize) -> Option<&str> {
        if line >= self.rope.len_lines() {
            return None;
        }
        let start = self.rope.line_to_byte(line);
        let end = if line + 1 < self.rope.len_lines() {
            self.rope.line_to_byte(line + 1)
        } else {
            self.text.len()
        };
        let raw = &self.text[start..end];
        Some(raw.trim_end_matches(['\n', '\r']))
    }

    /// Range covering the whole content of a line.
    pub fn line_range(&self, line: usize) -> Option<Range> {
        let len = self.line_text(line)?.chars().count();
        Some(Range::new(Position::new(line, 0), Position::new(line, len)))
    }

    /// Build a location for a byte span of this document.
    pub fn location(&self, start: usize, end: usize) -> Location {
        Location::new(
            self.path.clone(),
            Range::new(self.position_at(start), self.position_at(end)),
        )
    }
}

/// Identifier characters for word-boundary checks.
pub fn is_identifier_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

/// True when the span `[start, end)` of `text` is not glued to identifier
/// characters on either side.
pub fn is_word_bounded(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    !before.is_some_and(is_identifier_char) && !after.is_some_and(is_identifier_char)
}

/// Largest char boundary not greater than `index`.
pub fn floor_char_boundary(text: &str, index: usize) -> usize {
    if index >= text.len() {
        return text.len();
    }
    let mut idx = index;
    while !text.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

/// Range of the identifier under (or directly before) the cursor.
///
/// Word characters are ASCII letters, digits, `_` and `$`.
pub fn word_range_at(document: &Document, position: Position) -> Option<Range> {
    let line = document.line_text(position.line)?;
    let chars: Vec<char> = line.chars().collect();
    if position.column > chars.len() {
        return None;
    }

    let is_word = |c: char| is_identifier_char(c) || c == '$';
    let mut start = position.column;
    if start == chars.len() || !is_word(chars[start]) {
        // Cursor right after a word still selects that word.
        if start == 0 || !is_word(chars[start - 1]) {
            return None;
        }
        start -= 1;
    }
    while start > 0 && is_word(chars[start - 1]) {
        start -= 1;
    }
    let mut end = start;
    while end < chars.len() && is_word(chars[end]) {
        end += 1;
    }

    Some(Range::new(
        Position::new(position.line, start),
        Position::new(position.line, end),
    ))
}

/// A `<script>` block of a single-file component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptBlock {
    /// Whether the opening tag carries the `setup` attribute.
    pub setup: bool,
    /// Byte offset where the block content starts (after `>`).
    pub content_start: usize,
    /// Byte offset of the closing `</script>` (or end of text).
    pub content_end: usize,
}

/// Locate `<script ...>` blocks by literal tag search.
pub fn script_blocks(text: &str) -> Vec<ScriptBlock> {
    let lower = text.to_ascii_lowercase();
    let mut blocks = Vec::new();
    let mut cursor = 0;

    while let Some(found) = lower[cursor..].find("<script") {
        let tag_start = cursor + found;
        let after_name = tag_start + "<script".len();
        // `<scripts>` or `<script-foo>` is a different tag.
        if lower[after_name..]
            .chars()
            .next()
            .is_some_and(|c| !(c.is_whitespace() || c == '>'))
        {
            cursor = after_name;
            continue;
        }
        let Some(tag_end) = lower[after_name..].find('>') else {
            break;
        };
        let attributes = &lower[after_name..after_name + tag_end];
        let content_start = after_name + tag_end + 1;
        let content_end = lower[content_start..]
            .find("</script")
            .map(|i| content_start + i)
            .unwrap_or(text.len());

        blocks.push(ScriptBlock {
            setup: attributes
                .split(|c: char| c.is_whitespace() || c == '=')
                .any(|attr| attr == "setup"),
            content_start,
            content_end,
        });
        cursor = content_end;
    }

    blocks
}
