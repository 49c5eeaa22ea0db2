//! Comment and string-literal regions of a source file.
//!
//! One forward pass over the text records every comment (`//`, `/* */`,
//! `<!-- -->`) and quoted region (`'`, `"`, `` ` ``) as an interval. Queries
//! are a binary search over the sorted, non-overlapping intervals.
//!
//! Strings are toggled by their quote character, honor backslash escapes
//! and never nest. Quote characters inside comments and comment markers
//! inside strings are ignored.

/// What kind of region an offset falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionKind {
    /// `// ...` up to the next newline.
    LineComment,
    /// `/* ... */`.
    BlockComment,
    /// `<!-- ... -->`.
    MarkupComment,
    /// Quoted text; carries the quote character.
    String(char),
}

impl RegionKind {
    /// True for the three comment kinds.
    pub fn is_comment(&self) -> bool {
        !matches!(self, RegionKind::String(_))
    }
}

/// A half-open byte interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    /// First byte (the opening delimiter).
    pub start: usize,
    /// One past the closing delimiter, or the end of text if unterminated.
    pub end: usize,
    /// Region classification.
    pub kind: RegionKind,
}

/// Sorted comment/string intervals of one document.
#[derive(Debug, Clone, Default)]
pub struct ExclusionMap {
    regions: Vec<Region>,
}

impl ExclusionMap {
    /// Lex `text` once and record every comment and string region.
    pub fn build(text: &str) -> Self {
        let bytes = text.as_bytes();
        let len = bytes.len();
        let mut regions = Vec::new();
        let mut i = 0;

        while i < len {
            let rest = &bytes[i..];
            if rest.starts_with(b"<!--") {
                let end = find_from(bytes, i + 4, b"-->").map_or(len, |e| e + 3);
                regions.push(Region {
                    start: i,
                    end,
                    kind: RegionKind::MarkupComment,
                });
                i = end;
            } else if rest.starts_with(b"//") {
                let end = find_from(bytes, i + 2, b"\n").unwrap_or(len);
                regions.push(Region {
                    start: i,
                    end,
                    kind: RegionKind::LineComment,
                });
                i = end;
            } else if rest.starts_with(b"/*") {
                let end = find_from(bytes, i + 2, b"*/").map_or(len, |e| e + 2);
                regions.push(Region {
                    start: i,
                    end,
                    kind: RegionKind::BlockComment,
                });
                i = end;
            } else if matches!(bytes[i], b'\'' | b'"' | b'`') {
                let quote = bytes[i];
                let end = string_end(bytes, i + 1, quote);
                regions.push(Region {
                    start: i,
                    end,
                    kind: RegionKind::String(quote as char),
                });
                i = end;
            } else {
                i += 1;
            }
        }

        Self { regions }
    }

    /// The region strictly containing `offset`, if any.
    ///
    /// For strings the opening quote itself does not count as inside.
    pub fn region_at(&self, offset: usize) -> Option<&Region> {
        let idx = self.regions.partition_point(|r| r.start <= offset);
        let region = self.regions.get(idx.checked_sub(1)?)?;
        let inside = match region.kind {
            RegionKind::String(_) => offset > region.start && offset < region.end,
            _ => offset < region.end,
        };
        inside.then_some(region)
    }

    /// True if `offset` lies inside any comment.
    pub fn in_comment(&self, offset: usize) -> bool {
        self.region_at(offset).is_some_and(|r| r.kind.is_comment())
    }

    /// True if `offset` lies inside a string literal.
    pub fn in_string(&self, offset: usize) -> bool {
        self.region_at(offset)
            .is_some_and(|r| matches!(r.kind, RegionKind::String(_)))
    }
}

fn find_from(bytes: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    if from > bytes.len() {
        return None;
    }
    bytes[from..]
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|p| from + p)
}

fn string_end(bytes: &[u8], mut i: usize, quote: u8) -> usize {
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b if b == quote => return i + 1,
            _ => i += 1,
        }
    }
    bytes.len()
}

/// Calls and options whose array argument may legitimately hold a quoted
/// symbol name.
const DECLARATION_CALLS: &[&str] = &["defineprops", "defineemits"];
const DECLARATION_OPTIONS: &[&str] = &["props", "emits"];

/// True when the `window` bytes before `offset` end inside the array
/// argument of a props/emits declaration, e.g. `defineProps(['a', '`.
///
/// The array must still be open: no `]` between its `[` and `offset`.
pub fn in_declaration_array(text: &str, offset: usize, window: usize) -> bool {
    let start = crate::text::floor_char_boundary(text, offset.saturating_sub(window));
    let before = &text[start..offset];

    let Some(open) = before.rfind('[') else {
        return false;
    };
    if before[open..].contains(']') {
        return false;
    }

    let head = before[..open].trim_end();
    if let Some(call) = head.strip_suffix('(') {
        let callee = trailing_identifier(call.trim_end());
        return DECLARATION_CALLS.contains(&callee.to_ascii_lowercase().as_str());
    }
    if let Some(option) = head.strip_suffix(':') {
        let key = trailing_identifier(option.trim_end());
        return DECLARATION_OPTIONS.contains(&key.to_ascii_lowercase().as_str());
    }
    false
}

fn trailing_identifier(text: &str) -> &str {
    let start = text
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_alphanumeric() || *c == '_' || *c == '$')
        .last()
        .map_or(text.len(), |(i, _)| i);
    &text[start..]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offset_of(text: &str, needle: &str) -> usize {
        text.find(needle).unwrap()
    }

    #[test]
    fn test_markup_comment_is_excluded() {
        let text = "<template>\n  <!-- :a1=\"x\" -->\n  <div :a1=\"y\" />\n</template>";
        let map = ExclusionMap::build(text);
        assert!(map.in_comment(offset_of(text, "a1")));
        assert!(!map.in_comment(text.rfind("a1").unwrap()));
    }

    #[test]
    fn test_line_and_block_comments() {
        let text = "const a = 1 // a1 here\n/* a1\n */ const a1 = 2";
        let map = ExclusionMap::build(text);
        assert!(map.in_comment(offset_of(text, "a1 here")));
        assert!(map.in_comment(offset_of(text, "a1\n")));
        assert!(!map.in_comment(text.rfind("a1").unwrap()));
    }

    #[test]
    fn test_string_regions_honor_escapes() {
        let text = r#"const s = 'it\'s a1'; const a1 = "x";"#;
        let map = ExclusionMap::build(text);
        assert!(map.in_string(offset_of(text, "a1'")));
        assert!(!map.in_string(offset_of(text, "a1 =")));
    }

    #[test]
    fn test_comment_markers_inside_strings_are_ignored() {
        let text = "const url = 'http://host'; const a1 = 1;";
        let map = ExclusionMap::build(text);
        assert!(!map.in_comment(offset_of(text, "a1")));
        assert!(!map.in_string(offset_of(text, "a1")));
    }

    #[test]
    fn test_quotes_inside_comments_are_ignored() {
        let text = "// don't\nconst a1 = 1";
        let map = ExclusionMap::build(text);
        assert!(!map.in_string(offset_of(text, "a1")));
    }

    #[test]
    fn test_unterminated_regions_run_to_end() {
        let text = "/* open a1";
        let map = ExclusionMap::build(text);
        assert!(map.in_comment(offset_of(text, "a1")));
    }

    #[test]
    fn test_in_declaration_array() {
        let text = "const props = defineProps(['a0', 'a1'])";
        assert!(in_declaration_array(text, offset_of(text, "a1"), 100));

        let text = "const names = ['a1']";
        assert!(!in_declaration_array(text, offset_of(text, "a1"), 100));

        let text = "defineEmits(['x']); const y = 'a1'";
        assert!(!in_declaration_array(text, offset_of(text, "a1"), 100));

        let text = "export default { props: ['a1'] }";
        assert!(in_declaration_array(text, offset_of(text, "a1"), 100));
    }
}
