//! Rewrite strategies used by the edit planner.

use super::{EditStrategy, TextEdit};
use crate::scan::patterns::word_occurrences;
use crate::scan::PatternKind;
use crate::text::{Document, Position, Range};

/// Replace every whole-word, case-sensitive occurrence of `old` in `line`.
///
/// Returns `None` when nothing changes.
pub fn rewrite_line(line: &str, old: &str, new: &str) -> Option<String> {
    let occurrences = word_occurrences(line, old);
    if occurrences.is_empty() {
        return None;
    }

    let mut out = String::with_capacity(line.len() + occurrences.len() * new.len());
    let mut cursor = 0;
    for (start, end) in occurrences {
        out.push_str(&line[cursor..start]);
        out.push_str(new);
        cursor = end;
    }
    out.push_str(&line[cursor..]);
    Some(out)
}

/// Text that must directly precede the name for a binding-style kind.
fn prefixes(kind: PatternKind) -> &'static [&'static str] {
    match kind {
        PatternKind::PropBinding => &[":"],
        PatternKind::VBind => &["v-bind:"],
        PatternKind::VModel => &["v-model:"],
        PatternKind::VSlot => &["v-slot:"],
        PatternKind::SlotShorthand => &["#"],
        PatternKind::EventListener => &["@"],
        PatternKind::VOn => &["v-on:"],
        PatternKind::MethodCall => &["."],
        PatternKind::EmitCall => &["'", "\""],
        _ => &[],
    }
}

/// Repair a stale reference by re-locating its construct on the same line.
///
/// The name is searched for on the reference's line, and only occurrences
/// that still carry the construct's syntax (the `:`, `v-bind:`, `@`, `#`
/// prefix, an open `{{ ... }}` for interpolations) qualify. The one closest
/// to the stale column wins. Only that name is rewritten; the rest of the
/// line is left alone.
///
/// Returns `None` when the kind has no syntax rule or no occurrence on the
/// line still looks like the construct.
pub fn syntax_edit(
    document: &Document,
    range: &Range,
    kind: PatternKind,
    old: &str,
    new: &str,
) -> Option<TextEdit> {
    if !range.is_single_line() {
        return None;
    }
    let line_no = range.start.line;
    let line = document.line_text(line_no)?;

    let (start, end) = word_occurrences(line, old)
        .into_iter()
        .filter(|(s, e)| construct_at(line, *s, *e, kind))
        .map(|(s, e)| (line[..s].chars().count(), line[..e].chars().count()))
        .min_by_key(|(s, _)| s.abs_diff(range.start.column))?;

    Some(TextEdit {
        range: Range::new(Position::new(line_no, start), Position::new(line_no, end)),
        new_text: new.to_string(),
        strategy: EditStrategy::Syntax(kind),
    })
}

fn construct_at(line: &str, start: usize, end: usize, kind: PatternKind) -> bool {
    let before = &line[..start];
    let after = &line[end..];
    match kind {
        PatternKind::Interpolation => {
            let opened = before.rfind("{{");
            opened.is_some() && opened > before.rfind("}}") && after.contains("}}")
        }
        PatternKind::PropBinding => before.trim_end().ends_with(':'),
        _ => prefixes(kind).iter().any(|p| before.ends_with(p)),
    }
}
