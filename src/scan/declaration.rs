//! Props, emits and expose declarations.
//!
//! A declaration is a `defineProps`/`defineEmits`/`defineExpose` call (runtime
//! `(...)` or type-level `<...>` argument) or a `props:`/`emits:` component
//! option. Its argument span is taken by bracket matching. Inside the span a
//! name counts as declared when it is a quoted array element or an object key
//! at the outermost level of the argument.

use crate::text::is_word_bounded;
use serde::Serialize;

/// Which declaration construct to look in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum DeclarationTarget {
    /// `defineProps(...)` / `defineProps<...>()`.
    Props,
    /// `defineEmits(...)` / `defineEmits<...>()`.
    Emits,
    /// `defineExpose({...})`.
    Expose,
    /// `props: [...]` / `props: {...}` component option.
    PropsOption,
    /// `emits: [...]` / `emits: {...}` component option.
    EmitsOption,
}

impl DeclarationTarget {
    /// All targets, in scan order.
    pub const ALL: [DeclarationTarget; 5] = [
        DeclarationTarget::Props,
        DeclarationTarget::Emits,
        DeclarationTarget::Expose,
        DeclarationTarget::PropsOption,
        DeclarationTarget::EmitsOption,
    ];

    fn keyword(&self) -> &'static str {
        match self {
            DeclarationTarget::Props => "defineProps",
            DeclarationTarget::Emits => "defineEmits",
            DeclarationTarget::Expose => "defineExpose",
            DeclarationTarget::PropsOption => "props",
            DeclarationTarget::EmitsOption => "emits",
        }
    }

    fn is_option(&self) -> bool {
        matches!(
            self,
            DeclarationTarget::PropsOption | DeclarationTarget::EmitsOption
        )
    }
}

/// Byte span of a declaration argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArgumentSpan {
    /// First byte of the argument.
    pub start: usize,
    /// One past the last byte of the argument.
    pub end: usize,
    /// True for the type-level `<...>` form.
    pub generic: bool,
}

/// Every argument span of `target` in `text`.
pub fn argument_spans(text: &str, target: DeclarationTarget) -> Vec<ArgumentSpan> {
    let keyword = target.keyword();
    let bytes = text.as_bytes();
    let mut spans = Vec::new();

    for (at, _) in text.match_indices(keyword) {
        let after = at + keyword.len();
        if !is_word_bounded(text, at, after) {
            continue;
        }
        let mut i = skip_whitespace(bytes, after);

        if target.is_option() {
            if bytes.get(i) != Some(&b':') {
                continue;
            }
            i = skip_whitespace(bytes, i + 1);
            if matches!(bytes.get(i), Some(b'[') | Some(b'{')) {
                let close = matching_close(bytes, i);
                spans.push(ArgumentSpan {
                    start: i,
                    end: (close + 1).min(bytes.len()),
                    generic: false,
                });
            }
            continue;
        }

        if bytes.get(i) == Some(&b'<') {
            let close = angle_close(bytes, i);
            spans.push(ArgumentSpan {
                start: i + 1,
                end: close,
                generic: true,
            });
            i = skip_whitespace(bytes, (close + 1).min(bytes.len()));
        }
        if bytes.get(i) == Some(&b'(') {
            let close = matching_close(bytes, i);
            spans.push(ArgumentSpan {
                start: i + 1,
                end: close,
                generic: false,
            });
        }
    }

    spans
}

/// Byte spans where `name` is declared by `target`.
pub fn find_declared(text: &str, target: DeclarationTarget, name: &str) -> Vec<(usize, usize)> {
    if name.is_empty() {
        return Vec::new();
    }
    argument_spans(text, target)
        .into_iter()
        .flat_map(|span| declared_in_span(text, span, target, name))
        .collect()
}

/// True if any declaration construct declares `name`.
pub fn is_declared(text: &str, name: &str) -> bool {
    DeclarationTarget::ALL
        .iter()
        .any(|target| !find_declared(text, *target, name).is_empty())
}

fn declared_in_span(
    text: &str,
    span: ArgumentSpan,
    target: DeclarationTarget,
    name: &str,
) -> Vec<(usize, usize)> {
    let bytes = text.as_bytes();
    let len = name.len();
    let mut depth: i32 = 0;
    let mut quote: Option<u8> = None;
    let mut found = Vec::new();
    let mut i = span.start;

    while i < span.end {
        let b = bytes[i];

        if let Some(q) = quote {
            if b == b'\\' {
                i += 2;
                continue;
            }
            if b == q {
                quote = None;
                i += 1;
                continue;
            }
            if bytes[i - 1] == q
                && text.is_char_boundary(i)
                && text[i..].starts_with(name)
                && bytes.get(i + len) == Some(&q)
            {
                let context = Context {
                    depth,
                    prev: previous_significant(text, i - 1),
                    next: next_significant(text, i + len + 1),
                };
                if accepts_quoted(target, span.generic, &context) {
                    found.push((i, i + len));
                }
                i += len;
                continue;
            }
            i += 1;
            continue;
        }

        match b {
            b'\'' | b'"' | b'`' => quote = Some(b),
            b'{' => depth += 1,
            b'}' => depth -= 1,
            _ if text.is_char_boundary(i)
                && text[i..].starts_with(name)
                && is_word_bounded(text, i, i + len) =>
            {
                let context = Context {
                    depth,
                    prev: previous_significant(text, i),
                    next: next_significant(text, i + len),
                };
                if accepts_bare(target, &context) {
                    found.push((i, i + len));
                }
                i += len;
                continue;
            }
            _ => {}
        }
        i += 1;
    }

    found
}

struct Context<'a> {
    depth: i32,
    prev: Option<char>,
    next: &'a str,
}

impl Context<'_> {
    fn is_key(&self) -> bool {
        self.depth == 1
            && matches!(self.prev, Some('{') | Some(',') | Some(';'))
            && (self.next.starts_with(':') || self.next.starts_with('?'))
    }
}

fn accepts_quoted(target: DeclarationTarget, generic: bool, context: &Context) -> bool {
    match target {
        DeclarationTarget::Expose => false,
        _ if generic => true,
        _ => {
            let element = context.depth == 0 && matches!(context.prev, Some('[') | Some(','));
            element || context.is_key()
        }
    }
}

fn accepts_bare(target: DeclarationTarget, context: &Context) -> bool {
    match target {
        DeclarationTarget::Expose => {
            context.depth == 1
                && matches!(context.prev, Some('{') | Some(','))
                && matches!(context.next.chars().next(), Some(':' | ',' | '}' | '('))
        }
        _ => context.is_key(),
    }
}

fn previous_significant(text: &str, end: usize) -> Option<char> {
    text[..end].trim_end().chars().next_back()
}

fn next_significant(text: &str, start: usize) -> &str {
    text.get(start..).unwrap_or("").trim_start()
}

fn skip_whitespace(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    i
}

fn skip_string(bytes: &[u8], mut i: usize, quote: u8) -> usize {
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b if b == quote => return i + 1,
            _ => i += 1,
        }
    }
    bytes.len()
}

/// Index of the bracket closing the one at `open`, or the end of text.
fn matching_close(bytes: &[u8], open: usize) -> usize {
    let mut depth = 0usize;
    let mut i = open;
    while i < bytes.len() {
        match bytes[i] {
            b'\'' | b'"' | b'`' => {
                i = skip_string(bytes, i + 1, bytes[i]);
                continue;
            }
            b'(' | b'[' | b'{' => depth += 1,
            b')' | b']' | b'}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return i;
                }
            }
            _ => {}
        }
        i += 1;
    }
    bytes.len()
}

/// Index of the `>` closing a type argument list; `=>` does not close.
fn angle_close(bytes: &[u8], open: usize) -> usize {
    let mut depth = 0usize;
    let mut i = open;
    while i < bytes.len() {
        match bytes[i] {
            b'\'' | b'"' | b'`' => {
                i = skip_string(bytes, i + 1, bytes[i]);
                continue;
            }
            b'<' => depth += 1,
            b'>' if i > 0 && bytes[i - 1] == b'=' => {}
            b'>' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return i;
                }
            }
            _ => {}
        }
        i += 1;
    }
    bytes.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn declared<'a>(text: &'a str, target: DeclarationTarget, name: &str) -> Vec<&'a str> {
        find_declared(text, target, name)
            .into_iter()
            .map(|(s, e)| &text[s..e])
            .collect()
    }

    #[test]
    fn test_array_form() {
        let text = "const props = defineProps(['a0', 'a1'])";
        assert_eq!(declared(text, DeclarationTarget::Props, "a1"), vec!["a1"]);
        assert!(declared(text, DeclarationTarget::Props, "a").is_empty());
    }

    #[test]
    fn test_object_form_only_outer_keys() {
        let text = "defineProps({\n  a1: { type: String, default: 'a1' },\n  b: { type: a1 }\n})";
        let spans = find_declared(text, DeclarationTarget::Props, "a1");
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].0, text.find("a1:").unwrap());
    }

    #[test]
    fn test_quoted_keys() {
        let text = "defineProps({ 'a1': String, \"b-1\": Number, c: { default: 'a1' } })";
        assert_eq!(declared(text, DeclarationTarget::Props, "a1"), vec!["a1"]);
        assert_eq!(declared(text, DeclarationTarget::Props, "b-1"), vec!["b-1"]);
    }

    #[test]
    fn test_generic_form() {
        let text = "const props = defineProps<{ a1: string; b?: number }>()";
        assert_eq!(declared(text, DeclarationTarget::Props, "b"), vec!["b"]);
        assert_eq!(declared(text, DeclarationTarget::Props, "a1"), vec!["a1"]);

        let text = "const emit = defineEmits<{ (e: 'change', id: number): void; (e: 'update'): void }>()";
        assert_eq!(declared(text, DeclarationTarget::Emits, "update"), vec!["update"]);
    }

    #[test]
    fn test_generic_with_arrow_types() {
        let text = "defineProps<{ onPick: (id: number) => void; a1: string }>()";
        assert_eq!(declared(text, DeclarationTarget::Props, "a1"), vec!["a1"]);
    }

    #[test]
    fn test_expose_keys() {
        let text = "defineExpose({ focus, reset: doReset, clear() {} })";
        assert_eq!(declared(text, DeclarationTarget::Expose, "focus"), vec!["focus"]);
        assert_eq!(declared(text, DeclarationTarget::Expose, "reset"), vec!["reset"]);
        assert_eq!(declared(text, DeclarationTarget::Expose, "clear"), vec!["clear"]);
        assert!(declared(text, DeclarationTarget::Expose, "doReset").is_empty());
    }

    #[test]
    fn test_options_api() {
        let text = "export default {\n  props: ['title'],\n  emits: { close: null },\n}";
        assert_eq!(declared(text, DeclarationTarget::PropsOption, "title"), vec!["title"]);
        assert_eq!(declared(text, DeclarationTarget::EmitsOption, "close"), vec!["close"]);
        assert!(is_declared(text, "close"));
        assert!(!is_declared(text, "missing"));
    }

    #[test]
    fn test_unterminated_call_is_tolerated() {
        let text = "defineProps(['a1'";
        assert_eq!(declared(text, DeclarationTarget::Props, "a1"), vec!["a1"]);
    }
}
