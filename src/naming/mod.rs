//! Spelling conversions between identifier conventions.
//!
//! Components can be referenced from markup as `<ChildComponent>` or
//! `<child-component>`; these helpers produce every spelling the scanner
//! has to try. All functions are pure and total.

/// Separator used by hyphenated (kebab-case) tag names.
pub const SEPARATOR: char = '-';

/// Convert an identifier to its hyphenated, lowercase spelling.
///
/// A separator is inserted only where a lowercase letter or digit is
/// followed by an uppercase letter, so acronym runs stay together:
/// `ChildComponent1` becomes `child-component1`, `HTMLParser` becomes
/// `htmlparser`.
pub fn to_hyphenated(identifier: &str) -> String {
    let mut out = String::with_capacity(identifier.len() + 4);
    let mut previous: Option<char> = None;

    for ch in identifier.chars() {
        if ch.is_uppercase() {
            if let Some(prev) = previous {
                if prev.is_lowercase() || prev.is_ascii_digit() {
                    out.push(SEPARATOR);
                }
            }
            out.extend(ch.to_lowercase());
        } else {
            out.push(ch);
        }
        previous = Some(ch);
    }

    out
}

/// Convert a hyphenated spelling back to pascal form.
///
/// Splits on the separator and upper-cases the first letter of every
/// segment, so `child-component1` becomes `ChildComponent1`. Empty
/// segments (leading, trailing or doubled separators) are dropped.
pub fn to_camel_pascal(hyphenated: &str) -> String {
    let mut out = String::with_capacity(hyphenated.len());

    for segment in hyphenated.split(SEPARATOR) {
        let mut chars = segment.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
        }
    }

    out
}

/// Every spelling under which a component name may appear in markup.
///
/// Built once per rename. Order is stable and duplicates are removed, so
/// scanning the variants in order is deterministic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameVariants {
    variants: Vec<String>,
}

impl NameVariants {
    /// Derive the original spelling plus its hyphenated, pascal, lowercase
    /// and uppercase transforms.
    pub fn for_component(name: &str) -> Self {
        let hyphenated = to_hyphenated(name);
        let pascal = to_camel_pascal(&hyphenated);
        let candidates = [
            name.to_string(),
            hyphenated,
            pascal,
            name.to_lowercase(),
            name.to_uppercase(),
        ];

        let mut variants: Vec<String> = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            if !candidate.is_empty() && !variants.contains(&candidate) {
                variants.push(candidate);
            }
        }

        Self { variants }
    }

    /// Iterate the spellings in derivation order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.variants.iter().map(String::as_str)
    }
}
