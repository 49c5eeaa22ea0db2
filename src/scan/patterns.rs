//! Data-driven reference patterns.
//!
//! Every rule the scanner knows is a [`PatternSpec`]: a kind tag, a matcher,
//! the needle the capture must spell, and two flags. Adding a syntax means
//! adding a row to one of the tables below.

use super::declaration::{find_declared, DeclarationTarget};
use crate::error::{RenameError, Result};
use crate::text::is_word_bounded;
use regex::{Regex, RegexBuilder};
use serde::Serialize;

/// Syntactic construct a candidate was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PatternKind {
    /// `:name=` shorthand binding.
    PropBinding,
    /// `v-bind:name=`.
    VBind,
    /// `v-model:name=`.
    VModel,
    /// `v-slot:name`.
    VSlot,
    /// `#name` slot shorthand.
    SlotShorthand,
    /// `{{ ... name ... }}`.
    Interpolation,
    /// `name=` attribute without binding prefix.
    BareAttribute,
    /// `v-bind="{ name }"` object spread.
    ObjectSpread,
    /// Props declaration (`defineProps`).
    PropsDeclaration,
    /// Emits declaration (`defineEmits`).
    EmitsDeclaration,
    /// Expose declaration (`defineExpose`).
    ExposeDeclaration,
    /// `props:` / `emits:` component option.
    OptionsDeclaration,
    /// `emit('name')` / `$emit('name')`.
    EmitCall,
    /// `@name=`.
    EventListener,
    /// `v-on:name=`.
    VOn,
    /// `name:` object key.
    ObjectKey,
    /// `.name(` method call.
    MethodCall,
    /// Any other whole-word occurrence.
    Identifier,
    /// `<Name` opening or `</Name>` closing tag.
    ComponentTag,
    /// `:is="'Name'"`, `resolveComponent('Name')`, `component: 'Name'`.
    DynamicComponent,
    /// `import Name from` or `from '.../Name'`.
    ComponentImport,
    /// `Name,` or `'name': Name` in a components map.
    ComponentRegistration,
}

impl PatternKind {
    /// Short label used in reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            PatternKind::PropBinding => "prop-binding",
            PatternKind::VBind => "v-bind",
            PatternKind::VModel => "v-model",
            PatternKind::VSlot => "v-slot",
            PatternKind::SlotShorthand => "slot-shorthand",
            PatternKind::Interpolation => "interpolation",
            PatternKind::BareAttribute => "bare-attribute",
            PatternKind::ObjectSpread => "object-spread",
            PatternKind::PropsDeclaration => "props-declaration",
            PatternKind::EmitsDeclaration => "emits-declaration",
            PatternKind::ExposeDeclaration => "expose-declaration",
            PatternKind::OptionsDeclaration => "options-declaration",
            PatternKind::EmitCall => "emit-call",
            PatternKind::EventListener => "event-listener",
            PatternKind::VOn => "v-on",
            PatternKind::ObjectKey => "object-key",
            PatternKind::MethodCall => "method-call",
            PatternKind::Identifier => "identifier",
            PatternKind::ComponentTag => "component-tag",
            PatternKind::DynamicComponent => "dynamic-component",
            PatternKind::ComponentImport => "component-import",
            PatternKind::ComponentRegistration => "component-registration",
        }
    }
}

/// How a pattern locates its capture.
#[derive(Debug, Clone)]
pub enum Matcher {
    /// A regex and the index of the group that holds the name.
    Regex {
        /// Compiled expression.
        regex: Regex,
        /// Capture group holding the name.
        group: usize,
    },
    /// Whole-word occurrences inside every `{{ ... }}` span.
    Interpolation {
        /// Locates the interpolation spans; group 1 is the inner text.
        spans: Regex,
    },
    /// Declared names inside a props/emits/expose argument.
    Declaration(DeclarationTarget),
}

/// One scanning rule.
#[derive(Debug, Clone)]
pub struct PatternSpec {
    /// Construct tag attached to every candidate.
    pub kind: PatternKind,
    /// The spelling the capture must equal (ignoring case).
    pub needle: String,
    /// How to find captures.
    pub matcher: Matcher,
    /// Reject captures glued to identifier characters.
    pub requires_word_boundary: bool,
    /// The capture may sit inside quotes by construction (an `emit('x')`
    /// argument, a quoted declaration key or element), so string exclusion
    /// does not apply. Comment exclusion still does.
    pub quoted_capture: bool,
}

/// Modifier suffixes such as `.sync` or `.stop.prevent`.
const MODIFIERS: &str = r"(?:\.[\w-]+)*";

impl PatternSpec {
    fn regex(
        kind: PatternKind,
        needle: &str,
        source: &str,
        case_insensitive: bool,
        requires_word_boundary: bool,
        quoted_capture: bool,
    ) -> Result<Self> {
        let regex = compile(needle, source, case_insensitive)?;
        Ok(Self {
            kind,
            needle: needle.to_string(),
            matcher: Matcher::Regex { regex, group: 1 },
            requires_word_boundary,
            quoted_capture,
        })
    }

    fn interpolation(needle: &str) -> Result<Self> {
        Ok(Self {
            kind: PatternKind::Interpolation,
            needle: needle.to_string(),
            matcher: Matcher::Interpolation {
                spans: compile(needle, r"(?s)\{\{(.*?)\}\}", false)?,
            },
            requires_word_boundary: true,
            quoted_capture: false,
        })
    }

    fn declaration(kind: PatternKind, needle: &str, target: DeclarationTarget) -> Self {
        Self {
            kind,
            needle: needle.to_string(),
            matcher: Matcher::Declaration(target),
            requires_word_boundary: true,
            quoted_capture: true,
        }
    }

    /// Raw byte spans of every capture in `text`, before validation.
    pub fn captures(&self, text: &str) -> Vec<(usize, usize)> {
        match &self.matcher {
            Matcher::Regex { regex, group } => regex
                .captures_iter(text)
                .filter_map(|caps| caps.get(*group))
                .map(|m| (m.start(), m.end()))
                .collect(),
            Matcher::Interpolation { spans } => spans
                .captures_iter(text)
                .filter_map(|caps| caps.get(1))
                .flat_map(|inner| {
                    word_occurrences(inner.as_str(), &self.needle)
                        .into_iter()
                        .map(move |(s, e)| (inner.start() + s, inner.start() + e))
                })
                .collect(),
            Matcher::Declaration(target) => find_declared(text, *target, &self.needle),
        }
    }

    /// Post-match check: the span spells the needle and, when required, is
    /// word-bounded.
    pub fn validates(&self, text: &str, start: usize, end: usize) -> bool {
        let Some(found) = text.get(start..end) else {
            return false;
        };
        found.eq_ignore_ascii_case(&self.needle)
            && (!self.requires_word_boundary || is_word_bounded(text, start, end))
    }
}

fn compile(name: &str, source: &str, case_insensitive: bool) -> Result<Regex> {
    RegexBuilder::new(source)
        .case_insensitive(case_insensitive)
        .build()
        .map_err(|source| RenameError::Pattern {
            name: name.to_string(),
            source,
        })
}

/// Whole-word, case-sensitive occurrences of `needle` in `haystack`.
pub fn word_occurrences(haystack: &str, needle: &str) -> Vec<(usize, usize)> {
    if needle.is_empty() {
        return Vec::new();
    }
    haystack
        .match_indices(needle)
        .map(|(start, _)| (start, start + needle.len()))
        .filter(|(start, end)| is_word_bounded(haystack, *start, *end))
        .collect()
}

/// Patterns for the project-wide scan of one symbol.
///
/// Markup syntaxes match case-insensitively; script syntaxes are
/// case-sensitive.
pub fn project_patterns(name: &str) -> Result<Vec<PatternSpec>> {
    let n = regex::escape(name);
    Ok(vec![
        PatternSpec::regex(
            PatternKind::VBind,
            name,
            &format!(r"v-bind:({n}){MODIFIERS}\s*="),
            true,
            false,
            false,
        )?,
        PatternSpec::regex(
            PatternKind::VModel,
            name,
            &format!(r"v-model:({n}){MODIFIERS}\s*="),
            true,
            false,
            false,
        )?,
        PatternSpec::regex(
            PatternKind::VOn,
            name,
            &format!(r"v-on:({n}){MODIFIERS}\s*="),
            true,
            false,
            false,
        )?,
        PatternSpec::regex(
            PatternKind::PropBinding,
            name,
            &format!(r":\s*({n}){MODIFIERS}\s*="),
            true,
            false,
            false,
        )?,
        PatternSpec::regex(
            PatternKind::VSlot,
            name,
            &format!(r"v-slot:({n})"),
            true,
            true,
            false,
        )?,
        PatternSpec::regex(
            PatternKind::SlotShorthand,
            name,
            &format!(r"#({n})(?:\s|>|=)"),
            true,
            false,
            false,
        )?,
        PatternSpec::regex(
            PatternKind::EventListener,
            name,
            &format!(r"@({n}){MODIFIERS}\s*="),
            true,
            false,
            false,
        )?,
        PatternSpec::interpolation(name)?,
        PatternSpec::declaration(PatternKind::PropsDeclaration, name, DeclarationTarget::Props),
        PatternSpec::declaration(PatternKind::EmitsDeclaration, name, DeclarationTarget::Emits),
        PatternSpec::declaration(PatternKind::ExposeDeclaration, name, DeclarationTarget::Expose),
        PatternSpec::declaration(
            PatternKind::OptionsDeclaration,
            name,
            DeclarationTarget::PropsOption,
        ),
        PatternSpec::declaration(
            PatternKind::OptionsDeclaration,
            name,
            DeclarationTarget::EmitsOption,
        ),
        PatternSpec::regex(
            PatternKind::EmitCall,
            name,
            &format!(r#"emit\s*\(\s*['"]({n})['"]"#),
            false,
            false,
            true,
        )?,
    ])
}

/// Patterns for a single-file scan: the project set plus catch-all
/// script syntaxes. Everything is case-sensitive here.
///
/// The catch-all [`PatternKind::Identifier`] row comes last so that more
/// specific kinds win when two rows capture the same location.
pub fn current_file_patterns(name: &str) -> Result<Vec<PatternSpec>> {
    let n = regex::escape(name);
    let mut patterns = project_patterns(name)?;
    for pattern in &mut patterns {
        if let Matcher::Regex { regex, .. } = &mut pattern.matcher {
            *regex = compile(name, regex.as_str(), false)?;
        }
    }

    patterns.push(PatternSpec::regex(
        PatternKind::MethodCall,
        name,
        &format!(r"\.({n})\s*\("),
        false,
        true,
        false,
    )?);
    patterns.push(PatternSpec::regex(
        PatternKind::ObjectKey,
        name,
        &format!(r"({n})\s*:"),
        false,
        true,
        false,
    )?);
    patterns.push(PatternSpec::regex(
        PatternKind::BareAttribute,
        name,
        &format!(r"\s({n})\s*="),
        false,
        true,
        false,
    )?);
    patterns.push(PatternSpec::regex(
        PatternKind::Identifier,
        name,
        &format!(r"({n})"),
        false,
        true,
        false,
    )?);
    Ok(patterns)
}

/// Patterns locating usages of a component under one spelling.
pub fn component_patterns(variant: &str) -> Result<Vec<PatternSpec>> {
    let v = regex::escape(variant);
    Ok(vec![
        PatternSpec::regex(
            PatternKind::ComponentTag,
            variant,
            &format!(r"<({v})(?:\s|>|/)"),
            true,
            false,
            false,
        )?,
        PatternSpec::regex(
            PatternKind::ComponentTag,
            variant,
            &format!(r"</({v})\s*>"),
            true,
            false,
            false,
        )?,
        PatternSpec::regex(
            PatternKind::DynamicComponent,
            variant,
            &format!(r#"component\s*:\s*['"]({v})['"]"#),
            true,
            false,
            true,
        )?,
        PatternSpec::regex(
            PatternKind::DynamicComponent,
            variant,
            &format!(r#":is\s*=\s*["']'({v})'["']"#),
            true,
            false,
            true,
        )?,
        PatternSpec::regex(
            PatternKind::DynamicComponent,
            variant,
            &format!(r#"resolveComponent\s*\(\s*['"]({v})['"]"#),
            true,
            false,
            true,
        )?,
        PatternSpec::regex(
            PatternKind::ComponentImport,
            variant,
            &format!(r"import\s+({v})\s+from"),
            true,
            true,
            false,
        )?,
        PatternSpec::regex(
            PatternKind::ComponentImport,
            variant,
            &format!(r#"from\s*['"][^'"\n]*?/({v})(?:\.(?:vue|jsx|tsx|js|ts))?['"]"#),
            true,
            false,
            true,
        )?,
        PatternSpec::regex(
            PatternKind::ComponentRegistration,
            variant,
            &format!(r#"['"]({v})['"]\s*:\s*\w+"#),
            true,
            false,
            true,
        )?,
        PatternSpec::regex(
            PatternKind::ComponentRegistration,
            variant,
            &format!(r"({v})\s*,\s*\r?\n"),
            true,
            true,
            false,
        )?,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spans(pattern: &PatternSpec, text: &str) -> Vec<String> {
        pattern
            .captures(text)
            .into_iter()
            .filter(|(s, e)| pattern.validates(text, *s, *e))
            .map(|(s, e)| text[s..e].to_string())
            .collect()
    }

    fn find(patterns: &[PatternSpec], kind: PatternKind) -> &PatternSpec {
        patterns.iter().find(|p| p.kind == kind).unwrap()
    }

    #[test]
    fn test_binding_patterns() {
        let patterns = project_patterns("a1").unwrap();
        let text = r#"<Child :a1="x" v-model:a1="y" @a1.stop="z" />"#;
        assert_eq!(spans(find(&patterns, PatternKind::PropBinding), text).len(), 2);
        assert_eq!(spans(find(&patterns, PatternKind::VModel), text), vec!["a1"]);
        assert_eq!(spans(find(&patterns, PatternKind::EventListener), text), vec!["a1"]);
    }

    #[test]
    fn test_interpolation_requires_whole_words() {
        let patterns = project_patterns("a1").unwrap();
        let text = "<p>{{ a1 + data1 }} {{ props.a1 }}</p>";
        let found = find(&patterns, PatternKind::Interpolation).captures(text);
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|(s, e)| &text[*s..*e] == "a1"));
    }

    #[test]
    fn test_emit_call() {
        let patterns = project_patterns("change").unwrap();
        let text = "emit('change', 1); $emit(\"change\")";
        assert_eq!(spans(find(&patterns, PatternKind::EmitCall), text).len(), 2);
    }

    #[test]
    fn test_name_is_escaped() {
        let patterns = current_file_patterns("$refs").unwrap();
        let text = "this.$refs.a; const x = $refsX";
        assert_eq!(spans(find(&patterns, PatternKind::Identifier), text), vec!["$refs"]);
    }

    #[test]
    fn test_component_patterns() {
        let patterns = component_patterns("child-component1").unwrap();
        let text = "<child-component1 :a1=\"x\"></child-component1>";
        let tags: usize = patterns
            .iter()
            .filter(|p| p.kind == PatternKind::ComponentTag)
            .map(|p| spans(p, text).len())
            .sum();
        assert_eq!(tags, 2);

        let patterns = component_patterns("ChildComponent1").unwrap();
        let text = "import ChildComponent1 from './ChildComponent1.vue'";
        let imports: usize = patterns
            .iter()
            .filter(|p| p.kind == PatternKind::ComponentImport)
            .map(|p| spans(p, text).len())
            .sum();
        assert_eq!(imports, 2);
    }
}
