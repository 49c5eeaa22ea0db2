//! Prop and event flow from a component into the files that use it.
//!
//! For every file using the component, each tag of the component (under any
//! spelling) is inspected: the attribute part for a binding of the prop,
//! the inner content for interpolations of it.

use crate::error::{Diagnostic, DiagnosticLevel, RenameError, Result};
use crate::host::{DiagnosticSink, Workspace};
use crate::naming::NameVariants;
use crate::scan::component::usage_files;
use crate::scan::patterns::word_occurrences;
use crate::scan::{find_component_usages, ExclusionMap, PatternKind, ReferenceCandidate, ScanConfig};
use crate::text::{is_word_bounded, Document, LocationKey};
use regex::{Regex, RegexBuilder};
use std::collections::HashSet;

/// Binding syntaxes searched inside a tag's attribute text.
struct BindingRule {
    kind: PatternKind,
    regex: Regex,
}

/// Locations in consuming files where `prop` is passed to `component`.
///
/// # Arguments
/// * `component` - Component name, usually the declaring file's stem
/// * `prop` - Prop or event name being renamed
/// * `workspace` - Files to search
///
/// # Errors
/// Only pattern construction errors propagate; unreadable files are
/// recorded in `sink` and skipped.
pub fn analyze_props_transmission(
    component: &str,
    prop: &str,
    workspace: &dyn Workspace,
    config: &ScanConfig,
    sink: &mut dyn DiagnosticSink,
) -> Result<Vec<ReferenceCandidate>> {
    let usages = find_component_usages(component, workspace, config, sink)?;
    let files = usage_files(&usages);
    let variants = NameVariants::for_component(component);
    let bindings = binding_rules(prop)?;

    let mut seen: HashSet<LocationKey> = HashSet::new();
    let mut found = Vec::new();

    for file in files {
        let text = match workspace.read(&file) {
            Ok(text) => text,
            Err(err) => {
                sink.record(
                    Diagnostic::new(DiagnosticLevel::Warning, format!("Skipping file: {err}"))
                        .with_file(file.clone()),
                );
                continue;
            }
        };
        let document = Document::new(file, text);
        let exclusions = ExclusionMap::build(document.text());

        for variant in variants.iter() {
            for (start, end, kind) in tag_matches(&document, variant, prop, &bindings)? {
                if exclusions.in_comment(start) {
                    continue;
                }
                let location = document.location(start, end);
                if seen.insert(location.key()) {
                    found.push(ReferenceCandidate { location, kind });
                }
            }
        }
    }

    log::debug!(
        "Transmission of {prop} through {component}: {} location(s)",
        found.len()
    );
    Ok(found)
}

fn binding_rules(prop: &str) -> Result<Vec<BindingRule>> {
    let p = regex::escape(prop);
    let table = [
        (PatternKind::VBind, format!(r"v-bind:({p})(?:\.[\w-]+)*\s*=")),
        (PatternKind::VModel, format!(r"v-model:({p})(?:\.[\w-]+)*\s*=")),
        (PatternKind::VSlot, format!(r"v-slot:({p})")),
        (PatternKind::PropBinding, format!(r":({p})(?:\.[\w-]+)*\s*=")),
        (PatternKind::BareAttribute, format!(r"\s({p})\s*=")),
    ];
    table
        .into_iter()
        .map(|(kind, source)| Ok(BindingRule { kind, regex: compile(prop, &source)? }))
        .collect()
}

/// Absolute `(start, end, kind)` spans of `prop` on tags spelled `variant`.
fn tag_matches(
    document: &Document,
    variant: &str,
    prop: &str,
    bindings: &[BindingRule],
) -> Result<Vec<(usize, usize, PatternKind)>> {
    let text = document.text();
    let v = regex::escape(variant);
    let self_closing = compile(variant, &format!(r"(?s)<{v}(\s[^>]*?)?/>"))?;
    let paired = compile(variant, &format!(r"(?s)<{v}(\s[^>]*?)?>(.*?)</{v}\s*>"))?;
    let spread = compile(prop, r#"v-bind\s*=\s*["']\s*\{([^}]*)\}"#)?;

    let mut found = Vec::new();
    for regex in [&self_closing, &paired] {
        for caps in regex.captures_iter(text) {
            if let Some(attributes) = caps.get(1) {
                let base = attributes.start();
                let attrs = attributes.as_str();
                for rule in bindings {
                    for m in rule.regex.captures_iter(attrs).filter_map(|c| c.get(1)) {
                        if is_word_bounded(attrs, m.start(), m.end()) {
                            found.push((base + m.start(), base + m.end(), rule.kind));
                        }
                    }
                }
                for object in spread.captures_iter(attrs).filter_map(|c| c.get(1)) {
                    for (s, e) in word_occurrences(object.as_str(), prop) {
                        let offset = base + object.start();
                        found.push((offset + s, offset + e, PatternKind::ObjectSpread));
                    }
                }
            }
            if let Some(content) = caps.get(2) {
                found.extend(interpolations(content.as_str(), prop).into_iter().map(
                    |(s, e)| (content.start() + s, content.start() + e, PatternKind::Interpolation),
                ));
            }
        }
    }
    Ok(found)
}

fn interpolations(content: &str, prop: &str) -> Vec<(usize, usize)> {
    let mut found = Vec::new();
    let mut cursor = 0;
    while let Some(open) = content[cursor..].find("{{") {
        let inner_start = cursor + open + 2;
        let Some(close) = content[inner_start..].find("}}") else {
            break;
        };
        let inner = &content[inner_start..inner_start + close];
        found.extend(
            word_occurrences(inner, prop)
                .into_iter()
                .map(|(s, e)| (inner_start + s, inner_start + e)),
        );
        cursor = inner_start + close + 2;
    }
    found
}

fn compile(name: &str, source: &str) -> Result<Regex> {
    RegexBuilder::new(source)
        .case_insensitive(true)
        .build()
        .map_err(|source| RenameError::Pattern {
            name: name.to_string(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spans(text: &str, variant: &str, prop: &str) -> Vec<(String, PatternKind)> {
        let doc = Document::new("/w/App.vue", text);
        let rules = binding_rules(prop).unwrap();
        let mut out: Vec<(String, PatternKind)> = tag_matches(&doc, variant, prop, &rules)
            .unwrap()
            .into_iter()
            .map(|(s, e, k)| (text[s..e].to_string(), k))
            .collect();
        out.dedup();
        out
    }

    #[test]
    fn test_binding_syntaxes() {
        let found = spans("<Child :a1=\"x\" />", "Child", "a1");
        assert_eq!(found, vec![("a1".to_string(), PatternKind::PropBinding)]);

        let found = spans("<Child v-model:a1=\"x\"></Child>", "Child", "a1");
        assert!(found.contains(&("a1".to_string(), PatternKind::VModel)));

        let found = spans("<Child a1=\"static\" />", "Child", "a1");
        assert_eq!(found, vec![("a1".to_string(), PatternKind::BareAttribute)]);

        let found = spans("<Child v-bind=\"{ a1: x, b }\" />", "Child", "a1");
        assert_eq!(found, vec![("a1".to_string(), PatternKind::ObjectSpread)]);
    }

    #[test]
    fn test_content_interpolation() {
        let found = spans("<Child>{{ a1 }} and {{ data1 }}</Child>", "Child", "a1");
        assert_eq!(found, vec![("a1".to_string(), PatternKind::Interpolation)]);
    }

    #[test]
    fn test_other_components_are_ignored() {
        assert!(spans("<ChildOther :a1=\"x\" />", "Child", "a1").is_empty());
        assert!(spans("<Child :a10=\"x\" />", "Child", "a1").is_empty());
    }
}
