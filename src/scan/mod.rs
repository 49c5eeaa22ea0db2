//! Pattern-based reference scanning.
//!
//! A [`Scanner`] runs a table of [`PatternSpec`] rows over one document and
//! emits tagged [`ReferenceCandidate`]s. Matches inside comments are always
//! dropped. In project mode matches inside string literals are dropped too,
//! except names a props/emits/expose declaration spells in quotes (array
//! elements, quoted keys, generic call signatures) and emit call arguments.

pub mod component;
pub mod declaration;
pub mod exclusion;
pub mod patterns;

pub use component::find_component_usages;
pub use declaration::DeclarationTarget;
pub use exclusion::ExclusionMap;
pub use patterns::{PatternKind, PatternSpec};

use crate::error::{Diagnostic, DiagnosticLevel, Result};
use crate::host::{DiagnosticSink, SourceFilter, Workspace};
use crate::text::{Document, Location, LocationKey};
use serde::Serialize;
use std::collections::HashSet;
use std::path::Path;

/// Which exclusion policy applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanMode {
    /// Cross-file scan: comments and strings are excluded.
    Project,
    /// Scan of the file being edited: only comments are excluded.
    CurrentFile,
}

/// Scanner tunables.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Which workspace files take part in a project scan.
    pub filter: SourceFilter,
    /// Bytes of lookbehind used to recognise a declaration array.
    pub string_window: usize,
    /// Extensions stripped from a file name to get its component name.
    pub component_extensions: Vec<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            filter: SourceFilter::default(),
            string_window: 100,
            component_extensions: ["vue", "jsx", "tsx", "js", "ts"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl ScanConfig {
    /// Component name a file defines, derived from its file name.
    ///
    /// Returns `None` when the extension is not a component extension.
    pub fn component_name(&self, file: &Path) -> Option<String> {
        let extension = file.extension()?.to_str()?;
        if !self
            .component_extensions
            .iter()
            .any(|e| e.eq_ignore_ascii_case(extension))
        {
            return None;
        }
        let stem = file.file_stem()?.to_str()?;
        (!stem.is_empty()).then(|| stem.to_string())
    }
}

/// A location that matched one pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReferenceCandidate {
    /// Where the name was found.
    pub location: Location,
    /// The construct it was found in.
    pub kind: PatternKind,
}

impl ReferenceCandidate {
    /// Deduplication key of the candidate's location.
    pub fn key(&self) -> LocationKey {
        self.location.key()
    }
}

/// A compiled pattern table plus its exclusion policy.
#[derive(Debug, Clone)]
pub struct Scanner {
    patterns: Vec<PatternSpec>,
    mode: ScanMode,
    string_window: usize,
}

impl Scanner {
    /// Build a scanner from an explicit table.
    pub fn new(patterns: Vec<PatternSpec>, mode: ScanMode, string_window: usize) -> Self {
        Self {
            patterns,
            mode,
            string_window,
        }
    }

    /// Scanner for a cross-file search of `name`.
    pub fn project(name: &str, config: &ScanConfig) -> Result<Self> {
        Ok(Self::new(
            patterns::project_patterns(name)?,
            ScanMode::Project,
            config.string_window,
        ))
    }

    /// Scanner for `name` inside the file being edited.
    pub fn current_file(name: &str) -> Result<Self> {
        Ok(Self::new(
            patterns::current_file_patterns(name)?,
            ScanMode::CurrentFile,
            0,
        ))
    }

    /// Every accepted candidate in `document`, one per location.
    ///
    /// When several rows capture the same location the earlier row wins.
    pub fn scan(&self, document: &Document) -> Vec<ReferenceCandidate> {
        let text = document.text();
        let exclusions = ExclusionMap::build(text);
        let mut seen: HashSet<LocationKey> = HashSet::new();
        let mut found = Vec::new();

        for pattern in &self.patterns {
            for (start, end) in pattern.captures(text) {
                if !pattern.validates(text, start, end) {
                    continue;
                }
                if self.excluded(text, &exclusions, pattern, start) {
                    continue;
                }
                let location = document.location(start, end);
                if seen.insert(location.key()) {
                    found.push(ReferenceCandidate {
                        location,
                        kind: pattern.kind,
                    });
                }
            }
        }

        log::debug!(
            "Scanned {}: {} candidate(s)",
            document.path().display(),
            found.len()
        );
        found
    }

    fn excluded(
        &self,
        text: &str,
        exclusions: &ExclusionMap,
        pattern: &PatternSpec,
        offset: usize,
    ) -> bool {
        let Some(region) = exclusions.region_at(offset) else {
            return false;
        };
        if region.kind.is_comment() {
            return true;
        }
        match self.mode {
            ScanMode::CurrentFile => false,
            ScanMode::Project => {
                !pattern.quoted_capture
                    && !exclusion::in_declaration_array(text, offset, self.string_window)
            }
        }
    }
}

/// Scan the whole workspace for `name`.
///
/// Files are visited one at a time in enumeration order. An unreadable file
/// is recorded as a warning and skipped.
pub fn find_all_text_references(
    name: &str,
    workspace: &dyn Workspace,
    config: &ScanConfig,
    sink: &mut dyn DiagnosticSink,
) -> Result<Vec<ReferenceCandidate>> {
    let scanner = Scanner::project(name, config)?;
    scan_files(&scanner, workspace, &workspace.find_files(&config.filter)?, sink)
}

/// Scan only the document being edited, with identifier fallback.
pub fn find_all_references_in_current_file(
    document: &Document,
    name: &str,
) -> Result<Vec<ReferenceCandidate>> {
    Ok(Scanner::current_file(name)?.scan(document))
}

pub(crate) fn scan_files(
    scanner: &Scanner,
    workspace: &dyn Workspace,
    files: &[std::path::PathBuf],
    sink: &mut dyn DiagnosticSink,
) -> Result<Vec<ReferenceCandidate>> {
    let mut candidates = Vec::new();
    for file in files {
        match workspace.read(file) {
            Ok(text) => candidates.extend(scanner.scan(&Document::new(file.clone(), text))),
            Err(err) => sink.record(
                Diagnostic::new(DiagnosticLevel::Warning, format!("Skipping file: {err}"))
                    .with_file(file.clone()),
            ),
        }
    }
    Ok(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::Position;

    fn texts(doc: &Document, candidates: &[ReferenceCandidate]) -> Vec<String> {
        candidates
            .iter()
            .map(|c| doc.text_in(&c.location.range).unwrap().to_string())
            .collect()
    }

    #[test]
    fn test_markup_comment_yields_nothing() {
        let doc = Document::new("/w/A.vue", "<template>\n  <!-- :a1=\"x\" -->\n</template>");
        let scanner = Scanner::project("a1", &ScanConfig::default()).unwrap();
        assert!(scanner.scan(&doc).is_empty());
    }

    #[test]
    fn test_plain_string_yields_nothing() {
        let doc = Document::new("/w/a.js", "const label = \"a1\";\nconsole.log('a1')");
        let scanner = Scanner::project("a1", &ScanConfig::default()).unwrap();
        assert!(scanner.scan(&doc).is_empty());
    }

    #[test]
    fn test_quoted_declaration_keys_are_kept() {
        let doc = Document::new(
            "/w/A.vue",
            "<script setup>\ndefineProps({ 'a1': String, b1: Number })\n</script>",
        );
        let scanner = Scanner::project("a1", &ScanConfig::default()).unwrap();
        let found = scanner.scan(&doc);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].kind, PatternKind::PropsDeclaration);
        assert_eq!(found[0].location.range.start, Position::new(1, 15));
    }

    #[test]
    fn test_declaration_array_yields_one() {
        let doc = Document::new("/w/A.vue", "<script setup>\ndefineProps(['a1'])\n</script>");
        let scanner = Scanner::project("a1", &ScanConfig::default()).unwrap();
        let found = scanner.scan(&doc);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].kind, PatternKind::PropsDeclaration);
        assert_eq!(found[0].location.range.start.line, 1);
    }

    #[test]
    fn test_partial_tokens_are_rejected() {
        let doc = Document::new("/w/A.vue", "<p>{{ data1 }}</p>");
        let scanner = Scanner::project("a1", &ScanConfig::default()).unwrap();
        assert!(scanner.scan(&doc).is_empty());
    }

    #[test]
    fn test_one_candidate_per_location() {
        // `v-bind:a1=` is matched by both the v-bind and shorthand rows.
        let doc = Document::new("/w/A.vue", "<Child v-bind:a1=\"x\" />");
        let scanner = Scanner::project("a1", &ScanConfig::default()).unwrap();
        let found = scanner.scan(&doc);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].kind, PatternKind::VBind);
    }

    #[test]
    fn test_current_file_mode_keeps_attribute_values() {
        let text = "<template>\n  <button @click=\"inc\">{{ count }}</button>\n</template>\n<script setup>\nfunction inc() {}\n// inc is unused here\n</script>";
        let doc = Document::new("/w/A.vue", text);
        let found = find_all_references_in_current_file(&doc, "inc").unwrap();
        assert_eq!(texts(&doc, &found), vec!["inc", "inc"]);
        assert!(found.iter().all(|c| c.kind == PatternKind::Identifier));
    }

    #[test]
    fn test_component_name() {
        let config = ScanConfig::default();
        assert_eq!(
            config.component_name(Path::new("/w/src/ChildComponent1.vue")),
            Some("ChildComponent1".to_string())
        );
        assert_eq!(config.component_name(Path::new("/w/README.md")), None);
    }
}
