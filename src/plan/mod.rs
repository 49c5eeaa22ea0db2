//! Edit planning.
//!
//! Turns merged references into per-file text edits. Within a file edits are
//! ordered from the end of the file backwards so applying one never shifts
//! the position of another, and no two edits overlap.
//!
//! Every reference is re-checked against the current text. If the name is
//! no longer at its range, the construct the scanner saw is looked for on
//! the same line; failing that the whole line is rewritten; if that changes
//! nothing either, the reference is dropped with a warning.

pub mod rewrite;

use crate::error::{Diagnostic, DiagnosticLevel};
use crate::host::{DiagnosticSink, Workspace};
use crate::resolve::Reference;
use crate::scan::PatternKind;
use crate::text::{Document, Range};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::PathBuf;

/// How an edit was derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "kind", rename_all = "snake_case")]
pub enum EditStrategy {
    /// The name was found at the reference range.
    Direct,
    /// The range went stale and the construct was found again on its line.
    Syntax(PatternKind),
    /// Whole-line word replacement after the range went stale.
    LineRewrite,
}

/// Replace `range` with `new_text`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextEdit {
    /// Span being replaced.
    pub range: Range,
    /// Replacement text.
    pub new_text: String,
    /// How the edit was derived.
    pub strategy: EditStrategy,
}

impl TextEdit {
    /// An edit replacing the name found exactly at `range`.
    pub fn direct(range: Range, new_text: impl Into<String>) -> Self {
        Self {
            range,
            new_text: new_text.into(),
            strategy: EditStrategy::Direct,
        }
    }
}

/// The edits for one file, ordered from last to first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileEdits {
    /// Target file.
    pub file: PathBuf,
    /// Edits in descending position order.
    pub edits: Vec<TextEdit>,
}

/// Every edit of one rename.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EditPlan {
    old_name: String,
    new_name: String,
    files: Vec<FileEdits>,
    dropped: usize,
}

impl EditPlan {
    /// Assemble a plan from prepared file edits.
    pub fn from_files(
        old_name: impl Into<String>,
        new_name: impl Into<String>,
        files: Vec<FileEdits>,
    ) -> Self {
        Self {
            old_name: old_name.into(),
            new_name: new_name.into(),
            files,
            dropped: 0,
        }
    }

    /// Name being replaced.
    pub fn old_name(&self) -> &str {
        &self.old_name
    }

    /// Replacement name.
    pub fn new_name(&self) -> &str {
        &self.new_name
    }

    /// Edits grouped by file, in file order.
    pub fn files(&self) -> &[FileEdits] {
        &self.files
    }

    /// Edits for one file.
    pub fn edits_for(&self, file: &std::path::Path) -> Option<&FileEdits> {
        self.files.iter().find(|f| f.file == file)
    }

    /// Total number of edits across files.
    pub fn total_edits(&self) -> usize {
        self.files.iter().map(|f| f.edits.len()).sum()
    }

    /// Number of files with at least one edit.
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// References dropped because neither strategy could rewrite them.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// True when there is nothing to change.
    pub fn is_empty(&self) -> bool {
        self.total_edits() == 0
    }
}

/// Plan a project-wide rename.
///
/// References are grouped by file and each file is read through
/// `workspace`. An unreadable file is skipped with a warning.
pub fn build_edit_plan(
    references: &[Reference],
    old_name: &str,
    new_name: &str,
    workspace: &dyn Workspace,
    sink: &mut dyn DiagnosticSink,
) -> EditPlan {
    let mut by_file: BTreeMap<PathBuf, Vec<&Reference>> = BTreeMap::new();
    for reference in references {
        by_file
            .entry(reference.location.file.clone())
            .or_default()
            .push(reference);
    }

    let mut plan = EditPlan::from_files(old_name, new_name, Vec::new());
    for (file, refs) in by_file {
        let text = match workspace.read(&file) {
            Ok(text) => text,
            Err(err) => {
                sink.record(
                    Diagnostic::new(DiagnosticLevel::Warning, format!("Skipping file: {err}"))
                        .with_file(file.clone()),
                );
                plan.dropped += refs.len();
                continue;
            }
        };
        let document = Document::new(file, text);
        plan_file(&mut plan, &document, refs, sink);
    }

    log::debug!(
        "Planned {} edit(s) in {} file(s), {} dropped",
        plan.total_edits(),
        plan.file_count(),
        plan.dropped
    );
    plan
}

/// Plan a rename confined to `document`.
///
/// References in other files are ignored.
pub fn build_local_edit_plan(
    document: &Document,
    references: &[Reference],
    old_name: &str,
    new_name: &str,
    sink: &mut dyn DiagnosticSink,
) -> EditPlan {
    let refs: Vec<&Reference> = references
        .iter()
        .filter(|r| r.location.file == document.path())
        .collect();
    let mut plan = EditPlan::from_files(old_name, new_name, Vec::new());
    plan_file(&mut plan, document, refs, sink);
    plan
}

fn plan_file(
    plan: &mut EditPlan,
    document: &Document,
    mut refs: Vec<&Reference>,
    sink: &mut dyn DiagnosticSink,
) {
    refs.sort_by(|a, b| b.location.range.cmp(&a.location.range));

    let mut ranges: HashSet<Range> = HashSet::new();
    let mut edits = Vec::new();

    for reference in refs {
        let range = reference.location.range;
        if !ranges.insert(range) {
            continue;
        }
        match edit_for(document, reference, &plan.old_name, &plan.new_name) {
            Some(edit) => edits.push(edit),
            None => {
                plan.dropped += 1;
                sink.record(
                    Diagnostic::new(
                        DiagnosticLevel::Warning,
                        format!("Dropped stale reference to '{}'", plan.old_name),
                    )
                    .with_file(document.path())
                    .with_line(range.start.line),
                );
            }
        }
    }

    let edits = resolve_conflicts(edits);
    if !edits.is_empty() {
        plan.files.push(FileEdits {
            file: document.path().to_path_buf(),
            edits,
        });
    }
}

fn edit_for(document: &Document, reference: &Reference, old: &str, new: &str) -> Option<TextEdit> {
    let range = &reference.location.range;

    if document
        .text_in(range)
        .is_ok_and(|found| found.eq_ignore_ascii_case(old))
    {
        return Some(TextEdit::direct(*range, new));
    }

    if let Some(kind) = reference.origin.kind() {
        if let Some(edit) = rewrite::syntax_edit(document, range, kind, old, new) {
            log::debug!(
                "Stale range at {}:{}, relocated {}",
                document.path().display(),
                range.start.line + 1,
                kind.as_str()
            );
            return Some(edit);
        }
    }

    let line = range.start.line;
    let rewritten = rewrite::rewrite_line(document.line_text(line)?, old, new)?;
    log::debug!(
        "Stale range at {}:{}, rewriting line",
        document.path().display(),
        line + 1
    );
    Some(TextEdit {
        range: document.line_range(line)?,
        new_text: rewritten,
        strategy: EditStrategy::LineRewrite,
    })
}

/// Drop edits shadowed by a line rewrite or overlapping an earlier one,
/// then order what is left from last to first.
fn resolve_conflicts(edits: Vec<TextEdit>) -> Vec<TextEdit> {
    let rewritten_lines: BTreeSet<usize> = edits
        .iter()
        .filter(|e| e.strategy == EditStrategy::LineRewrite)
        .map(|e| e.range.start.line)
        .collect();

    let mut kept: Vec<TextEdit> = edits
        .into_iter()
        .filter(|e| {
            e.strategy == EditStrategy::LineRewrite || !rewritten_lines.contains(&e.range.start.line)
        })
        .collect();
    kept.sort_by(|a, b| a.range.cmp(&b.range));

    let mut result: Vec<TextEdit> = Vec::with_capacity(kept.len());
    for edit in kept {
        if result.last().is_some_and(|prev| prev.range.overlaps(&edit.range) || prev.range == edit.range) {
            log::debug!("Skipping overlapping edit at line {}", edit.range.start.line + 1);
            continue;
        }
        result.push(edit);
    }
    result.reverse();
    result
}
