//! Collaborators the rename engine is driven through.
//!
//! The engine never touches an editor directly. Reference lookup, file
//! enumeration, edit application and operator prompts are traits, so the
//! same command runs against the filesystem host in [`fs`], the CLI, or
//! in-memory stubs in tests.

pub mod fs;

pub use fs::{FsEditApplier, FsWorkspace};

use crate::error::{Diagnostic, DiagnosticLevel, Result};
use crate::plan::EditPlan;
use crate::rename::{RenameScope, ScopeEvidence};
use crate::text::{Location, Position};
use serde::Serialize;
use std::path::{Component, Path, PathBuf};

/// Which files a workspace scan visits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFilter {
    /// File extensions (without dot) to include.
    pub extensions: Vec<String>,
    /// Directory names whose subtrees are skipped.
    pub excluded_dirs: Vec<String>,
}

impl Default for SourceFilter {
    fn default() -> Self {
        Self {
            extensions: ["vue", "js", "ts", "jsx", "tsx"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            excluded_dirs: ["node_modules", "dist", "build", ".git"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl SourceFilter {
    /// True if any directory component of `path` (relative to `root`) is
    /// excluded.
    pub fn is_excluded(&self, root: &Path, path: &Path) -> bool {
        let relative = path.strip_prefix(root).unwrap_or(path);
        relative.components().any(|component| match component {
            Component::Normal(name) => self
                .excluded_dirs
                .iter()
                .any(|dir| name.to_str() == Some(dir.as_str())),
            _ => false,
        })
    }

    /// True if `path` has one of the included extensions.
    pub fn has_source_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
    }
}

/// Receiver for diagnostic records.
pub trait DiagnosticSink {
    /// Record one diagnostic.
    fn record(&mut self, diagnostic: Diagnostic);
}

/// Forwards diagnostics to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn record(&mut self, diagnostic: Diagnostic) {
        let location = diagnostic
            .file
            .as_ref()
            .map(|f| match diagnostic.line {
                Some(line) => format!(" ({}:{})", f.display(), line + 1),
                None => format!(" ({})", f.display()),
            })
            .unwrap_or_default();
        match diagnostic.level {
            DiagnosticLevel::Debug => log::debug!("{}{}", diagnostic.message, location),
            DiagnosticLevel::Info => log::info!("{}{}", diagnostic.message, location),
            DiagnosticLevel::Warning => log::warn!("{}{}", diagnostic.message, location),
            DiagnosticLevel::Error => log::error!("{}{}", diagnostic.message, location),
        }
    }
}

/// Keeps diagnostics in memory.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    entries: Vec<Diagnostic>,
}

impl MemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything recorded so far.
    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    /// Records at `level` or above.
    pub fn at_least(&self, level: DiagnosticLevel) -> Vec<&Diagnostic> {
        self.entries.iter().filter(|d| d.level >= level).collect()
    }
}

impl DiagnosticSink for MemorySink {
    fn record(&mut self, diagnostic: Diagnostic) {
        self.entries.push(diagnostic);
    }
}

/// Editor-native symbol lookup.
pub trait ReferenceProvider {
    /// Locations referring to the symbol at `position`.
    fn references(&self, file: &Path, position: Position) -> Result<Vec<Location>>;

    /// Locations defining the symbol at `position`.
    fn definitions(&self, file: &Path, position: Position) -> Result<Vec<Location>>;
}

/// A provider that knows nothing; the engine then relies on scanning.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullReferenceProvider;

impl ReferenceProvider for NullReferenceProvider {
    fn references(&self, _file: &Path, _position: Position) -> Result<Vec<Location>> {
        Ok(Vec::new())
    }

    fn definitions(&self, _file: &Path, _position: Position) -> Result<Vec<Location>> {
        Ok(Vec::new())
    }
}

/// Project folder access.
pub trait Workspace {
    /// Source files matching `filter`, in a stable order.
    fn find_files(&self, filter: &SourceFilter) -> Result<Vec<PathBuf>>;

    /// Current text of a file.
    fn read(&self, path: &Path) -> Result<String>;
}

/// A file whose edits could not be applied or saved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileFailure {
    /// The affected file.
    pub file: PathBuf,
    /// Why it failed.
    pub reason: String,
}

/// Outcome of applying an [`EditPlan`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApplyReport {
    /// Files whose edits were staged.
    pub applied: Vec<PathBuf>,
    /// Files left untouched because their edits failed validation.
    pub failed: Vec<FileFailure>,
}

/// Hashes of a file before and after a save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SaveSummary {
    /// The saved file.
    pub file: PathBuf,
    /// SHA-256 of the content before the rename.
    pub before_hash: String,
    /// SHA-256 of the saved content.
    pub after_hash: String,
}

/// Edit application and persistence.
pub trait EditApplier {
    /// Apply every file's edits. A file's edits land all together or not
    /// at all; one failing file does not stop the others.
    fn apply(&mut self, plan: &EditPlan) -> Result<ApplyReport>;

    /// Persist a file previously touched by [`EditApplier::apply`].
    fn save(&mut self, file: &Path) -> Result<SaveSummary>;
}

/// The human in the loop.
pub trait Operator {
    /// Ask for the replacement name. `None` cancels.
    fn ask_new_name(&mut self, old_name: &str) -> Option<String>;

    /// Ask whether an ambiguous rename is local or global. `None` cancels.
    fn choose_scope(&mut self, evidence: &ScopeEvidence) -> Option<RenameScope>;

    /// Show a short message.
    fn notify(&mut self, level: DiagnosticLevel, message: &str);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_filter_exclusions() {
        let filter = SourceFilter::default();
        let root = Path::new("/w");
        assert!(filter.is_excluded(root, Path::new("/w/node_modules/x/a.js")));
        assert!(filter.is_excluded(root, Path::new("/w/dist/a.js")));
        assert!(!filter.is_excluded(root, Path::new("/w/src/distance.ts")));
        assert!(filter.has_source_extension(Path::new("/w/src/App.VUE")));
        assert!(!filter.has_source_extension(Path::new("/w/src/App.css")));
    }

    #[test]
    fn test_memory_sink_levels() {
        let mut sink = MemorySink::new();
        sink.record(Diagnostic::new(DiagnosticLevel::Debug, "a"));
        sink.record(Diagnostic::new(DiagnosticLevel::Warning, "b"));
        sink.record(Diagnostic::new(DiagnosticLevel::Error, "c"));
        assert_eq!(sink.entries().len(), 3);
        assert_eq!(sink.at_least(DiagnosticLevel::Warning).len(), 2);
    }
}
