//! Filesystem-backed workspace and edit applier.

use super::{ApplyReport, EditApplier, FileFailure, SaveSummary, SourceFilter, Workspace};
use crate::error::{RenameError, Result};
use crate::plan::{EditPlan, FileEdits};
use crate::text::Document;
use glob::{glob_with, MatchOptions};
use ropey::Rope;
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// A workspace rooted at a directory on disk.
#[derive(Debug, Clone, Default)]
pub struct FsWorkspace {
    root: Option<PathBuf>,
}

impl FsWorkspace {
    /// Workspace rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    /// A host with no folder open: project scans find nothing.
    pub fn without_root() -> Self {
        Self { root: None }
    }
}

impl Workspace for FsWorkspace {
    fn find_files(&self, filter: &SourceFilter) -> Result<Vec<PathBuf>> {
        let Some(root) = &self.root else {
            return Ok(Vec::new());
        };
        let root_str = root.to_str().ok_or_else(|| {
            RenameError::Other(format!("Workspace root is not UTF-8: {}", root.display()))
        })?;
        let escaped = glob::Pattern::escape(root_str);
        // Extensions compare like `SourceFilter::has_source_extension`.
        let options = MatchOptions {
            case_sensitive: false,
            ..MatchOptions::default()
        };

        let mut files = BTreeSet::new();
        for extension in &filter.extensions {
            for entry in glob_with(&format!("{escaped}/**/*.{extension}"), options)? {
                let path = match entry {
                    Ok(path) => path,
                    Err(err) => {
                        log::warn!("Glob iteration error: {err}");
                        continue;
                    }
                };
                if path.is_dir() || filter.is_excluded(root, &path) {
                    continue;
                }
                files.insert(path);
            }
        }

        log::debug!("Workspace {}: {} source file(s)", root.display(), files.len());
        Ok(files.into_iter().collect())
    }

    fn read(&self, path: &Path) -> Result<String> {
        let bytes = std::fs::read(path).map_err(|e| RenameError::io(path, e))?;
        String::from_utf8(bytes).map_err(|_| RenameError::Utf8 {
            file: path.to_path_buf(),
        })
    }
}

struct StagedFile {
    original: Vec<u8>,
    updated: String,
}

/// Stages edits in memory and writes them atomically on save.
#[derive(Default)]
pub struct FsEditApplier {
    staged: BTreeMap<PathBuf, StagedFile>,
}

impl FsEditApplier {
    /// Create an applier with nothing staged.
    pub fn new() -> Self {
        Self::default()
    }

    /// Edited text of a file that has not been saved yet.
    pub fn staged_text(&self, file: &Path) -> Option<&str> {
        self.staged.get(file).map(|s| s.updated.as_str())
    }

    fn stage(&mut self, file_edits: &FileEdits) -> Result<()> {
        let file = &file_edits.file;
        let (original, current) = match self.staged.get(file) {
            Some(staged) => (staged.original.clone(), staged.updated.clone()),
            None => {
                let bytes = std::fs::read(file).map_err(|e| RenameError::io(file, e))?;
                let text = String::from_utf8(bytes.clone())
                    .map_err(|_| RenameError::Utf8 { file: file.clone() })?;
                (bytes, text)
            }
        };

        let document = Document::new(file.clone(), current);
        let mut spans = Vec::with_capacity(file_edits.edits.len());
        for edit in &file_edits.edits {
            let (start, end) = document.byte_span(&edit.range)?;
            spans.push((start, end, edit.new_text.as_str()));
        }
        validate_replacements(file, &mut spans)?;
        let updated = apply_replacements(document.text(), &spans);

        self.staged.insert(file.clone(), StagedFile { original, updated });
        Ok(())
    }
}

impl EditApplier for FsEditApplier {
    fn apply(&mut self, plan: &EditPlan) -> Result<ApplyReport> {
        let mut report = ApplyReport::default();
        for file_edits in plan.files() {
            match self.stage(file_edits) {
                Ok(()) => report.applied.push(file_edits.file.clone()),
                Err(err) => {
                    log::warn!("Edits for {} not applied: {err}", file_edits.file.display());
                    report.failed.push(FileFailure {
                        file: file_edits.file.clone(),
                        reason: err.to_string(),
                    });
                }
            }
        }
        Ok(report)
    }

    fn save(&mut self, file: &Path) -> Result<SaveSummary> {
        let staged = self
            .staged
            .remove(file)
            .ok_or_else(|| RenameError::Other(format!("No staged edits for {}", file.display())))?;

        write_atomic(file, staged.updated.as_bytes(), "sfc-rename")?;
        Ok(SaveSummary {
            file: file.to_path_buf(),
            before_hash: compute_hash(&staged.original),
            after_hash: compute_hash(staged.updated.as_bytes()),
        })
    }
}

/// SHA-256 of file contents, hex encoded.
pub fn compute_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Sorts `spans` descending and rejects overlaps.
fn validate_replacements(file: &Path, spans: &mut [(usize, usize, &str)]) -> Result<()> {
    spans.sort_by(|a, b| b.0.cmp(&a.0).then(b.1.cmp(&a.1)));

    let mut next_start: Option<usize> = None;
    for (start, end, _) in spans.iter() {
        if let Some(next) = next_start {
            if *end > next {
                return Err(RenameError::OverlappingEdits {
                    file: file.to_path_buf(),
                });
            }
        }
        next_start = Some(*start);
    }
    Ok(())
}

/// Applies spans already sorted from the end of the text backwards.
fn apply_replacements(text: &str, spans: &[(usize, usize, &str)]) -> String {
    let mut rope = Rope::from_str(text);
    for (start, end, content) in spans {
        let start_char = rope.byte_to_char(*start);
        let end_char = rope.byte_to_char(*end);
        rope.remove(start_char..end_char);
        rope.insert(start_char, content);
    }
    rope.to_string()
}

fn write_atomic(file_path: &Path, content: &[u8], suffix: &str) -> Result<()> {
    let temp_path = temp_path_for(file_path, suffix)?;
    let io_err = |e| RenameError::io(file_path, e);
    let mut temp_file = File::create(&temp_path).map_err(io_err)?;
    temp_file.write_all(content).map_err(io_err)?;
    temp_file.sync_all().map_err(io_err)?;
    std::fs::rename(&temp_path, file_path).map_err(io_err)?;
    Ok(())
}

fn temp_path_for(file_path: &Path, suffix: &str) -> Result<PathBuf> {
    let file_dir = file_path
        .parent()
        .ok_or_else(|| RenameError::Other("File has no parent directory".to_string()))?;
    let file_name = file_path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("tmp");
    Ok(file_dir.join(format!(".{}.{}.tmp", file_name, suffix)))
}
