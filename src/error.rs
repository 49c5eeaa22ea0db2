//! Rename engine error types and diagnostics.
//!
//! All errors are typed and provide root cause information. Per-file
//! problems are downgraded to [`Diagnostic`] records by the batch loops and
//! never abort a rename on their own.

use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Main error type for rename operations.
#[derive(Error, Debug)]
pub enum RenameError {
    /// I/O error during file operations.
    #[error("I/O error for path {path}: {source}")]
    Io {
        /// The file path that caused the I/O error.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A required input (symbol at cursor, new name, active document) is missing.
    #[error("Missing input: {0}")]
    InputMissing(String),

    /// A line/column position does not exist in the document.
    #[error("Invalid position {line}:{column} in {file}")]
    InvalidPosition {
        /// The document the position was resolved against.
        file: PathBuf,
        /// Line (0-based).
        line: usize,
        /// Column (0-based, in chars).
        column: usize,
    },

    /// A byte range does not fit the document or splits a character.
    #[error("Invalid range ({start}, {end}) in {file}")]
    InvalidRange {
        /// The document the range was resolved against.
        file: PathBuf,
        /// Start byte offset.
        start: usize,
        /// End byte offset.
        end: usize,
    },

    /// Two edits in one file overlap.
    #[error("Overlapping edits detected in {file}")]
    OverlappingEdits {
        /// The file containing the overlap.
        file: PathBuf,
    },

    /// A scanner pattern could not be compiled.
    #[error("Invalid pattern for '{name}': {source}")]
    Pattern {
        /// The symbol or component name the pattern was built for.
        name: String,
        /// The regex compilation error.
        #[source]
        source: regex::Error,
    },

    /// Workspace enumeration failed.
    #[error("Invalid glob pattern: {0}")]
    Glob(#[from] glob::PatternError),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// UTF-8 validation error.
    #[error("UTF-8 error in {file}")]
    Utf8 {
        /// The file that is not valid UTF-8.
        file: PathBuf,
    },

    /// The rename state machine received an event it cannot handle.
    #[error("Invalid transition: {event} while {state}")]
    InvalidTransition {
        /// Name of the current state.
        state: &'static str,
        /// Name of the rejected event.
        event: &'static str,
    },

    /// Generic error with context.
    #[error("{0}")]
    Other(String),
}

impl RenameError {
    /// Wrap an I/O error with the path it happened on.
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        RenameError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Stable identifier for the error kind, used in JSON payloads.
    pub fn kind(&self) -> &'static str {
        match self {
            RenameError::Io { .. } => "Io",
            RenameError::InputMissing(_) => "InputMissing",
            RenameError::InvalidPosition { .. } => "InvalidPosition",
            RenameError::InvalidRange { .. } => "InvalidRange",
            RenameError::OverlappingEdits { .. } => "OverlappingEdits",
            RenameError::Pattern { .. } => "Pattern",
            RenameError::Glob(_) => "Glob",
            RenameError::Json(_) => "Json",
            RenameError::Utf8 { .. } => "Utf8",
            RenameError::InvalidTransition { .. } => "InvalidTransition",
            RenameError::Other(_) => "Other",
        }
    }

    /// The file this error refers to, if any.
    pub fn file_path(&self) -> Option<&Path> {
        match self {
            RenameError::Io { path, .. } => Some(path),
            RenameError::InvalidPosition { file, .. }
            | RenameError::InvalidRange { file, .. }
            | RenameError::OverlappingEdits { file }
            | RenameError::Utf8 { file } => Some(file),
            _ => None,
        }
    }
}

/// Result type alias for rename operations.
pub type Result<T> = std::result::Result<T, RenameError>;

/// Severity of a diagnostic record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticLevel {
    /// Trace-level detail (individual replacements, skipped duplicates).
    Debug,
    /// Progress information.
    Info,
    /// Recoverable anomaly: a file was skipped or a candidate dropped.
    Warning,
    /// A failure the operator should know about.
    Error,
}

impl DiagnosticLevel {
    /// Lowercase label.
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticLevel::Debug => "debug",
            DiagnosticLevel::Info => "info",
            DiagnosticLevel::Warning => "warning",
            DiagnosticLevel::Error => "error",
        }
    }
}

/// One entry in the diagnostic log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    /// Severity.
    pub level: DiagnosticLevel,
    /// Human-readable message.
    pub message: String,
    /// File the diagnostic refers to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    /// Line (0-based) inside `file`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
}

impl Diagnostic {
    /// Create a diagnostic without location.
    pub fn new(level: DiagnosticLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            file: None,
            line: None,
        }
    }

    /// Attach a file.
    pub fn with_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Attach a 0-based line.
    pub fn with_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }
}
