//! Command-line interface for sfc-rename.
//!
//! This module handles argument parsing, the terminal operator and the JSON
//! payloads. The rename itself lives in the library.

use crate::error::{Diagnostic, DiagnosticLevel, RenameError};
use crate::host::Operator;
use crate::rename::{RenameScope, ScopeEvidence};
use clap::Parser;
use serde::Serialize;
use serde_json::Value;
use std::io::{BufRead, Write};
use std::path::PathBuf;

/// sfc-rename: scope-aware symbol rename for single-file components.
#[derive(Parser, Debug)]
#[command(name = "sfc-rename")]
#[command(author, version, about, long_about = None)]
#[command(subcommand_required = true)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print a JSON payload instead of plain text.
    #[arg(long, global = true)]
    pub json: bool,
}

/// Available commands.
#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Rename the symbol at a cursor position.
    Rename {
        /// File holding the cursor.
        #[arg(short, long)]
        file: PathBuf,

        /// Cursor line (1-based).
        #[arg(short, long)]
        line: usize,

        /// Cursor column (1-based).
        #[arg(short, long)]
        column: usize,

        /// New name; prompted for when omitted.
        #[arg(short = 'n', long)]
        new_name: Option<String>,

        /// Scope to use when the rename is ambiguous; prompted for when omitted.
        #[arg(long, value_name = "SCOPE")]
        scope: Option<ScopeArg>,

        /// Workspace folder (defaults to the current directory).
        #[arg(short, long)]
        root: Option<PathBuf>,

        /// Plan the edits without writing anything.
        #[arg(long)]
        dry_run: bool,
    },

    /// List scanner matches for a name across the workspace.
    Scan {
        /// Symbol or component name.
        #[arg(short, long)]
        name: String,

        /// Workspace folder (defaults to the current directory).
        #[arg(short, long)]
        root: Option<PathBuf>,

        /// Look for usages of a component instead of a symbol.
        #[arg(long)]
        component: bool,
    },
}

/// Scope answer supplied on the command line.
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeArg {
    /// Only the current file.
    Local,
    /// The whole workspace.
    Global,
}

impl From<ScopeArg> for RenameScope {
    fn from(arg: ScopeArg) -> Self {
        match arg {
            ScopeArg::Local => RenameScope::Local,
            ScopeArg::Global => RenameScope::Global,
        }
    }
}

/// Parse command-line arguments.
///
/// Returns the parsed Cli struct or exits on error.
pub fn parse_args() -> Cli {
    Cli::parse()
}

/// A notification shown to the operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    /// Severity.
    pub level: DiagnosticLevel,
    /// Message text.
    pub message: String,
}

/// Operator backed by line-based terminal prompts.
///
/// Answers given on the command line are used instead of prompting.
pub struct TerminalOperator<R, W> {
    input: R,
    output: W,
    new_name: Option<String>,
    scope: Option<ScopeArg>,
    quiet: bool,
    notifications: Vec<Notification>,
}

impl<R: BufRead, W: Write> TerminalOperator<R, W> {
    /// Prompt on `output`, read answers from `input`.
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            new_name: None,
            scope: None,
            quiet: false,
            notifications: Vec::new(),
        }
    }

    /// Answer the name prompt with `name`.
    pub fn with_new_name(mut self, name: Option<String>) -> Self {
        self.new_name = name;
        self
    }

    /// Answer the scope prompt with `scope`.
    pub fn with_scope(mut self, scope: Option<ScopeArg>) -> Self {
        self.scope = scope;
        self
    }

    /// Collect notifications without printing them.
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Everything passed to [`Operator::notify`].
    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    fn prompt(&mut self, question: &str) -> Option<String> {
        write!(self.output, "{question}").ok()?;
        self.output.flush().ok()?;
        let mut answer = String::new();
        match self.input.read_line(&mut answer) {
            Ok(0) | Err(_) => None,
            Ok(_) => {
                let answer = answer.trim();
                (!answer.is_empty()).then(|| answer.to_string())
            }
        }
    }
}

impl<R: BufRead, W: Write> Operator for TerminalOperator<R, W> {
    fn ask_new_name(&mut self, old_name: &str) -> Option<String> {
        if let Some(name) = &self.new_name {
            return Some(name.clone());
        }
        self.prompt(&format!("New name for '{old_name}': "))
    }

    fn choose_scope(&mut self, evidence: &ScopeEvidence) -> Option<RenameScope> {
        if let Some(scope) = self.scope {
            return Some(scope.into());
        }
        let answer = self.prompt(&format!(
            "{} reference(s) in this file and none elsewhere. Rename scope (local/global, empty to cancel): ",
            evidence.current_file_count
        ))?;
        match answer.to_ascii_lowercase().as_str() {
            "l" | "local" => Some(RenameScope::Local),
            "g" | "global" => Some(RenameScope::Global),
            _ => None,
        }
    }

    fn notify(&mut self, level: DiagnosticLevel, message: &str) {
        if !self.quiet {
            let _ = writeln!(self.output, "{}: {}", level.as_str(), message);
        }
        self.notifications.push(Notification {
            level,
            message: message.to_string(),
        });
    }
}

/// JSON success payload for CLI responses.
#[derive(Serialize)]
pub struct CliSuccessPayload {
    /// Status indicator ("ok").
    pub status: &'static str,
    /// Human-readable message.
    pub message: String,
    /// Optional structured data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl CliSuccessPayload {
    /// Construct a payload with structured data.
    pub fn with_data(message: String, data: Value) -> Self {
        Self {
            status: "ok",
            message,
            data: Some(data),
        }
    }
}

/// JSON error payload for CLI responses.
#[derive(Serialize)]
pub struct CliErrorPayload {
    /// Status indicator ("error").
    pub status: &'static str,
    /// Structured error details.
    pub error: ErrorDetails,
}

/// Details for a CLI error payload.
#[derive(Serialize)]
pub struct ErrorDetails {
    /// Error kind identifier (Io, InputMissing, etc.).
    pub kind: &'static str,
    /// Human-readable message.
    pub message: String,
    /// Optional file context.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    /// Diagnostics recorded before the failure.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<DiagnosticPayload>,
}

impl CliErrorPayload {
    /// Build payload from a RenameError and the diagnostics gathered so far.
    pub fn from_error(error: &RenameError, diagnostics: Vec<Diagnostic>) -> Self {
        CliErrorPayload {
            status: "error",
            error: ErrorDetails {
                kind: error.kind(),
                message: error.to_string(),
                file: error
                    .file_path()
                    .map(|path| path.to_string_lossy().to_string()),
                diagnostics: diagnostics.into_iter().map(DiagnosticPayload::from).collect(),
            },
        }
    }
}

/// JSON representation of a diagnostic.
#[derive(Serialize)]
pub struct DiagnosticPayload {
    /// Severity level ("error", "warning", ...).
    pub level: &'static str,
    /// Diagnostic message.
    pub message: String,
    /// Optional file path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    /// Optional line (1-based).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
}

impl From<Diagnostic> for DiagnosticPayload {
    fn from(diag: Diagnostic) -> Self {
        DiagnosticPayload {
            level: diag.level.as_str(),
            message: diag.message,
            file: diag.file.map(|p| p.to_string_lossy().to_string()),
            line: diag.line.map(|l| l + 1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn evidence() -> ScopeEvidence {
        ScopeEvidence {
            exported: false,
            current_file_count: 3,
            other_file_count: 0,
        }
    }

    #[test]
    fn test_prompts_read_answers() {
        let input = Cursor::new("renamed\nlocal\n");
        let mut output = Vec::new();
        {
            let mut operator = TerminalOperator::new(input, &mut output);
            assert_eq!(operator.ask_new_name("count"), Some("renamed".to_string()));
            assert_eq!(operator.choose_scope(&evidence()), Some(RenameScope::Local));
        }
        let printed = String::from_utf8(output).unwrap();
        assert!(printed.contains("New name for 'count'"));
        assert!(printed.contains("3 reference(s)"));
    }

    #[test]
    fn test_empty_answer_cancels() {
        let mut operator = TerminalOperator::new(Cursor::new("\n"), Vec::new());
        assert_eq!(operator.ask_new_name("count"), None);
        assert_eq!(operator.choose_scope(&evidence()), None);
    }

    #[test]
    fn test_presets_skip_prompts() {
        let mut operator = TerminalOperator::new(Cursor::new(""), Vec::new())
            .with_new_name(Some("total".to_string()))
            .with_scope(Some(ScopeArg::Global))
            .quiet(true);
        assert_eq!(operator.ask_new_name("count"), Some("total".to_string()));
        assert_eq!(operator.choose_scope(&evidence()), Some(RenameScope::Global));

        operator.notify(DiagnosticLevel::Info, "done");
        assert_eq!(operator.notifications().len(), 1);
        assert!(operator.output.is_empty());
    }

    #[test]
    fn test_error_payload() {
        let err = RenameError::InputMissing("no symbol at cursor".to_string());
        let diag = Diagnostic::new(DiagnosticLevel::Warning, "skipped").with_line(4);
        let payload = serde_json::to_value(CliErrorPayload::from_error(&err, vec![diag])).unwrap();
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error"]["kind"], "InputMissing");
        assert_eq!(payload["error"]["diagnostics"][0]["line"], 5);
    }
}
