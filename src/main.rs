//! sfc-rename CLI binary
//!
//! Thin adapter over the library: it wires the filesystem host and the
//! terminal operator together and prints the outcome.

use sfc_rename::cli::{CliErrorPayload, CliSuccessPayload, Commands, ScopeArg, TerminalOperator};
use sfc_rename::host::{
    DiagnosticSink, FsEditApplier, FsWorkspace, LogSink, MemorySink, NullReferenceProvider,
};
use sfc_rename::rename::{smart_rename, Completion, RenameHost, RenameRequest};
use sfc_rename::scan::{find_all_text_references, find_component_usages, ScanConfig};
use sfc_rename::text::Position;
use sfc_rename::RenameError;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = sfc_rename::cli::parse_args();

    if cli.verbose {
        env_logger::init();
    }

    let mut sink = MemorySink::new();
    let result = match cli.command {
        Commands::Rename {
            file,
            line,
            column,
            new_name,
            scope,
            root,
            dry_run,
        } => execute_rename(
            &file,
            (line, column),
            new_name,
            scope,
            root.as_deref(),
            dry_run,
            cli.json,
            &mut sink,
        ),
        Commands::Scan {
            name,
            root,
            component,
        } => execute_scan(&name, root.as_deref(), component, &mut sink),
    };

    let diagnostics = sink.entries().to_vec();
    for diagnostic in &diagnostics {
        LogSink.record(diagnostic.clone());
    }

    match result {
        Ok(payload) => {
            if cli.json {
                match serde_json::to_string_pretty(&payload) {
                    Ok(json) => println!("{json}"),
                    Err(e) => {
                        eprintln!("Error: {e}");
                        return ExitCode::from(1);
                    }
                }
            } else {
                println!("{}", payload.message);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            if cli.json {
                let payload = CliErrorPayload::from_error(&e, diagnostics);
                match serde_json::to_string_pretty(&payload) {
                    Ok(json) => println!("{json}"),
                    Err(_) => eprintln!("Error: {e}"),
                }
            } else {
                eprintln!("Error: {e}");
            }
            ExitCode::from(1)
        }
    }
}

/// Workspace root: the given folder or the current directory, canonicalized
/// so enumerated paths and the cursor file agree.
fn resolve_root(root: Option<&Path>) -> Result<PathBuf, RenameError> {
    let root = match root {
        Some(root) => root.to_path_buf(),
        None => std::env::current_dir().map_err(|e| RenameError::io(Path::new("."), e))?,
    };
    std::fs::canonicalize(&root).map_err(|e| RenameError::io(&root, e))
}

/// Execute the rename command.
///
/// Line and column arrive 1-based and are converted before the request is
/// built. An abandoned rename is reported as an error.
#[allow(clippy::too_many_arguments)]
fn execute_rename(
    file: &Path,
    (line, column): (usize, usize),
    new_name: Option<String>,
    scope: Option<ScopeArg>,
    root: Option<&Path>,
    dry_run: bool,
    json: bool,
    sink: &mut MemorySink,
) -> Result<CliSuccessPayload, RenameError> {
    if line == 0 || column == 0 {
        return Err(RenameError::InvalidPosition {
            file: file.to_path_buf(),
            line,
            column,
        });
    }
    let root = resolve_root(root)?;
    let file = std::fs::canonicalize(file).map_err(|e| RenameError::io(file, e))?;

    let workspace = FsWorkspace::new(root);
    let mut editor = FsEditApplier::new();
    let stdin = std::io::stdin();
    let mut operator = TerminalOperator::new(stdin.lock(), std::io::stderr())
        .with_new_name(new_name)
        .with_scope(scope)
        .quiet(json);
    let references = NullReferenceProvider;

    let request = RenameRequest {
        file,
        position: Position::new(line - 1, column - 1),
        dry_run,
    };
    let report = {
        let mut host = RenameHost {
            references: &references,
            workspace: &workspace,
            editor: &mut editor,
            operator: &mut operator,
            diagnostics: sink,
        };
        smart_rename(&request, &mut host, &ScanConfig::default())
    };

    let message = match &report.completion {
        Completion::Finished {
            edits,
            files,
            applied: true,
        } => format!("Renamed with {edits} edit(s) across {files} file(s)"),
        Completion::Finished { edits, files, .. } => {
            format!("Planned {edits} edit(s) across {files} file(s)")
        }
        Completion::Cancelled => "Rename cancelled".to_string(),
        Completion::Abandoned { reason } => return Err(RenameError::Other(reason.clone())),
    };
    let data = serde_json::to_value(&report)?;
    Ok(CliSuccessPayload::with_data(message, data))
}

/// Execute the scan command.
fn execute_scan(
    name: &str,
    root: Option<&Path>,
    component: bool,
    sink: &mut MemorySink,
) -> Result<CliSuccessPayload, RenameError> {
    let workspace = FsWorkspace::new(resolve_root(root)?);
    let config = ScanConfig::default();
    let candidates = if component {
        find_component_usages(name, &workspace, &config, sink)?
    } else {
        find_all_text_references(name, &workspace, &config, sink)?
    };

    let mut lines = vec![format!("{} match(es) for '{}'", candidates.len(), name)];
    for candidate in &candidates {
        let start = candidate.location.range.start;
        lines.push(format!(
            "{}:{}:{} {}",
            candidate.location.file.display(),
            start.line + 1,
            start.column + 1,
            candidate.kind.as_str()
        ));
    }
    let data = serde_json::to_value(&candidates)?;
    Ok(CliSuccessPayload::with_data(lines.join("\n"), data))
}
