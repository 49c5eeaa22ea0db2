//! The smart rename command.
//!
//! Cheap evidence comes first: the editor's own lookups, a current-file
//! scan and the export check. Only when the rename turns out to be global
//! does the command pay for transmission analysis and a project-wide scan.

pub mod state;

pub use state::{
    decide_scope, Completion, RenameDecision, RenameEvent, RenameScope, RenameState, ScopeEvidence,
};

use crate::error::{Diagnostic, DiagnosticLevel, RenameError, Result};
use crate::host::{
    DiagnosticSink, EditApplier, FileFailure, Operator, ReferenceProvider, SaveSummary, Workspace,
};
use crate::plan::{build_edit_plan, build_local_edit_plan, EditPlan};
use crate::resolve::{
    analyze_props_transmission, is_symbol_exported, partition_by_origin, ReferenceOrigin,
    ReferenceSet,
};
use crate::scan::{find_all_references_in_current_file, find_all_text_references, ScanConfig};
use crate::text::{word_range_at, Document, Location, Position};
use serde::Serialize;
use std::path::PathBuf;

/// Where the rename was invoked.
#[derive(Debug, Clone)]
pub struct RenameRequest {
    /// Document holding the cursor.
    pub file: PathBuf,
    /// Cursor position.
    pub position: Position,
    /// Plan only; nothing is applied or saved.
    pub dry_run: bool,
}

/// The collaborators one rename runs against.
pub struct RenameHost<'a> {
    /// Editor-native reference and definition lookup.
    pub references: &'a dyn ReferenceProvider,
    /// File enumeration and reading.
    pub workspace: &'a dyn Workspace,
    /// Edit application and saving.
    pub editor: &'a mut dyn EditApplier,
    /// Prompts and notifications.
    pub operator: &'a mut dyn Operator,
    /// Diagnostic log.
    pub diagnostics: &'a mut dyn DiagnosticSink,
}

impl RenameHost<'_> {
    fn notify(&mut self, level: DiagnosticLevel, message: &str) {
        self.diagnostics.record(Diagnostic::new(level, message));
        self.operator.notify(level, message);
    }

    fn lookup(&mut self, what: &str, result: Result<Vec<Location>>) -> Vec<Location> {
        result.unwrap_or_else(|err| {
            self.diagnostics.record(Diagnostic::new(
                DiagnosticLevel::Warning,
                format!("{what} lookup failed: {err}"),
            ));
            Vec::new()
        })
    }
}

/// What a rename did.
#[derive(Debug, Clone, Serialize)]
pub struct RenameReport {
    /// Symbol under the cursor.
    pub old_name: Option<String>,
    /// Name supplied by the operator.
    pub new_name: Option<String>,
    /// Settled scope, if the rename got that far.
    pub decision: Option<RenameDecision>,
    /// Terminal outcome.
    pub completion: Completion,
    /// Distinct references known when planning.
    pub references_found: usize,
    /// The planned edits.
    pub plan: Option<EditPlan>,
    /// Files written, with content hashes.
    pub saved: Vec<SaveSummary>,
    /// Files whose edits could not be applied or saved.
    pub failures: Vec<FileFailure>,
}

impl RenameReport {
    fn new() -> Self {
        Self {
            old_name: None,
            new_name: None,
            decision: None,
            completion: Completion::Cancelled,
            references_found: 0,
            plan: None,
            saved: Vec::new(),
            failures: Vec::new(),
        }
    }

    /// Edits that reached the editor (planned edits for a dry run).
    pub fn edits(&self) -> usize {
        match self.completion {
            Completion::Finished { edits, .. } => edits,
            _ => 0,
        }
    }
}

/// Run one smart rename.
///
/// Errors never escape. Missing input (no symbol under the cursor) is a
/// warning and the rename is `Cancelled`. Anything else that aborts the
/// command is logged and shown to the operator as a single message, and the
/// report's completion is `Abandoned`.
pub fn smart_rename(
    request: &RenameRequest,
    host: &mut RenameHost<'_>,
    config: &ScanConfig,
) -> RenameReport {
    match run(request, host, config) {
        Ok(report) => report,
        Err(RenameError::InputMissing(what)) => {
            host.notify(DiagnosticLevel::Warning, &what);
            RenameReport::new()
        }
        Err(err) => {
            let mut report = RenameReport::new();
            host.diagnostics.record(
                Diagnostic::new(DiagnosticLevel::Error, err.to_string())
                    .with_file(err.file_path().unwrap_or(request.file.as_path())),
            );
            host.operator
                .notify(DiagnosticLevel::Error, &format!("Smart rename failed: {err}"));
            report.completion = Completion::Abandoned {
                reason: err.to_string(),
            };
            report
        }
    }
}

fn run(
    request: &RenameRequest,
    host: &mut RenameHost<'_>,
    config: &ScanConfig,
) -> Result<RenameReport> {
    let mut report = RenameReport::new();
    let text = host.workspace.read(&request.file)?;
    let document = Document::new(request.file.clone(), text);

    let Some(range) = word_range_at(&document, request.position) else {
        return Err(RenameError::InputMissing("No symbol at cursor".to_string()));
    };
    let old_name = document.text_in(&range)?.to_string();
    report.old_name = Some(old_name.clone());

    let new_name = match host.operator.ask_new_name(&old_name) {
        Some(name) if !name.trim().is_empty() && name.trim() != old_name => name.trim().to_string(),
        _ => {
            log::debug!("Rename of {old_name} cancelled at the name prompt");
            return Ok(report);
        }
    };
    report.new_name = Some(new_name.clone());

    // Probing: editor lookups, then the current-file supplement.
    let mut state = RenameState::start();
    let mut references = ReferenceSet::new();
    let definitions = {
        let found = host.references.definitions(&request.file, range.start);
        host.lookup("Definition", found)
    };
    let editor_refs = {
        let found = host.references.references(&request.file, range.start);
        host.lookup("Reference", found)
    };
    references.extend_locations(editor_refs, ReferenceOrigin::Editor);
    references.extend_locations(definitions.iter().cloned(), ReferenceOrigin::Definition);

    if partition_by_origin(&references, &request.file).current.len() < 2 {
        references.extend_scanned(find_all_references_in_current_file(&document, &old_name)?);
    }
    let partition = partition_by_origin(&references, &request.file);

    let exported = declaration_exported(&document, definitions.first(), range.start, &old_name, host)?;
    let evidence = ScopeEvidence {
        exported,
        current_file_count: partition.current.len(),
        other_file_count: partition.other.len(),
    };
    log::debug!("Scope evidence for {old_name}: {evidence:?}");

    state = state.transition(RenameEvent::Probed(evidence))?;
    if state.needs_operator() {
        let choice = host.operator.choose_scope(&evidence);
        state = state.transition(RenameEvent::OperatorChose(choice))?;
    }

    let decision = match state {
        RenameState::Scoped(decision) => decision,
        RenameState::Done(completion) => {
            host.notify(DiagnosticLevel::Info, "Rename cancelled");
            report.completion = completion;
            return Ok(report);
        }
        other => {
            return Err(RenameError::Other(format!(
                "Rename stalled in state {}",
                other.name()
            )))
        }
    };
    report.decision = Some(decision);
    let state = RenameState::Scoped(decision);

    let plan = match decision.scope {
        RenameScope::Global => {
            if !decision.operator_chosen {
                host.notify(
                    DiagnosticLevel::Info,
                    &format!("'{old_name}' is visible outside this file, renaming across the project"),
                );
            }

            if let Some(component) = config.component_name(&request.file) {
                let transmitted = analyze_props_transmission(
                    &component,
                    &old_name,
                    host.workspace,
                    config,
                    host.diagnostics,
                )?;
                let added = references.extend_transmitted(transmitted);
                if added > 0 {
                    host.notify(
                        DiagnosticLevel::Info,
                        &format!("Found {added} reference(s) passed through <{component}> usages"),
                    );
                }
            }

            let scanned = find_all_text_references(&old_name, host.workspace, config, host.diagnostics)?;
            let added = references.extend_scanned(scanned);
            if added > 0 {
                host.notify(
                    DiagnosticLevel::Info,
                    &format!("Text scan found {added} additional reference(s)"),
                );
            }

            let partition = partition_by_origin(&references, &request.file);
            log::debug!(
                "{old_name}: {} current-file and {} other-file reference(s)",
                partition.current.len(),
                partition.other.len()
            );
            report.references_found = references.len();
            build_edit_plan(
                &references.to_vec(),
                &old_name,
                &new_name,
                host.workspace,
                host.diagnostics,
            )
        }
        RenameScope::Local => {
            let mut local = ReferenceSet::new();
            for reference in partition.current {
                local.insert(reference);
            }
            local.extend_scanned(find_all_references_in_current_file(&document, &old_name)?);
            report.references_found = local.len();
            build_local_edit_plan(&document, &local.to_vec(), &old_name, &new_name, host.diagnostics)
        }
    };

    if plan.is_empty() {
        host.notify(
            DiagnosticLevel::Info,
            &format!("No references to '{old_name}' could be updated"),
        );
        report.completion = finish(state, 0, 0, false)?;
        report.plan = Some(plan);
        return Ok(report);
    }

    if request.dry_run {
        host.notify(
            DiagnosticLevel::Info,
            &format!(
                "Dry run: {} edit(s) in {} file(s)",
                plan.total_edits(),
                plan.file_count()
            ),
        );
        report.completion = finish(state, plan.total_edits(), plan.file_count(), false)?;
        report.plan = Some(plan);
        return Ok(report);
    }

    let applied = match host.editor.apply(&plan) {
        Ok(applied) => applied,
        Err(err) => {
            host.notify(DiagnosticLevel::Error, &format!("Could not apply edits: {err}"));
            report.completion = match state.transition(RenameEvent::Failed(err.to_string()))? {
                RenameState::Done(completion) => completion,
                _ => Completion::Abandoned {
                    reason: err.to_string(),
                },
            };
            report.plan = Some(plan);
            return Ok(report);
        }
    };

    for failure in &applied.failed {
        host.notify(
            DiagnosticLevel::Warning,
            &format!("Could not update {}: {}", failure.file.display(), failure.reason),
        );
        report.failures.push(failure.clone());
    }

    let mut updated = 0;
    for file in &applied.applied {
        match host.editor.save(file) {
            Ok(summary) => {
                updated += plan.edits_for(file).map_or(0, |f| f.edits.len());
                report.saved.push(summary);
            }
            Err(err) => {
                host.notify(
                    DiagnosticLevel::Warning,
                    &format!("Could not save {}: {err}", file.display()),
                );
                report.failures.push(FileFailure {
                    file: file.clone(),
                    reason: err.to_string(),
                });
            }
        }
    }

    host.notify(
        DiagnosticLevel::Info,
        &format!("{old_name} → {new_name}: {updated} references updated"),
    );
    report.completion = finish(state, updated, report.saved.len(), true)?;
    report.plan = Some(plan);
    Ok(report)
}

fn finish(state: RenameState, edits: usize, files: usize, applied: bool) -> Result<Completion> {
    match state.transition(RenameEvent::Finished {
        edits,
        files,
        applied,
    })? {
        RenameState::Done(completion) => Ok(completion),
        other => Err(RenameError::Other(format!(
            "Rename did not finish, still {}",
            other.name()
        ))),
    }
}

/// Export check against the first definition, or the cursor's own site.
fn declaration_exported(
    document: &Document,
    definition: Option<&Location>,
    fallback: Position,
    symbol: &str,
    host: &mut RenameHost<'_>,
) -> Result<bool> {
    match definition {
        Some(def) if def.file != document.path() => match host.workspace.read(&def.file) {
            Ok(text) => {
                is_symbol_exported(&Document::new(def.file.clone(), text), symbol, def.range.start)
            }
            Err(err) => {
                host.diagnostics.record(
                    Diagnostic::new(
                        DiagnosticLevel::Warning,
                        format!("Cannot read declaring file: {err}"),
                    )
                    .with_file(def.file.clone()),
                );
                Ok(false)
            }
        },
        Some(def) => is_symbol_exported(document, symbol, def.range.start),
        None => is_symbol_exported(document, symbol, fallback),
    }
}
