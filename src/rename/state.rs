//! Scope decision as an explicit state machine.
//!
//! ```text
//! Probing ──Probed(global evidence)──────────▶ Scoped
//!    │ └─Probed(ambiguous)─▶ Probing{pending} ─OperatorChose(Some)─▶ Scoped
//!    │                              └─OperatorChose(None)─▶ Done(Cancelled)
//!    └─Cancelled / Failed ─▶ Done
//! Scoped ──Finished / Failed──▶ Done
//! ```

use crate::error::{RenameError, Result};
use serde::Serialize;

/// How far a rename reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RenameScope {
    /// Only the document the rename started from.
    Local,
    /// Every file in the workspace.
    Global,
}

/// What the cheap probing phase found out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScopeEvidence {
    /// The declaration is visible outside its file.
    pub exported: bool,
    /// References found in the origin document.
    pub current_file_count: usize,
    /// References found in any other file.
    pub other_file_count: usize,
}

/// The settled scope plus the evidence behind it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RenameDecision {
    /// Chosen scope.
    pub scope: RenameScope,
    /// Whether the declaration was exported.
    pub exported: bool,
    /// Other-file references known when deciding.
    pub other_file_count: usize,
    /// True if the operator picked the scope.
    pub operator_chosen: bool,
}

/// Terminal outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Completion {
    /// Edits were planned and, unless this was a dry run, applied.
    Finished {
        /// Edits in the plan.
        edits: usize,
        /// Files in the plan.
        files: usize,
        /// False for a dry run.
        applied: bool,
    },
    /// The operator backed out; nothing was changed.
    Cancelled,
    /// An error ended the rename.
    Abandoned {
        /// Short reason.
        reason: String,
    },
}

/// Inputs to [`RenameState::transition`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenameEvent {
    /// Probing finished with this evidence.
    Probed(ScopeEvidence),
    /// The operator answered the scope prompt; `None` cancels.
    OperatorChose(Option<RenameScope>),
    /// Edits were planned (and applied unless `applied` is false).
    Finished {
        /// Edits in the plan.
        edits: usize,
        /// Files in the plan.
        files: usize,
        /// False for a dry run.
        applied: bool,
    },
    /// The operator cancelled before a scope was settled.
    Cancelled,
    /// An error ended the rename.
    Failed(String),
}

impl RenameEvent {
    fn name(&self) -> &'static str {
        match self {
            RenameEvent::Probed(_) => "Probed",
            RenameEvent::OperatorChose(_) => "OperatorChose",
            RenameEvent::Finished { .. } => "Finished",
            RenameEvent::Cancelled => "Cancelled",
            RenameEvent::Failed(_) => "Failed",
        }
    }
}

/// Where a rename currently is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenameState {
    /// Gathering cheap evidence; `pending` holds it while the operator is
    /// asked to choose.
    Probing {
        /// Evidence awaiting an operator decision.
        pending: Option<ScopeEvidence>,
    },
    /// Scope settled; the matching edit plan runs.
    Scoped(RenameDecision),
    /// Terminal.
    Done(Completion),
}

/// Scope implied by the evidence alone, or `None` if the operator must
/// decide.
pub fn decide_scope(evidence: &ScopeEvidence) -> Option<RenameScope> {
    (evidence.exported || evidence.other_file_count > 0).then_some(RenameScope::Global)
}

impl RenameState {
    /// Initial state.
    pub fn start() -> Self {
        RenameState::Probing { pending: None }
    }

    /// State name, for errors and logs.
    pub fn name(&self) -> &'static str {
        match self {
            RenameState::Probing { pending: None } => "Probing",
            RenameState::Probing { pending: Some(_) } => "AwaitingScope",
            RenameState::Scoped(_) => "Scoped",
            RenameState::Done(_) => "Done",
        }
    }

    /// True while an operator scope choice is outstanding.
    pub fn needs_operator(&self) -> bool {
        matches!(self, RenameState::Probing { pending: Some(_) })
    }

    /// Advance by one event.
    ///
    /// # Errors
    /// `RenameError::InvalidTransition` if `event` is not valid in the
    /// current state.
    pub fn transition(self, event: RenameEvent) -> Result<Self> {
        let next = match (&self, event) {
            (RenameState::Probing { pending: None }, RenameEvent::Probed(evidence)) => {
                match decide_scope(&evidence) {
                    Some(scope) => RenameState::Scoped(RenameDecision {
                        scope,
                        exported: evidence.exported,
                        other_file_count: evidence.other_file_count,
                        operator_chosen: false,
                    }),
                    None => RenameState::Probing {
                        pending: Some(evidence),
                    },
                }
            }
            (RenameState::Probing { pending: Some(evidence) }, RenameEvent::OperatorChose(choice)) => {
                match choice {
                    Some(scope) => RenameState::Scoped(RenameDecision {
                        scope,
                        exported: evidence.exported,
                        other_file_count: evidence.other_file_count,
                        operator_chosen: true,
                    }),
                    None => RenameState::Done(Completion::Cancelled),
                }
            }
            (RenameState::Probing { .. }, RenameEvent::Cancelled) => {
                RenameState::Done(Completion::Cancelled)
            }
            (RenameState::Scoped(_), RenameEvent::Finished { edits, files, applied }) => {
                RenameState::Done(Completion::Finished {
                    edits,
                    files,
                    applied,
                })
            }
            (RenameState::Probing { .. } | RenameState::Scoped(_), RenameEvent::Failed(reason)) => {
                RenameState::Done(Completion::Abandoned { reason })
            }
            (state, event) => {
                return Err(RenameError::InvalidTransition {
                    state: state.name(),
                    event: event.name(),
                })
            }
        };
        log::debug!("Rename state {} -> {}", self.name(), next.name());
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn evidence(exported: bool, other: usize) -> ScopeEvidence {
        ScopeEvidence {
            exported,
            current_file_count: 2,
            other_file_count: other,
        }
    }

    #[test]
    fn test_other_file_references_force_global() {
        let state = RenameState::start()
            .transition(RenameEvent::Probed(evidence(false, 3)))
            .unwrap();
        match state {
            RenameState::Scoped(decision) => {
                assert_eq!(decision.scope, RenameScope::Global);
                assert!(!decision.operator_chosen);
            }
            other => panic!("unexpected state {other:?}"),
        }
    }

    #[test]
    fn test_exported_forces_global() {
        assert_eq!(decide_scope(&evidence(true, 0)), Some(RenameScope::Global));
    }

    #[test]
    fn test_ambiguous_evidence_waits_for_operator() {
        let state = RenameState::start()
            .transition(RenameEvent::Probed(evidence(false, 0)))
            .unwrap();
        assert!(state.needs_operator());

        let scoped = state
            .clone()
            .transition(RenameEvent::OperatorChose(Some(RenameScope::Local)))
            .unwrap();
        assert!(matches!(
            scoped,
            RenameState::Scoped(RenameDecision {
                scope: RenameScope::Local,
                operator_chosen: true,
                ..
            })
        ));

        let cancelled = state.transition(RenameEvent::OperatorChose(None)).unwrap();
        assert_eq!(cancelled, RenameState::Done(Completion::Cancelled));
    }

    #[test]
    fn test_invalid_transitions_are_rejected() {
        let err = RenameState::start()
            .transition(RenameEvent::Finished {
                edits: 1,
                files: 1,
                applied: true,
            })
            .unwrap_err();
        assert_eq!(err.kind(), "InvalidTransition");

        let done = RenameState::Done(Completion::Cancelled);
        assert!(done.transition(RenameEvent::Cancelled).is_err());
    }
}
