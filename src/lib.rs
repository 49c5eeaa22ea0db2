//! sfc-rename: scope-aware symbol renaming for single-file components.
//!
//! A rename starts from the cheap evidence available in the current file
//! and only widens to a project-wide text scan when the symbol is visible
//! elsewhere. Scanned candidates are filtered for comments and string
//! literals, merged with editor-provided references and rewritten through
//! span-checked edits.

#![warn(missing_docs)]
// env_logger is used by src/main.rs (binary), not this library
#![expect(unused_crate_dependencies)]

pub mod cli;
pub mod error;
pub mod host;
pub mod naming;
pub mod plan;
pub mod rename;
pub mod resolve;
pub mod scan;
pub mod text;

/// Re-export common error types for convenience.
pub use error::{Diagnostic, DiagnosticLevel, RenameError, Result};

/// Re-export the rename entry point.
pub use rename::{smart_rename, RenameHost, RenameReport, RenameRequest};

/// sfc-rename version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
