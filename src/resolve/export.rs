//! Is a symbol visible outside the file that declares it?
//!
//! A symbol counts as exported when any of these hold:
//!
//! - it is declared by `defineProps`, `defineEmits` or `defineExpose`, or by
//!   a `props:`/`emits:` option (single-file components only);
//! - it is declared at the top level of a `<script setup>` block, i.e. a
//!   `const`/`let`/`var`/`function` at the very start of a line;
//! - its declaring line carries the `export` keyword;
//! - it appears in an `export { ... }` list.

use crate::error::{RenameError, Result};
use crate::scan::declaration;
use crate::scan::patterns::word_occurrences;
use crate::text::{is_word_bounded, script_blocks, Document, Position};
use regex::Regex;

/// Decide whether `symbol`, declared at `declaration` in `document`, is
/// visible to other files.
///
/// # Errors
/// Returns `RenameError::Pattern` if a check pattern cannot be built for
/// the symbol.
pub fn is_symbol_exported(document: &Document, symbol: &str, declaration: Position) -> Result<bool> {
    let text = document.text();
    let is_component = document
        .path()
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("vue"));

    if is_component {
        if declaration::is_declared(text, symbol) {
            log::debug!("{symbol} is declared by a component boundary construct");
            return Ok(true);
        }
        if declared_at_setup_top_level(text, symbol)? {
            log::debug!("{symbol} is a top-level setup binding");
            return Ok(true);
        }
    }

    if document
        .line_text(declaration.line)
        .is_some_and(|line| !word_occurrences(line, "export").is_empty())
    {
        return Ok(true);
    }

    in_export_list(text, symbol)
}

fn declared_at_setup_top_level(text: &str, symbol: &str) -> Result<bool> {
    let pattern = format!(
        r"(?m)^(?:const|let|var|function|async\s+function)\s+({})",
        regex::escape(symbol)
    );
    let regex = compile(symbol, &pattern)?;

    for block in script_blocks(text).into_iter().filter(|b| b.setup) {
        let content = &text[block.content_start..block.content_end];
        let found = regex
            .captures_iter(content)
            .filter_map(|caps| caps.get(1))
            .any(|m| is_word_bounded(content, m.start(), m.end()));
        if found {
            return Ok(true);
        }
    }
    Ok(false)
}

fn in_export_list(text: &str, symbol: &str) -> Result<bool> {
    let regex = compile(symbol, r"\bexport\s*\{([^}]*)\}")?;
    let found = regex
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .any(|list| !word_occurrences(list.as_str(), symbol).is_empty());
    Ok(found)
}

fn compile(symbol: &str, pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|source| RenameError::Pattern {
        name: symbol.to_string(),
        source,
    })
}
