//! Usages of a component across the workspace.

use super::patterns::component_patterns;
use super::{scan_files, ReferenceCandidate, ScanConfig, ScanMode, Scanner};
use crate::error::Result;
use crate::host::{DiagnosticSink, Workspace};
use crate::naming::NameVariants;
use std::path::PathBuf;

/// Scanner matching any spelling of `component` as a tag, dynamic
/// component, import or registration.
pub fn component_scanner(component: &str, config: &ScanConfig) -> Result<Scanner> {
    let mut patterns = Vec::new();
    for variant in NameVariants::for_component(component).iter() {
        patterns.extend(component_patterns(variant)?);
    }
    Ok(Scanner::new(patterns, ScanMode::Project, config.string_window))
}

/// Every place in the workspace that uses `component`.
pub fn find_component_usages(
    component: &str,
    workspace: &dyn Workspace,
    config: &ScanConfig,
    sink: &mut dyn DiagnosticSink,
) -> Result<Vec<ReferenceCandidate>> {
    let scanner = component_scanner(component, config)?;
    let files = workspace.find_files(&config.filter)?;
    let usages = scan_files(&scanner, workspace, &files, sink)?;
    log::debug!("Component {component}: {} usage(s)", usages.len());
    Ok(usages)
}

/// Distinct files of `usages`, in first-seen order.
pub fn usage_files(usages: &[ReferenceCandidate]) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = Vec::new();
    for usage in usages {
        if !files.contains(&usage.location.file) {
            files.push(usage.location.file.clone());
        }
    }
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::PatternKind;
    use crate::text::Document;

    #[test]
    fn test_tag_spellings() {
        let scanner = component_scanner("ChildComponent1", &ScanConfig::default()).unwrap();
        let doc = Document::new(
            "/w/App.vue",
            "<template>\n  <ChildComponent1 />\n  <child-component1></child-component1>\n  <ChildComponent10 />\n</template>",
        );
        let found = scanner.scan(&doc);
        let lines: Vec<usize> = found.iter().map(|c| c.location.range.start.line).collect();
        assert_eq!(found.len(), 3);
        assert!(found.iter().all(|c| c.kind == PatternKind::ComponentTag));
        assert!(!lines.contains(&3));
    }

    #[test]
    fn test_dynamic_and_registration() {
        let scanner = component_scanner("Child", &ScanConfig::default()).unwrap();
        let doc = Document::new(
            "/w/App.vue",
            "<component :is=\"'Child'\" />\n<script>\nimport Child from './Child.vue'\nexport default {\n  components: {\n    Child,\n  },\n}\n</script>",
        );
        let kinds: Vec<PatternKind> = scanner.scan(&doc).into_iter().map(|c| c.kind).collect();
        assert!(kinds.contains(&PatternKind::DynamicComponent));
        assert!(kinds.contains(&PatternKind::ComponentImport));
        assert!(kinds.contains(&PatternKind::ComponentRegistration));
    }

    #[test]
    fn test_commented_usage_is_ignored() {
        let scanner = component_scanner("Child", &ScanConfig::default()).unwrap();
        let doc = Document::new("/w/App.vue", "<!-- <Child /> -->");
        assert!(scanner.scan(&doc).is_empty());
    }
}
