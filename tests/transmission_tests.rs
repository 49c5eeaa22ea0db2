//! Prop transmission and component usage tests over a temporary workspace.

use sfc_rename::host::{FsWorkspace, MemorySink};
use sfc_rename::resolve::analyze_props_transmission;
use sfc_rename::scan::{find_component_usages, PatternKind, ScanConfig};
use sfc_rename::text::{Position, Range};
use std::fs;
use tempfile::TempDir;

#[cfg(test)]
mod tests {
    use super::*;

    const CHILD: &str = "<script setup>\ndefineProps({ a1: { type: String } })\n</script>\n";

    fn workspace(files: &[(&str, &str)]) -> TempDir {
        let dir = TempDir::new().expect("Failed to create temp workspace");
        for (name, content) in files {
            let path = dir.path().join(name);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).expect("Failed to create directory");
            }
            fs::write(path, content).expect("Failed to write fixture");
        }
        dir
    }

    #[test]
    fn test_shorthand_binding_on_usage() {
        let dir = workspace(&[
            ("Child.vue", CHILD),
            ("Parent.vue", "<template>\n  <Child :a1=\"value\" />\n</template>\n"),
        ]);
        let ws = FsWorkspace::new(dir.path());
        let mut sink = MemorySink::new();

        let found = analyze_props_transmission("Child", "a1", &ws, &ScanConfig::default(), &mut sink)
            .expect("Transmission analysis failed");

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].location.file, dir.path().join("Parent.vue"));
        assert_eq!(
            found[0].location.range,
            Range::new(Position::new(1, 10), Position::new(1, 12))
        );
        assert_eq!(found[0].kind, PatternKind::PropBinding);
    }

    #[test]
    fn test_hyphenated_usage_with_content() {
        let parent = concat!(
            "<template>\n",
            "  <child-card\n",
            "    v-bind:a1=\"one\"\n",
            "  >\n",
            "    {{ a1 }}\n",
            "  </child-card>\n",
            "</template>\n",
        );
        let dir = workspace(&[("ChildCard.vue", CHILD), ("pages/Home.vue", parent)]);
        let ws = FsWorkspace::new(dir.path());
        let mut sink = MemorySink::new();

        let found =
            analyze_props_transmission("ChildCard", "a1", &ws, &ScanConfig::default(), &mut sink)
                .expect("Transmission analysis failed");

        let mut hits: Vec<(Position, PatternKind)> = found
            .iter()
            .map(|c| (c.location.range.start, c.kind))
            .collect();
        hits.sort();
        assert_eq!(
            hits,
            vec![
                (Position::new(2, 11), PatternKind::VBind),
                (Position::new(4, 7), PatternKind::Interpolation),
            ]
        );
    }

    #[test]
    fn test_commented_usage_is_skipped() {
        let dir = workspace(&[
            ("Child.vue", CHILD),
            (
                "Parent.vue",
                "<template>\n  <!-- <Child :a1=\"old\" /> -->\n  <Child :b1=\"x\" />\n</template>\n",
            ),
        ]);
        let ws = FsWorkspace::new(dir.path());
        let mut sink = MemorySink::new();

        let found = analyze_props_transmission("Child", "a1", &ws, &ScanConfig::default(), &mut sink)
            .expect("Transmission analysis failed");
        assert!(found.is_empty());
    }

    #[test]
    fn test_component_usages_across_spellings() {
        let dir = workspace(&[
            ("ChildCard.vue", CHILD),
            ("A.vue", "<template><ChildCard /></template>\n"),
            ("B.vue", "<template><child-card></child-card></template>\n"),
            ("C.vue", "<template><div /></template>\n"),
            ("node_modules/lib/D.vue", "<template><ChildCard /></template>\n"),
        ]);
        let ws = FsWorkspace::new(dir.path());
        let mut sink = MemorySink::new();

        let usages = find_component_usages("ChildCard", &ws, &ScanConfig::default(), &mut sink)
            .expect("Usage scan failed");
        let mut files: Vec<_> = usages.iter().map(|u| u.location.file.clone()).collect();
        files.dedup();
        assert_eq!(files, vec![dir.path().join("A.vue"), dir.path().join("B.vue")]);
        assert!(usages.iter().all(|u| u.kind == PatternKind::ComponentTag));
    }
}
