//! Text scanner, name variant and reference merge tests.

use sfc_rename::naming::{to_camel_pascal, to_hyphenated, NameVariants};
use sfc_rename::resolve::{Reference, ReferenceOrigin, ReferenceSet};
use sfc_rename::scan::{find_all_references_in_current_file, PatternKind, ScanConfig, Scanner};
use sfc_rename::text::{Document, Location, Position, Range};

#[cfg(test)]
mod tests {
    use super::*;

    fn project_scan(name: &str, text: &str) -> Vec<(Position, PatternKind)> {
        let scanner = Scanner::project(name, &ScanConfig::default()).expect("Failed to build scanner");
        scanner
            .scan(&Document::new("/w/App.vue", text))
            .into_iter()
            .map(|c| (c.location.range.start, c.kind))
            .collect()
    }

    #[test]
    fn test_pascal_round_trip() {
        for name in ["ChildComponent1", "App1", "UserProfileCard", "Vue3Button", "X"] {
            assert_eq!(to_camel_pascal(&to_hyphenated(name)), name);
        }
    }

    #[test]
    fn test_component_variants() {
        let variants = NameVariants::for_component("ChildComponent1");
        let all: Vec<&str> = variants.iter().collect();
        assert_eq!(
            all,
            vec!["ChildComponent1", "child-component1", "childcomponent1", "CHILDCOMPONENT1"]
        );
    }

    #[test]
    fn test_commented_binding_is_ignored() {
        let text = "<template>\n  <!-- <Child :a1=\"x\" /> -->\n  <Child :b1=\"y\" />\n</template>\n";
        assert!(project_scan("a1", text).is_empty());
    }

    #[test]
    fn test_script_comments_are_ignored() {
        let text = "<script setup>\n// emit('a1')\n/* {{ a1 }} */\nconst emit = defineEmits(['a2'])\n</script>\n";
        assert!(project_scan("a1", text).is_empty());
    }

    #[test]
    fn test_plain_string_is_ignored() {
        let text = "<script setup>\nconst label = \"a1\"\nconst other = { key: 'a1' }\n</script>\n";
        assert!(project_scan("a1", text).is_empty());
    }

    #[test]
    fn test_declaration_array_is_found_once() {
        let text = "<script setup>\nconst props = defineProps(['a1', 'b1'])\n</script>\n";
        let found = project_scan("a1", text);
        assert_eq!(found, vec![(Position::new(1, 28), PatternKind::PropsDeclaration)]);
    }

    #[test]
    fn test_generic_emits_declaration_is_found() {
        let text = "<script setup>\nconst emit = defineEmits<{ (e: 'change', id: number): void }>()\n</script>\n";
        let found = project_scan("change", text);
        assert_eq!(found, vec![(Position::new(1, 32), PatternKind::EmitsDeclaration)]);
    }

    #[test]
    fn test_quoted_prop_key_is_found() {
        let text = "<script setup>\ndefineProps({ 'a1': String, label: { default: 'a1' } })\n</script>\n";
        let found = project_scan("a1", text);
        assert_eq!(found, vec![(Position::new(1, 15), PatternKind::PropsDeclaration)]);
    }

    #[test]
    fn test_partial_tokens_are_rejected() {
        let text = "<template>\n  <Child :data1=\"x\" />\n  <p>{{ data1 }}</p>\n</template>\n";
        assert!(project_scan("a1", text).is_empty());
    }

    #[test]
    fn test_binding_syntaxes() {
        let text = concat!(
            "<template>\n",
            "  <Child :a1=\"x\" v-bind:a1.sync=\"y\" @a1=\"z\" v-model:a1=\"w\" />\n",
            "  <p>{{ a1 + 1 }}</p>\n",
            "</template>\n",
        );
        let kinds: Vec<PatternKind> = project_scan("a1", text).into_iter().map(|(_, k)| k).collect();
        assert_eq!(kinds.len(), 5);
        for kind in [
            PatternKind::PropBinding,
            PatternKind::VBind,
            PatternKind::EventListener,
            PatternKind::VModel,
            PatternKind::Interpolation,
        ] {
            assert!(kinds.contains(&kind), "missing {kind:?}");
        }
    }

    #[test]
    fn test_emit_call_inside_string_is_found() {
        let text = "<script setup>\nconst emit = defineEmits(['change'])\nemit('change', 1)\n</script>\n";
        let found = project_scan("change", text);
        assert_eq!(found.len(), 2);
        assert!(found.contains(&(Position::new(2, 6), PatternKind::EmitCall)));
    }

    #[test]
    fn test_current_file_scan_keeps_strings() {
        let doc = Document::new(
            "/w/Util.js",
            "const total = 1\nconsole.log('total', total) // total\n",
        );
        let found = find_all_references_in_current_file(&doc, "total").expect("scan");
        let mut starts: Vec<Position> = found.iter().map(|c| c.location.range.start).collect();
        starts.sort();
        // The commented occurrence at column 31 is not included.
        assert_eq!(
            starts,
            vec![Position::new(0, 6), Position::new(1, 13), Position::new(1, 21)]
        );
    }

    #[test]
    fn test_same_location_merges_to_one_entry() {
        let location = Location::new(
            "/w/App.vue",
            Range::new(Position::new(3, 4), Position::new(3, 6)),
        );
        let mut set = ReferenceSet::new();
        set.insert(Reference::new(location.clone(), ReferenceOrigin::Editor));
        set.insert(Reference::new(
            location,
            ReferenceOrigin::Scanner(PatternKind::Identifier),
        ));
        assert_eq!(set.len(), 1);
        assert_eq!(set.to_vec()[0].origin, ReferenceOrigin::Editor);
    }
}
