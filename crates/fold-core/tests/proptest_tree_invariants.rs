//! Property-based invariant tests for building, encoding and reconciling.
//!
//! 1. Round trip: `decode(encode(t)) == t.persisted_view()` for built trees.
//! 2. Trees with no root leaves round-trip exactly.
//! 3. Building is deterministic.
//! 4. Every field appears exactly once, and every group starts collapsed.
//! 5. Expansion flags survive encode → decode → rebuild → reconcile.
//! 6. Root leaves keep their position relative to top-level groups.
//! 7. Decoding arbitrary text never panics.

use std::collections::HashSet;

use fold_core::{Entry, GroupTree, build, decode, decode_or_default, encode, reconcile};
use proptest::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────────

/// Segment names drawn from a small alphabet so paths collide often.
///
/// Includes the empty segment, which the permissive policy stores as a group
/// named `""` (`"/B"`, `"A//C"`, `"A/"`, `""`).
fn segment_strategy() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["A", "B", "Stats", "Combat", "Advanced", "x y", ""])
        .prop_map(str::to_owned)
}

fn path_strategy() -> impl Strategy<Value = Option<String>> {
    prop::option::weighted(
        0.75,
        prop::collection::vec(segment_strategy(), 1..4).prop_map(|segments| segments.join("/")),
    )
}

/// Unique field identifiers `f0..fn`, each with an optional path.
fn fields_strategy() -> impl Strategy<Value = Vec<(String, Option<String>)>> {
    prop::collection::vec(path_strategy(), 0..24).prop_map(|paths| {
        paths
            .into_iter()
            .enumerate()
            .map(|(i, path)| (format!("f{i}"), path))
            .collect()
    })
}

fn as_refs(fields: &[(String, Option<String>)]) -> Vec<(&str, Option<&str>)> {
    fields
        .iter()
        .map(|(id, path)| (id.as_str(), path.as_deref()))
        .collect()
}

fn group_paths(tree: &GroupTree) -> Vec<String> {
    tree.walk().filter_map(|item| item.path).collect()
}

// ═════════════════════════════════════════════════════════════════════════
// 1–2. Round trip
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn round_trip_matches_persisted_view(fields in fields_strategy()) {
        let tree = build(as_refs(&fields));
        let decoded = decode(&encode(&tree)).expect("encoder output must decode");
        prop_assert_eq!(decoded, tree.persisted_view());
    }

    #[test]
    fn round_trip_exact_without_root_leaves(
        fields in fields_strategy(),
        flips in prop::collection::vec(any::<bool>(), 0..64),
    ) {
        let grouped: Vec<_> = fields.into_iter().filter(|(_, path)| path.is_some()).collect();
        let mut tree = build(as_refs(&grouped));
        for (path, flip) in group_paths(&tree).iter().zip(flips) {
            tree.set_expanded(path, flip);
        }
        let decoded = decode(&encode(&tree)).expect("encoder output must decode");
        prop_assert_eq!(decoded, tree);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3–4. Build determinism and coverage
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn build_is_deterministic(fields in fields_strategy()) {
        prop_assert_eq!(build(as_refs(&fields)), build(as_refs(&fields)));
    }

    #[test]
    fn every_field_placed_once(fields in fields_strategy()) {
        let tree = build(as_refs(&fields));
        let leaves: Vec<&str> = tree
            .walk()
            .filter_map(|item| item.entry.as_leaf())
            .collect();
        prop_assert_eq!(leaves.len(), fields.len());
        let unique: HashSet<&str> = leaves.iter().copied().collect();
        prop_assert_eq!(unique.len(), fields.len());
        prop_assert!(tree.expanded_paths().is_empty());

        for item in tree.walk() {
            if let Some(id) = item.entry.as_leaf() {
                let (_, declared) = fields.iter().find(|(f, _)| f == id).unwrap();
                prop_assert_eq!(item.parent.as_deref(), declared.as_deref());
            }
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. Expansion survives a rebuild
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn expansion_survives_rebuild(
        fields in fields_strategy(),
        flips in prop::collection::vec(any::<bool>(), 0..64),
    ) {
        let mut session = build(as_refs(&fields));
        for (path, flip) in group_paths(&session).iter().zip(flips) {
            session.set_expanded(path, flip);
        }
        let persisted = encode(&session);

        let old = decode_or_default(&persisted);
        let rebuilt = reconcile(&old, build(as_refs(&fields)));
        prop_assert_eq!(rebuilt, session);
    }

    #[test]
    fn new_groups_start_collapsed(fields in fields_strategy(), extra in path_strategy()) {
        let mut old = build(as_refs(&fields));
        for path in group_paths(&old) {
            old.set_expanded(&path, true);
        }
        let old = decode_or_default(&encode(&old));

        let mut next = fields.clone();
        next.push(("added".to_owned(), extra.map(|p| format!("New/{p}"))));
        let rebuilt = reconcile(&old, build(as_refs(&next)));
        for item in rebuilt.walk() {
            if let Entry::Group(group) = item.entry {
                let path = item.path.unwrap_or_default();
                prop_assert_eq!(group.is_expanded(), !path.starts_with("New"));
            }
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 6. Root order
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn root_order_follows_first_appearance(fields in fields_strategy()) {
        let tree = build(as_refs(&fields));
        let mut expected: Vec<String> = Vec::new();
        for (id, path) in &fields {
            match path {
                None => expected.push(id.clone()),
                Some(path) => {
                    let head = format!("<{}>", path.split('/').next().unwrap_or(""));
                    if !expected.contains(&head) {
                        expected.push(head);
                    }
                }
            }
        }
        let actual: Vec<String> = tree
            .entries()
            .iter()
            .map(|entry| match entry {
                Entry::Leaf(id) => id.clone(),
                Entry::Group(g) => format!("<{}>", g.name()),
            })
            .collect();
        prop_assert_eq!(actual, expected);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 7. No panics on arbitrary input
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn decode_never_panics(text in "[\\[\\]{},01A-C]{0,40}") {
        let _ = decode(&text);
        let _ = decode_or_default(&text);
    }

    #[test]
    fn decoded_text_reencodes_identically(text in "[\\[\\]{},01A-C]{0,40}") {
        if let Ok(tree) = decode(&text) {
            prop_assert_eq!(encode(&tree), text);
        }
    }
}
