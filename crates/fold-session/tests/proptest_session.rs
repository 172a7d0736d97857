//! Property tests for expansion state carried across session cycles.
//!
//! 1. Whatever headers are clicked, a fresh session over the same object
//!    reproduces exactly the resulting expansion state.
//! 2. Drawing never writes when nothing was clicked.
//! 3. Garbage persisted text never fails a refresh.

use fold_session::{
    AnnotationTable, FoldoutSession, MemoryObject, OutlineRenderer, SessionConfig,
};
use proptest::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────────

fn path_strategy() -> impl Strategy<Value = Option<String>> {
    prop::option::weighted(
        0.7,
        prop::collection::vec(prop::sample::select(vec!["A", "B", "C"]), 1..4)
            .prop_map(|segments| segments.join("/")),
    )
}

fn setup(paths: &[Option<String>]) -> (MemoryObject, AnnotationTable) {
    let fields: Vec<String> = (0..paths.len()).map(|i| format!("f{i}")).collect();
    let annotations = fields
        .iter()
        .zip(paths)
        .filter_map(|(field, path)| Some((field.clone(), path.clone()?)))
        .collect();
    (MemoryObject::new(fields), annotations)
}

fn all_group_paths(session: &FoldoutSession) -> Vec<String> {
    session
        .tree()
        .map(|tree| tree.walk().filter_map(|item| item.path).collect())
        .unwrap_or_default()
}

// ── Properties ──────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn clicked_state_survives_new_session(
        paths in prop::collection::vec(path_strategy(), 1..16),
        picks in prop::collection::vec(any::<prop::sample::Index>(), 0..6),
    ) {
        let (mut object, annotations) = setup(&paths);
        let mut session = FoldoutSession::new(SessionConfig::default());
        session.enable(&mut object, &annotations).unwrap();

        let groups = all_group_paths(&session);
        prop_assume!(!groups.is_empty());
        for pick in &picks {
            let path = pick.get(&groups);
            session.toggle(path, &mut object).unwrap();
        }
        let expected = session.tree().unwrap().expanded_paths();

        let mut next = FoldoutSession::new(SessionConfig::default());
        let report = next.enable(&mut object, &annotations).unwrap();
        prop_assert!(!report.wrote_back);
        prop_assert_eq!(report.stats.fresh, 0);
        prop_assert_eq!(next.tree().unwrap().expanded_paths(), expected);
    }

    #[test]
    fn draw_without_clicks_never_writes(
        paths in prop::collection::vec(path_strategy(), 0..16),
    ) {
        let (mut object, annotations) = setup(&paths);
        let mut session = FoldoutSession::new(SessionConfig::default());
        session.enable(&mut object, &annotations).unwrap();
        let writes = object.writes();

        let mut outline = OutlineRenderer::new();
        let toggled = session.draw(&mut object, &mut outline).unwrap();
        prop_assert_eq!(toggled, 0);
        prop_assert_eq!(object.writes(), writes);
        prop_assert_eq!(outline.lines().len(), session.tree().unwrap().visible_count());
    }

    #[test]
    fn garbage_state_never_fails_refresh(
        paths in prop::collection::vec(path_strategy(), 0..8),
        text in "[\\[\\]{}A-C01, ]{0,24}",
    ) {
        let (object, annotations) = setup(&paths);
        let object = object.with_state(text);
        let mut session = FoldoutSession::new(SessionConfig::default());
        let report = session.refresh(&object, &annotations);
        prop_assert!(report.grouped);
        prop_assert_eq!(report.stats.matched + report.stats.fresh, all_group_paths(&session).len());
    }
}
