// tests/dispatch_selection.rs

use proptest::prelude::*;

use devwatch::action::{ActionPattern, PathMatcher};
use devwatch::engine::select_actions;
use devwatch::types::ChangeKind;
use devwatch::watch::RawEvent;

fn patterns(raw: &[&str]) -> Vec<ActionPattern> {
    raw.iter().map(|p| ActionPattern::new(*p)).collect()
}

fn written(paths: &[&str]) -> Vec<RawEvent> {
    paths
        .iter()
        .map(|p| RawEvent::new(*p, ChangeKind::Written))
        .collect()
}

#[test]
fn startup_selects_every_action_in_order() {
    let actions = patterns(&["*.go", "*.css", "[bad"]);
    assert_eq!(select_actions(&actions, None), vec![0, 1, 2]);
}

#[test]
fn no_actions_selects_nothing() {
    let actions: Vec<ActionPattern> = Vec::new();
    assert!(select_actions(&actions, None).is_empty());
    assert!(select_actions(&actions, Some(&written(&["./a.go"]))).is_empty());
}

#[test]
fn each_action_selected_once_however_many_events_match() {
    let actions = patterns(&["*.go", "*.css"]);
    let batch = written(&["./a.go", "./b.go", "./pkg/c.go"]);
    assert_eq!(select_actions(&actions, Some(&batch)), vec![0]);
}

#[test]
fn selection_is_in_configuration_order_not_event_order() {
    let actions = patterns(&["*.go", "*.css", "*.html"]);
    let batch = written(&["./index.html", "./site.css", "./main.go"]);
    assert_eq!(select_actions(&actions, Some(&batch)), vec![0, 1, 2]);
}

#[test]
fn overlapping_patterns_select_both() {
    let actions = patterns(&["*.go", "main.*", "*.rs"]);
    let batch = written(&["./main.go"]);
    assert_eq!(select_actions(&actions, Some(&batch)), vec![0, 1]);
}

#[test]
fn non_matching_batch_selects_nothing() {
    let actions = patterns(&["*.go"]);
    let batch = written(&["./README.md", "./.git/index"]);
    assert!(select_actions(&actions, Some(&batch)).is_empty());
}

#[test]
fn malformed_pattern_is_never_selected_by_events() {
    let actions = patterns(&["[bad", "*.go"]);
    let batch = written(&["./[bad", "./x.go"]);
    assert_eq!(select_actions(&actions, Some(&batch)), vec![1]);
}

proptest! {
    #[test]
    fn selection_equals_any_match_per_action(
        names in proptest::collection::vec(
            prop_oneof![
                Just("a.go"), Just("b.css"), Just("c.rs"), Just("Makefile"), Just("notes.txt")
            ],
            0..12,
        ),
    ) {
        let actions = patterns(&["*.go", "*.css", "*.rs", "Makefile"]);
        let batch: Vec<RawEvent> = names
            .iter()
            .map(|n| RawEvent::new(format!("./src/{n}"), ChangeKind::Written))
            .collect();

        let selected = select_actions(&actions, Some(&batch));

        let expected: Vec<usize> = actions
            .iter()
            .enumerate()
            .filter(|(_, a)| batch.iter().any(|e| PathMatcher::matches(*a, &e.path)))
            .map(|(i, _)| i)
            .collect();

        prop_assert_eq!(&selected, &expected);
        prop_assert!(selected.windows(2).all(|w| w[0] < w[1]));
    }
}
