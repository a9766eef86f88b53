// src/engine/dispatch.rs

use std::collections::BTreeSet;

use crate::action::PathMatcher;
use crate::watch::RawEvent;

/// Indices of the actions a batch re-triggers, ascending.
///
/// `None` is the startup case and selects every action. Otherwise an action is
/// selected once if any event path matches it, however many events do.
pub fn select_actions<M: PathMatcher>(actions: &[M], batch: Option<&[RawEvent]>) -> Vec<usize> {
    let Some(events) = batch else {
        return (0..actions.len()).collect();
    };

    let mut selected = BTreeSet::new();
    for event in events {
        for (idx, action) in actions.iter().enumerate() {
            if !selected.contains(&idx) && action.matches(&event.path) {
                selected.insert(idx);
            }
        }
    }
    selected.into_iter().collect()
}
