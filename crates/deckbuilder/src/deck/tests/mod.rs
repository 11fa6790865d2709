mod cursor;

use super::{Presentation, SlideId, SlideSource};

/// Helper to build a deck of `n` slides, cycling through the catalog.
fn deck_of(n: usize) -> Presentation {
    assert!(n >= 1);
    let ids: Vec<&str> = super::templates::catalog().iter().map(|t| t.id).collect();
    let mut deck = Presentation::new();
    for i in 1..n {
        deck = deck
            .add_slide(SlideSource::Template(ids[i % ids.len()].to_string()))
            .unwrap();
    }
    deck
}

/// Helper to build a deck of `n` slides with the cursor at `cursor`.
fn deck_at(n: usize, cursor: usize) -> Presentation {
    deck_of(n).set_current_slide(cursor).unwrap()
}

/// Assert the snapshot invariants every operation must preserve.
fn assert_valid(deck: &Presentation) {
    assert!(!deck.is_empty(), "deck became empty");
    if let Some(cur) = deck.current_index() {
        assert!(cur < deck.len(), "cursor {cur} out of range for {} slides", deck.len());
    }
    let mut ids = deck.ids();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), deck.len(), "duplicate slide ids");
}

/// Id of the slide under the cursor.
fn current_id(deck: &Presentation) -> SlideId {
    deck.current_slide().expect("cursor set").id()
}
