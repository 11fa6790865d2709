use super::*;
use crate::deck::{Mutation, Rejection};

#[test]
fn add_moves_cursor_to_new_last() {
    let deck = deck_at(3, 0);
    let next = deck
        .add_slide(SlideSource::Template("four-image-grid".into()))
        .unwrap();
    assert_eq!(next.len(), 4);
    assert_eq!(next.current_index(), Some(3));
    assert_valid(&next);
}

#[test]
fn add_unknown_template_is_refused() {
    let deck = deck_of(2);
    assert_eq!(
        deck.add_slide(SlideSource::Template("mystery".into())),
        Err(Rejection::UnknownTemplate("mystery".into()))
    );
}

#[test]
fn set_current_out_of_range_is_refused() {
    let deck = deck_at(3, 1);
    assert_eq!(
        deck.set_current_slide(3),
        Err(Rejection::IndexOutOfRange { index: 3, len: 3 })
    );
    assert_eq!(deck.set_current_slide(2).unwrap().current_index(), Some(2));
}

#[test]
fn update_leaves_cursor_and_order() {
    let deck = deck_at(4, 2);
    let next = deck
        .update_slide(1, crate::deck::SlideEdit::SetTitle("Changed".into()))
        .unwrap();
    assert_eq!(next.current_index(), Some(2));
    assert_eq!(next.ids(), deck.ids());
    assert_eq!(next.slide(1).unwrap().title(), "Changed");
}

#[test]
fn cursor_stays_in_range_through_any_short_sequence() {
    // Every sequence of three operations drawn from a fixed menu, applied
    // to a four-slide deck with the cursor at each position.
    let menu = |len: usize| -> Vec<Mutation> {
        let mut ops = vec![Mutation::AddSlide(SlideSource::Template(
            "text-image-right".into(),
        ))];
        for i in 0..len + 1 {
            ops.push(Mutation::DeleteSlide { index: i });
            ops.push(Mutation::DuplicateSlide { index: i });
            for j in 0..len + 1 {
                ops.push(Mutation::ReorderSlide { from: i, to: j });
            }
        }
        ops
    };

    for start in 0..4 {
        let mut frontier = vec![deck_at(4, start)];
        for _ in 0..3 {
            let mut next_frontier = Vec::new();
            for deck in &frontier {
                for op in menu(deck.len()) {
                    if let Ok(next) = deck.apply(op) {
                        assert_valid(&next);
                        next_frontier.push(next);
                    }
                }
            }
            // Keep the search bounded.
            next_frontier.truncate(40);
            frontier = next_frontier;
        }
    }
}
