//! Plain-text view of a deck, one entry per slide in view order.

pub mod thumbnail;

use crate::deck::Presentation;

pub use thumbnail::{SlotView, Thumbnail, thumbnail};

/// One navigator entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// 1-based position, as shown to the user.
    pub number: usize,
    pub kind: &'static str,
    pub current: bool,
    pub thumbnail: Thumbnail,
}

pub fn entries(deck: &Presentation) -> Vec<Entry> {
    deck.slides()
        .enumerate()
        .map(|(i, slide)| Entry {
            number: i + 1,
            kind: slide.kind().tag(),
            current: deck.current_index() == Some(i),
            thumbnail: thumbnail(slide),
        })
        .collect()
}

/// Render the whole navigator strip. The current slide is marked with `>`.
pub fn outline(deck: &Presentation) -> String {
    let mut out = String::new();
    for entry in entries(deck) {
        let marker = if entry.current { '>' } else { ' ' };
        let heading = entry.thumbnail.heading.as_deref().unwrap_or("(title hidden)");
        out.push_str(&format!(
            "{marker} {:>2}. [{}] {heading}\n",
            entry.number, entry.kind
        ));
        for line in &entry.thumbnail.lines {
            out.push_str(&format!("       {line}\n"));
        }
        if !entry.thumbnail.slots.is_empty() {
            let slots: Vec<String> = entry.thumbnail.slots.iter().map(|s| s.to_string()).collect();
            out.push_str(&format!("       {}\n", slots.join(" ")));
        }
    }
    out
}

/// One-line summary of the libraries.
pub fn library_summary(deck: &Presentation) -> String {
    format!(
        "{} slide(s), {} image(s), {} knowledge item(s)",
        deck.len(),
        deck.images().len(),
        deck.knowledge().len()
    )
}
