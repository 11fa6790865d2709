//! State model for a template-driven slide-deck editor.
//!
//! A deck is an ordered list of slides instantiated from a fixed template
//! catalog, a current-slide cursor, and two asset libraries (images and
//! knowledge snippets). Every mutation is a pure `(state, request) -> state`
//! transition; see [`deck::Presentation`] and [`deck::DeckStore`].

pub mod assets;
pub mod config;
pub mod deck;
pub mod render;
