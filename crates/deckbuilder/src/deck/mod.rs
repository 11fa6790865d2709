pub mod drag;
pub mod edit;
pub mod editing;
pub mod error;
pub mod slide;
pub mod store;
pub mod templates;

#[cfg(test)]
mod tests;

pub use edit::SlideEdit;
pub use error::Rejection;
pub use slide::{ImageRef, ImageSlots, PositionKey, Slide, SlideContent, SlideId, SlideType};
pub use store::{DeckStore, Mutation, Presentation, SlideSource};
