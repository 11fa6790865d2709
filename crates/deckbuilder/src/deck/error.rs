use thiserror::Error;

use super::slide::{PositionKey, SlideId, SlideType};

/// A request the store refused. The state it was applied to is unchanged.
///
/// These are routine inputs (deleting the last slide, dropping a tile out of
/// range), so callers surface them to the user instead of treating them as
/// failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("Cannot delete the only slide in the presentation")]
    LastSlide,

    #[error("Slide index {index} is out of range (deck has {len} slides)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("No slide with id {0}")]
    UnknownSlide(SlideId),

    #[error("Unknown template: {0}")]
    UnknownTemplate(String),

    #[error("A {kind} slide has no {field}")]
    FieldNotOnSlide { field: &'static str, kind: SlideType },

    #[error("A {kind} slide has no image slot '{position}'")]
    ForeignPosition {
        position: PositionKey,
        kind: SlideType,
    },

    #[error("Bullet index {index} is out of range ({len} bullets)")]
    BulletOutOfRange { index: usize, len: usize },

    #[error("A slide must keep at least one bullet point")]
    LastBullet,
}

impl Rejection {
    pub(crate) fn field(field: &'static str, kind: SlideType) -> Self {
        Self::FieldNotOnSlide { field, kind }
    }
}
