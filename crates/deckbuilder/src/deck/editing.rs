//! In-place editing of one slide field at a time.
//!
//! An [`EditSession`] remembers which slide the user is working on and, while
//! a field is open, holds a private draft of it. Keystrokes only touch the
//! draft; committing turns it into a [`Mutation`] for the store, reverting
//! throws it away. The slide is remembered by id, so reordering or deleting
//! other slides mid-edit cannot redirect the commit to a different slide.

use super::edit::SlideEdit;
use super::error::Rejection;
use super::slide::{ImageRef, PositionKey, Slide, SlideId};
use super::store::{Mutation, Presentation};

/// A text field of a slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextField {
    Title,
    Subtitle,
    Attribution,
    Body,
    Bullet(usize),
}

impl TextField {
    /// Current value on `slide`, or `None` if the slide's type lacks it.
    pub fn read(self, slide: &Slide) -> Option<&str> {
        let content = slide.content();
        match self {
            Self::Title => Some(slide.title()),
            Self::Subtitle => content.subtitle(),
            Self::Attribution => content.attribution(),
            Self::Body => content.body(),
            Self::Bullet(i) => content.bullets()?.get(i).map(String::as_str),
        }
    }

    pub fn is_multiline(self) -> bool {
        matches!(self, Self::Body)
    }

    fn name(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Subtitle => "subtitle",
            Self::Attribution => "attribution",
            Self::Body => "content",
            Self::Bullet(_) => "bullet point",
        }
    }

    fn edit(self, text: String) -> SlideEdit {
        match self {
            Self::Title => SlideEdit::SetTitle(text),
            Self::Subtitle => SlideEdit::SetSubtitle(text),
            Self::Attribution => SlideEdit::SetAttribution(text),
            Self::Body => SlideEdit::SetBody(text),
            Self::Bullet(index) => SlideEdit::SetBullet { index, text },
        }
    }
}

/// What is being edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditTarget {
    Text(TextField),
    Image(PositionKey),
}

/// Category of the open edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKind {
    Text,
    Image,
}

impl EditTarget {
    pub fn kind(self) -> EditKind {
        match self {
            Self::Text(_) => EditKind::Text,
            Self::Image(_) => EditKind::Image,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Draft {
    Text(String),
    Image(Option<ImageRef>),
}

#[derive(Debug, Clone)]
struct OpenField {
    target: EditTarget,
    original: Draft,
    draft: Draft,
}

/// Key events the session reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKey {
    Enter { shift: bool },
    Escape,
    /// Focus left the field.
    Blur,
}

#[derive(Debug, Clone, Default)]
pub struct EditSession {
    active_slide: Option<SlideId>,
    open: Option<OpenField>,
}

impl EditSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_editing(&self) -> bool {
        self.open.is_some()
    }

    pub fn active_slide(&self) -> Option<SlideId> {
        self.active_slide
    }

    /// Where the active slide sits in `deck` right now.
    pub fn active_slide_index(&self, deck: &Presentation) -> Option<usize> {
        deck.position_of(self.active_slide?)
    }

    pub fn active_target(&self) -> Option<EditTarget> {
        self.open.as_ref().map(|f| f.target)
    }

    pub fn active_kind(&self) -> Option<EditKind> {
        self.active_target().map(EditTarget::kind)
    }

    /// Current draft text of an open text field.
    pub fn draft_text(&self) -> Option<&str> {
        match &self.open.as_ref()?.draft {
            Draft::Text(text) => Some(text),
            Draft::Image(_) => None,
        }
    }

    /// Open `target` on the slide at `index`, seeding the draft with its
    /// current value. Any field already open is abandoned without commit.
    pub fn start(
        &mut self,
        deck: &Presentation,
        index: usize,
        target: EditTarget,
    ) -> Result<(), Rejection> {
        let slide = deck.slide(index).ok_or(Rejection::IndexOutOfRange {
            index,
            len: deck.len(),
        })?;
        let kind = slide.kind();
        let original = match target {
            EditTarget::Text(field) => Draft::Text(
                field
                    .read(slide)
                    .ok_or(Rejection::field(field.name(), kind))?
                    .to_string(),
            ),
            EditTarget::Image(position) => {
                let images = slide.images().ok_or(Rejection::field("images", kind))?;
                if !images.contains_key(position) {
                    return Err(Rejection::ForeignPosition { position, kind });
                }
                Draft::Image(images.get(position).cloned())
            }
        };
        self.active_slide = Some(slide.id());
        self.open = Some(OpenField {
            target,
            draft: original.clone(),
            original,
        });
        Ok(())
    }

    /// Replace the draft text. Ignored unless a text field is open.
    pub fn set_text(&mut self, text: impl Into<String>) {
        if let Some(OpenField {
            draft: Draft::Text(draft),
            ..
        }) = &mut self.open
        {
            *draft = text.into();
        }
    }

    /// Replace the draft image. Ignored unless an image slot is open.
    pub fn set_image(&mut self, image: Option<ImageRef>) {
        if let Some(OpenField {
            draft: Draft::Image(draft),
            ..
        }) = &mut self.open
        {
            *draft = image;
        }
    }

    /// Close the field and drop the draft. The slide stays active.
    pub fn cancel(&mut self) {
        self.open = None;
    }

    /// Close the field, producing the change to dispatch if the draft
    /// differs from what the field held when it was opened.
    pub fn finish(&mut self) -> Option<Mutation> {
        let open = self.open.take()?;
        let id = self.active_slide?;
        if open.draft == open.original {
            return None;
        }
        let edit = match (open.target, open.draft) {
            (EditTarget::Text(field), Draft::Text(text)) => field.edit(text),
            (EditTarget::Image(position), Draft::Image(image)) => {
                SlideEdit::SetImage { position, image }
            }
            _ => return None,
        };
        Some(Mutation::EditSlide { id, edit })
    }

    /// Commit `value` as the field's new text.
    pub fn finish_with(&mut self, value: impl Into<String>) -> Option<Mutation> {
        self.set_text(value);
        self.finish()
    }

    /// Enter (without shift) and blur commit; Escape reverts. Shift+Enter
    /// inserts a newline in multi-line fields and commits elsewhere.
    pub fn handle_key(&mut self, key: EditKey) -> Option<Mutation> {
        match key {
            EditKey::Escape => {
                self.cancel();
                None
            }
            EditKey::Enter { shift: true } if self.accepts_newline() => {
                if let Some(OpenField {
                    draft: Draft::Text(draft),
                    ..
                }) = &mut self.open
                {
                    draft.push('\n');
                }
                None
            }
            EditKey::Enter { .. } | EditKey::Blur => self.finish(),
        }
    }

    fn accepts_newline(&self) -> bool {
        matches!(
            self.active_target(),
            Some(EditTarget::Text(field)) if field.is_multiline()
        )
    }
}
