use serde::{Deserialize, Serialize};

use super::error::Rejection;
use super::slide::{ImageRef, PositionKey, Slide};

/// Text given to a bullet added without any.
pub const NEW_BULLET: &str = "New point";

/// A typed change to one field of a slide.
///
/// Which variants apply depends on the slide's type; an edit naming a field
/// the slide doesn't have is refused rather than creating the field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SlideEdit {
    SetTitle(String),
    SetSubtitle(String),
    SetAttribution(String),
    SetBody(String),
    SetBullet {
        index: usize,
        text: String,
    },
    /// Insert before `index`; `index == len` appends.
    InsertBullet {
        index: usize,
        #[serde(default)]
        text: Option<String>,
    },
    PushBullet {
        #[serde(default)]
        text: Option<String>,
    },
    RemoveBullet {
        index: usize,
    },
    /// `image: None` clears the slot back to its placeholder.
    SetImage {
        position: PositionKey,
        #[serde(default)]
        image: Option<ImageRef>,
    },
    SetShowTitle(bool),
    ToggleShowTitle,
}

impl SlideEdit {
    /// Short name for log lines.
    pub fn label(&self) -> &'static str {
        match self {
            Self::SetTitle(_) => "set-title",
            Self::SetSubtitle(_) => "set-subtitle",
            Self::SetAttribution(_) => "set-attribution",
            Self::SetBody(_) => "set-body",
            Self::SetBullet { .. } => "set-bullet",
            Self::InsertBullet { .. } => "insert-bullet",
            Self::PushBullet { .. } => "push-bullet",
            Self::RemoveBullet { .. } => "remove-bullet",
            Self::SetImage { .. } => "set-image",
            Self::SetShowTitle(_) => "set-show-title",
            Self::ToggleShowTitle => "toggle-show-title",
        }
    }
}

impl Slide {
    /// Apply `edit` in place. Only ever called on a private copy of a
    /// published slide; on `Err` the copy is discarded.
    pub(crate) fn apply_edit(&mut self, edit: SlideEdit) -> Result<(), Rejection> {
        let kind = self.kind();
        let content = self.content_mut();
        match edit {
            SlideEdit::SetTitle(text) => *self.title_mut() = text,
            SlideEdit::SetSubtitle(text) => {
                *content
                    .subtitle_mut()
                    .ok_or(Rejection::field("subtitle", kind))? = text;
            }
            SlideEdit::SetAttribution(text) => {
                *content
                    .attribution_mut()
                    .ok_or(Rejection::field("attribution", kind))? = text;
            }
            SlideEdit::SetBody(text) => {
                *content
                    .body_mut()
                    .ok_or(Rejection::field("content", kind))? = text;
            }
            SlideEdit::SetBullet { index, text } => {
                let bullets = content
                    .bullets_mut()
                    .ok_or(Rejection::field("bullet points", kind))?;
                let len = bullets.len();
                let slot = bullets
                    .get_mut(index)
                    .ok_or(Rejection::BulletOutOfRange { index, len })?;
                *slot = text;
            }
            SlideEdit::InsertBullet { index, text } => {
                let bullets = content
                    .bullets_mut()
                    .ok_or(Rejection::field("bullet points", kind))?;
                if index > bullets.len() {
                    return Err(Rejection::BulletOutOfRange {
                        index,
                        len: bullets.len(),
                    });
                }
                bullets.insert(index, text.unwrap_or_else(|| NEW_BULLET.to_string()));
            }
            SlideEdit::PushBullet { text } => {
                content
                    .bullets_mut()
                    .ok_or(Rejection::field("bullet points", kind))?
                    .push(text.unwrap_or_else(|| NEW_BULLET.to_string()));
            }
            SlideEdit::RemoveBullet { index } => {
                let bullets = content
                    .bullets_mut()
                    .ok_or(Rejection::field("bullet points", kind))?;
                if index >= bullets.len() {
                    return Err(Rejection::BulletOutOfRange {
                        index,
                        len: bullets.len(),
                    });
                }
                if bullets.len() == 1 {
                    return Err(Rejection::LastBullet);
                }
                bullets.remove(index);
            }
            SlideEdit::SetImage { position, image } => {
                let images = content
                    .images_mut()
                    .ok_or(Rejection::field("images", kind))?;
                if !images.set(position, image) {
                    return Err(Rejection::ForeignPosition { position, kind });
                }
            }
            SlideEdit::SetShowTitle(show) => {
                *content
                    .show_title_mut()
                    .ok_or(Rejection::field("title toggle", kind))? = show;
            }
            SlideEdit::ToggleShowTitle => {
                let show = content
                    .show_title_mut()
                    .ok_or(Rejection::field("title toggle", kind))?;
                *show = !*show;
            }
        }
        Ok(())
    }
}

/// Object URLs referenced by `before` that `after` no longer references.
///
/// The store never releases anything; a caller that created `blob:` URLs for
/// previews uses this after an edit to know which ones it can revoke.
pub fn released_urls(before: &Slide, after: &Slide) -> Vec<String> {
    let still_used: Vec<&str> = after
        .images()
        .into_iter()
        .flat_map(|slots| slots.filled())
        .map(|(_, img)| img.url.as_str())
        .collect();
    let mut released: Vec<String> = before
        .images()
        .into_iter()
        .flat_map(|slots| slots.filled())
        .map(|(_, img)| img)
        .filter(|img| img.is_blob() && !still_used.contains(&img.url.as_str()))
        .map(|img| img.url.clone())
        .collect();
    released.sort_unstable();
    released.dedup();
    released
}
