//! Per-type thumbnail of one slide.
//!
//! Each arm reads only the fields its slide type carries; nothing here
//! looks at a field through a type that does not define it.

use crate::deck::{ImageRef, ImageSlots, PositionKey, Slide, SlideContent};

/// Longest text line kept in a thumbnail, in characters.
pub const LINE_WIDTH: usize = 48;

/// How an image slot is drawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotView {
    Filled { position: PositionKey, label: String },
    /// Unfilled slot, painted with its placeholder grey.
    Empty { position: PositionKey, shade: u8 },
}

impl SlotView {
    fn of(position: PositionKey, image: Option<&ImageRef>) -> Self {
        match image {
            Some(image) => Self::Filled {
                position,
                label: image_label(image),
            },
            None => Self::Empty {
                position,
                shade: position.placeholder_shade(),
            },
        }
    }

    pub fn is_filled(&self) -> bool {
        matches!(self, Self::Filled { .. })
    }
}

impl std::fmt::Display for SlotView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Filled { position, label } => write!(f, "[{position}: {label}]"),
            Self::Empty { position, shade } => {
                write!(f, "[{position}: empty #{shade:02x}{shade:02x}{shade:02x}]")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thumbnail {
    /// `None` when the slide hides its title.
    pub heading: Option<String>,
    pub lines: Vec<String>,
    pub slots: Vec<SlotView>,
}

impl Thumbnail {
    pub fn filled_slots(&self) -> usize {
        self.slots.iter().filter(|s| s.is_filled()).count()
    }
}

pub fn thumbnail(slide: &Slide) -> Thumbnail {
    let heading = Some(truncate(slide.title(), LINE_WIDTH));
    match slide.content() {
        SlideContent::Title { subtitle } => Thumbnail {
            heading,
            lines: text_lines(subtitle),
            slots: Vec::new(),
        },
        SlideContent::FullImage {
            subtitle,
            attribution,
            images,
        } => {
            let mut lines = text_lines(subtitle);
            if !attribution.trim().is_empty() {
                lines.push(format!("- {}", truncate(attribution, LINE_WIDTH - 2)));
            }
            Thumbnail {
                heading,
                lines,
                slots: slots(images),
            }
        }
        SlideContent::RightImage { body, images } | SlideContent::SplitVertical { body, images } => {
            Thumbnail {
                heading,
                lines: text_lines(body),
                slots: slots(images),
            }
        }
        SlideContent::LeftImage {
            body,
            bullets,
            images,
        }
        | SlideContent::RightGrid {
            body,
            bullets,
            images,
        } => {
            let mut lines = text_lines(body);
            lines.extend(
                bullets
                    .iter()
                    .map(|b| format!("* {}", truncate(b, LINE_WIDTH - 2))),
            );
            Thumbnail {
                heading,
                lines,
                slots: slots(images),
            }
        }
        SlideContent::ImageGrid { show_title, images }
        | SlideContent::FourGrid { show_title, images } => Thumbnail {
            heading: heading.filter(|_| *show_title),
            lines: Vec::new(),
            slots: slots(images),
        },
    }
}

fn slots(images: &ImageSlots) -> Vec<SlotView> {
    images
        .iter()
        .map(|(position, image)| SlotView::of(position, image))
        .collect()
}

fn text_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(|l| truncate(l, LINE_WIDTH))
        .collect()
}

fn image_label(image: &ImageRef) -> String {
    if let Some(name) = image.name.as_deref().filter(|n| !n.is_empty()) {
        return name.to_string();
    }
    if image.url.starts_with("data:") {
        "embedded image".to_string()
    } else if image.is_blob() {
        "uploaded image".to_string()
    } else {
        truncate(&image.url, LINE_WIDTH / 2)
    }
}

/// Shorten to at most `max` characters, marking the cut with "...".
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", kept.trim_end())
}
