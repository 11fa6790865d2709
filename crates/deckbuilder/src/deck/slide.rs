use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Stable identity of a slide.
///
/// Assigned once when the slide is instantiated and never recomputed. The
/// slide's index in the deck is a view position and changes on reorder; the
/// id does not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlideId(pub u64);

impl fmt::Display for SlideId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "slide-{}", self.0)
    }
}

/// Named image slot on a slide (`main`, `top`, `bottom`, `grid1`..`grid9`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PositionKey {
    Main,
    Top,
    Bottom,
    Grid(u8),
}

impl PositionKey {
    /// Grey level (0-255, all three channels) for an unfilled slot.
    ///
    /// Grid slots alternate between a few close shades so adjacent empty
    /// cells stay distinguishable.
    pub fn placeholder_shade(self) -> u8 {
        let n = match self {
            Self::Grid(n) => n as u32,
            _ => 0,
        };
        (50 + (n * 5) % 20) as u8
    }
}

impl fmt::Display for PositionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Main => write!(f, "main"),
            Self::Top => write!(f, "top"),
            Self::Bottom => write!(f, "bottom"),
            Self::Grid(n) => write!(f, "grid{n}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown image position '{0}'")]
pub struct UnknownPosition(pub String);

impl FromStr for PositionKey {
    type Err = UnknownPosition;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "main" => Ok(Self::Main),
            "top" => Ok(Self::Top),
            "bottom" => Ok(Self::Bottom),
            _ => s
                .strip_prefix("grid")
                .and_then(|n| n.parse::<u8>().ok())
                .filter(|n| (1..=9).contains(n))
                .map(Self::Grid)
                .ok_or_else(|| UnknownPosition(s.to_string())),
        }
    }
}

impl TryFrom<String> for PositionKey {
    type Error = UnknownPosition;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PositionKey> for String {
    fn from(key: PositionKey) -> Self {
        key.to_string()
    }
}

const MAIN: &[PositionKey] = &[PositionKey::Main];
const SPLIT: &[PositionKey] = &[PositionKey::Top, PositionKey::Bottom];
const GRID_3: &[PositionKey] = &[PositionKey::Grid(1), PositionKey::Grid(2), PositionKey::Grid(3)];
const GRID_4: &[PositionKey] = &[
    PositionKey::Grid(1),
    PositionKey::Grid(2),
    PositionKey::Grid(3),
    PositionKey::Grid(4),
];
const GRID_9: &[PositionKey] = &[
    PositionKey::Grid(1),
    PositionKey::Grid(2),
    PositionKey::Grid(3),
    PositionKey::Grid(4),
    PositionKey::Grid(5),
    PositionKey::Grid(6),
    PositionKey::Grid(7),
    PositionKey::Grid(8),
    PositionKey::Grid(9),
];

/// The `type` tag of a slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SlideType {
    Title,
    FullImage,
    RightImage,
    LeftImage,
    RightGrid,
    ImageGrid,
    FourGrid,
    SplitVertical,
}

impl SlideType {
    pub fn all() -> &'static [SlideType] {
        &[
            SlideType::Title,
            SlideType::FullImage,
            SlideType::RightImage,
            SlideType::LeftImage,
            SlideType::RightGrid,
            SlideType::ImageGrid,
            SlideType::FourGrid,
            SlideType::SplitVertical,
        ]
    }

    pub fn tag(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::FullImage => "fullImage",
            Self::RightImage => "rightImage",
            Self::LeftImage => "leftImage",
            Self::RightGrid => "rightGrid",
            Self::ImageGrid => "imageGrid",
            Self::FourGrid => "fourGrid",
            Self::SplitVertical => "splitVertical",
        }
    }

    /// The fixed image slots of this type. Never grows or shrinks at runtime.
    pub fn position_keys(self) -> &'static [PositionKey] {
        match self {
            Self::Title => &[],
            Self::FullImage | Self::RightImage | Self::LeftImage => MAIN,
            Self::RightGrid => GRID_3,
            Self::ImageGrid => GRID_9,
            Self::FourGrid => GRID_4,
            Self::SplitVertical => SPLIT,
        }
    }

    pub fn has_bullets(self) -> bool {
        matches!(self, Self::LeftImage | Self::RightGrid)
    }

    pub fn has_title_toggle(self) -> bool {
        matches!(self, Self::ImageGrid | Self::FourGrid)
    }
}

impl fmt::Display for SlideType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Copy of the fields a slide needs from an image. Not a live link into the
/// image library: removing the library entry leaves this reference intact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub mime: Option<String>,
}

impl ImageRef {
    pub fn from_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            id: None,
            name: None,
            size: None,
            mime: None,
        }
    }

    /// Whether the url is a temporary object URL the caller has to release.
    pub fn is_blob(&self) -> bool {
        self.url.starts_with("blob:")
    }
}

/// Image slots of one slide, keyed by position. Always holds exactly the
/// keys of the slide's type; `None` is an unfilled slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageSlots(BTreeMap<PositionKey, Option<ImageRef>>);

impl ImageSlots {
    pub fn empty(keys: &[PositionKey]) -> Self {
        Self(keys.iter().map(|&k| (k, None)).collect())
    }

    pub fn get(&self, key: PositionKey) -> Option<&ImageRef> {
        self.0.get(&key).and_then(Option::as_ref)
    }

    pub fn contains_key(&self, key: PositionKey) -> bool {
        self.0.contains_key(&key)
    }

    pub fn keys(&self) -> impl Iterator<Item = PositionKey> + '_ {
        self.0.keys().copied()
    }

    /// Slots in key order with their current image, if any.
    pub fn iter(&self) -> impl Iterator<Item = (PositionKey, Option<&ImageRef>)> + '_ {
        self.0.iter().map(|(k, v)| (*k, v.as_ref()))
    }

    pub fn filled(&self) -> impl Iterator<Item = (PositionKey, &ImageRef)> + '_ {
        self.0.iter().filter_map(|(k, v)| v.as_ref().map(|img| (*k, img)))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns `false` without touching anything if `key` is not one of the
    /// slots.
    pub(crate) fn set(&mut self, key: PositionKey, image: Option<ImageRef>) -> bool {
        match self.0.get_mut(&key) {
            Some(slot) => {
                *slot = image;
                true
            }
            None => false,
        }
    }

    /// Rebuild the slots for `keys`, keeping images already placed in a kept
    /// slot and dropping anything else.
    pub(crate) fn conform(&self, keys: &[PositionKey]) -> Self {
        Self(
            keys.iter()
                .map(|&k| (k, self.0.get(&k).cloned().flatten()))
                .collect(),
        )
    }
}

/// Variant-specific fields of a slide, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SlideContent {
    Title {
        subtitle: String,
    },
    FullImage {
        subtitle: String,
        attribution: String,
        images: ImageSlots,
    },
    RightImage {
        #[serde(rename = "content")]
        body: String,
        images: ImageSlots,
    },
    LeftImage {
        #[serde(rename = "content")]
        body: String,
        #[serde(rename = "bulletPoints")]
        bullets: Vec<String>,
        images: ImageSlots,
    },
    RightGrid {
        #[serde(rename = "content")]
        body: String,
        #[serde(rename = "bulletPoints")]
        bullets: Vec<String>,
        images: ImageSlots,
    },
    ImageGrid {
        #[serde(rename = "showTitle", default = "default_show_title")]
        show_title: bool,
        images: ImageSlots,
    },
    FourGrid {
        #[serde(rename = "showTitle", default = "default_show_title")]
        show_title: bool,
        images: ImageSlots,
    },
    SplitVertical {
        #[serde(rename = "content")]
        body: String,
        images: ImageSlots,
    },
}

fn default_show_title() -> bool {
    true
}

impl SlideContent {
    pub fn kind(&self) -> SlideType {
        match self {
            Self::Title { .. } => SlideType::Title,
            Self::FullImage { .. } => SlideType::FullImage,
            Self::RightImage { .. } => SlideType::RightImage,
            Self::LeftImage { .. } => SlideType::LeftImage,
            Self::RightGrid { .. } => SlideType::RightGrid,
            Self::ImageGrid { .. } => SlideType::ImageGrid,
            Self::FourGrid { .. } => SlideType::FourGrid,
            Self::SplitVertical { .. } => SlideType::SplitVertical,
        }
    }

    pub fn images(&self) -> Option<&ImageSlots> {
        match self {
            Self::Title { .. } => None,
            Self::FullImage { images, .. }
            | Self::RightImage { images, .. }
            | Self::LeftImage { images, .. }
            | Self::RightGrid { images, .. }
            | Self::ImageGrid { images, .. }
            | Self::FourGrid { images, .. }
            | Self::SplitVertical { images, .. } => Some(images),
        }
    }

    pub(crate) fn images_mut(&mut self) -> Option<&mut ImageSlots> {
        match self {
            Self::Title { .. } => None,
            Self::FullImage { images, .. }
            | Self::RightImage { images, .. }
            | Self::LeftImage { images, .. }
            | Self::RightGrid { images, .. }
            | Self::ImageGrid { images, .. }
            | Self::FourGrid { images, .. }
            | Self::SplitVertical { images, .. } => Some(images),
        }
    }

    pub fn subtitle(&self) -> Option<&str> {
        match self {
            Self::Title { subtitle } | Self::FullImage { subtitle, .. } => Some(subtitle),
            _ => None,
        }
    }

    pub(crate) fn subtitle_mut(&mut self) -> Option<&mut String> {
        match self {
            Self::Title { subtitle } | Self::FullImage { subtitle, .. } => Some(subtitle),
            _ => None,
        }
    }

    pub fn attribution(&self) -> Option<&str> {
        match self {
            Self::FullImage { attribution, .. } => Some(attribution),
            _ => None,
        }
    }

    pub(crate) fn attribution_mut(&mut self) -> Option<&mut String> {
        match self {
            Self::FullImage { attribution, .. } => Some(attribution),
            _ => None,
        }
    }

    pub fn body(&self) -> Option<&str> {
        match self {
            Self::RightImage { body, .. }
            | Self::LeftImage { body, .. }
            | Self::RightGrid { body, .. }
            | Self::SplitVertical { body, .. } => Some(body),
            _ => None,
        }
    }

    pub(crate) fn body_mut(&mut self) -> Option<&mut String> {
        match self {
            Self::RightImage { body, .. }
            | Self::LeftImage { body, .. }
            | Self::RightGrid { body, .. }
            | Self::SplitVertical { body, .. } => Some(body),
            _ => None,
        }
    }

    pub fn bullets(&self) -> Option<&[String]> {
        match self {
            Self::LeftImage { bullets, .. } | Self::RightGrid { bullets, .. } => Some(bullets),
            _ => None,
        }
    }

    pub(crate) fn bullets_mut(&mut self) -> Option<&mut Vec<String>> {
        match self {
            Self::LeftImage { bullets, .. } | Self::RightGrid { bullets, .. } => Some(bullets),
            _ => None,
        }
    }

    /// `None` for types without a title overlay toggle.
    pub fn show_title(&self) -> Option<bool> {
        match self {
            Self::ImageGrid { show_title, .. } | Self::FourGrid { show_title, .. } => {
                Some(*show_title)
            }
            _ => None,
        }
    }

    pub(crate) fn show_title_mut(&mut self) -> Option<&mut bool> {
        match self {
            Self::ImageGrid { show_title, .. } | Self::FourGrid { show_title, .. } => {
                Some(show_title)
            }
            _ => None,
        }
    }

    /// Force the image slots to the type's fixed key set and give bullet
    /// slides at least one bullet.
    pub(crate) fn normalized(mut self) -> Self {
        let keys = self.kind().position_keys();
        if let Some(images) = self.images_mut() {
            *images = images.conform(keys);
        }
        if let Some(bullets) = self.bullets_mut() {
            if bullets.is_empty() {
                bullets.push(super::edit::NEW_BULLET.to_string());
            }
        }
        self
    }
}

/// One page of the deck.
///
/// Fields are read-only outside the crate; changes go through the store so
/// every published slide stays immutable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slide {
    id: SlideId,
    title: String,
    #[serde(flatten)]
    content: SlideContent,
}

impl Slide {
    pub(crate) fn new(id: SlideId, title: String, content: SlideContent) -> Self {
        Self {
            id,
            title,
            content: content.normalized(),
        }
    }

    pub fn id(&self) -> SlideId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &SlideContent {
        &self.content
    }

    pub fn kind(&self) -> SlideType {
        self.content.kind()
    }

    pub fn images(&self) -> Option<&ImageSlots> {
        self.content.images()
    }

    pub fn bullets(&self) -> Option<&[String]> {
        self.content.bullets()
    }

    /// Title overlay visibility. Types without a toggle always show it.
    pub fn shows_title(&self) -> bool {
        self.content.show_title().unwrap_or(true)
    }

    /// Deep copy under a new identity.
    pub(crate) fn duplicate_as(&self, id: SlideId) -> Self {
        Self {
            id,
            ..self.clone()
        }
    }

    pub(crate) fn title_mut(&mut self) -> &mut String {
        &mut self.title
    }

    pub(crate) fn content_mut(&mut self) -> &mut SlideContent {
        &mut self.content
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_key_parse() {
        assert_eq!("main".parse::<PositionKey>(), Ok(PositionKey::Main));
        assert_eq!("grid7".parse::<PositionKey>(), Ok(PositionKey::Grid(7)));
        assert!("grid0".parse::<PositionKey>().is_err());
        assert!("grid10".parse::<PositionKey>().is_err());
        assert!("left".parse::<PositionKey>().is_err());
        assert_eq!(PositionKey::Grid(3).to_string(), "grid3");
    }

    #[test]
    fn test_placeholder_shade() {
        assert_eq!(PositionKey::Main.placeholder_shade(), 50);
        assert_eq!(PositionKey::Grid(1).placeholder_shade(), 55);
        assert_eq!(PositionKey::Grid(3).placeholder_shade(), 65);
        assert_eq!(PositionKey::Grid(4).placeholder_shade(), 50);
    }

    #[test]
    fn test_slots_reject_foreign_key() {
        let mut slots = ImageSlots::empty(SlideType::SplitVertical.position_keys());
        assert!(!slots.set(PositionKey::Main, Some(ImageRef::from_url("a.png"))));
        assert!(slots.set(PositionKey::Top, Some(ImageRef::from_url("a.png"))));
        assert_eq!(slots.keys().collect::<Vec<_>>(), vec![PositionKey::Top, PositionKey::Bottom]);
        assert_eq!(slots.get(PositionKey::Top).map(|i| i.url.as_str()), Some("a.png"));
        assert!(slots.get(PositionKey::Bottom).is_none());
    }

    #[test]
    fn test_normalized_conforms_slots() {
        let mut stray = ImageSlots::empty(&[PositionKey::Main, PositionKey::Grid(2)]);
        stray.set(PositionKey::Grid(2), Some(ImageRef::from_url("kept.png")));
        stray.set(PositionKey::Main, Some(ImageRef::from_url("dropped.png")));
        let content = SlideContent::FourGrid {
            show_title: false,
            images: stray,
        }
        .normalized();
        let images = content.images().unwrap();
        assert_eq!(images.len(), 4);
        assert!(!images.contains_key(PositionKey::Main));
        assert_eq!(images.get(PositionKey::Grid(2)).unwrap().url, "kept.png");
    }

    #[test]
    fn test_normalized_restores_a_bullet() {
        let content = SlideContent::LeftImage {
            body: String::new(),
            bullets: vec![],
            images: ImageSlots::default(),
        }
        .normalized();
        assert_eq!(content.bullets().map(<[String]>::len), Some(1));
    }

    #[test]
    fn test_slide_yaml_uses_type_tag() {
        let slide = Slide::new(
            SlideId(4),
            "Portfolio".to_string(),
            SlideContent::ImageGrid {
                show_title: false,
                images: ImageSlots::empty(SlideType::ImageGrid.position_keys()),
            },
        );
        let yaml = serde_yaml::to_string(&slide).unwrap();
        assert!(yaml.contains("type: imageGrid"), "{yaml}");
        assert!(yaml.contains("showTitle: false"), "{yaml}");
        assert!(yaml.contains("grid9: null"), "{yaml}");
    }
}
