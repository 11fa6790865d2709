use super::slide::{ImageSlots, Slide, SlideContent, SlideId, SlideType};

/// Template the first slide of a new deck is built from.
pub const INITIAL_TEMPLATE: &str = "title-only";

const DEFAULT_BULLETS: [&str; 3] = [
    "First key point goes here",
    "Second important feature or benefit",
    "Third compelling reason or example",
];

/// A named factory for a structurally complete slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Template {
    pub id: &'static str,
    pub name: &'static str,
    pub kind: SlideType,
    pub default_title: &'static str,
    pub default_body: &'static str,
}

const CATALOG: &[Template] = &[
    Template {
        id: "title-only",
        name: "Title Slide",
        kind: SlideType::Title,
        default_title: "Presentation Title",
        default_body: "",
    },
    Template {
        id: "title-slide",
        name: "Full Image with Title",
        kind: SlideType::FullImage,
        default_title: "Your Title Here",
        default_body: "",
    },
    Template {
        id: "text-image-right",
        name: "Text + Right Image",
        kind: SlideType::RightImage,
        default_title: "Section Title",
        default_body: "This is where you can add your main content. Describe your products, \
                       services, or key messages here. This text block supports multiple paragraphs.",
    },
    Template {
        id: "text-image-left",
        name: "Text + Left Image",
        kind: SlideType::LeftImage,
        default_title: "Feature Overview",
        default_body: "Use this space to highlight features, benefits, or any important \
                       information you want to convey to your audience.",
    },
    Template {
        id: "text-with-triple-image",
        name: "Text + Triple Image",
        kind: SlideType::RightGrid,
        default_title: "Key Services",
        default_body: "This area can contain your main content description. The bullet points \
                       below can highlight specific features or services.",
    },
    Template {
        id: "nine-image-grid",
        name: "9-Image Grid",
        kind: SlideType::ImageGrid,
        default_title: "Portfolio",
        default_body: "",
    },
    Template {
        id: "text-dual-image",
        name: "Text + Dual Image",
        kind: SlideType::SplitVertical,
        default_title: "Multi-Purpose Content",
        default_body: "This layout combines text with dual images. Ideal for comparing \
                       before/after scenarios or showing related concepts side by side.",
    },
    Template {
        id: "four-image-grid",
        name: "4-Image Grid",
        kind: SlideType::FourGrid,
        default_title: "Product Showcase",
        default_body: "",
    },
];

pub fn catalog() -> &'static [Template] {
    CATALOG
}

pub fn find(id: &str) -> Option<&'static Template> {
    CATALOG.iter().find(|t| t.id == id)
}

impl Template {
    /// Build a fresh slide with every field of its type present.
    pub fn instantiate(&self, id: SlideId) -> Slide {
        Slide::new(id, self.default_title.to_string(), self.default_content())
    }

    fn default_content(&self) -> SlideContent {
        let images = ImageSlots::empty(self.kind.position_keys());
        let body = self.default_body.to_string();
        let bullets = || DEFAULT_BULLETS.iter().map(|b| b.to_string()).collect();
        match self.kind {
            SlideType::Title => SlideContent::Title {
                subtitle: "Subtitle or Author Information".to_string(),
            },
            SlideType::FullImage => SlideContent::FullImage {
                subtitle: "Subtitle Text Here".to_string(),
                attribution: "Your Name / Company".to_string(),
                images,
            },
            SlideType::RightImage => SlideContent::RightImage { body, images },
            SlideType::LeftImage => SlideContent::LeftImage {
                body,
                bullets: bullets(),
                images,
            },
            SlideType::RightGrid => SlideContent::RightGrid {
                body,
                bullets: bullets(),
                images,
            },
            SlideType::ImageGrid => SlideContent::ImageGrid {
                show_title: false,
                images,
            },
            SlideType::FourGrid => SlideContent::FourGrid {
                show_title: false,
                images,
            },
            SlideType::SplitVertical => SlideContent::SplitVertical { body, images },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_ids_unique() {
        let mut ids: Vec<&str> = catalog().iter().map(|t| t.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), catalog().len());
    }

    #[test]
    fn test_every_slide_type_has_a_template() {
        for kind in SlideType::all() {
            assert!(
                catalog().iter().any(|t| t.kind == *kind),
                "No template for {kind}"
            );
        }
    }

    #[test]
    fn test_instantiated_slots_are_complete_and_empty() {
        for template in catalog() {
            let slide = template.instantiate(SlideId(1));
            assert_eq!(slide.kind(), template.kind);
            let keys = template.kind.position_keys();
            match slide.images() {
                Some(images) => {
                    assert_eq!(images.keys().collect::<Vec<_>>(), keys.to_vec());
                    assert_eq!(images.filled().count(), 0);
                }
                None => assert!(keys.is_empty()),
            }
        }
    }

    #[test]
    fn test_left_image_defaults() {
        let slide = find("text-image-left").unwrap().instantiate(SlideId(7));
        assert_eq!(slide.id(), SlideId(7));
        assert_eq!(slide.title(), "Feature Overview");
        assert_eq!(slide.bullets().unwrap(), DEFAULT_BULLETS);
    }

    #[test]
    fn test_title_slide_template_is_full_image() {
        let template = find("title-slide").unwrap();
        assert_eq!(template.kind, SlideType::FullImage);
        let slide = template.instantiate(SlideId(1));
        assert_eq!(slide.content().attribution(), Some("Your Name / Company"));
    }

    #[test]
    fn test_unknown_template() {
        assert!(find("sixteen-grid").is_none());
    }
}
