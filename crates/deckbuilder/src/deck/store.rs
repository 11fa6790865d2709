use std::sync::Arc;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::assets::{ImageAsset, ImageLibrary, KnowledgeAsset, KnowledgeLibrary};

use super::edit::SlideEdit;
use super::error::Rejection;
use super::slide::{Slide, SlideContent, SlideId};
use super::templates::{self, INITIAL_TEMPLATE};

/// Where a new slide comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SlideSource {
    /// Catalog template id.
    Template(String),
    /// A ready-made record. It still gets a fresh id, and its image slots
    /// are forced to its type's fixed keys.
    Record {
        title: String,
        #[serde(flatten)]
        content: SlideContent,
    },
}

/// A request to change the deck.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mutation {
    AddSlide(SlideSource),
    UpdateSlide { index: usize, edit: SlideEdit },
    EditSlide { id: SlideId, edit: SlideEdit },
    DeleteSlide { index: usize },
    /// `to` is the final position of the moved slide.
    ReorderSlide { from: usize, to: usize },
    DuplicateSlide { index: usize },
    SetCurrentSlide { index: usize },
    AddImageAsset(ImageAsset),
    RemoveImageAsset { id: String },
    AddKnowledgeAsset(KnowledgeAsset),
    RemoveKnowledgeAsset { id: String },
}

impl Mutation {
    pub fn label(&self) -> &'static str {
        match self {
            Self::AddSlide(_) => "add-slide",
            Self::UpdateSlide { .. } => "update-slide",
            Self::EditSlide { .. } => "edit-slide",
            Self::DeleteSlide { .. } => "delete-slide",
            Self::ReorderSlide { .. } => "reorder-slide",
            Self::DuplicateSlide { .. } => "duplicate-slide",
            Self::SetCurrentSlide { .. } => "set-current-slide",
            Self::AddImageAsset(_) => "add-image-asset",
            Self::RemoveImageAsset { .. } => "remove-image-asset",
            Self::AddKnowledgeAsset(_) => "add-knowledge-asset",
            Self::RemoveKnowledgeAsset { .. } => "remove-knowledge-asset",
        }
    }
}

/// One immutable snapshot of a deck.
///
/// Every operation borrows the snapshot and returns a new one; a refused
/// request returns `Err` and the caller keeps the snapshot it had.
///
/// Invariants held by every snapshot:
/// - at least one slide;
/// - the cursor, when set, is a valid index;
/// - slide ids are unique and never reused within the deck's lifetime.
///
/// Slides and library entries are shared with the snapshot an operation
/// started from; only what the operation touches is copied.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Presentation {
    slides: Vec<Arc<Slide>>,
    current_slide_index: Option<usize>,
    image_library: ImageLibrary,
    knowledge_library: KnowledgeLibrary,
    next_slide_id: u64,
}

impl Default for Presentation {
    fn default() -> Self {
        Self::new()
    }
}

impl Presentation {
    /// A deck holding a single title slide, cursor on it.
    pub fn new() -> Self {
        let first = templates::find(INITIAL_TEMPLATE)
            .map(|t| t.instantiate(SlideId(1)))
            .unwrap_or_else(|| {
                Slide::new(
                    SlideId(1),
                    String::new(),
                    SlideContent::Title {
                        subtitle: String::new(),
                    },
                )
            });
        Self::starting_with(first)
    }

    /// A deck whose first slide comes from `template_id`.
    pub fn with_initial_template(template_id: &str) -> Result<Self, Rejection> {
        let template = templates::find(template_id)
            .ok_or_else(|| Rejection::UnknownTemplate(template_id.to_string()))?;
        Ok(Self::starting_with(template.instantiate(SlideId(1))))
    }

    fn starting_with(first: Slide) -> Self {
        Self {
            next_slide_id: first.id().0 + 1,
            slides: vec![Arc::new(first)],
            current_slide_index: Some(0),
            image_library: ImageLibrary::default(),
            knowledge_library: KnowledgeLibrary::default(),
        }
    }

    pub fn slides(&self) -> impl Iterator<Item = &Slide> + '_ {
        self.slides.iter().map(Arc::as_ref)
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    /// Always false; kept for the `len`/`is_empty` pair.
    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    pub fn slide(&self, index: usize) -> Option<&Slide> {
        self.slides.get(index).map(Arc::as_ref)
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current_slide_index
    }

    pub fn current_slide(&self) -> Option<&Slide> {
        self.current_slide_index.and_then(|i| self.slide(i))
    }

    /// Index of the slide with `id` in this snapshot.
    pub fn position_of(&self, id: SlideId) -> Option<usize> {
        self.slides.iter().position(|s| s.id() == id)
    }

    pub fn ids(&self) -> Vec<SlideId> {
        self.slides.iter().map(|s| s.id()).collect()
    }

    pub fn images(&self) -> &ImageLibrary {
        &self.image_library
    }

    pub fn knowledge(&self) -> &KnowledgeLibrary {
        &self.knowledge_library
    }

    /// Cheap change check: same cursor, and every slide and library entry
    /// is the same allocation. Operations that leave a slide alone keep its
    /// allocation, so this agrees with a full comparison.
    pub fn same_as(&self, other: &Self) -> bool {
        self.current_slide_index == other.current_slide_index
            && self.next_slide_id == other.next_slide_id
            && self.slides.len() == other.slides.len()
            && self
                .slides
                .iter()
                .zip(&other.slides)
                .all(|(a, b)| Arc::ptr_eq(a, b))
            && self.image_library.shares_entries(&other.image_library)
            && self.knowledge_library.shares_entries(&other.knowledge_library)
    }

    fn check_index(&self, index: usize) -> Result<(), Rejection> {
        if index < self.slides.len() {
            Ok(())
        } else {
            Err(Rejection::IndexOutOfRange {
                index,
                len: self.slides.len(),
            })
        }
    }

    fn fresh_id(&mut self) -> SlideId {
        let id = SlideId(self.next_slide_id);
        self.next_slide_id += 1;
        id
    }

    /// Dispatch a [`Mutation`] to the matching operation.
    pub fn apply(&self, mutation: Mutation) -> Result<Self, Rejection> {
        match mutation {
            Mutation::AddSlide(source) => self.add_slide(source),
            Mutation::UpdateSlide { index, edit } => self.update_slide(index, edit),
            Mutation::EditSlide { id, edit } => self.edit_slide(id, edit),
            Mutation::DeleteSlide { index } => self.delete_slide(index),
            Mutation::ReorderSlide { from, to } => self.reorder_slide(from, to),
            Mutation::DuplicateSlide { index } => self.duplicate_slide(index),
            Mutation::SetCurrentSlide { index } => self.set_current_slide(index),
            Mutation::AddImageAsset(asset) => Ok(self.add_image_asset(asset)),
            Mutation::RemoveImageAsset { id } => Ok(self.remove_image_asset(&id)),
            Mutation::AddKnowledgeAsset(asset) => Ok(self.add_knowledge_asset(asset)),
            Mutation::RemoveKnowledgeAsset { id } => Ok(self.remove_knowledge_asset(&id)),
        }
    }

    /// Append a slide and move the cursor onto it.
    pub fn add_slide(&self, source: SlideSource) -> Result<Self, Rejection> {
        let mut next = self.clone();
        let id = next.fresh_id();
        let slide = match source {
            SlideSource::Template(template_id) => templates::find(&template_id)
                .ok_or(Rejection::UnknownTemplate(template_id))?
                .instantiate(id),
            SlideSource::Record { title, content } => Slide::new(id, title, content),
        };
        next.slides.push(Arc::new(slide));
        next.current_slide_index = Some(next.slides.len() - 1);
        Ok(next)
    }

    /// Apply one typed edit to the slide at `index`. Order and cursor are
    /// untouched.
    pub fn update_slide(&self, index: usize, edit: SlideEdit) -> Result<Self, Rejection> {
        self.check_index(index)?;
        let mut slide = Slide::clone(&self.slides[index]);
        slide.apply_edit(edit)?;
        let mut next = self.clone();
        if slide != *self.slides[index] {
            next.slides[index] = Arc::new(slide);
        }
        Ok(next)
    }

    /// Like [`update_slide`](Self::update_slide), addressed by identity.
    pub fn edit_slide(&self, id: SlideId, edit: SlideEdit) -> Result<Self, Rejection> {
        let index = self.position_of(id).ok_or(Rejection::UnknownSlide(id))?;
        self.update_slide(index, edit)
    }

    /// Remove the slide at `index`. The last remaining slide is never
    /// removed.
    pub fn delete_slide(&self, index: usize) -> Result<Self, Rejection> {
        self.check_index(index)?;
        if self.slides.len() <= 1 {
            return Err(Rejection::LastSlide);
        }
        let mut next = self.clone();
        next.slides.remove(index);
        next.current_slide_index = self
            .current_slide_index
            .map(|cur| if index <= cur { cur.saturating_sub(1) } else { cur });
        Ok(next)
    }

    /// Move the slide at `from` so it ends up at index `to`.
    pub fn reorder_slide(&self, from: usize, to: usize) -> Result<Self, Rejection> {
        self.check_index(from)?;
        self.check_index(to)?;
        if from == to {
            return Ok(self.clone());
        }
        let mut next = self.clone();
        let moved = next.slides.remove(from);
        next.slides.insert(to, moved);
        next.current_slide_index = self
            .current_slide_index
            .map(|cur| rebase_cursor(cur, from, to));
        Ok(next)
    }

    /// Insert a deep copy of the slide at `index` right after it, under a
    /// new id. The cursor keeps pointing at the same slide.
    pub fn duplicate_slide(&self, index: usize) -> Result<Self, Rejection> {
        self.check_index(index)?;
        let mut next = self.clone();
        let id = next.fresh_id();
        let copy = next.slides[index].duplicate_as(id);
        next.slides.insert(index + 1, Arc::new(copy));
        next.current_slide_index = self
            .current_slide_index
            .map(|cur| if cur > index { cur + 1 } else { cur });
        Ok(next)
    }

    /// Out-of-range indices are refused, not clamped.
    pub fn set_current_slide(&self, index: usize) -> Result<Self, Rejection> {
        self.check_index(index)?;
        Ok(Self {
            current_slide_index: Some(index),
            ..self.clone()
        })
    }

    pub fn add_image_asset(&self, asset: ImageAsset) -> Self {
        Self {
            image_library: self.image_library.with(asset),
            ..self.clone()
        }
    }

    /// Slides that copied the image keep their copy.
    pub fn remove_image_asset(&self, id: &str) -> Self {
        Self {
            image_library: self.image_library.without(id),
            ..self.clone()
        }
    }

    pub fn add_knowledge_asset(&self, asset: KnowledgeAsset) -> Self {
        Self {
            knowledge_library: self.knowledge_library.with(asset),
            ..self.clone()
        }
    }

    pub fn remove_knowledge_asset(&self, id: &str) -> Self {
        Self {
            knowledge_library: self.knowledge_library.without(id),
            ..self.clone()
        }
    }
}

/// Where the cursor lands after the slide at `from` moves to `to`.
fn rebase_cursor(cur: usize, from: usize, to: usize) -> usize {
    if cur == from {
        to
    } else if from < cur && cur <= to {
        cur - 1
    } else if to <= cur && cur < from {
        cur + 1
    } else {
        cur
    }
}

/// Owner of the current snapshot; the single place mutations go through.
///
/// Components that need the deck get a `&DeckStore` (to read) or a
/// `&mut DeckStore` (to dispatch) handed to them.
#[derive(Debug, Clone, Default)]
pub struct DeckStore {
    state: Presentation,
    revision: u64,
}

impl DeckStore {
    pub fn new(state: Presentation) -> Self {
        Self { state, revision: 0 }
    }

    pub fn state(&self) -> &Presentation {
        &self.state
    }

    /// Number of dispatches that actually changed the deck.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn dispatch(&mut self, mutation: Mutation) -> Result<&Presentation, Rejection> {
        let label = mutation.label();
        match self.state.apply(mutation) {
            Ok(next) => {
                if !next.same_as(&self.state) {
                    self.revision += 1;
                    debug!(
                        "{label}: {} slides, cursor {:?} (rev {})",
                        next.len(),
                        next.current_index(),
                        self.revision
                    );
                    self.state = next;
                } else {
                    debug!("{label}: no change");
                }
                Ok(&self.state)
            }
            Err(rejection) => {
                info!("{label} refused: {rejection}");
                Err(rejection)
            }
        }
    }

    /// Replace the deck wholesale, e.g. "new presentation".
    pub fn reset(&mut self, state: Presentation) {
        self.state = state;
        self.revision += 1;
    }
}
