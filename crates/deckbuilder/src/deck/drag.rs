//! Turning a drag (or keyboard nudge) of a slide tile into a reorder.
//!
//! Gaps are the drop slots between tiles: gap `0` is before the first
//! slide, gap `len` after the last. Everything here is pure; pointer
//! handling lives in whatever UI drives it.

use super::store::Mutation;

/// Final index for a slide dragged from `source` and dropped into `gap`, or
/// `None` if the drop would leave it where it is (or is out of range).
pub fn drop_index(source: usize, gap: usize, len: usize) -> Option<usize> {
    if source >= len || gap > len {
        return None;
    }
    // Removing the source first shifts every later slot left by one.
    let to = if gap > source { gap - 1 } else { gap };
    (to != source).then_some(to)
}

pub fn reorder_for_drop(source: usize, gap: usize, len: usize) -> Option<Mutation> {
    drop_index(source, gap, len).map(|to| Mutation::ReorderSlide { from: source, to })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nudge {
    Up,
    Down,
}

/// Move a slide one place, as the navigator's arrow buttons do. Moves past
/// either end produce nothing.
pub fn nudge(index: usize, direction: Nudge, len: usize) -> Option<Mutation> {
    if index >= len {
        return None;
    }
    let to = match direction {
        Nudge::Up => index.checked_sub(1)?,
        Nudge::Down => index + 1,
    };
    (to < len).then_some(Mutation::ReorderSlide { from: index, to })
}

/// In-progress drag of one slide tile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SlideDrag {
    #[default]
    Idle,
    /// Tile picked up, no gap highlighted yet.
    Lifted { source: usize },
    /// Hovering over a drop gap.
    Over { source: usize, gap: usize },
}

impl SlideDrag {
    pub fn lift(source: usize) -> Self {
        Self::Lifted { source }
    }

    pub fn hover(self, gap: usize) -> Self {
        match self {
            Self::Idle => Self::Idle,
            Self::Lifted { source } | Self::Over { source, .. } => Self::Over { source, gap },
        }
    }

    /// Gap to highlight, if the drop there would change anything.
    pub fn highlighted_gap(self, len: usize) -> Option<usize> {
        match self {
            Self::Over { source, gap } => drop_index(source, gap, len).map(|_| gap),
            _ => None,
        }
    }

    /// Release the tile. A drop that changes nothing yields no mutation.
    pub fn release(self, len: usize) -> Option<Mutation> {
        match self {
            Self::Over { source, gap } => reorder_for_drop(source, gap, len),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drop_after_source_subtracts_one() {
        // 5 slides, drag slide 1 to the gap after slide 3
        assert_eq!(drop_index(1, 4, 5), Some(3));
        assert_eq!(drop_index(1, 5, 5), Some(4));
    }

    #[test]
    fn test_drop_before_source() {
        assert_eq!(drop_index(3, 0, 5), Some(0));
        assert_eq!(drop_index(3, 2, 5), Some(2));
    }

    #[test]
    fn test_adjacent_gaps_are_noops() {
        for source in 0..5 {
            assert_eq!(drop_index(source, source, 5), None);
            assert_eq!(drop_index(source, source + 1, 5), None);
        }
    }

    #[test]
    fn test_out_of_range() {
        assert_eq!(drop_index(5, 0, 5), None);
        assert_eq!(drop_index(0, 6, 5), None);
    }

    #[test]
    fn test_drag_gesture() {
        let drag = SlideDrag::lift(0).hover(1);
        assert_eq!(drag.highlighted_gap(4), None);
        assert_eq!(drag.release(4), None);

        let drag = drag.hover(3);
        assert_eq!(drag.highlighted_gap(4), Some(3));
        assert_eq!(drag.release(4), Some(Mutation::ReorderSlide { from: 0, to: 2 }));

        assert_eq!(SlideDrag::Idle.hover(2).release(4), None);
        assert_eq!(SlideDrag::lift(1).release(4), None);
    }

    #[test]
    fn test_nudge() {
        assert_eq!(nudge(0, Nudge::Up, 3), None);
        assert_eq!(nudge(2, Nudge::Down, 3), None);
        assert_eq!(
            nudge(1, Nudge::Up, 3),
            Some(Mutation::ReorderSlide { from: 1, to: 0 })
        );
        assert_eq!(
            nudge(1, Nudge::Down, 3),
            Some(Mutation::ReorderSlide { from: 1, to: 2 })
        );
    }
}
