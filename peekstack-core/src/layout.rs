//! Mapping from stack topology and transition progress to frames.
//!
//! Everything that positions an item goes through [`LayoutOffsetManager`],
//! whether the progress comes from the animation clock or from a live drag,
//! so both paths always agree on where an item is drawn.
//!
//! All slides are horizontal. With container width `W`, the top item is
//! `W - parent.left_peek` wide and its left edge is the single moving value.
//! The parent is docked to that edge: its right edge always touches the
//! top's left edge, so the pair moves as one and nothing jumps when a top
//! item becomes a parent.
//!
//! ```text
//!  0     left_peek                         W
//!  |------|--------------------------------|   covered   (exposure 0, reveal 0)
//!  | peek |             top                |
//!  |------------------------------|--------|   revealed  (reveal 1)
//!  |           parent             |  hang  |
//! ```

use serde::{Deserialize, Serialize};

use crate::{Rect, Size, StackEntry, StackItemConfig, ViewHandle};

/// Where an item is drawn and how much of it shows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ItemLayout {
    /// The item's view.
    pub view: ViewHandle,
    /// Frame in container coordinates.
    pub frame: Rect,
    /// Width of the item that is not covered by anything above it.
    pub visible_width: f32,
}

impl ItemLayout {
    /// Layout of an item that is not rendered.
    #[must_use]
    pub const fn hidden(view: ViewHandle, height: f32) -> Self {
        Self {
            view,
            frame: Rect::hidden(height),
            visible_width: 0.0,
        }
    }

    /// Whether any part of the item is on screen.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible_width > 0.0
    }
}

/// Pose of the top pair during (or between) transitions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Pose {
    /// Push/pop axis: 0 = parent covered down to its peek, 1 = parent fully exposed.
    Exposure(f32),
    /// Reveal axis: 0 = top fully covering, 1 = top pushed aside down to its hang.
    Reveal(f32),
}

/// Extents of the visible pair, snapshotted from the two entries' configs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairGeometry {
    /// Container size.
    pub bounds: Size,
    /// Parent's left peek, `None` when the top is the root.
    pub parent_peek: Option<f32>,
    /// Grandparent's left peek, which fixes the parent's own width.
    pub grand_peek: f32,
    /// Top's right hang.
    pub top_hang: f32,
}

impl PairGeometry {
    /// Geometry for a top item and its optional parent.
    #[must_use]
    pub fn new(bounds: Size, parent: Option<&StackItemConfig>, top: &StackItemConfig) -> Self {
        Self {
            bounds,
            parent_peek: parent.map(|config| config.left_peek),
            grand_peek: 0.0,
            top_hang: top.right_hang,
        }
    }

    /// Geometry of the last two entries of a stack, `None` for an empty stack.
    #[must_use]
    pub fn of_top(bounds: Size, entries: &[StackEntry]) -> Option<Self> {
        let (top, below) = entries.split_last()?;
        let mut geometry = Self::new(bounds, below.last().map(|e| &e.config), &top.config);
        if let [.., grand, _] = below {
            geometry.grand_peek = grand.config.left_peek;
        }
        Some(geometry)
    }

    /// Parent's left peek clamped to the container.
    #[must_use]
    pub fn peek(&self) -> f32 {
        self.parent_peek
            .unwrap_or(0.0)
            .clamp(0.0, self.bounds.width)
    }

    /// Full width of the top item.
    #[must_use]
    pub fn top_width(&self) -> f32 {
        self.bounds.width - self.peek()
    }

    /// Full width of the parent item.
    #[must_use]
    pub fn parent_width(&self) -> f32 {
        self.bounds.width - self.grand_peek.clamp(0.0, self.bounds.width)
    }

    /// Top's right hang clamped to the top item's width.
    #[must_use]
    pub fn hang(&self) -> f32 {
        self.top_hang.clamp(0.0, self.top_width())
    }

    /// Distance the top's left edge travels across a full push or pop.
    #[must_use]
    pub fn exposure_span(&self) -> f32 {
        self.top_width()
    }

    /// Distance the top's left edge travels across a full reveal.
    #[must_use]
    pub fn reveal_span(&self) -> f32 {
        self.top_width() - self.hang()
    }
}

/// Stateless translator from progress values to frames.
#[derive(Debug, Clone, Copy, Default)]
pub struct LayoutOffsetManager;

impl LayoutOffsetManager {
    /// Visible width of the second-from-top item at push/pop exposure `p`.
    ///
    /// `left_peek` at `p = 0`, `full_width` at `p = 1`.
    #[must_use]
    pub fn parent_visible_width(full_width: f32, left_peek: f32, p: f32) -> f32 {
        let p = p.clamp(0.0, 1.0);
        left_peek + p * (full_width - left_peek)
    }

    /// Visible width of the top item at reveal amount `q`.
    ///
    /// `top_width` at `q = 0`, `right_hang` at `q = 1`.
    #[must_use]
    pub fn top_visible_width(top_width: f32, right_hang: f32, q: f32) -> f32 {
        let q = q.clamp(0.0, 1.0);
        top_width - q * (top_width - right_hang)
    }

    /// Left edge of the top item for a pose.
    #[must_use]
    pub fn top_offset(geometry: &PairGeometry, pose: Pose) -> f32 {
        if geometry.parent_peek.is_none() {
            return 0.0;
        }
        let width = geometry.bounds.width;
        match pose {
            Pose::Exposure(p) => Self::parent_visible_width(width, geometry.peek(), p),
            Pose::Reveal(q) => {
                width - Self::top_visible_width(geometry.top_width(), geometry.hang(), q)
            }
        }
    }

    /// Exposure value that places the top's left edge at `offset`.
    #[must_use]
    pub fn exposure_at_offset(geometry: &PairGeometry, offset: f32) -> f32 {
        let span = geometry.exposure_span();
        if span <= f32::EPSILON {
            return 1.0;
        }
        ((offset - geometry.peek()) / span).clamp(0.0, 1.0)
    }

    /// Frames for the top item and its parent in a given pose.
    #[must_use]
    pub fn pair(
        geometry: &PairGeometry,
        parent: Option<ViewHandle>,
        top: ViewHandle,
        pose: Pose,
    ) -> (Option<ItemLayout>, ItemLayout) {
        let Size { width, height } = geometry.bounds;
        let offset = Self::top_offset(geometry, pose).clamp(0.0, width);

        let top_layout = ItemLayout {
            view: top,
            frame: Rect::new(offset, 0.0, geometry.top_width(), height),
            visible_width: width - offset,
        };
        let parent_width = geometry.parent_width();
        let parent_x = offset - parent_width;
        let parent_layout = parent.map(|view| ItemLayout {
            view,
            frame: Rect::new(parent_x, 0.0, parent_width, height),
            visible_width: offset - parent_x.max(0.0),
        });
        (parent_layout, top_layout)
    }

    /// Layout of every entry with no transition in flight.
    ///
    /// Entries below the parent of the top are hidden.
    #[must_use]
    pub fn rest(bounds: Size, entries: &[StackEntry], revealing: bool) -> Vec<ItemLayout> {
        let (Some((top, below)), Some(geometry)) =
            (entries.split_last(), PairGeometry::of_top(bounds, entries))
        else {
            return Vec::new();
        };
        let parent = below.last();
        let pose = if revealing && parent.is_some() {
            Pose::Reveal(1.0)
        } else {
            Pose::Exposure(0.0)
        };
        let (parent_layout, top_layout) =
            Self::pair(&geometry, parent.map(|e| e.view), top.view, pose);

        let hidden_count = below.len().saturating_sub(1);
        let mut layouts: Vec<ItemLayout> = below[..hidden_count]
            .iter()
            .map(|entry| ItemLayout::hidden(entry.view, bounds.height))
            .collect();
        layouts.extend(parent_layout);
        layouts.push(top_layout);
        layouts
    }
}
