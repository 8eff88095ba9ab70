//! Per-item behavioural settings and stack entries.

use serde::{Deserialize, Serialize};

use crate::ViewHandle;

/// Default width of the strip a revealing item leaves visible on the right.
pub const DEFAULT_RIGHT_HANG: f32 = 20.0;

/// Behavioural settings for one item on the stack.
///
/// A transition snapshots the configs of the entries it touches when it
/// starts, so changing a config mid-transition only affects later ones.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
pub struct StackItemConfig {
    /// Points that stay docked on the left while another item is pushed on top.
    pub left_peek: f32,
    /// Points that stay docked on the right while this item reveals its parent.
    pub right_hang: f32,
    /// Pop the stack when this item is tapped while peeking.
    pub should_pop_on_tap_when_peeking: bool,
    /// End the reveal when this item is tapped while revealing.
    pub should_end_reveal_on_tap_when_revealing: bool,
    /// Track pans on this item while it is on top.
    pub should_recognize_pans: bool,
    /// Allow a rightward pan to pop this item.
    pub should_pop_when_panned_to_right: bool,
    /// Allow a leftward pan to end a reveal.
    pub should_end_reveal_when_panned_to_left: bool,
}

impl Default for StackItemConfig {
    fn default() -> Self {
        Self {
            left_peek: 0.0,
            right_hang: DEFAULT_RIGHT_HANG,
            should_pop_on_tap_when_peeking: true,
            should_end_reveal_on_tap_when_revealing: true,
            should_recognize_pans: true,
            should_pop_when_panned_to_right: true,
            should_end_reveal_when_panned_to_left: true,
        }
    }
}

impl StackItemConfig {
    /// Set the left peek width. Negative values are clamped to zero.
    #[must_use]
    pub fn with_left_peek(mut self, left_peek: f32) -> Self {
        self.left_peek = left_peek.max(0.0);
        self
    }

    /// Set the right hang width. Negative values are clamped to zero.
    #[must_use]
    pub fn with_right_hang(mut self, right_hang: f32) -> Self {
        self.right_hang = right_hang.max(0.0);
        self
    }

    /// Enable or disable tap-to-pop while peeking.
    #[must_use]
    pub fn with_pop_on_tap(mut self, enabled: bool) -> Self {
        self.should_pop_on_tap_when_peeking = enabled;
        self
    }

    /// Enable or disable tap-to-end-reveal while revealing.
    #[must_use]
    pub fn with_end_reveal_on_tap(mut self, enabled: bool) -> Self {
        self.should_end_reveal_on_tap_when_revealing = enabled;
        self
    }

    /// Enable or disable pan tracking.
    #[must_use]
    pub fn with_pans(mut self, enabled: bool) -> Self {
        self.should_recognize_pans = enabled;
        self
    }

    /// Enable or disable pan-to-pop.
    #[must_use]
    pub fn with_pop_on_pan(mut self, enabled: bool) -> Self {
        self.should_pop_when_panned_to_right = enabled;
        self
    }

    /// Enable or disable pan-to-end-reveal.
    #[must_use]
    pub fn with_end_reveal_on_pan(mut self, enabled: bool) -> Self {
        self.should_end_reveal_when_panned_to_left = enabled;
        self
    }

    /// Copy with negative extents clamped to zero.
    ///
    /// Deserialized configs bypass the builder, so the stack normalizes every
    /// config it stores.
    #[must_use]
    pub fn normalized(self) -> Self {
        Self {
            left_peek: self.left_peek.max(0.0),
            right_hang: self.right_hang.max(0.0),
            ..self
        }
    }

    /// Whether a rightward pan on this item may start an interactive pop.
    #[must_use]
    pub const fn allows_pan_pop(&self) -> bool {
        self.should_recognize_pans && self.should_pop_when_panned_to_right
    }

    /// Whether a leftward pan on this item may start an interactive end-reveal.
    #[must_use]
    pub const fn allows_pan_end_reveal(&self) -> bool {
        self.should_recognize_pans && self.should_end_reveal_when_panned_to_left
    }
}

/// A view on the stack together with the settings it owns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackEntry {
    /// The host view.
    pub view: ViewHandle,
    /// Behavioural settings for this view.
    pub config: StackItemConfig,
}

impl StackEntry {
    /// Create an entry, falling back to default settings.
    #[must_use]
    pub fn new(view: ViewHandle, config: Option<StackItemConfig>) -> Self {
        Self {
            view,
            config: config.unwrap_or_default().normalized(),
        }
    }
}
