//! Stack-wide settings: container size, timing, and gesture thresholds.

use serde::{Deserialize, Serialize};

use crate::{Size, StackError, StackResult};

/// Duration of a programmatic transition.
pub const ANIMATION_DURATION_MS: f64 = 300.0;

/// Duration of the settle animation after an interactive gesture ends.
pub const SETTLE_DURATION_MS: f64 = 200.0;

/// Release velocity (points per second) that commits a drag regardless of distance.
pub const FLICK_VELOCITY: f32 = 500.0;

/// Movement (points) a pan must exceed before it wins over a tap.
pub const DRAG_THRESHOLD: f32 = 8.0;

/// Fraction of the drag span past which a released drag commits.
pub const COMMIT_FRACTION: f32 = 0.5;

/// Timing curve applied to programmatic and settle animations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    /// No easing.
    Linear,
    /// Cubic ease-out: fast start, gentle landing.
    #[default]
    EaseOut,
    /// Cubic ease-in-out.
    EaseInOut,
}

impl Easing {
    /// Map a linear time fraction in `[0, 1]` to an eased fraction in `[0, 1]`.
    #[must_use]
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::EaseOut => 1.0 - (1.0 - t).powi(3),
            Self::EaseInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
        }
    }
}

/// Settings shared by every entry of one navigation stack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StackSettings {
    /// Container width in points.
    pub width: f32,
    /// Container height in points.
    pub height: f32,
    /// Programmatic transition duration.
    pub animation_duration_ms: f64,
    /// Settle duration after an interactive release.
    pub settle_duration_ms: f64,
    /// Flick velocity threshold in points per second.
    pub flick_velocity: f32,
    /// Pan-over-tap arbitration distance in points.
    pub drag_threshold: f32,
    /// Progress past which a released drag commits.
    pub commit_fraction: f32,
    /// Timing curve.
    pub easing: Easing,
}

impl Default for StackSettings {
    fn default() -> Self {
        Self {
            width: 768.0,
            height: 1024.0,
            animation_duration_ms: ANIMATION_DURATION_MS,
            settle_duration_ms: SETTLE_DURATION_MS,
            flick_velocity: FLICK_VELOCITY,
            drag_threshold: DRAG_THRESHOLD,
            commit_fraction: COMMIT_FRACTION,
            easing: Easing::default(),
        }
    }
}

impl StackSettings {
    /// Default settings for a container of the given size.
    #[must_use]
    pub fn with_size(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    /// Container size.
    #[must_use]
    pub const fn bounds(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Check that the settings describe a usable stack.
    ///
    /// # Errors
    ///
    /// Returns [`StackError::InvalidSettings`] naming the first offending field.
    pub fn validate(&self) -> StackResult<()> {
        if !self.width.is_finite() || self.width <= 0.0 {
            return Err(StackError::InvalidSettings(format!(
                "width must be positive, got {}",
                self.width
            )));
        }
        if !self.height.is_finite() || self.height < 0.0 {
            return Err(StackError::InvalidSettings(format!(
                "height must not be negative, got {}",
                self.height
            )));
        }
        if !is_non_negative(self.animation_duration_ms)
            || !is_non_negative(self.settle_duration_ms)
        {
            return Err(StackError::InvalidSettings(
                "durations must not be negative".to_string(),
            ));
        }
        if !self.flick_velocity.is_finite()
            || self.flick_velocity <= 0.0
            || !self.drag_threshold.is_finite()
            || self.drag_threshold < 0.0
        {
            return Err(StackError::InvalidSettings(
                "gesture thresholds must be positive".to_string(),
            ));
        }
        if !self.commit_fraction.is_finite()
            || self.commit_fraction <= 0.0
            || self.commit_fraction >= 1.0
        {
            return Err(StackError::InvalidSettings(format!(
                "commit_fraction must be inside (0, 1), got {}",
                self.commit_fraction
            )));
        }
        Ok(())
    }

    /// Parse and validate settings from JSON. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or the settings are invalid.
    pub fn from_json(json: &str) -> StackResult<Self> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Serialize the settings to JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> StackResult<String> {
        serde_json::to_string_pretty(self).map_err(StackError::Serialization)
    }
}

fn is_non_negative(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}
