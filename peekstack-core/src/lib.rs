//! # Peekstack Core
//!
//! A navigation stack where covered views keep peeking out instead of
//! disappearing, and the top view can slide aside to reveal its parent.
//! Programmatic and gesture-driven transitions run through the same engine.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │              NavigationStack                │
//! │  push / pop / pop_to / reveal / end_reveal  │
//! ├──────────────────────┬──────────────────────┤
//! │  GestureCoordinator  │  TransitionEngine    │
//! │  - Pan vs tap        │  - Idle / Animating  │
//! │  - Commit threshold  │    / Interactive     │
//! │  - Tap to toggle     │  - Appear callbacks  │
//! ├──────────────────────┴──────────────────────┤
//! │  LayoutOffsetManager (progress -> frames)   │
//! ├─────────────────────────────────────────────┤
//! │  HostView / StackDelegate (host-provided)   │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! The host owns views, the frame clock and gesture recognition. It calls
//! [`NavigationStack::tick`] every frame and forwards gestures through
//! [`NavigationStack::handle_gesture`].

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod gesture;
pub mod host;
pub mod item;
pub mod layout;
pub mod settings;
pub mod stack;
pub mod transition;
pub mod view;

pub use error::{StackError, StackResult};
pub use gesture::{GestureCoordinator, GestureEvent, GestureResponse};
pub use host::{HostView, StackDelegate};
pub use item::{StackEntry, StackItemConfig, DEFAULT_RIGHT_HANG};
pub use layout::{ItemLayout, LayoutOffsetManager, PairGeometry, Pose};
pub use settings::{Easing, StackSettings};
pub use stack::{NavigationStack, StackSnapshot};
pub use transition::{
    EnginePhase, TransitionEngine, TransitionKind, TransitionMode, TransitionSession,
};
pub use view::{Point, Rect, Size, ViewHandle};

/// Peekstack core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
