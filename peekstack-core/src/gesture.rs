//! Turns pan and tap events on the top two items into transitions.
//!
//! Pan and tap share the same region, so every pan starts out pending:
//!
//! ```text
//! PanBegan ──▶ Pending ──(|dx| > drag_threshold)──▶ Dragging ──PanEnded──▶ settle
//!                 │                                     │
//!                 └──PanEnded──▶ handled as a tap       └──PanCancelled──▶ settle back
//! ```
//!
//! A pan that moves past the threshold but can't drive a transition is
//! rejected and swallowed until it ends.

use serde::{Deserialize, Serialize};

use crate::stack::StackState;
use crate::transition::{TransitionEngine, TransitionKind, TransitionMode, TransitionSession};
use crate::{HostView, Point, StackSettings, ViewHandle};

/// A gesture sample delivered by the host, scoped to one view's container.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GestureEvent {
    /// A pan started at `location`.
    PanBegan {
        /// Touch-down location.
        location: Point,
    },
    /// The pan moved.
    PanChanged {
        /// Horizontal translation since `PanBegan`, positive to the right.
        translation_x: f32,
        /// Horizontal velocity in points per second.
        velocity_x: f32,
    },
    /// The pan was released.
    PanEnded {
        /// Horizontal velocity at release in points per second.
        velocity_x: f32,
    },
    /// The host aborted the pan.
    PanCancelled,
    /// A discrete tap.
    Tap {
        /// Tap location.
        location: Point,
    },
}

/// What the coordinator did with an event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureResponse {
    /// Not eligible, conflicting, or out of scope.
    Ignored,
    /// A pan is being tracked but hasn't won over a tap yet.
    Tracking,
    /// A pan crossed the drag threshold and started an interactive transition.
    Began(TransitionKind),
    /// The interactive transition moved to this progress.
    Updated(f32),
    /// The pan was released past the commit threshold; the transition settles to its end.
    Committed(TransitionKind),
    /// The pan was released short of the commit threshold; the transition settles back.
    Cancelled(TransitionKind),
    /// A tap started an animated transition.
    Triggered(TransitionKind),
}

impl GestureResponse {
    /// Check if the event had any effect.
    #[must_use]
    pub const fn is_handled(&self) -> bool {
        !matches!(self, Self::Ignored)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum PanState {
    Idle,
    Pending { view: ViewHandle, location: Point },
    Dragging { view: ViewHandle, kind: TransitionKind },
    Rejected { view: ViewHandle },
}

impl PanState {
    fn view(&self) -> Option<ViewHandle> {
        match *self {
            Self::Idle => None,
            Self::Pending { view, .. } | Self::Dragging { view, .. } | Self::Rejected { view } => {
                Some(view)
            }
        }
    }
}

/// Gesture arbitration and drag-to-progress mapping.
#[derive(Debug)]
pub struct GestureCoordinator {
    pan: PanState,
    drag_threshold: f32,
    flick_velocity: f32,
    commit_fraction: f32,
}

impl GestureCoordinator {
    /// Create a coordinator with thresholds taken from the settings.
    #[must_use]
    pub fn new(settings: &StackSettings) -> Self {
        Self {
            pan: PanState::Idle,
            drag_threshold: settings.drag_threshold,
            flick_velocity: settings.flick_velocity,
            commit_fraction: settings.commit_fraction,
        }
    }

    /// Check if a pan is currently being tracked or driving a transition.
    #[must_use]
    pub fn is_tracking(&self) -> bool {
        self.pan != PanState::Idle
    }

    /// Release decision for a drag of `kind` that covered `dragged` of the
    /// top item's width, released at `velocity_x`.
    #[must_use]
    pub fn should_commit(&self, kind: TransitionKind, dragged: f32, velocity_x: f32) -> bool {
        dragged > self.commit_fraction || toward_commit(kind, velocity_x) > self.flick_velocity
    }

    /// Forget a pan that hasn't started a transition.
    ///
    /// Called whenever the stack changes, since the tracked view may no
    /// longer hold the role it had when the pan began.
    pub(crate) fn reset(&mut self) {
        if let PanState::Pending { view, .. } | PanState::Rejected { view } = self.pan {
            tracing::debug!("Dropping pan on {view}: stack changed");
            self.pan = PanState::Idle;
        }
    }

    pub(crate) fn handle<H: HostView>(
        &mut self,
        view: ViewHandle,
        event: GestureEvent,
        engine: &mut TransitionEngine,
        stack: &mut StackState<H>,
    ) -> GestureResponse {
        tracing::trace!("Gesture on {view}: {event:?}");
        match event {
            GestureEvent::PanBegan { location } => self.pan_began(view, location, engine, stack),
            GestureEvent::PanChanged { translation_x, .. } => {
                self.pan_changed(view, translation_x, engine, stack)
            }
            GestureEvent::PanEnded { velocity_x } => self.pan_ended(view, velocity_x, engine, stack),
            GestureEvent::PanCancelled => self.pan_cancelled(view, engine, stack),
            GestureEvent::Tap { location } => {
                if self.is_tracking() {
                    tracing::debug!("Ignoring tap at {location:?}: pan in progress");
                    return GestureResponse::Ignored;
                }
                Self::tap(view, engine, stack)
            }
        }
    }

    fn pan_began<H: HostView>(
        &mut self,
        view: ViewHandle,
        location: Point,
        engine: &TransitionEngine,
        stack: &StackState<H>,
    ) -> GestureResponse {
        if self.is_tracking() || !engine.is_idle() {
            tracing::debug!("Ignoring pan on {view}: gesture or transition in flight");
            return GestureResponse::Ignored;
        }
        if !is_top_pair(view, stack) {
            return GestureResponse::Ignored;
        }
        self.pan = PanState::Pending { view, location };
        GestureResponse::Tracking
    }

    fn pan_changed<H: HostView>(
        &mut self,
        view: ViewHandle,
        translation_x: f32,
        engine: &mut TransitionEngine,
        stack: &mut StackState<H>,
    ) -> GestureResponse {
        if self.pan.view() != Some(view) {
            return GestureResponse::Ignored;
        }
        match self.pan {
            PanState::Pending { .. } => {
                if translation_x.abs() <= self.drag_threshold {
                    return GestureResponse::Tracking;
                }
                self.start_drag(view, translation_x, engine, stack)
            }
            PanState::Dragging { kind, .. } => {
                let progress = drag_progress(kind, translation_x, engine);
                engine.update_interactive(progress, stack);
                GestureResponse::Updated(progress)
            }
            PanState::Idle | PanState::Rejected { .. } => GestureResponse::Ignored,
        }
    }

    fn start_drag<H: HostView>(
        &mut self,
        view: ViewHandle,
        translation_x: f32,
        engine: &mut TransitionEngine,
        stack: &mut StackState<H>,
    ) -> GestureResponse {
        let Some(kind) = Self::pan_kind(view, translation_x, stack) else {
            tracing::debug!("Rejecting pan on {view} ({translation_x:+.1})");
            self.pan = PanState::Rejected { view };
            return GestureResponse::Ignored;
        };

        let session = match kind {
            TransitionKind::Pop => stack.pop_session(TransitionMode::Interactive, true),
            _ => stack.reveal_session(kind, TransitionMode::Interactive, true),
        };
        let started = match session {
            Ok(session) => engine.begin_interactive(session, stack),
            Err(e) => {
                tracing::debug!("Rejecting pan on {view}: {e}");
                false
            }
        };
        if !started {
            self.pan = PanState::Rejected { view };
            return GestureResponse::Ignored;
        }

        self.pan = PanState::Dragging { view, kind };
        let progress = drag_progress(kind, translation_x, engine);
        engine.update_interactive(progress, stack);
        GestureResponse::Began(kind)
    }

    /// Which interactive transition a pan on `view` in this direction drives.
    fn pan_kind<H: HostView>(
        view: ViewHandle,
        translation_x: f32,
        stack: &StackState<H>,
    ) -> Option<TransitionKind> {
        let top = stack.top()?;
        if top.view != view || !top.config.should_recognize_pans || stack.depth() < 2 {
            return None;
        }
        if stack.revealing {
            (translation_x < 0.0 && top.config.allows_pan_end_reveal())
                .then_some(TransitionKind::EndReveal)
        } else {
            (translation_x > 0.0 && top.config.allows_pan_pop()).then_some(TransitionKind::Pop)
        }
    }

    fn pan_ended<H: HostView>(
        &mut self,
        view: ViewHandle,
        velocity_x: f32,
        engine: &mut TransitionEngine,
        stack: &mut StackState<H>,
    ) -> GestureResponse {
        if self.pan.view() != Some(view) {
            return GestureResponse::Ignored;
        }
        match std::mem::replace(&mut self.pan, PanState::Idle) {
            PanState::Pending { location, .. } => {
                tracing::trace!("Pan on {view} ended below threshold, tap at {location:?}");
                Self::tap(view, engine, stack)
            }
            PanState::Dragging { kind, .. } => {
                let dragged = engine.session().map_or(0.0, TransitionSession::dragged_fraction);
                let commit = self.should_commit(kind, dragged, velocity_x);
                engine.end_interactive(commit, stack);
                if commit {
                    GestureResponse::Committed(kind)
                } else {
                    GestureResponse::Cancelled(kind)
                }
            }
            PanState::Idle | PanState::Rejected { .. } => GestureResponse::Ignored,
        }
    }

    fn pan_cancelled<H: HostView>(
        &mut self,
        view: ViewHandle,
        engine: &mut TransitionEngine,
        stack: &mut StackState<H>,
    ) -> GestureResponse {
        if self.pan.view() != Some(view) {
            return GestureResponse::Ignored;
        }
        match std::mem::replace(&mut self.pan, PanState::Idle) {
            PanState::Dragging { kind, .. } => {
                engine.end_interactive(false, stack);
                GestureResponse::Cancelled(kind)
            }
            _ => GestureResponse::Ignored,
        }
    }

    /// Tap on the peeking parent pops; tap on the revealing top ends the reveal.
    fn tap<H: HostView>(
        view: ViewHandle,
        engine: &mut TransitionEngine,
        stack: &mut StackState<H>,
    ) -> GestureResponse {
        if !engine.is_idle() {
            return GestureResponse::Ignored;
        }
        let (Some(top), Some(parent)) = (stack.top(), stack.parent()) else {
            return GestureResponse::Ignored;
        };

        let session = if view == parent.view
            && !stack.revealing
            && parent.config.should_pop_on_tap_when_peeking
        {
            stack.pop_session(TransitionMode::Programmatic, true)
        } else if view == top.view
            && stack.revealing
            && top.config.should_end_reveal_on_tap_when_revealing
        {
            stack.reveal_session(TransitionKind::EndReveal, TransitionMode::Programmatic, true)
        } else {
            return GestureResponse::Ignored;
        };

        let Ok(session) = session else {
            return GestureResponse::Ignored;
        };
        let kind = session.kind();
        match engine.begin(session, stack) {
            Ok(()) => GestureResponse::Triggered(kind),
            Err(e) => {
                tracing::debug!("Tap on {view} ignored: {e}");
                GestureResponse::Ignored
            }
        }
    }
}

fn is_top_pair<H: HostView>(view: ViewHandle, stack: &StackState<H>) -> bool {
    stack.top().is_some_and(|e| e.view == view) || stack.parent().is_some_and(|e| e.view == view)
}

/// Progress of an interactive session for a cumulative pan translation.
fn drag_progress(kind: TransitionKind, translation_x: f32, engine: &TransitionEngine) -> f32 {
    let span = engine.session().map_or(0.0, |s| s.drag_span());
    if span <= f32::EPSILON {
        return 1.0;
    }
    (toward_commit(kind, translation_x) / span).clamp(0.0, 1.0)
}

/// Horizontal motion in the direction that completes an interactive `kind`.
///
/// Only pops (rightward) and end-reveals (leftward) are ever dragged.
fn toward_commit(kind: TransitionKind, dx: f32) -> f32 {
    if kind == TransitionKind::EndReveal {
        -dx
    } else {
        dx
    }
}
