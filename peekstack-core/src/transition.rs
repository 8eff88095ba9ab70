//! Transition sessions and the engine that runs them.
//!
//! ```text
//!            programmatic request              settle done
//!   Idle ───────────────────────────▶ Animating ──────────▶ Idle
//!    │                                   ▲
//!    │ pan crosses drag threshold        │ release (commit or cancel)
//!    └──────────────────▶ Interactive ───┘
//! ```
//!
//! Session progress is always the completed fraction of the session's own
//! kind: 0 is the state before the transition, 1 the state after it. The
//! session translates that into a layout [`Pose`].

use crate::layout::{ItemLayout, LayoutOffsetManager, PairGeometry, Pose};
use crate::stack::StackState;
use crate::{Easing, HostView, StackError, StackResult, StackSettings, ViewHandle};

/// What a transition does to the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionKind {
    /// A new top item slides in over its parent.
    Push,
    /// The top item slides away and is removed.
    Pop,
    /// The top item slides aside to expose its parent.
    Reveal,
    /// The top item slides back over its parent.
    EndReveal,
}

/// What drives a transition's progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionMode {
    /// The animation clock, over a fixed duration.
    Programmatic,
    /// A live drag, followed by a settle animation.
    Interactive,
}

/// Coarse engine state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnginePhase {
    /// No transition in flight.
    Idle,
    /// A timed animation (programmatic or settle) is running.
    Animating,
    /// A drag is driving progress.
    Interactive,
}

/// Record of one in-flight transition.
///
/// Item configs are captured in [`PairGeometry`] when the session is built;
/// later config changes don't affect it.
#[derive(Debug, Clone)]
pub struct TransitionSession {
    kind: TransitionKind,
    mode: TransitionMode,
    progress: f32,
    animated: bool,
    parent: Option<ViewHandle>,
    top: ViewHandle,
    geometry: PairGeometry,
    start_exposure: f32,
    appearing: Vec<ViewHandle>,
    disappearing: Vec<ViewHandle>,
    underlay: Option<ItemLayout>,
}

impl TransitionSession {
    /// Create a session over the top item and its parent.
    #[must_use]
    pub fn new(
        kind: TransitionKind,
        mode: TransitionMode,
        animated: bool,
        parent: Option<ViewHandle>,
        top: ViewHandle,
        geometry: PairGeometry,
    ) -> Self {
        Self {
            kind,
            mode,
            progress: 0.0,
            animated,
            parent,
            top,
            geometry,
            start_exposure: 0.0,
            appearing: Vec::new(),
            disappearing: Vec::new(),
            underlay: None,
        }
    }

    /// Set the views entering and leaving the visible set.
    #[must_use]
    pub fn with_appearance(
        mut self,
        appearing: Vec<ViewHandle>,
        disappearing: Vec<ViewHandle>,
    ) -> Self {
        self.appearing = appearing;
        self.disappearing = disappearing;
        self
    }

    /// Start a pop from a partially exposed parent (a pop out of a reveal).
    #[must_use]
    pub fn with_start_exposure(mut self, exposure: f32) -> Self {
        self.start_exposure = exposure.clamp(0.0, 1.0);
        self
    }

    /// Frame the item under the parent at `layout` while the session runs.
    ///
    /// A pop exposes the grandparent's peek strip behind the sliding parent.
    #[must_use]
    pub fn with_underlay(mut self, layout: ItemLayout) -> Self {
        self.underlay = Some(layout);
        self
    }

    /// The transition kind.
    #[must_use]
    pub const fn kind(&self) -> TransitionKind {
        self.kind
    }

    /// The transition mode.
    #[must_use]
    pub const fn mode(&self) -> TransitionMode {
        self.mode
    }

    /// Completed fraction in `[0, 1]`.
    #[must_use]
    pub const fn progress(&self) -> f32 {
        self.progress
    }

    /// Whether completion callbacks report an animated change.
    #[must_use]
    pub const fn is_animated(&self) -> bool {
        self.animated
    }

    /// The moving top item.
    #[must_use]
    pub const fn top(&self) -> ViewHandle {
        self.top
    }

    /// The item under the moving top, if any.
    #[must_use]
    pub const fn parent(&self) -> Option<ViewHandle> {
        self.parent
    }

    /// The one or two entries whose offsets this session animates.
    #[must_use]
    pub fn affected_entries(&self) -> Vec<ViewHandle> {
        self.parent.into_iter().chain(Some(self.top)).collect()
    }

    /// Snapshotted geometry of the pair.
    #[must_use]
    pub const fn geometry(&self) -> &PairGeometry {
        &self.geometry
    }

    /// Drag distance that takes progress from 0 to 1.
    #[must_use]
    pub fn drag_span(&self) -> f32 {
        match self.kind {
            TransitionKind::Push | TransitionKind::Pop => {
                self.geometry.exposure_span() * (1.0 - self.start_exposure)
            }
            TransitionKind::Reveal | TransitionKind::EndReveal => self.geometry.reveal_span(),
        }
    }

    /// Fraction of the top item's own width dragged so far.
    ///
    /// Commit decisions use this rather than progress, so an end-reveal
    /// commits after half the item's width whatever its hang.
    #[must_use]
    pub fn dragged_fraction(&self) -> f32 {
        let width = self.geometry.top_width();
        if width <= f32::EPSILON {
            return self.progress;
        }
        (self.progress * self.drag_span() / width).clamp(0.0, 1.0)
    }

    /// Layout of the item under the parent, if this session frames one.
    #[must_use]
    pub const fn underlay(&self) -> Option<&ItemLayout> {
        self.underlay.as_ref()
    }

    /// Layout pose for the current progress.
    #[must_use]
    pub fn pose(&self) -> Pose {
        let t = self.progress;
        match self.kind {
            TransitionKind::Push => Pose::Exposure(1.0 - t),
            TransitionKind::Pop => {
                Pose::Exposure(self.start_exposure + t * (1.0 - self.start_exposure))
            }
            TransitionKind::Reveal => Pose::Reveal(t),
            TransitionKind::EndReveal => Pose::Reveal(1.0 - t),
        }
    }

    /// Frames of the affected pair for the current progress.
    #[must_use]
    pub fn layouts(&self) -> (Option<ItemLayout>, ItemLayout) {
        LayoutOffsetManager::pair(&self.geometry, self.parent, self.top, self.pose())
    }

    fn set_progress(&mut self, progress: f32) {
        self.progress = progress.clamp(0.0, 1.0);
    }
}

#[derive(Debug)]
struct Animation {
    session: TransitionSession,
    from: f32,
    to: f32,
    start_ms: Option<f64>,
    duration_ms: f64,
}

impl Animation {
    fn commits(&self) -> bool {
        self.to >= 1.0
    }
}

#[derive(Debug)]
enum EngineState {
    Idle,
    Animating(Animation),
    Interactive(TransitionSession),
}

/// Runs at most one [`TransitionSession`] at a time.
///
/// Timed animations start on the first frame tick after they are requested,
/// so the host's frame clock alone decides their timing.
#[derive(Debug)]
pub struct TransitionEngine {
    state: EngineState,
    animation_duration_ms: f64,
    settle_duration_ms: f64,
    easing: Easing,
}

impl TransitionEngine {
    /// Create an idle engine with timing taken from the settings.
    #[must_use]
    pub fn new(settings: &StackSettings) -> Self {
        Self {
            state: EngineState::Idle,
            animation_duration_ms: settings.animation_duration_ms,
            settle_duration_ms: settings.settle_duration_ms,
            easing: settings.easing,
        }
    }

    /// Current coarse state.
    #[must_use]
    pub const fn phase(&self) -> EnginePhase {
        match self.state {
            EngineState::Idle => EnginePhase::Idle,
            EngineState::Animating(_) => EnginePhase::Animating,
            EngineState::Interactive(_) => EnginePhase::Interactive,
        }
    }

    /// Check if no transition is in flight.
    #[must_use]
    pub const fn is_idle(&self) -> bool {
        matches!(self.state, EngineState::Idle)
    }

    /// The in-flight session, if any.
    #[must_use]
    pub const fn session(&self) -> Option<&TransitionSession> {
        match &self.state {
            EngineState::Idle => None,
            EngineState::Animating(animation) => Some(&animation.session),
            EngineState::Interactive(session) => Some(session),
        }
    }

    /// Start a programmatic transition.
    ///
    /// Non-animated sessions complete before this returns.
    ///
    /// # Errors
    ///
    /// Returns [`StackError::Busy`] if a session is already in flight.
    pub(crate) fn begin<H: HostView>(
        &mut self,
        mut session: TransitionSession,
        stack: &mut StackState<H>,
    ) -> StackResult<()> {
        if !self.is_idle() {
            tracing::debug!("Rejecting {:?}: transition in flight", session.kind);
            return Err(StackError::Busy);
        }
        tracing::debug!(
            "Begin {:?} (animated: {}) on {}",
            session.kind,
            session.animated,
            session.top
        );

        Self::start_work(&session, stack);
        session.set_progress(0.0);

        if session.animated {
            stack.apply_underlay(&session);
            stack.apply_pair(&session);
            self.state = EngineState::Animating(Animation {
                session,
                from: 0.0,
                to: 1.0,
                start_ms: None,
                duration_ms: self.animation_duration_ms,
            });
        } else {
            session.set_progress(1.0);
            Self::commit_work(session, stack);
        }
        Ok(())
    }

    /// Start a gesture-driven transition. Returns `false` (and does nothing)
    /// if a session is already in flight.
    pub(crate) fn begin_interactive<H: HostView>(
        &mut self,
        mut session: TransitionSession,
        stack: &mut StackState<H>,
    ) -> bool {
        if !self.is_idle() {
            tracing::trace!("Ignoring interactive {:?}: transition in flight", session.kind);
            return false;
        }
        tracing::debug!("Begin interactive {:?} on {}", session.kind, session.top);

        session.mode = TransitionMode::Interactive;
        session.animated = true;
        Self::start_work(&session, stack);
        session.set_progress(0.0);
        stack.apply_underlay(&session);
        stack.apply_pair(&session);
        self.state = EngineState::Interactive(session);
        true
    }

    /// Move an interactive session to `progress`.
    pub(crate) fn update_interactive<H: HostView>(
        &mut self,
        progress: f32,
        stack: &mut StackState<H>,
    ) {
        if let EngineState::Interactive(session) = &mut self.state {
            session.set_progress(progress);
            tracing::trace!("Interactive {:?} at {:.3}", session.kind, session.progress);
            stack.apply_pair(session);
        }
    }

    /// Release an interactive session and settle it to its end (`commit`) or
    /// back to its start.
    pub(crate) fn end_interactive<H: HostView>(&mut self, commit: bool, stack: &mut StackState<H>) {
        if !matches!(self.state, EngineState::Interactive(_)) {
            return;
        }
        let EngineState::Interactive(session) = std::mem::replace(&mut self.state, EngineState::Idle)
        else {
            return;
        };

        let from = session.progress;
        let to = if commit { 1.0 } else { 0.0 };
        let distance = f64::from((to - from).abs());
        tracing::debug!(
            "Settle {:?} from {:.3} ({})",
            session.kind,
            from,
            if commit { "commit" } else { "cancel" }
        );

        if distance <= f64::from(f32::EPSILON) {
            self.finish(
                Animation {
                    session,
                    from,
                    to,
                    start_ms: None,
                    duration_ms: 0.0,
                },
                stack,
            );
            return;
        }

        self.state = EngineState::Animating(Animation {
            session,
            from,
            to,
            start_ms: None,
            duration_ms: self.settle_duration_ms * distance,
        });
    }

    /// Advance the running animation to `now_ms`.
    ///
    /// Returns `true` while a session is still in flight.
    pub(crate) fn tick<H: HostView>(&mut self, now_ms: f64, stack: &mut StackState<H>) -> bool {
        if !matches!(self.state, EngineState::Animating(_)) {
            return !self.is_idle();
        }
        let EngineState::Animating(animation) = &mut self.state else {
            return false;
        };

        let start_ms = *animation.start_ms.get_or_insert(now_ms);
        let fraction = if animation.duration_ms <= 0.0 {
            1.0
        } else {
            ((now_ms - start_ms) / animation.duration_ms).clamp(0.0, 1.0)
        };

        #[allow(clippy::cast_possible_truncation)] // fraction is within [0, 1]
        let eased = self.easing.apply(fraction as f32);
        let progress = animation.from + (animation.to - animation.from) * eased;
        animation.session.set_progress(progress);
        tracing::trace!(
            "Tick {:?} at {:.3} ({:.0}ms)",
            animation.session.kind,
            animation.session.progress,
            now_ms - start_ms
        );

        if fraction < 1.0 {
            stack.apply_pair(&animation.session);
            return true;
        }

        if let EngineState::Animating(animation) =
            std::mem::replace(&mut self.state, EngineState::Idle)
        {
            self.finish(animation, stack);
        }
        !self.is_idle()
    }

    fn finish<H: HostView>(&mut self, mut animation: Animation, stack: &mut StackState<H>) {
        self.state = EngineState::Idle;
        if animation.commits() {
            animation.session.set_progress(1.0);
            Self::commit_work(animation.session, stack);
        } else {
            animation.session.set_progress(0.0);
            Self::cancel_work(animation.session, stack);
        }
    }

    fn start_work<H: HostView>(session: &TransitionSession, stack: &mut StackState<H>) {
        let animated = session.animated;
        for &view in &session.appearing {
            stack.host.will_appear(view, animated);
        }
        for &view in &session.disappearing {
            stack.host.will_disappear(view, animated);
        }
        match session.kind {
            TransitionKind::Push => stack.will_show(session.top, animated),
            TransitionKind::Pop => {
                if let Some(parent) = session.parent {
                    stack.will_show(parent, animated);
                }
            }
            TransitionKind::Reveal | TransitionKind::EndReveal => {}
        }
    }

    fn commit_work<H: HostView>(session: TransitionSession, stack: &mut StackState<H>) {
        let animated = session.animated;
        tracing::debug!("Commit {:?} on {}", session.kind, session.top);

        match session.kind {
            TransitionKind::Push => {
                stack.revealing = false;
                stack.relayout();
                for &view in &session.appearing {
                    stack.host.did_appear(view, animated);
                }
                for &view in &session.disappearing {
                    stack.host.did_disappear(view, animated);
                }
                stack.did_show(session.top, animated);
            }
            TransitionKind::Pop => {
                stack.revealing = false;
                stack.remove_entry(session.top);
                stack.relayout();
                for &view in &session.disappearing {
                    stack.host.did_disappear(view, animated);
                    if view == session.top {
                        stack.host.detach(view);
                    }
                }
                for &view in &session.appearing {
                    stack.host.did_appear(view, animated);
                }
                if let Some(parent) = session.parent {
                    stack.did_show(parent, animated);
                }
            }
            TransitionKind::Reveal => {
                stack.revealing = true;
                stack.relayout();
            }
            TransitionKind::EndReveal => {
                stack.revealing = false;
                stack.relayout();
            }
        }
    }

    /// Undo a released drag. Only pops and end-reveals are ever dragged, and
    /// neither changes the entries before commit.
    fn cancel_work<H: HostView>(session: TransitionSession, stack: &mut StackState<H>) {
        let animated = session.animated;
        tracing::debug!("Cancel {:?} on {}", session.kind, session.top);

        stack.relayout();
        for &view in &session.appearing {
            stack.host.will_disappear(view, animated);
            stack.host.did_disappear(view, animated);
        }
        for &view in &session.disappearing {
            stack.host.will_appear(view, animated);
            stack.host.did_appear(view, animated);
        }
    }
}
