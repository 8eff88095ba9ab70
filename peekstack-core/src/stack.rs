//! The navigation stack: entries, public operations, and the glue between
//! the transition engine, the gesture coordinator, and the host.

use serde::{Deserialize, Serialize};

use crate::gesture::{GestureCoordinator, GestureEvent, GestureResponse};
use crate::layout::{ItemLayout, LayoutOffsetManager, PairGeometry, Pose};
use crate::transition::{
    EnginePhase, TransitionEngine, TransitionKind, TransitionMode, TransitionSession,
};
use crate::{
    HostView, Size, StackDelegate, StackEntry, StackError, StackItemConfig, StackResult,
    StackSettings, ViewHandle,
};

/// Entries and host plumbing shared by the engine and the gesture coordinator.
pub(crate) struct StackState<H> {
    pub(crate) entries: Vec<StackEntry>,
    pub(crate) revealing: bool,
    pub(crate) host: H,
    delegate: Option<Box<dyn StackDelegate>>,
    bounds: Size,
}

impl<H: HostView> StackState<H> {
    pub(crate) fn depth(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn index_of(&self, view: ViewHandle) -> Option<usize> {
        self.entries.iter().position(|entry| entry.view == view)
    }

    pub(crate) fn top(&self) -> Option<&StackEntry> {
        self.entries.last()
    }

    pub(crate) fn parent(&self) -> Option<&StackEntry> {
        self.entries.iter().rev().nth(1)
    }

    pub(crate) fn remove_entry(&mut self, view: ViewHandle) {
        if let Some(index) = self.index_of(view) {
            self.entries.remove(index);
        }
    }

    pub(crate) fn will_show(&mut self, view: ViewHandle, animated: bool) {
        if let Some(delegate) = self.delegate.as_mut() {
            delegate.will_show(view, animated);
        }
    }

    pub(crate) fn did_show(&mut self, view: ViewHandle, animated: bool) {
        if let Some(delegate) = self.delegate.as_mut() {
            delegate.did_show(view, animated);
        }
    }

    /// Push the frames of a session's moving pair to the host.
    pub(crate) fn apply_pair(&mut self, session: &TransitionSession) {
        let (parent, top) = session.layouts();
        if let Some(parent) = parent {
            self.host.set_frame(parent.view, parent.frame);
        }
        self.host.set_frame(top.view, top.frame);
    }

    /// Frame the item under a session's parent, if the session carries one.
    pub(crate) fn apply_underlay(&mut self, session: &TransitionSession) {
        if let Some(layout) = session.underlay() {
            self.host.set_frame(layout.view, layout.frame);
        }
    }

    /// Push resting frames for every entry to the host.
    pub(crate) fn relayout(&mut self) {
        for layout in LayoutOffsetManager::rest(self.bounds, &self.entries, self.revealing) {
            self.host.set_frame(layout.view, layout.frame);
        }
    }

    fn geometry(&self) -> Option<PairGeometry> {
        PairGeometry::of_top(self.bounds, &self.entries)
    }

    /// Session that pops the top entry.
    ///
    /// # Errors
    ///
    /// Returns [`StackError::InvalidRoot`] if only the root is left.
    pub(crate) fn pop_session(
        &self,
        mode: TransitionMode,
        animated: bool,
    ) -> StackResult<TransitionSession> {
        let (Some(top), Some(parent), Some(geometry)) = (self.top(), self.parent(), self.geometry())
        else {
            return Err(StackError::InvalidRoot);
        };

        let grandparent = self.entries.iter().rev().nth(2).map(|entry| entry.view);
        // Where the grandparent rests once the pop completes.
        let underlay = grandparent.and_then(|view| {
            LayoutOffsetManager::rest(self.bounds, &self.entries[..self.depth() - 1], false)
                .into_iter()
                .find(|layout| layout.view == view)
        });
        let mut session = TransitionSession::new(
            TransitionKind::Pop,
            mode,
            animated,
            Some(parent.view),
            top.view,
            geometry,
        )
        .with_appearance(grandparent.into_iter().collect(), vec![top.view]);

        if let Some(underlay) = underlay {
            session = session.with_underlay(underlay);
        }
        if self.revealing {
            let offset = LayoutOffsetManager::top_offset(&geometry, Pose::Reveal(1.0));
            let exposure = LayoutOffsetManager::exposure_at_offset(&geometry, offset);
            session = session.with_start_exposure(exposure);
        }
        Ok(session)
    }

    /// Session that slides the top entry aside (`kind` = `Reveal`) or back
    /// over its parent (`kind` = `EndReveal`).
    ///
    /// # Errors
    ///
    /// Returns [`StackError::InvalidRoot`] if only the root is left.
    pub(crate) fn reveal_session(
        &self,
        kind: TransitionKind,
        mode: TransitionMode,
        animated: bool,
    ) -> StackResult<TransitionSession> {
        let (Some(top), Some(parent), Some(geometry)) = (self.top(), self.parent(), self.geometry())
        else {
            return Err(StackError::InvalidRoot);
        };
        Ok(TransitionSession::new(
            kind,
            mode,
            animated,
            Some(parent.view),
            top.view,
            geometry,
        ))
    }
}

/// Serializable view of the stack for inspection and debugging.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StackSnapshot {
    /// Entries, root first.
    pub entries: Vec<StackEntry>,
    /// Whether the top item is revealing its parent.
    pub revealing: bool,
    /// Current frames, root first.
    pub layouts: Vec<ItemLayout>,
}

impl StackSnapshot {
    /// Serialize the snapshot to JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> StackResult<String> {
        serde_json::to_string(self).map_err(StackError::Serialization)
    }
}

/// A stack of views where covered views keep peeking out from the left.
///
/// All calls are expected on one thread (the host's UI/event thread); the
/// host drives animations by calling [`tick`](Self::tick) once per frame and
/// forwards gestures through [`handle_gesture`](Self::handle_gesture).
pub struct NavigationStack<H: HostView> {
    state: StackState<H>,
    engine: TransitionEngine,
    gestures: GestureCoordinator,
    settings: StackSettings,
}

impl<H: HostView> NavigationStack<H> {
    /// Create a stack holding only `root`.
    ///
    /// # Errors
    ///
    /// Returns [`StackError::InvalidSettings`] if the settings fail validation.
    pub fn new(root: ViewHandle, host: H, settings: StackSettings) -> StackResult<Self> {
        settings.validate()?;
        let mut state = StackState {
            entries: vec![StackEntry::new(root, None)],
            revealing: false,
            host,
            delegate: None,
            bounds: settings.bounds(),
        };

        state.host.attach(root);
        state.host.will_appear(root, false);
        state.relayout();
        state.host.did_appear(root, false);
        tracing::debug!("Navigation stack created with root {root}");

        Ok(Self {
            state,
            engine: TransitionEngine::new(&settings),
            gestures: GestureCoordinator::new(&settings),
            settings,
        })
    }

    /// Install the delegate notified of top-of-stack changes.
    pub fn set_delegate(&mut self, delegate: Box<dyn StackDelegate>) {
        self.state.delegate = Some(delegate);
    }

    /// Remove the delegate.
    pub fn clear_delegate(&mut self) {
        self.state.delegate = None;
    }

    fn ensure_idle(&self) -> StackResult<()> {
        if self.engine.is_idle() {
            Ok(())
        } else {
            tracing::debug!("Stack busy: {:?} in flight", self.engine.phase());
            Err(StackError::Busy)
        }
    }

    /// Push `view` on top of the stack.
    ///
    /// A push while revealing ends the reveal instantly first. Non-animated
    /// pushes complete (and notify the delegate) before this returns.
    ///
    /// # Errors
    ///
    /// Returns [`StackError::Busy`] while a transition is in flight and
    /// [`StackError::AlreadyInStack`] if `view` is already on the stack.
    pub fn push(
        &mut self,
        view: ViewHandle,
        config: Option<StackItemConfig>,
        animated: bool,
    ) -> StackResult<()> {
        self.ensure_idle()?;
        if self.contains(view) {
            return Err(StackError::AlreadyInStack(view));
        }
        self.gestures.reset();
        if self.state.revealing {
            tracing::debug!("Ending reveal before push");
            self.state.revealing = false;
            self.state.relayout();
        }

        let parent = self.top_view_controller();
        let hidden = self.state.parent().map(|entry| entry.view);
        self.state.entries.push(StackEntry::new(view, config));
        self.state.host.attach(view);

        let geometry = self
            .state
            .geometry()
            .ok_or(StackError::InvalidRoot)?;
        let session = TransitionSession::new(
            TransitionKind::Push,
            TransitionMode::Programmatic,
            animated,
            Some(parent),
            view,
            geometry,
        )
        .with_appearance(vec![view], hidden.into_iter().collect());

        self.engine.begin(session, &mut self.state)
    }

    /// Pop the top view, returning it once the pop has started.
    ///
    /// The returned view stays attached until the pop animation finishes.
    ///
    /// # Errors
    ///
    /// Returns [`StackError::Busy`] while a transition is in flight and
    /// [`StackError::InvalidRoot`] if only the root is left.
    pub fn try_pop(&mut self, animated: bool) -> StackResult<ViewHandle> {
        self.ensure_idle()?;
        let session = self
            .state
            .pop_session(TransitionMode::Programmatic, animated)?;
        let popped = session.top();
        self.gestures.reset();
        self.engine.begin(session, &mut self.state)?;
        Ok(popped)
    }

    /// Pop the top view; `None` if only the root is left.
    ///
    /// # Errors
    ///
    /// Returns [`StackError::Busy`] while a transition is in flight.
    pub fn pop(&mut self, animated: bool) -> StackResult<Option<ViewHandle>> {
        match self.try_pop(animated) {
            Ok(view) => Ok(Some(view)),
            Err(StackError::InvalidRoot) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Pop every view above `target`, returning them top first.
    ///
    /// Views between `target` and the top are removed at once; only the
    /// final pop of the top view is animated.
    ///
    /// # Errors
    ///
    /// Returns [`StackError::Busy`] while a transition is in flight and
    /// [`StackError::NotFound`] if `target` is not on the stack.
    pub fn pop_to(&mut self, target: ViewHandle, animated: bool) -> StackResult<Vec<ViewHandle>> {
        self.ensure_idle()?;
        let index = self.index_of(target).ok_or(StackError::NotFound(target))?;
        let top_index = self.state.depth() - 1;
        if index == top_index {
            return Ok(Vec::new());
        }

        self.gestures.reset();
        let removed: Vec<ViewHandle> = self.state.entries[index + 1..]
            .iter()
            .rev()
            .map(|entry| entry.view)
            .collect();

        // Intermediate entries go first, top-down, without animation.
        let target_was_hidden = index + 1 < top_index;
        for position in (index + 1..top_index).rev() {
            let view = self.state.entries[position].view;
            let was_visible = position + 1 == top_index;
            if was_visible {
                self.state.host.will_disappear(view, false);
                self.state.host.did_disappear(view, false);
            }
            self.state.entries.remove(position);
            self.state.host.detach(view);
            tracing::debug!("Removed {view} without animation");
        }
        if target_was_hidden {
            self.state.relayout();
        }

        let mut session = self
            .state
            .pop_session(TransitionMode::Programmatic, animated)?;
        if target_was_hidden {
            let top = session.top();
            let mut appearing = vec![target];
            appearing.extend(index.checked_sub(1).map(|i| self.state.entries[i].view));
            session = session.with_appearance(appearing, vec![top]);
        }
        self.engine.begin(session, &mut self.state)?;
        Ok(removed)
    }

    /// Pop back to the root view, returning the popped views top first.
    ///
    /// # Errors
    ///
    /// Returns [`StackError::Busy`] while a transition is in flight.
    pub fn pop_to_root(&mut self, animated: bool) -> StackResult<Vec<ViewHandle>> {
        let root = self.state.entries[0].view;
        self.pop_to(root, animated)
    }

    /// Slide the top view aside to reveal its parent.
    ///
    /// # Errors
    ///
    /// Returns [`StackError::Busy`] while a transition is in flight and
    /// [`StackError::InvalidRoot`] if only the root is left.
    pub fn try_reveal_parent(&mut self, animated: bool) -> StackResult<()> {
        self.ensure_idle()?;
        if self.state.revealing {
            return Ok(());
        }
        let session = self.state.reveal_session(
            TransitionKind::Reveal,
            TransitionMode::Programmatic,
            animated,
        )?;
        self.gestures.reset();
        self.engine.begin(session, &mut self.state)
    }

    /// Slide the top view aside to reveal its parent. No-op at the root or
    /// while already revealing.
    ///
    /// # Errors
    ///
    /// Returns [`StackError::Busy`] while a transition is in flight.
    pub fn reveal_parent(&mut self, animated: bool) -> StackResult<()> {
        match self.try_reveal_parent(animated) {
            Err(StackError::InvalidRoot) => Ok(()),
            result => result,
        }
    }

    /// Slide the revealing top view back over its parent. No-op when not
    /// revealing.
    ///
    /// # Errors
    ///
    /// Returns [`StackError::Busy`] while a transition is in flight.
    pub fn end_reveal(&mut self, animated: bool) -> StackResult<()> {
        self.ensure_idle()?;
        if !self.state.revealing {
            return Ok(());
        }
        let session = self.state.reveal_session(
            TransitionKind::EndReveal,
            TransitionMode::Programmatic,
            animated,
        )?;
        self.gestures.reset();
        self.engine.begin(session, &mut self.state)
    }

    /// Advance animations to `now_ms` on the host's frame clock.
    ///
    /// Returns `true` while a transition is still in flight.
    pub fn tick(&mut self, now_ms: f64) -> bool {
        self.engine.tick(now_ms, &mut self.state)
    }

    /// Feed a gesture event scoped to `view`'s container.
    ///
    /// Gestures never fail: ineligible or conflicting ones are ignored.
    pub fn handle_gesture(&mut self, view: ViewHandle, event: GestureEvent) -> GestureResponse {
        self.gestures
            .handle(view, event, &mut self.engine, &mut self.state)
    }

    /// Views on the stack, root first.
    #[must_use]
    pub fn view_controllers(&self) -> Vec<ViewHandle> {
        self.state.entries.iter().map(|entry| entry.view).collect()
    }

    /// The top view.
    #[must_use]
    pub fn top_view_controller(&self) -> ViewHandle {
        self.state.entries[self.state.depth() - 1].view
    }

    /// The root view.
    #[must_use]
    pub fn root_view_controller(&self) -> ViewHandle {
        self.state.entries[0].view
    }

    /// Whether the top view is (fully) revealing its parent.
    #[must_use]
    pub fn is_revealing(&self) -> bool {
        self.state.revealing
    }

    /// Number of views on the stack.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.state.depth()
    }

    /// Position of `view`, root = 0.
    #[must_use]
    pub fn index_of(&self, view: ViewHandle) -> Option<usize> {
        self.state.index_of(view)
    }

    /// Check if `view` is on the stack.
    #[must_use]
    pub fn contains(&self, view: ViewHandle) -> bool {
        self.index_of(view).is_some()
    }

    /// Settings of a view on the stack.
    #[must_use]
    pub fn item_config(&self, view: ViewHandle) -> Option<&StackItemConfig> {
        self.state
            .entries
            .iter()
            .find(|entry| entry.view == view)
            .map(|entry| &entry.config)
    }

    /// Replace the settings of a view on the stack.
    ///
    /// An in-flight transition keeps the values it started with.
    ///
    /// # Errors
    ///
    /// Returns [`StackError::NotFound`] if `view` is not on the stack.
    pub fn set_item_config(&mut self, view: ViewHandle, config: StackItemConfig) -> StackResult<()> {
        let index = self.index_of(view).ok_or(StackError::NotFound(view))?;
        self.state.entries[index].config = config.normalized();
        if self.engine.is_idle() {
            self.state.relayout();
        }
        Ok(())
    }

    /// Resize the container.
    ///
    /// An in-flight transition finishes with the size it started with.
    pub fn set_bounds(&mut self, width: f32, height: f32) {
        self.settings.width = width;
        self.settings.height = height;
        self.state.bounds = Size::new(width, height);
        tracing::debug!("Stack resized to {width}x{height}");
        if self.engine.is_idle() {
            self.state.relayout();
        }
    }

    /// Current frames of every entry, root first.
    #[must_use]
    pub fn layout(&self) -> Vec<ItemLayout> {
        let mut layouts =
            LayoutOffsetManager::rest(self.state.bounds, &self.state.entries, self.state.revealing);
        if let Some(session) = self.engine.session() {
            let (parent, top) = session.layouts();
            let underlay = session.underlay().copied();
            for layout in &mut layouts {
                if layout.view == top.view {
                    *layout = top;
                } else if let Some(parent) = parent.filter(|p| p.view == layout.view) {
                    *layout = parent;
                } else if let Some(underlay) = underlay.filter(|u| u.view == layout.view) {
                    *layout = underlay;
                }
            }
        }
        layouts
    }

    /// Serializable snapshot of entries and frames.
    #[must_use]
    pub fn snapshot(&self) -> StackSnapshot {
        StackSnapshot {
            entries: self.state.entries.clone(),
            revealing: self.state.revealing,
            layouts: self.layout(),
        }
    }

    /// Engine state.
    #[must_use]
    pub const fn phase(&self) -> EnginePhase {
        self.engine.phase()
    }

    /// Check if any transition is in flight.
    #[must_use]
    pub const fn is_transitioning(&self) -> bool {
        !self.engine.is_idle()
    }

    /// The in-flight session, if any.
    #[must_use]
    pub const fn session(&self) -> Option<&TransitionSession> {
        self.engine.session()
    }

    /// Stack settings.
    #[must_use]
    pub const fn settings(&self) -> &StackSettings {
        &self.settings
    }

    /// The host.
    #[must_use]
    pub const fn host(&self) -> &H {
        &self.state.host
    }

    /// Mutable access to the host.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.state.host
    }
}
