//! Shared harness for stack integration tests.
//!
//! Provides a host and a delegate that record every call into one shared
//! event log, so tests can assert on the exact order of notifications.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use peekstack_core::{
    HostView, NavigationStack, Rect, StackDelegate, StackSettings, ViewHandle,
};

/// Container width used by every test stack.
pub const WIDTH: f32 = 400.0;

/// Container height used by every test stack.
pub const HEIGHT: f32 = 800.0;

/// Tolerance for float comparisons.
pub const EPS: f32 = 0.01;

/// A call observed by the host or the delegate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event {
    Attach(ViewHandle),
    Detach(ViewHandle),
    WillAppear(ViewHandle),
    DidAppear(ViewHandle),
    WillDisappear(ViewHandle),
    DidDisappear(ViewHandle),
    WillShow(ViewHandle),
    DidShow(ViewHandle),
}

/// Shared event log.
pub type EventLog = Rc<RefCell<Vec<Event>>>;

/// Host that records calls and keeps the latest frame of every view.
#[derive(Default)]
pub struct RecordingHost {
    pub log: EventLog,
    pub attached: Vec<ViewHandle>,
    pub frames: Vec<(ViewHandle, Rect)>,
}

impl RecordingHost {
    /// Most recent frame set for `view`.
    pub fn frame_of(&self, view: ViewHandle) -> Option<Rect> {
        self.frames
            .iter()
            .rev()
            .find(|(v, _)| *v == view)
            .map(|(_, frame)| *frame)
    }

    /// Every frame set for `view`, oldest first.
    pub fn frames_of(&self, view: ViewHandle) -> Vec<Rect> {
        self.frames
            .iter()
            .filter(|(v, _)| *v == view)
            .map(|(_, frame)| *frame)
            .collect()
    }
}

impl HostView for RecordingHost {
    fn attach(&mut self, view: ViewHandle) {
        self.attached.push(view);
        self.log.borrow_mut().push(Event::Attach(view));
    }

    fn detach(&mut self, view: ViewHandle) {
        self.attached.retain(|v| *v != view);
        self.log.borrow_mut().push(Event::Detach(view));
    }

    fn set_frame(&mut self, view: ViewHandle, frame: Rect) {
        self.frames.push((view, frame));
    }

    fn will_appear(&mut self, view: ViewHandle, _animated: bool) {
        self.log.borrow_mut().push(Event::WillAppear(view));
    }

    fn did_appear(&mut self, view: ViewHandle, _animated: bool) {
        self.log.borrow_mut().push(Event::DidAppear(view));
    }

    fn will_disappear(&mut self, view: ViewHandle, _animated: bool) {
        self.log.borrow_mut().push(Event::WillDisappear(view));
    }

    fn did_disappear(&mut self, view: ViewHandle, _animated: bool) {
        self.log.borrow_mut().push(Event::DidDisappear(view));
    }
}

/// Delegate writing into the same log as the host.
pub struct RecordingDelegate {
    pub log: EventLog,
}

impl StackDelegate for RecordingDelegate {
    fn will_show(&mut self, view: ViewHandle, _animated: bool) {
        self.log.borrow_mut().push(Event::WillShow(view));
    }

    fn did_show(&mut self, view: ViewHandle, _animated: bool) {
        self.log.borrow_mut().push(Event::DidShow(view));
    }
}

/// Route library logs to the test output. Safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("peekstack_core=debug")),
        )
        .with_test_writer()
        .try_init();
}

/// A stack of `WIDTH`x`HEIGHT` holding `root`, with a recording delegate.
pub fn create_stack(root: ViewHandle) -> (NavigationStack<RecordingHost>, EventLog) {
    create_stack_with(root, StackSettings::with_size(WIDTH, HEIGHT))
}

/// Like [`create_stack`] with custom settings.
pub fn create_stack_with(
    root: ViewHandle,
    settings: StackSettings,
) -> (NavigationStack<RecordingHost>, EventLog) {
    init_tracing();
    let log = EventLog::default();
    let host = RecordingHost {
        log: Rc::clone(&log),
        ..RecordingHost::default()
    };
    let mut stack = NavigationStack::new(root, host, settings).expect("valid settings");
    stack.set_delegate(Box::new(RecordingDelegate {
        log: Rc::clone(&log),
    }));
    log.borrow_mut().clear();
    (stack, log)
}

/// Drive the frame clock until the running transition finishes.
///
/// Returns the number of frames it took.
pub fn run_to_completion(stack: &mut NavigationStack<RecordingHost>) -> usize {
    let mut now = 0.0;
    let mut frames = 0;
    while stack.tick(now) {
        now += 1000.0 / 60.0;
        frames += 1;
        assert!(frames < 10_000, "transition never finished");
    }
    frames
}

/// Events recorded for one view, in order.
pub fn events_for(log: &EventLog, view: ViewHandle) -> Vec<Event> {
    log.borrow()
        .iter()
        .copied()
        .filter(|event| event_view(*event) == view)
        .collect()
}

fn event_view(event: Event) -> ViewHandle {
    match event {
        Event::Attach(v)
        | Event::Detach(v)
        | Event::WillAppear(v)
        | Event::DidAppear(v)
        | Event::WillDisappear(v)
        | Event::DidDisappear(v)
        | Event::WillShow(v)
        | Event::DidShow(v) => v,
    }
}

/// Number of times `event` was recorded.
pub fn count(log: &EventLog, event: Event) -> usize {
    log.borrow().iter().filter(|e| **e == event).count()
}
