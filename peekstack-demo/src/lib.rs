//! # Peekstack Demo
//!
//! Scripted host for Peekstack. Drives a navigation stack through push,
//! peek-tap pop, reveal and drag gestures on a simulated frame clock, and
//! logs every host call through `tracing`.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p peekstack-demo
//! RUST_LOG=peekstack_core=trace cargo run -p peekstack-demo -- --depth 4 --peek 60
//! ```
//!
//! ## Architecture
//!
//! - `CliArgs` - Command-line arguments parsed with clap
//! - `DemoConfig` - Container size, item extents and frame rate
//! - `LoggingHost` - `HostView` that records frames and logs appearance calls
//! - `run_scenario` - The scripted session, returning a `ScenarioReport`

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]

use std::collections::HashMap;
use std::path::PathBuf;

use clap::Parser;
use peekstack_core::{
    GestureEvent, GestureResponse, HostView, NavigationStack, PairGeometry, Point, Rect,
    StackDelegate, StackError, StackItemConfig, StackSettings, StackSnapshot, ViewHandle,
};
use serde::Serialize;
use thiserror::Error;

/// Errors raised by the demo.
#[derive(Debug, Error)]
pub enum DemoError {
    /// Settings file could not be read.
    #[error("Failed to read settings from {path}: {source}")]
    Settings {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A stack operation was rejected.
    #[error("Stack error: {0}")]
    Stack(#[from] StackError),

    /// The scripted session didn't end where it should.
    #[error("Scenario failed: {0}")]
    Scenario(String),
}

/// Command-line arguments for peekstack-demo.
#[derive(Debug, Clone, Parser)]
#[command(name = "peekstack-demo")]
#[command(about = "Drive a Peekstack navigation stack through a scripted session")]
#[command(version)]
pub struct CliArgs {
    /// JSON file with stack settings; missing fields take defaults
    #[arg(long, env = "PEEKSTACK_SETTINGS")]
    pub settings: Option<PathBuf>,

    /// Container width in points
    #[arg(long, default_value = "390")]
    pub width: f32,

    /// Container height in points
    #[arg(long, default_value = "844")]
    pub height: f32,

    /// Left peek of every covered view
    #[arg(long, default_value = "44")]
    pub peek: f32,

    /// Right hang of every revealing view
    #[arg(long, default_value = "20")]
    pub hang: f32,

    /// Number of views pushed over the root
    #[arg(long, default_value = "3")]
    pub depth: usize,

    /// Simulated frame rate
    #[arg(long, default_value = "60")]
    pub fps: u32,

    /// Print the final stack snapshot as JSON
    #[arg(long)]
    pub print_snapshot: bool,
}

/// Demo configuration.
#[derive(Debug, Clone)]
pub struct DemoConfig {
    /// Optional settings file; overrides `width` and `height` when present.
    pub settings_path: Option<PathBuf>,
    /// Container width.
    pub width: f32,
    /// Container height.
    pub height: f32,
    /// Left peek of every pushed view.
    pub peek: f32,
    /// Right hang of every pushed view.
    pub hang: f32,
    /// Views pushed over the root.
    pub depth: usize,
    /// Simulated frame rate.
    pub fps: u32,
    /// Print the final snapshot.
    pub print_snapshot: bool,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl DemoConfig {
    /// Create a demo configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            settings_path: None,
            width: 390.0,
            height: 844.0,
            peek: 44.0,
            hang: 20.0,
            depth: 3,
            fps: 60,
            print_snapshot: false,
        }
    }

    /// Stack settings: the settings file if given, otherwise defaults sized to the container.
    ///
    /// # Errors
    ///
    /// Returns an error if the file can't be read or holds invalid settings.
    pub fn stack_settings(&self) -> Result<StackSettings, DemoError> {
        match &self.settings_path {
            Some(path) => {
                let json = std::fs::read_to_string(path).map_err(|source| DemoError::Settings {
                    path: path.clone(),
                    source,
                })?;
                Ok(StackSettings::from_json(&json)?)
            }
            None => Ok(StackSettings::with_size(self.width, self.height)),
        }
    }

    /// Config of every pushed view.
    #[must_use]
    pub fn item_config(&self) -> StackItemConfig {
        StackItemConfig::default()
            .with_left_peek(self.peek)
            .with_right_hang(self.hang)
    }

    /// Length of one simulated frame.
    #[must_use]
    pub fn frame_ms(&self) -> f64 {
        1000.0 / f64::from(self.fps.max(1))
    }
}

impl From<CliArgs> for DemoConfig {
    fn from(args: CliArgs) -> Self {
        Self {
            settings_path: args.settings,
            width: args.width,
            height: args.height,
            peek: args.peek,
            hang: args.hang,
            depth: args.depth,
            fps: args.fps,
            print_snapshot: args.print_snapshot,
        }
    }
}

/// Host that keeps frames and names of its views and logs every call.
#[derive(Debug, Default)]
pub struct LoggingHost {
    names: HashMap<ViewHandle, String>,
    frames: HashMap<ViewHandle, Rect>,
    attached: Vec<ViewHandle>,
    frame_updates: usize,
}

impl LoggingHost {
    /// Give `view` a readable name for logging.
    pub fn name(&mut self, view: ViewHandle, name: impl Into<String>) {
        self.names.insert(view, name.into());
    }

    /// Readable name of `view`.
    #[must_use]
    pub fn label(&self, view: ViewHandle) -> String {
        self.names
            .get(&view)
            .cloned()
            .unwrap_or_else(|| view.to_string())
    }

    /// Views currently attached, in attach order.
    #[must_use]
    pub fn attached(&self) -> &[ViewHandle] {
        &self.attached
    }

    /// Last frame set for `view`.
    #[must_use]
    pub fn frame(&self, view: ViewHandle) -> Option<Rect> {
        self.frames.get(&view).copied()
    }

    /// Total `set_frame` calls so far.
    #[must_use]
    pub const fn frame_updates(&self) -> usize {
        self.frame_updates
    }
}

impl HostView for LoggingHost {
    fn attach(&mut self, view: ViewHandle) {
        tracing::info!("attach {}", self.label(view));
        self.attached.push(view);
    }

    fn detach(&mut self, view: ViewHandle) {
        tracing::info!("detach {}", self.label(view));
        self.attached.retain(|v| *v != view);
        self.frames.remove(&view);
    }

    fn set_frame(&mut self, view: ViewHandle, frame: Rect) {
        tracing::trace!(
            "frame {} x={:.1} w={:.1}",
            self.label(view),
            frame.x,
            frame.width
        );
        self.frames.insert(view, frame);
        self.frame_updates += 1;
    }

    fn will_appear(&mut self, view: ViewHandle, animated: bool) {
        tracing::debug!("{} will appear (animated: {animated})", self.label(view));
    }

    fn did_appear(&mut self, view: ViewHandle, animated: bool) {
        tracing::debug!("{} did appear (animated: {animated})", self.label(view));
    }

    fn will_disappear(&mut self, view: ViewHandle, animated: bool) {
        tracing::debug!("{} will disappear (animated: {animated})", self.label(view));
    }

    fn did_disappear(&mut self, view: ViewHandle, animated: bool) {
        tracing::debug!("{} did disappear (animated: {animated})", self.label(view));
    }
}

/// Delegate that logs top-of-stack changes.
#[derive(Debug, Default)]
pub struct LoggingDelegate;

impl StackDelegate for LoggingDelegate {
    fn will_show(&mut self, view: ViewHandle, animated: bool) {
        tracing::debug!("will show {view} (animated: {animated})");
    }

    fn did_show(&mut self, view: ViewHandle, _animated: bool) {
        tracing::info!("did show {view}");
    }
}

/// Outcome of a scripted session.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    /// Simulated frames rendered.
    pub frames: usize,
    /// Host `set_frame` calls.
    pub frame_updates: usize,
    /// One line per completed step.
    pub steps: Vec<String>,
    /// Stack state at the end.
    pub snapshot: StackSnapshot,
}

/// Simulated session: the stack plus a frame clock.
struct Session {
    stack: NavigationStack<LoggingHost>,
    now_ms: f64,
    frame_ms: f64,
    frames: usize,
    steps: Vec<String>,
}

impl Session {
    /// Tick until the running transition settles.
    fn settle(&mut self) {
        while self.stack.tick(self.now_ms) {
            self.now_ms += self.frame_ms;
            self.frames += 1;
        }
    }

    /// Topmost laid-out view under `point`.
    fn view_at(&self, point: Point) -> Option<ViewHandle> {
        self.stack
            .layout()
            .iter()
            .rev()
            .find(|layout| layout.is_visible() && layout.frame.contains(point))
            .map(|layout| layout.view)
    }

    /// Deliver a tap to whatever view is under `point`.
    fn tap(&mut self, point: Point) -> GestureResponse {
        let Some(view) = self.view_at(point) else {
            return GestureResponse::Ignored;
        };
        self.stack
            .handle_gesture(view, GestureEvent::Tap { location: point })
    }

    /// Drag `view` horizontally by `distance` over `steps` frames, then release.
    fn drag(&mut self, view: ViewHandle, distance: f32, steps: u16, release_velocity: f32) {
        let start = Point::new(self.stack.settings().width / 2.0, 300.0);
        self.stack
            .handle_gesture(view, GestureEvent::PanBegan { location: start });
        let velocity = distance * 1000.0 / (f32::from(steps.max(1)) * 16.0);
        for step in 1..=steps.max(1) {
            let translation_x = distance * f32::from(step) / f32::from(steps.max(1));
            let response = self.stack.handle_gesture(
                view,
                GestureEvent::PanChanged {
                    translation_x,
                    velocity_x: velocity,
                },
            );
            tracing::trace!("drag {translation_x:+.1}: {response:?}");
            self.now_ms += self.frame_ms;
            self.frames += 1;
        }
        let response = self.stack.handle_gesture(
            view,
            GestureEvent::PanEnded {
                velocity_x: release_velocity,
            },
        );
        tracing::info!("drag released: {response:?}");
        self.settle();
    }

    fn step(&mut self, description: impl Into<String>) {
        let description = description.into();
        tracing::info!(
            "{description} -> depth {}, revealing {}",
            self.stack.depth(),
            self.stack.is_revealing()
        );
        self.steps.push(description);
    }

    fn expect_depth(&self, depth: usize, after: &str) -> Result<(), DemoError> {
        if self.stack.depth() == depth {
            Ok(())
        } else {
            Err(DemoError::Scenario(format!(
                "expected depth {depth} after {after}, found {}",
                self.stack.depth()
            )))
        }
    }
}

/// Run the scripted session: push `depth` views, pop one by tapping the
/// peeking parent, reveal and drag the reveal closed, cancel a short pop
/// drag, then pop to the root.
///
/// # Errors
///
/// Returns an error if the settings are invalid or the stack ends up
/// somewhere the script didn't expect.
pub fn run_scenario(config: &DemoConfig) -> Result<ScenarioReport, DemoError> {
    let settings = config.stack_settings()?;
    let root = ViewHandle::new();
    let mut host = LoggingHost::default();
    host.name(root, "root");

    let mut session = Session {
        stack: NavigationStack::new(root, host, settings)?,
        now_ms: 0.0,
        frame_ms: config.frame_ms(),
        frames: 0,
        steps: Vec::new(),
    };
    session.stack.set_delegate(Box::new(LoggingDelegate));

    for index in 1..=config.depth {
        let view = ViewHandle::new();
        session.stack.host_mut().name(view, format!("view-{index}"));
        session.stack.push(view, Some(config.item_config()), true)?;
        session.settle();
        session.step(format!("push view-{index}"));
    }
    session.expect_depth(config.depth + 1, "pushes")?;

    if config.depth >= 2 {
        // The parent shows its peek strip along the left edge.
        let strip = Point::new(config.peek / 2.0, 300.0);
        let response = session.tap(strip);
        session.settle();
        session.step(format!("tap peeking parent: {response:?}"));
        if config.peek > 0.0 {
            session.expect_depth(config.depth, "peek tap")?;
        }
    }

    if session.stack.depth() >= 2 {
        let top = session.stack.top_view_controller();
        session.stack.reveal_parent(true)?;
        session.settle();
        session.step("reveal parent");

        let bounds = session.stack.settings().bounds();
        let Some(geometry) = PairGeometry::of_top(bounds, &session.stack.snapshot().entries)
        else {
            return Err(DemoError::Scenario("empty stack".into()));
        };
        // End-reveal commits past half the view's own width.
        session.drag(top, -geometry.top_width() * 0.7, 12, 0.0);
        session.step("drag reveal closed");
        if session.stack.is_revealing() {
            return Err(DemoError::Scenario("reveal still active after drag".into()));
        }

        let depth = session.stack.depth();
        session.drag(top, geometry.exposure_span() * 0.2, 6, 0.0);
        session.step("short pop drag");
        session.expect_depth(depth, "cancelled drag")?;
    }

    let popped = session.stack.pop_to_root(true)?;
    session.settle();
    session.step(format!("pop to root ({} views)", popped.len()));
    session.expect_depth(1, "pop to root")?;

    Ok(ScenarioReport {
        frames: session.frames,
        frame_updates: session.stack.host().frame_updates(),
        steps: session.steps,
        snapshot: session.stack.snapshot(),
    })
}
