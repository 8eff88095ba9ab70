//! Capabilities the stack consumes from (and exposes to) its host.
//!
//! The host owns the real views. The stack calls into it at fixed points:
//!
//! ```text
//! push:  attach -> will_appear -> frames... -> did_appear
//! pop:   will_disappear -> frames... -> did_disappear -> detach
//! ```

use crate::{Rect, ViewHandle};

/// View containment and appearance notifications provided by the host.
///
/// Only containment and framing are required; the appearance callbacks
/// default to no-ops for hosts that don't track them.
pub trait HostView {
    /// Add the view to the stack's container.
    fn attach(&mut self, view: ViewHandle);

    /// Remove the view from the stack's container and release its resources.
    fn detach(&mut self, view: ViewHandle);

    /// Position the view. Called every animation tick for the moving pair.
    fn set_frame(&mut self, view: ViewHandle, frame: Rect);

    /// The view is about to become visible.
    fn will_appear(&mut self, _view: ViewHandle, _animated: bool) {}

    /// The view became visible.
    fn did_appear(&mut self, _view: ViewHandle, _animated: bool) {}

    /// The view is about to stop being visible.
    fn will_disappear(&mut self, _view: ViewHandle, _animated: bool) {}

    /// The view stopped being visible.
    fn did_disappear(&mut self, _view: ViewHandle, _animated: bool) {}
}

/// Optional observer of top-of-stack changes.
///
/// Every method has an empty default, so implementors override only what they
/// care about. Nothing a delegate does can change the stack.
pub trait StackDelegate {
    /// A view is about to become the visible top of the stack.
    fn will_show(&mut self, _view: ViewHandle, _animated: bool) {}

    /// A view became the visible top of the stack.
    fn did_show(&mut self, _view: ViewHandle, _animated: bool) {}
}
