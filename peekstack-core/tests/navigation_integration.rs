//! Integration tests for programmatic stack operations.
//!
//! Drives a real `NavigationStack` against a recording host and checks stack
//! contents, notification order, and frames across whole transitions.

mod common;

use common::{
    count, create_stack, events_for, run_to_completion, Event, EPS, HEIGHT, WIDTH,
};
use peekstack_core::{EnginePhase, StackError, StackItemConfig, ViewHandle};

// ===========================================================================
// Push and pop
// ===========================================================================

#[test]
fn test_push_then_pop_scenario() {
    let a = ViewHandle::new();
    let b = ViewHandle::new();
    let (mut stack, log) = create_stack(a);

    stack.push(b, None, true).expect("push");
    assert_eq!(stack.phase(), EnginePhase::Animating);
    assert_eq!(stack.view_controllers(), vec![a, b]);
    run_to_completion(&mut stack);

    assert_eq!(stack.top_view_controller(), b);
    assert_eq!(
        *log.borrow(),
        vec![
            Event::Attach(b),
            Event::WillAppear(b),
            Event::WillShow(b),
            Event::DidAppear(b),
            Event::DidShow(b),
        ]
    );

    log.borrow_mut().clear();
    assert_eq!(stack.pop(true).expect("pop"), Some(b));
    // Still attached until the animation ends.
    assert!(stack.host().attached.contains(&b));
    run_to_completion(&mut stack);

    assert_eq!(stack.view_controllers(), vec![a]);
    assert!(!stack.host().attached.contains(&b));
    assert_eq!(
        *log.borrow(),
        vec![
            Event::WillDisappear(b),
            Event::WillShow(a),
            Event::DidDisappear(b),
            Event::Detach(b),
            Event::DidShow(a),
        ]
    );
}

#[test]
fn test_unanimated_push_pop_is_identity() {
    let a = ViewHandle::new();
    let b = ViewHandle::new();
    let (mut stack, log) = create_stack(a);

    stack.push(b, None, false).expect("push");
    assert_eq!(stack.phase(), EnginePhase::Idle);
    assert_eq!(count(&log, Event::DidShow(b)), 1);

    assert_eq!(stack.pop(false).expect("pop"), Some(b));
    assert_eq!(stack.view_controllers(), vec![a]);
    assert_eq!(stack.host().attached, vec![a]);
    assert!(!stack.contains(b));

    let frame = stack.host().frame_of(a).expect("root framed");
    assert!(frame.x.abs() < EPS);
    assert!((frame.width - WIDTH).abs() < EPS);
    assert!((frame.height - HEIGHT).abs() < EPS);
}

#[test]
fn test_push_hides_grandparent() {
    let a = ViewHandle::new();
    let b = ViewHandle::new();
    let c = ViewHandle::new();
    let (mut stack, log) = create_stack(a);
    stack.push(b, None, false).expect("push b");
    log.borrow_mut().clear();

    stack.push(c, None, false).expect("push c");
    assert_eq!(
        events_for(&log, a),
        vec![Event::WillDisappear(a), Event::DidDisappear(a)]
    );
    assert!(events_for(&log, b).is_empty());

    log.borrow_mut().clear();
    stack.pop(false).expect("pop");
    assert_eq!(
        events_for(&log, a),
        vec![Event::WillAppear(a), Event::DidAppear(a)]
    );
}

#[test]
fn test_push_duplicate_view() {
    let a = ViewHandle::new();
    let b = ViewHandle::new();
    let (mut stack, _log) = create_stack(a);
    stack.push(b, None, false).expect("push");

    let err = stack.push(a, None, false).unwrap_err();
    assert!(matches!(err, StackError::AlreadyInStack(v) if v == a));
    assert_eq!(stack.depth(), 2);
}

// ===========================================================================
// Root invariant
// ===========================================================================

#[test]
fn test_stack_never_empties() {
    let a = ViewHandle::new();
    let (mut stack, _log) = create_stack(a);
    for _ in 0..3 {
        stack.push(ViewHandle::new(), None, false).expect("push");
    }

    for _ in 0..5 {
        let _ = stack.pop(false).expect("pop");
    }
    assert_eq!(stack.view_controllers(), vec![a]);
    assert!(matches!(stack.try_pop(true), Err(StackError::InvalidRoot)));
    assert!(stack.pop_to_root(true).expect("pop to root").is_empty());
    assert_eq!(stack.depth(), 1);
    assert_eq!(stack.phase(), EnginePhase::Idle);
}

// ===========================================================================
// pop_to
// ===========================================================================

#[test]
fn test_pop_to_root_scenario() {
    let a = ViewHandle::new();
    let b = ViewHandle::new();
    let c = ViewHandle::new();
    let (mut stack, log) = create_stack(a);
    stack.push(b, None, false).expect("push b");
    stack.push(c, None, false).expect("push c");
    log.borrow_mut().clear();

    let removed = stack.pop_to(a, true).expect("pop_to");
    assert_eq!(removed, vec![c, b]);
    // The intermediate entry is gone at once, the top leaves with the animation.
    assert_eq!(stack.view_controllers(), vec![a, c]);
    assert!(!stack.host().attached.contains(&b));
    run_to_completion(&mut stack);

    assert_eq!(stack.view_controllers(), vec![a]);
    assert_eq!(stack.host().attached, vec![a]);
    assert_eq!(
        events_for(&log, b),
        vec![Event::WillDisappear(b), Event::DidDisappear(b), Event::Detach(b)]
    );
    assert_eq!(
        events_for(&log, c),
        vec![Event::WillDisappear(c), Event::DidDisappear(c), Event::Detach(c)]
    );
    assert_eq!(
        events_for(&log, a),
        vec![
            Event::WillAppear(a),
            Event::WillShow(a),
            Event::DidAppear(a),
            Event::DidShow(a),
        ]
    );
}

#[test]
fn test_pop_to_top_is_noop() {
    let a = ViewHandle::new();
    let b = ViewHandle::new();
    let (mut stack, log) = create_stack(a);
    stack.push(b, None, false).expect("push");
    log.borrow_mut().clear();

    assert!(stack.pop_to(b, true).expect("pop_to").is_empty());
    assert_eq!(stack.view_controllers(), vec![a, b]);
    assert_eq!(stack.phase(), EnginePhase::Idle);
    assert!(log.borrow().is_empty());
}

#[test]
fn test_pop_to_unknown_view() {
    let a = ViewHandle::new();
    let (mut stack, _log) = create_stack(a);
    let stranger = ViewHandle::new();

    let err = stack.pop_to(stranger, true).unwrap_err();
    assert!(matches!(err, StackError::NotFound(v) if v == stranger));
}

#[test]
fn test_pop_to_parent_matches_pop() {
    let a = ViewHandle::new();
    let b = ViewHandle::new();
    let c = ViewHandle::new();
    let (mut stack, _log) = create_stack(a);
    stack.push(b, None, false).expect("push b");
    stack.push(c, None, false).expect("push c");

    assert_eq!(stack.pop_to(b, false).expect("pop_to"), vec![c]);
    assert_eq!(stack.view_controllers(), vec![a, b]);
}

// ===========================================================================
// Busy rejection
// ===========================================================================

#[test]
fn test_requests_rejected_while_animating() {
    let a = ViewHandle::new();
    let b = ViewHandle::new();
    let c = ViewHandle::new();
    let (mut stack, log) = create_stack(a);

    stack.push(b, None, true).expect("push");
    stack.tick(0.0);
    stack.tick(100.0);

    assert!(stack.push(c, None, true).unwrap_err().is_busy());
    assert!(stack.pop(true).unwrap_err().is_busy());
    assert!(stack.pop_to(a, false).unwrap_err().is_busy());
    assert!(stack.reveal_parent(true).unwrap_err().is_busy());
    assert!(stack.end_reveal(true).unwrap_err().is_busy());
    assert!(!stack.contains(c));

    run_to_completion(&mut stack);
    assert_eq!(count(&log, Event::DidAppear(b)), 1);
    assert_eq!(count(&log, Event::DidShow(b)), 1);
    assert_eq!(stack.view_controllers(), vec![a, b]);
}

#[test]
fn test_popped_view_cleaned_up_once() {
    let a = ViewHandle::new();
    let b = ViewHandle::new();
    let (mut stack, log) = create_stack(a);
    stack.push(b, None, false).expect("push");

    stack.pop(true).expect("pop");
    assert!(stack.push(ViewHandle::new(), None, true).unwrap_err().is_busy());
    run_to_completion(&mut stack);

    assert_eq!(count(&log, Event::Detach(b)), 1);
    let events = events_for(&log, b);
    let disappeared = events
        .iter()
        .position(|e| *e == Event::DidDisappear(b))
        .expect("did disappear");
    let detached = events
        .iter()
        .position(|e| *e == Event::Detach(b))
        .expect("detached");
    assert!(disappeared < detached);
}

// ===========================================================================
// Offsets
// ===========================================================================

#[test]
fn test_parent_visibility_shrinks_during_push() {
    let a = ViewHandle::new();
    let b = ViewHandle::new();
    let (mut stack, _log) = create_stack(a);
    stack
        .set_item_config(a, StackItemConfig::default().with_left_peek(40.0))
        .expect("config");

    stack.push(b, None, true).expect("push");
    run_to_completion(&mut stack);

    let widths: Vec<f32> = stack
        .host()
        .frames_of(a)
        .iter()
        .skip(1)
        .map(|frame| frame.max_x() - frame.x.max(0.0))
        .collect();
    assert!(widths.len() > 2);
    assert!((widths[0] - WIDTH).abs() < EPS);
    for pair in widths.windows(2) {
        assert!(pair[1] <= pair[0] + EPS, "parent grew: {pair:?}");
    }
    assert!((widths[widths.len() - 1] - 40.0).abs() < EPS);

    let top = stack.host().frame_of(b).expect("top framed");
    assert!((top.x - 40.0).abs() < EPS);
    assert!((top.width - (WIDTH - 40.0)).abs() < EPS);
}

#[test]
fn test_parent_visibility_grows_during_pop() {
    let a = ViewHandle::new();
    let b = ViewHandle::new();
    let (mut stack, _log) = create_stack(a);
    stack
        .set_item_config(a, StackItemConfig::default().with_left_peek(40.0))
        .expect("config");
    stack.push(b, None, false).expect("push");
    let before = stack.host().frames_of(a).len();

    stack.pop(true).expect("pop");
    run_to_completion(&mut stack);

    let widths: Vec<f32> = stack.host().frames_of(a)[before..]
        .iter()
        .map(|frame| frame.max_x() - frame.x.max(0.0))
        .collect();
    assert!((widths[0] - 40.0).abs() < EPS);
    for pair in widths.windows(2) {
        assert!(pair[1] + EPS >= pair[0], "parent shrank: {pair:?}");
    }
    assert!((widths[widths.len() - 1] - WIDTH).abs() < EPS);

    let top_xs: Vec<f32> = stack.host().frames_of(b).iter().map(|f| f.x).collect();
    for pair in top_xs.windows(2) {
        assert!(pair[1] + EPS >= pair[0], "top moved back: {pair:?}");
    }
}

#[test]
fn test_pop_frames_grandparent_peek_from_start() {
    let a = ViewHandle::new();
    let b = ViewHandle::new();
    let c = ViewHandle::new();
    let (mut stack, _log) = create_stack(a);
    stack
        .set_item_config(a, StackItemConfig::default().with_left_peek(30.0))
        .expect("config");
    stack.push(b, None, false).expect("push b");
    stack.push(c, None, false).expect("push c");
    assert!(!stack.layout()[0].is_visible());

    stack.pop(true).expect("pop");
    let frame = stack.host().frame_of(a).expect("grandparent framed");
    assert!((frame.max_x() - 30.0).abs() < EPS);
    assert!((frame.width - WIDTH).abs() < EPS);
    assert!((stack.layout()[0].visible_width - 30.0).abs() < EPS);

    run_to_completion(&mut stack);
    let frame = stack.host().frame_of(a).expect("parent framed");
    assert!((frame.max_x() - 30.0).abs() < EPS);
}

#[test]
fn test_layout_tracks_animation() {
    let a = ViewHandle::new();
    let b = ViewHandle::new();
    let (mut stack, _log) = create_stack(a);

    stack.push(b, None, true).expect("push");
    stack.tick(0.0);
    stack.tick(150.0);

    let layout = stack.layout();
    assert_eq!(layout.len(), 2);
    assert!(layout[1].frame.x > 0.0 && layout[1].frame.x < WIDTH);
    let session = stack.session().expect("in flight");
    assert!(session.progress() > 0.0 && session.progress() < 1.0);
    assert_eq!(session.affected_entries(), vec![a, b]);
}

// ===========================================================================
// Reveal
// ===========================================================================

#[test]
fn test_reveal_and_end_reveal() {
    let a = ViewHandle::new();
    let b = ViewHandle::new();
    let (mut stack, log) = create_stack(a);
    stack
        .push(b, Some(StackItemConfig::default().with_right_hang(30.0)), false)
        .expect("push");
    log.borrow_mut().clear();

    stack.reveal_parent(true).expect("reveal");
    assert!(!stack.is_revealing());
    run_to_completion(&mut stack);
    assert!(stack.is_revealing());

    let top = stack.host().frame_of(b).expect("top framed");
    assert!((WIDTH - top.x - 30.0).abs() < EPS);
    let parent = stack.layout()[0];
    assert!((parent.visible_width - (WIDTH - 30.0)).abs() < EPS);

    // Revealing again is a no-op.
    stack.reveal_parent(true).expect("reveal again");
    assert_eq!(stack.phase(), EnginePhase::Idle);

    stack.end_reveal(true).expect("end reveal");
    run_to_completion(&mut stack);
    assert!(!stack.is_revealing());
    assert!(stack.host().frame_of(b).expect("top").x.abs() < EPS);
    assert!(log.borrow().is_empty());
}

#[test]
fn test_end_reveal_when_not_revealing() {
    let a = ViewHandle::new();
    let (mut stack, _log) = create_stack(a);
    stack.push(ViewHandle::new(), None, false).expect("push");

    stack.end_reveal(true).expect("no-op");
    assert_eq!(stack.phase(), EnginePhase::Idle);
}

#[test]
fn test_reveal_at_root() {
    let a = ViewHandle::new();
    let (mut stack, _log) = create_stack(a);

    assert!(matches!(stack.try_reveal_parent(true), Err(StackError::InvalidRoot)));
    stack.reveal_parent(true).expect("no-op at root");
    assert!(!stack.is_revealing());
}

#[test]
fn test_pop_while_revealing_starts_from_hang() {
    let a = ViewHandle::new();
    let b = ViewHandle::new();
    let (mut stack, _log) = create_stack(a);
    stack.push(b, None, false).expect("push");
    stack.reveal_parent(false).expect("reveal");
    let revealed_x = stack.host().frame_of(b).expect("top").x;
    let before = stack.host().frames_of(b).len();

    stack.pop(true).expect("pop");
    let first = stack.host().frames_of(b)[before];
    assert!((first.x - revealed_x).abs() < EPS);
    run_to_completion(&mut stack);

    assert!(!stack.is_revealing());
    assert_eq!(stack.view_controllers(), vec![a]);
}

#[test]
fn test_push_while_revealing_ends_reveal() {
    let a = ViewHandle::new();
    let b = ViewHandle::new();
    let c = ViewHandle::new();
    let (mut stack, _log) = create_stack(a);
    stack.push(b, None, false).expect("push b");
    stack.reveal_parent(false).expect("reveal");

    stack.push(c, None, false).expect("push c");
    assert!(!stack.is_revealing());
    assert_eq!(stack.view_controllers(), vec![a, b, c]);
}

// ===========================================================================
// Config and snapshot
// ===========================================================================

#[test]
fn test_config_change_does_not_affect_running_transition() {
    let a = ViewHandle::new();
    let b = ViewHandle::new();
    let (mut stack, _log) = create_stack(a);

    stack.push(b, None, true).expect("push");
    stack
        .set_item_config(a, StackItemConfig::default().with_left_peek(100.0))
        .expect("config");
    assert_eq!(
        stack.session().expect("in flight").geometry().parent_peek,
        Some(0.0)
    );
    run_to_completion(&mut stack);

    // The next layout picks up the new peek.
    let top = stack.host().frame_of(b).expect("top");
    assert!((top.x - 100.0).abs() < EPS);
    assert!((stack.item_config(a).expect("config").left_peek - 100.0).abs() < EPS);
}

#[test]
fn test_snapshot_lists_entries() {
    let a = ViewHandle::new();
    let b = ViewHandle::new();
    let (mut stack, _log) = create_stack(a);
    stack
        .push(b, Some(StackItemConfig::default().with_left_peek(12.0)), false)
        .expect("push");

    let snapshot = stack.snapshot();
    assert_eq!(snapshot.entries.len(), 2);
    assert_eq!(snapshot.entries[1].view, b);
    assert!((snapshot.entries[1].config.left_peek - 12.0).abs() < EPS);

    let json = snapshot.to_json().expect("serialize");
    let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");
    assert_eq!(value["entries"].as_array().map(Vec::len), Some(2));
    assert_eq!(value["revealing"], serde_json::Value::Bool(false));
}
