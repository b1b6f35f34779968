use gesturectl::{
    Action, GestureConfig, GestureDetector, GestureEvent, GestureLog, Mode, MotionEvent, Point,
    PointerCoords, PointerId, TimerKey, TimerPurpose, TimerQueue, VelocityEstimator,
};

fn frame(time: u64, action: Action, id: PointerId, x: f32, y: f32) -> MotionEvent {
    MotionEvent::single(time, action, id, x, y)
}

fn multi(time: u64, action: Action, active: PointerId, pts: &[(PointerId, f32, f32)]) -> MotionEvent {
    let pointers: Vec<PointerCoords> = pts
        .iter()
        .map(|&(id, x, y)| PointerCoords { id, x, y })
        .collect();
    let index = pointers.iter().position(|p| p.id == active).unwrap();
    MotionEvent::new(time, action, index, pointers)
}

fn detector(config: GestureConfig) -> (GestureDetector, GestureLog) {
    let log = GestureLog::new();
    let d = GestureDetector::new(config, TimerQueue::new(), log.on_down());
    (d, log)
}

fn step(d: &mut GestureDetector, e: MotionEvent) -> bool {
    d.advance_to(e.time);
    d.handle(&e)
}

fn names(events: &[GestureEvent]) -> Vec<String> {
    events.iter().map(|e| e.to_string()).collect()
}

/// Reports a fixed release velocity regardless of the samples fed.
struct Scripted(f32, f32);

impl VelocityEstimator for Scripted {
    fn clear(&mut self) {}
    fn add_sample(&mut self, _time_ms: u64, _position: Point) {}
    fn velocity(&self, max: f32) -> (f32, f32) {
        (self.0.clamp(-max, max), self.1.clamp(-max, max))
    }
}

fn scripted(config: GestureConfig, vx: f32, vy: f32) -> (GestureDetector, GestureLog) {
    let log = GestureLog::new();
    let d = GestureDetector::new(config, TimerQueue::new(), log.on_down())
        .with_velocity_estimator(move || -> Box<dyn VelocityEstimator> {
            Box::new(Scripted(vx, vy))
        });
    (d, log)
}

fn drag_and_release(d: &mut GestureDetector) {
    step(d, frame(0, Action::Down, 0, 0.0, 0.0));
    step(d, frame(10, Action::Move, 0, 30.0, 0.0));
    step(d, frame(20, Action::Move, 0, 60.0, 0.0));
    step(d, frame(30, Action::Up, 0, 60.0, 0.0));
}

#[test]
fn single_tap_within_slop() {
    let (mut d, log) = detector(GestureConfig::default());
    assert!(step(&mut d, frame(0, Action::Down, 0, 50.0, 50.0)));
    assert_eq!(d.pointer_count(), 1);
    assert!(step(&mut d, frame(20, Action::Move, 0, 53.0, 52.0)));
    assert!(step(&mut d, frame(60, Action::Up, 0, 53.0, 52.0)));
    assert_eq!(d.machine(0).map(|m| m.mode()), Some(Mode::Up));

    let events = log.drain();
    assert_eq!(names(&events), vec!["[0] down (50.0, 50.0) t=0", "[0] tap x1"]);

    d.advance_to(360);
    assert_eq!(names(&log.drain()), vec!["[0] tap confirmed x1", "[0] release"]);
    assert_eq!(d.pointer_count(), 0);
    assert!(d.scheduler().is_empty());
}

#[test]
fn double_tap_counts_as_one_sequence() {
    let config = GestureConfig {
        touch_slop: 20.0,
        double_tap_slop: 30.0,
        ..GestureConfig::default()
    };
    let (mut d, log) = detector(config);
    step(&mut d, frame(0, Action::Down, 0, 100.0, 100.0));
    step(&mut d, frame(40, Action::Up, 0, 102.0, 101.0));
    step(&mut d, frame(150, Action::Down, 0, 103.0, 99.0));
    step(&mut d, frame(190, Action::Up, 0, 103.0, 99.0));
    d.advance_to(190 + 300);

    let events = log.drain();
    assert_eq!(
        names(&events),
        vec![
            "[0] down (100.0, 100.0) t=0",
            "[0] tap x1",
            "[0] tap x2",
            "[0] tap confirmed x2",
            "[0] release",
        ]
    );
    // the confirmation carries the anchor
    assert!(events.contains(&GestureEvent::TapConfirmed {
        id: 0,
        at: Point::new(100.0, 100.0),
        count: 2
    }));
}

#[test]
fn distant_second_tap_breaks_the_sequence() {
    let (mut d, log) = detector(GestureConfig::default());
    step(&mut d, frame(0, Action::Down, 0, 0.0, 0.0));
    step(&mut d, frame(40, Action::Up, 0, 0.0, 0.0));
    step(&mut d, frame(120, Action::Down, 0, 400.0, 0.0));
    step(&mut d, frame(160, Action::Up, 0, 400.0, 0.0));

    assert_eq!(
        names(&log.drain()),
        vec![
            "[0] down (0.0, 0.0) t=0",
            "[0] tap x1",
            "[0] tap confirmed x1",
            "[0] release",
        ]
    );
    assert_eq!(d.pointer_count(), 0);
    d.advance_to(10_000);
    assert!(log.is_empty());
}

#[test]
fn distant_long_press_reports_long_tap_for_previous_taps() {
    let (mut d, log) = detector(GestureConfig::default());
    step(&mut d, frame(0, Action::Down, 0, 0.0, 0.0));
    step(&mut d, frame(40, Action::Up, 0, 0.0, 0.0));
    step(&mut d, frame(100, Action::Down, 0, 400.0, 0.0));
    d.advance_to(600);
    step(&mut d, frame(650, Action::Up, 0, 400.0, 0.0));

    assert_eq!(
        names(&log.drain()),
        vec![
            "[0] down (0.0, 0.0) t=0",
            "[0] tap x1",
            "[0] long press (1)",
            "[0] long tap x1",
            "[0] release",
        ]
    );
}

#[test]
fn long_press_then_release_is_a_long_tap_not_a_tap() {
    let (mut d, log) = detector(GestureConfig::default());
    step(&mut d, frame(0, Action::Down, 3, 10.0, 10.0));
    d.advance_to(499);
    assert_eq!(log.len(), 1);
    d.advance_to(500);
    assert_eq!(d.machine(3).map(|m| m.mode()), Some(Mode::Down));
    step(&mut d, frame(600, Action::Up, 3, 10.0, 10.0));

    let events = log.drain();
    assert_eq!(
        names(&events),
        vec![
            "[3] down (10.0, 10.0) t=0",
            "[3] long press (0)",
            "[3] long tap x1",
            "[3] release",
        ]
    );
    assert!(!events.iter().any(|e| matches!(e, GestureEvent::Tap { .. })));
    assert!(d.scheduler().is_empty());
}

#[test]
fn drag_starts_once_and_reports_incremental_deltas() {
    let (mut d, log) = detector(GestureConfig::default());
    step(&mut d, frame(0, Action::Down, 0, 0.0, 0.0));
    step(&mut d, frame(10, Action::Move, 0, 4.0, 0.0));
    step(&mut d, frame(20, Action::Move, 0, 20.0, 0.0));
    step(&mut d, frame(30, Action::Move, 0, 30.0, 10.0));
    step(&mut d, frame(40, Action::Move, 0, 45.0, 10.0));
    // no long press once dragging
    d.advance_to(2000);

    let events = log.drain();
    let starts = events
        .iter()
        .filter(|e| matches!(e, GestureEvent::DragStart { .. }))
        .count();
    assert_eq!(starts, 1);
    let deltas: Vec<(f32, f32)> = events
        .iter()
        .filter_map(|e| match e {
            GestureEvent::DragMove { dx, dy, .. } => Some((*dx, *dy)),
            _ => None,
        })
        .collect();
    assert_eq!(deltas, vec![(-30.0, -10.0), (-15.0, 0.0)]);
    assert!(!events.iter().any(|e| matches!(e, GestureEvent::LongPress { .. })));
    assert_eq!(d.machine(0).map(|m| m.mode()), Some(Mode::Drag));
}

#[test]
fn release_at_min_fling_velocity_is_a_drag_end() {
    // 30² + 40² == 50²
    let (mut d, log) = scripted(GestureConfig::default(), 30.0, 40.0);
    drag_and_release(&mut d);
    let events = log.drain();
    assert!(events.iter().any(|e| matches!(e, GestureEvent::DragEnd { .. })));
    assert!(!events.iter().any(|e| matches!(e, GestureEvent::Fling { .. })));
    assert_eq!(d.pointer_count(), 0);
}

#[test]
fn release_above_min_fling_velocity_is_a_fling() {
    let vx = 2501.0f32.sqrt();
    let (mut d, log) = scripted(GestureConfig::default(), vx, 0.0);
    drag_and_release(&mut d);
    let events = log.drain();
    assert!(!events.iter().any(|e| matches!(e, GestureEvent::DragEnd { .. })));
    assert!(events.contains(&GestureEvent::Fling {
        id: 0,
        at: Point::new(60.0, 0.0),
        vx,
        vy: 0.0
    }));
}

#[test]
fn fast_swipe_flings_with_default_estimator() {
    let (mut d, log) = detector(GestureConfig::default());
    step(&mut d, frame(0, Action::Down, 0, 0.0, 0.0));
    for i in 1..=5u64 {
        step(&mut d, frame(i * 10, Action::Move, 0, i as f32 * 40.0, 0.0));
    }
    step(&mut d, frame(60, Action::Up, 0, 200.0, 0.0));
    let fling = log.drain().into_iter().find_map(|e| match e {
        GestureEvent::Fling { vx, vy, .. } => Some((vx, vy)),
        _ => None,
    });
    let (vx, vy) = fling.expect("fling");
    assert!(vx > 1000.0 && vx <= 8000.0, "vx = {vx}");
    assert_eq!(vy, 0.0);
}

#[test]
fn pinch_takes_priority_over_single_pointer_tracking() {
    let log = GestureLog::new();
    let mut d = GestureDetector::new(GestureConfig::default(), TimerQueue::new(), log.on_down())
        .with_scale_listener(log.scale_listener());

    assert!(step(&mut d, multi(0, Action::Down, 0, &[(0, 0.0, 0.0)])));
    assert_eq!(d.pointer_count(), 1);
    assert!(step(
        &mut d,
        multi(10, Action::PointerDown, 1, &[(0, 0.0, 0.0), (1, 100.0, 0.0)])
    ));
    assert_eq!(d.pointer_count(), 0);
    assert!(d.scheduler().is_empty());
    assert!(step(
        &mut d,
        multi(20, Action::Move, 0, &[(0, 0.0, 0.0), (1, 200.0, 0.0)])
    ));
    assert!(step(
        &mut d,
        multi(30, Action::PointerDown, 2, &[(0, 0.0, 0.0), (1, 200.0, 0.0), (2, 50.0, 50.0)])
    ));
    assert!(step(
        &mut d,
        multi(40, Action::PointerUp, 1, &[(0, 0.0, 0.0), (1, 200.0, 0.0), (2, 50.0, 50.0)])
    ));

    let events = log.drain();
    assert_eq!(
        events,
        vec![
            GestureEvent::Down {
                id: 0,
                at: Point::new(0.0, 0.0),
                time: 0
            },
            GestureEvent::ScaleBegin {
                focus: Point::new(50.0, 0.0),
                span: 100.0
            },
            GestureEvent::Release { id: 0 },
            GestureEvent::Scale {
                focus: Point::new(100.0, 0.0),
                span: 200.0,
                factor: 2.0
            },
            GestureEvent::ScaleEnd,
        ]
    );
    let scale = d.scale().unwrap();
    assert_eq!(scale.gesture().pointer_count(), 1);
    assert!(!scale.is_scaling());
    assert_eq!(d.pointer_count(), 0);
}

#[test]
fn pointer_cap_drops_extra_downs() {
    let config = GestureConfig {
        max_pointers: 2,
        ..GestureConfig::default()
    };
    let (mut d, log) = detector(config);
    assert!(step(&mut d, multi(0, Action::Down, 0, &[(0, 0.0, 0.0)])));
    assert!(step(
        &mut d,
        multi(5, Action::PointerDown, 1, &[(0, 0.0, 0.0), (1, 100.0, 0.0)])
    ));
    assert!(!step(
        &mut d,
        multi(10, Action::PointerDown, 2, &[(0, 0.0, 0.0), (1, 100.0, 0.0), (2, 200.0, 0.0)])
    ));
    assert_eq!(d.pointer_count(), 2);
    assert!(d.machine(2).is_none());
    // the untracked pointer's release is not consumed either
    assert!(!step(
        &mut d,
        multi(20, Action::PointerUp, 2, &[(0, 0.0, 0.0), (1, 100.0, 0.0), (2, 200.0, 0.0)])
    ));
    let downs = log
        .drain()
        .iter()
        .filter(|e| matches!(e, GestureEvent::Down { .. }))
        .count();
    assert_eq!(downs, 2);
}

#[test]
fn concurrent_pointers_are_tracked_independently() {
    let (mut d, log) = detector(GestureConfig::default());
    step(&mut d, multi(0, Action::Down, 0, &[(0, 0.0, 0.0)]));
    step(&mut d, multi(5, Action::PointerDown, 1, &[(0, 0.0, 0.0), (1, 300.0, 300.0)]));
    // pointer 1 drags while pointer 0 stays put
    step(&mut d, multi(15, Action::Move, 0, &[(0, 1.0, 0.0), (1, 340.0, 300.0)]));
    step(&mut d, multi(25, Action::PointerUp, 0, &[(0, 1.0, 0.0), (1, 350.0, 300.0)]));

    assert_eq!(d.machine(0).map(|m| m.mode()), Some(Mode::Up));
    assert_eq!(d.machine(1).map(|m| m.mode()), Some(Mode::Drag));
    let events = log.drain();
    assert!(events.contains(&GestureEvent::Tap {
        id: 0,
        at: Point::new(0.0, 0.0),
        count: 1
    }));
    assert!(events.iter().any(|e| matches!(e, GestureEvent::DragStart { id: 1, .. })));

    // confirming pointer 0 leaves pointer 1's drag alone
    d.advance_to(25 + 300);
    assert_eq!(d.pointer_count(), 1);
    assert_eq!(d.machine(1).map(|m| m.mode()), Some(Mode::Drag));
}

#[test]
fn stale_timer_never_reaches_a_reused_pointer_id() {
    let (mut d, log) = detector(GestureConfig::default());
    step(&mut d, frame(0, Action::Down, 0, 0.0, 0.0));
    step(&mut d, frame(30, Action::Up, 0, 0.0, 0.0));
    let old = d.machine(0).map(|m| m.generation()).unwrap();

    assert!(d.handle(&frame(40, Action::Cancel, 0, 0.0, 0.0)));
    assert_eq!(d.pointer_count(), 0);
    step(&mut d, frame(50, Action::Down, 0, 0.0, 0.0));
    step(&mut d, frame(60, Action::Up, 0, 0.0, 0.0));
    log.drain();

    let stale = TimerKey {
        pointer: 0,
        generation: old,
        purpose: TimerPurpose::TapConfirm,
    };
    assert!(!d.on_timer(stale));
    assert!(!d.on_timer(stale));
    assert!(log.is_empty());
    assert_eq!(d.machine(0).map(|m| m.tap_count()), Some(1));
}

#[test]
fn cancel_frame_cancels_active_drag() {
    let (mut d, log) = detector(GestureConfig::default());
    step(&mut d, frame(0, Action::Down, 0, 0.0, 0.0));
    step(&mut d, frame(10, Action::Move, 0, 50.0, 0.0));
    log.drain();
    assert!(d.handle(&frame(20, Action::Cancel, 0, 50.0, 0.0)));
    assert_eq!(
        log.drain(),
        vec![GestureEvent::DragCancel { id: 0 }, GestureEvent::Release { id: 0 }]
    );
    // nothing left to cancel
    assert!(!d.handle(&frame(30, Action::Cancel, 0, 50.0, 0.0)));
}

#[test]
fn unknown_pointer_samples_are_ignored() {
    let (mut d, log) = detector(GestureConfig::default());
    assert!(!step(&mut d, frame(0, Action::Move, 4, 1.0, 1.0)));
    assert!(!step(&mut d, frame(10, Action::Up, 4, 1.0, 1.0)));
    assert!(!d.handle(&MotionEvent::new(20, Action::Down, 3, vec![])));
    assert!(log.is_empty());
    assert_eq!(d.pointer_count(), 0);
}

#[test]
fn dropping_the_detector_releases_outstanding_listeners() {
    let (mut d, log) = detector(GestureConfig::default());
    step(&mut d, frame(0, Action::Down, 0, 0.0, 0.0));
    step(&mut d, frame(10, Action::Move, 0, 40.0, 0.0));
    log.drain();
    drop(d);
    assert_eq!(
        log.drain(),
        vec![GestureEvent::DragCancel { id: 0 }, GestureEvent::Release { id: 0 }]
    );
}

#[test]
fn timestamps_near_the_clock_limit_do_not_fire_early_timers() {
    let (mut d, log) = detector(GestureConfig::default());
    let t = u64::MAX - 10;
    assert!(step(&mut d, frame(t, Action::Down, 0, 0.0, 0.0)));
    assert_eq!(d.next_deadline(), Some(u64::MAX));

    d.advance_to(t + 5);
    assert!(
        !log.drain()
            .iter()
            .any(|e| matches!(e, GestureEvent::LongPress { .. }))
    );
    assert_eq!(d.machine(0).map(|m| m.mode()), Some(Mode::Down));

    assert!(step(&mut d, frame(t + 5, Action::Up, 0, 0.0, 0.0)));
    assert_eq!(names(&log.drain()), vec!["[0] tap x1"]);
    assert_eq!(d.next_deadline(), Some(u64::MAX));
}
