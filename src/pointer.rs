//! Tap / long-press / drag / fling recognition for a single pointer.

use log::{debug, trace};

use crate::config::GestureConfig;
use crate::listener::GestureListener;
use crate::sample::{Action, Point, PointerId, PointerSample};
use crate::timer::{Scheduler, TimerKey, TimerPurpose};
use crate::velocity::VelocityEstimator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Released, waiting for the double-tap timeout or another tap.
    Up,
    Down,
    Drag,
    Terminal,
}

/// What a machine needs from its owner while handling a sample.
pub struct Context<'a> {
    pub config: &'a GestureConfig,
    pub scheduler: &'a mut dyn Scheduler,
}

pub struct SinglePointerMachine {
    id: PointerId,
    generation: u64,
    anchor: PointerSample,
    last_down: PointerSample,
    mode: Mode,
    count: u32,
    last_drag: Point,
    long_pressed: bool,
    velocity: Box<dyn VelocityEstimator>,
    listener: Box<dyn GestureListener>,
    released: bool,
}

impl SinglePointerMachine {
    /// Arms a machine on its first Down. The Down itself still has to be fed
    /// through [`handle`](Self::handle).
    pub fn new(
        anchor: PointerSample,
        generation: u64,
        velocity: Box<dyn VelocityEstimator>,
        listener: Box<dyn GestureListener>,
    ) -> Self {
        Self {
            id: anchor.id,
            generation,
            anchor,
            last_down: anchor,
            mode: Mode::Up,
            count: 0,
            last_drag: anchor.position,
            long_pressed: false,
            velocity,
            listener,
            released: false,
        }
    }

    pub fn id(&self) -> PointerId {
        self.id
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn tap_count(&self) -> u32 {
        self.count
    }

    pub fn is_tracking(&self) -> bool {
        self.mode != Mode::Terminal
    }

    fn key(&self, purpose: TimerPurpose) -> TimerKey {
        TimerKey {
            pointer: self.id,
            generation: self.generation,
            purpose,
        }
    }

    pub fn handle(&mut self, s: &PointerSample, cx: &mut Context<'_>) {
        if !self.is_tracking() {
            return;
        }
        if s.action.is_down() {
            self.last_down = *s;
            self.velocity.clear();
        }
        self.velocity.add_sample(s.time, s.position);

        let next = match self.mode {
            Mode::Down => self.down_sample(s, cx),
            Mode::Up => s.action.is_down().then_some(Mode::Down),
            Mode::Drag => self.drag_sample(s, cx),
            Mode::Terminal => None,
        };
        if let Some(next) = next {
            self.change_mode(next, cx);
        }
    }

    fn change_mode(&mut self, next: Mode, cx: &mut Context<'_>) {
        if next == self.mode {
            return;
        }
        trace!("pointer {}: {:?} -> {:?}", self.id, self.mode, next);
        self.mode = next;
        match next {
            Mode::Down => {
                cx.scheduler.cancel(self.key(TimerPurpose::TapConfirm));
                cx.scheduler.schedule(
                    self.key(TimerPurpose::LongPress),
                    self.last_down
                        .time
                        .saturating_add(cx.config.long_press_timeout_ms),
                );
            }
            Mode::Drag => {
                debug!(
                    "drag start - id:{}, count:{}, long_press:{}",
                    self.id, self.count, self.long_pressed
                );
                self.listener
                    .on_drag_start(&self.anchor, self.count, self.long_pressed);
                self.last_drag = self.anchor.position;
            }
            Mode::Up | Mode::Terminal => {}
        }
    }

    fn down_sample(&mut self, s: &PointerSample, cx: &mut Context<'_>) -> Option<Mode> {
        match s.action {
            Action::Move => {
                let slop = self.last_down.position.distance_square(&s.position);
                if slop > cx.config.touch_slop_square() {
                    trace!(
                        "pointer {}: slop {slop} beyond {}, tap cancelled",
                        self.id,
                        cx.config.touch_slop_square()
                    );
                    cx.scheduler.cancel(self.key(TimerPurpose::LongPress));
                    return Some(Mode::Drag);
                }
                None
            }
            Action::Up | Action::PointerUp => {
                self.count += 1;
                cx.scheduler.cancel(self.key(TimerPurpose::LongPress));
                let drift = self
                    .anchor
                    .position
                    .distance_square(&self.last_down.position);
                if self.count >= 2 && drift > cx.config.double_tap_slop_square() {
                    // too far from the anchor to continue the sequence
                    let taps = self.count - 1;
                    if self.long_pressed {
                        debug!("long tap (sequence broken) - count:{taps}, id:{}", self.id);
                        self.listener.on_long_tap(&self.anchor, taps);
                    } else {
                        debug!("tap confirmed (sequence broken) - count:{taps}, id:{}", self.id);
                        self.listener.on_tap_confirmed(&self.anchor, taps);
                    }
                    self.count = 1;
                    return Some(Mode::Terminal);
                }
                if self.long_pressed {
                    debug!("long tap - count:{}, id:{}", self.count, self.id);
                    self.listener.on_long_tap(&self.anchor, self.count);
                    return Some(Mode::Terminal);
                }
                debug!("tap - count:{}, id:{}", self.count, self.id);
                self.listener.on_tap(&self.last_down, self.count);
                cx.scheduler.schedule(
                    self.key(TimerPurpose::TapConfirm),
                    s.time.saturating_add(cx.config.double_tap_timeout_ms),
                );
                Some(Mode::Up)
            }
            _ => None,
        }
    }

    fn drag_sample(&mut self, s: &PointerSample, cx: &mut Context<'_>) -> Option<Mode> {
        match s.action {
            Action::Move => {
                let dx = self.last_drag.x - s.position.x;
                let dy = self.last_drag.y - s.position.y;
                self.listener.on_drag_move(&self.anchor, s, dx, dy);
                self.last_drag = s.position;
                None
            }
            Action::Up | Action::PointerUp => {
                let (vx, vy) = self.velocity.velocity(cx.config.max_fling_velocity);
                let v2 = vx * vx + vy * vy;
                trace!(
                    "pointer {}: velocity {}, vx:{vx}, vy:{vy}, min fling {}",
                    self.id,
                    v2.sqrt(),
                    cx.config.min_fling_velocity
                );
                // exactly at the threshold is still a drag end
                if v2 > cx.config.min_fling_velocity_square() {
                    debug!("fling - id:{}, vx:{vx}, vy:{vy}", self.id);
                    self.listener.on_fling(&self.anchor, s, vx, vy);
                } else {
                    debug!("drag end - id:{}", self.id);
                    self.listener.on_drag_end(s);
                }
                Some(Mode::Terminal)
            }
            _ => None,
        }
    }

    /// Long-press timer fired. Only meaningful while held down.
    pub fn fire_long_press(&mut self) -> bool {
        if self.mode != Mode::Down {
            return false;
        }
        debug!("long press - count:{}, id:{}", self.count, self.id);
        self.listener
            .on_long_press(&self.anchor, &self.last_down, self.count);
        self.long_pressed = true;
        true
    }

    /// Tap-confirm timer fired. Ends the sequence when released.
    pub fn fire_tap_confirm(&mut self) -> bool {
        if self.mode != Mode::Up {
            return false;
        }
        debug!("tap confirmed - count:{}, id:{}", self.count, self.id);
        self.listener.on_tap_confirmed(&self.anchor, self.count);
        self.count = 0;
        self.mode = Mode::Terminal;
        true
    }

    /// Tears the machine down: cancels an active drag, disarms both timers and
    /// releases the listener. Safe to call more than once.
    pub fn dispose(&mut self, scheduler: &mut dyn Scheduler) {
        if self.mode == Mode::Drag {
            debug!("drag cancel - id:{}", self.id);
            self.listener.on_drag_cancel(&self.anchor);
        }
        self.mode = Mode::Terminal;
        scheduler.cancel(self.key(TimerPurpose::TapConfirm));
        scheduler.cancel(self.key(TimerPurpose::LongPress));
        if !self.released {
            self.released = true;
            self.listener.on_release();
        }
        self.velocity.clear();
    }
}
