//! Recognised gestures as plain values, plus listeners that record them.

use serde::Serialize;
use std::{cell::RefCell, fmt, rc::Rc};

use crate::listener::{GestureListener, ScaleListener};
use crate::sample::{MotionEvent, Point, PointerId, PointerSample};
use crate::scale::ScaleGesture;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "gesture", rename_all = "snake_case")]
pub enum GestureEvent {
    Down { id: PointerId, at: Point, time: u64 },
    Tap { id: PointerId, at: Point, count: u32 },
    TapConfirmed { id: PointerId, at: Point, count: u32 },
    LongPress { id: PointerId, at: Point, count: u32 },
    LongTap { id: PointerId, at: Point, count: u32 },
    DragStart { id: PointerId, at: Point, count: u32, long_press: bool },
    DragMove { id: PointerId, at: Point, dx: f32, dy: f32 },
    DragEnd { id: PointerId, at: Point },
    Fling { id: PointerId, at: Point, vx: f32, vy: f32 },
    DragCancel { id: PointerId },
    Release { id: PointerId },
    ScaleBegin { focus: Point, span: f32 },
    Scale { focus: Point, span: f32, factor: f32 },
    ScaleEnd,
}

impl fmt::Display for GestureEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GestureEvent::Down { id, at, time } => {
                write!(f, "[{id}] down ({:.1}, {:.1}) t={time}", at.x, at.y)
            }
            GestureEvent::Tap { id, count, .. } => write!(f, "[{id}] tap x{count}"),
            GestureEvent::TapConfirmed { id, count, .. } => {
                write!(f, "[{id}] tap confirmed x{count}")
            }
            GestureEvent::LongPress { id, count, .. } => write!(f, "[{id}] long press ({count})"),
            GestureEvent::LongTap { id, count, .. } => write!(f, "[{id}] long tap x{count}"),
            GestureEvent::DragStart {
                id,
                count,
                long_press,
                ..
            } => write!(f, "[{id}] drag start (taps {count}, long press {long_press})"),
            GestureEvent::DragMove { id, dx, dy, .. } => {
                write!(f, "[{id}] drag move ({dx:.1}, {dy:.1})")
            }
            GestureEvent::DragEnd { id, .. } => write!(f, "[{id}] drag end"),
            GestureEvent::Fling { id, vx, vy, .. } => {
                write!(f, "[{id}] fling ({vx:.0}, {vy:.0}) px/s")
            }
            GestureEvent::DragCancel { id } => write!(f, "[{id}] drag cancel"),
            GestureEvent::Release { id } => write!(f, "[{id}] release"),
            GestureEvent::ScaleBegin { span, .. } => write!(f, "scale begin (span {span:.1})"),
            GestureEvent::Scale { factor, .. } => write!(f, "scale x{factor:.3}"),
            GestureEvent::ScaleEnd => write!(f, "scale end"),
        }
    }
}

/// Shared, append-only record of gestures. Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct GestureLog(Rc<RefCell<Vec<GestureEvent>>>);

impl GestureLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, e: GestureEvent) {
        self.0.borrow_mut().push(e);
    }

    pub fn events(&self) -> Vec<GestureEvent> {
        self.0.borrow().clone()
    }

    /// Returns and clears everything recorded so far.
    pub fn drain(&self) -> Vec<GestureEvent> {
        std::mem::take(&mut *self.0.borrow_mut())
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    /// Listener factory for [`GestureDetector::new`](crate::GestureDetector::new):
    /// records a `Down` and hands out a [`Recorder`] per pointer.
    pub fn on_down(
        &self,
    ) -> impl FnMut(&MotionEvent, PointerId) -> Box<dyn GestureListener> + 'static {
        let log = self.clone();
        move |e: &MotionEvent, id: PointerId| -> Box<dyn GestureListener> {
            if let Some(s) = e.sample_for(id) {
                log.push(GestureEvent::Down {
                    id,
                    at: s.position,
                    time: s.time,
                });
            }
            Box::new(Recorder {
                id,
                log: log.clone(),
            })
        }
    }

    pub fn scale_listener(&self) -> ScaleRecorder {
        ScaleRecorder { log: self.clone() }
    }
}

pub struct Recorder {
    id: PointerId,
    log: GestureLog,
}

impl GestureListener for Recorder {
    fn on_tap_confirmed(&mut self, anchor: &PointerSample, count: u32) {
        self.log.push(GestureEvent::TapConfirmed {
            id: self.id,
            at: anchor.position,
            count,
        });
    }

    fn on_tap(&mut self, down: &PointerSample, count: u32) {
        self.log.push(GestureEvent::Tap {
            id: self.id,
            at: down.position,
            count,
        });
    }

    fn on_drag_start(&mut self, anchor: &PointerSample, count: u32, long_press: bool) {
        self.log.push(GestureEvent::DragStart {
            id: self.id,
            at: anchor.position,
            count,
            long_press,
        });
    }

    fn on_drag_move(&mut self, _anchor: &PointerSample, current: &PointerSample, dx: f32, dy: f32) {
        self.log.push(GestureEvent::DragMove {
            id: self.id,
            at: current.position,
            dx,
            dy,
        });
    }

    fn on_drag_end(&mut self, current: &PointerSample) {
        self.log.push(GestureEvent::DragEnd {
            id: self.id,
            at: current.position,
        });
    }

    fn on_fling(&mut self, _anchor: &PointerSample, current: &PointerSample, vx: f32, vy: f32) {
        self.log.push(GestureEvent::Fling {
            id: self.id,
            at: current.position,
            vx,
            vy,
        });
    }

    fn on_drag_cancel(&mut self, _anchor: &PointerSample) {
        self.log.push(GestureEvent::DragCancel { id: self.id });
    }

    fn on_long_press(&mut self, anchor: &PointerSample, _down: &PointerSample, count: u32) {
        self.log.push(GestureEvent::LongPress {
            id: self.id,
            at: anchor.position,
            count,
        });
    }

    fn on_long_tap(&mut self, anchor: &PointerSample, count: u32) {
        self.log.push(GestureEvent::LongTap {
            id: self.id,
            at: anchor.position,
            count,
        });
    }

    fn on_release(&mut self) {
        self.log.push(GestureEvent::Release { id: self.id });
    }
}

pub struct ScaleRecorder {
    log: GestureLog,
}

impl ScaleListener for ScaleRecorder {
    fn on_scale_begin(&mut self, g: &ScaleGesture) {
        self.log.push(GestureEvent::ScaleBegin {
            focus: g.focus(),
            span: g.span(),
        });
    }

    fn on_scale(&mut self, g: &ScaleGesture) {
        self.log.push(GestureEvent::Scale {
            focus: g.focus(),
            span: g.span(),
            factor: g.scale_factor(),
        });
    }

    fn on_scale_end(&mut self, _g: &ScaleGesture) {
        self.log.push(GestureEvent::ScaleEnd);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_gesture_tag() {
        let e = GestureEvent::Tap {
            id: 2,
            at: Point::new(1.0, 2.0),
            count: 3,
        };
        let v = serde_json::to_value(&e).unwrap();
        assert_eq!(v["gesture"], "tap");
        assert_eq!(v["count"], 3);
        assert_eq!(e.to_string(), "[2] tap x3");
    }

    #[test]
    fn clones_share_one_buffer() {
        let log = GestureLog::new();
        let other = log.clone();
        other.push(GestureEvent::ScaleEnd);
        assert_eq!(log.len(), 1);
        assert_eq!(log.drain(), vec![GestureEvent::ScaleEnd]);
        assert!(other.is_empty());
    }
}
