//! Two-pointer pinch tracking.

use log::trace;

use crate::listener::ScaleListener;
use crate::sample::{Action, MotionEvent, Point, PointerId};

/// Positions of the (at most two) pointers taking part in a pinch, for the
/// current and the previous frame. Points are kept ordered by pointer id.
#[derive(Debug, Clone, Default)]
pub struct ScaleGesture {
    current: Vec<(PointerId, Point)>,
    previous: Vec<(PointerId, Point)>,
}

fn put(points: &mut Vec<(PointerId, Point)>, id: PointerId, p: Point) {
    match points.binary_search_by_key(&id, |(k, _)| *k) {
        Ok(i) => points[i].1 = p,
        Err(i) => points.insert(i, (id, p)),
    }
}

fn remove(points: &mut Vec<(PointerId, Point)>, id: PointerId) -> bool {
    match points.binary_search_by_key(&id, |(k, _)| *k) {
        Ok(i) => {
            points.remove(i);
            true
        }
        Err(_) => false,
    }
}

fn pair(points: &[(PointerId, Point)]) -> Option<(Point, Point)> {
    match points {
        [(_, a), (_, b)] => Some((*a, *b)),
        _ => None,
    }
}

impl ScaleGesture {
    pub fn pointer_count(&self) -> usize {
        self.current.len()
    }

    pub fn pointer(&self, index: usize) -> Option<(PointerId, Point)> {
        self.current.get(index).copied()
    }

    pub fn focus(&self) -> Point {
        focus_of(&self.current)
    }

    pub fn previous_focus(&self) -> Point {
        focus_of(&self.previous)
    }

    pub fn span(&self) -> f32 {
        span_of(&self.current, |dx, dy| (dx * dx + dy * dy).sqrt())
    }

    pub fn span_x(&self) -> f32 {
        span_of(&self.current, |dx, _| dx.abs())
    }

    pub fn span_y(&self) -> f32 {
        span_of(&self.current, |_, dy| dy.abs())
    }

    pub fn previous_span(&self) -> f32 {
        span_of(&self.previous, |dx, dy| (dx * dx + dy * dy).sqrt())
    }

    pub fn previous_span_x(&self) -> f32 {
        span_of(&self.previous, |dx, _| dx.abs())
    }

    pub fn previous_span_y(&self) -> f32 {
        span_of(&self.previous, |_, dy| dy.abs())
    }

    /// `span / previous_span`, 1.0 when either is degenerate.
    pub fn scale_factor(&self) -> f32 {
        let prev = self.previous_span();
        if prev > 0.0 && self.current.len() == 2 {
            self.span() / prev
        } else {
            1.0
        }
    }

    // Copies current positions into previous, then refreshes current from the frame.
    fn update(&mut self, e: &MotionEvent) {
        for (id, p) in &self.current {
            put(&mut self.previous, *id, *p);
        }
        for (id, p) in self.current.iter_mut() {
            if let Some(c) = e.find(*id) {
                *p = Point::new(c.x, c.y);
            }
        }
    }

    fn clear(&mut self) {
        self.current.clear();
        self.previous.clear();
    }
}

fn focus_of(points: &[(PointerId, Point)]) -> Point {
    pair(points)
        .map(|(a, b)| Point::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0))
        .unwrap_or_default()
}

fn span_of(points: &[(PointerId, Point)], f: impl Fn(f32, f32) -> f32) -> f32 {
    pair(points).map(|(a, b)| f(b.x - a.x, b.y - a.y)).unwrap_or(1.0)
}

pub struct ScaleRecognizer {
    gesture: ScaleGesture,
    listener: Box<dyn ScaleListener>,
}

impl ScaleRecognizer {
    pub fn new(listener: Box<dyn ScaleListener>) -> Self {
        Self {
            gesture: ScaleGesture::default(),
            listener,
        }
    }

    pub fn gesture(&self) -> &ScaleGesture {
        &self.gesture
    }

    pub fn is_scaling(&self) -> bool {
        self.gesture.pointer_count() == 2
    }

    /// Feeds one frame for pointer `id`. Returns true when the frame belongs to
    /// the pinch and must not reach single-pointer tracking.
    pub fn handle(&mut self, e: &MotionEvent, id: PointerId) -> bool {
        match e.action {
            Action::Down | Action::PointerDown => {
                if self.gesture.current.len() == 2 {
                    trace!("scale: extra pointer {id} ignored");
                    return true;
                }
                put(&mut self.gesture.current, id, Point::default());
                trace!("scale: pointer {id} joined ({} tracked)", self.gesture.current.len());
                self.gesture.update(e);
                if self.gesture.current.len() == 2 {
                    // second pass makes previous == current, so the first delta is zero
                    self.gesture.update(e);
                    self.listener.on_scale_begin(&self.gesture);
                    return true;
                }
                false
            }
            Action::Up | Action::PointerUp => {
                self.gesture.update(e);
                let removed = remove(&mut self.gesture.current, id);
                remove(&mut self.gesture.previous, id);
                if removed && self.gesture.current.len() == 1 {
                    trace!("scale: ended by pointer {id}");
                    self.listener.on_scale_end(&self.gesture);
                    return true;
                }
                false
            }
            Action::Move => {
                self.gesture.update(e);
                if self.gesture.current.len() == 2 {
                    self.listener.on_scale(&self.gesture);
                    return true;
                }
                false
            }
            Action::Cancel => false,
        }
    }

    /// Forgets every tracked point, ending an active pinch first.
    pub fn reset(&mut self) {
        if self.is_scaling() {
            self.listener.on_scale_end(&self.gesture);
        }
        self.gesture.clear();
    }
}
