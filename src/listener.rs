//! Callback surfaces for recognised gestures.

use crate::sample::{MotionEvent, PointerId, PointerSample};
use crate::scale::ScaleGesture;

/// Per-pointer gesture callbacks. Every method defaults to a no-op.
///
/// `anchor` is always the first Down of the sequence.
#[allow(unused_variables)]
pub trait GestureListener {
    /// Taps ended, either because the double-tap timeout elapsed or because the
    /// next tap landed too far away. Tracking ends here.
    fn on_tap_confirmed(&mut self, anchor: &PointerSample, count: u32) {}

    /// A tap was released; `down` is this tap's Down. Tracking continues so a
    /// following tap can extend the sequence.
    fn on_tap(&mut self, down: &PointerSample, count: u32) {}

    /// `count` is the number of taps before the drag; `long_press` is set when
    /// the drag started after a long press.
    fn on_drag_start(&mut self, anchor: &PointerSample, count: u32, long_press: bool) {}

    /// `dx`/`dy` are `previous - current`, scroll style.
    fn on_drag_move(&mut self, anchor: &PointerSample, current: &PointerSample, dx: f32, dy: f32) {}

    /// Drag released below fling velocity. Tracking ends here.
    fn on_drag_end(&mut self, current: &PointerSample) {}

    /// Drag released at fling velocity (px/s). Tracking ends here.
    fn on_fling(&mut self, anchor: &PointerSample, current: &PointerSample, vx: f32, vy: f32) {}

    fn on_drag_cancel(&mut self, anchor: &PointerSample) {}

    /// Held past the long-press timeout. Tracking continues.
    fn on_long_press(&mut self, anchor: &PointerSample, down: &PointerSample, count: u32) {}

    /// Released after a long press; `count` includes the long tap itself.
    fn on_long_tap(&mut self, anchor: &PointerSample, count: u32) {}

    /// The machine owning this listener was torn down.
    fn on_release(&mut self) {}
}

/// Hands out a listener for each newly tracked pointer. Only the first Down of
/// a sequence reaches it.
pub trait OnDown {
    fn on_down(&mut self, event: &MotionEvent, id: PointerId) -> Box<dyn GestureListener>;
}

impl<F> OnDown for F
where
    F: FnMut(&MotionEvent, PointerId) -> Box<dyn GestureListener>,
{
    fn on_down(&mut self, event: &MotionEvent, id: PointerId) -> Box<dyn GestureListener> {
        self(event, id)
    }
}

#[allow(unused_variables)]
pub trait ScaleListener {
    fn on_scale_begin(&mut self, gesture: &ScaleGesture) {}
    fn on_scale(&mut self, gesture: &ScaleGesture) {}
    fn on_scale_end(&mut self, gesture: &ScaleGesture) {}
}
