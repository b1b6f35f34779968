//! Motion frames and per-pointer samples.

use serde::{Deserialize, Serialize};

pub type PointerId = i32;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance_square(&self, other: &Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Down,
    Move,
    Up,
    PointerDown,
    PointerUp,
    Cancel,
}

impl Action {
    pub fn is_down(self) -> bool {
        matches!(self, Action::Down | Action::PointerDown)
    }

    pub fn is_up(self) -> bool {
        matches!(self, Action::Up | Action::PointerUp)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerCoords {
    pub id: PointerId,
    pub x: f32,
    pub y: f32,
}

/// One input frame: the action, the index of the pointer it concerns and
/// the positions of every pointer currently in contact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotionEvent {
    /// Monotonic timestamp in milliseconds, same clock as timer deadlines.
    pub time: u64,
    pub action: Action,
    #[serde(default)]
    pub index: usize,
    pub pointers: Vec<PointerCoords>,
}

impl MotionEvent {
    pub fn new(time: u64, action: Action, index: usize, pointers: Vec<PointerCoords>) -> Self {
        Self {
            time,
            action,
            index,
            pointers,
        }
    }

    /// Single-pointer frame, handy for hosts that only ever see one contact.
    pub fn single(time: u64, action: Action, id: PointerId, x: f32, y: f32) -> Self {
        Self::new(time, action, 0, vec![PointerCoords { id, x, y }])
    }

    /// Id of the pointer this frame's action refers to.
    pub fn action_pointer_id(&self) -> Option<PointerId> {
        self.pointers.get(self.index).map(|p| p.id)
    }

    pub fn find(&self, id: PointerId) -> Option<&PointerCoords> {
        self.pointers.iter().find(|p| p.id == id)
    }

    /// Sample for pointer `id` as seen in this frame.
    pub fn sample_for(&self, id: PointerId) -> Option<PointerSample> {
        self.find(id).map(|p| PointerSample {
            id,
            position: Point::new(p.x, p.y),
            time: self.time,
            action: self.action,
        })
    }
}

/// Immutable observation of one pointer in one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerSample {
    pub id: PointerId,
    pub position: Point,
    pub time: u64,
    pub action: Action,
}
