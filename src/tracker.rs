//! Multitouch slot tracking: turns MT protocol B updates into motion frames.

use crate::sample::{Action, MotionEvent, PointerCoords, PointerId};

const SLOTS: usize = 10;

#[derive(Debug, Clone, Default)]
struct SlotState {
    tracking_id: i32, // -1 = inactive
    x: f32,
    y: f32,
    active: bool,
    // state as of the last emitted frame
    reported: bool,
    reported_tracking_id: i32,
    reported_x: f32,
    reported_y: f32,
}

#[derive(Debug)]
pub struct Tracker {
    slots: Vec<SlotState>,
    cur_slot: usize,
}

impl Default for Tracker {
    fn default() -> Self {
        Self::new()
    }
}

impl Tracker {
    pub fn new() -> Self {
        Self {
            slots: vec![
                SlotState {
                    tracking_id: -1,
                    reported_tracking_id: -1,
                    ..SlotState::default()
                };
                SLOTS
            ],
            cur_slot: 0,
        }
    }

    pub fn on_slot(&mut self, slot: i32) {
        self.cur_slot = slot.clamp(0, SLOTS as i32 - 1) as usize;
    }

    pub fn on_tracking_id(&mut self, tracking_id: i32) {
        let s = &mut self.slots[self.cur_slot];
        if tracking_id < 0 {
            s.tracking_id = -1;
            s.active = false;
        } else {
            s.tracking_id = tracking_id;
            s.active = true;
        }
    }

    pub fn on_pos_x(&mut self, raw: i32) {
        self.slots[self.cur_slot].x = raw as f32;
    }

    pub fn on_pos_y(&mut self, raw: i32) {
        self.slots[self.cur_slot].y = raw as f32;
    }

    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|s| s.active).count()
    }

    fn coords(&self, pred: impl Fn(&SlotState) -> bool, current: bool) -> Vec<PointerCoords> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, s)| pred(s))
            .map(|(i, s)| PointerCoords {
                id: i as PointerId,
                x: if current { s.x } else { s.reported_x },
                y: if current { s.y } else { s.reported_y },
            })
            .collect()
    }

    /// Closes a report: emits pointer-down frames for new contacts, one move
    /// frame if anything moved, then pointer-up frames for lifted contacts.
    /// A slot that was lifted and touched again within one report comes out
    /// as an up followed by a down.
    pub fn on_syn_report(&mut self, time: u64) -> Vec<MotionEvent> {
        let mut out = Vec::new();

        let retouched: Vec<usize> = (0..SLOTS)
            .filter(|&i| {
                let s = &self.slots[i];
                s.active && s.reported && s.tracking_id != s.reported_tracking_id
            })
            .collect();
        for slot in retouched {
            out.push(self.lift(time, slot));
        }

        let arrived: Vec<usize> = (0..SLOTS)
            .filter(|&i| self.slots[i].active && !self.slots[i].reported)
            .collect();
        for slot in arrived {
            let down_before = self.slots.iter().filter(|s| s.reported).count();
            self.slots[slot].reported = true;
            let pointers = self.coords(|s| s.reported, true);
            let index = pointers
                .iter()
                .position(|p| p.id == slot as PointerId)
                .unwrap_or(0);
            let action = if down_before == 0 {
                Action::Down
            } else {
                Action::PointerDown
            };
            out.push(MotionEvent::new(time, action, index, pointers));
            let s = &mut self.slots[slot];
            s.reported_tracking_id = s.tracking_id;
            s.reported_x = s.x;
            s.reported_y = s.y;
        }

        let moved = self.slots.iter().any(|s| {
            s.active && s.reported && (s.x != s.reported_x || s.y != s.reported_y)
        });
        if moved {
            let pointers = self.coords(|s| s.reported, true);
            out.push(MotionEvent::new(time, Action::Move, 0, pointers));
            for s in self.slots.iter_mut().filter(|s| s.active && s.reported) {
                s.reported_x = s.x;
                s.reported_y = s.y;
            }
        }

        let lifted: Vec<usize> = (0..SLOTS)
            .filter(|&i| !self.slots[i].active && self.slots[i].reported)
            .collect();
        for slot in lifted {
            out.push(self.lift(time, slot));
        }

        out
    }

    fn lift(&mut self, time: u64, slot: usize) -> MotionEvent {
        let pointers = self.coords(|s| s.reported, false);
        let index = pointers
            .iter()
            .position(|p| p.id == slot as PointerId)
            .unwrap_or(0);
        let action = if pointers.len() == 1 {
            Action::Up
        } else {
            Action::PointerUp
        };
        let s = &mut self.slots[slot];
        s.reported = false;
        s.reported_tracking_id = -1;
        MotionEvent::new(time, action, index, pointers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(t: &mut Tracker, slot: i32, id: i32, x: i32, y: i32) {
        t.on_slot(slot);
        t.on_tracking_id(id);
        t.on_pos_x(x);
        t.on_pos_y(y);
    }

    #[test]
    fn single_contact_lifecycle() {
        let mut t = Tracker::new();
        touch(&mut t, 0, 40, 100, 200);
        let frames = t.on_syn_report(0);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].action, Action::Down);
        assert_eq!(frames[0].action_pointer_id(), Some(0));

        t.on_pos_x(110);
        let frames = t.on_syn_report(8);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].action, Action::Move);
        assert_eq!(frames[0].pointers[0].x, 110.0);

        // no change, no frame
        assert!(t.on_syn_report(16).is_empty());

        t.on_tracking_id(-1);
        let frames = t.on_syn_report(24);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].action, Action::Up);
        assert_eq!(frames[0].pointers[0].x, 110.0);
        assert_eq!(t.active_count(), 0);
    }

    #[test]
    fn second_contact_is_pointer_down() {
        let mut t = Tracker::new();
        touch(&mut t, 0, 1, 0, 0);
        t.on_syn_report(0);
        touch(&mut t, 1, 2, 50, 50);
        let frames = t.on_syn_report(5);
        assert_eq!(frames[0].action, Action::PointerDown);
        assert_eq!(frames[0].action_pointer_id(), Some(1));
        assert_eq!(frames[0].pointers.len(), 2);

        t.on_slot(0);
        t.on_tracking_id(-1);
        let frames = t.on_syn_report(10);
        assert_eq!(frames[0].action, Action::PointerUp);
        assert_eq!(frames[0].action_pointer_id(), Some(0));
        assert_eq!(frames[0].pointers.len(), 2);
        assert_eq!(t.active_count(), 1);
    }

    #[test]
    fn retouch_within_one_report_is_up_then_down() {
        let mut t = Tracker::new();
        touch(&mut t, 0, 5, 0, 0);
        t.on_syn_report(0);

        t.on_tracking_id(-1);
        touch(&mut t, 0, 6, 300, 300);
        let frames = t.on_syn_report(8);
        let actions: Vec<Action> = frames.iter().map(|f| f.action).collect();
        assert_eq!(actions, vec![Action::Up, Action::Down]);
        assert_eq!(frames[0].pointers[0].x, 0.0);
        assert_eq!(frames[1].pointers[0].x, 300.0);
        assert!(t.on_syn_report(16).is_empty());
    }
}
