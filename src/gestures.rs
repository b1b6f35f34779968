//! Routes motion frames to per-pointer machines and the pinch recognizer.

use log::{debug, trace};
use std::collections::BTreeMap;

use crate::config::GestureConfig;
use crate::listener::{OnDown, ScaleListener};
use crate::pointer::{Context, SinglePointerMachine};
use crate::sample::{Action, MotionEvent, PointerId};
use crate::scale::ScaleRecognizer;
use crate::timer::{Scheduler, TimerKey, TimerPurpose, TimerQueue};
use crate::velocity::{ImpulseVelocityTracker, VelocityEstimator};

pub type EstimatorFactory = Box<dyn FnMut() -> Box<dyn VelocityEstimator>>;

pub struct GestureDetector<S: Scheduler = TimerQueue> {
    config: GestureConfig,
    scheduler: S,
    on_down: Box<dyn OnDown>,
    scale: Option<ScaleRecognizer>,
    machines: BTreeMap<PointerId, SinglePointerMachine>,
    estimator: EstimatorFactory,
    next_generation: u64,
}

impl<S: Scheduler> GestureDetector<S> {
    pub fn new(config: GestureConfig, scheduler: S, on_down: impl OnDown + 'static) -> Self {
        debug!(
            "touch slop:{}, double tap slop:{}, tap timeout:{}, double tap timeout:{}",
            config.touch_slop,
            config.double_tap_slop,
            config.tap_timeout_ms,
            config.double_tap_timeout_ms
        );
        Self {
            config,
            scheduler,
            on_down: Box::new(on_down),
            scale: None,
            machines: BTreeMap::new(),
            estimator: Box::new(|| -> Box<dyn VelocityEstimator> {
                Box::new(ImpulseVelocityTracker::new())
            }),
            next_generation: 1,
        }
    }

    pub fn with_scale_listener(mut self, listener: impl ScaleListener + 'static) -> Self {
        self.scale = Some(ScaleRecognizer::new(Box::new(listener)));
        self
    }

    pub fn with_velocity_estimator(
        mut self,
        factory: impl FnMut() -> Box<dyn VelocityEstimator> + 'static,
    ) -> Self {
        self.estimator = Box::new(factory);
        self
    }

    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    pub fn scale(&self) -> Option<&ScaleRecognizer> {
        self.scale.as_ref()
    }

    /// Number of pointers with a live single-pointer machine.
    pub fn pointer_count(&self) -> usize {
        self.machines.len()
    }

    pub fn machine(&self, id: PointerId) -> Option<&SinglePointerMachine> {
        self.machines.get(&id)
    }

    /// Feeds one frame. Returns whether any recognizer consumed it.
    pub fn handle(&mut self, e: &MotionEvent) -> bool {
        if e.action == Action::Cancel {
            return self.cancel_frame();
        }
        let Some(id) = e.action_pointer_id() else {
            trace!("frame without action pointer (index {}) ignored", e.index);
            return false;
        };

        if let Some(scale) = self.scale.as_mut() {
            if scale.handle(e, id) {
                self.cancel_all();
                return true;
            }
        }

        if e.action.is_down() && !self.machines.contains_key(&id) {
            if self.machines.len() < self.config.max_pointers {
                if let Some(anchor) = e.sample_for(id) {
                    debug!("down - id:{id}");
                    let listener = self.on_down.on_down(e, id);
                    let generation = self.next_generation;
                    self.next_generation += 1;
                    let machine =
                        SinglePointerMachine::new(anchor, generation, (self.estimator)(), listener);
                    self.machines.insert(id, machine);
                }
            } else {
                debug!(
                    "pointer {id} dropped: {} tracked, max {}",
                    self.machines.len(),
                    self.config.max_pointers
                );
            }
        }

        if e.action == Action::Move {
            // every tracked pointer present in the frame gets its own move
            let ids: Vec<PointerId> = e
                .pointers
                .iter()
                .map(|p| p.id)
                .filter(|p| self.machines.contains_key(p))
                .collect();
            for pid in &ids {
                self.forward(e, *pid);
            }
            return !ids.is_empty();
        }

        self.forward(e, id)
    }

    fn forward(&mut self, e: &MotionEvent, id: PointerId) -> bool {
        let (Some(machine), Some(sample)) = (self.machines.get_mut(&id), e.sample_for(id)) else {
            return false;
        };
        let mut cx = Context {
            config: &self.config,
            scheduler: &mut self.scheduler,
        };
        machine.handle(&sample, &mut cx);
        if !machine.is_tracking() {
            self.remove(id);
        }
        true
    }

    /// Delivers a fired timer. Stale keys (machine gone or replaced) are ignored.
    pub fn on_timer(&mut self, key: TimerKey) -> bool {
        let Some(machine) = self
            .machines
            .get_mut(&key.pointer)
            .filter(|m| m.generation() == key.generation)
        else {
            trace!("stale timer {key:?}");
            return false;
        };
        match key.purpose {
            TimerPurpose::LongPress => machine.fire_long_press(),
            TimerPurpose::TapConfirm => {
                let fired = machine.fire_tap_confirm();
                if fired {
                    self.remove(key.pointer);
                }
                fired
            }
        }
    }

    /// Force-cancels every single-pointer machine.
    pub fn cancel_all(&mut self) {
        if self.machines.is_empty() {
            return;
        }
        trace!("cancelling {} pointer(s)", self.machines.len());
        for (_, mut machine) in std::mem::take(&mut self.machines) {
            machine.dispose(&mut self.scheduler);
        }
    }

    fn cancel_frame(&mut self) -> bool {
        let active = !self.machines.is_empty()
            || self.scale.as_ref().is_some_and(|s| s.gesture().pointer_count() > 0);
        if let Some(scale) = self.scale.as_mut() {
            scale.reset();
        }
        self.cancel_all();
        active
    }

    fn remove(&mut self, id: PointerId) {
        if let Some(mut machine) = self.machines.remove(&id) {
            trace!("remove pointer {id}");
            machine.dispose(&mut self.scheduler);
        }
    }
}

impl GestureDetector<TimerQueue> {
    /// Fires every timer due at or before `now`, in deadline order.
    pub fn advance_to(&mut self, now: u64) {
        while let Some(key) = self.scheduler.pop_due(now) {
            self.on_timer(key);
        }
    }

    pub fn next_deadline(&self) -> Option<u64> {
        self.scheduler.next_deadline()
    }
}

impl<S: Scheduler> Drop for GestureDetector<S> {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
