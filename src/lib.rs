//! Multi-pointer touch gesture recognition.
//!
//! [`GestureDetector`] routes motion frames to one state machine per pointer
//! (tap, double tap, long press, drag, fling) and, when configured, to a
//! two-pointer pinch recognizer that takes priority over them. Timers and
//! velocity estimation are pluggable collaborators; [`TimerQueue`] and
//! [`ImpulseVelocityTracker`] are the defaults.

pub mod config;
pub mod events;
pub mod gestures;
pub mod input;
pub mod listener;
pub mod pointer;
pub mod sample;
pub mod scale;
pub mod timer;
pub mod trace;
pub mod tracker;
pub mod velocity;

pub use config::{ConfigError, GestureConfig, Profile};
pub use events::{GestureEvent, GestureLog};
pub use gestures::GestureDetector;
pub use listener::{GestureListener, OnDown, ScaleListener};
pub use pointer::Mode;
pub use sample::{Action, MotionEvent, Point, PointerCoords, PointerId, PointerSample};
pub use scale::{ScaleGesture, ScaleRecognizer};
pub use timer::{Scheduler, TimerKey, TimerPurpose, TimerQueue};
pub use trace::TraceError;
pub use velocity::{ImpulseVelocityTracker, VelocityEstimator};
