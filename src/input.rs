//! Multitouch device discovery and frame source (evdev 0.13).

use evdev::{AbsoluteAxisCode, Device, EventType, SynchronizationCode};
use std::{io, path::Path, time::Instant};

use crate::sample::MotionEvent;
use crate::tracker::Tracker;

#[derive(Debug, Clone)]
pub struct DeviceInfo {
    pub path: String,
    pub name: String,
}

fn is_multitouch(dev: &Device) -> bool {
    let has_abs = dev.supported_events().contains(EventType::ABSOLUTE);
    let has_mt = dev.supported_absolute_axes().is_some_and(|a| {
        a.contains(AbsoluteAxisCode::ABS_MT_SLOT)
            && a.contains(AbsoluteAxisCode::ABS_MT_POSITION_X)
            && a.contains(AbsoluteAxisCode::ABS_MT_POSITION_Y)
    });
    has_abs && has_mt
}

pub fn discover_multitouch() -> Vec<DeviceInfo> {
    let mut out = vec![];
    let Ok(rd) = std::fs::read_dir("/dev/input") else {
        return out;
    };
    for e in rd.flatten() {
        let p = e.path();
        let is_event_node = p
            .file_name()
            .and_then(|s| s.to_str())
            .is_some_and(|s| s.starts_with("event"));
        if !is_event_node {
            continue;
        }
        if let Ok(dev) = Device::open(&p) {
            if is_multitouch(&dev) {
                out.push(DeviceInfo {
                    path: p.display().to_string(),
                    name: dev.name().unwrap_or("unknown").to_string(),
                });
            }
        }
    }
    out.sort_by(|a, b| a.path.cmp(&b.path));
    out
}

/// Non-blocking multitouch device turned into motion frames timestamped in
/// milliseconds since the source was opened.
pub struct TouchSource {
    dev: Device,
    tracker: Tracker,
    started: Instant,
}

impl TouchSource {
    pub fn open(path: &Path) -> io::Result<Self> {
        let dev = Device::open(path)?;
        if !is_multitouch(&dev) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is not a multitouch device", path.display()),
            ));
        }
        dev.set_nonblocking(true)?;
        Ok(Self {
            dev,
            tracker: Tracker::new(),
            started: Instant::now(),
        })
    }

    pub fn name(&self) -> &str {
        self.dev.name().unwrap_or("unknown")
    }

    pub fn now_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }

    /// Drains pending kernel events. An empty result means nothing was ready.
    pub fn poll(&mut self) -> io::Result<Vec<MotionEvent>> {
        let now = self.now_ms();
        let mut frames = Vec::new();
        let events = match self.dev.fetch_events() {
            Ok(events) => events,
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => return Ok(frames),
            Err(e) => return Err(e),
        };
        for ev in events {
            if ev.event_type() == EventType::ABSOLUTE {
                match ev.code() {
                    c if c == AbsoluteAxisCode::ABS_MT_SLOT.0 => self.tracker.on_slot(ev.value()),
                    c if c == AbsoluteAxisCode::ABS_MT_TRACKING_ID.0 => {
                        self.tracker.on_tracking_id(ev.value())
                    }
                    c if c == AbsoluteAxisCode::ABS_MT_POSITION_X.0 => {
                        self.tracker.on_pos_x(ev.value())
                    }
                    c if c == AbsoluteAxisCode::ABS_MT_POSITION_Y.0 => {
                        self.tracker.on_pos_y(ev.value())
                    }
                    _ => {}
                }
            } else if ev.event_type() == EventType::SYNCHRONIZATION
                && ev.code() == SynchronizationCode::SYN_REPORT.0
            {
                frames.extend(self.tracker.on_syn_report(now));
            }
        }
        Ok(frames)
    }
}
