use anyhow::{Context, Result, anyhow};
use log::{info, warn};
use std::{
    path::PathBuf,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread,
    time::Duration,
};

use gesturectl::{GestureDetector, GestureLog, Profile, TimerQueue, input};

/// Runs the detector against a real touch device until SIGINT/SIGTERM.
pub fn run_live(profile: Profile, device: Option<PathBuf>) -> Result<()> {
    let path = match device {
        Some(p) => p,
        None => {
            let devices = input::discover_multitouch();
            let first = devices
                .first()
                .ok_or_else(|| anyhow!("no multitouch devices detected"))?;
            if devices.len() > 1 {
                warn!("{} multitouch devices found, using {}", devices.len(), first.path);
            }
            PathBuf::from(&first.path)
        }
    };
    let mut source = input::TouchSource::open(&path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    info!("reading {} ({})", source.name(), path.display());

    let term = Arc::new(AtomicBool::new(false));
    for sig in [signal_hook::consts::SIGINT, signal_hook::consts::SIGTERM] {
        signal_hook::flag::register(sig, Arc::clone(&term))?;
    }

    let log = GestureLog::new();
    let mut detector = GestureDetector::new(profile.gestures, TimerQueue::new(), log.on_down())
        .with_scale_listener(log.scale_listener());

    while !term.load(Ordering::Relaxed) {
        let frames = source.poll()?;
        let idle = frames.is_empty();
        for frame in &frames {
            detector.advance_to(frame.time);
            detector.handle(frame);
        }
        detector.advance_to(source.now_ms());
        for g in log.drain() {
            info!("{g}");
        }
        if idle {
            thread::sleep(Duration::from_millis(4));
        }
    }

    info!("stopping");
    drop(detector);
    for g in log.drain() {
        info!("{g}");
    }
    Ok(())
}
