//! Recorded motion traces (one JSON motion frame per line) and their replay.

use std::io::BufRead;
use thiserror::Error;

use crate::events::{GestureEvent, GestureLog};
use crate::gestures::GestureDetector;
use crate::sample::MotionEvent;

#[derive(Debug, Error)]
pub enum TraceError {
    #[error("trace read failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("line {line}: time {time} goes backwards (previous {previous})")]
    NonMonotonic { line: usize, time: u64, previous: u64 },
}

/// Parses a trace. Blank lines and lines starting with `#` are skipped.
pub fn read_trace(reader: impl BufRead) -> Result<Vec<MotionEvent>, TraceError> {
    let mut out: Vec<MotionEvent> = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let e: MotionEvent = serde_json::from_str(trimmed).map_err(|source| TraceError::Parse {
            line: i + 1,
            source,
        })?;
        if let Some(prev) = out.last() {
            if e.time < prev.time {
                return Err(TraceError::NonMonotonic {
                    line: i + 1,
                    time: e.time,
                    previous: prev.time,
                });
            }
        }
        out.push(e);
    }
    Ok(out)
}

/// Feeds `frames` through `detector`, firing due timers before each frame and
/// draining every pending timer at the end. Returns what `log` recorded.
pub fn replay(
    detector: &mut GestureDetector,
    log: &GestureLog,
    frames: &[MotionEvent],
) -> Vec<GestureEvent> {
    for e in frames {
        detector.advance_to(e.time);
        detector.handle(e);
    }
    while let Some(deadline) = detector.next_deadline() {
        detector.advance_to(deadline);
    }
    log.drain()
}
