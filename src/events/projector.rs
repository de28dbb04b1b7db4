//! Event projection: tracked record → user-facing snapshot.
//!
//! ```text
//!  motion / smartDetectZone          ring
//!  ────────────────────────          ────
//!  ended → event_on = false          open  → event_ring_on = true
//!          (objects if smart)        ended → on iff start and end fall
//!  open  → event_on = score >= min           inside [now - window, ..)
//!          (objects if on && smart)
//! ```
//!
//! Pure: the same event, threshold and `now_ms` always yield the same
//! projection.  The projector knows no history; carrying thumbnails and
//! heatmaps across projections is the job of
//! [`CameraEventState`](super::snapshot::CameraEventState).

use chrono::{DateTime, FixedOffset, Offset, Utc};
use log::debug;
use serde::Serialize;

use super::model::{EventType, TrackedEvent};
use crate::config::{DEFAULT_RING_WINDOW_MS, EventConfig};

/// Format used for `event_start`, `last_motion` and `last_ring`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Read-only snapshot derived from one [`TrackedEvent`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectedEvent {
    pub event_type: Option<EventType>,
    pub event_start: Option<String>,
    /// Seconds; 0 while the event is open.
    pub event_length: f64,
    pub event_score: i64,
    pub event_on: bool,
    pub event_ring_on: bool,
    pub event_object: Vec<String>,
    /// Only set when the source event carries one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_thumbnail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_heatmap: Option<String>,
    /// Set for motion and smart-detect events.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_motion: Option<String>,
    /// Set for ring events.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_ring: Option<String>,
}

/// Projection parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Projector {
    minimum_score: i64,
    ring_window_ms: i64,
    offset: FixedOffset,
}

impl Projector {
    /// UTC timestamps and the default 3 s ring window.
    pub fn new(minimum_score: i64) -> Self {
        Self {
            minimum_score,
            ring_window_ms: DEFAULT_RING_WINDOW_MS,
            offset: utc(),
        }
    }

    pub fn from_config(config: &EventConfig) -> Self {
        Self {
            minimum_score: config.minimum_score,
            ring_window_ms: config.ring_window_ms,
            offset: FixedOffset::east_opt(config.utc_offset_secs).unwrap_or_else(utc),
        }
    }

    #[must_use]
    pub fn with_ring_window(mut self, ring_window_ms: i64) -> Self {
        self.ring_window_ms = ring_window_ms;
        self
    }

    #[must_use]
    pub fn with_offset(mut self, offset: FixedOffset) -> Self {
        self.offset = offset;
        self
    }

    pub fn minimum_score(&self) -> i64 {
        self.minimum_score
    }

    /// Derive the snapshot for `event` as of `now_ms` (epoch milliseconds).
    pub fn project(&self, event: &TrackedEvent, now_ms: i64) -> ProjectedEvent {
        let start_time = event
            .start
            .and_then(|ms| format_timestamp(ms, self.offset));

        let event_length = match (event.start, event.end) {
            (Some(start), Some(end)) => (end as f64 - start as f64) / 1000.0,
            _ => 0.0,
        };

        let mut out = ProjectedEvent {
            event_type: event.event_type.clone(),
            event_start: start_time.clone(),
            event_length,
            event_score: event.score.unwrap_or(0),
            event_on: false,
            event_ring_on: false,
            event_object: Vec::new(),
            event_thumbnail: event.thumbnail.clone(),
            event_heatmap: event.heatmap.clone(),
            last_motion: None,
            last_ring: None,
        };

        match &event.event_type {
            Some(kind) if kind.is_motion() => {
                out.last_motion = start_time;
                let smart = *kind == EventType::SmartDetectZone;

                if event.is_open() {
                    out.event_on = event.score.is_some_and(|s| s >= self.minimum_score);
                    if out.event_on && smart {
                        out.event_object = detected_objects(event);
                    }
                } else if smart {
                    out.event_object = detected_objects(event);
                }
            }
            Some(EventType::Ring) => {
                out.last_ring = start_time;
                out.event_ring_on = self.ring_is_on(event, now_ms);
            }
            _ => {}
        }

        out
    }

    fn ring_is_on(&self, event: &TrackedEvent, now_ms: i64) -> bool {
        let Some(end) = event.end else {
            debug!("EVENT: DOORBELL IS RINGING");
            return true;
        };

        let window_start = now_ms.saturating_sub(self.ring_window_ms);
        let on = event.start.is_some_and(|start| start >= window_start) && end >= window_start;
        if on {
            debug!(
                "EVENT: DOORBELL HAS RUNG IN LAST {} MS",
                self.ring_window_ms
            );
        } else {
            debug!(
                "EVENT: DOORBELL WAS NOT RUNG IN LAST {} MS",
                self.ring_window_ms
            );
        }
        on
    }
}

/// Project with the default ring window and UTC timestamps.
pub fn project(event: &TrackedEvent, minimum_score: i64, now_ms: i64) -> ProjectedEvent {
    Projector::new(minimum_score).project(event, now_ms)
}

/// Format epoch milliseconds as local time at `offset`.
pub fn format_timestamp(epoch_ms: i64, offset: FixedOffset) -> Option<String> {
    let utc = DateTime::from_timestamp_millis(epoch_ms)?;
    Some(
        utc.with_timezone(&offset)
            .format(TIMESTAMP_FORMAT)
            .to_string(),
    )
}

fn detected_objects(event: &TrackedEvent) -> Vec<String> {
    event.smart_detect_types.clone().unwrap_or_default()
}

fn utc() -> FixedOffset {
    Utc.fix()
}
