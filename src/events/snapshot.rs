//! Per-camera event state as a polling consumer sees it.
//!
//! Successive projections are folded in: the derived fields are replaced
//! every time, while thumbnail, heatmap, `last_motion` and `last_ring`
//! keep their last known value when a projection does not carry them.

use serde::Serialize;

use super::model::EventType;
use super::projector::ProjectedEvent;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CameraEventState {
    pub event_type: Option<EventType>,
    pub event_start: Option<String>,
    pub event_length: f64,
    pub event_score: i64,
    pub event_on: bool,
    pub event_ring_on: bool,
    pub event_object: Vec<String>,
    pub event_thumbnail: Option<String>,
    pub event_heatmap: Option<String>,
    pub last_motion: Option<String>,
    pub last_ring: Option<String>,
}

impl Default for CameraEventState {
    fn default() -> Self {
        Self {
            event_type: None,
            event_start: None,
            event_length: 0.0,
            event_score: 0,
            event_on: false,
            event_ring_on: false,
            event_object: Vec::new(),
            event_thumbnail: None,
            event_heatmap: None,
            last_motion: None,
            last_ring: None,
        }
    }
}

impl CameraEventState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one projection into the camera's state.
    pub fn apply(&mut self, projected: &ProjectedEvent) {
        self.event_type.clone_from(&projected.event_type);
        self.event_start.clone_from(&projected.event_start);
        self.event_length = projected.event_length;
        self.event_score = projected.event_score;
        self.event_on = projected.event_on;
        self.event_ring_on = projected.event_ring_on;
        self.event_object.clone_from(&projected.event_object);

        keep_latest(&mut self.event_thumbnail, &projected.event_thumbnail);
        keep_latest(&mut self.event_heatmap, &projected.event_heatmap);
        keep_latest(&mut self.last_motion, &projected.last_motion);
        keep_latest(&mut self.last_ring, &projected.last_ring);
    }
}

fn keep_latest(slot: &mut Option<String>, incoming: &Option<String>) {
    if incoming.is_some() {
        slot.clone_from(incoming);
    }
}
