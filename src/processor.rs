//! Update processor: the core's single entry point for the transport.
//!
//! ```text
//!  websocket msg ──▶ PacketDecoder ──▶ EventStateMachine ──▶ Projector
//!                                                              │
//!                        (camera_id, ProjectedEvent) ◀─────────┤
//!                                                              ▼
//!                                               CameraEventState per camera
//! ```
//!
//! [`UpdateProcessor`] owns one state machine and the per-camera view for
//! a single connection.  It has no internal locking: callers with several
//! frame sources wrap it in a mutex or feed it from one channel.
//!
//! The per-camera view holds at most [`MAX_SUPPORTED_CAMERAS`] cameras.
//! Events for cameras beyond that are still projected and returned but
//! not folded into a camera state.

use std::collections::HashMap;

use log::{debug, warn};

use crate::config::{EventConfig, MAX_SUPPORTED_CAMERAS};
use crate::error::{Error, Result};
use crate::events::machine::{EventStateMachine, Ingest};
use crate::events::projector::{ProjectedEvent, Projector};
use crate::events::snapshot::CameraEventState;
use crate::ws::packet::{PacketDecoder, UpdatePacket};

/// What one websocket message produced.
#[derive(Debug, Default, PartialEq)]
pub struct MessageOutcome {
    /// Projections in arrival order, paired with their camera id.
    pub updates: Vec<(String, ProjectedEvent)>,
    /// Packets that were skipped, in arrival order.
    pub errors: Vec<Error>,
}

impl MessageOutcome {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Drives decode → ingest → project for one connection.
pub struct UpdateProcessor {
    config: EventConfig,
    projector: Projector,
    machine: EventStateMachine,
    cameras: HashMap<String, CameraEventState>,
    dropped_count: u64,
}

impl UpdateProcessor {
    /// Construct from configuration, rejecting invalid values.
    pub fn new(config: EventConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            projector: Projector::from_config(&config),
            machine: EventStateMachine::with_capacity(config.max_retained),
            cameras: HashMap::new(),
            dropped_count: 0,
            config,
        })
    }

    /// Process every packet in one websocket message.
    ///
    /// A packet that is framed correctly but cannot be applied (bad JSON,
    /// wrong model key, invalid action) is recorded in
    /// [`MessageOutcome::errors`] and the packets after it still run.  A
    /// framing error returns `Err` and abandons the rest of the message;
    /// packets before it have already been applied.
    pub fn process(&mut self, message: &[u8], now_ms: i64) -> Result<MessageOutcome> {
        let mut outcome = MessageOutcome::default();
        for packet in PacketDecoder::new(message) {
            match packet.and_then(|packet| self.handle_packet(packet, now_ms)) {
                Ok(Some(update)) => outcome.updates.push(update),
                Ok(None) => {}
                Err(e) if e.is_packet_local() => {
                    warn!("skipping packet: {e}");
                    outcome.errors.push(e);
                }
                Err(e) => return Err(e),
            }
        }
        Ok(outcome)
    }

    /// [`process`](Self::process) using the wall clock for the ring window.
    pub fn process_now(&mut self, message: &[u8]) -> Result<MessageOutcome> {
        self.process(message, unix_now_ms())
    }

    /// Apply one decoded packet.  `Ok(None)` means the event was dropped.
    pub fn handle_packet(
        &mut self,
        packet: UpdatePacket,
        now_ms: i64,
    ) -> Result<Option<(String, ProjectedEvent)>> {
        let ingest = self.machine.ingest(&packet.action, packet.data)?;

        let (camera, projected) = match ingest {
            Ingest::Merged { camera, event } => {
                debug!("Processing event: {event:?}");
                let projected = self.projector.project(event, now_ms);
                (camera, projected)
            }
            Ingest::Dropped(reason) => {
                self.dropped_count += 1;
                debug!("event dropped: {reason:?}");
                return Ok(None);
            }
        };

        if let Some(state) = self.cameras.get_mut(&camera) {
            state.apply(&projected);
        } else if self.cameras.len() < MAX_SUPPORTED_CAMERAS {
            self.cameras
                .entry(camera.clone())
                .or_default()
                .apply(&projected);
        } else {
            warn!("camera limit {MAX_SUPPORTED_CAMERAS} reached, not tracking state for {camera}");
        }

        Ok(Some((camera, projected)))
    }

    /// Latest folded state for `camera_id`, if any event has been seen.
    pub fn camera_state(&self, camera_id: &str) -> Option<&CameraEventState> {
        self.cameras.get(camera_id)
    }

    pub fn cameras(&self) -> impl Iterator<Item = (&str, &CameraEventState)> {
        self.cameras.iter().map(|(id, s)| (id.as_str(), s))
    }

    pub fn machine(&self) -> &EventStateMachine {
        &self.machine
    }

    pub fn config(&self) -> &EventConfig {
        &self.config
    }

    /// Events dropped so far (no camera, or update for an untracked id).
    pub fn dropped_count(&self) -> u64 {
        self.dropped_count
    }

    /// Forget all tracked events and camera state, e.g. after a reconnect.
    pub fn reset(&mut self) {
        if !self.machine.is_empty() {
            warn!(
                "resetting processor with {} tracked events",
                self.machine.len()
            );
        }
        self.machine.reset();
        self.cameras.clear();
    }
}

/// Current wall-clock time in epoch milliseconds.
pub fn unix_now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
