//! Event state machine.
//!
//! Folds the NVR's fragmented `add`/`update` actions into one tracked
//! record per event id:
//!
//! ```text
//!   add    ──▶ camera? ──no──▶ Dropped(NoCamera)
//!                │ yes
//!                ▼
//!            insert (evict oldest if full) ──▶ Merged
//!
//!   update ──▶ tracked? ──no──▶ Dropped(UnknownEvent)
//!                │ yes
//!                ▼
//!            shallow merge in place ──▶ Merged
//! ```
//!
//! One instance per logical connection.  The machine has no internal
//! locking; callers feeding it from several sources must serialise access.

use log::{debug, warn};

use super::model::{Action, ActionEnvelope, EventBody, TrackedEvent};
use super::store::RetentionStore;
use crate::config::MAX_RETAINED;
use crate::error::EventError;

/// Only envelopes for this model key are processed.
pub const EVENT_MODEL_KEY: &str = "event";

/// Why a structurally valid action produced no event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// The event is not associated with a camera.
    NoCamera,
    /// Update for an id that was evicted or never added.
    UnknownEvent,
}

/// Outcome of [`EventStateMachine::ingest`].
#[derive(Debug, PartialEq)]
pub enum Ingest<'a> {
    Merged {
        camera: String,
        event: &'a TrackedEvent,
    },
    Dropped(DropReason),
}

impl Ingest<'_> {
    pub fn is_dropped(&self) -> bool {
        matches!(self, Self::Dropped(_))
    }
}

/// Tracks in-flight events keyed by id.
#[derive(Debug, Clone)]
pub struct EventStateMachine {
    events: RetentionStore<TrackedEvent>,
}

impl Default for EventStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl EventStateMachine {
    /// Machine bounded at [`MAX_RETAINED`] events.
    pub fn new() -> Self {
        Self::with_capacity(MAX_RETAINED)
    }

    pub fn with_capacity(max_retained: usize) -> Self {
        Self {
            events: RetentionStore::with_capacity(max_retained),
        }
    }

    /// Apply one action envelope and its data body.
    ///
    /// The action is taken from the envelope, falling back to the body.
    /// The event id is taken the same way.
    pub fn ingest(
        &mut self,
        envelope: &ActionEnvelope,
        mut body: EventBody,
    ) -> Result<Ingest<'_>, EventError> {
        let model_key = envelope.model_key.as_deref().unwrap_or_default();
        if model_key != EVENT_MODEL_KEY {
            return Err(EventError::UnsupportedModel(model_key.to_owned()));
        }

        let body_action = core::mem::take(&mut body.action).into_option();
        let action = match envelope.action.as_deref() {
            Some(a) => Action::parse(a)?,
            None => Action::parse(body_action.as_deref().unwrap_or_default())?,
        };

        let id = envelope
            .id
            .clone()
            .or_else(|| body.id.as_value().cloned())
            .ok_or(EventError::MissingId)?;

        match action {
            Action::Add => Ok(self.add(id, body)),
            Action::Update => Ok(self.update(&id, body)),
        }
    }

    /// Track a new event.  Events without a camera are dropped.
    pub fn add(&mut self, id: String, body: EventBody) -> Ingest<'_> {
        let Some(camera) = body.camera.as_value().cloned() else {
            debug!("dropping add for {id}: no camera");
            return Ingest::Dropped(DropReason::NoCamera);
        };

        let event = TrackedEvent::from_body(id.clone(), body);
        let (event, evicted) = self.events.insert(id, event);
        if let Some(evicted) = evicted {
            debug!("event store full, evicted {evicted}");
        }

        debug!("tracking event {}", event.id);
        Ingest::Merged {
            camera,
            event: &*event,
        }
    }

    /// Merge an update into a tracked event.  Unknown ids are dropped and
    /// nothing is inserted.
    pub fn update(&mut self, id: &str, body: EventBody) -> Ingest<'_> {
        let Some(event) = self.events.get_mut(id) else {
            warn!("dropping update for untracked event {id}");
            return Ingest::Dropped(DropReason::UnknownEvent);
        };

        event.merge(body);
        debug!("merged update into {id}");

        match event.camera.clone() {
            Some(camera) => Ingest::Merged {
                camera,
                event: &*event,
            },
            None => Ingest::Dropped(DropReason::NoCamera),
        }
    }

    pub fn get(&self, id: &str) -> Option<&TrackedEvent> {
        self.events.get(id)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.events.capacity()
    }

    /// Tracked ids, oldest first.
    pub fn event_ids(&self) -> impl Iterator<Item = &str> {
        self.events.keys()
    }

    /// Forget every tracked event (e.g. after a reconnect).
    pub fn reset(&mut self) {
        self.events.clear();
    }
}
