//! Typed event records.
//!
//! The NVR sends events as open-ended JSON objects and later patches them
//! with partial objects.  Here the known fields are named and typed; each
//! field of an incoming body is a [`Field`] so a patch can tell "key
//! absent" (keep the old value) apart from "key present as null" (clear
//! it).  Fields this crate does not interpret are kept verbatim in `extra`.

use serde::de::{Deserialize, Deserializer};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::EventError;

// ---------------------------------------------------------------------------
// Event type
// ---------------------------------------------------------------------------

/// Kind of camera event.  Unrecognised kinds are carried through as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventType {
    Motion,
    SmartDetectZone,
    Ring,
    Other(String),
}

impl EventType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Motion => "motion",
            Self::SmartDetectZone => "smartDetectZone",
            Self::Ring => "ring",
            Self::Other(s) => s,
        }
    }

    /// Motion and smart-detect events drive `event_on`.
    pub fn is_motion(&self) -> bool {
        matches!(self, Self::Motion | Self::SmartDetectZone)
    }
}

impl From<&str> for EventType {
    fn from(s: &str) -> Self {
        match s {
            "motion" => Self::Motion,
            "smartDetectZone" => Self::SmartDetectZone,
            "ring" => Self::Ring,
            other => Self::Other(other.to_owned()),
        }
    }
}

impl<'de> Deserialize<'de> for EventType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from(s.as_str()))
    }
}

impl Serialize for EventType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Patch field
// ---------------------------------------------------------------------------

/// One field of an incoming event body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field<T> {
    /// Key not present in the JSON object.
    Absent,
    /// Key present with a `null` value.
    Null,
    Value(T),
}

impl<T> Default for Field<T> {
    fn default() -> Self {
        Self::Absent
    }
}

impl<T> Field<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    pub fn as_value(&self) -> Option<&T> {
        match self {
            Self::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Value(v) => Some(v),
            _ => None,
        }
    }

    /// Shallow override: absent keeps `slot`, null clears it, a value replaces it.
    pub fn merge_into(self, slot: &mut Option<T>) {
        match self {
            Self::Absent => {}
            Self::Null => *slot = None,
            Self::Value(v) => *slot = Some(v),
        }
    }
}

impl<T> From<Option<T>> for Field<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Self::Value)
    }
}

// Only reached when the key is present; `#[serde(default)]` yields `Absent`.
impl<'de, T: Deserialize<'de>> Deserialize<'de> for Field<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<T>::deserialize(deserializer).map(Self::from)
    }
}

// ---------------------------------------------------------------------------
// Wire bodies
// ---------------------------------------------------------------------------

/// The action envelope frame: `{modelKey, action, id, newUpdateId}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ActionEnvelope {
    pub model_key: Option<String>,
    pub action: Option<String>,
    pub id: Option<String>,
    pub new_update_id: Option<String>,
}

/// What an envelope asks the state machine to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Add,
    Update,
}

impl Action {
    pub fn parse(raw: &str) -> Result<Self, EventError> {
        match raw {
            "add" => Ok(Self::Add),
            "update" => Ok(Self::Update),
            other => Err(EventError::InvalidAction(other.to_owned())),
        }
    }
}

/// The data frame following an envelope: a full event for `add`, a
/// partial one for `update`.
#[derive(Debug, Clone, Default, PartialEq, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EventBody {
    pub id: Field<String>,
    /// Some firmware revisions put the action here instead of the envelope.
    pub action: Field<String>,
    #[serde(rename = "type")]
    pub event_type: Field<EventType>,
    pub camera: Field<String>,
    pub start: Field<i64>,
    pub end: Field<i64>,
    pub score: Field<i64>,
    pub smart_detect_types: Field<Vec<String>>,
    pub thumbnail: Field<String>,
    pub heatmap: Field<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EventBody {
    /// Parse a body from a JSON value.
    pub fn from_value(value: Value) -> serde_json::Result<Self> {
        serde_json::from_value(value)
    }
}

// ---------------------------------------------------------------------------
// Tracked event
// ---------------------------------------------------------------------------

/// The state machine's retained, merged copy of one event.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: Option<EventType>,
    pub camera: Option<String>,
    pub start: Option<i64>,
    pub end: Option<i64>,
    pub score: Option<i64>,
    pub smart_detect_types: Option<Vec<String>>,
    pub thumbnail: Option<String>,
    pub heatmap: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TrackedEvent {
    /// Build the tracked copy from an `add` body.
    pub fn from_body(id: String, body: EventBody) -> Self {
        let mut event = Self {
            id,
            ..Self::default()
        };
        event.merge(body);
        event
    }

    /// Shallow field-merge of an `update` body over this event.
    ///
    /// The body's `id` and `action` are protocol plumbing and never
    /// overwrite the record.
    pub fn merge(&mut self, body: EventBody) {
        body.event_type.merge_into(&mut self.event_type);
        body.camera.merge_into(&mut self.camera);
        body.start.merge_into(&mut self.start);
        body.end.merge_into(&mut self.end);
        body.score.merge_into(&mut self.score);
        body.smart_detect_types.merge_into(&mut self.smart_detect_types);
        body.thumbnail.merge_into(&mut self.thumbnail);
        body.heatmap.merge_into(&mut self.heatmap);
        self.extra.extend(body.extra);
    }

    /// An event without an `end` is still in progress.
    pub fn is_open(&self) -> bool {
        self.end.is_none()
    }
}
