//! Unified error types for the update-stream core.
//!
//! A single `Error` enum that every subsystem converts into, so the
//! transport loop sitting above this crate handles failures uniformly.
//! Every failure is local to the frame or event being processed; none of
//! them leave the retention store in a partially-updated state.
//!
//! Dropping an event (no camera, unknown id) is *not* an error and is
//! reported through [`Ingest::Dropped`](crate::events::machine::Ingest).

use core::fmt;

use crate::ws::codec::PayloadFormat;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation in the crate funnels into this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A websocket frame could not be decoded.
    Frame(FrameError),
    /// A decoded frame did not carry the JSON the event layer needs.
    Payload(PayloadError),
    /// The action envelope violated the event protocol.
    Event(EventError),
    /// Configuration is invalid.
    Config(ConfigError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Frame(e) => write!(f, "frame: {e}"),
            Self::Payload(e) => write!(f, "payload: {e}"),
            Self::Event(e) => write!(f, "event: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
        }
    }
}

impl std::error::Error for Error {}

impl Error {
    /// Whether the failure is confined to one well-framed packet.
    ///
    /// Packet-local errors leave the frames after them readable, so the
    /// rest of the message is still processed.  Frame errors and a missing
    /// data frame lose the frame boundaries and end the message.
    pub fn is_packet_local(&self) -> bool {
        matches!(
            self,
            Self::Event(_) | Self::Payload(PayloadError::NotJson(_) | PayloadError::InvalidJson(_))
        )
    }
}

// ---------------------------------------------------------------------------
// Frame errors
// ---------------------------------------------------------------------------

/// Failures of the binary frame decoder.
///
/// `MalformedFrame` and `DecompressionError` are fatal to the current
/// buffer only: the caller discards it and waits for the next read.
/// `UnknownPayloadFormat` signals protocol drift and must be surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    MalformedFrame(MalformedReason),
    DecompressionError,
    UnknownPayloadFormat(u8),
}

/// Why a frame was rejected as malformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MalformedReason {
    /// Fewer than 8 header bytes remain at the cursor.
    TruncatedHeader,
    /// The signed length field is below zero.
    NegativeLength,
    /// The length field runs past the end of the buffer.
    LengthExceedsBuffer,
}

impl fmt::Display for MalformedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TruncatedHeader => write!(f, "truncated header"),
            Self::NegativeLength => write!(f, "negative payload length"),
            Self::LengthExceedsBuffer => write!(f, "payload length exceeds buffer"),
        }
    }
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedFrame(reason) => write!(f, "malformed frame ({reason})"),
            Self::DecompressionError => write!(f, "corrupt DEFLATE payload"),
            Self::UnknownPayloadFormat(tag) => write!(f, "unknown payload format tag {tag}"),
        }
    }
}

impl From<FrameError> for Error {
    fn from(e: FrameError) -> Self {
        Self::Frame(e)
    }
}

// ---------------------------------------------------------------------------
// Payload errors
// ---------------------------------------------------------------------------

/// Failures turning decoded frames into an action/data JSON pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadError {
    /// The frame decoded fine but is not tagged as JSON.
    NotJson(PayloadFormat),
    /// The frame is tagged JSON but does not parse into the expected shape.
    InvalidJson(String),
    /// An action frame was not followed by its data frame.
    MissingDataFrame,
}

impl fmt::Display for PayloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotJson(format) => write!(f, "expected JSON frame, got {format:?}"),
            Self::InvalidJson(msg) => write!(f, "invalid JSON: {msg}"),
            Self::MissingDataFrame => write!(f, "action frame without data frame"),
        }
    }
}

impl From<PayloadError> for Error {
    fn from(e: PayloadError) -> Self {
        Self::Payload(e)
    }
}

// ---------------------------------------------------------------------------
// Event errors
// ---------------------------------------------------------------------------

/// Protocol contract violations in an action envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventError {
    /// `modelKey` was something other than `"event"`.
    UnsupportedModel(String),
    /// `action` was something other than `"add"` or `"update"`.
    InvalidAction(String),
    /// Neither the envelope nor the body carried an event id.
    MissingId,
}

impl fmt::Display for EventError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedModel(key) => write!(f, "unsupported model key {key:?}"),
            Self::InvalidAction(action) => write!(f, "invalid action {action:?}"),
            Self::MissingId => write!(f, "event id missing"),
        }
    }
}

impl From<EventError> for Error {
    fn from(e: EventError) -> Self {
        Self::Event(e)
    }
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ValidationFailed(msg) => write!(f, "validation failed: {msg}"),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
