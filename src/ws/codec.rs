//! Update-stream frame codec.
//!
//! Wire format:
//! ```text
//! ┌──────┬────────┬──────────┬──────────┬────────────┬─────────────────────┐
//! │ type │ format │ deflated │ reserved │ Length (4B)│ payload (N B)       │
//! │ i8   │ i8     │ i8       │ i8       │ BE i32     │ DEFLATE if flag set │
//! └──────┴────────┴──────────┴──────────┴────────────┴─────────────────────┘
//! ```
//!
//! A single websocket message carries back-to-back frames: an action
//! envelope followed by its data body, possibly repeated.  Unlike a
//! streaming transport codec, the whole message is already in memory, so
//! decoding is cursor-based: each call reads one frame at `position` and
//! reports where the next one starts.

extern crate alloc;
use alloc::borrow::Cow;
use alloc::vec::Vec;

use log::trace;

use super::compress;
use crate::error::{FrameError, MalformedReason};

/// Frame header size (type, format, deflated, reserved, BE-i32 length).
pub const HEADER_SIZE: usize = 8;

/// Closed set of payload encodings the NVR emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PayloadFormat {
    Json = 1,
    Utf8String = 2,
    BinaryBuffer = 3,
}

impl PayloadFormat {
    /// Map a wire tag onto the enumeration.  Any other value is protocol drift.
    pub fn from_tag(tag: u8) -> Result<Self, FrameError> {
        match tag {
            1 => Ok(Self::Json),
            2 => Ok(Self::Utf8String),
            3 => Ok(Self::BinaryBuffer),
            other => Err(FrameError::UnknownPayloadFormat(other)),
        }
    }

    pub const fn tag(self) -> u8 {
        self as u8
    }
}

/// The fixed 8-byte frame header, field-for-field as it sits on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    /// Opaque to this crate.
    pub packet_type: u8,
    /// Raw format tag; see [`PayloadFormat`].
    pub format: u8,
    /// Zero for raw payloads, anything else for DEFLATE.
    pub deflated: u8,
    pub reserved: u8,
    /// Signed on the wire; negative values are rejected by [`decode_frame`].
    pub length: i32,
}

impl FrameHeader {
    /// Parse the header from the first [`HEADER_SIZE`] bytes of `bytes`.
    pub fn parse(bytes: &[u8]) -> Result<Self, FrameError> {
        let Some(raw) = bytes.get(..HEADER_SIZE) else {
            return Err(FrameError::MalformedFrame(MalformedReason::TruncatedHeader));
        };

        Ok(Self {
            packet_type: raw[0],
            format: raw[1],
            deflated: raw[2],
            reserved: raw[3],
            length: i32::from_be_bytes([raw[4], raw[5], raw[6], raw[7]]),
        })
    }

    /// Serialise back into wire order.
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let len = self.length.to_be_bytes();
        [
            self.packet_type,
            self.format,
            self.deflated,
            self.reserved,
            len[0],
            len[1],
            len[2],
            len[3],
        ]
    }

    pub fn is_deflated(&self) -> bool {
        self.deflated != 0
    }
}

/// One decoded frame.  The payload borrows from the input buffer unless it
/// had to be inflated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame<'a> {
    pub header: FrameHeader,
    pub format: PayloadFormat,
    pub payload: Cow<'a, [u8]>,
}

/// Decode the frame starting at `position`.
///
/// Returns the frame and the position immediately after its payload.
pub fn decode_frame(buf: &[u8], position: usize) -> Result<(Frame<'_>, usize), FrameError> {
    let rest = buf.get(position..).unwrap_or_default();
    let header = FrameHeader::parse(rest)?;

    let length = usize::try_from(header.length)
        .map_err(|_| FrameError::MalformedFrame(MalformedReason::NegativeLength))?;

    let body = &rest[HEADER_SIZE..];
    if length > body.len() {
        return Err(FrameError::MalformedFrame(
            MalformedReason::LengthExceedsBuffer,
        ));
    }
    let raw = &body[..length];

    let payload = if header.is_deflated() {
        Cow::Owned(compress::decompress(raw).ok_or(FrameError::DecompressionError)?)
    } else {
        Cow::Borrowed(raw)
    };

    let format = PayloadFormat::from_tag(header.format)?;
    let next = position + HEADER_SIZE + length;

    trace!(
        "decoded frame type={} format={:?} deflated={} len={} next={}",
        header.packet_type,
        format,
        header.is_deflated(),
        length,
        next
    );

    Ok((
        Frame {
            header,
            format,
            payload,
        },
        next,
    ))
}

/// Cursor over the back-to-back frames of one websocket message.
///
/// Yields frames until the buffer is exhausted.  The first error is yielded
/// once and ends iteration: the remainder of a buffer is unusable after a
/// framing failure.
pub struct FrameDecoder<'a> {
    buf: &'a [u8],
    position: usize,
    failed: bool,
}

impl<'a> FrameDecoder<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            buf,
            position: 0,
            failed: false,
        }
    }

    /// Decode the next frame, or `None` once the buffer is consumed.
    pub fn next_frame(&mut self) -> Option<Result<Frame<'a>, FrameError>> {
        if self.failed || self.position >= self.buf.len() {
            return None;
        }

        match decode_frame(self.buf, self.position) {
            Ok((frame, next)) => {
                self.position = next;
                Some(Ok(frame))
            }
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }

    /// Byte offset of the next undecoded frame.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Whether every byte has been consumed without error.
    pub fn is_exhausted(&self) -> bool {
        !self.failed && self.position >= self.buf.len()
    }
}

impl<'a> Iterator for FrameDecoder<'a> {
    type Item = Result<Frame<'a>, FrameError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_frame()
    }
}

impl core::iter::FusedIterator for FrameDecoder<'_> {}

/// Encode a payload into a frame and append it to `out`.
///
/// When `deflate` is set the payload is zlib/DEFLATE-compressed and the
/// header flag raised.  Returns the number of bytes appended, or `None` if
/// the (possibly compressed) payload does not fit the signed length field.
pub fn encode_frame(
    packet_type: u8,
    format: PayloadFormat,
    payload: &[u8],
    deflate: bool,
    out: &mut Vec<u8>,
) -> Option<usize> {
    let body: Cow<'_, [u8]> = if deflate {
        Cow::Owned(compress::compress(payload))
    } else {
        Cow::Borrowed(payload)
    };

    let length = i32::try_from(body.len()).ok()?;
    let header = FrameHeader {
        packet_type,
        format: format.tag(),
        deflated: u8::from(deflate),
        reserved: 0,
        length,
    };

    out.extend_from_slice(&header.to_bytes());
    out.extend_from_slice(&body);
    Some(HEADER_SIZE + body.len())
}

// ── Tests ────────────────────────────────────────────────────
