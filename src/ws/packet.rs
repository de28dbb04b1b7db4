//! Update packets: an action frame followed by its data frame.
//!
//! Both frames must be JSON.  A message may hold several packets back to
//! back; [`PacketDecoder`] walks them in order.

use serde_json::Value;

use super::codec::{Frame, FrameDecoder, PayloadFormat, decode_frame};
use crate::error::{PayloadError, Result};
use crate::events::model::{ActionEnvelope, EventBody};

/// One logical update from the NVR.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdatePacket {
    pub action: ActionEnvelope,
    pub data: EventBody,
}

impl UpdatePacket {
    /// Decode the single packet at the start of `buf`.
    pub fn decode(buf: &[u8]) -> Result<Self> {
        Self::decode_at(buf, 0).map(|(packet, _)| packet)
    }

    /// Decode the packet at `position`, returning it and the position of
    /// the next packet.
    pub fn decode_at(buf: &[u8], position: usize) -> Result<(Self, usize)> {
        let (action_frame, data_frame, next) = split_packet(buf, position)?;
        Ok((Self::from_frames(&action_frame, &data_frame)?, next))
    }

    /// Interpret an already-framed action/data pair.
    pub fn from_frames(action_frame: &Frame<'_>, data_frame: &Frame<'_>) -> Result<Self> {
        let action: ActionEnvelope = serde_json::from_value(json_value(action_frame)?)
            .map_err(|e| PayloadError::InvalidJson(e.to_string()))?;
        let data = EventBody::from_value(json_value(data_frame)?)
            .map_err(|e| PayloadError::InvalidJson(e.to_string()))?;

        Ok(Self { action, data })
    }
}

/// Frame the action and data frames at `position` without reading them.
fn split_packet(buf: &[u8], position: usize) -> Result<(Frame<'_>, Frame<'_>, usize)> {
    let (action_frame, next) = decode_frame(buf, position)?;
    if next >= buf.len() {
        return Err(PayloadError::MissingDataFrame.into());
    }
    let (data_frame, next) = decode_frame(buf, next)?;
    Ok((action_frame, data_frame, next))
}

/// Parse a JSON frame's payload.
pub fn json_value(frame: &Frame<'_>) -> core::result::Result<Value, PayloadError> {
    if frame.format != PayloadFormat::Json {
        return Err(PayloadError::NotJson(frame.format));
    }
    serde_json::from_slice(&frame.payload).map_err(|e| PayloadError::InvalidJson(e.to_string()))
}

/// Walks the packets of one websocket message.
///
/// A packet whose frames are intact but whose contents cannot be read
/// yields an error and the walk moves on.  A framing error ends the walk.
pub struct PacketDecoder<'a> {
    buf: &'a [u8],
    position: usize,
    failed: bool,
}

impl<'a> PacketDecoder<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            buf,
            position: 0,
            failed: false,
        }
    }

    pub fn position(&self) -> usize {
        self.position
    }
}

impl Iterator for PacketDecoder<'_> {
    type Item = Result<UpdatePacket>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.position >= self.buf.len() {
            return None;
        }

        match split_packet(self.buf, self.position) {
            Ok((action_frame, data_frame, next)) => {
                self.position = next;
                Some(UpdatePacket::from_frames(&action_frame, &data_frame))
            }
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

impl core::iter::FusedIterator for PacketDecoder<'_> {}

/// Count the frames in a message without interpreting them.
pub fn frame_count(buf: &[u8]) -> Result<usize> {
    let mut count = 0;
    for frame in FrameDecoder::new(buf) {
        frame?;
        count += 1;
    }
    Ok(count)
}
