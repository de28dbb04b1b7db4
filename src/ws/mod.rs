//! Real-time update stream decoding.
//!
//! ```text
//! ┌───────────────┐   ┌──────────────┐   ┌──────────────────────────┐
//! │ websocket msg │──▶│ FrameDecoder │──▶│ UpdatePacket             │
//! │ (raw bytes)   │   │ (+ inflate)  │   │ (ActionEnvelope, Body)   │
//! └───────────────┘   └──────────────┘   └──────────────────────────┘
//! ```

pub mod codec;
pub mod compress;
pub mod packet;

pub use codec::{
    Frame, FrameDecoder, FrameHeader, HEADER_SIZE, PayloadFormat, decode_frame, encode_frame,
};
pub use packet::{PacketDecoder, UpdatePacket};
