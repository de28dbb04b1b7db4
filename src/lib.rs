//! NVR real-time update stream core.
//!
//! Decodes the vendor's length-prefixed, optionally DEFLATE-compressed
//! websocket frames and folds the incremental `add`/`update` event actions
//! they carry into one coherent record per event, projected into the
//! motion / ring / smart-detect state a polling consumer reads.
//!
//! Transport, authentication and camera metadata live outside this crate.

#![deny(unused_must_use)]

pub mod config;
pub mod error;
pub mod events;
pub mod processor;
pub mod ws;

pub use config::{EventConfig, MAX_RETAINED};
pub use error::{Error, Result};
pub use processor::{MessageOutcome, UpdateProcessor};
