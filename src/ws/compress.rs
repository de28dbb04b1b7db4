//! Frame compression using DEFLATE via `miniz_oxide`.
//!
//! When a frame's `deflated` byte is non-zero, the payload is compressed.
//! The NVR emits zlib-wrapped DEFLATE; bare DEFLATE streams are accepted
//! as well.

extern crate alloc;
use alloc::vec::Vec;

use log::warn;
use miniz_oxide::deflate::compress_to_vec_zlib;
use miniz_oxide::inflate::{
    TINFLStatus, decompress_to_vec_with_limit, decompress_to_vec_zlib_with_limit,
};

/// DEFLATE compression level (1-10, higher = better ratio, slower).
const COMPRESSION_LEVEL: u8 = 6;

/// Largest payload a single frame may inflate to.
pub const MAX_INFLATED_SIZE: usize = 4 * 1024 * 1024;

/// Compress a payload into a zlib-wrapped DEFLATE stream.
pub fn compress(input: &[u8]) -> Vec<u8> {
    compress_to_vec_zlib(input, COMPRESSION_LEVEL)
}

/// Inflate a compressed payload.
///
/// Returns the decompressed bytes, or `None` if neither a zlib nor a raw
/// DEFLATE stream could be inflated within [`MAX_INFLATED_SIZE`].
pub fn decompress(input: &[u8]) -> Option<Vec<u8>> {
    match decompress_to_vec_zlib_with_limit(input, MAX_INFLATED_SIZE) {
        Ok(data) => return Some(data),
        Err(e) if e.status == TINFLStatus::HasMoreOutput => {
            warn!("decompress: payload exceeds {MAX_INFLATED_SIZE} bytes");
            return None;
        }
        Err(_) => {}
    }

    match decompress_to_vec_with_limit(input, MAX_INFLATED_SIZE) {
        Ok(data) => Some(data),
        Err(e) => {
            warn!("decompress: DEFLATE error: {:?}", e.status);
            None
        }
    }
}

// ── Tests ────────────────────────────────────────────────────
