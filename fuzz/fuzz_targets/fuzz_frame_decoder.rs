//! Fuzz target: `FrameDecoder`
//!
//! Drives arbitrary byte sequences through the cursor-based frame decoder
//! and asserts that it never panics, never reports a cursor past the end
//! of the buffer, and stops after the first error.
//!
//! cargo fuzz run fuzz_frame_decoder

#![no_main]

use libfuzzer_sys::fuzz_target;
use protect_events::ws::codec::{FrameDecoder, HEADER_SIZE};

fuzz_target!(|data: &[u8]| {
    let mut decoder = FrameDecoder::new(data);
    let mut last = 0;

    while let Some(result) = decoder.next_frame() {
        match result {
            Ok(frame) => {
                assert!(decoder.position() <= data.len(), "cursor past buffer end");
                assert!(decoder.position() >= last + HEADER_SIZE, "cursor must advance");
                assert_eq!(frame.header.length as usize + last + HEADER_SIZE, decoder.position());
                last = decoder.position();
            }
            Err(_) => break,
        }
    }

    // Once an error is reported the decoder yields nothing further.
    assert!(decoder.next_frame().is_none());
});
