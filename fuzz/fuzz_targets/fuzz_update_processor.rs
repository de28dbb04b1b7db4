//! Fuzz target: `UpdateProcessor::process`
//!
//! Feeds arbitrary messages through decode → ingest → project and checks
//! the retention bound holds no matter what arrives, and that only
//! packet-local failures are skipped rather than returned.
//!
//! cargo fuzz run fuzz_update_processor

#![no_main]

use libfuzzer_sys::fuzz_target;
use protect_events::{Error, EventConfig, UpdateProcessor};

fuzz_target!(|data: &[u8]| {
    let config = EventConfig {
        max_retained: 4,
        ..EventConfig::default()
    };
    let Ok(mut processor) = UpdateProcessor::new(config) else {
        return;
    };

    for chunk in data.split(|b| *b == 0xFF) {
        if let Ok(outcome) = processor.process(chunk, 0) {
            assert!(outcome.errors.iter().all(Error::is_packet_local));
        }
        assert!(processor.machine().len() <= 4);
    }
});
