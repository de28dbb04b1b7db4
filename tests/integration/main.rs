//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises a specific subsystem
//! against hand-built websocket messages.  No network is required.

mod retention_tests;
mod scenario_tests;
mod stream_tests;
