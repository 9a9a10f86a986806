//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises the instrument against
//! the simulated adapters.  All tests run on the host with no real
//! hardware required.

mod instrument_tests;
mod rig;
