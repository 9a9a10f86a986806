//! Application core: pure domain logic, zero I/O.
//!
//! This module contains the tick orchestration for the level meter:
//! interval timer, mode machine, measurement engine and front-panel peers.
//! All interaction with hardware happens through **port traits** defined
//! in [`ports`], keeping this layer fully testable without real peripherals.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
