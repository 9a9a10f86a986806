//! Level meter control core.
//!
//! Exposes the pure-logic modules for integration testing and for the
//! bench simulator.  Hardware is reached only through the port traits in
//! [`app::ports`].

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod arbiter;
pub mod config;
pub mod drivers;
pub mod error;
pub mod fsm;
pub mod measurement;
pub mod pins;
pub mod scheduler;

pub use error::{Error, Result};
