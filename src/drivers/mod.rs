//! Front-panel peers of the measurement engine.

pub mod led;
pub mod switch;
