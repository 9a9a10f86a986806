//! GPIO expander pin assignments for the level meter front end.
//!
//! Single source of truth: the current-source driver references this
//! module rather than hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Sensor current source
// ---------------------------------------------------------------------------

/// Digital output: enables the current source (active LOW).
pub const CURRENT_ENABLE_PIN: u8 = 4;
/// Logic level on [`CURRENT_ENABLE_PIN`] that energizes the source.
pub const CURRENT_ENABLE_ACTIVE: bool = false;

/// Digital input with pull-up: current-source error flag.
/// LOW = sensor open or shorted, HIGH = normal.
pub const CURRENT_FAULT_PIN: u8 = 0;
/// Logic level on [`CURRENT_FAULT_PIN`] that signals a fault.
pub const CURRENT_FAULT_ACTIVE: bool = false;

// ---------------------------------------------------------------------------
// Settling delays
// ---------------------------------------------------------------------------

/// Wait after enabling before the fault flag is trusted [ms].
pub const FAULT_SETTLE_MS: u32 = 10;
/// Wait after a clean fault check before the first conversion [ms].
pub const CURRENT_STABILIZE_MS: u32 = 100;
